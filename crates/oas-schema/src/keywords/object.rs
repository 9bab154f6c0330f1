//! Object keywords: property counts, `properties`, `required`,
//! `additionalProperties`, `patternProperties`, `propertyNames` and
//! `dependentRequired`.
//!
//! The baseline `properties`, `required` and `additionalProperties` share
//! their implementation with the OpenAPI overrides; the baseline simply
//! evaluates with no read/write filter.

use oas_core::AccessMode;
use serde_json::{Map, Value};

use super::{compile_pattern, expect_count, expect_object, expect_strings, extras_message};
use crate::evaluator::{eager, no_error, single, ErrorIterator, Evaluator, Scope};

pub fn max_properties<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let limit = try_schema!(expect_count(scope, value));
    match instance.as_object() {
        Some(object) if object.len() as u64 > limit => single(Ok(scope.error(
            "maxProperties",
            instance,
            format!("{instance} has too many properties"),
        ))),
        _ => no_error(),
    }
}

pub fn min_properties<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let limit = try_schema!(expect_count(scope, value));
    match instance.as_object() {
        Some(object) if (object.len() as u64) < limit => single(Ok(scope.error(
            "minProperties",
            instance,
            format!("{instance} does not have enough properties"),
        ))),
        _ => no_error(),
    }
}

pub fn properties<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    properties_in(ev, scope, value, instance, AccessMode::None)
}

/// Validates each declared property present in `instance`, skipping those
/// `mode` excludes.
pub(crate) fn properties_in<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    mode: AccessMode,
) -> ErrorIterator<'a> {
    let declared = try_schema!(expect_object(scope, value));
    let Some(object) = instance.as_object() else {
        return no_error();
    };
    let scope = scope.clone();
    Box::new(
        declared
            .iter()
            .filter(move |(_, subschema)| !mode.excludes(subschema))
            .filter_map(move |(name, subschema)| object.get(name).map(|child| (name, subschema, child)))
            .flat_map(move |(name, subschema, child)| {
                ev.descend(subschema, child, scope.schema(name.as_str()).instance(name.as_str()))
            }),
    )
}

pub fn required<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    required_in(ev, scope, value, instance, schema, AccessMode::None)
}

/// Reports each required name missing from `instance`. Names whose
/// `properties` entry `mode` excludes are not required.
pub(crate) fn required_in<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    schema: &'a Map<String, Value>,
    mode: AccessMode,
) -> ErrorIterator<'a> {
    let names = try_schema!(expect_strings(scope, value));
    let Some(object) = instance.as_object() else {
        return no_error();
    };
    let declared = schema.get("properties").and_then(Value::as_object);

    let missing = names
        .into_iter()
        .filter(|name| {
            let excluded = declared
                .and_then(|props| props.get(*name))
                .is_some_and(|subschema| mode.excludes(subschema));
            !excluded && !object.contains_key(*name)
        })
        .map(|name| Ok(scope.error("required", instance, format!("{name:?} is a required property"))))
        .collect();
    eager(missing)
}

pub fn additional_properties<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    additional_properties_in(ev, scope, value, instance, schema, AccessMode::None)
}

/// Applies `value` to every instance property not covered by a sibling
/// `properties` entry or `patternProperties` pattern. A property whose
/// `properties` entry `mode` excludes counts as additional.
pub(crate) fn additional_properties_in<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    schema: &'a Map<String, Value>,
    mode: AccessMode,
) -> ErrorIterator<'a> {
    let Some(object) = instance.as_object() else {
        return no_error();
    };
    let extras = try_schema!(find_additional(scope, object, schema, mode));

    match value {
        Value::Bool(false) if !extras.is_empty() => {
            let names: Vec<&str> = extras.iter().map(|(name, _)| *name).collect();
            single(Ok(scope.error(
                "additionalProperties",
                instance,
                format!(
                    "Additional properties are not allowed ({} unexpected)",
                    extras_message(&names)
                ),
            )))
        }
        Value::Bool(_) => no_error(),
        Value::Object(_) => {
            let scope = scope.clone();
            Box::new(
                extras
                    .into_iter()
                    .flat_map(move |(name, child)| ev.descend(value, child, scope.instance(name))),
            )
        }
        other => single(Err(scope.malformed(format!(
            "additionalProperties must be a schema, found {}",
            oas_core::json_type_name(other)
        )))),
    }
}

fn find_additional<'a>(
    scope: &Scope,
    object: &'a Map<String, Value>,
    schema: &Map<String, Value>,
    mode: AccessMode,
) -> Result<Vec<(&'a str, &'a Value)>, oas_core::SchemaError> {
    let declared = schema.get("properties").and_then(Value::as_object);
    let patterns = match schema.get("patternProperties").and_then(Value::as_object) {
        Some(patterns) => patterns
            .keys()
            .map(|pattern| compile_pattern(&scope.sibling("patternProperties"), pattern))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(object
        .iter()
        .filter(|(name, _)| {
            let covered = declared
                .and_then(|props| props.get(name.as_str()))
                .is_some_and(|subschema| !mode.excludes(subschema));
            !covered && !patterns.iter().any(|regex| regex.is_match(name))
        })
        .map(|(name, child)| (name.as_str(), child))
        .collect())
}

pub fn pattern_properties<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let patterns = try_schema!(expect_object(scope, value));
    let Some(object) = instance.as_object() else {
        return no_error();
    };

    let mut compiled = Vec::with_capacity(patterns.len());
    for (pattern, subschema) in patterns {
        let regex = try_schema!(compile_pattern(&scope.schema(pattern.as_str()), pattern));
        compiled.push((pattern.as_str(), regex, subschema));
    }

    let scope = scope.clone();
    Box::new(compiled.into_iter().flat_map(move |(pattern, regex, subschema)| {
        let scope = scope.schema(pattern);
        object
            .iter()
            .filter(move |(name, _)| regex.is_match(name))
            .flat_map(move |(name, child)| ev.descend(subschema, child, scope.instance(name.as_str())))
    }))
}

/// Validates every property name, as a string instance, against the
/// subschema. Errors are located at the object holding the name. Names are
/// checked eagerly since they are not borrowed from the instance as values.
pub fn property_names<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let Some(object) = instance.as_object() else {
        return no_error();
    };
    let mut errors = Vec::new();
    for name in object.keys() {
        let key = Value::String(name.clone());
        match ev.collect(value, &key, scope.derived()) {
            Ok(found) => errors.extend(found.into_iter().map(Ok)),
            Err(err) => return single(Err(err)),
        }
    }
    eager(errors)
}

pub fn dependent_required<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let dependencies = try_schema!(expect_object(scope, value));
    let Some(object) = instance.as_object() else {
        return no_error();
    };

    let mut errors = Vec::new();
    for (property, needs) in dependencies {
        let needs = try_schema!(expect_strings(&scope.schema(property.as_str()), needs));
        if !object.contains_key(property) {
            continue;
        }
        for dependency in needs.into_iter().filter(|d| !object.contains_key(*d)) {
            errors.push(Ok(scope.error(
                "dependentRequired",
                instance,
                format!("{dependency:?} is a dependency of {property:?}"),
            )));
        }
    }
    eager(errors)
}

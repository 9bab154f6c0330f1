//! `unevaluatedProperties` and `unevaluatedItems`.
//!
//! A property or item is evaluated when some keyword of the schema node, or
//! of a subschema reached in place through `$ref`, `allOf`, `anyOf`,
//! `oneOf`, `if`/`then`/`else` or `dependentSchemas`, applies to it.
//! Combinator branches only contribute when they pass. Both keywords
//! re-walk the node to collect that set, then validate what is left.

use std::collections::HashSet;

use oas_core::SchemaError;
use serde_json::{Map, Value};

use super::{compile_pattern, extras_message};
use crate::evaluator::{no_error, single, ErrorIterator, Evaluator, Scope};

type Mark<'m, 'a> = dyn FnMut(&Scope, &'a Map<String, Value>, bool) -> Result<(), SchemaError> + 'm;

pub fn unevaluated_properties<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let Some(object) = instance.as_object() else {
        return no_error();
    };
    let mode = ev.mode();

    let mut evaluated: HashSet<&'a str> = HashSet::new();
    let mut mark = |at: &Scope, node: &'a Map<String, Value>, nested: bool| -> Result<(), SchemaError> {
        let covers_all = node.contains_key("additionalProperties")
            || (nested && node.contains_key("unevaluatedProperties"));
        if covers_all {
            evaluated.extend(object.keys().map(String::as_str));
            return Ok(());
        }
        if let Some(declared) = node.get("properties").and_then(Value::as_object) {
            for (name, subschema) in declared {
                if object.contains_key(name) && !mode.excludes(subschema) {
                    evaluated.insert(name.as_str());
                }
            }
        }
        if let Some(patterns) = node.get("patternProperties").and_then(Value::as_object) {
            for pattern in patterns.keys() {
                let regex = compile_pattern(&at.schema("patternProperties").schema(pattern.as_str()), pattern)?;
                evaluated.extend(object.keys().filter(|name| regex.is_match(name)).map(String::as_str));
            }
        }
        Ok(())
    };
    try_schema!(walk(ev, &scope.node(), schema, instance, false, &mut mark));

    let unevaluated: Vec<(&str, &Value)> = object
        .iter()
        .filter(|(name, _)| !evaluated.contains(name.as_str()))
        .map(|(name, child)| (name.as_str(), child))
        .collect();
    if unevaluated.is_empty() {
        return no_error();
    }

    match value {
        Value::Bool(true) => no_error(),
        Value::Bool(false) => {
            let names: Vec<&str> = unevaluated.iter().map(|(name, _)| *name).collect();
            single(Ok(scope.error(
                "unevaluatedProperties",
                instance,
                format!("Unevaluated properties are not allowed ({} unexpected)", extras_message(&names)),
            )))
        }
        Value::Object(_) => {
            let mut failing = Vec::new();
            let mut context = Vec::new();
            for (name, child) in unevaluated {
                let errors = try_schema!(ev.collect(value, child, scope.instance(name)));
                if !errors.is_empty() {
                    failing.push(name);
                    context.extend(errors);
                }
            }
            if failing.is_empty() {
                return no_error();
            }
            single(Ok(scope
                .error(
                    "unevaluatedProperties",
                    instance,
                    format!(
                        "Unevaluated properties are not valid under the given schema ({} unevaluated)",
                        extras_message(&failing)
                    ),
                )
                .with_context(context)))
        }
        other => single(Err(scope.malformed(format!(
            "unevaluatedProperties must be a schema, found {}",
            oas_core::json_type_name(other)
        )))),
    }
}

pub fn unevaluated_items<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let Some(elements) = instance.as_array() else {
        return no_error();
    };

    let mut evaluated: HashSet<usize> = HashSet::new();
    let mut mark = |at: &Scope, node: &'a Map<String, Value>, nested: bool| -> Result<(), SchemaError> {
        if node.contains_key("items") || (nested && node.contains_key("unevaluatedItems")) {
            evaluated.extend(0..elements.len());
            return Ok(());
        }
        if let Some(prefix) = node.get("prefixItems").and_then(Value::as_array) {
            evaluated.extend(0..prefix.len().min(elements.len()));
        }
        if let Some(contains) = node.get("contains") {
            for (index, element) in elements.iter().enumerate() {
                if ev.is_valid(contains, element, at.schema("contains").instance(index))? {
                    evaluated.insert(index);
                }
            }
        }
        Ok(())
    };
    try_schema!(walk(ev, &scope.node(), schema, instance, false, &mut mark));

    let unevaluated: Vec<(usize, &Value)> = elements
        .iter()
        .enumerate()
        .filter(|(index, _)| !evaluated.contains(index))
        .collect();
    if unevaluated.is_empty() {
        return no_error();
    }

    match value {
        Value::Bool(true) => no_error(),
        Value::Bool(false) => {
            let items: Vec<String> = unevaluated.iter().map(|(_, item)| item.to_string()).collect();
            let verb = if items.len() == 1 { "was" } else { "were" };
            single(Ok(scope.error(
                "unevaluatedItems",
                instance,
                format!("Unevaluated items are not allowed ({} {verb} unexpected)", items.join(", ")),
            )))
        }
        Value::Object(_) => {
            let scope = scope.clone();
            Box::new(
                unevaluated
                    .into_iter()
                    .flat_map(move |(index, element)| ev.descend(value, element, scope.instance(index))),
            )
        }
        other => single(Err(scope.malformed(format!(
            "unevaluatedItems must be a schema, found {}",
            oas_core::json_type_name(other)
        )))),
    }
}

/// Visits `node` and every subschema applied in place to the same
/// instance, calling `mark` on each. `nested` is false only for the node
/// holding the keyword being evaluated.
fn walk<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    node: &'a Map<String, Value>,
    instance: &'a Value,
    nested: bool,
    mark: &mut Mark<'_, 'a>,
) -> Result<(), SchemaError> {
    mark(scope, node, nested)?;

    for keyword in ["$ref", "$dynamicRef"] {
        if let Some(reference) = node.get(keyword).and_then(Value::as_str) {
            let (target, at) = ev.follow(reference, &scope.schema(keyword))?;
            walk_value(ev, &at, target, instance, mark)?;
        }
    }

    for keyword in ["allOf", "anyOf", "oneOf"] {
        let Some(branches) = node.get(keyword).and_then(Value::as_array) else {
            continue;
        };
        for (index, branch) in branches.iter().enumerate() {
            let at = scope.schema(keyword).schema(index);
            if ev.is_valid(branch, instance, at.clone())? {
                walk_value(ev, &at, branch, instance, mark)?;
            }
        }
    }

    if let Some(condition) = node.get("if") {
        let at = scope.schema("if");
        if ev.is_valid(condition, instance, at.clone())? {
            walk_value(ev, &at, condition, instance, mark)?;
            if let Some(then) = node.get("then") {
                walk_value(ev, &scope.schema("then"), then, instance, mark)?;
            }
        } else if let Some(otherwise) = node.get("else") {
            walk_value(ev, &scope.schema("else"), otherwise, instance, mark)?;
        }
    }

    if let (Some(dependencies), Some(object)) = (
        node.get("dependentSchemas").and_then(Value::as_object),
        instance.as_object(),
    ) {
        for (property, subschema) in dependencies {
            if object.contains_key(property) {
                let at = scope.schema("dependentSchemas").schema(property.as_str());
                walk_value(ev, &at, subschema, instance, mark)?;
            }
        }
    }
    Ok(())
}

fn walk_value<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    schema: &'a Value,
    instance: &'a Value,
    mark: &mut Mark<'_, 'a>,
) -> Result<(), SchemaError> {
    match schema.as_object() {
        Some(node) => walk(ev, scope, node, instance, true, mark),
        None => Ok(()),
    }
}

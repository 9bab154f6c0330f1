//! Applicator keywords: combinators, `not`, references, `if`/`then`/`else`
//! and `dependentSchemas`.
//!
//! `allOf`, `$ref` and `dependentSchemas` concatenate their branches'
//! error streams lazily. `anyOf`, `oneOf`, `not` and `if` must know whether
//! a branch passes before they can report anything, so they evaluate
//! branches up front and attach the branch errors as context.

use oas_core::ValidationError;
use serde_json::{Map, Value};

use super::{expect_object, expect_schemas};
use crate::evaluator::{no_error, single, ErrorIterator, Evaluator, Scope};

pub fn all_of<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let branches = try_schema!(expect_schemas(scope, value));
    let scope = scope.clone();
    Box::new(
        branches
            .iter()
            .enumerate()
            .flat_map(move |(index, branch)| ev.descend(branch, instance, scope.schema(index))),
    )
}

/// Passes once any branch passes; branches after the first passing one are
/// never evaluated.
pub fn any_of<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let branches = try_schema!(expect_schemas(scope, value));
    let mut context = Vec::new();
    for (index, branch) in branches.iter().enumerate() {
        let errors = try_schema!(ev.collect(branch, instance, scope.schema(index)));
        if errors.is_empty() {
            return no_error();
        }
        context.extend(errors);
    }
    single(Ok(scope
        .error(
            "anyOf",
            instance,
            format!("{instance} is not valid under any of the given schemas"),
        )
        .with_context(context)))
}

/// Requires exactly one passing branch. Every branch is evaluated so the
/// error can report how many matched.
pub fn one_of<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let branches = try_schema!(expect_schemas(scope, value));
    let mut matched = Vec::new();
    let mut context: Vec<ValidationError> = Vec::new();
    for (index, branch) in branches.iter().enumerate() {
        let errors = try_schema!(ev.collect(branch, instance, scope.schema(index)));
        if errors.is_empty() {
            matched.push(index);
        } else {
            context.extend(errors);
        }
    }

    let message = match matched.len() {
        1 => return no_error(),
        0 => format!("{instance} is not valid under any of the given schemas (0 matched)"),
        n => {
            tracing::trace!(schema_path = %scope.schema_path(), ?matched, "oneOf matched more than one branch");
            format!("{instance} is valid under more than one of the given schemas ({n} matched)")
        }
    };
    single(Ok(scope.error("oneOf", instance, message).with_context(context)))
}

pub fn not<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    if try_schema!(ev.is_valid(value, instance, scope.clone())) {
        single(Ok(scope.error("not", instance, format!("{instance} should not be valid under {value}"))))
    } else {
        no_error()
    }
}

/// `$ref` (and `$dynamicRef`, resolved the same way): validates the
/// instance against the referenced schema. Error schema paths continue from
/// the target's location.
pub fn reference<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let Some(reference) = value.as_str() else {
        return single(Err(scope.malformed(format!("reference must be a string, found {value}"))));
    };
    let (target, scope) = try_schema!(ev.follow(reference, scope));
    ev.descend(target, instance, scope)
}

pub fn dependent_schemas<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let dependencies = try_schema!(expect_object(scope, value));
    let Some(object) = instance.as_object() else {
        return no_error();
    };
    let scope = scope.clone();
    Box::new(
        dependencies
            .iter()
            .filter(move |(property, _)| object.contains_key(property.as_str()))
            .flat_map(move |(property, subschema)| {
                ev.descend(subschema, instance, scope.schema(property.as_str()))
            }),
    )
}

/// `if`, consulting the `then` and `else` siblings.
pub fn if_then_else<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let branch = if try_schema!(ev.is_valid(value, instance, scope.clone())) {
        "then"
    } else {
        "else"
    };
    match schema.get(branch) {
        Some(subschema) => ev.descend(subschema, instance, scope.sibling(branch)),
        None => no_error(),
    }
}

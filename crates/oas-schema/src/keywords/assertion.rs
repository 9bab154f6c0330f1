//! Assertion keywords: numeric bounds, string length and pattern, `enum`,
//! `const`, `type` and `format`.

use oas_core::value::equal;
use oas_core::SchemaError;
use serde_json::{Map, Value};

use super::{compile_pattern, expect_array, expect_count, expect_number};
use crate::evaluator::{no_error, single, ErrorIterator, Evaluator, Scope};

pub fn multiple_of<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let divisor = try_schema!(expect_number(scope, value));
    if divisor <= 0.0 {
        return single(Err(scope.malformed(format!("multipleOf must be greater than 0, found {value}"))));
    }
    let Value::Number(n) = instance else {
        return no_error();
    };

    let failed = match (n.as_i64(), value.as_i64()) {
        (Some(x), Some(d)) => x % d != 0,
        _ => match n.as_f64() {
            Some(x) => {
                let quotient = x / divisor;
                !quotient.is_finite() || quotient.fract() != 0.0
            }
            None => false,
        },
    };

    if failed {
        single(Ok(scope.error("multipleOf", instance, format!("{instance} is not a multiple of {value}"))))
    } else {
        no_error()
    }
}

/// Draft4 `maximum`, with the boolean `exclusiveMaximum` sibling.
pub fn maximum_draft4<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let limit = try_schema!(expect_number(scope, value));
    let exclusive = try_schema!(exclusive_flag(scope, schema, "exclusiveMaximum"));
    let Some(x) = instance.as_f64() else {
        return no_error();
    };
    if exclusive && x >= limit {
        single(Ok(scope.error(
            "maximum",
            instance,
            format!("{instance} is greater than or equal to the maximum of {value}"),
        )))
    } else if x > limit {
        single(Ok(scope.error("maximum", instance, format!("{instance} is greater than the maximum of {value}"))))
    } else {
        no_error()
    }
}

/// Draft4 `minimum`, with the boolean `exclusiveMinimum` sibling.
pub fn minimum_draft4<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let limit = try_schema!(expect_number(scope, value));
    let exclusive = try_schema!(exclusive_flag(scope, schema, "exclusiveMinimum"));
    let Some(x) = instance.as_f64() else {
        return no_error();
    };
    if exclusive && x <= limit {
        single(Ok(scope.error(
            "minimum",
            instance,
            format!("{instance} is less than or equal to the minimum of {value}"),
        )))
    } else if x < limit {
        single(Ok(scope.error("minimum", instance, format!("{instance} is less than the minimum of {value}"))))
    } else {
        no_error()
    }
}

fn exclusive_flag(scope: &Scope, schema: &Map<String, Value>, keyword: &str) -> Result<bool, SchemaError> {
    match schema.get(keyword) {
        None => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(other) => Err(scope.sibling(keyword).malformed(format!(
            "{keyword} must be a boolean in this dialect, found {other}"
        ))),
    }
}

pub fn maximum<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    bound(scope, value, instance, "maximum", |x, limit| x > limit, "greater than the maximum of")
}

pub fn minimum<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    bound(scope, value, instance, "minimum", |x, limit| x < limit, "less than the minimum of")
}

pub fn exclusive_maximum<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    bound(
        scope,
        value,
        instance,
        "exclusiveMaximum",
        |x, limit| x >= limit,
        "greater than or equal to the maximum of",
    )
}

pub fn exclusive_minimum<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    bound(
        scope,
        value,
        instance,
        "exclusiveMinimum",
        |x, limit| x <= limit,
        "less than or equal to the minimum of",
    )
}

fn bound<'a>(
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    keyword: &str,
    violates: fn(f64, f64) -> bool,
    phrase: &str,
) -> ErrorIterator<'a> {
    let limit = try_schema!(expect_number(scope, value));
    match instance.as_f64() {
        Some(x) if violates(x, limit) => {
            single(Ok(scope.error(keyword, instance, format!("{instance} is {phrase} {value}"))))
        }
        _ => no_error(),
    }
}

pub fn max_length<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let limit = try_schema!(expect_count(scope, value));
    match instance.as_str() {
        Some(s) if s.chars().count() as u64 > limit => {
            single(Ok(scope.error("maxLength", instance, format!("{instance} is too long"))))
        }
        _ => no_error(),
    }
}

pub fn min_length<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let limit = try_schema!(expect_count(scope, value));
    match instance.as_str() {
        Some(s) if (s.chars().count() as u64) < limit => {
            single(Ok(scope.error("minLength", instance, format!("{instance} is too short"))))
        }
        _ => no_error(),
    }
}

pub fn pattern<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let Some(source) = value.as_str() else {
        return single(Err(scope.malformed(format!("pattern must be a string, found {value}"))));
    };
    let Some(text) = instance.as_str() else {
        return no_error();
    };
    let regex = try_schema!(compile_pattern(scope, source));
    if regex.is_match(text) {
        no_error()
    } else {
        single(Ok(scope.error("pattern", instance, format!("{instance} does not match {source:?}"))))
    }
}

pub fn enumeration<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let allowed = try_schema!(expect_array(scope, value, "allowed values"));
    if allowed.iter().any(|candidate| equal(candidate, instance)) {
        no_error()
    } else {
        single(Ok(scope.error("enum", instance, format!("{instance} is not one of {value}"))))
    }
}

pub fn constant<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    if equal(value, instance) {
        no_error()
    } else {
        single(Ok(scope.error("const", instance, format!("{value} was expected"))))
    }
}

/// Baseline `type`: a single token or an array of tokens.
pub fn type_<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let tokens: Vec<&str> = match value {
        Value::String(token) => vec![token.as_str()],
        Value::Array(items) => try_schema!(items
            .iter()
            .map(|item| item
                .as_str()
                .ok_or_else(|| scope.malformed(format!("type entries must be strings, found {item}"))))
            .collect::<Result<Vec<_>, _>>()),
        other => return single(Err(scope.malformed(format!("type must be a string or an array, found {other}")))),
    };
    check_types(ev, scope, &tokens, instance)
}

/// Reports unknown tokens as schema defects, then checks `instance`.
pub(crate) fn check_types<'a>(ev: Evaluator<'a>, scope: &Scope, tokens: &[&str], instance: &'a Value) -> ErrorIterator<'a> {
    let types = ev.types();
    if let Some(unknown) = tokens.iter().find(|token| !types.knows(token)) {
        return single(Err(SchemaError::UnknownType {
            token: unknown.to_string(),
            schema_path: scope.schema_path().clone(),
        }));
    }
    if tokens.iter().any(|token| types.is_type(instance, token)) {
        return no_error();
    }
    let expected: Vec<String> = tokens.iter().map(|t| format!("{t:?}")).collect();
    single(Ok(scope.error(
        "type",
        instance,
        format!("{instance} is not of type {}", expected.join(", ")),
    )))
}

/// Baseline `format`.
pub fn format<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    check_format(ev, scope, value, instance)
}

pub(crate) fn check_format<'a>(ev: Evaluator<'a>, scope: &Scope, value: &'a Value, instance: &'a Value) -> ErrorIterator<'a> {
    let Some(name) = value.as_str() else {
        return single(Err(scope.malformed(format!("format must be a string, found {value}"))));
    };
    if ev.formats().check(name, instance) {
        no_error()
    } else {
        single(Ok(scope.error("format", instance, format!("{instance} is not a {name:?}"))))
    }
}

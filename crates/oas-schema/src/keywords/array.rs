//! Array keywords: size bounds, `uniqueItems`, `items`, `prefixItems` and
//! `contains`.

use oas_core::value::all_unique;
use serde_json::{Map, Value};

use super::{expect_array, expect_count};
use crate::evaluator::{eager, no_error, single, ErrorIterator, Evaluator, Scope};

pub fn max_items<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let limit = try_schema!(expect_count(scope, value));
    match instance.as_array() {
        Some(items) if items.len() as u64 > limit => {
            single(Ok(scope.error("maxItems", instance, format!("{instance} is too long"))))
        }
        _ => no_error(),
    }
}

pub fn min_items<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let limit = try_schema!(expect_count(scope, value));
    match instance.as_array() {
        Some(items) if (items.len() as u64) < limit => {
            single(Ok(scope.error("minItems", instance, format!("{instance} is too short"))))
        }
        _ => no_error(),
    }
}

pub fn unique_items<'a>(
    _ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let Value::Bool(unique) = value else {
        return single(Err(scope.malformed(format!("uniqueItems must be a boolean, found {value}"))));
    };
    match instance.as_array() {
        Some(items) if *unique && !all_unique(items) => single(Ok(scope.error(
            "uniqueItems",
            instance,
            format!("{instance} has non-unique elements"),
        ))),
        _ => no_error(),
    }
}

/// Draft4 `items`: one schema for every element, or an array of schemas
/// matched by position.
pub fn items_draft4<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let Some(elements) = instance.as_array() else {
        return no_error();
    };
    match value {
        Value::Array(schemas) => positional(ev, scope, schemas, elements),
        _ => each_from(ev, scope, value, elements, 0),
    }
}

/// 2020-12 `items`: applies to the elements after those `prefixItems`
/// covers.
pub fn items<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    if value.is_array() {
        return single(Err(scope.malformed(
            "items must be a single schema; use prefixItems for positional schemas",
        )));
    }
    let Some(elements) = instance.as_array() else {
        return no_error();
    };
    let skip = schema
        .get("prefixItems")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    each_from(ev, scope, value, elements, skip)
}

pub fn prefix_items<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let schemas = try_schema!(expect_array(scope, value, "schemas"));
    match instance.as_array() {
        Some(elements) => positional(ev, scope, schemas, elements),
        None => no_error(),
    }
}

fn each_from<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    subschema: &'a Value,
    elements: &'a [Value],
    skip: usize,
) -> ErrorIterator<'a> {
    let scope = scope.clone();
    Box::new(
        elements
            .iter()
            .enumerate()
            .skip(skip)
            .flat_map(move |(index, element)| ev.descend(subschema, element, scope.instance(index))),
    )
}

fn positional<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    schemas: &'a [Value],
    elements: &'a [Value],
) -> ErrorIterator<'a> {
    let scope = scope.clone();
    Box::new(
        schemas
            .iter()
            .zip(elements)
            .enumerate()
            .flat_map(move |(index, (subschema, element))| {
                ev.descend(subschema, element, scope.schema(index).instance(index))
            }),
    )
}

/// `contains`, bounded by the `minContains` and `maxContains` siblings.
pub fn contains<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let Some(elements) = instance.as_array() else {
        return no_error();
    };
    let min = match schema.get("minContains") {
        Some(bound) => try_schema!(expect_count(&scope.sibling("minContains"), bound)),
        None => 1,
    };
    let max = match schema.get("maxContains") {
        Some(bound) => Some(try_schema!(expect_count(&scope.sibling("maxContains"), bound))),
        None => None,
    };

    let mut matched = 0u64;
    for (index, element) in elements.iter().enumerate() {
        match ev.is_valid(value, element, scope.instance(index)) {
            Ok(true) => matched += 1,
            Ok(false) => {}
            Err(err) => return single(Err(err)),
        }
    }

    let mut errors = Vec::new();
    if matched < min {
        let message = if matched == 0 && min == 1 {
            format!("{instance} does not contain items matching the given schema")
        } else {
            format!(
                "Too few items match the given schema (expected at least {min} but only {matched} matched)"
            )
        };
        errors.push(Ok(scope.error("contains", instance, message)));
    }
    if let Some(max) = max.filter(|max| matched > *max) {
        errors.push(Ok(scope.error(
            "contains",
            instance,
            format!("Too many items match the given schema (expected at most {max})"),
        )));
    }
    eager(errors)
}

#[cfg(test)]
mod tests {
    use oas_core::Dialect;
    use serde_json::{json, Value};

    use crate::SchemaValidator;

    fn errors(dialect: Dialect, schema: Value, instance: Value) -> Vec<(String, String, String)> {
        SchemaValidator::new(schema, dialect)
            .unwrap()
            .validate(&instance)
            .unwrap()
            .into_iter()
            .map(|e| (e.instance_path.to_string(), e.schema_path.to_string(), e.message))
            .collect()
    }

    #[test]
    fn test_size_bounds() {
        let schema = json!({"minItems": 1, "maxItems": 2});
        assert_eq!(errors(Dialect::Oas30, schema.clone(), json!([]))[0].2, "[] is too short");
        assert_eq!(errors(Dialect::Oas30, schema.clone(), json!([1, 2, 3]))[0].2, "[1,2,3] is too long");
        assert!(errors(Dialect::Oas30, schema, json!({"not": "an array"})).is_empty());
    }

    #[test]
    fn test_unique_items_uses_json_equality() {
        let schema = json!({"uniqueItems": true});
        assert!(errors(Dialect::Oas31, schema.clone(), json!([1, "1", true])).is_empty());
        assert_eq!(errors(Dialect::Oas31, schema.clone(), json!([1, 1.0])).len(), 1);
        assert_eq!(errors(Dialect::Oas31, schema, json!([{"a": 1}, {"a": 1}])).len(), 1);
        assert!(errors(Dialect::Oas31, json!({"uniqueItems": false}), json!([1, 1])).is_empty());
    }

    #[test]
    fn test_items_paths() {
        let schema = json!({"items": {"type": "integer"}});
        let found = errors(Dialect::Oas30, schema, json!([1, "two", 3, "four"]));
        assert_eq!(
            found.iter().map(|(i, s, _)| (i.as_str(), s.as_str())).collect::<Vec<_>>(),
            [("/1", "/items/type"), ("/3", "/items/type")]
        );
    }

    #[test]
    fn test_prefix_items_then_items() {
        let schema = json!({
            "prefixItems": [{"type": "string"}, {"type": "integer"}],
            "items": {"type": "boolean"}
        });
        assert!(errors(Dialect::Oas31, schema.clone(), json!(["a", 1, true, false])).is_empty());
        let found = errors(Dialect::Oas31, schema, json!([1, 1, "x"]));
        assert_eq!(found[0].0, "/0");
        assert_eq!(found[0].1, "/prefixItems/0/type");
        assert_eq!(found[1].0, "/2");
        assert_eq!(found[1].1, "/items/type");
    }

    #[test]
    fn test_items_false_after_prefix() {
        let schema = json!({"prefixItems": [{"type": "string"}], "items": false});
        assert!(errors(Dialect::Oas31, schema.clone(), json!(["a"])).is_empty());
        assert_eq!(errors(Dialect::Oas31, schema, json!(["a", "b"]))[0].2, r#"False schema does not allow "b""#);
    }

    #[test]
    fn test_contains_bounds() {
        let schema = json!({"contains": {"type": "integer"}});
        assert!(errors(Dialect::Oas31, schema.clone(), json!(["a", 2])).is_empty());
        assert_eq!(
            errors(Dialect::Oas31, schema, json!(["a"]))[0].2,
            r#"["a"] does not contain items matching the given schema"#
        );

        let bounded = json!({"contains": {"type": "integer"}, "minContains": 2, "maxContains": 3});
        assert_eq!(errors(Dialect::Oas31, bounded.clone(), json!([1, "a"])).len(), 1);
        assert!(errors(Dialect::Oas31, bounded.clone(), json!([1, 2, 3])).is_empty());
        assert_eq!(
            errors(Dialect::Oas31, bounded, json!([1, 2, 3, 4]))[0].2,
            "Too many items match the given schema (expected at most 3)"
        );
    }

    #[test]
    fn test_contains_min_zero_accepts_empty() {
        let schema = json!({"contains": {"type": "integer"}, "minContains": 0});
        assert!(errors(Dialect::Oas31, schema, json!([])).is_empty());
    }
}

//! OpenAPI-specific keyword validators and overrides.
//!
//! Overrides replace a baseline entry outright. Where an override needs
//! the baseline behavior it calls the shared implementation in
//! [`object`](super::object) or [`assertion`](super::assertion) with the
//! read/write mode applied.

use serde_json::{Map, Value};

use super::{assertion, object};
use crate::evaluator::{no_error, single, ErrorIterator, Evaluator, Scope};

/// OAS 3.0 `type`: a single token. A null instance passes when the sibling
/// `nullable` is `true`.
pub fn type_nullable<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    let Some(token) = value.as_str() else {
        return single(Err(scope.malformed(format!(
            "type must be a single type name in OpenAPI 3.0, found {value}"
        ))));
    };
    if instance.is_null() && schema.get("nullable").and_then(Value::as_bool) == Some(true) {
        return no_error();
    }
    assertion::check_types(ev, scope, &[token], instance)
}

/// OAS 3.0 `items`: a single schema applied to every element. The array
/// form is rejected whatever the instance.
pub fn items_single<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    if value.is_array() {
        return single(Err(scope.malformed("items must be a single schema in OpenAPI 3.0")));
    }
    let Some(elements) = instance.as_array() else {
        return no_error();
    };
    let scope = scope.clone();
    Box::new(
        elements
            .iter()
            .enumerate()
            .flat_map(move |(index, element)| ev.descend(value, element, scope.instance(index))),
    )
}

pub fn properties<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    object::properties_in(ev, scope, value, instance, ev.mode())
}

pub fn required<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    object::required_in(ev, scope, value, instance, schema, ev.mode())
}

pub fn additional_properties<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    object::additional_properties_in(ev, scope, value, instance, schema, ev.mode())
}

/// `format`, skipping null instances so `nullable` formatted fields accept
/// null.
pub fn format<'a>(
    ev: Evaluator<'a>,
    scope: &Scope,
    value: &'a Value,
    instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    if instance.is_null() {
        return no_error();
    }
    assertion::check_format(ev, scope, value, instance)
}

/// Consulted by [`type_nullable`]; never fails on its own.
pub fn nullable<'a>(
    _ev: Evaluator<'a>,
    _scope: &Scope,
    _value: &'a Value,
    _instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    no_error()
}

/// Annotation. Filtering by `readOnly` happens in `properties`, `required`
/// and `additionalProperties`.
pub fn read_only<'a>(
    _ev: Evaluator<'a>,
    _scope: &Scope,
    _value: &'a Value,
    _instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    no_error()
}

/// Annotation; see [`read_only`].
pub fn write_only<'a>(
    _ev: Evaluator<'a>,
    _scope: &Scope,
    _value: &'a Value,
    _instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    no_error()
}

/// Accepted keyword with no validation effect.
pub fn not_implemented<'a>(
    _ev: Evaluator<'a>,
    _scope: &Scope,
    _value: &'a Value,
    _instance: &'a Value,
    _schema: &'a Map<String, Value>,
) -> ErrorIterator<'a> {
    no_error()
}

#[cfg(test)]
mod tests {
    use oas_core::{AccessMode, Dialect, SchemaError};
    use serde_json::{json, Value};

    use crate::{SchemaValidator, ValidatorOptions};

    fn with_mode(dialect: Dialect, mode: AccessMode, schema: Value) -> SchemaValidator {
        ValidatorOptions::new()
            .with_dialect(dialect)
            .with_mode(mode)
            .build(schema)
            .unwrap()
    }

    #[test]
    fn test_nullable_allows_null() {
        let v = SchemaValidator::new(json!({"type": "string", "nullable": true}), Dialect::Oas30).unwrap();
        assert!(v.is_valid(&json!(null)).unwrap());
        assert!(v.is_valid(&json!("x")).unwrap());
        assert!(!v.is_valid(&json!(1)).unwrap());
    }

    #[test]
    fn test_null_rejected_without_nullable() {
        let v = SchemaValidator::new(json!({"type": "string"}), Dialect::Oas30).unwrap();
        let errors = v.validate(&json!(null)).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, r#"null is not of type "string""#);
    }

    #[test]
    fn test_nullable_alone_is_a_no_op() {
        let v = SchemaValidator::new(json!({"nullable": false}), Dialect::Oas30).unwrap();
        assert!(v.is_valid(&json!(null)).unwrap());
        assert!(v.is_valid(&json!(3)).unwrap());
    }

    #[test]
    fn test_type_array_is_malformed_in_oas30() {
        let v = SchemaValidator::new(json!({"type": ["string", "null"]}), Dialect::Oas30).unwrap();
        assert!(matches!(v.validate(&json!("x")), Err(SchemaError::Malformed { .. })));
    }

    #[test]
    fn test_items_array_is_malformed_in_oas30() {
        let v = SchemaValidator::new(json!({"items": [{"type": "string"}]}), Dialect::Oas30).unwrap();
        assert!(matches!(v.validate(&json!(["x"])), Err(SchemaError::Malformed { .. })));
        assert!(matches!(v.validate(&json!(5)), Err(SchemaError::Malformed { .. })));
    }

    #[test]
    fn test_format_skips_null() {
        let v = SchemaValidator::new(json!({"type": "string", "format": "date", "nullable": true}), Dialect::Oas30)
            .unwrap();
        assert!(v.is_valid(&json!(null)).unwrap());
        assert!(!v.is_valid(&json!("yesterday")).unwrap());
    }

    #[test]
    fn test_read_only_not_required_on_write() {
        let schema = json!({
            "type": "object",
            "required": ["id", "name"],
            "properties": {
                "id": {"type": "integer", "readOnly": true},
                "name": {"type": "string"}
            }
        });
        let write = with_mode(Dialect::Oas30, AccessMode::Write, schema.clone());
        assert!(write.is_valid(&json!({"name": "x"})).unwrap());

        let read = with_mode(Dialect::Oas30, AccessMode::Read, schema.clone());
        let errors = read.validate(&json!({"name": "x"})).unwrap();
        assert_eq!(errors[0].message, r#""id" is a required property"#);

        let plain = with_mode(Dialect::Oas30, AccessMode::None, schema);
        assert!(!plain.is_valid(&json!({"name": "x"})).unwrap());
    }

    #[test]
    fn test_excluded_property_is_not_type_checked() {
        let schema = json!({"properties": {"secret": {"type": "string", "writeOnly": true}}});
        let read = with_mode(Dialect::Oas31, AccessMode::Read, schema.clone());
        assert!(read.is_valid(&json!({"secret": 42})).unwrap());
        let write = with_mode(Dialect::Oas31, AccessMode::Write, schema);
        assert!(!write.is_valid(&json!({"secret": 42})).unwrap());
    }

    #[test]
    fn test_excluded_property_counts_as_additional() {
        let schema = json!({
            "properties": {"id": {"readOnly": true}, "name": {}},
            "additionalProperties": false
        });
        let write = with_mode(Dialect::Oas30, AccessMode::Write, schema);
        let errors = write.validate(&json!({"id": 1, "name": "x"})).unwrap();
        assert_eq!(
            errors[0].message,
            r#"Additional properties are not allowed ("id" was unexpected)"#
        );
    }

    #[test]
    fn test_annotation_keywords_never_fail() {
        let v = SchemaValidator::new(
            json!({
                "discriminator": {"propertyName": 42},
                "xml": "not even an object",
                "externalDocs": {},
                "example": {"anything": true},
                "deprecated": true,
                "readOnly": true
            }),
            Dialect::Oas30,
        )
        .unwrap();
        assert!(v.is_valid(&json!("whatever")).unwrap());
    }
}

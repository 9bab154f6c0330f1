//! Integration test: OpenAPI 3.1 discriminated union from a YAML fixture.

use oas_schema::{Dialect, SchemaValidator};
use serde_json::{json, Value};
use std::path::PathBuf;

fn pets() -> SchemaValidator {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pets-oas31.yaml");
    let content = std::fs::read_to_string(&path).expect("fixture exists");
    let schema: Value = serde_yaml::from_str(&content).expect("fixture is valid YAML");
    SchemaValidator::new(schema, Dialect::Oas31).expect("fixture is a schema")
}

#[test]
fn test_each_variant_is_valid() {
    let v = pets();
    assert!(v.is_valid(&json!({"name": "rex", "kind": "dog", "barks": true})).unwrap());
    assert!(v
        .is_valid(&json!({"name": "tom", "kind": "cat", "lives": 9, "tag": null}))
        .unwrap());
}

#[test]
fn test_null_is_a_type() {
    let v = pets();
    let mut pet = json!({"name": "rex", "kind": "dog", "barks": true});
    pet["tag"] = json!("good boy");
    assert!(v.is_valid(&pet).unwrap());
    pet["tag"] = json!(3);
    let errors = v.validate(&pet).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, r#"3 is not of type "string", "null""#);
}

#[test]
fn test_no_variant_matches() {
    let v = pets();
    let errors = v.validate(&json!({"name": "tweety", "kind": "bird"})).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].keyword, "oneOf");
    assert_eq!(
        errors[0].message,
        r#"{"name":"tweety","kind":"bird"} is not valid under any of the given schemas (0 matched)"#
    );
    let branch_paths: Vec<String> = errors[0].context.iter().map(|e| e.schema_path.to_string()).collect();
    assert_eq!(
        branch_paths,
        [
            "/$defs/Dog/properties/kind/const",
            "/$defs/Dog/required",
            "/$defs/Cat/properties/kind/const",
            "/$defs/Cat/required",
        ]
    );
}

#[test]
fn test_properties_of_failed_variant_are_unevaluated() {
    let v = pets();
    let errors = v
        .validate(&json!({"name": "rex", "kind": "dog", "barks": true, "lives": 3}))
        .unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].keyword, "unevaluatedProperties");
    assert_eq!(
        errors[0].message,
        r#"Unevaluated properties are not allowed ("lives" was unexpected)"#
    );
    assert_eq!(errors[0].schema_path.to_string(), "/$defs/Pet/unevaluatedProperties");
}

#[test]
fn test_formats() {
    let v = pets();
    let mut pet = json!({"name": "rex", "kind": "dog", "barks": true});
    pet["birthday"] = json!("2020-02-29");
    pet["chip"] = json!("67e55044-10b1-426f-9247-bb680e5fe0c8");
    assert!(v.is_valid(&pet).unwrap());

    pet["birthday"] = json!("2021-02-29");
    let errors = v.validate(&pet).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].instance_path.to_string(), "/birthday");
    assert_eq!(errors[0].schema_path.to_string(), "/$defs/Pet/properties/birthday/format");
}

#[test]
fn test_annotations_are_inert() {
    let v = SchemaValidator::new(
        json!({
            "type": "integer",
            "description": "count",
            "example": "not an integer",
            "examples": ["also not"],
            "discriminator": {"propertyName": "kind"},
            "externalDocs": {"url": "https://example.com"},
            "xml": {"name": "count"}
        }),
        Dialect::Oas31,
    )
    .unwrap();
    assert!(v.is_valid(&json!(4)).unwrap());
}

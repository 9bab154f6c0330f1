//! # Type Checker
//!
//! Decides whether an instance matches a primitive type token. The token
//! set depends on the dialect: OAS 3.0 has no `null` token (nullability is
//! the `nullable` keyword, handled by the `type` validator), OAS 3.1 has it
//! natively.
//!
//! Checking never fails. An unknown token simply does not match; the `type`
//! validator asks [`TypeChecker::knows`] first and reports the schema defect.

use oas_core::value::is_whole;
use oas_core::Dialect;
use serde_json::Value;

const OAS30_TYPES: &[&str] = &["array", "boolean", "integer", "number", "object", "string"];
const OAS31_TYPES: &[&str] = &[
    "array", "boolean", "integer", "null", "number", "object", "string",
];

/// Dialect-specific primitive type predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeChecker {
    dialect: Dialect,
}

impl TypeChecker {
    /// The checker for `dialect`.
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// The dialect this checker belongs to.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Every token this checker recognizes.
    pub fn tokens(&self) -> &'static [&'static str] {
        match self.dialect {
            Dialect::Oas30 => OAS30_TYPES,
            Dialect::Oas31 => OAS31_TYPES,
        }
    }

    /// Returns true if `token` is a type in this dialect.
    pub fn knows(&self, token: &str) -> bool {
        self.tokens().contains(&token)
    }

    /// Returns true if `instance` is of type `token`.
    ///
    /// `integer` accepts whole-valued floats; `number` accepts every number.
    /// `array` and `object` check shape only.
    pub fn is_type(&self, instance: &Value, token: &str) -> bool {
        if !self.knows(token) {
            return false;
        }
        match token {
            "array" => instance.is_array(),
            "boolean" => instance.is_boolean(),
            "integer" => matches!(instance, Value::Number(n) if is_whole(n)),
            "null" => instance.is_null(),
            "number" => instance.is_number(),
            "object" => instance.is_object(),
            "string" => instance.is_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_accepts_whole_float() {
        let checker = TypeChecker::for_dialect(Dialect::Oas30);
        assert!(checker.is_type(&json!(2), "integer"));
        assert!(checker.is_type(&json!(2.0), "integer"));
        assert!(!checker.is_type(&json!(2.5), "integer"));
        assert!(checker.is_type(&json!(2.5), "number"));
    }

    #[test]
    fn test_boolean_is_not_number() {
        let checker = TypeChecker::for_dialect(Dialect::Oas31);
        assert!(!checker.is_type(&json!(true), "integer"));
        assert!(!checker.is_type(&json!(true), "number"));
        assert!(checker.is_type(&json!(false), "boolean"));
    }

    #[test]
    fn test_oas30_has_no_null_token() {
        let checker = TypeChecker::for_dialect(Dialect::Oas30);
        assert!(!checker.knows("null"));
        assert!(!checker.is_type(&json!(null), "null"));
    }

    #[test]
    fn test_oas31_null_token() {
        let checker = TypeChecker::for_dialect(Dialect::Oas31);
        assert!(checker.knows("null"));
        assert!(checker.is_type(&json!(null), "null"));
        assert!(!checker.is_type(&json!(0), "null"));
    }

    #[test]
    fn test_shape_only_containers() {
        let checker = TypeChecker::for_dialect(Dialect::Oas30);
        assert!(checker.is_type(&json!([1, "two", null]), "array"));
        assert!(checker.is_type(&json!({"a": [1]}), "object"));
        assert!(!checker.is_type(&json!([]), "object"));
    }

    #[test]
    fn test_unknown_token_never_matches() {
        let checker = TypeChecker::for_dialect(Dialect::Oas31);
        assert!(!checker.knows("file"));
        assert!(!checker.is_type(&json!("x"), "file"));
    }
}

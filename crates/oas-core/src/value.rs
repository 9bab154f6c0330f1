//! # JSON Value Helpers
//!
//! Comparison and classification rules shared by the keyword validators.
//!
//! JSON Schema compares numbers by mathematical value: `1` and `1.0` are
//! the same instance for `enum`, `const` and `uniqueItems`. `serde_json`
//! keeps integers and floats apart, so [`equal`] bridges the two.

use serde_json::{Number, Value};

/// JSON type name of a value, as used in error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if is_whole(n) => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returns true if the number has no fractional part (`2` and `2.0`).
pub fn is_whole(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// Numeric equality across integer and float representations.
pub fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Structural equality with numeric comparison by value.
pub fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| equal(x, y)))
        }
        _ => a == b,
    }
}

/// Returns true if no two items are [`equal`].
pub fn all_unique(items: &[Value]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(i, a)| items[i + 1..].iter().all(|b| !equal(a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(3)), "integer");
        assert_eq!(json_type_name(&json!(3.0)), "integer");
        assert_eq!(json_type_name(&json!(3.5)), "number");
        assert_eq!(json_type_name(&json!({})), "object");
    }

    #[test]
    fn test_integer_equals_whole_float() {
        assert!(equal(&json!(1), &json!(1.0)));
        assert!(!equal(&json!(1), &json!(1.5)));
        assert!(equal(&json!([1, {"a": 2}]), &json!([1.0, {"a": 2.0}])));
    }

    #[test]
    fn test_object_equality_ignores_key_order() {
        assert!(equal(&json!({"a": 1, "b": 2}), &json!({"b": 2, "a": 1})));
        assert!(!equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
    }

    #[test]
    fn test_large_unsigned_integers() {
        assert!(equal(&json!(u64::MAX), &json!(u64::MAX)));
        assert!(!equal(&json!(u64::MAX), &json!(-1)));
    }

    #[test]
    fn test_all_unique() {
        assert!(all_unique(&[json!(1), json!("1"), json!(true)]));
        assert!(!all_unique(&[json!(1), json!(2), json!(1.0)]));
        assert!(all_unique(&[]));
    }

    #[test]
    fn test_bool_is_not_number() {
        assert!(!equal(&json!(true), &json!(1)));
        assert!(!equal(&json!(false), &json!(0)));
    }
}

//! # Validation Errors
//!
//! Instance-level failures. These are expected outcomes, never control
//! flow: the engine yields them one by one and callers decide whether to
//! collect, count, or stop at the first.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::location::Location;

/// A single instance violation with structured context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Human-readable description of the violation.
    pub message: String,
    /// Name of the keyword whose validator produced this error.
    pub keyword: String,
    /// Location of the failing value within the instance.
    pub instance_path: Location,
    /// Location of the keyword within the schema.
    pub schema_path: Location,
    /// The failing value.
    pub instance: Value,
    /// Branch errors for combinators (`anyOf`, `oneOf`) that report a
    /// single aggregate failure.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<ValidationError>,
}

impl ValidationError {
    /// Attaches branch errors.
    pub fn with_context(mut self, context: Vec<ValidationError>) -> Self {
        self.context = context;
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_root() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors from one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<ValidationError>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[ValidationError] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<ValidationError> {
        self.violations
    }
}

impl From<Vec<ValidationError>> for ValidationViolations {
    fn from(violations: Vec<ValidationError>) -> Self {
        Self { violations }
    }
}

impl IntoIterator for ValidationViolations {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violation(instance_path: Location, message: &str) -> ValidationError {
        ValidationError {
            message: message.to_string(),
            keyword: "type".to_string(),
            instance_path,
            schema_path: Location::new().join("type"),
            instance: json!(1),
            context: Vec::new(),
        }
    }

    #[test]
    fn test_display_nested_path() {
        let v = violation(
            Location::new().join("pets").join(0usize).join("name"),
            r#"1 is not of type "string""#,
        );
        assert_eq!(v.to_string(), r#"/pets/0/name: 1 is not of type "string""#);
    }

    #[test]
    fn test_display_root() {
        let v = violation(Location::new(), r#""kind" is a required property"#);
        assert!(v.to_string().starts_with("(root):"));
    }

    #[test]
    fn test_collection_display_one_per_line() {
        let all: ValidationViolations = vec![
            violation(Location::new(), "first"),
            violation(Location::new().join("a"), "second"),
        ]
        .into();
        assert_eq!(all.len(), 2);
        assert_eq!(all.to_string(), "  (root): first\n  /a: second");
    }

    #[test]
    fn test_serialize_omits_empty_context() {
        let v = violation(Location::new().join("a"), "bad");
        let value = serde_json::to_value(&v).unwrap();
        assert!(value.get("context").is_none());
        assert_eq!(value["instance_path"], json!(["a"]));
    }
}

//! # Error Types — Structured Error Hierarchy
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - [`SchemaError`] is fatal for the current validation call. It describes
//!   a structural defect in the schema document, always with its location.
//! - [`ResolutionError`] is the reference-resolution subset of schema
//!   defects: unresolvable pointers, external documents, cycles with no base
//!   case, and runaway nesting.
//! - Instance-level failures are never errors in this sense; they are
//!   [`ValidationError`](crate::ValidationError) records collected into a
//!   sequence.
//! - [`OasError`] is the top-level type for callers that want a single
//!   `Result` (e.g. `validate_document`).

use thiserror::Error;

use crate::location::Location;
use crate::violation::ValidationViolations;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum OasError {
    /// The schema is malformed or a reference cannot be resolved.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The instance did not conform to the schema.
    #[error("validation failed:\n{violations}")]
    ValidationFailed {
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// Validator configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// A structural defect in a schema document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A keyword value has the wrong shape (e.g. `oneOf` is not an array).
    #[error("malformed schema at '#{schema_path}': {reason}")]
    Malformed {
        /// Location of the offending keyword within the schema.
        schema_path: Location,
        /// What is wrong with it.
        reason: String,
    },

    /// `type` names a token the dialect does not define.
    #[error("unknown type '{token}' at '#{schema_path}'")]
    UnknownType {
        /// The unrecognized type token.
        token: String,
        /// Location of the `type` keyword.
        schema_path: Location,
    },

    /// `pattern` or `patternProperties` holds an invalid regular expression.
    #[error("invalid pattern '{pattern}' at '#{schema_path}': {reason}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// Location of the keyword holding it.
        schema_path: Location,
        /// Compiler diagnostic.
        reason: String,
    },

    /// A reference could not be followed.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Failure to follow a same-document reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The reference does not address a schema in the document.
    #[error("unresolvable reference '{reference}': {reason}")]
    Unresolvable {
        /// The reference as written.
        reference: String,
        /// Which segment failed and why.
        reason: String,
    },

    /// The reference points into another document.
    #[error("external reference '{reference}' is not supported; only same-document references resolve")]
    External {
        /// The reference as written.
        reference: String,
    },

    /// The reference re-enters itself without consuming instance structure.
    #[error("reference cycle without a base case: {}", chain.join(" -> "))]
    Cycle {
        /// The reference that closed the cycle.
        reference: String,
        /// Every reference on the cycle, ending with `reference`.
        chain: Vec<String>,
    },

    /// The instance nests deeper than the configured limit. Guards the
    /// call stack; recursion without instance progress is a `Cycle`.
    #[error("instance nesting limit of {limit} exceeded at '#{schema_path}'")]
    DepthExceeded {
        /// The configured limit.
        limit: usize,
        /// Schema location at which the limit was hit.
        schema_path: Location,
    },
}

/// Error loading validator configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("cannot parse validator configuration: {0}")]
    Parse(String),

    /// A field holds an unsupported value.
    #[error("unsupported {field} '{value}'")]
    Invalid {
        /// Field name.
        field: String,
        /// The rejected value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display_includes_location() {
        let err = SchemaError::Malformed {
            schema_path: Location::new().join("properties").join("id").join("oneOf"),
            reason: "expected an array of schemas".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("#/properties/id/oneOf"));
        assert!(msg.contains("expected an array"));
    }

    #[test]
    fn test_cycle_display_lists_chain() {
        let err = ResolutionError::Cycle {
            reference: "#/definitions/a".to_string(),
            chain: vec![
                "#/definitions/a".to_string(),
                "#/definitions/b".to_string(),
                "#/definitions/a".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "reference cycle without a base case: #/definitions/a -> #/definitions/b -> #/definitions/a"
        );
    }

    #[test]
    fn test_resolution_converts_into_schema_error() {
        let err: SchemaError = ResolutionError::External {
            reference: "other.yaml#/Pet".to_string(),
        }
        .into();
        assert!(matches!(err, SchemaError::Resolution(ResolutionError::External { .. })));
        assert!(err.to_string().contains("other.yaml#/Pet"));
    }

    #[test]
    fn test_oas_error_wraps_schema_error() {
        let err: OasError = SchemaError::UnknownType {
            token: "null".to_string(),
            schema_path: Location::new().join("type"),
        }
        .into();
        assert!(err.to_string().starts_with("schema error: unknown type 'null'"));
    }
}

//! # Dialect and Read/Write Context
//!
//! The two configuration axes of a validator. Both are fixed when the
//! validator is built and apply uniformly to every call made through it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// The OpenAPI Schema Object dialect.
///
/// - `Oas30`: JSON Schema draft4 baseline with OpenAPI 3.0 overrides. The
///   `null` type token does not exist; nullability is the `nullable` keyword.
/// - `Oas31`: JSON Schema draft 2020-12 baseline with OpenAPI 3.1
///   overrides. `type` may list `"null"` natively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// OpenAPI 3.0.x Schema Object.
    #[default]
    Oas30,
    /// OpenAPI 3.1.x Schema Object.
    Oas31,
}

impl Dialect {
    /// Maps the `openapi` field of an OpenAPI document to its schema dialect.
    ///
    /// ```
    /// use oas_core::Dialect;
    /// assert_eq!(Dialect::from_openapi_version("3.0.3"), Some(Dialect::Oas30));
    /// assert_eq!(Dialect::from_openapi_version("3.1.0"), Some(Dialect::Oas31));
    /// assert_eq!(Dialect::from_openapi_version("2.0"), None);
    /// ```
    pub fn from_openapi_version(version: &str) -> Option<Self> {
        let mut parts = version.trim().split('.');
        match (parts.next(), parts.next()) {
            (Some("3"), Some("0")) => Some(Dialect::Oas30),
            (Some("3"), Some("1")) => Some(Dialect::Oas31),
            _ => None,
        }
    }

    /// Short lowercase name, as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Oas30 => "oas30",
            Dialect::Oas31 => "oas31",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "oas30" | "3.0" => Ok(Dialect::Oas30),
            "oas31" | "3.1" => Ok(Dialect::Oas31),
            _ => Err(ConfigError::Invalid {
                field: "dialect".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Read/write context of a validation call.
///
/// Under `Write` (request bodies), properties declared `readOnly: true` are
/// removed from consideration. Under `Read` (response bodies), properties
/// declared `writeOnly: true` are. `None` filters nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    /// No filtering.
    #[default]
    None,
    /// Validating data read from the API.
    Read,
    /// Validating data written to the API.
    Write,
}

impl AccessMode {
    /// Returns true when a property with this subschema is invisible in
    /// the current context.
    pub fn excludes(&self, subschema: &Value) -> bool {
        let flag = |keyword: &str| {
            subschema
                .get(keyword)
                .and_then(Value::as_bool)
                .unwrap_or(false)
        };
        match self {
            AccessMode::None => false,
            AccessMode::Read => flag("writeOnly"),
            AccessMode::Write => flag("readOnly"),
        }
    }

    /// Short lowercase name, as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::None => "none",
            AccessMode::Read => "read",
            AccessMode::Write => "write",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(AccessMode::None),
            "read" => Ok(AccessMode::Read),
            "write" => Ok(AccessMode::Write),
            _ => Err(ConfigError::Invalid {
                field: "mode".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_openapi_version_mapping() {
        assert_eq!(Dialect::from_openapi_version("3.0.0"), Some(Dialect::Oas30));
        assert_eq!(Dialect::from_openapi_version(" 3.1.1 "), Some(Dialect::Oas31));
        assert_eq!(Dialect::from_openapi_version("3.2.0"), None);
        assert_eq!(Dialect::from_openapi_version("swagger"), None);
    }

    #[test]
    fn test_dialect_parse_and_display() {
        assert_eq!("OAS31".parse::<Dialect>().unwrap(), Dialect::Oas31);
        assert_eq!(Dialect::Oas30.to_string(), "oas30");
        assert!("draft7".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_dialect_serde_names() {
        assert_eq!(serde_json::to_value(Dialect::Oas31).unwrap(), json!("oas31"));
        let parsed: Dialect = serde_json::from_value(json!("oas30")).unwrap();
        assert_eq!(parsed, Dialect::Oas30);
    }

    #[test]
    fn test_write_excludes_read_only() {
        let schema = json!({"type": "string", "readOnly": true});
        assert!(AccessMode::Write.excludes(&schema));
        assert!(!AccessMode::Read.excludes(&schema));
        assert!(!AccessMode::None.excludes(&schema));
    }

    #[test]
    fn test_read_excludes_write_only() {
        let schema = json!({"type": "string", "writeOnly": true});
        assert!(AccessMode::Read.excludes(&schema));
        assert!(!AccessMode::Write.excludes(&schema));
    }

    #[test]
    fn test_false_flags_exclude_nothing() {
        let schema = json!({"readOnly": false, "writeOnly": false});
        assert!(!AccessMode::Read.excludes(&schema));
        assert!(!AccessMode::Write.excludes(&schema));
        assert!(!AccessMode::Write.excludes(&json!(true)));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("Write".parse::<AccessMode>().unwrap(), AccessMode::Write);
        let err = "readwrite".parse::<AccessMode>().unwrap_err();
        assert!(err.to_string().contains("readwrite"));
    }
}

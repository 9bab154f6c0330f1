//! # Validator Configuration
//!
//! Serializable settings for building a [`SchemaValidator`](crate::SchemaValidator),
//! loadable from YAML or JSON:
//!
//! ```yaml
//! dialect: oas31
//! mode: write
//! max_depth: 128
//! formats: true
//! ```
//!
//! Every field is optional; unknown fields are rejected.

use oas_core::{AccessMode, ConfigError, Dialect};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validate::{ValidatorOptions, DEFAULT_MAX_DEPTH};

/// Validator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Schema dialect.
    pub dialect: Dialect,
    /// Read/write context.
    pub mode: AccessMode,
    /// Limit on instance nesting depth.
    pub max_depth: usize,
    /// Whether the built-in format checkers are enabled.
    pub formats: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            mode: AccessMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            formats: true,
        }
    }
}

impl ValidatorConfig {
    /// Parses a YAML configuration document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed YAML, unknown fields or unknown
    /// enum values; [`ConfigError::Invalid`] on out-of-range values.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.checked()
    }

    /// Reads configuration from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// As for [`from_yaml_str`](Self::from_yaml_str).
    pub fn from_json_value(value: Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.checked()
    }

    fn checked(self) -> Result<Self, ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "max_depth".to_string(),
                value: self.max_depth.to_string(),
            });
        }
        Ok(self)
    }
}

impl From<ValidatorConfig> for ValidatorOptions {
    fn from(config: ValidatorConfig) -> Self {
        let options = ValidatorOptions::new()
            .with_dialect(config.dialect)
            .with_mode(config.mode)
            .with_max_depth(config.max_depth);
        if config.formats {
            options
        } else {
            options.without_formats()
        }
    }
}

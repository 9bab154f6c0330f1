//! # Schema Validation
//!
//! The public entry point: a [`SchemaValidator`] owns one OpenAPI Schema
//! Object together with the keyword table, type checker and format
//! registry of its dialect, and validates any number of instances against
//! it.
//!
//! ## Error Classes
//!
//! Instance failures come back as [`ValidationError`] values, lazily from
//! [`SchemaValidator::iter_errors`] or collected by
//! [`SchemaValidator::validate`]. A malformed schema or a reference that
//! cannot be followed aborts the call with a [`SchemaError`]. Callers that
//! want one `Result` use [`SchemaValidator::validate_document`], which folds
//! both into [`OasError`].
//!
//! ## Thread Safety
//!
//! `SchemaValidator` is `Send + Sync`. Per-call state (locations, the chain
//! of references in progress, nesting depth) lives in the evaluation scope
//! of each call, so concurrent calls share nothing mutable.

use oas_core::{AccessMode, Dialect, OasError, SchemaError, ValidationError, ValidationViolations};
use serde_json::Value;

use crate::config::ValidatorConfig;
use crate::evaluator::{ErrorIterator, Evaluator, Scope};
use crate::format::{FormatCheck, FormatRegistry};
use crate::keywords::KeywordSet;

/// Default limit on instance nesting, counted in object and array levels.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Builder for [`SchemaValidator`].
#[derive(Debug, Clone)]
pub struct ValidatorOptions {
    dialect: Dialect,
    mode: AccessMode,
    max_depth: usize,
    builtin_formats: bool,
    custom_formats: FormatRegistry,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            mode: AccessMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            builtin_formats: true,
            custom_formats: FormatRegistry::empty(),
        }
    }
}

impl ValidatorOptions {
    /// OAS 3.0, no read/write filtering, built-in formats enabled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_mode(mut self, mode: AccessMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Registers a format checker, replacing a built-in one of the same
    /// name.
    pub fn with_format(mut self, name: impl Into<String>, check: FormatCheck) -> Self {
        self.custom_formats.register(name, check);
        self
    }

    /// Disables the built-in format checkers. Formats registered with
    /// [`with_format`](Self::with_format) stay active.
    pub fn without_formats(mut self) -> Self {
        self.builtin_formats = false;
        self
    }

    /// Builds a validator owning `schema`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Malformed`] if `schema` is neither an object nor a
    /// boolean. Defects inside the schema surface when the keywords holding
    /// them are evaluated.
    pub fn build(self, schema: Value) -> Result<SchemaValidator, SchemaError> {
        if !(schema.is_object() || schema.is_boolean()) {
            return Err(SchemaError::Malformed {
                schema_path: Default::default(),
                reason: format!(
                    "a schema must be an object or a boolean, found {}",
                    oas_core::json_type_name(&schema)
                ),
            });
        }

        let mut formats = if self.builtin_formats {
            FormatRegistry::for_dialect(self.dialect)
        } else {
            FormatRegistry::empty()
        };
        formats.extend(&self.custom_formats);

        tracing::debug!(
            dialect = %self.dialect,
            mode = %self.mode,
            max_depth = self.max_depth,
            formats = formats.len(),
            "built schema validator"
        );

        Ok(SchemaValidator {
            schema,
            keywords: KeywordSet::for_dialect(self.dialect),
            formats,
            mode: self.mode,
            max_depth: self.max_depth,
        })
    }
}

/// A validator for one OpenAPI Schema Object.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    schema: Value,
    keywords: KeywordSet,
    formats: FormatRegistry,
    mode: AccessMode,
    max_depth: usize,
}

impl SchemaValidator {
    /// A validator for `schema` in `dialect` with default options.
    ///
    /// # Errors
    ///
    /// See [`ValidatorOptions::build`].
    pub fn new(schema: Value, dialect: Dialect) -> Result<Self, SchemaError> {
        Self::options().with_dialect(dialect).build(schema)
    }

    /// Starts a [`ValidatorOptions`] builder.
    pub fn options() -> ValidatorOptions {
        ValidatorOptions::new()
    }

    /// A validator for `schema` configured by `config`.
    ///
    /// # Errors
    ///
    /// See [`ValidatorOptions::build`].
    pub fn from_config(schema: Value, config: ValidatorConfig) -> Result<Self, SchemaError> {
        ValidatorOptions::from(config).build(schema)
    }

    /// The root schema.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn dialect(&self) -> Dialect {
        self.keywords.dialect()
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Lazily yields the errors of `instance`. Nothing is evaluated until
    /// the iterator is polled; an `Err` item means the schema is defective
    /// and the stream should not be consumed further.
    pub fn iter_errors<'a>(&'a self, instance: &'a Value) -> ErrorIterator<'a> {
        Evaluator::new(&self.keywords, &self.formats, &self.schema, self.mode, self.max_depth)
            .iter_errors(&self.schema, instance, Scope::root())
    }

    /// Collects every error of `instance`.
    ///
    /// # Errors
    ///
    /// The first [`SchemaError`] met during evaluation.
    pub fn validate(&self, instance: &Value) -> Result<Vec<ValidationError>, SchemaError> {
        self.iter_errors(instance).collect()
    }

    /// Returns whether `instance` is valid, stopping at the first error.
    ///
    /// # Errors
    ///
    /// A [`SchemaError`] met before the first validation error.
    pub fn is_valid(&self, instance: &Value) -> Result<bool, SchemaError> {
        match self.iter_errors(instance).next() {
            None => Ok(true),
            Some(Ok(_)) => Ok(false),
            Some(Err(err)) => Err(err),
        }
    }

    /// Validates `instance`, failing with every violation found.
    ///
    /// # Errors
    ///
    /// [`OasError::ValidationFailed`] if the instance does not conform;
    /// [`OasError::Schema`] if the schema is defective.
    pub fn validate_document(&self, instance: &Value) -> Result<(), OasError> {
        let errors = self.validate(instance)?;
        if errors.is_empty() {
            return Ok(());
        }
        tracing::debug!(dialect = %self.dialect(), violations = errors.len(), "instance rejected");
        Err(OasError::ValidationFailed {
            violations: ValidationViolations::from(errors),
        })
    }
}

/// Validates `instance` against `schema` in `dialect` with default options.
///
/// # Errors
///
/// As for [`SchemaValidator::validate_document`].
pub fn validate(instance: &Value, schema: &Value, dialect: Dialect) -> Result<(), OasError> {
    SchemaValidator::new(schema.clone(), dialect)?.validate_document(instance)
}

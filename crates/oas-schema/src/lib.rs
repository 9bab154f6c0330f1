//! # oas-schema — OpenAPI Schema Object Validation
//!
//! Validates in-memory JSON values against OpenAPI Schema Objects in two
//! dialects:
//!
//! - **OAS 3.0**: JSON Schema draft4 vocabulary plus `nullable`,
//!   `readOnly`/`writeOnly`, `discriminator` and friends. `type` is a single
//!   token; `$ref` replaces its sibling keywords.
//! - **OAS 3.1**: JSON Schema 2020-12 vocabulary with the OpenAPI
//!   annotations. `null` is a type and `$ref` coexists with siblings.
//!
//! ## Architecture
//!
//! One recursive-descent [`evaluator`] serves both dialects. A dialect is a
//! [`KeywordSet`] (keyword name to validator function), a [`TypeChecker`]
//! and a [`FormatRegistry`]; nothing else differs. Same-document `$ref`s are
//! resolved by the [`resolver`].
//!
//! Errors stream lazily: a caller that only needs a yes/no answer stops at
//! the first one and most of the schema is never visited.
//!
//! ## Example
//!
//! ```
//! use oas_schema::{AccessMode, Dialect, SchemaValidator};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "required": ["id", "name"],
//!     "properties": {
//!         "id": {"type": "integer", "readOnly": true},
//!         "name": {"type": "string", "nullable": true}
//!     }
//! });
//!
//! let request = SchemaValidator::options()
//!     .with_dialect(Dialect::Oas30)
//!     .with_mode(AccessMode::Write)
//!     .build(schema)
//!     .unwrap();
//! assert!(request.is_valid(&json!({"name": null})).unwrap());
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `oas-core` internally.
//! - Keyword validators never panic; every schema defect is a
//!   [`SchemaError`] carrying its location.

pub mod config;
pub mod evaluator;
pub mod format;
pub mod keywords;
pub mod resolver;
pub mod types;
pub mod validate;

pub use config::ValidatorConfig;
pub use evaluator::{ErrorIterator, Evaluator, Scope};
pub use format::{FormatCheck, FormatRegistry};
pub use keywords::{KeywordFn, KeywordSet};
pub use resolver::Resolver;
pub use types::TypeChecker;
pub use validate::{validate, SchemaValidator, ValidatorOptions, DEFAULT_MAX_DEPTH};

pub use oas_core::{
    AccessMode, ConfigError, Dialect, Location, OasError, PathChunk, ResolutionError, SchemaError,
    ValidationError, ValidationViolations,
};

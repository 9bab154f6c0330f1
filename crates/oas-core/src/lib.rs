//! # oas-core — Foundational Types for OpenAPI Schema Validation
//!
//! This crate is the leaf of the workspace. It defines the vocabulary shared
//! by the validation engine and its callers without depending on the engine
//! itself.
//!
//! ## Key Design Principles
//!
//! 1. **Two disjoint error classes.** [`ValidationError`] is plain data
//!    describing an instance that does not conform. [`SchemaError`] (and its
//!    [`ResolutionError`] subclass) describes a structural defect in the
//!    schema and aborts the current validation call. The two never mix.
//!
//! 2. **Locations are index chains.** [`Location`] is a sequence of object
//!    keys and array indices, displayed as an RFC 6901 JSON pointer. Every
//!    location produced by the engine indexes into the caller's instance or
//!    schema document.
//!
//! 3. **Dialect and read/write context are closed enums.** [`Dialect`] is
//!    either OAS 3.0 or OAS 3.1; [`AccessMode`] is `None`, `Read` or `Write`.
//!    Both are selected once per validator and never change mid-call.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `oas-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod dialect;
pub mod error;
pub mod location;
pub mod value;
pub mod violation;

// Re-export primary types for ergonomic imports.
pub use dialect::{AccessMode, Dialect};
pub use error::{ConfigError, OasError, ResolutionError, SchemaError};
pub use location::{Location, PathChunk};
pub use value::{equal, json_type_name};
pub use violation::{ValidationError, ValidationViolations};

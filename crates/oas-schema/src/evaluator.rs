//! # Evaluator — Recursive-Descent Core
//!
//! Walks a schema and an instance in lockstep. For each schema node it asks
//! the dialect's [`KeywordSet`] which keywords apply, runs their validators
//! in declared order, and chains the resulting error streams.
//!
//! ## Laziness
//!
//! Every validator returns an [`ErrorIterator`]: a boxed iterator that does
//! no work until polled. Applicators that simply concatenate (`allOf`,
//! `properties`, `items`, `$ref`) descend lazily, so a caller that stops
//! after the first error never evaluates the rest of the tree. Counting
//! applicators (`oneOf`, `anyOf`, `not`, `if`, `contains`, `unevaluated*`)
//! must evaluate their branches before deciding and do so eagerly.
//!
//! ## Per-call State
//!
//! The [`Evaluator`] is `Copy` and holds only shared references to
//! immutable data. Everything that changes during descent lives in the
//! [`Scope`] value: the instance and schema locations, the chain of
//! references entered since the instance location last changed, and the
//! instance nesting depth. Each descent derives a new scope; nothing is mutated, so
//! one validator can serve concurrent calls without locking.

use std::iter;

use oas_core::{
    AccessMode, Dialect, Location, PathChunk, ResolutionError, SchemaError, ValidationError,
};
use serde_json::Value;

use crate::format::FormatRegistry;
use crate::keywords::KeywordSet;
use crate::resolver::Resolver;
use crate::types::TypeChecker;

/// Lazy stream of validation errors; an `Err` item aborts the call.
pub type ErrorIterator<'a> = Box<dyn Iterator<Item = Result<ValidationError, SchemaError>> + 'a>;

/// An iterator that yields nothing.
pub fn no_error<'a>() -> ErrorIterator<'a> {
    Box::new(iter::empty())
}

/// An iterator that yields exactly `item`.
pub fn single<'a>(item: Result<ValidationError, SchemaError>) -> ErrorIterator<'a> {
    Box::new(iter::once(item))
}

/// An iterator over already-computed results.
pub fn eager<'a>(items: Vec<Result<ValidationError, SchemaError>>) -> ErrorIterator<'a> {
    Box::new(items.into_iter())
}

/// Position of the evaluation within the instance and the schema.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    instance_path: Location,
    schema_path: Location,
    references: Vec<String>,
    depth: usize,
}

impl Scope {
    /// The scope of a top-level call.
    pub fn root() -> Self {
        Self::default()
    }

    /// Location within the instance.
    pub fn instance_path(&self) -> &Location {
        &self.instance_path
    }

    /// Location within the schema.
    pub fn schema_path(&self) -> &Location {
        &self.schema_path
    }

    /// Number of instance steps taken from the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// References entered since the instance location last changed.
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Steps into the schema.
    pub fn schema(&self, chunk: impl Into<PathChunk>) -> Self {
        Self {
            schema_path: self.schema_path.join(chunk),
            ..self.clone()
        }
    }

    /// Steps out of the current keyword to the schema node holding it.
    pub fn node(&self) -> Self {
        Self {
            schema_path: self.schema_path.parent().unwrap_or_default(),
            ..self.clone()
        }
    }

    /// Replaces the last schema step with `keyword`, e.g. moving from `if`
    /// to its sibling `then`.
    pub fn sibling(&self, keyword: &str) -> Self {
        self.node().schema(keyword)
    }

    /// Steps into the instance. Consuming instance structure resets the
    /// reference chain: a recursive reference below this point makes
    /// progress and cannot loop forever.
    pub fn instance(&self, chunk: impl Into<PathChunk>) -> Self {
        Self {
            instance_path: self.instance_path.join(chunk),
            schema_path: self.schema_path.clone(),
            references: Vec::new(),
            depth: self.depth + 1,
        }
    }

    /// Stays at the current instance location while evaluating a value
    /// derived from it, such as a property name. The value is a new
    /// instance, so the reference chain starts over.
    pub fn derived(&self) -> Self {
        Self {
            references: Vec::new(),
            ..self.clone()
        }
    }

    /// Records entry into `reference` and moves the schema location to its
    /// target.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::Cycle`] if `reference` was already entered at this
    /// instance location.
    pub fn enter_reference(
        &self,
        reference: &str,
        target: Location,
    ) -> Result<Self, ResolutionError> {
        let mut references = self.references.clone();
        references.push(reference.to_string());
        if self.references.iter().any(|r| r == reference) {
            return Err(ResolutionError::Cycle {
                reference: reference.to_string(),
                chain: references,
            });
        }
        Ok(Self {
            instance_path: self.instance_path.clone(),
            schema_path: target,
            references,
            depth: self.depth,
        })
    }

    /// Builds a validation error at this scope.
    pub fn error(&self, keyword: &str, instance: &Value, message: impl Into<String>) -> ValidationError {
        ValidationError {
            message: message.into(),
            keyword: keyword.to_string(),
            instance_path: self.instance_path.clone(),
            schema_path: self.schema_path.clone(),
            instance: instance.clone(),
            context: Vec::new(),
        }
    }

    /// Builds a malformed-schema error at this scope.
    pub fn malformed(&self, reason: impl Into<String>) -> SchemaError {
        SchemaError::Malformed {
            schema_path: self.schema_path.clone(),
            reason: reason.into(),
        }
    }
}

/// Shared, immutable evaluation context for one validator.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    keywords: &'a KeywordSet,
    formats: &'a FormatRegistry,
    resolver: Resolver<'a>,
    types: TypeChecker,
    mode: AccessMode,
    max_depth: usize,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator over `root`.
    pub fn new(
        keywords: &'a KeywordSet,
        formats: &'a FormatRegistry,
        root: &'a Value,
        mode: AccessMode,
        max_depth: usize,
    ) -> Self {
        Self {
            keywords,
            formats,
            resolver: Resolver::new(root),
            types: TypeChecker::for_dialect(keywords.dialect()),
            mode,
            max_depth,
        }
    }

    /// The dialect being evaluated.
    pub fn dialect(&self) -> Dialect {
        self.keywords.dialect()
    }

    /// The read/write context.
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// The dialect's type checker.
    pub fn types(&self) -> TypeChecker {
        self.types
    }

    /// Registered format checkers.
    pub fn formats(&self) -> &'a FormatRegistry {
        self.formats
    }

    /// Lazily validates `instance` against `schema` at `scope`.
    pub fn iter_errors(self, schema: &'a Value, instance: &'a Value, scope: Scope) -> ErrorIterator<'a> {
        if scope.depth > self.max_depth {
            return single(Err(ResolutionError::DepthExceeded {
                limit: self.max_depth,
                schema_path: scope.schema_path,
            }
            .into()));
        }

        let node = match schema {
            Value::Bool(true) => return no_error(),
            Value::Bool(false) => {
                return single(Ok(scope.error(
                    "false",
                    instance,
                    format!("False schema does not allow {instance}"),
                )))
            }
            Value::Object(node) => node,
            other => {
                return single(Err(scope.malformed(format!(
                    "a schema must be an object or a boolean, found {}",
                    oas_core::json_type_name(other)
                ))))
            }
        };

        let applicable = self.keywords.applicable(node);
        Box::new(applicable.into_iter().flat_map(move |(keyword, value, validate)| {
            validate(self, &scope.schema(keyword), value, instance, node)
        }))
    }

    /// Validates a subschema at `scope`.
    pub fn descend(self, schema: &'a Value, instance: &'a Value, scope: Scope) -> ErrorIterator<'a> {
        self.iter_errors(schema, instance, scope)
    }

    /// Eagerly collects every error, or the first fatal one.
    pub fn collect(
        self,
        schema: &'a Value,
        instance: &'a Value,
        scope: Scope,
    ) -> Result<Vec<ValidationError>, SchemaError> {
        self.descend(schema, instance, scope).collect()
    }

    /// Returns whether `instance` passes, stopping at the first error.
    pub fn is_valid(self, schema: &'a Value, instance: &'a Value, scope: Scope) -> Result<bool, SchemaError> {
        match self.descend(schema, instance, scope).next() {
            None => Ok(true),
            Some(Ok(_)) => Ok(false),
            Some(Err(err)) => Err(err),
        }
    }

    /// Follows a same-document reference, returning its target and the
    /// scope positioned at the target.
    ///
    /// # Errors
    ///
    /// Any [`ResolutionError`]: unresolvable, external, or a cycle.
    pub fn follow(self, reference: &str, scope: &Scope) -> Result<(&'a Value, Scope), SchemaError> {
        let (target, location) = self.resolver.resolve(reference)?;
        let scope = scope.enter_reference(reference, location)?;
        Ok((target, scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(dialect: Dialect, schema: &Value, instance: &Value) -> Result<Vec<ValidationError>, SchemaError> {
        let keywords = KeywordSet::for_dialect(dialect);
        let formats = FormatRegistry::for_dialect(dialect);
        let ev = Evaluator::new(&keywords, &formats, schema, AccessMode::None, 64);
        ev.iter_errors(schema, instance, Scope::root()).collect()
    }

    #[test]
    fn test_boolean_schemas() {
        assert!(run(Dialect::Oas31, &json!(true), &json!(1)).unwrap().is_empty());
        let errors = run(Dialect::Oas31, &json!(false), &json!(1)).unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("False schema"));
    }

    #[test]
    fn test_non_schema_value_is_fatal() {
        let err = run(Dialect::Oas30, &json!(3), &json!(1)).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }));
    }

    #[test]
    fn test_errors_follow_declared_keyword_order() {
        let schema = json!({"minLength": 5, "pattern": "^[0-9]+$", "type": "string"});
        let errors = run(Dialect::Oas30, &schema, &json!("abc")).unwrap();
        let keywords: Vec<&str> = errors.iter().map(|e| e.keyword.as_str()).collect();
        assert_eq!(keywords, ["minLength", "pattern"]);
    }

    #[test]
    fn test_schema_path_ends_with_keyword() {
        let schema = json!({"properties": {"age": {"type": "integer"}}});
        let errors = run(Dialect::Oas30, &schema, &json!({"age": "x"})).unwrap();
        assert_eq!(errors[0].schema_path.to_string(), "/properties/age/type");
        assert_eq!(errors[0].instance_path.to_string(), "/age");
    }

    #[test]
    fn test_lazy_iteration_stops_early() {
        let schema = json!({"allOf": [{"type": "string"}, {"$ref": "#/missing"}]});
        let keywords = KeywordSet::for_dialect(Dialect::Oas30);
        let formats = FormatRegistry::empty();
        let ev = Evaluator::new(&keywords, &formats, &schema, AccessMode::None, 64);
        let instance = json!(1);
        let mut errors = ev.iter_errors(&schema, &instance, Scope::root());
        // The first branch fails before the broken reference is touched.
        assert!(matches!(errors.next(), Some(Ok(_))));
        assert!(matches!(errors.next(), Some(Err(_))));
    }

    #[test]
    fn test_depth_limit_counts_instance_levels() {
        let schema = json!({"items": {"items": {"items": {"type": "string"}}}});
        let keywords = KeywordSet::for_dialect(Dialect::Oas30);
        let formats = FormatRegistry::empty();
        let ev = Evaluator::new(&keywords, &formats, &schema, AccessMode::None, 2);
        let instance = json!([[["a"]]]);
        let result: Result<Vec<_>, _> = ev.iter_errors(&schema, &instance, Scope::root()).collect();
        assert!(matches!(
            result,
            Err(SchemaError::Resolution(ResolutionError::DepthExceeded { limit: 2, .. }))
        ));

        // Schema nesting at one instance location does not count.
        let nested = json!({"allOf": [{"allOf": [{"allOf": [{"type": "string"}]}]}]});
        let ev = Evaluator::new(&keywords, &formats, &nested, AccessMode::None, 2);
        let errors: Result<Vec<_>, _> = ev.iter_errors(&nested, &instance, Scope::root()).collect();
        assert_eq!(errors.unwrap().len(), 1);
    }

    #[test]
    fn test_scope_reference_chain_resets_on_instance_step() {
        let scope = Scope::root()
            .enter_reference("#/definitions/node", Location::new().join("definitions").join("node"))
            .unwrap();
        assert!(scope
            .enter_reference("#/definitions/node", Location::new())
            .is_err());
        let child = scope.instance("children").instance(0usize);
        assert!(child.references().is_empty());
        assert!(child
            .enter_reference("#/definitions/node", Location::new())
            .is_ok());
    }

    #[test]
    fn test_scope_derived_keeps_instance_path() {
        let scope = Scope::root()
            .instance("pets")
            .enter_reference("#/$defs/name", Location::new())
            .unwrap();
        let derived = scope.derived();
        assert_eq!(derived.instance_path().to_string(), "/pets");
        assert_eq!(derived.depth(), 1);
        assert!(derived.references().is_empty());
    }

    #[test]
    fn test_scope_sibling() {
        let scope = Scope::root().schema("if");
        assert_eq!(scope.sibling("then").schema_path().to_string(), "/then");
    }
}

//! # Keyword Validator Sets
//!
//! A [`KeywordSet`] is an immutable table from keyword name to validator
//! function. The evaluator is a single recursive loop over this table; the
//! dialects differ only in which table they are handed.
//!
//! Tables are built as data transformations:
//!
//! 1. Start from a JSON Schema baseline ([`KeywordSet::draft4`] or
//!    [`KeywordSet::draft202012`]).
//! 2. Apply OpenAPI overrides with [`KeywordSet::with`]. An override replaces
//!    the baseline entry outright; there is no chaining to the replaced
//!    function.
//!
//! Keywords mapped to [`oas::not_implemented`] are accepted but never
//! enforced (`discriminator`, `xml`, `externalDocs`, `example`, and
//! `deprecated` or `description` depending on the dialect). A malformed
//! `discriminator` therefore passes silently; this matches the behavior
//! OpenAPI tooling has always had and is kept for compatibility.

use std::collections::BTreeMap;
use std::fmt;

use oas_core::{Dialect, SchemaError};
use serde_json::{Map, Value};

use crate::evaluator::{ErrorIterator, Evaluator, Scope};

/// Returns the fatal error as the whole error stream.
macro_rules! try_schema {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(err) => return $crate::evaluator::single(Err(err.into())),
        }
    };
}

pub mod applicator;
pub mod array;
pub mod assertion;
pub mod oas;
pub mod object;
pub mod unevaluated;

/// Signature shared by every keyword validator.
///
/// Arguments: the evaluator, the scope positioned at the keyword, the
/// keyword's value, the instance, and the schema node holding the keyword
/// (for sibling lookups such as `nullable` or `properties`).
pub type KeywordFn = for<'a> fn(
    Evaluator<'a>,
    &Scope,
    &'a Value,
    &'a Value,
    &'a Map<String, Value>,
) -> ErrorIterator<'a>;

/// An immutable keyword-to-validator table for one dialect.
#[derive(Clone)]
pub struct KeywordSet {
    dialect: Dialect,
    validators: BTreeMap<&'static str, KeywordFn>,
    modifiers: Vec<&'static str>,
    ref_overrides_siblings: bool,
}

impl KeywordSet {
    /// The table for `dialect`.
    pub fn for_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Oas30 => Self::oas30(),
            Dialect::Oas31 => Self::oas31(),
        }
    }

    /// JSON Schema draft4 baseline, restricted to the vocabulary OpenAPI
    /// 3.0 adopts. `$ref` replaces its siblings.
    pub fn draft4() -> Self {
        Self {
            dialect: Dialect::Oas30,
            validators: BTreeMap::new(),
            modifiers: Vec::new(),
            ref_overrides_siblings: true,
        }
        .with("multipleOf", assertion::multiple_of)
        .with("maximum", assertion::maximum_draft4)
        .with("minimum", assertion::minimum_draft4)
        .with("maxLength", assertion::max_length)
        .with("minLength", assertion::min_length)
        .with("pattern", assertion::pattern)
        .with("maxItems", array::max_items)
        .with("minItems", array::min_items)
        .with("uniqueItems", array::unique_items)
        .with("maxProperties", object::max_properties)
        .with("minProperties", object::min_properties)
        .with("enum", assertion::enumeration)
        .with("type", assertion::type_)
        .with("allOf", applicator::all_of)
        .with("oneOf", applicator::one_of)
        .with("anyOf", applicator::any_of)
        .with("not", applicator::not)
        .with("items", array::items_draft4)
        .with("properties", object::properties)
        .with("required", object::required)
        .with("additionalProperties", object::additional_properties)
        .with("format", assertion::format)
        .with("$ref", applicator::reference)
    }

    /// JSON Schema draft 2020-12 baseline. `$ref` coexists with siblings.
    pub fn draft202012() -> Self {
        Self {
            dialect: Dialect::Oas31,
            validators: BTreeMap::new(),
            modifiers: Vec::new(),
            ref_overrides_siblings: false,
        }
        .with("$ref", applicator::reference)
        .with("$dynamicRef", applicator::reference)
        .with("additionalProperties", object::additional_properties)
        .with("allOf", applicator::all_of)
        .with("anyOf", applicator::any_of)
        .with("const", assertion::constant)
        .with("contains", array::contains)
        .with("dependentRequired", object::dependent_required)
        .with("dependentSchemas", applicator::dependent_schemas)
        .with("enum", assertion::enumeration)
        .with("exclusiveMaximum", assertion::exclusive_maximum)
        .with("exclusiveMinimum", assertion::exclusive_minimum)
        .with("format", assertion::format)
        .with("if", applicator::if_then_else)
        .with("items", array::items)
        .with("maxItems", array::max_items)
        .with("maxLength", assertion::max_length)
        .with("maxProperties", object::max_properties)
        .with("maximum", assertion::maximum)
        .with("minItems", array::min_items)
        .with("minLength", assertion::min_length)
        .with("minProperties", object::min_properties)
        .with("minimum", assertion::minimum)
        .with("multipleOf", assertion::multiple_of)
        .with("not", applicator::not)
        .with("oneOf", applicator::one_of)
        .with("pattern", assertion::pattern)
        .with("patternProperties", object::pattern_properties)
        .with("prefixItems", array::prefix_items)
        .with("properties", object::properties)
        .with("propertyNames", object::property_names)
        .with("required", object::required)
        .with("type", assertion::type_)
        .with("unevaluatedItems", unevaluated::unevaluated_items)
        .with("unevaluatedProperties", unevaluated::unevaluated_properties)
        .with("uniqueItems", array::unique_items)
    }

    /// OpenAPI 3.0 Schema Object.
    pub fn oas30() -> Self {
        Self::draft4()
            .with("type", oas::type_nullable)
            .with("items", oas::items_single)
            .with("properties", oas::properties)
            .with("required", oas::required)
            .with("additionalProperties", oas::additional_properties)
            .with("format", oas::format)
            .with("nullable", oas::nullable)
            .with("readOnly", oas::read_only)
            .with("writeOnly", oas::write_only)
            .with("discriminator", oas::not_implemented)
            .with("xml", oas::not_implemented)
            .with("externalDocs", oas::not_implemented)
            .with("example", oas::not_implemented)
            .with("deprecated", oas::not_implemented)
            .with_modifier("nullable")
    }

    /// OpenAPI 3.1 Schema Object.
    pub fn oas31() -> Self {
        Self::draft202012()
            .with("properties", oas::properties)
            .with("required", oas::required)
            .with("additionalProperties", oas::additional_properties)
            .with("format", oas::format)
            .with("description", oas::not_implemented)
            .with("discriminator", oas::not_implemented)
            .with("xml", oas::not_implemented)
            .with("externalDocs", oas::not_implemented)
            .with("example", oas::not_implemented)
    }

    /// Returns a copy with `keyword` mapped to `validate`, replacing any
    /// existing entry.
    pub fn with(mut self, keyword: &'static str, validate: KeywordFn) -> Self {
        self.validators.insert(keyword, validate);
        self
    }

    /// Returns a copy without `keyword`.
    pub fn without(mut self, keyword: &str) -> Self {
        self.validators.remove(keyword);
        self
    }

    /// Marks `keyword` as consulted by sibling validators only. It stays in
    /// the table but is never run as an independent check.
    pub fn with_modifier(mut self, keyword: &'static str) -> Self {
        if !self.modifiers.contains(&keyword) {
            self.modifiers.push(keyword);
        }
        self
    }

    /// The dialect this table implements.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns the validator for `keyword`, if any.
    pub fn get(&self, keyword: &str) -> Option<KeywordFn> {
        self.validators.get(keyword).copied()
    }

    /// Returns true if `keyword` has a validator.
    pub fn contains(&self, keyword: &str) -> bool {
        self.validators.contains_key(keyword)
    }

    /// Every keyword with a validator, sorted.
    pub fn keywords(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.validators.keys().copied()
    }

    /// Returns true if `$ref` replaces its sibling keywords.
    pub fn ref_overrides_siblings(&self) -> bool {
        self.ref_overrides_siblings
    }

    /// The keywords of `node` to run, in declared order.
    ///
    /// When `$ref` overrides siblings and is present, it is the only
    /// applicable keyword. Modifiers and keywords without a validator are
    /// skipped.
    pub fn applicable<'a>(&self, node: &'a Map<String, Value>) -> Vec<(&'a str, &'a Value, KeywordFn)> {
        if self.ref_overrides_siblings {
            if let (Some(reference), Some(validate)) = (node.get("$ref"), self.get("$ref")) {
                if node.len() > 1 {
                    tracing::debug!(
                        dialect = %self.dialect,
                        siblings = node.len() - 1,
                        "$ref present; sibling keywords are ignored"
                    );
                }
                return vec![("$ref", reference, validate)];
            }
        }

        node.iter()
            .filter(|(keyword, _)| !self.modifiers.contains(&keyword.as_str()))
            .filter_map(|(keyword, value)| {
                self.get(keyword)
                    .map(|validate| (keyword.as_str(), value, validate))
            })
            .collect()
    }
}

impl fmt::Debug for KeywordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordSet")
            .field("dialect", &self.dialect)
            .field("keywords", &self.validators.keys().collect::<Vec<_>>())
            .field("modifiers", &self.modifiers)
            .field("ref_overrides_siblings", &self.ref_overrides_siblings)
            .finish()
    }
}

// -- Shared helpers for keyword values ------------------------------------

/// The keyword value as an array.
pub(crate) fn expect_array<'a>(
    scope: &Scope,
    value: &'a Value,
    what: &str,
) -> Result<&'a Vec<Value>, SchemaError> {
    value.as_array().ok_or_else(|| {
        scope.malformed(format!(
            "expected an array of {what}, found {}",
            oas_core::json_type_name(value)
        ))
    })
}

/// The keyword value as a non-empty array of schemas.
pub(crate) fn expect_schemas<'a>(scope: &Scope, value: &'a Value) -> Result<&'a Vec<Value>, SchemaError> {
    let schemas = expect_array(scope, value, "schemas")?;
    if schemas.is_empty() {
        return Err(scope.malformed("expected a non-empty array of schemas"));
    }
    Ok(schemas)
}

/// The keyword value as an object.
pub(crate) fn expect_object<'a>(
    scope: &Scope,
    value: &'a Value,
) -> Result<&'a Map<String, Value>, SchemaError> {
    value.as_object().ok_or_else(|| {
        scope.malformed(format!(
            "expected an object, found {}",
            oas_core::json_type_name(value)
        ))
    })
}

/// The keyword value as a non-negative integer.
pub(crate) fn expect_count(scope: &Scope, value: &Value) -> Result<u64, SchemaError> {
    if let Some(count) = value.as_u64() {
        return Ok(count);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
        _ => Err(scope.malformed(format!("expected a non-negative integer, found {value}"))),
    }
}

/// The keyword value as a number.
pub(crate) fn expect_number(scope: &Scope, value: &Value) -> Result<f64, SchemaError> {
    value
        .as_f64()
        .ok_or_else(|| scope.malformed(format!("expected a number, found {value}")))
}

/// The keyword value as an array of strings.
pub(crate) fn expect_strings<'a>(scope: &Scope, value: &'a Value) -> Result<Vec<&'a str>, SchemaError> {
    expect_array(scope, value, "strings")?
        .iter()
        .map(|item| {
            item.as_str()
                .ok_or_else(|| scope.malformed(format!("expected an array of strings, found item {item}")))
        })
        .collect()
}

/// Compiles a pattern or reports it as a schema defect.
pub(crate) fn compile_pattern(scope: &Scope, pattern: &str) -> Result<regex::Regex, SchemaError> {
    regex::Regex::new(pattern).map_err(|e| {
        tracing::warn!(pattern, schema_path = %scope.schema_path(), "pattern does not compile");
        SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            schema_path: scope.schema_path().clone(),
            reason: e.to_string(),
        }
    })
}

/// `"a" was` or `"a", "b" were`, for additional-property messages.
pub(crate) fn extras_message(extras: &[&str]) -> String {
    let quoted: Vec<String> = extras.iter().map(|e| format!("{e:?}")).collect();
    let verb = if extras.len() == 1 { "was" } else { "were" };
    format!("{} {verb}", quoted.join(", "))
}

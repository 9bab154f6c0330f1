//! # Format Registry
//!
//! Maps `format` names to predicate functions. Formats are advisory in the
//! sense that an unregistered name always passes; a registered one runs its
//! checker.
//!
//! Each checker only judges instances of the JSON type it is about: a
//! string format ignores numbers and an integer format ignores strings. Type
//! agreement is the `type` keyword's job.
//!
//! ## Built-in formats
//!
//! | format | dialects | check |
//! |--------|----------|-------|
//! | `date-time` | both | RFC 3339 (`chrono`) |
//! | `date` | both | `YYYY-MM-DD` (`chrono`) |
//! | `email` | both | contains `@` |
//! | `hostname` | both | RFC 1123 labels |
//! | `ipv4`, `ipv6` | both | `std::net` parsers |
//! | `uri` | both | absolute URI (`url`) |
//! | `regex` | both | compiles (`regex`) |
//! | `int32`, `int64` | both | integer range |
//! | `float`, `double`, `password` | both | always |
//! | `byte` | OAS 3.0 | standard base64 (`base64`) |
//! | `binary` | OAS 3.0 | always |
//! | `uuid` | OAS 3.1 | hyphenated UUID (`uuid`) |
//! | `time` | OAS 3.1 | RFC 3339 full-time |
//! | `uri-reference` | OAS 3.1 | absolute or relative URI |

use std::collections::HashMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use base64::Engine;
use oas_core::Dialect;
use serde_json::Value;

/// A format predicate. Returns true when the instance conforms.
pub type FormatCheck = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Extensible mapping from format name to checker.
#[derive(Clone, Default)]
pub struct FormatRegistry {
    checkers: HashMap<String, FormatCheck>,
}

impl FormatRegistry {
    /// A registry with no formats; every format passes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in formats of `dialect`.
    pub fn for_dialect(dialect: Dialect) -> Self {
        let mut registry = Self::empty()
            .with("date-time", string_check(is_date_time))
            .with("date", string_check(is_date))
            .with("email", string_check(|s| s.contains('@')))
            .with("hostname", string_check(is_hostname))
            .with("ipv4", string_check(|s| s.parse::<Ipv4Addr>().is_ok()))
            .with("ipv6", string_check(|s| s.parse::<Ipv6Addr>().is_ok()))
            .with("uri", string_check(|s| url::Url::parse(s).is_ok()))
            .with("regex", string_check(|s| regex::Regex::new(s).is_ok()))
            .with("int32", Arc::new(|v: &Value| in_integer_range(v, i32::MIN.into(), i32::MAX.into())))
            .with("int64", Arc::new(|v: &Value| in_integer_range(v, i64::MIN, i64::MAX)))
            .with("float", always())
            .with("double", always())
            .with("password", always());

        match dialect {
            Dialect::Oas30 => {
                registry = registry
                    .with("byte", string_check(is_base64))
                    .with("binary", always());
            }
            Dialect::Oas31 => {
                registry = registry
                    .with("uuid", string_check(is_uuid))
                    .with("time", string_check(is_time))
                    .with("uri-reference", string_check(is_uri_reference));
            }
        }
        registry
    }

    /// Registers `check` under `name`, replacing any previous checker.
    pub fn register(&mut self, name: impl Into<String>, check: FormatCheck) {
        self.checkers.insert(name.into(), check);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, name: impl Into<String>, check: FormatCheck) -> Self {
        self.register(name, check);
        self
    }

    /// Copies every checker of `other` into `self`, replacing duplicates.
    pub fn extend(&mut self, other: &FormatRegistry) {
        for (name, check) in &other.checkers {
            self.checkers.insert(name.clone(), Arc::clone(check));
        }
    }

    /// Returns true if `name` has a checker.
    pub fn contains(&self, name: &str) -> bool {
        self.checkers.contains_key(name)
    }

    /// Number of registered formats.
    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    /// Returns true if no formats are registered.
    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }

    /// Runs the checker for `name`; unknown names pass.
    pub fn check(&self, name: &str, instance: &Value) -> bool {
        self.checkers
            .get(name)
            .map_or(true, |check| check(instance))
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.checkers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FormatRegistry").field("formats", &names).finish()
    }
}

fn always() -> FormatCheck {
    Arc::new(|_: &Value| true)
}

fn string_check(check: fn(&str) -> bool) -> FormatCheck {
    Arc::new(move |instance: &Value| instance.as_str().map_or(true, check))
}

fn in_integer_range(instance: &Value, min: i64, max: i64) -> bool {
    let Value::Number(n) = instance else {
        return true;
    };
    if let Some(i) = n.as_i64() {
        return (min..=max).contains(&i);
    }
    if n.as_u64().is_some() {
        // Larger than i64::MAX.
        return false;
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 => f >= min as f64 && f <= max as f64,
        _ => true,
    }
}

fn is_date_time(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

fn is_date(s: &str) -> bool {
    s.len() == 10 && chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn is_time(s: &str) -> bool {
    is_date_time(&format!("1970-01-01T{s}"))
}

fn is_hostname(s: &str) -> bool {
    let s = s.strip_suffix('.').unwrap_or(s);
    !s.is_empty()
        && s.len() <= 253
        && s.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

fn is_base64(s: &str) -> bool {
    base64::engine::general_purpose::STANDARD.decode(s).is_ok()
}

fn is_uuid(s: &str) -> bool {
    s.len() == 36 && uuid::Uuid::parse_str(s).is_ok()
}

fn is_uri_reference(s: &str) -> bool {
    if url::Url::parse(s).is_ok() {
        return true;
    }
    url::Url::parse("http://example.invalid/")
        .and_then(|base| base.join(s))
        .is_ok()
        && !s.chars().any(|c| c.is_whitespace())
}

//! # Reference Resolver
//!
//! Resolves same-document references against the root schema.
//!
//! Supported forms:
//!
//! - `#`: the root schema.
//! - `#/definitions/Pet`: an RFC 6901 JSON pointer, percent-decoded, with
//!   `~1` and `~0` unescaped per segment.
//! - `#Pet`: a plain-name fragment, matched against `$anchor` and
//!   `$dynamicAnchor` (OAS 3.1) or an `id`/`$id` of `#Pet`.
//!
//! References into other documents fail with [`ResolutionError::External`].
//! Cycle detection lives in [`Scope`](crate::evaluator::Scope), which
//! carries the chain of references entered since the instance location last
//! changed; the resolver itself is stateless and shared by every call.

use oas_core::{Location, PathChunk, ResolutionError};
use serde_json::Value;

/// Stateless resolver bound to one root schema.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    root: &'a Value,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver for `root`.
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// The root schema.
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// Resolves `reference` to the schema it addresses and that schema's
    /// location within the root document.
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::External`] for references to other documents.
    /// - [`ResolutionError::Unresolvable`] if a pointer segment is missing,
    ///   no anchor matches, or the target is not an object or boolean.
    pub fn resolve(&self, reference: &str) -> Result<(&'a Value, Location), ResolutionError> {
        let Some(fragment) = reference.strip_prefix('#') else {
            return Err(ResolutionError::External {
                reference: reference.to_string(),
            });
        };

        let (target, location) = if fragment.is_empty() {
            (self.root, Location::new())
        } else if fragment.starts_with('/') {
            self.resolve_pointer(reference, fragment)?
        } else {
            self.find_anchor(fragment)
                .ok_or_else(|| ResolutionError::Unresolvable {
                    reference: reference.to_string(),
                    reason: format!("no subschema declares anchor '{fragment}'"),
                })?
        };

        if !(target.is_object() || target.is_boolean()) {
            return Err(ResolutionError::Unresolvable {
                reference: reference.to_string(),
                reason: format!(
                    "target at '#{location}' is not a schema ({})",
                    oas_core::json_type_name(target)
                ),
            });
        }

        tracing::trace!(reference, target = %location, "resolved same-document reference");
        Ok((target, location))
    }

    fn resolve_pointer(
        &self,
        reference: &str,
        pointer: &str,
    ) -> Result<(&'a Value, Location), ResolutionError> {
        let mut current = self.root;
        let mut location = Location::new();

        for raw in pointer.split('/').skip(1) {
            let decoded = urlencoding::decode(raw).map_err(|e| ResolutionError::Unresolvable {
                reference: reference.to_string(),
                reason: format!("segment '{raw}' is not valid percent-encoded UTF-8: {e}"),
            })?;
            let segment = decoded.replace("~1", "/").replace("~0", "~");

            let (next, chunk) = match current {
                Value::Object(map) => (map.get(&segment), PathChunk::Key(segment.clone())),
                Value::Array(items) => match segment.parse::<usize>() {
                    Ok(index) => (items.get(index), PathChunk::Index(index)),
                    Err(_) => (None, PathChunk::Key(segment.clone())),
                },
                _ => (None, PathChunk::Key(segment.clone())),
            };

            current = next.ok_or_else(|| ResolutionError::Unresolvable {
                reference: reference.to_string(),
                reason: format!("segment '{segment}' does not exist at '#{location}'"),
            })?;
            location = location.join(chunk);
        }

        Ok((current, location))
    }

    /// Depth-first search for a subschema naming `anchor`.
    fn find_anchor(&self, anchor: &str) -> Option<(&'a Value, Location)> {
        let fragment_id = format!("#{anchor}");
        let mut stack = vec![(self.root, Location::new())];

        while let Some((value, location)) = stack.pop() {
            match value {
                Value::Object(map) => {
                    let declares = ["$anchor", "$dynamicAnchor"]
                        .iter()
                        .any(|k| map.get(*k).and_then(Value::as_str) == Some(anchor))
                        || ["id", "$id"]
                            .iter()
                            .any(|k| map.get(*k).and_then(Value::as_str) == Some(fragment_id.as_str()));
                    if declares {
                        return Some((value, location));
                    }
                    // Reverse so the search visits keys in declared order.
                    for (key, child) in map.iter().rev() {
                        if child.is_object() || child.is_array() {
                            stack.push((child, location.join(key.as_str())));
                        }
                    }
                }
                Value::Array(items) => {
                    for (index, child) in items.iter().enumerate().rev() {
                        stack.push((child, location.join(index)));
                    }
                }
                _ => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "definitions": {
                "Pet": {"type": "object", "properties": {"name": {"type": "string"}}},
                "a/b": {"type": "integer"},
                "tilde~name": {"type": "boolean"},
                "with space": {"type": "number"},
                "list": [{"type": "string"}, {"type": "null"}],
                "notASchema": 42,
                "Anchored": {"$anchor": "pet-id", "type": "string"}
            }
        })
    }

    #[test]
    fn test_resolve_root() {
        let doc = doc();
        let (target, location) = Resolver::new(&doc).resolve("#").unwrap();
        assert_eq!(target, &doc);
        assert!(location.is_root());
    }

    #[test]
    fn test_resolve_pointer() {
        let doc = doc();
        let (target, location) = Resolver::new(&doc).resolve("#/definitions/Pet").unwrap();
        assert_eq!(target["type"], "object");
        assert_eq!(location.to_string(), "/definitions/Pet");
        assert_eq!(location.resolve(&doc), Some(target));
    }

    #[test]
    fn test_resolve_escaped_segments() {
        let doc = doc();
        let resolver = Resolver::new(&doc);
        assert_eq!(resolver.resolve("#/definitions/a~1b").unwrap().0["type"], "integer");
        assert_eq!(resolver.resolve("#/definitions/tilde~0name").unwrap().0["type"], "boolean");
        assert_eq!(resolver.resolve("#/definitions/with%20space").unwrap().0["type"], "number");
    }

    #[test]
    fn test_resolve_array_index() {
        let doc = doc();
        let (target, location) = Resolver::new(&doc).resolve("#/definitions/list/1").unwrap();
        assert_eq!(target["type"], "null");
        assert_eq!(location.to_string(), "/definitions/list/1");
    }

    #[test]
    fn test_missing_segment_is_unresolvable() {
        let doc = doc();
        let err = Resolver::new(&doc).resolve("#/definitions/Owner").unwrap_err();
        match err {
            ResolutionError::Unresolvable { reference, reason } => {
                assert_eq!(reference, "#/definitions/Owner");
                assert!(reason.contains("Owner"));
            }
            other => panic!("Expected Unresolvable, got: {other}"),
        }
    }

    #[test]
    fn test_non_schema_target_is_unresolvable() {
        let doc = doc();
        let err = Resolver::new(&doc).resolve("#/definitions/notASchema").unwrap_err();
        assert!(err.to_string().contains("not a schema"));
    }

    #[test]
    fn test_external_reference_rejected() {
        let doc = doc();
        let err = Resolver::new(&doc).resolve("pets.yaml#/Pet").unwrap_err();
        assert!(matches!(err, ResolutionError::External { .. }));
    }

    #[test]
    fn test_anchor_lookup() {
        let doc = doc();
        let (target, location) = Resolver::new(&doc).resolve("#pet-id").unwrap();
        assert_eq!(target["type"], "string");
        assert_eq!(location.to_string(), "/definitions/Anchored");
    }

    #[test]
    fn test_legacy_id_fragment_lookup() {
        let doc = json!({"definitions": {"Tag": {"id": "#tag", "type": "string"}}});
        let (target, _) = Resolver::new(&doc).resolve("#tag").unwrap();
        assert_eq!(target["id"], "#tag");
    }

    #[test]
    fn test_unknown_anchor() {
        let doc = doc();
        assert!(Resolver::new(&doc).resolve("#missing").is_err());
    }
}

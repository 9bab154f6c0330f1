//! # Locations — Index Chains into Instances and Schemas
//!
//! A [`Location`] records how to reach a value from the root of a JSON
//! document: a sequence of object keys and array indices. Validation errors
//! carry two of them, one into the instance and one into the schema.
//!
//! Locations display as RFC 6901 JSON pointers (`/properties/name/type`),
//! with `~` and `/` inside keys escaped as `~0` and `~1`. The root location
//! displays as the empty string.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step of a [`Location`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathChunk {
    /// An array index.
    Index(usize),
    /// An object key.
    Key(String),
}

impl From<&str> for PathChunk {
    fn from(key: &str) -> Self {
        PathChunk::Key(key.to_string())
    }
}

impl From<String> for PathChunk {
    fn from(key: String) -> Self {
        PathChunk::Key(key)
    }
}

impl From<&String> for PathChunk {
    fn from(key: &String) -> Self {
        PathChunk::Key(key.clone())
    }
}

impl From<usize> for PathChunk {
    fn from(index: usize) -> Self {
        PathChunk::Index(index)
    }
}

impl fmt::Display for PathChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathChunk::Index(index) => write!(f, "{index}"),
            PathChunk::Key(key) => f.write_str(&key.replace('~', "~0").replace('/', "~1")),
        }
    }
}

/// An ordered chain of keys and indices from a document root.
///
/// Locations are immutable values: [`Location::join`] returns a new location
/// rather than extending the receiver, so a parent location can be shared by
/// many children during recursive descent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(Vec<PathChunk>);

impl Location {
    /// The root location.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns a new location with `chunk` appended.
    pub fn join(&self, chunk: impl Into<PathChunk>) -> Self {
        let mut chunks = self.0.clone();
        chunks.push(chunk.into());
        Self(chunks)
    }

    /// Returns the location one step up, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// The last chunk, if any.
    pub fn last(&self) -> Option<&PathChunk> {
        self.0.last()
    }

    /// Returns true for the root location.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the root location.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The chunks from root to leaf.
    pub fn chunks(&self) -> &[PathChunk] {
        &self.0
    }

    /// Follows this location from `root`, returning the addressed value.
    ///
    /// Returns `None` if a key is missing, an index is out of bounds, or a
    /// chunk kind does not match the value it is applied to.
    pub fn resolve<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        self.0.iter().try_fold(root, |current, chunk| match (chunk, current) {
            (PathChunk::Key(key), Value::Object(map)) => map.get(key),
            (PathChunk::Index(index), Value::Array(items)) => items.get(*index),
            _ => None,
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in &self.0 {
            write!(f, "/{chunk}")?;
        }
        Ok(())
    }
}

impl From<Vec<PathChunk>> for Location {
    fn from(chunks: Vec<PathChunk>) -> Self {
        Self(chunks)
    }
}

impl FromIterator<PathChunk> for Location {
    fn from_iter<I: IntoIterator<Item = PathChunk>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

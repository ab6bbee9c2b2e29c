//! Undirected-edge identity.
//!
//! `SectionKey` is the single internal representation of an undirected
//! connection: the two endpoint canonical keys, stored sorted. Directed
//! `(from, to)` pairs exist only at the serialization boundary — everything
//! inside the crate reasons about unordered pairs, which removes a whole
//! class of one-direction-missing inconsistencies.

use crate::{Error, Result};
use super::Point3;

/// Separator between the two canonical keys in the on-disk section key.
pub const SECTION_KEY_SEPARATOR: &str = "-";

/// An undirected edge, identified by its endpoint canonical keys.
///
/// Construction sorts the endpoints, so `new(u, v) == new(v, u)`. A key with
/// both endpoints equal is a self-loop (used for cross-system bridges).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionKey {
    a: String,
    b: String,
}

impl SectionKey {
    pub fn new(k1: impl Into<String>, k2: impl Into<String>) -> Self {
        let (k1, k2) = (k1.into(), k2.into());
        if k1 <= k2 {
            Self { a: k1, b: k2 }
        } else {
            Self { a: k2, b: k1 }
        }
    }

    pub fn of_points(u: &Point3, v: &Point3) -> Self {
        Self::new(u.canonical_key(), v.canonical_key())
    }

    /// Self-loop key at a single node (cross-system bridge).
    pub fn loop_at(key: impl Into<String>) -> Self {
        let k = key.into();
        Self { a: k.clone(), b: k }
    }

    /// Endpoint keys in sorted order.
    pub fn endpoints(&self) -> (&str, &str) {
        (&self.a, &self.b)
    }

    pub fn is_loop(&self) -> bool {
        self.a == self.b
    }

    /// True when `key` is one of the two endpoints.
    pub fn touches(&self, key: &str) -> bool {
        self.a == key || self.b == key
    }

    /// Parse the on-disk `"(x, y, z)-(x, y, z)"` form.
    ///
    /// Splits on the `)-(` boundary between the two parenthesized keys;
    /// a bare `-` is ambiguous because negative coordinates contain one.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let split_at = trimmed.find(")-(").ok_or_else(|| Error::MalformedCoordinate {
            input: input.to_string(),
            reason: "expected two parenthesized keys joined by '-'".to_string(),
        })?;
        let (left, right) = trimmed.split_at(split_at + 1);
        let right = &right[1..];

        // Validate both halves parse as coordinates.
        Point3::parse_key(left)?;
        Point3::parse_key(right)?;
        Ok(Self::new(left, right))
    }
}

impl std::fmt::Display for SectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.a, SECTION_KEY_SEPARATOR, self.b)
    }
}

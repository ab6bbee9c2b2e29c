//! 3D point with canonical-key and tolerance semantics.
//!
//! Two identity notions coexist and must not be confused:
//!
//! - **Canonical key**: the point formatted with exactly 3 decimals per axis,
//!   e.g. `"(0.500, 0.000, 12.250)"`. Used as the on-disk node identity and
//!   as a hash key. Points that differ past the 3rd decimal get different
//!   keys even when they are within tolerance of each other.
//! - **Tolerance identity**: two points are the same network node when their
//!   Euclidean distance is ≤ ε. This is the authority for every merge and
//!   lookup decision; the canonical key is a fast path only.

use serde::{Deserialize, Serialize};
use crate::{Error, Result};

/// A point in the routing network's 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Canonical on-disk key: 3 decimal digits per axis.
    ///
    /// Lossy by design. Canonical-key equality implies the points round to
    /// the same millimeter grid cell, nothing more.
    pub fn canonical_key(&self) -> String {
        format!("({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }

    /// Parse a `"(x, y, z)"` key back into a point.
    ///
    /// Accepts keys with or without spaces after the commas. Anything that
    /// is not a parenthesized triple of reals is a malformed-input error.
    pub fn parse_key(input: &str) -> Result<Point3> {
        let trimmed = input.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| Error::MalformedCoordinate {
                input: input.to_string(),
                reason: "expected parenthesized triple".to_string(),
            })?;

        let parts: Vec<&str> = inner.split(',').collect();
        if parts.len() != 3 {
            return Err(Error::MalformedCoordinate {
                input: input.to_string(),
                reason: format!("expected 3 components, found {}", parts.len()),
            });
        }

        let mut axes = [0.0f64; 3];
        for (slot, part) in axes.iter_mut().zip(&parts) {
            *slot = part.trim().parse().map_err(|_| Error::MalformedCoordinate {
                input: input.to_string(),
                reason: format!("invalid number {:?}", part.trim()),
            })?;
        }
        Ok(Point3::new(axes[0], axes[1], axes[2]))
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(v: [f64; 3]) -> Self {
        Point3::new(v[0], v[1], v[2])
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        [p.x, p.y, p.z]
    }
}

impl std::fmt::Display for Point3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_key_has_three_decimals() {
        let p = Point3::new(0.5, 0.0, 12.25);
        assert_eq!(p.canonical_key(), "(0.500, 0.000, 12.250)");
    }

    #[test]
    fn canonical_key_rounds_past_third_decimal() {
        let p = Point3::new(0.0004, 0.0006, -1.0);
        assert_eq!(p.canonical_key(), "(0.000, 0.001, -1.000)");
    }

    #[test]
    fn parse_key_roundtrip() {
        let p = Point3::new(1.25, -3.0, 0.125);
        let back = Point3::parse_key(&p.canonical_key()).unwrap();
        assert!(p.distance(&back) < 1e-9);
    }

    #[test]
    fn parse_key_without_spaces() {
        let p = Point3::parse_key("(1.5,2.0,-3.25)").unwrap();
        assert_eq!(p, Point3::new(1.5, 2.0, -3.25));
    }

    #[test]
    fn parse_key_rejects_wrong_arity() {
        assert!(Point3::parse_key("(1.0, 2.0)").is_err());
        assert!(Point3::parse_key("(1, 2, 3, 4)").is_err());
    }

    #[test]
    fn parse_key_rejects_garbage() {
        assert!(Point3::parse_key("1, 2, 3").is_err());
        assert!(Point3::parse_key("(a, b, c)").is_err());
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 0.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }
}

//! Logical subsystem tags.
//!
//! The physical network is partitioned into two segregated subsystems, A and
//! B. C is the shared designation: a C-filtered consumer may traverse both
//! partitions plus the synthesized bridge edges between them.

use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};
use crate::{Error, Result};

/// Subsystem tag carried by nodes and edges of the tagged graph.
///
/// Ordering (`A < B < C`) is load-bearing: deterministic tie-breaks in tag
/// inference resolve to the smallest tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum System {
    A,
    B,
    C,
}

/// Set of subsystems a node or route is compatible with.
///
/// Serialized as a sorted array, e.g. `["A", "B", "C"]`.
pub type CableSet = BTreeSet<System>;

impl System {
    pub const ALL: [System; 3] = [System::A, System::B, System::C];

    /// Cable-compatibility set implied by this tag when used as a filter:
    /// A and B reach only themselves, C reaches everything.
    pub fn cable_set(self) -> CableSet {
        match self {
            System::A => BTreeSet::from([System::A]),
            System::B => BTreeSet::from([System::B]),
            System::C => BTreeSet::from(Self::ALL),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            System::A => "A",
            System::B => "B",
            System::C => "C",
        }
    }
}

impl std::fmt::Display for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for System {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "A" | "a" => Ok(System::A),
            "B" | "b" => Ok(System::B),
            "C" | "c" => Ok(System::C),
            other => Err(Error::MalformedSystem(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_a_b_c() {
        assert!(System::A < System::B);
        assert!(System::B < System::C);
    }

    #[test]
    fn cable_set_for_shared_filter_covers_all() {
        assert_eq!(System::C.cable_set().len(), 3);
        assert_eq!(System::A.cable_set(), BTreeSet::from([System::A]));
    }

    #[test]
    fn serde_round_trip_is_bare_letter() {
        let json = serde_json::to_string(&System::B).unwrap();
        assert_eq!(json, "\"B\"");
        let back: System = serde_json::from_str(&json).unwrap();
        assert_eq!(back, System::B);
    }

    #[test]
    fn from_str_accepts_lowercase() {
        assert_eq!("c".parse::<System>().unwrap(), System::C);
    }

    #[test]
    fn from_str_rejects_unknown_letter() {
        let err = "D".parse::<System>().unwrap_err();
        assert!(matches!(err, Error::MalformedSystem(s) if s == "D"));
    }
}

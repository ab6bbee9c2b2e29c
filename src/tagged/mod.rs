//! # Tagged Graph
//!
//! The subsystem-tagged encoding consumed by the pathfinder: nodes keyed by
//! canonical key carrying a subsystem tag, and edges carrying a subsystem
//! tag of their own.
//!
//! Edges are held **undirected** ([`SectionKey`]) internally. The on-disk
//! format represents a connection as two directed records; producers have
//! historically emitted only one of them, so the reader accepts either and
//! canonicalizes, and the writer always emits both. Directionality never
//! leaks past the serialization boundary.

pub mod convert;

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashMap;

use crate::model::{CableSet, Point3, SectionKey, System};

pub use convert::{infer_system, to_tagged};

/// Edge kind marker for synthesized cross-system bridges.
pub const CROSS_SYSTEM_CONNECTION: &str = "cross_system_connection";

// ============================================================================
// Node and edge records
// ============================================================================

/// Tag record attached to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTag {
    pub sys: System,
    /// Subsystem the same node carries in the other source graph, when the
    /// node exists in both. Never silently dropped on combination.
    pub alt_sys: Option<System>,
    pub cable: Option<CableSet>,
    /// Free-form classification (`"type"` on disk).
    pub kind: Option<String>,
}

impl NodeTag {
    pub fn new(sys: System) -> Self {
        Self { sys, alt_sys: None, cable: None, kind: None }
    }

    pub fn with_cable(mut self, cable: CableSet) -> Self {
        self.cable = Some(cable);
        self
    }
}

/// An undirected tagged edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedEdge {
    pub key: SectionKey,
    pub sys: System,
    pub kind: Option<String>,
}

// ============================================================================
// TaggedGraph
// ============================================================================

/// Subsystem-tagged graph: the pathfinder's input encoding.
///
/// Deterministic by construction: nodes and edges live in ordered maps, so
/// serialization is byte-stable for a given content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaggedGraph {
    nodes: BTreeMap<String, NodeTag>,
    /// (key, sys) → kind. Identity of an edge is the pair; the same section
    /// may legitimately exist once per subsystem.
    edges: BTreeMap<(SectionKey, System), Option<String>>,
}

impl TaggedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, key: &str) -> Option<&NodeTag> {
        self.nodes.get(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&String, &NodeTag)> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = TaggedEdge> + '_ {
        self.edges.iter().map(|((key, sys), kind)| TaggedEdge {
            key: key.clone(),
            sys: *sys,
            kind: kind.clone(),
        })
    }

    pub fn insert_node(&mut self, key: impl Into<String>, tag: NodeTag) {
        self.nodes.insert(key.into(), tag);
    }

    /// Insert an undirected edge, deduplicated by (key, sys).
    /// Returns `true` when the edge was new.
    pub fn add_edge(&mut self, key: SectionKey, sys: System, kind: Option<String>) -> bool {
        use std::collections::btree_map::Entry;
        match self.edges.entry((key, sys)) {
            Entry::Vacant(slot) => {
                slot.insert(kind);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn contains_edge(&self, key: &SectionKey, sys: System) -> bool {
        self.edges.contains_key(&(key.clone(), sys))
    }

    /// Subsystems of all non-loop edges incident to each node.
    fn incident_systems(&self) -> HashMap<&str, BTreeSet<System>> {
        let mut incident: HashMap<&str, BTreeSet<System>> = HashMap::new();
        for ((key, sys), _) in &self.edges {
            if key.is_loop() {
                continue;
            }
            let (a, b) = key.endpoints();
            incident.entry(a).or_default().insert(*sys);
            incident.entry(b).or_default().insert(*sys);
        }
        incident
    }
}

// ============================================================================
// Combination
// ============================================================================

/// Merge the subsystem-A and subsystem-B graphs into one shared graph.
///
/// - Nodes: union. A node present in both keeps `a`'s tag as primary and
///   records `b`'s in `alt_sys`; cable sets are unioned.
/// - Edges: union, deduplicated by (section, sys). The same physical
///   section tagged A in one input and B in the other stays as two edges.
/// - Bridges: every node present in both inputs that has both A-tagged and
///   B-tagged incident edges gets exactly one C-tagged self-loop of kind
///   [`CROSS_SYSTEM_CONNECTION`], modeling a pass-through junction for the
///   shared subsystem. The underlying A/B topologies are untouched.
pub fn combine(a: &TaggedGraph, b: &TaggedGraph) -> TaggedGraph {
    let mut out = TaggedGraph::new();

    for (key, tag) in &a.nodes {
        out.nodes.insert(key.clone(), tag.clone());
    }
    for (key, tag) in &b.nodes {
        use std::collections::btree_map::Entry;
        match out.nodes.entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(tag.clone());
            }
            Entry::Occupied(mut slot) => {
                let primary = slot.get_mut();
                primary.alt_sys = Some(tag.sys);
                primary.cable = match (primary.cable.take(), tag.cable.clone()) {
                    (Some(mut mine), Some(theirs)) => {
                        mine.extend(theirs);
                        Some(mine)
                    }
                    (mine, theirs) => mine.or(theirs),
                };
                if primary.kind.is_none() {
                    primary.kind = tag.kind.clone();
                }
            }
        }
    }

    for ((key, sys), kind) in a.edges.iter().chain(b.edges.iter()) {
        out.add_edge(key.clone(), *sys, kind.clone());
    }

    // Bridge synthesis at shared junctions.
    let bridges: Vec<String> = {
        let incident = out.incident_systems();
        a.nodes
            .keys()
            .filter(|k| b.nodes.contains_key(*k))
            .filter(|k| {
                incident.get(k.as_str()).is_some_and(|systems| {
                    systems.contains(&System::A) && systems.contains(&System::B)
                })
            })
            .cloned()
            .collect()
    };
    for key in bridges {
        out.add_edge(
            SectionKey::loop_at(key),
            System::C,
            Some(CROSS_SYSTEM_CONNECTION.to_string()),
        );
    }

    out
}

// ============================================================================
// TagOverlay
// ============================================================================

/// Tags recorded by a system-aware extension, keyed by canonical key and
/// section. Consulted by [`convert::to_tagged`] ahead of reference lookup
/// and neighbor inference.
#[derive(Debug, Clone, Default)]
pub struct TagOverlay {
    nodes: HashMap<String, (System, CableSet)>,
    edges: HashMap<SectionKey, System>,
}

impl TagOverlay {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn tag_node(&mut self, node: &Point3, sys: System, cable: CableSet) {
        self.nodes.insert(node.canonical_key(), (sys, cable));
    }

    pub fn tag_edge(&mut self, u: &Point3, v: &Point3, sys: System) {
        self.edges.insert(SectionKey::of_points(u, v), sys);
    }

    pub fn node_system(&self, key: &str) -> Option<System> {
        self.nodes.get(key).map(|(sys, _)| *sys)
    }

    pub fn node_cable(&self, key: &str) -> Option<&CableSet> {
        self.nodes.get(key).map(|(_, cable)| cable)
    }

    pub fn edge_system(&self, u: &Point3, v: &Point3) -> Option<System> {
        self.edges.get(&SectionKey::of_points(u, v)).copied()
    }
}

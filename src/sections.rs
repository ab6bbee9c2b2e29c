//! # Section (Tramo) Registry & Forbidden-Edge Resolution
//!
//! Node coordinates drift when a network is reprocessed; a section's
//! endpoint canonical keys do not. The registry therefore assigns each
//! undirected edge a stable integer ID keyed by its [`SectionKey`], and
//! that ID is the only long-lived way to reference an edge across tool
//! invocations — notably for the pathfinder's forbidden-section list.
//!
//! IDs are assigned sequentially from 0 and never reassigned. Registry
//! construction traverses edges in sorted key order, so the same edge set
//! always produces the same map regardless of in-memory ordering.

use std::collections::BTreeMap;

use tracing::warn;

use crate::graph::RouteGraph;
use crate::model::{Point3, SectionKey, STRICT_SNAP_LIMIT};
use crate::{Error, Result};

// ============================================================================
// SectionRegistry
// ============================================================================

/// Stable edge-ID map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionRegistry {
    ids: BTreeMap<SectionKey, u32>,
    next_id: u32,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from a previously persisted map. Existing IDs are
    /// authoritative; new registrations continue after the highest one.
    pub fn from_map(ids: BTreeMap<SectionKey, u32>) -> Self {
        let next_id = ids.values().max().map_or(0, |max| max + 1);
        Self { ids, next_id }
    }

    /// Fresh registry covering every edge of `graph`.
    pub fn build(graph: &RouteGraph) -> Self {
        let mut registry = Self::new();
        registry.absorb(graph);
        registry
    }

    /// Register every edge of `graph` not yet present, in sorted key order.
    /// Previously assigned IDs are untouched. Returns the number of newly
    /// assigned IDs.
    pub fn absorb(&mut self, graph: &RouteGraph) -> usize {
        let mut keys: Vec<SectionKey> = graph
            .undirected_edges()
            .iter()
            .map(|(u, v)| SectionKey::of_points(u, v))
            .collect();
        keys.sort();

        let mut added = 0;
        for key in keys {
            if !self.ids.contains_key(&key) {
                self.register(key);
                added += 1;
            }
        }
        added
    }

    /// ID for `key`, assigning the next sequential one on first encounter.
    pub fn register(&mut self, key: SectionKey) -> u32 {
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(key, id);
        id
    }

    pub fn id_of(&self, key: &SectionKey) -> Option<u32> {
        self.ids.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&SectionKey, u32)> {
        self.ids.iter().map(|(key, &id)| (key, id))
    }
}

// ============================================================================
// Forbidden-edge resolution
// ============================================================================

/// Outcome of a batch resolution. Bad pairs never abort the batch; they are
/// warned about, recorded, and skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForbiddenReport {
    /// Sorted, deduplicated section IDs.
    pub ids: Vec<u32>,
    /// (raw input, reason) for every skipped pair.
    pub rejected: Vec<(String, String)>,
}

/// Resolve one operator-supplied `"(x1,y1,z1)-(x2,y2,z2)"` pair into a
/// section ID.
///
/// Both endpoints are snapped to the nearest graph node by full scan. In
/// strict mode a snap farther than 1 mm rejects the pair. The snapped nodes
/// must be directly adjacent, and their section must be registered.
pub fn resolve_pair(
    graph: &RouteGraph,
    registry: &SectionRegistry,
    raw: &str,
    strict: bool,
) -> Result<u32> {
    let key = SectionKey::parse(raw)?;
    let (left, right) = key.endpoints();
    let a = Point3::parse_key(left)?;
    let b = Point3::parse_key(right)?;

    let snap_a = snap(graph, &a, strict)?;
    let snap_b = snap(graph, &b, strict)?;

    if !graph.contains_edge(&snap_a, &snap_b) {
        return Err(Error::EdgeNotFound {
            a: snap_a.canonical_key(),
            b: snap_b.canonical_key(),
        });
    }

    let section = SectionKey::of_points(&snap_a, &snap_b);
    registry
        .id_of(&section)
        .ok_or_else(|| Error::UnknownSection(section.to_string()))
}

/// Resolve a batch of coordinate pairs into a forbidden-ID list.
pub fn resolve_forbidden(
    graph: &RouteGraph,
    registry: &SectionRegistry,
    pairs: &[String],
    strict: bool,
) -> ForbiddenReport {
    let mut report = ForbiddenReport::default();
    for raw in pairs {
        match resolve_pair(graph, registry, raw, strict) {
            Ok(id) => report.ids.push(id),
            Err(err) => {
                warn!(pair = %raw, %err, "skipping unresolvable forbidden pair");
                report.rejected.push((raw.clone(), err.to_string()));
            }
        }
    }
    report.ids.sort_unstable();
    report.ids.dedup();
    report
}

fn snap(graph: &RouteGraph, p: &Point3, strict: bool) -> Result<Point3> {
    let (node, distance) = graph.nearest_node(p).ok_or(Error::EmptyGraph)?;
    if strict && distance > STRICT_SNAP_LIMIT {
        return Err(Error::SnapOutOfTolerance {
            key: p.canonical_key(),
            distance,
        });
    }
    Ok(node)
}

//! # Adjacency Graph Store
//!
//! `RouteGraph` is the mutable, adjacency-form representation of the routing
//! network. Node identity is tolerance-based (see [`crate::model`]): every
//! lookup that takes a tolerance treats coordinates within ε as the same
//! node, with the canonical key serving only as an exact-hit fast path.
//!
//! ## Invariants
//!
//! - **Symmetry**: `v ∈ neighbors(u)` ⇔ `u ∈ neighbors(v)`. Every mutation
//!   primitive preserves this.
//! - **No duplicate neighbors**, no self-loops in the adjacency form.
//! - `ensure_node` is idempotent under tolerance-equal coordinates.

pub mod extend;

pub use extend::{ExtensionReport, ExternalConnection};

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::model::{segment_projection, Point3, SectionKey};
use crate::{Error, Result};

/// How `ensure_connection_node` wired the requested point in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    /// A node within tolerance already existed.
    Existing,
    /// The point lay on an edge; that edge was split.
    SplitEdge,
    /// No node and no containing edge; created isolated.
    Isolated,
}

/// Adjacency-form routing graph.
///
/// Nodes are stored in insertion order; adjacency lists hold slot indices.
/// All public operations speak `Point3`.
#[derive(Debug, Clone, Default)]
pub struct RouteGraph {
    /// canonical key → slots. Exact-hit fast path only; tolerance lookups
    /// always fall back to a scan. Multi-valued: two nodes can share a key
    /// (same mm cell) while sitting farther apart than the tolerance, and
    /// both must stay resolvable.
    index: HashMap<String, SmallVec<[usize; 2]>>,
    points: Vec<Point3>,
    adjacency: Vec<SmallVec<[usize; 4]>>,
}

impl RouteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.points.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|n| n.len()).sum::<usize>() / 2
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Point3> {
        self.points.iter()
    }

    /// Neighbors of `p`, or empty when `p` is not an exact node.
    pub fn neighbors(&self, p: &Point3) -> Vec<Point3> {
        match self.slot_of(p) {
            Some(slot) => self.adjacency[slot].iter().map(|&j| self.points[j]).collect(),
            None => Vec::new(),
        }
    }

    /// Every undirected edge, each pair reported once.
    pub fn undirected_edges(&self) -> Vec<(Point3, Point3)> {
        let mut edges = Vec::new();
        for (i, nbrs) in self.adjacency.iter().enumerate() {
            for &j in nbrs {
                if j > i {
                    edges.push((self.points[i], self.points[j]));
                }
            }
        }
        edges
    }

    pub fn contains_edge(&self, u: &Point3, v: &Point3) -> bool {
        match (self.slot_of(u), self.slot_of(v)) {
            (Some(i), Some(j)) => self.adjacency[i].contains(&j),
            _ => false,
        }
    }

    // ========================================================================
    // Node lookup & creation
    // ========================================================================

    /// Nearest node within `tol`, or `None`.
    ///
    /// Policy: nearest by distance, ties broken by the smaller canonical key.
    /// Deliberately not first-match — first-match makes the result depend on
    /// insertion order when several nodes sit within tolerance.
    pub fn find_node(&self, c: &Point3, tol: f64) -> Option<Point3> {
        // Fast path: a node with identical coordinates is always the answer.
        if let Some(slot) = self.slot_of(c) {
            return Some(self.points[slot]);
        }

        let mut best: Option<(f64, String, Point3)> = None;
        for p in &self.points {
            let d = p.distance(c);
            if d > tol {
                continue;
            }
            let key = p.canonical_key();
            let better = match &best {
                None => true,
                Some((bd, bk, _)) => d < *bd || (d == *bd && key < *bk),
            };
            if better {
                best = Some((d, key, *p));
            }
        }
        best.map(|(_, _, p)| p)
    }

    /// Nearest node regardless of distance, with the snap distance.
    pub fn nearest_node(&self, c: &Point3) -> Option<(Point3, f64)> {
        let mut best: Option<(f64, String, Point3)> = None;
        for p in &self.points {
            let d = p.distance(c);
            let key = p.canonical_key();
            let better = match &best {
                None => true,
                Some((bd, bk, _)) => d < *bd || (d == *bd && key < *bk),
            };
            if better {
                best = Some((d, key, *p));
            }
        }
        best.map(|(d, _, p)| (p, d))
    }

    /// Existing node within `tol`, or a new isolated node at `c`.
    pub fn ensure_node(&mut self, c: Point3, tol: f64) -> Point3 {
        if let Some(existing) = self.find_node(&c, tol) {
            return existing;
        }
        self.insert_slot(c);
        c
    }

    // ========================================================================
    // Edge mutation
    // ========================================================================

    /// Symmetric edge insert. Creates missing endpoints by exact key.
    /// Returns `true` when the edge was actually new. Self-loops are ignored.
    pub fn add_edge(&mut self, u: Point3, v: Point3) -> bool {
        let i = self.slot_of(&u).unwrap_or_else(|| self.insert_slot(u));
        let j = self.slot_of(&v).unwrap_or_else(|| self.insert_slot(v));
        if i == j {
            return false;
        }
        if self.adjacency[i].contains(&j) {
            return false;
        }
        self.adjacency[i].push(j);
        self.adjacency[j].push(i);
        true
    }

    /// Symmetric edge removal, tolerant of one direction already missing.
    /// Returns `true` when at least one direction was present.
    pub fn remove_edge(&mut self, u: &Point3, v: &Point3) -> bool {
        let (Some(i), Some(j)) = (self.slot_of(u), self.slot_of(v)) else {
            return false;
        };
        let mut removed = false;
        if let Some(pos) = self.adjacency[i].iter().position(|&n| n == j) {
            self.adjacency[i].remove(pos);
            removed = true;
        }
        if let Some(pos) = self.adjacency[j].iter().position(|&n| n == i) {
            self.adjacency[j].remove(pos);
            removed = true;
        }
        removed
    }

    /// Replace the edge `u ↔ v` with `u ↔ p ↔ v`.
    ///
    /// Precondition: `u` and `v` are adjacent (at least one direction; the
    /// removal repairs a half-present edge). Net undirected edge count
    /// increases by exactly one.
    pub fn split_edge(&mut self, u: &Point3, v: &Point3, p: Point3) -> Result<Point3> {
        let adjacent = self.contains_edge(u, v) || self.contains_edge(v, u);
        if !adjacent {
            return Err(Error::EdgeNotFound {
                a: u.canonical_key(),
                b: v.canonical_key(),
            });
        }
        debug!(edge = %SectionKey::of_points(u, v), at = %p, "splitting edge");
        self.remove_edge(u, v);
        let slot = self.slot_of(&p).unwrap_or_else(|| self.insert_slot(p));
        let mid = self.points[slot];
        self.add_edge(*u, mid);
        self.add_edge(mid, *v);
        Ok(mid)
    }

    /// Resolve a connection point into the graph.
    ///
    /// Order of preference: an existing node within `tol`; otherwise split
    /// the edge whose segment contains `pc` within `tol`, choosing the
    /// smallest perpendicular distance when several qualify; otherwise
    /// create `pc` isolated and leave wiring to the caller.
    pub fn ensure_connection_node(&mut self, pc: Point3, tol: f64) -> (Point3, ConnectionKind) {
        if let Some(existing) = self.find_node(&pc, tol) {
            return (existing, ConnectionKind::Existing);
        }

        // Scan undirected edges for the best containing segment.
        let mut best: Option<(f64, SectionKey, Point3, Point3)> = None;
        for (u, v) in self.undirected_edges() {
            let Some((foot, _)) = segment_projection(&pc, &u, &v) else {
                continue;
            };
            let d = pc.distance(&foot);
            if d > tol {
                continue;
            }
            let key = SectionKey::of_points(&u, &v);
            let better = match &best {
                None => true,
                Some((bd, bk, _, _)) => d < *bd || (d == *bd && key < *bk),
            };
            if better {
                best = Some((d, key, u, v));
            }
        }

        if let Some((_, _, u, v)) = best {
            // Cannot fail: the edge was just observed.
            let node = self
                .split_edge(&u, &v, pc)
                .unwrap_or_else(|_| unreachable!("edge vanished during split"));
            return (node, ConnectionKind::SplitEdge);
        }

        debug!(at = %pc, "connection point has no node and no containing edge");
        self.insert_slot(pc);
        (pc, ConnectionKind::Isolated)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Slot of a node with exactly these coordinates.
    fn slot_of(&self, p: &Point3) -> Option<usize> {
        self.index
            .get(&p.canonical_key())?
            .iter()
            .copied()
            .find(|&slot| self.points[slot] == *p)
    }

    fn insert_slot(&mut self, p: Point3) -> usize {
        let slot = self.points.len();
        self.points.push(p);
        self.adjacency.push(SmallVec::new());
        self.index.entry(p.canonical_key()).or_default().push(slot);
        slot
    }
}

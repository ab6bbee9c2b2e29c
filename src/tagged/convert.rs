//! Adjacency → tagged conversion with subsystem-tag inference.
//!
//! Extension produces an untagged adjacency graph; the pathfinder wants the
//! tagged encoding. Tags come from, in order of authority:
//!
//! 1. the [`TagOverlay`] recorded by a system-aware extension,
//! 2. the reference tagged graph (a node already known there keeps its tag),
//! 3. neighbor majority vote against the reference,
//! 4. the documented default, subsystem A.

use tracing::warn;

use crate::graph::RouteGraph;
use crate::model::{Point3, SectionKey, System};
use super::{NodeTag, TagOverlay, TaggedGraph};

/// Majority vote over the systems of reference-tagged neighbors.
///
/// Empty evidence defaults to A. A tie resolves to the smallest system in
/// `A < B < C` order — fixed here so that `[A, B]` is deterministically A
/// rather than whatever a hash map yielded first.
pub fn infer_system(neighbor_tags: &[System]) -> System {
    let mut counts = [0usize; 3];
    for tag in neighbor_tags {
        counts[*tag as usize] += 1;
    }
    let mut best = System::A;
    let mut best_count = 0usize;
    for sys in System::ALL {
        let count = counts[sys as usize];
        // Strict '>' keeps the smallest system on ties.
        if count > best_count {
            best = sys;
            best_count = count;
        }
    }
    best
}

/// Convert an adjacency graph into the tagged format.
///
/// Each undirected adjacency becomes one tagged edge. The edge's system is
/// the resolved system of its lexicographically smaller endpoint — a
/// deterministic projection of the historical "tag with the from-node"
/// rule, which depended on traversal order. An overlay edge tag, when
/// present, wins.
pub fn to_tagged(
    graph: &RouteGraph,
    reference: &TaggedGraph,
    overlay: Option<&TagOverlay>,
) -> TaggedGraph {
    let mut out = TaggedGraph::new();

    for node in graph.nodes() {
        let key = node.canonical_key();
        let tag = resolve_node_tag(graph, reference, overlay, node, &key);
        out.insert_node(key, tag);
    }

    for (u, v) in graph.undirected_edges() {
        let section = SectionKey::of_points(&u, &v);
        let sys = overlay
            .and_then(|o| o.edge_system(&u, &v))
            .unwrap_or_else(|| {
                let (smaller, _) = section.endpoints();
                out.node(smaller).map(|t| t.sys).unwrap_or(System::A)
            });
        out.add_edge(section, sys, None);
    }

    out
}

fn resolve_node_tag(
    graph: &RouteGraph,
    reference: &TaggedGraph,
    overlay: Option<&TagOverlay>,
    node: &Point3,
    key: &str,
) -> NodeTag {
    if let Some(o) = overlay {
        if let Some(sys) = o.node_system(key) {
            let mut tag = NodeTag::new(sys);
            tag.cable = o.node_cable(key).cloned();
            return tag;
        }
    }

    if let Some(known) = reference.node(key) {
        return known.clone();
    }

    let neighbor_tags: Vec<System> = graph
        .neighbors(node)
        .iter()
        .filter_map(|n| reference.node(&n.canonical_key()).map(|t| t.sys))
        .collect();
    if neighbor_tags.is_empty() {
        warn!(node = %key, "no tagged neighbors; defaulting subsystem to A");
    }
    NodeTag::new(infer_system(&neighbor_tags))
}

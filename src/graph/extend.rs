//! External point integration.
//!
//! An upstream geometry step hands us a triple: PE (the external anchor),
//! PC (where its connection meets the network, possibly mid-edge), and an
//! ordered set of intermediate waypoints PI_1..PI_n. This module wires the
//! triple into the graph:
//!
//! ```text
//!        PI_1
//!       /    \
//!   PE — PI_2 — PC        (fan-out / fan-in; no PI↔PI chain)
//!       \    /
//!        PI_n
//! ```
//!
//! PE connects to every waypoint individually and every waypoint connects to
//! PC individually, giving the downstream pathfinder n parallel two-hop
//! alternatives. Re-running the same extension is a no-op (tolerance-equal
//! points resolve to the same nodes, edge inserts skip existing adjacencies).

use tracing::{debug, warn};

use crate::model::{Point3, System, DEFAULT_TOLERANCE};
use crate::tagged::TagOverlay;
use super::{ConnectionKind, RouteGraph};

/// The PE/PC/PI triple, as read from a connection file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalConnection {
    pub pe: Point3,
    pub pc: Point3,
    /// Ordered intermediate waypoints. May be empty, in which case PE is
    /// wired straight to PC.
    pub waypoints: Vec<Point3>,
    /// Tolerance carried in file metadata, overriding the default.
    pub tolerance: Option<f64>,
}

impl ExternalConnection {
    pub fn tolerance_or_default(&self) -> f64 {
        self.tolerance.unwrap_or(DEFAULT_TOLERANCE)
    }
}

/// What an extension actually changed — all zero on a repeated run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtensionReport {
    pub nodes_created: usize,
    pub edges_created: usize,
    pub split_performed: bool,
}

/// Insert an external connection into the graph.
pub fn extend(graph: &mut RouteGraph, conn: &ExternalConnection, tol: f64) -> ExtensionReport {
    extend_inner(graph, conn, tol, None)
}

/// System-aware extension: additionally records subsystem tags for every
/// node and edge it creates, for later consumption by tag conversion.
///
/// An A or B filter is applied verbatim. The shared filter C carries no
/// single subsystem, so newly created geometry falls back to A; edge-level
/// inference for this case is an acknowledged gap.
pub fn extend_tagged(
    graph: &mut RouteGraph,
    overlay: &mut TagOverlay,
    conn: &ExternalConnection,
    filter: System,
    tol: f64,
) -> ExtensionReport {
    let sys = match filter {
        System::A | System::B => filter,
        System::C => {
            warn!("shared-system filter on extension; tagging new geometry as A");
            System::A
        }
    };
    extend_inner(graph, conn, tol, Some(TagSink { overlay, sys, filter }))
}

/// Destination for the tags a system-aware extension produces.
struct TagSink<'a> {
    overlay: &'a mut TagOverlay,
    /// Resolved label for new geometry (the filter, or A for filter C).
    sys: System,
    /// Caller's original filter; decides the cable-compatibility set.
    filter: System,
}

fn extend_inner(
    graph: &mut RouteGraph,
    conn: &ExternalConnection,
    tol: f64,
    mut tagging: Option<TagSink<'_>>,
) -> ExtensionReport {
    let mut report = ExtensionReport::default();

    // PC first: it may split an edge, which must happen before any of the
    // new points could be mistaken for mid-edge candidates.
    let before = graph.node_count();
    let (pc, kind) = graph.ensure_connection_node(conn.pc, tol);
    report.split_performed = kind == ConnectionKind::SplitEdge;
    note_node(&mut tagging, &mut report, &pc, graph.node_count() > before);

    let before = graph.node_count();
    let pe = graph.ensure_node(conn.pe, tol);
    note_node(&mut tagging, &mut report, &pe, graph.node_count() > before);

    let mut resolved = Vec::with_capacity(conn.waypoints.len());
    for wp in &conn.waypoints {
        let before = graph.node_count();
        let node = graph.ensure_node(*wp, tol);
        note_node(&mut tagging, &mut report, &node, graph.node_count() > before);
        resolved.push(node);
    }

    if resolved.is_empty() {
        // Degenerate path: nothing between PE and PC.
        wire(graph, &mut tagging, &mut report, pe, pc);
    } else {
        for node in &resolved {
            wire(graph, &mut tagging, &mut report, pe, *node);
            wire(graph, &mut tagging, &mut report, *node, pc);
        }
    }

    debug!(
        nodes = report.nodes_created,
        edges = report.edges_created,
        split = report.split_performed,
        "extension applied"
    );
    report
}

fn note_node(
    tagging: &mut Option<TagSink<'_>>,
    report: &mut ExtensionReport,
    node: &Point3,
    created: bool,
) {
    if !created {
        return;
    }
    report.nodes_created += 1;
    if let Some(sink) = tagging {
        sink.overlay.tag_node(node, sink.sys, sink.filter.cable_set());
    }
}

fn wire(
    graph: &mut RouteGraph,
    tagging: &mut Option<TagSink<'_>>,
    report: &mut ExtensionReport,
    u: Point3,
    v: Point3,
) {
    if graph.add_edge(u, v) {
        report.edges_created += 1;
        if let Some(sink) = tagging {
            sink.overlay.tag_edge(&u, &v, sink.sys);
        }
    }
}

//! End-to-end tests for external-point integration.
//!
//! Each test exercises: connection file -> parse -> extend -> adjacency
//! invariants, the way the pipeline runs across tool invocations.

use traynet::format;
use traynet::model::Point3;
use traynet::{extend, ConnectionKind, RouteGraph, DEFAULT_TOLERANCE};

fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

fn assert_symmetric(g: &RouteGraph) {
    for u in g.nodes() {
        for v in g.neighbors(u) {
            assert!(g.neighbors(&v).contains(u), "asymmetry at {u} -> {v}");
        }
    }
}

// ============================================================================
// 1. The single-edge split scenario
// ============================================================================

#[test]
fn midpoint_connection_splits_the_only_edge() {
    let mut graph = format::parse_adjacency(
        r#"{"(0.000, 0.000, 0.000)": [[1, 0, 0]], "(1.000, 0.000, 0.000)": [[0, 0, 0]]}"#,
    )
    .unwrap();

    let (pc, kind) = graph.ensure_connection_node(p(0.5, 0.0, 0.0), DEFAULT_TOLERANCE);
    assert_eq!(kind, ConnectionKind::SplitEdge);
    assert_eq!(pc, p(0.5, 0.0, 0.0));

    // 3 nodes, 2 undirected edges (4 directed adjacency entries).
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    let directed: usize = graph.nodes().map(|n| graph.neighbors(n).len()).sum();
    assert_eq!(directed, 4);
    assert!(graph.contains_edge(&p(0.0, 0.0, 0.0), &pc));
    assert!(graph.contains_edge(&pc, &p(1.0, 0.0, 0.0)));
    assert_symmetric(&graph);
}

// ============================================================================
// 2. Full extension from a points file
// ============================================================================

#[test]
fn extension_from_points_file() {
    let mut graph = format::parse_adjacency(
        r#"{"(0.000, 0.000, 0.000)": [[1, 0, 0]], "(1.000, 0.000, 0.000)": [[0, 0, 0]]}"#,
    )
    .unwrap();

    let conn = format::parse_connection(
        r#"{
            "PE": {"x": 0.5, "y": 3.0, "z": 0.0},
            "PC": {"x": 0.5, "y": 0.0, "z": 0.0},
            "PI_1": {"x": 0.5, "y": 1.5, "z": 0.0},
            "PI_2": {"x": 1.5, "y": 1.5, "z": 0.0},
            "metadata": {"tolerance": 0.001}
        }"#,
    )
    .unwrap();

    let report = extend(&mut graph, &conn, conn.tolerance_or_default());
    assert!(report.split_performed);
    assert_eq!(report.nodes_created, 4);
    assert_eq!(report.edges_created, 4);

    // PE reachable from PC through either waypoint, never directly.
    assert!(graph.contains_edge(&conn.pe, &p(0.5, 1.5, 0.0)));
    assert!(graph.contains_edge(&p(0.5, 1.5, 0.0), &conn.pc));
    assert!(graph.contains_edge(&conn.pe, &p(1.5, 1.5, 0.0)));
    assert!(graph.contains_edge(&p(1.5, 1.5, 0.0), &conn.pc));
    assert!(!graph.contains_edge(&conn.pe, &conn.pc));
    assert_symmetric(&graph);
}

// ============================================================================
// 3. Re-running the same extension changes nothing
// ============================================================================

#[test]
fn repeated_extension_is_a_no_op() {
    let mut graph = format::parse_adjacency(
        r#"{"(0.000, 0.000, 0.000)": [[1, 0, 0]], "(1.000, 0.000, 0.000)": [[0, 0, 0]]}"#,
    )
    .unwrap();

    let conn = format::parse_connection(
        r#"{
            "PE": {"x": 0.5, "y": 3.0, "z": 0.0},
            "PC": {"x": 0.5, "y": 0.0, "z": 0.0},
            "PI_1": {"x": 0.5, "y": 1.5, "z": 0.0}
        }"#,
    )
    .unwrap();

    extend(&mut graph, &conn, DEFAULT_TOLERANCE);
    let nodes = graph.node_count();
    let edges = graph.edge_count();

    let second = extend(&mut graph, &conn, DEFAULT_TOLERANCE);
    assert_eq!(second.nodes_created, 0);
    assert_eq!(second.edges_created, 0);
    assert!(!second.split_performed);
    assert_eq!(graph.node_count(), nodes);
    assert_eq!(graph.edge_count(), edges);
}

// ============================================================================
// 4. Connector-format file drives the same extension
// ============================================================================

#[test]
fn extension_from_connector_file() {
    let mut graph = format::parse_adjacency(
        r#"{"(0.000, 0.000, 0.000)": [[1, 0, 0]], "(1.000, 0.000, 0.000)": [[0, 0, 0]]}"#,
    )
    .unwrap();

    let conn = format::parse_connection(
        r#"{
            "projection": [0.5, 0.0, 0.0],
            "best_edge": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            "best_manhattan_path": {
                "points": [[0.5, 0.0, 0.0], [0.5, 2.0, 0.0], [4.0, 2.0, 0.0]]
            },
            "tolerance": 0.001
        }"#,
    )
    .unwrap();
    assert_eq!(conn.pc, p(0.5, 0.0, 0.0));
    assert_eq!(conn.pe, p(4.0, 2.0, 0.0));

    let report = extend(&mut graph, &conn, conn.tolerance_or_default());
    assert!(report.split_performed);
    assert!(graph.contains_edge(&conn.pe, &p(0.5, 2.0, 0.0)));
    assert!(graph.contains_edge(&p(0.5, 2.0, 0.0), &conn.pc));
    assert_symmetric(&graph);
}

// ============================================================================
// 5. PC far from everything falls back to isolated wiring
// ============================================================================

#[test]
fn distant_pc_is_created_isolated_then_wired() {
    let mut graph = RouteGraph::new();
    graph.add_edge(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0));

    let conn = traynet::ExternalConnection {
        pe: p(10.0, 10.0, 0.0),
        pc: p(10.0, 5.0, 0.0),
        waypoints: vec![p(10.0, 7.0, 0.0)],
        tolerance: None,
    };
    let report = extend(&mut graph, &conn, DEFAULT_TOLERANCE);
    assert!(!report.split_performed);
    assert_eq!(report.nodes_created, 3);
    // PC got wired through the waypoint even though no edge contained it.
    assert!(graph.contains_edge(&conn.pc, &p(10.0, 7.0, 0.0)));
    assert_symmetric(&graph);
}

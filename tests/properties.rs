//! Property tests for the graph invariants: undirected symmetry, split
//! conservation, and idempotent extension.

use proptest::prelude::*;
use traynet::model::Point3;
use traynet::{extend, ExternalConnection, RouteGraph, DEFAULT_TOLERANCE};

/// Grid points spaced well beyond tolerance, so identity is unambiguous.
fn grid_point(i: u8) -> Point3 {
    Point3::new(f64::from(i % 4), f64::from((i / 4) % 4), f64::from(i / 16))
}

fn assert_symmetric(g: &RouteGraph) {
    for u in g.nodes() {
        for v in g.neighbors(u) {
            assert!(g.neighbors(&v).contains(u), "asymmetry at {u} -> {v}");
        }
    }
}

fn build_graph(edges: &[(u8, u8)]) -> RouteGraph {
    let mut g = RouteGraph::new();
    for &(a, b) in edges {
        g.add_edge(grid_point(a), grid_point(b));
    }
    g
}

proptest! {
    #[test]
    fn symmetry_survives_arbitrary_mutations(
        edges in prop::collection::vec((0u8..32, 0u8..32), 1..40),
        removals in prop::collection::vec((0u8..32, 0u8..32), 0..10),
    ) {
        let mut g = build_graph(&edges);
        for (a, b) in removals {
            g.remove_edge(&grid_point(a), &grid_point(b));
        }
        assert_symmetric(&g);

        // Splitting every original edge that still exists keeps symmetry too.
        for &(a, b) in &edges {
            let (u, v) = (grid_point(a), grid_point(b));
            if g.contains_edge(&u, &v) {
                let mid = Point3::new(
                    (u.x + v.x) / 2.0 + 0.1,
                    (u.y + v.y) / 2.0 + 0.1,
                    (u.z + v.z) / 2.0,
                );
                let _ = g.split_edge(&u, &v, mid);
            }
        }
        assert_symmetric(&g);
    }

    #[test]
    fn split_conserves_edge_count_plus_one(
        edges in prop::collection::vec((0u8..32, 0u8..32), 1..30),
        pick in 0usize..30,
    ) {
        let mut g = build_graph(&edges);
        let undirected = g.undirected_edges();
        prop_assume!(!undirected.is_empty());
        let (u, v) = undirected[pick % undirected.len()];

        // A fresh point off every grid position.
        let p = Point3::new((u.x + v.x) / 2.0 + 0.31, (u.y + v.y) / 2.0 + 0.17, u.z);
        prop_assume!(g.nodes().all(|n| n.distance(&p) > DEFAULT_TOLERANCE));

        let before = g.edge_count();
        g.split_edge(&u, &v, p).unwrap();
        prop_assert_eq!(g.edge_count(), before + 1);
        prop_assert!(!g.contains_edge(&u, &v));
        prop_assert!(g.contains_edge(&u, &p));
        prop_assert!(g.contains_edge(&p, &v));
    }

    #[test]
    fn same_cell_nodes_beyond_tolerance_keep_identity(
        cell in (1u8..20, 1u8..20, 1u8..20),
        signs in (prop::bool::ANY, prop::bool::ANY, prop::bool::ANY),
    ) {
        // Two points in the same mm cell, offset ±0.4mm per axis in opposite
        // directions: identical canonical keys, distance ~1.39mm > tolerance.
        let center = Point3::new(
            f64::from(cell.0) * 0.001,
            f64::from(cell.1) * 0.001,
            f64::from(cell.2) * 0.001,
        );
        let off = |flip: bool| if flip { -0.0004 } else { 0.0004 };
        let a = Point3::new(center.x + off(signs.0), center.y + off(signs.1), center.z + off(signs.2));
        let b = Point3::new(center.x - off(signs.0), center.y - off(signs.1), center.z - off(signs.2));
        prop_assert_eq!(a.canonical_key(), b.canonical_key());
        prop_assert!(a.distance(&b) > DEFAULT_TOLERANCE);

        let anchor = Point3::new(5.0, 5.0, 5.0);
        let mut g = RouteGraph::new();
        g.add_edge(anchor, a);
        let created = g.ensure_node(b, DEFAULT_TOLERANCE);

        // The key is a fast path, not an identity: b is a second node, and
        // a's adjacency is untouched by the collision.
        prop_assert_eq!(created, b);
        prop_assert_eq!(g.node_count(), 3);
        prop_assert!(g.contains_edge(&anchor, &a));
        prop_assert_eq!(g.neighbors(&a), vec![anchor]);
        prop_assert!(g.neighbors(&b).is_empty());
        assert_symmetric(&g);
    }

    #[test]
    fn extension_is_idempotent(
        edges in prop::collection::vec((0u8..16, 0u8..16), 1..20),
        pe in 32u8..40,
        pc in 0u8..16,
        waypoints in prop::collection::vec(40u8..48, 0..4),
    ) {
        let mut g = build_graph(&edges);
        let conn = ExternalConnection {
            pe: grid_point(pe),
            pc: grid_point(pc),
            waypoints: waypoints.iter().map(|&w| grid_point(w)).collect(),
            tolerance: None,
        };

        extend(&mut g, &conn, DEFAULT_TOLERANCE);
        let nodes = g.node_count();
        let edge_total = g.edge_count();

        let second = extend(&mut g, &conn, DEFAULT_TOLERANCE);
        prop_assert_eq!(second.nodes_created, 0);
        prop_assert_eq!(second.edges_created, 0);
        prop_assert_eq!(g.node_count(), nodes);
        prop_assert_eq!(g.edge_count(), edge_total);
        assert_symmetric(&g);
    }
}

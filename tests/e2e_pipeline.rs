//! Full pipeline: adjacency source -> tagged extension -> conversion with
//! tag inference -> tagged file + section map + forbidden IDs, everything
//! the external pathfinder consumes.

use traynet::format;
use traynet::model::Point3;
use traynet::{
    extend_tagged, resolve_forbidden, SectionKey, SectionRegistry, System, TagOverlay,
    DEFAULT_TOLERANCE,
};

fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

#[test]
fn pipeline_produces_consistent_pathfinder_inputs() {
    // Stage 1: load the raw network.
    let mut graph = format::parse_adjacency(
        r#"{
            "(0.000, 0.000, 0.000)": [[1, 0, 0]],
            "(1.000, 0.000, 0.000)": [[0, 0, 0], [2, 0, 0]],
            "(2.000, 0.000, 0.000)": [[1, 0, 0]]
        }"#,
    )
    .unwrap();

    // Stage 2: wire in an external point under the B filter.
    let conn = format::parse_connection(
        r#"{
            "PE": {"x": 0.5, "y": 2.0, "z": 0.0},
            "PC": {"x": 0.5, "y": 0.0, "z": 0.0},
            "PI_1": {"x": 0.5, "y": 1.0, "z": 0.0}
        }"#,
    )
    .unwrap();
    let mut overlay = TagOverlay::default();
    let report = extend_tagged(&mut graph, &mut overlay, &conn, System::B, DEFAULT_TOLERANCE);
    assert!(report.split_performed);

    // Stage 3: convert against the pre-extension reference tags.
    let reference = format::parse_tagged(
        r#"{
            "nodes": {
                "(0.000, 0.000, 0.000)": {"sys": "A"},
                "(1.000, 0.000, 0.000)": {"sys": "A"},
                "(2.000, 0.000, 0.000)": {"sys": "A"}
            },
            "edges": []
        }"#,
    )
    .unwrap();
    let tagged = traynet::to_tagged(&graph, &reference, Some(&overlay));

    // Pre-existing nodes keep their reference tags; new geometry carries
    // the extension's filter.
    assert_eq!(tagged.node(&p(0.0, 0.0, 0.0).canonical_key()).unwrap().sys, System::A);
    assert_eq!(tagged.node(&conn.pe.canonical_key()).unwrap().sys, System::B);
    assert_eq!(tagged.node(&conn.pc.canonical_key()).unwrap().sys, System::B);

    // Stage 4: tagged file round-trips.
    let tagged_json = format::tagged_to_string(&tagged).unwrap();
    assert_eq!(format::parse_tagged(&tagged_json).unwrap(), tagged);

    // Stage 5: section registry covers exactly the undirected adjacency.
    let registry = SectionRegistry::build(&graph);
    assert_eq!(registry.len(), graph.edge_count());
    assert_eq!(registry.len(), tagged.edge_count());

    // Stage 6: the operator forbids the split's left half.
    let report = resolve_forbidden(
        &graph,
        &registry,
        &["(0, 0, 0)-(0.5, 0, 0)".to_string()],
        true,
    );
    let expected = registry
        .id_of(&SectionKey::of_points(&p(0.0, 0.0, 0.0), &p(0.5, 0.0, 0.0)))
        .unwrap();
    assert_eq!(report.ids, vec![expected]);
}

#[test]
fn reprocessing_the_saved_graph_keeps_section_ids() {
    let mut graph = format::parse_adjacency(
        r#"{"(0.000, 0.000, 0.000)": [[1, 0, 0]], "(1.000, 0.000, 0.000)": [[0, 0, 0]]}"#,
    )
    .unwrap();
    graph.ensure_connection_node(p(0.5, 0.0, 0.0), DEFAULT_TOLERANCE);

    let registry = SectionRegistry::build(&graph);
    let saved_graph = format::adjacency_to_string(&graph).unwrap();
    let saved_map = format::registry_to_string(&registry).unwrap();

    // Another process loads both files and rebuilds.
    let reloaded_graph = format::parse_adjacency(&saved_graph).unwrap();
    let mut reloaded_map = format::parse_registry(&saved_map).unwrap();
    let added = reloaded_map.absorb(&reloaded_graph);
    assert_eq!(added, 0);
    assert_eq!(format::registry_to_string(&reloaded_map).unwrap(), saved_map);
}

//! # On-Disk Formats
//!
//! Every encoding the tools exchange is JSON; this module is the only place
//! where the in-memory types meet it. Codecs are pure string functions with
//! thin path helpers on top, so every pipeline stage stays unit-testable
//! without touching the file system.
//!
//! | Encoding | Shape |
//! |----------|-------|
//! | Adjacency graph | `{"(x, y, z)": [[x,y,z], ...]}` |
//! | Tagged graph | `{"nodes": {key: {"sys", ...}}, "edges": [{"from","to","sys"}, ...]}` |
//! | Section ID map | `{"key1-key2": int}` |
//! | Forbidden list | `[int, ...]` |
//! | Connection file | PE/PC/PI records, or the connector form |
//!
//! The tagged writer emits each undirected edge as **two** directed records
//! (one for a self-loop), restoring the symmetry the format is supposed to
//! have; the reader accepts graphs where producers wrote only one direction.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::graph::{ExternalConnection, RouteGraph};
use crate::model::{CableSet, Point3, SectionKey, System};
use crate::sections::SectionRegistry;
use crate::tagged::{NodeTag, TaggedGraph};
use crate::{Error, Result};

// ============================================================================
// Adjacency graph
// ============================================================================

/// Parse the adjacency encoding. Symmetric inserts mean a file with a
/// missing reverse direction loads as a consistent undirected graph.
pub fn parse_adjacency(json: &str) -> Result<RouteGraph> {
    let raw: BTreeMap<String, Vec<[f64; 3]>> = serde_json::from_str(json)?;
    let mut graph = RouteGraph::new();
    for (key, neighbors) in raw {
        let node = Point3::parse_key(&key)?;
        // Isolated nodes are legal: key present, empty neighbor list.
        graph.ensure_node(node, 0.0);
        for neighbor in neighbors {
            graph.add_edge(node, Point3::from(neighbor));
        }
    }
    Ok(graph)
}

/// Serialize the adjacency encoding with sorted keys and sorted neighbor
/// lists, for reproducible bytes.
pub fn adjacency_to_string(graph: &RouteGraph) -> Result<String> {
    let mut out: BTreeMap<String, Vec<[f64; 3]>> = BTreeMap::new();
    for node in graph.nodes() {
        // Distinct nodes may share a canonical key (same mm cell, farther
        // apart than the tolerance); their neighbor lists merge under it.
        let entry = out.entry(node.canonical_key()).or_default();
        entry.extend(graph.neighbors(node).into_iter().map(Into::<[f64; 3]>::into));
    }
    for neighbors in out.values_mut() {
        neighbors.sort_by(|a, b| Point3::from(*a).canonical_key().cmp(&Point3::from(*b).canonical_key()));
        neighbors.dedup();
    }
    Ok(serde_json::to_string_pretty(&out)?)
}

pub fn load_adjacency(path: impl AsRef<Path>) -> Result<RouteGraph> {
    parse_adjacency(&std::fs::read_to_string(path)?)
}

pub fn save_adjacency(graph: &RouteGraph, path: impl AsRef<Path>) -> Result<()> {
    Ok(std::fs::write(path, adjacency_to_string(graph)?)?)
}

// ============================================================================
// Tagged graph
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct TaggedGraphFile {
    nodes: BTreeMap<String, NodeRecord>,
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    sys: System,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    alt_sys: Option<System>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    cable: Option<CableSet>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    kind: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeRecord {
    from: String,
    to: String,
    sys: System,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    kind: Option<String>,
}

pub fn parse_tagged(json: &str) -> Result<TaggedGraph> {
    let file: TaggedGraphFile = serde_json::from_str(json)?;
    let mut graph = TaggedGraph::new();
    for (key, record) in file.nodes {
        Point3::parse_key(&key)?;
        graph.insert_node(
            key,
            NodeTag {
                sys: record.sys,
                alt_sys: record.alt_sys,
                cable: record.cable,
                kind: record.kind,
            },
        );
    }
    for record in file.edges {
        Point3::parse_key(&record.from)?;
        Point3::parse_key(&record.to)?;
        // Directed duplicates collapse onto the undirected key.
        graph.add_edge(SectionKey::new(record.from, record.to), record.sys, record.kind);
    }
    Ok(graph)
}

pub fn tagged_to_string(graph: &TaggedGraph) -> Result<String> {
    let nodes: BTreeMap<String, NodeRecord> = graph
        .nodes()
        .map(|(key, tag)| {
            (
                key.clone(),
                NodeRecord {
                    sys: tag.sys,
                    alt_sys: tag.alt_sys,
                    cable: tag.cable.clone(),
                    kind: tag.kind.clone(),
                },
            )
        })
        .collect();

    let mut edges = Vec::new();
    for edge in graph.edges() {
        let (a, b) = edge.key.endpoints();
        edges.push(EdgeRecord {
            from: a.to_string(),
            to: b.to_string(),
            sys: edge.sys,
            kind: edge.kind.clone(),
        });
        if !edge.key.is_loop() {
            edges.push(EdgeRecord {
                from: b.to_string(),
                to: a.to_string(),
                sys: edge.sys,
                kind: edge.kind.clone(),
            });
        }
    }

    Ok(serde_json::to_string_pretty(&TaggedGraphFile { nodes, edges })?)
}

pub fn load_tagged(path: impl AsRef<Path>) -> Result<TaggedGraph> {
    parse_tagged(&std::fs::read_to_string(path)?)
}

pub fn save_tagged(graph: &TaggedGraph, path: impl AsRef<Path>) -> Result<()> {
    Ok(std::fs::write(path, tagged_to_string(graph)?)?)
}

// ============================================================================
// Section ID map
// ============================================================================

pub fn parse_registry(json: &str) -> Result<SectionRegistry> {
    let raw: BTreeMap<String, u32> = serde_json::from_str(json)?;
    let mut ids = BTreeMap::new();
    for (key, id) in raw {
        ids.insert(SectionKey::parse(&key)?, id);
    }
    Ok(SectionRegistry::from_map(ids))
}

pub fn registry_to_string(registry: &SectionRegistry) -> Result<String> {
    let out: BTreeMap<String, u32> = registry
        .iter()
        .map(|(key, id)| (key.to_string(), id))
        .collect();
    Ok(serde_json::to_string_pretty(&out)?)
}

pub fn load_registry(path: impl AsRef<Path>) -> Result<SectionRegistry> {
    parse_registry(&std::fs::read_to_string(path)?)
}

pub fn save_registry(registry: &SectionRegistry, path: impl AsRef<Path>) -> Result<()> {
    Ok(std::fs::write(path, registry_to_string(registry)?)?)
}

// ============================================================================
// Forbidden-ID list
// ============================================================================

pub fn parse_forbidden(json: &str) -> Result<Vec<u32>> {
    Ok(serde_json::from_str(json)?)
}

pub fn forbidden_to_string(ids: &[u32]) -> Result<String> {
    Ok(serde_json::to_string(ids)?)
}

pub fn save_forbidden(ids: &[u32], path: impl AsRef<Path>) -> Result<()> {
    Ok(std::fs::write(path, forbidden_to_string(ids)?)?)
}

// ============================================================================
// Connection / points file
// ============================================================================

#[derive(Debug, Deserialize)]
struct PointRecord {
    x: f64,
    y: f64,
    z: f64,
}

impl From<PointRecord> for Point3 {
    fn from(r: PointRecord) -> Self {
        Point3::new(r.x, r.y, r.z)
    }
}

#[derive(Debug, Deserialize)]
struct ConnectorFile {
    projection: [f64; 3],
    #[serde(default)]
    #[allow(dead_code)] // advisory: which edge the projection landed on
    best_edge: Option<[[f64; 3]; 2]>,
    best_manhattan_path: ManhattanPath,
    #[serde(default)]
    tolerance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ManhattanPath {
    points: Vec<[f64; 3]>,
}

#[derive(Debug, Deserialize)]
struct PointsMetadata {
    #[serde(default)]
    tolerance: Option<f64>,
}

/// Parse a connection file, auto-detecting the encoding.
///
/// The connector form is recognized by its `projection` field; anything
/// else must carry `PE`/`PC` plus optional numbered `PI_1..PI_n` records.
pub fn parse_connection(json: &str) -> Result<ExternalConnection> {
    let value: Value = serde_json::from_str(json)?;
    if value.get("projection").is_some() {
        parse_connector(value)
    } else {
        parse_points(value)
    }
}

fn parse_connector(value: Value) -> Result<ExternalConnection> {
    let file: ConnectorFile = serde_json::from_value(value)?;
    let pc = Point3::from(file.projection);
    let points: Vec<Point3> = file
        .best_manhattan_path
        .points
        .into_iter()
        .map(Point3::from)
        .collect();

    let tol = file.tolerance.unwrap_or(crate::model::DEFAULT_TOLERANCE);
    let (pe, waypoints) = split_manhattan_path(&points, &pc, tol)?;
    Ok(ExternalConnection {
        pe,
        pc,
        waypoints,
        tolerance: file.tolerance,
    })
}

/// Extract PE and the interior waypoints from a manhattan path, orienting
/// it so the PC end is the one matching the projection.
fn split_manhattan_path(points: &[Point3], pc: &Point3, tol: f64) -> Result<(Point3, Vec<Point3>)> {
    match points {
        [] => Err(Error::MissingField("best_manhattan_path.points")),
        [only] => Ok((*only, Vec::new())),
        [first, .., last] => {
            let interior = &points[1..points.len() - 1];
            if first.distance(pc) <= tol {
                // Path runs PC → PE; PE is the far end.
                Ok((*last, interior.iter().rev().copied().collect()))
            } else {
                Ok((*first, interior.to_vec()))
            }
        }
    }
}

fn parse_points(value: Value) -> Result<ExternalConnection> {
    let Value::Object(map) = value else {
        return Err(Error::MissingField("PE"));
    };

    let take_point = |field: &'static str| -> Result<Point3> {
        let raw = map.get(field).ok_or(Error::MissingField(field))?;
        let record: PointRecord =
            serde_json::from_value(raw.clone()).map_err(|_| Error::MalformedCoordinate {
                input: raw.to_string(),
                reason: format!("{field} must be an object with x, y, z"),
            })?;
        Ok(record.into())
    };

    let pe = take_point("PE")?;
    let pc = take_point("PC")?;

    // PI_1..PI_n, ordered by their numeric suffix.
    let mut numbered: Vec<(u32, Point3)> = Vec::new();
    for (key, raw) in &map {
        let Some(suffix) = key.strip_prefix("PI_") else {
            continue;
        };
        let index: u32 = suffix.parse().map_err(|_| Error::MalformedCoordinate {
            input: key.clone(),
            reason: "intermediate point key must be PI_<number>".to_string(),
        })?;
        let record: PointRecord =
            serde_json::from_value(raw.clone()).map_err(|_| Error::MalformedCoordinate {
                input: raw.to_string(),
                reason: format!("{key} must be an object with x, y, z"),
            })?;
        numbered.push((index, record.into()));
    }
    numbered.sort_by_key(|(index, _)| *index);

    let tolerance = match map.get("metadata") {
        Some(meta) => serde_json::from_value::<PointsMetadata>(meta.clone())?.tolerance,
        None => None,
    };

    Ok(ExternalConnection {
        pe,
        pc,
        waypoints: numbered.into_iter().map(|(_, p)| p).collect(),
        tolerance,
    })
}

pub fn load_connection(path: impl AsRef<Path>) -> Result<ExternalConnection> {
    parse_connection(&std::fs::read_to_string(path)?)
}

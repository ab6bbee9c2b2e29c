//! # traynet — Tolerance-Aware Routing-Network Graphs
//!
//! A persistent 3D spatial graph for physical routing networks (cable trays,
//! conduits), partitioned into logical subsystems A, B and shared C. Several
//! independent tools read and write the same graph files across process
//! invocations; this crate is the layer that keeps them consistent:
//! coordinates within tolerance resolve to one node, structural edits never
//! break undirected symmetry, and section IDs stay stable.
//!
//! ## Pipeline
//!
//! ```text
//! adjacency file ─→ RouteGraph ─→ extend (PE/PC/PI) ─┐
//!                                                    ├─→ to_tagged ─→ tagged file ─→ pathfinder
//! tagged A file ─┐                                   │                    ↑
//! tagged B file ─┴─→ combine ────────────────────────┘   section map + forbidden IDs
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use traynet::{format, SectionRegistry, DEFAULT_TOLERANCE};
//! use traynet::model::Point3;
//!
//! # fn main() -> traynet::Result<()> {
//! let mut graph = format::parse_adjacency(
//!     r#"{"(0.000, 0.000, 0.000)": [[1, 0, 0]], "(1.000, 0.000, 0.000)": [[0, 0, 0]]}"#,
//! )?;
//!
//! // A connection point mid-edge splits that edge.
//! let (pc, _) = graph.ensure_connection_node(Point3::new(0.5, 0.0, 0.0), DEFAULT_TOLERANCE);
//! assert_eq!(graph.edge_count(), 2);
//!
//! let registry = SectionRegistry::build(&graph);
//! assert_eq!(registry.len(), 2);
//! # let _ = pc;
//! # Ok(())
//! # }
//! ```
//!
//! ## Execution model
//!
//! Single-threaded batch: each tool loads full files, mutates in memory, and
//! writes full files back. Lookups are linear scans — node counts are in the
//! hundreds to low thousands, and tolerance semantics must not change for
//! the sake of an index.

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod graph;
pub mod tagged;
pub mod sections;
pub mod format;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    point_on_segment, CableSet, Point3, SectionKey, System, DEFAULT_TOLERANCE, STRICT_SNAP_LIMIT,
};

// ============================================================================
// Re-exports: Graph layers
// ============================================================================

pub use graph::{
    extend::{extend, extend_tagged, ExtensionReport, ExternalConnection},
    ConnectionKind, RouteGraph,
};
pub use tagged::{combine, infer_system, to_tagged, NodeTag, TagOverlay, TaggedEdge, TaggedGraph};
pub use sections::{resolve_forbidden, resolve_pair, ForbiddenReport, SectionRegistry};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed coordinate {input:?}: {reason}")]
    MalformedCoordinate { input: String, reason: String },

    #[error("missing required field {0:?}")]
    MissingField(&'static str),

    #[error("unrecognized subsystem {0:?}, expected A, B or C")]
    MalformedSystem(String),

    #[error("no edge between {a} and {b}")]
    EdgeNotFound { a: String, b: String },

    #[error("point {key} snaps {distance:.4} away, beyond the strict limit")]
    SnapOutOfTolerance { key: String, distance: f64 },

    #[error("section {0} has no registered ID")]
    UnknownSection(String),

    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

//! # Routing-Network Model
//!
//! Pure data and geometry shared by every layer: points, subsystem tags,
//! undirected-edge keys, segment math.
//!
//! Design rule: no I/O, no state, no graph types here. Everything in this
//! module is a value with well-defined equality; the graph layers build on
//! top of it.

pub mod point;
pub mod geometry;
pub mod system;
pub mod section;

pub use point::Point3;
pub use geometry::{point_on_segment, segment_distance, segment_projection, PROJECTION_SLACK};
pub use system::{CableSet, System};
pub use section::{SectionKey, SECTION_KEY_SEPARATOR};

/// Default tolerance for node identity: two coordinates within 1 mm are the
/// same network node.
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// Strict-mode snap limit for operator-supplied coordinates (1 mm).
pub const STRICT_SNAP_LIMIT: f64 = 1e-3;

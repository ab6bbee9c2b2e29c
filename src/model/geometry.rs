//! Segment geometry used by edge-split decisions.
//!
//! Pure functions, no state. All tolerance policy lives with the callers;
//! these functions only answer geometric questions.

use super::Point3;

/// Slack applied to the projection parameter at segment endpoints, so that
/// points sitting exactly on an endpoint still count as on-segment.
pub const PROJECTION_SLACK: f64 = 1e-12;

/// Project `p` onto the segment `a → b`.
///
/// Returns the foot of the perpendicular and the projection parameter `t`
/// (0 at `a`, 1 at `b`), or `None` when the segment is degenerate or the
/// projection falls outside `[-PROJECTION_SLACK, 1 + PROJECTION_SLACK]`.
pub fn segment_projection(p: &Point3, a: &Point3, b: &Point3) -> Option<(Point3, f64)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dz = b.z - a.z;
    let len2 = dx * dx + dy * dy + dz * dz;
    if len2 == 0.0 {
        return None;
    }

    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy + (p.z - a.z) * dz) / len2;
    if t < -PROJECTION_SLACK || t > 1.0 + PROJECTION_SLACK {
        return None;
    }

    let foot = Point3::new(a.x + t * dx, a.y + t * dy, a.z + t * dz);
    Some((foot, t))
}

/// Perpendicular distance from `p` to segment `a → b`, when the projection
/// lands on the segment. `None` otherwise.
pub fn segment_distance(p: &Point3, a: &Point3, b: &Point3) -> Option<f64> {
    segment_projection(p, a, b).map(|(foot, _)| p.distance(&foot))
}

/// Closed on-segment test: `p` lies on `a → b` within `tol`.
///
/// Endpoints pass (t ≈ 0 or t ≈ 1). A degenerate segment never contains
/// anything.
pub fn point_on_segment(p: &Point3, a: &Point3, b: &Point3, tol: f64) -> bool {
    segment_distance(p, a, b).is_some_and(|d| d <= tol)
}

use crate::math::{Point3, Vector3};

use super::edge::EdgeId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a polygon in the topology store.
    pub struct PolygonId;
}

/// A polygon and its cached triangulation.
///
/// `edges[i]` runs from `verts[i]` to `verts[(i + 1) % n]`.
#[derive(Debug, Clone)]
pub struct PolygonData {
    /// Corners in winding order.
    pub verts: Vec<VertexId>,
    /// Sides in winding order.
    pub edges: Vec<EdgeId>,
    /// Triangulation over the polygon's own corners.
    pub triangles: Vec<[VertexId; 3]>,
    /// Cached centroid of the corners.
    pub center: Point3,
    /// Cached unit normal.
    pub normal: Vector3,
}

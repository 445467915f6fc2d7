use crate::math::{Point3, Vector3};

use super::edge::EdgeId;
use super::polygon::PolygonId;

slotmap::new_key_type! {
    /// Unique identifier for a polygon corner vertex in the topology store.
    pub struct VertexId;
}

/// A polygon corner.
///
/// Every polygon owns its own vertex records; coincident corners of
/// neighbouring polygons are grouped by a merged vertex.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The 3D position of the vertex.
    pub position: Point3,
    /// Edge of the owning polygon that ends at this vertex.
    pub prev_edge: EdgeId,
    /// Edge of the owning polygon that starts at this vertex.
    pub next_edge: EdgeId,
    /// The polygon this corner belongs to.
    pub polygon: PolygonId,
    /// Shading normal, shared across the vertex's normal group.
    pub normal: Vector3,
}

impl VertexData {
    /// Creates a detached vertex at the given position.
    ///
    /// Edge and polygon links stay null until the vertex is wired into a
    /// polygon.
    #[must_use]
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            prev_edge: EdgeId::default(),
            next_edge: EdgeId::default(),
            polygon: PolygonId::default(),
            normal: Vector3::zeros(),
        }
    }
}

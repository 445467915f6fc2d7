use super::polygon::PolygonId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a polygon side in the topology store.
    pub struct EdgeId;
}

/// A directed polygon side, following the winding of its polygon.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// Start vertex.
    pub tail: VertexId,
    /// End vertex.
    pub head: VertexId,
    /// The polygon this side belongs to.
    pub polygon: PolygonId,
}

impl EdgeData {
    /// Creates a detached edge between two vertices.
    #[must_use]
    pub fn new(tail: VertexId, head: VertexId) -> Self {
        Self {
            tail,
            head,
            polygon: PolygonId::default(),
        }
    }
}

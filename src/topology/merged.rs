use super::edge::EdgeId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a merged (welded) vertex.
    pub struct MergedVertexId;
}

slotmap::new_key_type! {
    /// Unique identifier for a merged (welded) edge.
    pub struct MergedEdgeId;
}

slotmap::new_key_type! {
    /// Unique identifier for a group of vertices sharing one shading normal.
    pub struct NormalGroupId;
}

/// Vertices considered the same topological point.
#[derive(Debug, Clone, Default)]
pub struct MergedVertexData {
    /// Member vertices, unordered.
    pub verts: Vec<VertexId>,
}

/// One border edge, or the two opposite sides of an interior edge.
#[derive(Debug, Clone, Default)]
pub struct MergedEdgeData {
    /// Member edges; one for a border edge, two for an interior edge.
    pub edges: Vec<EdgeId>,
}

impl MergedEdgeData {
    /// Returns `true` if only one polygon borders this edge.
    #[must_use]
    pub fn is_border(&self) -> bool {
        self.edges.len() == 1
    }

    /// Returns the member that is not `edge`, if any.
    #[must_use]
    pub fn partner_of(&self, edge: EdgeId) -> Option<EdgeId> {
        self.edges.iter().copied().find(|&e| e != edge)
    }
}

/// Vertices whose shading normals are averaged together.
#[derive(Debug, Clone, Default)]
pub struct NormalGroupData {
    /// Member vertices, unordered.
    pub verts: Vec<VertexId>,
}

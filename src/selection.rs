use std::collections::HashSet;

use crate::topology::{MergedEdgeId, MergedVertexId, VertexId};

/// Snapshot of the host's selection, read by the editing operations.
///
/// Normal-mode selection is kept per vertex: a normal group is selected when
/// all of its members are.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Selected merged edges.
    pub edges: HashSet<MergedEdgeId>,
    /// Selected merged vertices.
    pub vertices: HashSet<MergedVertexId>,
    /// Vertices whose normal group is selected.
    pub normals: HashSet<VertexId>,
}

impl Selection {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a selection holding the given merged edges.
    #[must_use]
    pub fn with_edges<I: IntoIterator<Item = MergedEdgeId>>(edges: I) -> Self {
        Self {
            edges: edges.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Applies a notification emitted by an operation.
    pub fn apply(&mut self, update: &SelectionUpdate) {
        match update {
            SelectionUpdate::Vertices { added, removed } => {
                for id in removed {
                    self.vertices.remove(id);
                }
                self.vertices.extend(added.iter().copied());
            }
            SelectionUpdate::Edges { added, removed } => {
                for id in removed {
                    self.edges.remove(id);
                }
                self.edges.extend(added.iter().copied());
            }
            SelectionUpdate::Normals { added } => {
                self.normals.extend(added.iter().copied());
            }
        }
    }
}

/// One-shot notification that an edit changed what must count as selected.
///
/// Emitted when a weld or smoothing joins selected and unselected elements,
/// or when a selected element stops existing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionUpdate {
    /// Merged vertices to add to / drop from the vertex selection.
    Vertices {
        added: Vec<MergedVertexId>,
        removed: Vec<MergedVertexId>,
    },
    /// Merged edges to add to / drop from the edge selection.
    Edges {
        added: Vec<MergedEdgeId>,
        removed: Vec<MergedEdgeId>,
    },
    /// The unselected remainder of a normal group that became partially
    /// selected.
    Normals { added: Vec<VertexId> },
}

use crate::error::Result;
use crate::topology::{MergedEdgeId, TopologyStore};

/// Lists every border merged edge of the mesh.
pub struct BorderEdges;

impl BorderEdges {
    /// Creates a new `BorderEdges` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if a record is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<Vec<MergedEdgeId>> {
        let mut border = Vec::new();
        for m in store.merged_edge_ids() {
            if store.merged_edge(m)?.is_border() {
                border.push(m);
            }
        }
        Ok(border)
    }
}

impl Default for BorderEdges {
    fn default() -> Self {
        Self::new()
    }
}

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::Result;
use crate::factory::GeometryFactory;
use crate::host::EditHost;
use crate::operations::shading::{conform_normal_groups, refresh_group_normals};
use crate::topology::{MergedEdgeId, MergedVertexId, TopologyStore, VertexId};

/// Splits branch vertices along a border.
///
/// A merged vertex touched by the given edges whose corners fall into more
/// than one wedge (corners joined through interior edges) is replaced by one
/// new merged vertex per wedge. Normal groups follow the new merged vertices.
pub struct FixBorder {
    edges: Vec<MergedEdgeId>,
}

impl FixBorder {
    /// Creates a new `FixBorder` operation.
    #[must_use]
    pub fn new(edges: Vec<MergedEdgeId>) -> Self {
        Self { edges }
    }

    /// Executes the operation, returning the merged vertices it created.
    ///
    /// # Errors
    ///
    /// Returns an error if a merged edge or one of its records is missing.
    pub fn execute<F, H>(
        &self,
        store: &mut TopologyStore,
        factory: &mut F,
        host: &mut H,
    ) -> Result<Vec<MergedVertexId>>
    where
        F: GeometryFactory,
        H: EditHost + ?Sized,
    {
        let mut touched = Vec::new();
        let mut seen = HashSet::new();
        for &m in &self.edges {
            for &e in &store.merged_edge(m)?.edges {
                let (tail, head) = store.merged_ends(e)?;
                for mv in [tail, head] {
                    if seen.insert(mv) {
                        touched.push(mv);
                    }
                }
            }
        }

        let mut branches: Vec<(MergedVertexId, Vec<Vec<VertexId>>)> = Vec::new();
        for mv in touched {
            let wedges = store.wedges(mv, |_| Ok(false))?;
            if wedges.len() > 1 {
                debug!(?mv, passes = wedges.len(), "branch vertex on border");
                branches.push((mv, wedges));
            }
        }
        if branches.is_empty() {
            return Ok(Vec::new());
        }

        host.snapshot_for_undo(store);
        let mut created = Vec::new();
        for (_, wedges) in &branches {
            for wedge in wedges {
                created.push(factory.create_merged_vertex(store, wedge)?);
            }
        }
        let groups = conform_normal_groups(store, factory, &created)?;
        refresh_group_normals(store, groups)?;

        info!(
            branches = branches.len(),
            created = created.len(),
            "split branch vertices"
        );
        debug_assert!(store.validate().is_ok());
        Ok(created)
    }
}

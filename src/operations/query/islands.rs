use crate::error::Result;
use crate::topology::{PolygonId, TopologyStore};
use crate::union_find::DisjointSet;

/// Groups polygons into islands connected through interior edges.
///
/// Polygons that only touch at a welded vertex belong to different islands.
pub struct Islands;

impl Islands {
    /// Creates a new `Islands` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the query. Islands and their polygons follow store order.
    ///
    /// # Errors
    ///
    /// Returns an error if a record is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<Vec<Vec<PolygonId>>> {
        let mut sets = DisjointSet::new();
        for m in store.merged_edge_ids() {
            if let &[a, b] = store.merged_edge(m)?.edges.as_slice() {
                sets.union(store.edge(a)?.polygon, store.edge(b)?.polygon);
            }
        }
        Ok(sets.groups(store.polygon_ids()))
    }
}

impl Default for Islands {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::factory::StoreFactory;
    use crate::math::Point3;
    use crate::operations::creation::{MakeMesh, NormalMode};

    #[test]
    fn vertex_contact_does_not_join_islands() {
        let mut store = TopologyStore::new();
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
        ];
        let faces = vec![vec![0, 1, 2], vec![0, 2, 3], vec![0, 4, 5]];
        MakeMesh::new(positions, faces, NormalMode::Smooth)
            .execute(&mut store, &mut StoreFactory)
            .unwrap();

        let islands = Islands::new().execute(&store).unwrap();
        let mut sizes: Vec<_> = islands.iter().map(Vec::len).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![1, 2]);
    }
}

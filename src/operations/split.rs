use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::config::EditConfig;
use crate::error::{Result, TopologyError};
use crate::factory::GeometryFactory;
use crate::host::EditHost;
use crate::operations::shading::{conform_normal_groups, refresh_group_normals};
use crate::selection::{Selection, SelectionUpdate};
use crate::topology::{EdgeId, MergedEdgeId, MergedVertexId, TopologyStore, VertexId};

/// Cuts the welds along a set of merged edges without deleting geometry.
///
/// Around every endpoint of the selected edges, corners are grouped into
/// wedges bounded by selected or border edges. Each extra wedge moves into a
/// new merged vertex, and each selected interior edge whose endpoints come
/// apart is demoted into two border edges.
pub struct SplitEdges {
    edges: Vec<MergedEdgeId>,
}

struct Plan {
    wedges: Vec<(MergedVertexId, Vec<Vec<VertexId>>)>,
    demote: Vec<(MergedEdgeId, EdgeId)>,
}

impl SplitEdges {
    /// Creates a new `SplitEdges` operation.
    #[must_use]
    pub fn new(edges: Vec<MergedEdgeId>) -> Self {
        Self { edges }
    }

    /// Executes the split. Returns `false` if no weld could be cut.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a record is
    /// missing.
    pub fn execute<F, H>(
        &self,
        store: &mut TopologyStore,
        factory: &mut F,
        host: &mut H,
        selection: &Selection,
        config: &EditConfig,
    ) -> Result<bool>
    where
        F: GeometryFactory,
        H: EditHost + ?Sized,
    {
        config.validate()?;
        let plan = self.plan(store)?;
        if plan.wedges.is_empty() && plan.demote.is_empty() {
            debug!(edges = self.edges.len(), "nothing to split");
            return Ok(false);
        }

        host.snapshot_for_undo(store);

        let mut affected = Vec::new();
        let mut new_merged_vertices = Vec::new();
        for (mv, wedges) in &plan.wedges {
            affected.push(*mv);
            for wedge in wedges.iter().skip(1) {
                let id = factory.create_merged_vertex(store, wedge)?;
                affected.push(id);
                if selection.vertices.contains(mv) {
                    new_merged_vertices.push(id);
                }
            }
        }

        let mut new_merged_edges = Vec::new();
        for &(merged, edge) in &plan.demote {
            let id = factory.create_merged_edge(store, Some(edge))?;
            if selection.edges.contains(&merged) {
                new_merged_edges.push(id);
            }
        }

        let groups = conform_normal_groups(store, factory, &affected)?;
        if !config.lock_normals_on_split {
            refresh_group_normals(store, groups)?;
        }

        if !new_merged_vertices.is_empty() {
            host.update_selection(SelectionUpdate::Vertices {
                added: new_merged_vertices,
                removed: Vec::new(),
            });
        }
        if !new_merged_edges.is_empty() {
            host.update_selection(SelectionUpdate::Edges {
                added: new_merged_edges,
                removed: Vec::new(),
            });
        }

        info!(
            split_vertices = plan.wedges.len(),
            demoted_edges = plan.demote.len(),
            "split welds"
        );
        debug_assert!(store.validate().is_ok());
        Ok(true)
    }

    fn plan(&self, store: &TopologyStore) -> Result<Plan> {
        let selected: HashSet<MergedEdgeId> = self.edges.iter().copied().collect();
        let is_cut = |out: EdgeId| -> std::result::Result<bool, TopologyError> {
            let merged = store.merged_edge_of(out)?;
            Ok(selected.contains(&merged) || store.merged_edge(merged)?.is_border())
        };

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

        // corner -> (merged vertex, wedge index) after the split
        let mut label: HashMap<VertexId, (MergedVertexId, usize)> = HashMap::new();
        let mut wedges = Vec::new();
        for mv in touched {
            let groups = store.wedges(mv, &is_cut)?;
            if groups.len() < 2 {
                continue;
            }
            for (i, group) in groups.iter().enumerate() {
                for &v in group {
                    label.insert(v, (mv, i));
                }
            }
            wedges.push((mv, groups));
        }

        let label_of = |v: VertexId| -> Result<(MergedVertexId, usize)> {
            match label.get(&v) {
                Some(&l) => Ok(l),
                None => Ok((store.merged_vertex_of(v)?, 0)),
            }
        };
        let mut demote = Vec::new();
        for &m in &self.edges {
            let &[a, b] = store.merged_edge(m)?.edges.as_slice() else {
                continue;
            };
            let (ea, eb) = (store.edge(a)?, store.edge(b)?);
            if label_of(ea.tail)? != label_of(eb.head)?
                || label_of(ea.head)? != label_of(eb.tail)?
            {
                demote.push((m, b));
            }
        }
        Ok(Plan { wedges, demote })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::factory::StoreFactory;
    use crate::host::RecordingHost;
    use crate::math::Point3;
    use crate::operations::creation::{MakeMesh, NormalMode};
    use crate::topology::PolygonId;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    /// 2x2 grid of quads; returns the polygons.
    fn grid(store: &mut TopologyStore) -> Vec<PolygonId> {
        let positions = vec![
            p(0.0, 0.0),
            p(1.0, 0.0),
            p(2.0, 0.0),
            p(0.0, 1.0),
            p(1.0, 1.0),
            p(2.0, 1.0),
            p(0.0, 2.0),
            p(1.0, 2.0),
            p(2.0, 2.0),
        ];
        let faces = vec![
            vec![0, 1, 4, 3],
            vec![1, 2, 5, 4],
            vec![3, 4, 7, 6],
            vec![4, 5, 8, 7],
        ];
        MakeMesh::new(positions, faces, NormalMode::Smooth)
            .execute(store, &mut StoreFactory)
            .unwrap()
    }

    /// Interior merged edge between two polygons.
    fn shared_edge(store: &TopologyStore, a: PolygonId, b: PolygonId) -> MergedEdgeId {
        store
            .polygon(a)
            .unwrap()
            .edges
            .iter()
            .find(|&&e| {
                store
                    .partner(e)
                    .unwrap()
                    .is_some_and(|q| store.edge(q).unwrap().polygon == b)
            })
            .map(|&e| store.merged_edge_of(e).unwrap())
            .unwrap()
    }

    #[test]
    fn enclosed_edge_is_not_splittable() {
        let mut store = TopologyStore::new();
        let mut positions = Vec::new();
        for j in 0..4 {
            for i in 0..4 {
                positions.push(p(f64::from(i), f64::from(j)));
            }
        }
        let mut faces = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                let a = j * 4 + i;
                faces.push(vec![a, a + 1, a + 5, a + 4]);
            }
        }
        let polys = MakeMesh::new(positions, faces, NormalMode::Smooth)
            .execute(&mut store, &mut StoreFactory)
            .unwrap();
        // both ends of the center quad's bottom edge are interior vertices
        let merged = shared_edge(&store, polys[1], polys[4]);
        let mut host = RecordingHost::new();

        let split = SplitEdges::new(vec![merged])
            .execute(
                &mut store,
                &mut StoreFactory,
                &mut host,
                &Selection::new(),
                &EditConfig::default(),
            )
            .unwrap();

        assert!(!split);
        assert_eq!(host.snapshots, 0);
        assert_eq!(store.merged_edge(merged).unwrap().edges.len(), 2);
    }

    #[test]
    fn cutting_a_line_across_the_grid_separates_it() {
        let mut store = TopologyStore::new();
        let polys = grid(&mut store);
        let left = shared_edge(&store, polys[0], polys[1]);
        let right = shared_edge(&store, polys[2], polys[3]);
        let merged_before = store.num_merged_vertices();
        let mut host = RecordingHost::new();
        let selection = Selection::with_edges([left, right]);

        let split = SplitEdges::new(vec![left, right])
            .execute(&mut store, &mut StoreFactory, &mut host, &selection, &EditConfig::default())
            .unwrap();

        assert!(split);
        assert_eq!(host.snapshots, 1);
        assert_eq!(store.num_merged_vertices(), merged_before + 3);
        assert!(store.is_border(store.merged_edge(left).unwrap().edges[0]).unwrap());
        assert!(store.is_border(store.merged_edge(right).unwrap().edges[0]).unwrap());
        assert!(matches!(
            host.selection_updates.as_slice(),
            [SelectionUpdate::Edges { added, .. }] if added.len() == 2
        ));
        store.validate().unwrap();
    }

    #[test]
    fn single_edge_from_border_opens_a_slit() {
        let mut store = TopologyStore::new();
        let polys = grid(&mut store);
        let merged = shared_edge(&store, polys[0], polys[1]);
        let merged_before = store.num_merged_vertices();

        let split = SplitEdges::new(vec![merged])
            .execute(
                &mut store,
                &mut StoreFactory,
                &mut RecordingHost::new(),
                &Selection::new(),
                &EditConfig::default(),
            )
            .unwrap();

        assert!(split);
        // the border end comes apart, the center stays welded
        assert_eq!(store.num_merged_vertices(), merged_before + 1);
        assert_eq!(store.merged_edge(merged).unwrap().edges.len(), 1);
        store.validate().unwrap();
    }

    #[test]
    fn locked_normals_keep_their_vectors() {
        let mut store = TopologyStore::new();
        let polys = grid(&mut store);
        let left = shared_edge(&store, polys[0], polys[1]);
        let right = shared_edge(&store, polys[2], polys[3]);
        let before: Vec<_> = store
            .vertex_ids()
            .map(|v| store.vertex(v).unwrap().normal)
            .collect();
        let config = EditConfig {
            lock_normals_on_split: true,
            ..EditConfig::default()
        };
        SplitEdges::new(vec![left, right])
            .execute(
                &mut store,
                &mut StoreFactory,
                &mut RecordingHost::new(),
                &Selection::new(),
                &config,
            )
            .unwrap();
        let after: Vec<_> = store
            .vertex_ids()
            .map(|v| store.vertex(v).unwrap().normal)
            .collect();
        assert_eq!(before, after);
    }
}

//! Joining and splitting of normal-sharing groups along edges.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::{Result, TopologyError};
use crate::factory::GeometryFactory;
use crate::host::EditHost;
use crate::operations::shading::refresh_group_normals;
use crate::operations::EditOutcome;
use crate::selection::{Selection, SelectionUpdate};
use crate::topology::{EdgeId, MergedEdgeId, MergedVertexId, NormalGroupId, TopologyStore, VertexId};
use crate::union_find::DisjointSet;

/// Makes shading continuous across a set of interior edges.
///
/// At both ends of every selected interior edge, the normal groups of the
/// two facing corners are joined.
pub struct SmoothNormals {
    edges: Vec<MergedEdgeId>,
}

impl SmoothNormals {
    /// Creates a new `SmoothNormals` operation.
    #[must_use]
    pub fn new(edges: Vec<MergedEdgeId>) -> Self {
        Self { edges }
    }

    /// Executes the operation.
    ///
    /// When a joined group is only partly covered by the normal selection,
    /// the uncovered corners are sent to the host as
    /// [`SelectionUpdate::Normals`].
    ///
    /// # Errors
    ///
    /// Returns an error if a merged edge or one of its records is missing.
    pub fn execute<H: EditHost + ?Sized>(
        &self,
        store: &mut TopologyStore,
        host: &mut H,
        selection: &Selection,
    ) -> Result<EditOutcome> {
        let mut sets: DisjointSet<NormalGroupId> = DisjointSet::new();
        let mut order: Vec<NormalGroupId> = Vec::new();
        let mut joins = 0usize;
        for &m in &self.edges {
            let &[a, b] = store.merged_edge(m)?.edges.as_slice() else {
                continue;
            };
            let (ea, eb) = (store.edge(a)?, store.edge(b)?);
            for (x, y) in [(ea.tail, eb.head), (ea.head, eb.tail)] {
                let gx = store.normal_group_of(x)?;
                let gy = store.normal_group_of(y)?;
                for g in [gx, gy] {
                    if !order.contains(&g) {
                        order.push(g);
                    }
                }
                if sets.union(gx, gy) {
                    joins += 1;
                }
            }
        }
        if joins == 0 {
            debug!(edges = self.edges.len(), "edges already smooth");
            return Ok(EditOutcome::UNCHANGED);
        }

        host.snapshot_for_undo(store);
        let mut joined = Vec::new();
        for group in sets.groups(order) {
            let Some((&keeper, rest)) = group.split_first() else {
                continue;
            };
            for &g in rest {
                let members = store.normal_group(g)?.verts.clone();
                for v in members {
                    store.share_normal(v, keeper)?;
                }
            }
            joined.push(keeper);
        }
        refresh_group_normals(store, joined.iter().copied())?;

        let mut selection_changed = false;
        for g in joined {
            let members = &store.normal_group(g)?.verts;
            let unselected: Vec<VertexId> = members
                .iter()
                .copied()
                .filter(|v| !selection.normals.contains(v))
                .collect();
            if !unselected.is_empty() && unselected.len() < members.len() {
                host.update_selection(SelectionUpdate::Normals { added: unselected });
                selection_changed = true;
            }
        }

        info!(joins, "smoothed normals");
        debug_assert!(store.validate().is_ok());
        Ok(EditOutcome {
            changed: true,
            selection_changed,
        })
    }
}

/// Makes shading discontinuous across a set of edges.
///
/// Around every endpoint of the selected edges, corners are grouped into
/// wedges bounded by selected edges, border edges and edges that are already
/// sharp at that point. Each normal group is then cut along the wedges, so
/// groups are only ever subdivided.
pub struct SharpenNormals {
    edges: Vec<MergedEdgeId>,
}

impl SharpenNormals {
    /// Creates a new `SharpenNormals` operation.
    #[must_use]
    pub fn new(edges: Vec<MergedEdgeId>) -> Self {
        Self { edges }
    }

    /// Executes the operation.
    ///
    /// Normal selection is kept per corner, so a subdivided group keeps the
    /// coverage it had and `selection_changed` is always `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if a merged edge or one of its records is missing.
    pub fn execute<F, H>(
        &self,
        store: &mut TopologyStore,
        factory: &mut F,
        host: &mut H,
    ) -> Result<EditOutcome>
    where
        F: GeometryFactory,
        H: EditHost + ?Sized,
    {
        let splits = self.plan(store)?;
        if splits.is_empty() {
            debug!(edges = self.edges.len(), "edges already sharp");
            return Ok(EditOutcome::UNCHANGED);
        }

        host.snapshot_for_undo(store);
        let mut touched = Vec::new();
        for (group, parts) in &splits {
            touched.push(*group);
            for part in parts.iter().skip(1) {
                touched.push(factory.create_normal_group(store, part)?);
            }
        }
        refresh_group_normals(store, touched)?;

        info!(groups = splits.len(), "sharpened normals");
        debug_assert!(store.validate().is_ok());
        Ok(EditOutcome {
            changed: true,
            selection_changed: false,
        })
    }

    fn plan(&self, store: &TopologyStore) -> Result<Vec<(NormalGroupId, Vec<Vec<VertexId>>)>> {
        let selected: HashSet<MergedEdgeId> = self.edges.iter().copied().collect();
        let is_cut = |out: EdgeId| -> std::result::Result<bool, TopologyError> {
            let merged = store.merged_edge_of(out)?;
            if selected.contains(&merged) {
                return Ok(true);
            }
            let Some(across) = store.merged_edge(merged)?.partner_of(out) else {
                return Ok(true);
            };
            let here = store.edge(out)?.tail;
            let there = store.edge(across)?.head;
            Ok(store.normal_group_of(here)? != store.normal_group_of(there)?)
        };

        let mut touched: Vec<MergedVertexId> = Vec::new();
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

        let mut splits = Vec::new();
        for mv in touched {
            let wedges = store.wedges(mv, &is_cut)?;
            if wedges.len() < 2 {
                continue;
            }
            let mut groups: Vec<NormalGroupId> = Vec::new();
            for &v in &store.merged_vertex(mv)?.verts {
                let g = store.normal_group_of(v)?;
                if !groups.contains(&g) {
                    groups.push(g);
                }
            }
            for g in groups {
                let members = &store.normal_group(g)?.verts;
                let parts: Vec<Vec<VertexId>> = wedges
                    .iter()
                    .map(|w| members.iter().copied().filter(|v| w.contains(v)).collect::<Vec<_>>())
                    .filter(|part| !part.is_empty())
                    .collect();
                if parts.len() > 1 {
                    splits.push((g, parts));
                }
            }
        }
        Ok(splits)
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

    /// Two triangles folded along their shared edge, with flat normals.
    fn folded(store: &mut TopologyStore) -> Vec<PolygonId> {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        MakeMesh::new(positions, vec![vec![0, 1, 2], vec![0, 2, 3]], NormalMode::Flat)
            .execute(store, &mut StoreFactory)
            .unwrap()
    }

    fn interior(store: &TopologyStore) -> MergedEdgeId {
        store
            .merged_edge_ids()
            .find(|&m| store.merged_edge(m).unwrap().edges.len() == 2)
            .unwrap()
    }

    #[test]
    fn smoothing_joins_facing_corners() {
        let mut store = TopologyStore::new();
        folded(&mut store);
        let edge = interior(&store);
        let mut host = RecordingHost::new();

        let outcome = SmoothNormals::new(vec![edge])
            .execute(&mut store, &mut host, &Selection::new())
            .unwrap();

        assert!(outcome.changed);
        assert!(!outcome.selection_changed);
        assert_eq!(store.num_normal_groups(), 4);
        assert_eq!(host.snapshots, 1);
        store.validate().unwrap();
    }

    #[test]
    fn smoothing_twice_is_a_no_op() {
        let mut store = TopologyStore::new();
        folded(&mut store);
        let edge = interior(&store);
        let mut host = RecordingHost::new();
        SmoothNormals::new(vec![edge])
            .execute(&mut store, &mut host, &Selection::new())
            .unwrap();
        let again = SmoothNormals::new(vec![edge])
            .execute(&mut store, &mut host, &Selection::new())
            .unwrap();
        assert_eq!(again, EditOutcome::UNCHANGED);
        assert_eq!(host.snapshots, 1);
    }

    #[test]
    fn partly_selected_group_grows_the_selection() {
        let mut store = TopologyStore::new();
        folded(&mut store);
        let edge = interior(&store);
        let a = store.merged_edge(edge).unwrap().edges[0];
        let tail = store.edge(a).unwrap().tail;
        let mut selection = Selection::new();
        selection.normals.insert(tail);
        let mut host = RecordingHost::new();

        let outcome = SmoothNormals::new(vec![edge])
            .execute(&mut store, &mut host, &selection)
            .unwrap();

        assert!(outcome.selection_changed);
        assert!(matches!(
            host.selection_updates.as_slice(),
            [SelectionUpdate::Normals { added }] if added.len() == 1 && !added.contains(&tail)
        ));
    }

    #[test]
    fn sharpen_undoes_smooth() {
        let mut store = TopologyStore::new();
        folded(&mut store);
        let edge = interior(&store);
        let partition = |store: &TopologyStore| {
            let mut groups: Vec<Vec<VertexId>> = store
                .normal_group_ids()
                .map(|g| {
                    let mut verts = store.normal_group(g).unwrap().verts.clone();
                    verts.sort();
                    verts
                })
                .collect();
            groups.sort();
            groups
        };
        let before = partition(&store);

        SmoothNormals::new(vec![edge])
            .execute(&mut store, &mut RecordingHost::new(), &Selection::new())
            .unwrap();
        assert_ne!(partition(&store), before);

        let outcome = SharpenNormals::new(vec![edge])
            .execute(&mut store, &mut StoreFactory, &mut RecordingHost::new())
            .unwrap();
        assert!(outcome.changed);
        assert_eq!(partition(&store), before);
        store.validate().unwrap();
    }

    #[test]
    fn sharpening_a_sharp_edge_does_nothing() {
        let mut store = TopologyStore::new();
        folded(&mut store);
        let edge = interior(&store);
        let outcome = SharpenNormals::new(vec![edge])
            .execute(&mut store, &mut StoreFactory, &mut RecordingHost::new())
            .unwrap();
        assert_eq!(outcome, EditOutcome::UNCHANGED);
    }
}

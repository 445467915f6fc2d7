use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::topology::{EdgeId, MergedEdgeId, MergedVertexId, PolygonId, TopologyStore, VertexId};

/// A place where a border loop passes through a merged vertex it has
/// already visited.
///
/// `verts` is the replacement merged vertex that would separate this pass
/// from the earlier ones. It is not committed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSplit {
    /// Loop position whose edge ends at the revisited merged vertex.
    pub index: usize,
    /// The merged vertex visited more than once.
    pub merged_vertex: MergedVertexId,
    /// Corners of the merged vertex swept on this pass.
    pub verts: Vec<VertexId>,
}

/// One closed boundary component of a region, in the winding of the region's
/// polygons.
#[derive(Debug, Clone, Default)]
pub struct BorderLoop {
    /// Border merged edges in walk order.
    pub edges: Vec<MergedEdgeId>,
    /// The member of each merged edge that belongs to a region polygon.
    pub sides: Vec<EdgeId>,
    /// Self-intersections found along the loop.
    pub splits: Vec<LoopSplit>,
}

impl BorderLoop {
    /// Number of edges in the loop.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if the loop has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Extracts the border loops of a set of polygons.
pub struct BorderLoops {
    region: Vec<PolygonId>,
}

impl BorderLoops {
    /// Creates a new `BorderLoops` query over the given region.
    #[must_use]
    pub fn new(region: Vec<PolygonId>) -> Self {
        Self { region }
    }

    /// Merged edges on the boundary of the region, each with its region-side
    /// member, in discovery order.
    ///
    /// A merged edge whose two members are both in the region cancels out.
    ///
    /// # Errors
    ///
    /// Returns an error if a region polygon or one of its records is missing.
    pub fn border_edges(
        &self,
        store: &TopologyStore,
    ) -> std::result::Result<Vec<(MergedEdgeId, EdgeId)>, TopologyError> {
        let mut order: Vec<MergedEdgeId> = Vec::new();
        let mut side: HashMap<MergedEdgeId, EdgeId> = HashMap::new();
        let mut seen_polygons = HashSet::new();
        for &p in &self.region {
            if !seen_polygons.insert(p) {
                continue;
            }
            for &e in &store.polygon(p)?.edges {
                let m = store.merged_edge_of(e)?;
                if side.remove(&m).is_none() {
                    side.insert(m, e);
                    order.push(m);
                }
            }
        }
        Ok(order
            .into_iter()
            .filter_map(|m| side.get(&m).map(|&e| (m, e)))
            .collect())
    }

    /// Executes the extraction.
    ///
    /// # Errors
    ///
    /// Returns an error if a record is missing or the border does not close
    /// into loops.
    pub fn execute(&self, store: &TopologyStore) -> Result<Vec<BorderLoop>> {
        let border = self.border_edges(store)?;
        let in_border: HashSet<MergedEdgeId> = border.iter().map(|&(m, _)| m).collect();
        let mut visited: HashSet<MergedEdgeId> = HashSet::new();
        let mut loops = Vec::new();

        for &(start_merged, start) in &border {
            if visited.contains(&start_merged) {
                continue;
            }
            let mut current_loop = BorderLoop::default();
            let mut heads: HashSet<MergedVertexId> = HashSet::new();
            let mut current = start;
            loop {
                let merged = store.merged_edge_of(current)?;
                if !visited.insert(merged) {
                    return Err(TopologyError::InvalidTopology(
                        "border walk entered another loop".into(),
                    )
                    .into());
                }
                current_loop.edges.push(merged);
                current_loop.sides.push(current);

                let wedge = store.rotate_forward(current, |out| {
                    Ok(in_border.contains(&store.merged_edge_of(out)?))
                })?;
                let head = store.merged_vertex_of(store.edge(current)?.head)?;
                if !heads.insert(head) {
                    current_loop.splits.push(LoopSplit {
                        index: current_loop.edges.len() - 1,
                        merged_vertex: head,
                        verts: wedge.verts,
                    });
                }

                let Some(next) = wedge.exit else {
                    return Err(TopologyError::InvalidTopology(
                        "border walk closed around an interior vertex".into(),
                    )
                    .into());
                };
                if next == start {
                    break;
                }
                current = next;
            }
            debug!(
                edges = current_loop.len(),
                splits = current_loop.splits.len(),
                "extracted border loop"
            );
            loops.push(current_loop);
        }
        Ok(loops)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::factory::StoreFactory;
    use crate::math::Point3;
    use crate::operations::creation::{MakeMesh, NormalMode};

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    /// 3x3 grid of quads.
    fn grid(store: &mut TopologyStore) -> Vec<PolygonId> {
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
        MakeMesh::new(positions, faces, NormalMode::Smooth)
            .execute(store, &mut StoreFactory)
            .unwrap()
    }

    #[test]
    fn empty_region_has_no_loops() {
        let mut store = TopologyStore::new();
        grid(&mut store);
        assert!(BorderLoops::new(vec![]).execute(&store).unwrap().is_empty());
    }

    #[test]
    fn whole_grid_has_one_outer_loop() {
        let mut store = TopologyStore::new();
        let polys = grid(&mut store);
        let loops = BorderLoops::new(polys).execute(&store).unwrap();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 12);
        assert!(loops[0].splits.is_empty());
    }

    #[test]
    fn ring_region_has_outer_and_inner_loops() {
        let mut store = TopologyStore::new();
        let polys = grid(&mut store);
        // everything but the center quad
        let ring: Vec<_> = polys
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != 4)
            .map(|(_, &p)| p)
            .collect();
        let search = BorderLoops::new(ring);
        let border = search.border_edges(&store).unwrap();
        let loops = search.execute(&store).unwrap();
        assert_eq!(loops.len(), 2);
        let mut sizes: Vec<_> = loops.iter().map(BorderLoop::len).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![4, 12]);
        assert_eq!(sizes.iter().sum::<usize>(), border.len());
    }

    #[test]
    fn loop_follows_region_winding() {
        let mut store = TopologyStore::new();
        let polys = grid(&mut store);
        let loops = BorderLoops::new(vec![polys[4]]).execute(&store).unwrap();
        assert_eq!(loops.len(), 1);
        let sides = &loops[0].sides;
        assert_eq!(sides.len(), 4);
        for (i, &e) in sides.iter().enumerate() {
            assert_eq!(store.edge(e).unwrap().polygon, polys[4]);
            let next = sides[(i + 1) % sides.len()];
            assert_eq!(store.edge(e).unwrap().head, store.edge(next).unwrap().tail);
        }
    }

    #[test]
    fn diagonal_neighbours_pinch_the_loop() {
        let mut store = TopologyStore::new();
        let polys = grid(&mut store);
        // two quads touching at one corner
        let region = vec![polys[0], polys[4]];
        let loops = BorderLoops::new(region).execute(&store).unwrap();
        assert_eq!(loops.len(), 2);
        assert!(loops.iter().all(|l| l.splits.is_empty()));

        // ring without its top-right quad: the ends of the C touch at a corner
        let region = vec![polys[0], polys[1], polys[2], polys[5], polys[7], polys[6], polys[3]];
        let loops = BorderLoops::new(region).execute(&store).unwrap();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].splits.len(), 1);
    }
}

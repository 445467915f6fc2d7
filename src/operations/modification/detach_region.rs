use tracing::info;

use crate::config::EditConfig;
use crate::error::Result;
use crate::factory::GeometryFactory;
use crate::host::EditHost;
use crate::operations::border::{BorderLoop, BorderLoops, FixBorder};
use crate::operations::split::SplitEdges;
use crate::operations::SnapshotOnce;
use crate::selection::Selection;
use crate::topology::{PolygonId, TopologyStore};

/// Cuts a polygon region free from the rest of the mesh.
///
/// Every interior edge on the region's boundary is split, then branch
/// vertices left on the new border are separated.
pub struct DetachRegion {
    region: Vec<PolygonId>,
}

impl DetachRegion {
    /// Creates a new `DetachRegion` operation.
    #[must_use]
    pub fn new(region: Vec<PolygonId>) -> Self {
        Self { region }
    }

    /// Executes the operation, returning the region's border loops after the
    /// cut.
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
        config: &EditConfig,
    ) -> Result<Vec<BorderLoop>>
    where
        F: GeometryFactory,
        H: EditHost + ?Sized,
    {
        config.validate()?;
        if self.region.is_empty() {
            return Ok(Vec::new());
        }
        let loops = BorderLoops::new(self.region.clone());
        let mut cut = Vec::new();
        for (merged, _) in loops.border_edges(store)? {
            if !store.merged_edge(merged)?.is_border() {
                cut.push(merged);
            }
        }

        let mut host = SnapshotOnce::new(host);
        let split = !cut.is_empty()
            && SplitEdges::new(cut).execute(store, factory, &mut host, &Selection::new(), config)?;

        let edges = loops
            .execute(store)?
            .into_iter()
            .flat_map(|l| l.edges)
            .collect();
        let fixed = FixBorder::new(edges).execute(store, factory, &mut host)?;

        info!(
            polygons = self.region.len(),
            split,
            fixed_vertices = fixed.len(),
            "detached region"
        );
        loops.execute(store)
    }
}

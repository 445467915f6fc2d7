use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::EditConfig;
use crate::error::{Result, TopologyError};
use crate::factory::GeometryFactory;
use crate::host::EditHost;
use crate::math::polygon_3d::lerp;
use crate::math::Point3;
use crate::operations::border_member;
use crate::operations::matching::match_segments;
use crate::selection::Selection;
use crate::topology::{EdgeId, MergedEdgeId, MergedVertexId, PolygonId, TopologyStore, VertexId};

/// Fills the gap between two border segments with new polygons.
///
/// Every matched pair `s: a → b`, `d: c → e` is spanned by a strip running
/// from `s` to `d`, cut into [`EditConfig::bridge_segments`] polygons.
/// Strips of neighbouring pairs share their side rails, and every new edge
/// that runs against an existing border edge is welded to it.
pub struct BridgeEdges {
    source: MergedEdgeId,
    dest: MergedEdgeId,
}

/// Points from one merged vertex to another, the inner ones created on
/// first use.
struct Rail {
    positions: Vec<Point3>,
    merged: Vec<Option<MergedVertexId>>,
}

impl Rail {
    fn new(
        store: &TopologyStore,
        from: MergedVertexId,
        to: MergedVertexId,
        segments: usize,
    ) -> Result<Self> {
        let start = store.merged_vertex_position(from)?;
        let end = store.merged_vertex_position(to)?;
        #[allow(clippy::cast_precision_loss)]
        let positions = (0..=segments)
            .map(|k| lerp(&start, &end, k as f64 / segments as f64))
            .collect();
        let mut merged = vec![None; segments + 1];
        merged[0] = Some(from);
        merged[segments] = Some(to);
        if from == to {
            merged.fill(Some(from));
        }
        Ok(Self { positions, merged })
    }

    fn is_degenerate(&self) -> bool {
        self.merged.first() == self.merged.last()
    }
}

/// A strip polygon corner: a point on one of the two rails of a pair.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Corner {
    rail: (MergedVertexId, MergedVertexId),
    index: usize,
}

impl BridgeEdges {
    /// Creates a new `BridgeEdges` operation from `source` to `dest`.
    #[must_use]
    pub fn new(source: MergedEdgeId, dest: MergedEdgeId) -> Self {
        Self { source, dest }
    }

    /// Executes the bridge. Returns `false` if nothing was built.
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
        let (Some(src), Some(dst)) = (
            border_member(store, self.source)?,
            border_member(store, self.dest)?,
        ) else {
            debug!("bridge needs two border edges");
            return Ok(false);
        };
        if src == dst {
            return Ok(false);
        }
        let Some(pairs) = match_segments(store, src, dst, &selection.edges)? else {
            return Ok(false);
        };

        let segments = config.bridge_segments;
        let mut rails: HashMap<(MergedVertexId, MergedVertexId), Rail> = HashMap::new();
        let mut strips: Vec<Vec<Corner>> = Vec::new();
        for &(s, d) in &pairs {
            let (a, b) = store.merged_ends(s)?;
            let (c, e) = store.merged_ends(d)?;
            let near = (a, e);
            let far = (b, c);
            for key in [near, far] {
                if !rails.contains_key(&key) {
                    rails.insert(key, Rail::new(store, key.0, key.1, segments)?);
                }
            }
            if rails[&near].is_degenerate() && rails[&far].is_degenerate() {
                debug!(?s, ?d, "pair collapses to a point");
                continue;
            }
            for k in 0..segments {
                let quad = [
                    Corner { rail: far, index: k },
                    Corner { rail: near, index: k },
                    Corner { rail: near, index: k + 1 },
                    Corner { rail: far, index: k + 1 },
                ];
                let mut corners: Vec<Corner> = Vec::with_capacity(4);
                for corner in quad {
                    let here = point_of(&rails, corner);
                    let repeats = here.is_some()
                        && corners.last().is_some_and(|&last| point_of(&rails, last) == here);
                    if !repeats {
                        corners.push(corner);
                    }
                }
                if corners.len() > 3
                    && point_of(&rails, corners[0]).is_some()
                    && point_of(&rails, corners[0]) == point_of(&rails, corners[corners.len() - 1])
                {
                    corners.pop();
                }
                strips.push(corners);
            }
        }
        if strips.is_empty() {
            return Ok(false);
        }

        host.snapshot_for_undo(store);
        let mut created = Vec::with_capacity(strips.len());
        for corners in &strips {
            created.push(build_strip(store, factory, &mut rails, corners)?);
        }
        host.commit_new_geometry(store, &created);

        info!(pairs = pairs.len(), polygons = created.len(), "bridged border edges");
        debug_assert!(store.validate().is_ok());
        Ok(true)
    }
}

/// The existing merged vertex at a rail point, if it is already known.
fn point_of(
    rails: &HashMap<(MergedVertexId, MergedVertexId), Rail>,
    corner: Corner,
) -> Option<MergedVertexId> {
    rails.get(&corner.rail).and_then(|r| r.merged[corner.index])
}

fn build_strip<F: GeometryFactory>(
    store: &mut TopologyStore,
    factory: &mut F,
    rails: &mut HashMap<(MergedVertexId, MergedVertexId), Rail>,
    corners: &[Corner],
) -> Result<PolygonId> {
    let n = corners.len();
    let mut verts: Vec<VertexId> = Vec::with_capacity(n);
    for corner in corners {
        let position = rails
            .get(&corner.rail)
            .map(|r| r.positions[corner.index])
            .ok_or(TopologyError::EntityNotFound("bridge rail"))?;
        verts.push(factory.create_vertex(store, position));
    }
    let edges: Vec<EdgeId> = (0..n)
        .map(|i| factory.create_edge(store, verts[i], verts[(i + 1) % n]))
        .collect();
    let triangles = if n == 4 {
        vec![[verts[0], verts[1], verts[2]], [verts[0], verts[2], verts[3]]]
    } else {
        vec![[verts[0], verts[1], verts[2]]]
    };
    let polygon = factory.create_polygon(store, verts.clone(), edges.clone(), triangles)?;

    for (corner, &v) in corners.iter().zip(&verts) {
        let rail = rails
            .get_mut(&corner.rail)
            .ok_or(TopologyError::EntityNotFound("bridge rail"))?;
        match rail.merged[corner.index] {
            Some(mv) => {
                store.weld_vertex(v, mv)?;
            }
            None => {
                let mv = factory.create_merged_vertex(store, &[v])?;
                rail.merged[corner.index] = Some(mv);
            }
        }
    }

    let normal = store.polygon(polygon)?.normal;
    for &v in &verts {
        let group = factory.create_normal_group(store, &[v])?;
        store.set_group_normal(group, normal)?;
    }

    for &e in &edges {
        match matching_border(store, e, polygon)? {
            Some(existing) => {
                let target = store.merged_edge_of(existing)?;
                store.weld_edge(e, target)?;
            }
            None => {
                factory.create_merged_edge(store, Some(e))?;
            }
        }
    }
    Ok(polygon)
}

/// An existing border edge of another polygon running `head(e) → tail(e)`.
fn matching_border(
    store: &TopologyStore,
    e: EdgeId,
    polygon: PolygonId,
) -> std::result::Result<Option<EdgeId>, TopologyError> {
    let (from, to) = store.merged_ends(e)?;
    for &v in &store.merged_vertex(to)?.verts {
        let out = store.vertex(v)?.next_edge;
        if store.edge(out)?.polygon == polygon {
            continue;
        }
        let (_, head) = store.merged_ends(out)?;
        if head == from && store.is_border(out)? {
            return Ok(Some(out));
        }
    }
    Ok(None)
}

//! Normal-group bookkeeping shared by the editing operations.

use std::collections::HashSet;

use crate::error::TopologyError;
use crate::factory::GeometryFactory;
use crate::math::polygon_3d::average_normal;
use crate::topology::{MergedVertexId, NormalGroupId, PolygonId, TopologyStore};

/// Splits every normal group touching `merged` so that each group lies
/// inside a single merged vertex.
///
/// The part holding a group's first member keeps the group id. Returns
/// every group that was split or created.
pub(crate) fn conform_normal_groups<F: GeometryFactory>(
    store: &mut TopologyStore,
    factory: &mut F,
    merged: &[MergedVertexId],
) -> Result<Vec<NormalGroupId>, TopologyError> {
    let mut groups: Vec<NormalGroupId> = Vec::new();
    let mut seen = HashSet::new();
    for &mv in merged {
        for &v in &store.merged_vertex(mv)?.verts {
            let g = store.normal_group_of(v)?;
            if seen.insert(g) {
                groups.push(g);
            }
        }
    }

    let mut touched = Vec::new();
    for g in groups {
        let members = store.normal_group(g)?.verts.clone();
        let mut parts: Vec<(MergedVertexId, Vec<_>)> = Vec::new();
        for v in members {
            let mv = store.merged_vertex_of(v)?;
            match parts.iter_mut().find(|(m, _)| *m == mv) {
                Some((_, part)) => part.push(v),
                None => parts.push((mv, vec![v])),
            }
        }
        if parts.len() < 2 {
            continue;
        }
        touched.push(g);
        for (_, part) in parts.into_iter().skip(1) {
            touched.push(factory.create_normal_group(store, &part)?);
        }
    }
    Ok(touched)
}

/// Recomputes the shading normal of each group as the average of its
/// members' polygon normals.
pub(crate) fn refresh_group_normals<I>(
    store: &mut TopologyStore,
    groups: I,
) -> Result<(), TopologyError>
where
    I: IntoIterator<Item = NormalGroupId>,
{
    for g in groups {
        let normals = store
            .normal_group(g)?
            .verts
            .iter()
            .map(|&v| {
                let polygon = store.vertex(v)?.polygon;
                Ok(store.polygon(polygon)?.normal)
            })
            .collect::<Result<Vec<_>, TopologyError>>()?;
        store.set_group_normal(g, average_normal(&normals))?;
    }
    Ok(())
}

/// Polygons touching any of the given merged vertices.
pub(crate) fn polygons_around(
    store: &TopologyStore,
    merged: &[MergedVertexId],
) -> Result<Vec<PolygonId>, TopologyError> {
    let mut seen = HashSet::new();
    let mut polygons = Vec::new();
    for &mv in merged {
        for &v in &store.merged_vertex(mv)?.verts {
            let p = store.vertex(v)?.polygon;
            if seen.insert(p) {
                polygons.push(p);
            }
        }
    }
    Ok(polygons)
}

/// Normal groups of every corner of the given polygons.
pub(crate) fn groups_of_polygons(
    store: &TopologyStore,
    polygons: &[PolygonId],
) -> Result<Vec<NormalGroupId>, TopologyError> {
    let mut seen = HashSet::new();
    let mut groups = Vec::new();
    for &p in polygons {
        for &v in &store.polygon(p)?.verts {
            let g = store.normal_group_of(v)?;
            if seen.insert(g) {
                groups.push(g);
            }
        }
    }
    Ok(groups)
}

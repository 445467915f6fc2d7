use std::collections::HashMap;

use tracing::debug;

use crate::error::{OperationError, Result};
use crate::factory::GeometryFactory;
use crate::math::Point3;
use crate::operations::shading::refresh_group_normals;
use crate::tessellation::TriangulatePolygon;
use crate::topology::{EdgeId, PolygonId, TopologyStore, VertexId};

/// How initial shading normals are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalMode {
    /// All corners welded at a point share one normal.
    #[default]
    Smooth,
    /// Every corner takes its own polygon's normal.
    Flat,
}

/// Builds a welded mesh from shared positions and polygon index lists.
///
/// Every polygon gets its own corner and side records. Corners that name the
/// same position index are welded into one merged vertex; sides that run
/// between the same two indices in opposite directions are welded into one
/// interior merged edge.
pub struct MakeMesh {
    positions: Vec<Point3>,
    faces: Vec<Vec<usize>>,
    normals: NormalMode,
}

impl MakeMesh {
    /// Creates a new `MakeMesh` operation.
    #[must_use]
    pub fn new(positions: Vec<Point3>, faces: Vec<Vec<usize>>, normals: NormalMode) -> Self {
        Self {
            positions,
            faces,
            normals,
        }
    }

    /// Executes the operation, returning the new polygons in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if a face has fewer than 3 corners, repeats or
    /// references an unknown index, or if a side is used twice in the same
    /// direction (which also covers sides shared by more than two faces).
    pub fn execute<F: GeometryFactory>(
        &self,
        store: &mut TopologyStore,
        factory: &mut F,
    ) -> Result<Vec<PolygonId>> {
        self.check_input()?;

        let mut corners: HashMap<usize, Vec<VertexId>> = HashMap::new();
        let mut corner_order: Vec<usize> = Vec::new();
        let mut sides: HashMap<(usize, usize), EdgeId> = HashMap::new();
        let mut side_order: Vec<(usize, usize)> = Vec::new();
        let mut polygons = Vec::with_capacity(self.faces.len());

        for face in &self.faces {
            let n = face.len();
            let verts: Vec<VertexId> = face
                .iter()
                .map(|&i| factory.create_vertex(store, self.positions[i]))
                .collect();
            let mut edges = Vec::with_capacity(n);
            for k in 0..n {
                let key = (face[k], face[(k + 1) % n]);
                if sides.contains_key(&key) {
                    return Err(OperationError::NonManifoldEdge {
                        v0: key.0,
                        v1: key.1,
                    }
                    .into());
                }
                let e = factory.create_edge(store, verts[k], verts[(k + 1) % n]);
                sides.insert(key, e);
                side_order.push(key);
                edges.push(e);
            }

            let outline: Vec<Point3> = face.iter().map(|&i| self.positions[i]).collect();
            let triangles = TriangulatePolygon::new(outline)
                .execute()?
                .into_iter()
                .map(|[a, b, c]| [verts[a], verts[b], verts[c]])
                .collect();
            polygons.push(factory.create_polygon(store, verts.clone(), edges, triangles)?);

            for (&i, &v) in face.iter().zip(&verts) {
                corners
                    .entry(i)
                    .or_insert_with(|| {
                        corner_order.push(i);
                        Vec::new()
                    })
                    .push(v);
            }
        }

        for i in &corner_order {
            let members = &corners[i];
            factory.create_merged_vertex(store, members)?;
            match self.normals {
                NormalMode::Smooth => {
                    factory.create_normal_group(store, members)?;
                }
                NormalMode::Flat => {
                    for &v in members {
                        factory.create_normal_group(store, &[v])?;
                    }
                }
            }
        }

        let mut interior = 0usize;
        for key in &side_order {
            let e = sides[key];
            if store.merged_edge_of(e).is_ok() {
                continue;
            }
            let merged = factory.create_merged_edge(store, Some(e))?;
            if let Some(&partner) = sides.get(&(key.1, key.0)) {
                store.weld_edge(partner, merged)?;
                interior += 1;
            }
        }

        let groups: Vec<_> = store.normal_group_ids().collect();
        refresh_group_normals(store, groups)?;

        debug!(
            polygons = polygons.len(),
            merged_vertices = corner_order.len(),
            interior_edges = interior,
            "built welded mesh"
        );
        debug_assert!(store.validate().is_ok());
        Ok(polygons)
    }

    fn check_input(&self) -> Result<()> {
        for (f, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(OperationError::InvalidInput(format!(
                    "face {f} has {} corners",
                    face.len()
                ))
                .into());
            }
            for (k, &i) in face.iter().enumerate() {
                if i >= self.positions.len() {
                    return Err(OperationError::InvalidInput(format!(
                        "face {f} references position {i} of {}",
                        self.positions.len()
                    ))
                    .into());
                }
                if face[..k].contains(&i) {
                    return Err(OperationError::InvalidInput(format!(
                        "face {f} repeats position {i}"
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }
}

use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};
use tracing::{debug, warn};

use crate::error::{Result, TessellationError};
use crate::math::polygon_3d::newell_normal;
use crate::math::{Point3, Vector3, TOLERANCE};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulates a closed polygon outline.
///
/// The outline is projected onto the plane of its Newell normal and
/// triangulated with a constrained Delaunay triangulation. Triangles are
/// returned as indices into the outline, wound like the outline itself.
/// Outlines the triangulation cannot handle (zero area, repeated points,
/// self-intersections) fall back to a fan around the first point.
pub struct TriangulatePolygon {
    points: Vec<Point3>,
}

impl TriangulatePolygon {
    /// Creates a new `TriangulatePolygon` operation.
    #[must_use]
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    /// Executes the triangulation.
    ///
    /// # Errors
    ///
    /// Returns an error if the outline has fewer than 3 points.
    pub fn execute(&self) -> Result<Vec<[usize; 3]>> {
        let n = self.points.len();
        if n < 3 {
            return Err(TessellationError::TooFewPoints(n).into());
        }
        if n == 3 {
            return Ok(vec![[0, 1, 2]]);
        }

        let normal = newell_normal(&self.points);
        if normal.norm() < TOLERANCE {
            debug!(points = n, "degenerate outline, using fan");
            return Ok(fan(n));
        }

        match self.constrained(&normal) {
            Ok(Some(triangles)) if triangles.len() == n - 2 => Ok(triangles),
            Ok(_) => {
                warn!(points = n, "outline not triangulable as a simple polygon, using fan");
                Ok(fan(n))
            }
            Err(e) => Err(e),
        }
    }

    fn constrained(&self, normal: &Vector3) -> Result<Option<Vec<[usize; 3]>>> {
        let (u_dir, v_dir) = plane_basis(normal);
        let origin = self.points[0];
        let projected: Vec<SpadePoint2<f64>> = self
            .points
            .iter()
            .map(|p| {
                let d = p - origin;
                SpadePoint2::new(d.dot(&u_dir), d.dot(&v_dir))
            })
            .collect();

        let mut cdt = Cdt::new();
        let mut outline_index: HashMap<usize, usize> = HashMap::new();
        let mut handles = Vec::with_capacity(projected.len());
        for (i, &pt) in projected.iter().enumerate() {
            let h = cdt.insert(pt).map_err(|e: InsertionError| {
                TessellationError::Failed(format!("CDT insert: {e}"))
            })?;
            if outline_index.insert(h.index(), i).is_some() {
                return Ok(None);
            }
            handles.push(h);
        }

        for i in 0..handles.len() {
            let from = handles[i];
            let to = handles[(i + 1) % handles.len()];
            if !cdt.can_add_constraint(from, to) {
                return Ok(None);
            }
            cdt.add_constraint(from, to);
        }

        let interior = classify_interior_faces(&cdt);
        let mut triangles = Vec::new();
        for face in cdt.inner_faces() {
            if !interior.contains(&face.fix().index()) {
                continue;
            }
            let corners = face.vertices();
            let mut tri = [0usize; 3];
            for (slot, vh) in tri.iter_mut().zip(corners.iter()) {
                let Some(&idx) = outline_index.get(&vh.fix().index()) else {
                    return Ok(None);
                };
                *slot = idx;
            }
            triangles.push(tri);
        }
        Ok(Some(triangles))
    }
}

/// Flood-fills the triangulation from the outer face, counting crossed
/// constraint edges. Faces at odd depth are inside the outline.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();
    let outer_fix = cdt.outer_face().fix();

    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let idx = inner.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, depth);
            if depth % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((inner.fix(), depth));
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let idx = neighbor.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let next = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, next);
            if next % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((neighbor.fix(), next));
        }
    }
    interior
}

/// Orthonormal in-plane axes with `u × v = normal`.
fn plane_basis(normal: &Vector3) -> (Vector3, Vector3) {
    let helper = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = (helper - normal * normal.dot(&helper)).normalize();
    let v = normal.cross(&u);
    (u, v)
}

fn fan(n: usize) -> Vec<[usize; 3]> {
    (1..n - 1).map(|i| [0, i, i + 1]).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    fn signed_area(points: &[Point3], tri: &[usize; 3]) -> f64 {
        let a = points[tri[0]];
        let b = points[tri[1]];
        let c = points[tri[2]];
        (b - a).cross(&(c - a)).z
    }

    #[test]
    fn too_few_points_is_an_error() {
        let result = TriangulatePolygon::new(vec![p(0.0, 0.0), p(1.0, 0.0)]).execute();
        assert!(result.is_err());
    }

    #[test]
    fn quad_gives_two_triangles_with_outline_winding() {
        let points = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let tris = TriangulatePolygon::new(points.clone()).execute().unwrap();
        assert_eq!(tris.len(), 2);
        assert!(tris.iter().all(|t| signed_area(&points, t) > 0.0));
    }

    #[test]
    fn concave_outline_keeps_triangles_inside() {
        // L shape
        let points = vec![
            p(0.0, 0.0),
            p(2.0, 0.0),
            p(2.0, 1.0),
            p(1.0, 1.0),
            p(1.0, 2.0),
            p(0.0, 2.0),
        ];
        let tris = TriangulatePolygon::new(points.clone()).execute().unwrap();
        assert_eq!(tris.len(), 4);
        let area: f64 = tris.iter().map(|t| signed_area(&points, t) / 2.0).sum();
        assert!((area - 3.0).abs() < 1e-9);
    }

    #[test]
    fn collinear_outline_falls_back_to_fan() {
        let points = vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)];
        let tris = TriangulatePolygon::new(points).execute().unwrap();
        assert_eq!(tris, vec![[0, 1, 2], [0, 2, 3]]);
    }
}

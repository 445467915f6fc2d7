use super::{Point3, Vector3, TOLERANCE};

/// Newell normal of a closed polygon outline.
///
/// Robust for non-planar and concave outlines. Returns the zero vector when
/// the outline has no area.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal.try_normalize(TOLERANCE).unwrap_or_else(Vector3::zeros)
}

/// Arithmetic mean of the outline points.
#[must_use]
pub fn centroid(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::origin();
    }
    #[allow(clippy::cast_precision_loss)]
    let inv_n = 1.0 / points.len() as f64;
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum * inv_n)
}

/// Point at parameter `t` on the segment `a → b`.
#[must_use]
pub fn lerp(a: &Point3, b: &Point3, t: f64) -> Point3 {
    a + (b - a) * t
}

/// Normalized average of a set of unit normals.
///
/// Falls back to the first input when the normals cancel out.
#[must_use]
pub fn average_normal(normals: &[Vector3]) -> Vector3 {
    let sum: Vector3 = normals.iter().sum();
    sum.try_normalize(TOLERANCE)
        .or_else(|| normals.first().copied())
        .unwrap_or_else(Vector3::zeros)
}

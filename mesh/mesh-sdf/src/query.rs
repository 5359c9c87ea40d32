//! Geometric query utilities for SDF computation.
//!
//! Provides closest-point computation on triangles, reporting which
//! feature (vertex, edge or interior) the closest point lies on so that
//! the sign of the distance can be taken from the matching pseudo-normal.

use nalgebra::Point3;

/// The triangle feature a closest point lies on.
///
/// Indices are local to the triangle `(v0, v1, v2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriangleFeature {
    /// One of the corners, `0..3`.
    Vertex(u8),
    /// One of the edges, as a pair of local corner indices.
    Edge(u8, u8),
    /// The interior of the face.
    Face,
}

/// Closest point on a triangle together with the feature it lies on.
///
/// This implements the algorithm from "Real-Time Collision Detection" by Christer Ericson.
///
/// # Example
///
/// ```
/// use mesh_sdf::{closest_feature_on_triangle, TriangleFeature};
/// use nalgebra::Point3;
///
/// let (p, feature) = closest_feature_on_triangle(
///     Point3::new(0.25, 0.25, 3.0),
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
/// assert!((p - Point3::new(0.25, 0.25, 0.0)).norm() < 1e-12);
/// assert_eq!(feature, TriangleFeature::Face);
/// ```
#[must_use]
pub fn closest_feature_on_triangle(
    point: Point3<f64>,
    v0: Point3<f64>,
    v1: Point3<f64>,
    v2: Point3<f64>,
) -> (Point3<f64>, TriangleFeature) {
    let ab = v1 - v0;
    let ac = v2 - v0;
    let ap = point - v0;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);

    // Vertex region outside A
    if d1 <= 0.0 && d2 <= 0.0 {
        return (v0, TriangleFeature::Vertex(0));
    }

    let bp = point - v1;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);

    // Vertex region outside B
    if d3 >= 0.0 && d4 <= d3 {
        return (v1, TriangleFeature::Vertex(1));
    }

    // Edge region of AB
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (v0 + ab * v, TriangleFeature::Edge(0, 1));
    }

    let cp = point - v2;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);

    // Vertex region outside C
    if d6 >= 0.0 && d5 <= d6 {
        return (v2, TriangleFeature::Vertex(2));
    }

    // Edge region of AC
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (v0 + ac * w, TriangleFeature::Edge(0, 2));
    }

    // Edge region of BC
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (v1 + (v2 - v1) * w, TriangleFeature::Edge(1, 2));
    }

    // Inside the face region
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;

    (v0 + ab * v + ac * w, TriangleFeature::Face)
}

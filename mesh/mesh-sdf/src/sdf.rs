//! Signed distance field computation.
//!
//! Computes the signed distance from any point to the nearest surface of a mesh.
//! The sign is taken from the angle-weighted pseudo-normal of the feature
//! (face, edge or vertex) holding the closest point, which stays consistent
//! across shared edges and corners and also works for open surfaces.

use hashbrown::HashMap;
use mesh_types::{IndexedMesh, Point3, Vector3};
use tracing::debug;

use crate::bvh::TriangleBvh;
use crate::error::{SdfError, SdfResult};
use crate::query::TriangleFeature;

/// Result of a surface query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Signed distance (negative inside, positive outside).
    pub distance: f64,
    /// Closest point on the surface.
    pub point: Point3<f64>,
    /// Index of the face holding the closest point.
    pub face: usize,
}

/// A signed distance field for a mesh.
///
/// Built once per surface and then queried from any number of threads; all
/// queries take `&self`.
#[derive(Debug, Clone)]
pub struct SignedDistanceField {
    /// The mesh for which this SDF was computed.
    mesh: IndexedMesh,
    /// Nearest-triangle hierarchy.
    bvh: TriangleBvh,
    /// Unit face normals (zero for degenerate faces).
    face_normals: Vec<Vector3<f64>>,
    /// Edge pseudo-normals keyed by sorted vertex pair.
    edge_normals: HashMap<(u32, u32), Vector3<f64>>,
    /// Angle-weighted vertex pseudo-normals.
    vertex_normals: Vec<Vector3<f64>>,
}

impl SignedDistanceField {
    /// Create a new signed distance field from a mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh has no faces or a face references a
    /// vertex that does not exist.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{IndexedMesh, Vertex};
    /// use mesh_sdf::SignedDistanceField;
    ///
    /// let mut mesh = IndexedMesh::new();
    /// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
    /// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
    /// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
    /// mesh.faces.push([0, 1, 2]);
    ///
    /// let sdf = SignedDistanceField::new(mesh);
    /// assert!(sdf.is_ok());
    /// ```
    pub fn new(mesh: IndexedMesh) -> SdfResult<Self> {
        if mesh.faces.is_empty() {
            return Err(SdfError::EmptyMesh);
        }

        let vertex_count = mesh.vertices.len();
        for (face, indices) in mesh.faces.iter().enumerate() {
            if let Some(&vertex) = indices.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(SdfError::InvalidFaceIndex {
                    face,
                    vertex,
                    vertex_count,
                });
            }
        }

        let bvh = TriangleBvh::build(&mesh).ok_or(SdfError::EmptyMesh)?;
        let face_normals = compute_face_normals(&mesh);
        let edge_normals = compute_edge_normals(&mesh, &face_normals);
        let vertex_normals = compute_vertex_normals(&mesh, &face_normals);

        debug!(
            vertices = vertex_count,
            faces = mesh.faces.len(),
            edges = edge_normals.len(),
            "built signed distance field"
        );

        Ok(Self {
            mesh,
            bvh,
            face_normals,
            edge_normals,
            vertex_normals,
        })
    }

    /// Query the signed distance at a point.
    ///
    /// Returns the distance to the nearest surface. Positive values indicate
    /// the point is outside the mesh, negative values indicate inside.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::unit_cube;
    /// use mesh_sdf::SignedDistanceField;
    /// use nalgebra::Point3;
    ///
    /// let sdf = SignedDistanceField::new(unit_cube()).unwrap();
    ///
    /// assert!((sdf.distance(Point3::new(0.5, 0.5, 0.5)) + 0.5).abs() < 1e-12);
    /// assert!((sdf.distance(Point3::new(0.5, 0.5, 3.0)) - 2.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn distance(&self, point: Point3<f64>) -> f64 {
        self.query(point).distance
    }

    /// Signed distance together with the closest surface point.
    ///
    /// Ties between equally distant faces resolve to the lowest face index,
    /// so repeated queries always return the same hit.
    #[must_use]
    pub fn query(&self, point: Point3<f64>) -> SurfaceHit {
        let nearest = self.bvh.nearest(&self.mesh, &point);
        let face = nearest.face as usize;
        let pseudo_normal = self.pseudo_normal(face, nearest.feature);

        let sign = if (point - nearest.point).dot(&pseudo_normal) >= 0.0 {
            1.0
        } else {
            -1.0
        };

        SurfaceHit {
            distance: sign * nearest.distance_squared.sqrt(),
            point: nearest.point,
            face,
        }
    }

    /// Get a reference to the underlying mesh.
    #[must_use]
    pub fn mesh(&self) -> &IndexedMesh {
        &self.mesh
    }

    fn pseudo_normal(&self, face: usize, feature: TriangleFeature) -> Vector3<f64> {
        let indices = self.mesh.faces[face];
        match feature {
            TriangleFeature::Face => self.face_normals[face],
            TriangleFeature::Edge(i, j) => self
                .edge_normals
                .get(&edge_key(indices[usize::from(i)], indices[usize::from(j)]))
                .copied()
                .unwrap_or(self.face_normals[face]),
            TriangleFeature::Vertex(i) => self.vertex_normals[indices[usize::from(i)] as usize],
        }
    }
}

const fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Compute unit face normals for all faces in a mesh.
fn compute_face_normals(mesh: &IndexedMesh) -> Vec<Vector3<f64>> {
    mesh.faces
        .iter()
        .map(|face| {
            let v0 = &mesh.vertices[face[0] as usize].position;
            let v1 = &mesh.vertices[face[1] as usize].position;
            let v2 = &mesh.vertices[face[2] as usize].position;

            (v1 - v0)
                .cross(&(v2 - v0))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros)
        })
        .collect()
}

/// Sum of the unit normals of the faces sharing each edge.
fn compute_edge_normals(
    mesh: &IndexedMesh,
    face_normals: &[Vector3<f64>],
) -> HashMap<(u32, u32), Vector3<f64>> {
    let mut edges: HashMap<(u32, u32), Vector3<f64>> = HashMap::with_capacity(mesh.faces.len() * 3 / 2);
    for (face, &[a, b, c]) in mesh.faces.iter().enumerate() {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            *edges.entry(edge_key(u, v)).or_insert_with(Vector3::zeros) += face_normals[face];
        }
    }
    edges
}

/// Face normals weighted by the incident angle at each vertex.
fn compute_vertex_normals(mesh: &IndexedMesh, face_normals: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); mesh.vertices.len()];
    for (face, indices) in mesh.faces.iter().enumerate() {
        for k in 0..3 {
            let here = mesh.vertices[indices[k] as usize].position;
            let next = mesh.vertices[indices[(k + 1) % 3] as usize].position;
            let prev = mesh.vertices[indices[(k + 2) % 3] as usize].position;

            let (Some(e1), Some(e2)) = (
                (next - here).try_normalize(f64::EPSILON),
                (prev - here).try_normalize(f64::EPSILON),
            ) else {
                continue;
            };
            let angle = e1.dot(&e2).clamp(-1.0, 1.0).acos();
            normals[indices[k] as usize] += face_normals[face] * angle;
        }
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{closed_box, unit_cube, Vertex};

    fn simple_triangle() -> IndexedMesh {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(5.0, 10.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh
    }

    fn unit_tetrahedron() -> IndexedMesh {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.5, 0.866, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.5, 0.289, 0.816));

        // CCW winding when viewed from outside
        mesh.faces.push([0, 2, 1]); // bottom
        mesh.faces.push([0, 1, 3]); // front
        mesh.faces.push([1, 2, 3]); // right
        mesh.faces.push([2, 0, 3]); // left
        mesh
    }

    #[test]
    fn sdf_new_empty_mesh() {
        let result = SignedDistanceField::new(IndexedMesh::new());
        assert!(matches!(result, Err(SdfError::EmptyMesh)));
    }

    #[test]
    fn sdf_new_bad_index() {
        let mut mesh = simple_triangle();
        mesh.faces.push([0, 1, 7]);
        let result = SignedDistanceField::new(mesh);
        assert!(matches!(
            result,
            Err(SdfError::InvalidFaceIndex {
                face: 1,
                vertex: 7,
                vertex_count: 3
            })
        ));
    }

    #[test]
    fn sdf_distance_above_triangle() {
        let sdf = SignedDistanceField::new(simple_triangle()).expect("should create SDF");

        let dist = sdf.distance(Point3::new(5.0, 3.33, 5.0));
        assert_relative_eq!(dist, 5.0, epsilon = 1e-10);

        let below = sdf.distance(Point3::new(5.0, 3.33, -5.0));
        assert_relative_eq!(below, -5.0, epsilon = 1e-10);
    }

    #[test]
    fn sdf_distance_on_surface() {
        let sdf = SignedDistanceField::new(simple_triangle()).expect("should create SDF");
        let dist = sdf.distance(Point3::new(5.0, 3.0, 0.0));
        assert_relative_eq!(dist.abs(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn sdf_closest_point() {
        let sdf = SignedDistanceField::new(simple_triangle()).expect("should create SDF");

        let hit = sdf.query(Point3::new(5.0, 3.0, 5.0));
        assert_relative_eq!(hit.point, Point3::new(5.0, 3.0, 0.0), epsilon = 1e-12);
        assert_eq!(hit.face, 0);
        assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn sdf_inside_tetrahedron() {
        let sdf = SignedDistanceField::new(unit_tetrahedron()).expect("should create SDF");

        let centroid = Point3::new(0.5, 0.289, 0.204);
        assert!(sdf.distance(centroid) < 0.0);
        assert!(sdf.distance(Point3::new(10.0, 10.0, 10.0)) > 0.0);
    }

    #[test]
    fn cube_corner_and_edge_regions_are_outside() {
        let sdf = SignedDistanceField::new(unit_cube()).expect("should create SDF");

        // Closest feature is a corner vertex
        let corner = sdf.distance(Point3::new(-1.0, -1.0, -1.0));
        assert_relative_eq!(corner, 3.0_f64.sqrt(), epsilon = 1e-12);

        // Closest feature is an edge
        let edge = sdf.distance(Point3::new(1.5, 0.5, 1.5));
        assert_relative_eq!(edge, 0.5_f64.sqrt(), epsilon = 1e-12);

        // Along the face diagonal shared by two triangles
        let diag = sdf.distance(Point3::new(0.5, 0.5, -0.25));
        assert_relative_eq!(diag, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn cube_interior_is_negative() {
        let sdf = SignedDistanceField::new(closed_box(
            Point3::new(-2.0, -2.0, -2.0),
            Point3::new(2.0, 2.0, 2.0),
        ))
        .expect("should create SDF");

        for p in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.9, 1.9, 1.9),
            Point3::new(-1.5, 0.3, 1.99),
        ] {
            assert!(sdf.distance(p) < 0.0, "{p:?} should be inside");
        }
        assert_relative_eq!(sdf.distance(Point3::origin()), -2.0, epsilon = 1e-12);
    }

    #[test]
    fn sdf_mesh_accessor() {
        let sdf = SignedDistanceField::new(simple_triangle()).expect("should create SDF");
        assert_eq!(sdf.mesh().faces.len(), 1);
    }
}

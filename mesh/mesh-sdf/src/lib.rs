//! Signed distance queries for triangle surfaces.
//!
//! This crate wraps a triangle surface as a [`SignedDistanceField`]: an
//! immutable query object, built once, that answers "how far is this point
//! from the surface, on which side, and where is the nearest surface
//! point" for any 3D point.
//!
//! Closest-point queries are exact on the triangle geometry and are
//! accelerated by a bounding volume hierarchy. The sign comes from
//! angle-weighted pseudo-normals, so a closed, outward-wound surface gives
//! negative distances inside and positive distances outside.
//!
//! # Example
//!
//! ```
//! use mesh_types::{IndexedMesh, Vertex};
//! use mesh_sdf::SignedDistanceField;
//! use nalgebra::Point3;
//!
//! // Create a simple triangle mesh
//! let mut mesh = IndexedMesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(5.0, 10.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! let sdf = SignedDistanceField::new(mesh).unwrap();
//! let above = sdf.distance(Point3::new(5.0, 5.0, 5.0));
//! let below = sdf.distance(Point3::new(5.0, 5.0, -5.0));
//! assert!(above > 0.0 && below < 0.0);
//!
//! let hit = sdf.query(Point3::new(5.0, 5.0, 5.0));
//! assert!((hit.point.z).abs() < 1e-12);
//! ```
//!
//! # Thread Safety
//!
//! [`SignedDistanceField`] is `Send + Sync`; share it by reference across
//! rayon workers.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bvh;
mod error;
mod query;
mod sdf;

pub use error::{SdfError, SdfResult};
pub use query::{closest_feature_on_triangle, TriangleFeature};
pub use sdf::{SignedDistanceField, SurfaceHit};

//! Boundary extraction for triangle surfaces.
//!
//! This crate provides:
//! - Edge-to-face adjacency ([`MeshAdjacency`])
//! - Boundary edge detection (edges with a single adjacent face) and a
//!   watertightness check
//! - Boundary loop tracing ([`boundary_loops`])
//!
//! Results are sorted so that repeated runs on the same surface produce
//! the same loops in the same order.
//!
//! # Example
//!
//! ```
//! use mesh_types::{IndexedMesh, Vertex};
//! use mesh_boundary::{boundary_loops, MeshAdjacency};
//!
//! let mut mesh = IndexedMesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//! mesh.faces.push([0, 2, 3]);
//!
//! let adjacency = MeshAdjacency::build(&mesh.faces);
//! assert_eq!(adjacency.boundary_edges().len(), 4);
//! assert!(!adjacency.is_watertight());
//!
//! let loops = boundary_loops(&mesh).unwrap();
//! assert_eq!(loops.len(), 1);
//! assert_eq!(loops[0].vertices, vec![0, 1, 2, 3]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod error;
mod loops;

pub use adjacency::MeshAdjacency;
pub use error::{BoundaryError, BoundaryResult};
pub use loops::{boundary_loops, trace_loops, BoundaryLoop};

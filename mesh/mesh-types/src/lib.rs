//! Core mesh types for cardiac mesh preparation.
//!
//! This crate provides the foundational types shared by the rest of the
//! workspace:
//!
//! - [`Vertex`] - A point in 3D space with an optional normal
//! - [`IndexedMesh`] - A triangle surface with indexed vertices (anatomical
//!   boundary surfaces, tubes, markers)
//! - [`HexMesh`] - A volumetric mesh of 8-node hexahedral elements (the tissue
//!   grid handed to the electrophysiology solver)
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//! Segmented cardiac data is conventionally in millimeters.
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system**. Ventricles are expected to be
//! oriented with their long axis roughly along +Z (apex at low Z, valve
//! plane at high Z).
//!
//! Face winding is **counter-clockwise (CCW) when viewed from outside**.
//! Normals point outward by the right-hand rule.
//!
//! # Example
//!
//! ```
//! use mesh_types::{HexMesh, Point3};
//!
//! // A 2x1x1 block of unit voxels
//! let block = HexMesh::structured_block([2, 1, 1], 1.0, Point3::origin());
//! assert_eq!(block.node_count(), 12);
//! assert_eq!(block.element_count(), 2);
//! assert!(block.validate().is_ok());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod hex;
mod mesh;
mod vertex;

pub use bounds::Aabb;
pub use hex::{HexElement, HexMesh, InvalidElement, HEX_NODE_COUNT};
pub use mesh::{closed_box, unit_cube, IndexedMesh};
pub use vertex::Vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

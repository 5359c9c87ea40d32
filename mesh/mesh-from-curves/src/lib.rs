//! Generate triangle meshes from curves.
//!
//! Sweeps a circular cross-section along a polyline to build tube surfaces.
//! Open curves get optional end caps; closed loops are joined back onto
//! themselves into a ring.
//!
//! # Features
//!
//! - **Tube generation**: Cylindrical tubes around polyline curves
//! - **Closed rings**: Tubes around closed loops such as surface boundaries
//! - **Parallel transport**: Rotation-minimizing frames for consistent orientation
//!
//! # Quick Start
//!
//! ```
//! use mesh_from_curves::{tube_from_polyline, TubeConfig};
//! use nalgebra::Point3;
//!
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(0.0, 0.0, 10.0),
//! ];
//!
//! let config = TubeConfig::default()
//!     .with_radius(0.5)
//!     .with_segments(16);
//!
//! let mesh = tube_from_polyline(&points, &config).unwrap();
//! assert!(!mesh.faces.is_empty());
//! ```
//!
//! # Closed Rings
//!
//! ```
//! use mesh_from_curves::{tube_from_polyline, TubeConfig};
//! use nalgebra::Point3;
//!
//! let square = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//!
//! let config = TubeConfig::default().with_radius(0.05).with_segments(8).closed_loop();
//! let ring = tube_from_polyline(&square, &config).unwrap();
//! assert_eq!(ring.faces.len(), 4 * 8 * 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod frame;
mod tube;

pub use error::{CurveError, CurveResult};
pub use frame::{closed_loop_frames, parallel_transport_frames, Frame};
pub use tube::{tube_from_polyline, TubeConfig};

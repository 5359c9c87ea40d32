//! Error types for ventricle tagging and export.

use mesh_boundary::BoundaryError;
use mesh_from_curves::CurveError;
use mesh_sdf::SdfError;
use mesh_types::InvalidElement;
use thiserror::Error;

use crate::surfaces::Surface;

/// Result type for tagging operations.
pub type TaggingResult<T> = Result<T, TaggingError>;

/// Result type for text export.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while tagging a ventricle mesh.
#[derive(Debug, Error)]
pub enum TaggingError {
    /// The tissue mesh has no nodes or no elements.
    #[error("tissue mesh is empty")]
    EmptyMesh,

    /// An anatomical surface has no triangles.
    #[error("{surface} surface is empty")]
    EmptySurface {
        /// Which surface was empty.
        surface: Surface,
    },

    /// An element references a node outside the node array.
    #[error("element {element} references node {node}, but the mesh has {node_count} nodes")]
    InvalidElement {
        /// Offending element.
        element: usize,
        /// Out-of-range node index.
        node: u32,
        /// Number of nodes in the mesh.
        node_count: usize,
    },

    /// Parameters failed validation.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// A distance field could not be built.
    #[error("distance field error: {0}")]
    Sdf(#[from] SdfError),

    /// The endocardial boundary could not be traced.
    #[error("boundary error: {0}")]
    Boundary(#[from] BoundaryError),

    /// The base tube could not be built.
    #[error("base tube error: {0}")]
    Curve(#[from] CurveError),

    /// The endocardium has no open boundary to define the base.
    #[error("endocardium has no open boundary; the base cannot be located")]
    MissingBaseBoundary,

    /// No site lies below the centroid along the long axis.
    #[error("no site lies in the lower half of the ventricle; the apex cannot be located")]
    ApexNotFound,

    /// Apex and base center coincide.
    #[error("apex and base center coincide; the long axis is undefined")]
    DegenerateLongAxis,

    /// A vector needed a unit length but was (nearly) zero.
    #[error("degenerate {vector} at site {site}")]
    DegenerateFrame {
        /// Site index being processed.
        site: usize,
        /// Which vector collapsed.
        vector: &'static str,
    },
}

impl From<InvalidElement> for TaggingError {
    fn from(err: InvalidElement) -> Self {
        Self::InvalidElement {
            element: err.element,
            node: err.node,
            node_count: err.node_count,
        }
    }
}

/// Errors that can occur while writing text output.
#[derive(Debug, Error)]
pub enum ExportError {
    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A tagging result does not match the mesh it is exported with.
    #[error("{what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Which array disagreed.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },
}

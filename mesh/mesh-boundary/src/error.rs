//! Error types for boundary extraction.

use thiserror::Error;

/// Result type for boundary operations.
pub type BoundaryResult<T> = Result<T, BoundaryError>;

/// Errors that can occur while extracting boundaries.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// Mesh has no faces.
    #[error("mesh is empty")]
    EmptyMesh,

    /// A face or loop references a vertex that does not exist.
    #[error("invalid vertex index {vertex} (mesh has {vertex_count} vertices)")]
    InvalidIndex {
        /// Face holding the index, when known.
        face: Option<usize>,
        /// The invalid index.
        vertex: u32,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },
}

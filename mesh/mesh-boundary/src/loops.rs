//! Boundary loop tracing.
//!
//! A boundary loop is a connected run of boundary edges (edges with only
//! one adjacent face). On an endocardial surface cut at the valve plane it
//! is the annulus ring.

use hashbrown::{HashMap, HashSet};
use mesh_types::{IndexedMesh, Point3};
use tracing::{debug, info, warn};

use crate::adjacency::{normalize_edge, MeshAdjacency};
use crate::error::{BoundaryError, BoundaryResult};

/// A connected run of boundary edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    /// Ordered list of vertex indices along the boundary.
    pub vertices: Vec<u32>,
    /// Whether the last vertex connects back to the first.
    pub closed: bool,
}

impl BoundaryLoop {
    /// Number of edges in the loop.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        if self.closed {
            self.vertices.len()
        } else {
            self.vertices.len().saturating_sub(1)
        }
    }

    /// Check if this is a closed loop enclosing an area.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.closed && self.vertices.len() >= 3
    }

    /// Positions of the loop vertices in order.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::InvalidIndex`] if a vertex is not in `mesh`.
    pub fn positions(&self, mesh: &IndexedMesh) -> BoundaryResult<Vec<Point3<f64>>> {
        self.vertices
            .iter()
            .map(|&v| {
                mesh.vertices
                    .get(v as usize)
                    .map(|vertex| vertex.position)
                    .ok_or(BoundaryError::InvalidIndex {
                        face: None,
                        vertex: v,
                        vertex_count: mesh.vertices.len(),
                    })
            })
            .collect()
    }
}

/// Find every boundary loop of a surface.
///
/// Loops are returned in a deterministic order: open chains first, starting
/// from their lowest endpoint, then closed loops starting from their lowest
/// vertex. A watertight surface yields an empty list.
///
/// # Errors
///
/// Returns an error if the mesh has no faces or a face references a vertex
/// that does not exist.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex};
/// use mesh_boundary::boundary_loops;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// let loops = boundary_loops(&mesh).unwrap();
///
/// // A single triangle has one boundary loop (all 3 edges are boundary)
/// assert_eq!(loops.len(), 1);
/// assert_eq!(loops[0].edge_count(), 3);
/// assert!(loops[0].closed);
/// ```
pub fn boundary_loops(mesh: &IndexedMesh) -> BoundaryResult<Vec<BoundaryLoop>> {
    if mesh.faces.is_empty() {
        return Err(BoundaryError::EmptyMesh);
    }
    let vertex_count = mesh.vertices.len();
    for (face, indices) in mesh.faces.iter().enumerate() {
        if let Some(&vertex) = indices.iter().find(|&&v| v as usize >= vertex_count) {
            return Err(BoundaryError::InvalidIndex {
                face: Some(face),
                vertex,
                vertex_count,
            });
        }
    }

    let adjacency = MeshAdjacency::build(&mesh.faces);
    if adjacency.is_watertight() {
        debug!(edges = adjacency.edge_count(), "surface is watertight");
        return Ok(Vec::new());
    }
    Ok(trace_loops(&adjacency))
}

/// Trace the boundary edges of a precomputed adjacency into loops.
#[must_use]
pub fn trace_loops(adjacency: &MeshAdjacency) -> Vec<BoundaryLoop> {
    let boundary_edges = adjacency.boundary_edges();
    if boundary_edges.is_empty() {
        return Vec::new();
    }

    debug!(edges = boundary_edges.len(), "tracing boundary edges");

    let mut neighbors: HashMap<u32, Vec<u32>> = HashMap::new();
    for &(a, b) in &boundary_edges {
        neighbors.entry(a).or_default().push(b);
        neighbors.entry(b).or_default().push(a);
    }
    for list in neighbors.values_mut() {
        list.sort_unstable();
    }

    let mut endpoints: Vec<u32> = neighbors
        .iter()
        .filter(|(_, n)| n.len() == 1)
        .map(|(&v, _)| v)
        .collect();
    endpoints.sort_unstable();

    let mut visited: HashSet<(u32, u32)> = HashSet::with_capacity(boundary_edges.len());
    let mut loops = Vec::new();

    let starts = endpoints
        .into_iter()
        .chain(boundary_edges.iter().map(|&(a, _)| a));

    for start in starts {
        let has_free_edge = neighbors
            .get(&start)
            .is_some_and(|n| n.iter().any(|&m| !visited.contains(&normalize_edge(start, m))));
        if !has_free_edge {
            continue;
        }

        let mut vertices = vec![start];
        let mut current = start;
        let closed = loop {
            let next = neighbors.get(&current).and_then(|n| {
                n.iter()
                    .copied()
                    .find(|&m| !visited.contains(&normalize_edge(current, m)))
            });
            match next {
                Some(n) => {
                    visited.insert(normalize_edge(current, n));
                    if n == start {
                        break true;
                    }
                    vertices.push(n);
                    current = n;
                }
                None => break false,
            }
        };

        if !closed {
            warn!(
                start,
                end = current,
                vertices = vertices.len(),
                "boundary chain is not closed"
            );
        }
        loops.push(BoundaryLoop { vertices, closed });
    }

    info!(
        loops = loops.len(),
        sizes = ?loops.iter().map(BoundaryLoop::edge_count).collect::<Vec<_>>(),
        "traced boundary loops"
    );

    loops
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::Vertex;

    fn open_box_mesh() -> IndexedMesh {
        // A box missing its top face (has a square hole)
        let mut mesh = IndexedMesh::new();

        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0)); // 0
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0)); // 1
        mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0)); // 2
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0)); // 3
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 1.0)); // 4
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 1.0)); // 5
        mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 1.0)); // 6
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 1.0)); // 7

        mesh.faces.push([0, 2, 1]);
        mesh.faces.push([0, 3, 2]);
        mesh.faces.push([0, 1, 5]);
        mesh.faces.push([0, 5, 4]);
        mesh.faces.push([1, 2, 6]);
        mesh.faces.push([1, 6, 5]);
        mesh.faces.push([2, 3, 7]);
        mesh.faces.push([2, 7, 6]);
        mesh.faces.push([3, 0, 4]);
        mesh.faces.push([3, 4, 7]);

        // Top face is missing (hole at z=1)
        mesh
    }

    #[test]
    fn open_box_has_square_loop() {
        let loops = boundary_loops(&open_box_mesh()).expect("valid mesh");

        assert_eq!(loops.len(), 1);
        assert!(loops[0].is_valid());
        assert_eq!(loops[0].edge_count(), 4);
        assert_eq!(loops[0].vertices, vec![4, 5, 6, 7]);

        let positions = loops[0].positions(&open_box_mesh()).expect("indices in range");
        assert!(positions.iter().all(|p| (p.z - 1.0).abs() < 1e-12));
    }

    #[test]
    fn closed_box_has_no_loops() {
        let loops = boundary_loops(&mesh_types::unit_cube()).expect("valid mesh");
        assert!(loops.is_empty());
    }

    #[test]
    fn tube_has_two_loops() {
        // Open-ended square tube: two rings of four vertices
        let mut mesh = IndexedMesh::new();
        for z in [0.0, 1.0] {
            for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
                mesh.vertices.push(Vertex::from_coords(x, y, z));
            }
        }
        for i in 0..4u32 {
            let j = (i + 1) % 4;
            mesh.faces.push([i, j, j + 4]);
            mesh.faces.push([i, j + 4, i + 4]);
        }

        let loops = boundary_loops(&mesh).expect("valid mesh");
        assert_eq!(loops.len(), 2);
        assert!(loops.iter().all(BoundaryLoop::is_valid));
        assert_eq!(loops[0].vertices[0], 0);
        assert_eq!(loops[1].vertices[0], 4);
    }

    #[test]
    fn loops_are_deterministic() {
        let mesh = open_box_mesh();
        let first = boundary_loops(&mesh).expect("valid mesh");
        for _ in 0..5 {
            assert_eq!(boundary_loops(&mesh).expect("valid mesh"), first);
        }
    }

    #[test]
    fn fan_outline_is_one_loop() {
        let faces = vec![[0, 1, 2], [2, 1, 3], [2, 3, 4]];
        let adjacency = MeshAdjacency::build(&faces);
        let loops = trace_loops(&adjacency);

        assert_eq!(loops.len(), 1);
        assert!(loops[0].closed);
        assert_eq!(loops[0].edge_count(), 5);
    }

    #[test]
    fn empty_and_invalid() {
        assert!(matches!(
            boundary_loops(&IndexedMesh::new()),
            Err(BoundaryError::EmptyMesh)
        ));

        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        assert!(matches!(
            boundary_loops(&mesh),
            Err(BoundaryError::InvalidIndex { vertex: 1, .. })
        ));
    }

    #[test]
    fn loop_edge_counts() {
        let open = BoundaryLoop {
            vertices: vec![0, 1, 2],
            closed: false,
        };
        assert_eq!(open.edge_count(), 2);
        assert!(!open.is_valid());

        let closed = BoundaryLoop {
            vertices: vec![0, 1, 2],
            closed: true,
        };
        assert_eq!(closed.edge_count(), 3);
        assert!(closed.is_valid());
    }
}

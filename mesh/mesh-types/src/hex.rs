//! Volumetric hexahedral mesh.

use crate::Aabb;
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of nodes in a linear hexahedron.
pub const HEX_NODE_COUNT: usize = 8;

/// An 8-node hexahedral element as indices into the node array.
///
/// Node order follows the VTK hexahedron convention: the bottom quad
/// `0-1-2-3` counter-clockwise seen from above, then the top quad `4-5-6-7`
/// directly above it.
pub type HexElement = [u32; HEX_NODE_COUNT];

/// An element references a node that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("element {element} references node {node}, but the mesh has {node_count} nodes")]
pub struct InvalidElement {
    /// Index of the offending element.
    pub element: usize,
    /// Out-of-range node index.
    pub node: u32,
    /// Number of nodes in the mesh.
    pub node_count: usize,
}

/// A volumetric mesh of linear hexahedra.
///
/// This is the tissue grid: nodes carry coordinates, elements carry
/// connectivity. Both are treated as read-only by the tagging stages.
///
/// # Example
///
/// ```
/// use mesh_types::{HexMesh, Point3};
///
/// let mut mesh = HexMesh::new();
/// for z in [0.0, 1.0] {
///     for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
///         mesh.nodes.push(Point3::new(x, y, z));
///     }
/// }
/// mesh.elements.push([0, 1, 2, 3, 4, 5, 6, 7]);
///
/// assert!(mesh.validate().is_ok());
/// assert_eq!(mesh.element_centroid(0), Some(Point3::new(0.5, 0.5, 0.5)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HexMesh {
    /// Node coordinates.
    pub nodes: Vec<Point3<f64>>,

    /// Element connectivity.
    pub elements: Vec<HexElement>,
}

impl HexMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Number of nodes.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of elements.
    #[inline]
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// A mesh with no nodes or no elements cannot be tagged.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() || self.elements.is_empty()
    }

    /// Check that every element references existing nodes.
    ///
    /// # Errors
    ///
    /// Returns the first offending element, in element order.
    pub fn validate(&self) -> Result<(), InvalidElement> {
        let node_count = self.nodes.len();
        for (element, nodes) in self.elements.iter().enumerate() {
            if let Some(&node) = nodes.iter().find(|&&n| n as usize >= node_count) {
                return Err(InvalidElement {
                    element,
                    node,
                    node_count,
                });
            }
        }
        Ok(())
    }

    /// Unweighted mean of all node coordinates.
    ///
    /// Returns `None` for a mesh without nodes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn node_centroid(&self) -> Option<Point3<f64>> {
        if self.nodes.is_empty() {
            return None;
        }
        let sum = self
            .nodes
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Some(Point3::from(sum / self.nodes.len() as f64))
    }

    /// Bounds of the nodes of one element.
    ///
    /// Returns `None` if the element or one of its nodes is out of range.
    #[must_use]
    pub fn element_bounds(&self, element: usize) -> Option<Aabb> {
        let nodes = self.elements.get(element)?;
        let mut aabb = Aabb::empty();
        for &n in nodes {
            aabb.expand_to_include(self.nodes.get(n as usize)?);
        }
        Some(aabb)
    }

    /// Centroid of an element, taken as the center of its node bounds.
    ///
    /// For the axis-aligned voxels produced by segmentation this coincides
    /// with the mean of the eight nodes.
    #[must_use]
    pub fn element_centroid(&self, element: usize) -> Option<Point3<f64>> {
        self.element_bounds(element).map(|b| b.center())
    }

    /// Centroids of all elements, in element order.
    ///
    /// Elements with out-of-range nodes are skipped, so call
    /// [`validate`](Self::validate) first when the counts must match.
    #[must_use]
    pub fn element_centroids(&self) -> Vec<Point3<f64>> {
        (0..self.elements.len())
            .filter_map(|e| self.element_centroid(e))
            .collect()
    }

    /// Bounds of all nodes.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.nodes.iter())
    }

    /// Node indices of every element, in element-local order.
    #[must_use]
    pub fn element_connectivity(&self) -> &[HexElement] {
        &self.elements
    }

    /// Generate a regular block of `cells[0] x cells[1] x cells[2]` cubic
    /// voxels with edge length `spacing`, starting at `origin`.
    ///
    /// Node `(i, j, k)` has index `i + j*nx + k*nx*ny` where `nx`, `ny` are
    /// node counts per row and layer. Elements are ordered x-fastest.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{HexMesh, Point3};
    ///
    /// let block = HexMesh::structured_block([3, 2, 1], 0.5, Point3::origin());
    /// assert_eq!(block.node_count(), 4 * 3 * 2);
    /// assert_eq!(block.element_count(), 6);
    /// ```
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    // Truncation: node indices are u32, blocks above 4B nodes are unsupported
    pub fn structured_block(cells: [usize; 3], spacing: f64, origin: Point3<f64>) -> Self {
        let [cx, cy, cz] = cells;
        let (nx, ny, nz) = (cx + 1, cy + 1, cz + 1);

        let mut nodes = Vec::with_capacity(nx * ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    nodes.push(Point3::new(
                        (i as f64).mul_add(spacing, origin.x),
                        (j as f64).mul_add(spacing, origin.y),
                        (k as f64).mul_add(spacing, origin.z),
                    ));
                }
            }
        }

        let index = |i: usize, j: usize, k: usize| (i + j * nx + k * nx * ny) as u32;
        let mut elements = Vec::with_capacity(cx * cy * cz);
        for k in 0..cz {
            for j in 0..cy {
                for i in 0..cx {
                    elements.push([
                        index(i, j, k),
                        index(i + 1, j, k),
                        index(i + 1, j + 1, k),
                        index(i, j + 1, k),
                        index(i, j, k + 1),
                        index(i + 1, j, k + 1),
                        index(i + 1, j + 1, k + 1),
                        index(i, j + 1, k + 1),
                    ]);
                }
            }
        }

        Self { nodes, elements }
    }

    /// Keep the elements whose centroid satisfies `keep`, dropping nodes
    /// that no kept element references.
    ///
    /// Relative order of the surviving nodes and elements is preserved.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{HexMesh, Point3};
    ///
    /// let block = HexMesh::structured_block([2, 1, 1], 1.0, Point3::origin());
    /// let left = block.extract_elements(|c| c.x < 1.0);
    /// assert_eq!(left.element_count(), 1);
    /// assert_eq!(left.node_count(), 8);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn extract_elements<F>(&self, keep: F) -> Self
    where
        F: Fn(&Point3<f64>) -> bool,
    {
        let kept: Vec<&HexElement> = self
            .elements
            .iter()
            .enumerate()
            .filter(|(e, _)| self.element_centroid(*e).is_some_and(|c| keep(&c)))
            .map(|(_, el)| el)
            .collect();

        let mut remap = vec![u32::MAX; self.nodes.len()];
        for el in &kept {
            for &n in *el {
                remap[n as usize] = 0;
            }
        }

        let mut nodes = Vec::new();
        for (old, slot) in remap.iter_mut().enumerate() {
            if *slot == 0 {
                *slot = nodes.len() as u32;
                nodes.push(self.nodes[old]);
            }
        }

        let elements = kept
            .into_iter()
            .map(|el| el.map(|n| remap[n as usize]))
            .collect();

        Self { nodes, elements }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn structured_block_vtk_order() {
        let block = HexMesh::structured_block([1, 1, 1], 2.0, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(block.elements[0], [0, 1, 3, 2, 4, 5, 7, 6]);
        assert_relative_eq!(block.nodes[3].x, 3.0);
        assert_relative_eq!(block.nodes[3].y, 2.0);
        assert_relative_eq!(block.nodes[7].z, 2.0);
    }

    #[test]
    fn validate_reports_first_bad_element() {
        let mut block = HexMesh::structured_block([2, 1, 1], 1.0, Point3::origin());
        block.elements[1][4] = 99;
        let err = block.validate().expect_err("out-of-range node");
        assert_eq!(err.element, 1);
        assert_eq!(err.node, 99);
        assert_eq!(err.node_count, 12);
    }

    #[test]
    fn element_centroid_is_cell_center() {
        let block = HexMesh::structured_block([2, 2, 2], 1.0, Point3::origin());
        let c = block.element_centroid(7).expect("element exists");
        assert_relative_eq!(c, Point3::new(1.5, 1.5, 1.5));
        assert_eq!(block.element_centroids().len(), 8);
    }

    #[test]
    fn element_out_of_range() {
        let block = HexMesh::structured_block([1, 1, 1], 1.0, Point3::origin());
        assert!(block.element_centroid(1).is_none());
    }

    #[test]
    fn node_centroid() {
        let block = HexMesh::structured_block([2, 2, 2], 1.0, Point3::origin());
        let c = block.node_centroid().expect("nodes present");
        assert_relative_eq!(c, Point3::new(1.0, 1.0, 1.0), epsilon = 1e-12);
        assert!(HexMesh::new().node_centroid().is_none());
    }

    #[test]
    fn extract_compacts_nodes() {
        let block = HexMesh::structured_block([3, 1, 1], 1.0, Point3::origin());
        let right = block.extract_elements(|c| c.x > 2.0);
        assert_eq!(right.element_count(), 1);
        assert_eq!(right.node_count(), 8);
        assert!(right.validate().is_ok());
        assert_relative_eq!(right.bounds().min.x, 2.0);
        assert_relative_eq!(right.bounds().max.x, 3.0);
    }

    #[test]
    fn extract_shared_nodes_kept_once() {
        let block = HexMesh::structured_block([3, 1, 1], 1.0, Point3::origin());
        let outer = block.extract_elements(|c| c.x < 1.0 || c.x > 2.0);
        assert_eq!(outer.element_count(), 2);
        assert_eq!(outer.node_count(), 16);

        let middle_two = block.extract_elements(|c| c.x > 0.5);
        assert_eq!(middle_two.node_count(), 12);
        assert_eq!(middle_two.elements[0][1], middle_two.elements[1][0]);
    }

    #[test]
    fn empty_mesh() {
        assert!(HexMesh::new().is_empty());
        assert!(HexMesh::new().validate().is_ok());
    }
}

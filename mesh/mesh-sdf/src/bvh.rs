//! Bounding volume hierarchy for nearest-triangle queries.
//!
//! Triangles are split at the median along the longest axis of each node;
//! queries descend nearest child first and prune subtrees whose bounds
//! are farther than the best candidate found so far.

use mesh_types::{Aabb, IndexedMesh, Point3};
use rayon::prelude::*;
use smallvec::SmallVec;

use crate::query::{closest_feature_on_triangle, TriangleFeature};

/// Maximum triangles stored in a leaf.
const MAX_LEAF_SIZE: usize = 8;

/// Subtrees with at least this many triangles are built in parallel.
const PARALLEL_THRESHOLD: usize = 4096;

/// Result of a nearest-triangle query.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Nearest {
    /// Squared distance to the closest point.
    pub distance_squared: f64,
    /// Closest point on the surface.
    pub point: Point3<f64>,
    /// Face holding the closest point.
    pub face: u32,
    /// Feature of that face the point lies on.
    pub feature: TriangleFeature,
}

impl Nearest {
    /// Strict ordering by distance, then by face index.
    fn is_better_than(&self, other: &Self) -> bool {
        self.distance_squared < other.distance_squared
            || (self.distance_squared == other.distance_squared && self.face < other.face)
    }
}

#[derive(Debug, Clone)]
enum BvhNode {
    Leaf {
        bbox: Aabb,
        triangles: SmallVec<[u32; MAX_LEAF_SIZE]>,
    },
    Internal {
        bbox: Aabb,
        left: Box<Self>,
        right: Box<Self>,
    },
}

impl BvhNode {
    fn bbox(&self) -> &Aabb {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }
}

/// Nearest-triangle hierarchy over the faces of a mesh.
///
/// The hierarchy only stores face indices; the mesh is passed back in at
/// query time so it is owned in a single place.
#[derive(Debug, Clone)]
pub(crate) struct TriangleBvh {
    root: BvhNode,
}

impl TriangleBvh {
    /// Build the hierarchy. Returns `None` for a mesh without faces.
    ///
    /// Face indices must already be validated against the vertex count.
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(mesh: &IndexedMesh) -> Option<Self> {
        if mesh.faces.is_empty() {
            return None;
        }

        let boxes: Vec<(u32, Aabb)> = mesh
            .faces
            .par_iter()
            .enumerate()
            .map(|(i, face)| {
                let bbox = Aabb::from_points(face.iter().map(|&v| &mesh.vertices[v as usize].position));
                (i as u32, bbox)
            })
            .collect();

        let indices: Vec<usize> = (0..boxes.len()).collect();
        Some(Self {
            root: build_recursive(&boxes, indices),
        })
    }

    /// Find the closest point on the mesh to `point`.
    pub fn nearest(&self, mesh: &IndexedMesh, point: &Point3<f64>) -> Nearest {
        let mut best = Nearest {
            distance_squared: f64::INFINITY,
            point: *point,
            face: u32::MAX,
            feature: TriangleFeature::Face,
        };
        nearest_recursive(&self.root, mesh, point, &mut best);
        best
    }
}

fn build_recursive(boxes: &[(u32, Aabb)], mut indices: Vec<usize>) -> BvhNode {
    let bbox = indices
        .iter()
        .fold(Aabb::empty(), |acc, &i| acc.union(&boxes[i].1));

    if indices.len() <= MAX_LEAF_SIZE {
        return BvhNode::Leaf {
            bbox,
            triangles: indices.iter().map(|&i| boxes[i].0).collect(),
        };
    }

    let axis = bbox.longest_axis();
    indices.sort_by(|&a, &b| {
        let ca = boxes[a].1.center()[axis];
        let cb = boxes[b].1.center()[axis];
        ca.total_cmp(&cb).then(a.cmp(&b))
    });

    let right_indices = indices.split_off(indices.len() / 2);
    let left_indices = indices;

    let (left, right) = if left_indices.len() + right_indices.len() >= PARALLEL_THRESHOLD {
        rayon::join(
            || build_recursive(boxes, left_indices),
            || build_recursive(boxes, right_indices),
        )
    } else {
        (
            build_recursive(boxes, left_indices),
            build_recursive(boxes, right_indices),
        )
    };

    BvhNode::Internal {
        bbox,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn nearest_recursive(node: &BvhNode, mesh: &IndexedMesh, point: &Point3<f64>, best: &mut Nearest) {
    match node {
        BvhNode::Leaf { triangles, .. } => {
            for &face in triangles {
                let [a, b, c] = mesh.faces[face as usize];
                let (closest, feature) = closest_feature_on_triangle(
                    *point,
                    mesh.vertices[a as usize].position,
                    mesh.vertices[b as usize].position,
                    mesh.vertices[c as usize].position,
                );
                let candidate = Nearest {
                    distance_squared: (closest - point).norm_squared(),
                    point: closest,
                    face,
                    feature,
                };
                if candidate.is_better_than(best) {
                    *best = candidate;
                }
            }
        }
        BvhNode::Internal { left, right, .. } => {
            let dl = left.bbox().distance_squared(point);
            let dr = right.bbox().distance_squared(point);
            let (first, d_first, second, d_second) = if dl <= dr {
                (left, dl, right, dr)
            } else {
                (right, dr, left, dl)
            };
            // Equal distances are still visited so that ties resolve by face index.
            if d_first <= best.distance_squared {
                nearest_recursive(first, mesh, point, best);
            }
            if d_second <= best.distance_squared {
                nearest_recursive(second, mesh, point, best);
            }
        }
    }
}

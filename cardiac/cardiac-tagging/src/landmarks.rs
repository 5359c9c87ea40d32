//! Apex and base landmarks.
//!
//! The apex is the site farthest from the ventricle centroid in the lower
//! half. The base is the open boundary of the endocardium, swept into a tube
//! so it can be queried with the same distance machinery as the walls.

// Mesh processing uses indices; casts are safe for practical mesh sizes.
#![allow(clippy::cast_precision_loss)]

use mesh_boundary::{boundary_loops, BoundaryLoop};
use mesh_from_curves::{tube_from_polyline, TubeConfig};
use mesh_sdf::SignedDistanceField;
use mesh_types::{Aabb, HexMesh, IndexedMesh, Point3, Vector3, Vertex};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::classify::normalized_depth;
use crate::error::{TaggingError, TaggingResult};
use crate::labels::ApexBaseTag;
use crate::params::{EvaluationSite, TaggingParams};
use crate::surfaces::{distance_field, Surface};

/// Index of the site farthest from `centroid` among sites strictly below it
/// along `axis`.
///
/// Sites are scanned in index order with a strict comparison, so the first
/// of several equally distant sites wins.
///
/// # Example
///
/// ```
/// use cardiac_tagging::locate_apex;
/// use nalgebra::{Point3, Vector3};
///
/// let sites = [
///     Point3::new(0.0, 0.0, 5.0),
///     Point3::new(1.0, 0.0, -2.0),
///     Point3::new(-1.0, 0.0, -2.0),
///     Point3::new(0.0, 0.0, -1.0),
/// ];
/// let apex = locate_apex(&sites, &Point3::origin(), &Vector3::z());
/// assert_eq!(apex, Some(1));
/// ```
#[must_use]
pub fn locate_apex(sites: &[Point3<f64>], centroid: &Point3<f64>, axis: &Vector3<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in sites.iter().enumerate() {
        let offset = p - centroid;
        if offset.dot(axis) >= 0.0 {
            continue;
        }
        let dist_sq = offset.norm_squared();
        if best.map_or(true, |(_, d)| dist_sq > d) {
            best = Some((i, dist_sq));
        }
    }
    best.map(|(i, _)| i)
}

/// Single-triangle surface marking the apex.
///
/// The triangle has the apex as its middle vertex and spans `2 * half_width`
/// along `x`, offset by `-half_width` along `y`.
#[must_use]
pub fn apex_marker(apex: Point3<f64>, x: Vector3<f64>, y: Vector3<f64>, half_width: f64) -> IndexedMesh {
    let dx = x * half_width;
    let dy = y * half_width;
    IndexedMesh::from_positions(&[apex - dx - dy, apex, apex + dx - dy], vec![[0, 1, 2]])
}

/// The endocardial boundary and the tube swept around it.
#[derive(Debug, Clone)]
pub struct BaseBoundary {
    /// Boundary loops of the endocardium, in traced order.
    pub loops: Vec<BoundaryLoop>,
    /// Positions of every boundary vertex, loop by loop.
    pub points: Vec<Point3<f64>>,
    /// Tube surface around all loops.
    pub tube: IndexedMesh,
}

impl BaseBoundary {
    /// Trace the open boundary of `endocardium` and sweep a tube around it.
    ///
    /// Closed loops become rings; open chains become uncapped tubes. Chains
    /// of a single vertex contribute points but no tube.
    ///
    /// # Errors
    ///
    /// Returns [`TaggingError::MissingBaseBoundary`] if the surface is
    /// watertight or no loop is long enough for a tube, or a tube error for
    /// coincident boundary vertices.
    pub fn trace(endocardium: &IndexedMesh, radius: f64, segments: usize) -> TaggingResult<Self> {
        let loops = boundary_loops(endocardium)?;
        if loops.is_empty() {
            warn!(faces = endocardium.face_count(), "endocardium is watertight");
            return Err(TaggingError::MissingBaseBoundary);
        }

        let mut points = Vec::new();
        let mut tube = IndexedMesh::new();
        for lp in &loops {
            let positions = lp.positions(endocardium)?;
            points.extend_from_slice(&positions);

            let mut config = TubeConfig::default()
                .with_radius(radius)
                .with_segments(segments)
                .uncapped();
            if lp.is_valid() {
                config = config.closed_loop();
            } else if positions.len() < 2 {
                continue;
            }
            tube.merge(&tube_from_polyline(&positions, &config)?);
        }

        if tube.is_empty() {
            return Err(TaggingError::MissingBaseBoundary);
        }

        debug!(
            loops = loops.len(),
            sizes = ?loops.iter().map(|l| l.vertices.len()).collect::<Vec<_>>(),
            tube_faces = tube.face_count(),
            "traced base boundary"
        );

        Ok(Self { loops, points, tube })
    }

    /// Mean of the tube vertex positions.
    #[must_use]
    pub fn tube_center(&self) -> Option<Point3<f64>> {
        if self.tube.vertices.is_empty() {
            return None;
        }
        let sum = self
            .tube
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v: &Vertex| acc + v.position.coords);
        Some(Point3::from(sum / self.tube.vertices.len() as f64))
    }
}

/// Index of the element whose bounds are closest to `point`.
///
/// Ties resolve to the lowest element index.
#[must_use]
pub fn nearest_element(bounds: &[Aabb], point: &Point3<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (e, b) in bounds.iter().enumerate() {
        let d = b.distance_squared(point);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((e, d));
        }
    }
    best.map(|(e, _)| e)
}

/// Sites next to the boundary points, sorted and deduplicated.
///
/// Each boundary point selects its nearest element. In node mode all nodes
/// of that element are base sites; in element mode the element itself is.
#[must_use]
pub fn base_sites(mesh: &HexMesh, boundary: &[Point3<f64>], site: EvaluationSite) -> Vec<usize> {
    let bounds: Vec<Aabb> = (0..mesh.element_count())
        .map(|e| mesh.element_bounds(e).unwrap_or_else(Aabb::empty))
        .collect();

    let elements: Vec<usize> = boundary
        .par_iter()
        .filter_map(|p| nearest_element(&bounds, p))
        .collect();

    let mut sites: Vec<usize> = match site {
        EvaluationSite::Node => elements
            .iter()
            .flat_map(|&e| mesh.elements[e].iter().map(|&n| n as usize))
            .collect(),
        EvaluationSite::ElementCentroid => elements,
    };
    sites.sort_unstable();
    sites.dedup();
    sites
}

/// Landmarks of a ventricle.
///
/// Computed once from the tissue mesh and the endocardium; read-only after.
#[derive(Debug, Clone)]
pub struct Landmarks {
    /// Mean of all mesh node coordinates.
    pub centroid: Point3<f64>,
    /// Index of the apex site.
    pub apex_site: usize,
    /// Coordinates of the apex site.
    pub apex_point: Point3<f64>,
    /// Center of the base tube, raised to the highest site.
    pub base_center: Point3<f64>,
    /// Unit vector from apex to base center.
    pub long_axis: Vector3<f64>,
    /// Sorted indices of sites tagged as base.
    pub base_sites: Vec<usize>,
    /// Boundary curve and tube.
    pub base: BaseBoundary,
}

impl Landmarks {
    /// Locate apex, base and long axis.
    ///
    /// `sites` are the evaluation sites (nodes or element centroids) and
    /// must match `params.site`.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh is empty, no site lies in the lower half,
    /// the endocardium has no boundary, or apex and base coincide.
    pub fn locate(
        mesh: &HexMesh,
        sites: &[Point3<f64>],
        endocardium: &IndexedMesh,
        params: &TaggingParams,
    ) -> TaggingResult<Self> {
        let (axis, _, _) = params.in_plane_axes().ok_or_else(|| {
            TaggingError::InvalidParams("long axis and septal axis must not be parallel".to_string())
        })?;
        let centroid = mesh.node_centroid().ok_or(TaggingError::EmptyMesh)?;

        let apex_site = locate_apex(sites, &centroid, &axis).ok_or(TaggingError::ApexNotFound)?;
        let apex_point = sites[apex_site];

        let base = BaseBoundary::trace(endocardium, params.base_tube_radius, params.base_tube_segments)?;
        let tube_center = base.tube_center().ok_or(TaggingError::MissingBaseBoundary)?;

        let top = sites
            .iter()
            .map(|p| p.coords.dot(&axis))
            .fold(f64::NEG_INFINITY, f64::max);
        let base_center = tube_center + axis * (top - tube_center.coords.dot(&axis));

        let long_axis = (base_center - apex_point)
            .try_normalize(params.degeneracy_tolerance)
            .ok_or(TaggingError::DegenerateLongAxis)?;

        let base_sites = base_sites(mesh, &base.points, params.site);

        info!(
            apex = apex_site,
            apex_point = ?apex_point,
            loops = base.loops.len(),
            boundary_points = base.points.len(),
            base_sites = base_sites.len(),
            long_axis = ?long_axis,
            "located landmarks"
        );

        Ok(Self {
            centroid,
            apex_site,
            apex_point,
            base_center,
            long_axis,
            base_sites,
            base,
        })
    }

    /// Apex/base tag for a site.
    ///
    /// The apex tag wins over the base tag.
    #[must_use]
    pub fn apex_base_tag(&self, site: usize) -> ApexBaseTag {
        if site == self.apex_site {
            ApexBaseTag::Apex
        } else if self.base_sites.binary_search(&site).is_ok() {
            ApexBaseTag::Base
        } else {
            ApexBaseTag::Mid
        }
    }
}

/// Distance fields of the apex marker and the base tube.
#[derive(Debug, Clone)]
pub struct ApexBaseField {
    apex: SignedDistanceField,
    base: SignedDistanceField,
}

impl ApexBaseField {
    /// Build both fields from located landmarks.
    ///
    /// # Errors
    ///
    /// Returns an error if either surface cannot be turned into a field.
    pub fn build(landmarks: &Landmarks, params: &TaggingParams) -> TaggingResult<Self> {
        let (_, x, y) = params.in_plane_axes().ok_or_else(|| {
            TaggingError::InvalidParams("long axis and septal axis must not be parallel".to_string())
        })?;
        let marker = apex_marker(landmarks.apex_point, x, y, params.apex_marker_half_width);
        Ok(Self {
            apex: distance_field(Surface::Apex, marker)?,
            base: distance_field(Surface::Base, landmarks.base.tube.clone())?,
        })
    }

    /// Normalized position of a point, 0 at the apex and 1 at the base.
    #[must_use]
    pub fn depth(&self, point: Point3<f64>) -> f64 {
        normalized_depth(self.apex.distance(point), self.base.distance(point))
    }

    /// Depth of every site in parallel, in site order.
    #[must_use]
    pub fn depths(&self, sites: &[Point3<f64>]) -> Vec<f64> {
        sites.par_iter().map(|&p| self.depth(p)).collect()
    }
}

//! Tube mesh generation from curves.
//!
//! Creates cylindrical tubes around open polylines and closed loops.

use mesh_types::{IndexedMesh, Vertex};
use nalgebra::Point3;

use crate::error::{CurveError, CurveResult};
use crate::frame::{closed_loop_frames, parallel_transport_frames, Frame};

/// Configuration for tube generation.
#[derive(Debug, Clone, PartialEq)]
pub struct TubeConfig {
    /// Radius of the tube.
    pub radius: f64,
    /// Number of segments around the circumference.
    pub segments: usize,
    /// Whether to cap the ends of an open tube.
    pub capped: bool,
    /// Whether the last point connects back to the first.
    ///
    /// A closed tube is a torus-like ring and never has caps.
    pub closed: bool,
}

impl Default for TubeConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            segments: 16,
            capped: true,
            closed: false,
        }
    }
}

impl TubeConfig {
    /// Create a tube config with the given radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Create a tube config with the given number of circumferential segments.
    #[must_use]
    pub const fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    /// Create a tube config without end caps.
    #[must_use]
    pub const fn uncapped(mut self) -> Self {
        self.capped = false;
        self
    }

    /// Create a tube config that wraps the curve into a ring.
    #[must_use]
    pub const fn closed_loop(mut self) -> Self {
        self.closed = true;
        self.capped = false;
        self
    }

    /// Minimum number of curve points for this configuration.
    #[must_use]
    pub const fn min_points(&self) -> usize {
        if self.closed {
            3
        } else {
            2
        }
    }
}

/// Generate a tube mesh around a polyline curve.
///
/// Face winding is counter-clockwise seen from outside, so vertex normals
/// and face normals both point away from the center line.
///
/// # Errors
///
/// Returns an error if:
/// - Fewer than 2 points are provided (3 for a closed loop)
/// - Two consecutive points coincide
/// - Radius is not positive
/// - Fewer than 3 segments are requested
///
/// # Example
///
/// ```
/// use mesh_from_curves::{tube_from_polyline, TubeConfig};
/// use nalgebra::Point3;
///
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(0.0, 0.0, 10.0),
/// ];
///
/// let config = TubeConfig::default().with_radius(0.5);
/// let mesh = tube_from_polyline(&points, &config).unwrap();
///
/// assert!(!mesh.vertices.is_empty());
/// assert!(!mesh.faces.is_empty());
/// ```
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
// Truncation: tube vertex counts stay far below u32::MAX
pub fn tube_from_polyline(points: &[Point3<f64>], config: &TubeConfig) -> CurveResult<IndexedMesh> {
    let min = config.min_points();
    if points.len() < min {
        return Err(CurveError::TooFewPoints {
            min,
            actual: points.len(),
        });
    }

    if config.radius <= 0.0 || !config.radius.is_finite() {
        return Err(CurveError::InvalidRadius(config.radius));
    }

    if config.segments < 3 {
        return Err(CurveError::TooFewSegments {
            min: 3,
            actual: config.segments,
        });
    }

    let n_rings = points.len();
    let n_spans = if config.closed { n_rings } else { n_rings - 1 };
    for index in 0..n_spans {
        let next = (index + 1) % n_rings;
        if (points[next] - points[index]).norm_squared() <= f64::EPSILON * f64::EPSILON {
            return Err(CurveError::DegenerateSegment { index });
        }
    }

    let frames = if config.closed {
        closed_loop_frames(points)
    } else {
        parallel_transport_frames(points)
    };

    let n_segs = config.segments;
    let mut mesh = IndexedMesh::with_capacity(n_rings * n_segs + 2, 2 * n_spans * n_segs + 2 * n_segs);

    for (point, frame) in points.iter().zip(frames.iter()) {
        for seg_idx in 0..n_segs {
            let angle = std::f64::consts::TAU * (seg_idx as f64) / (n_segs as f64);
            let (sin_a, cos_a) = angle.sin_cos();

            let radial = frame.normal * cos_a + frame.binormal * sin_a;
            let pos = Point3::from(point.coords + radial * config.radius);
            let normal = radial.try_normalize(f64::EPSILON).unwrap_or(frame.normal);

            mesh.vertices.push(Vertex::with_normal(pos, normal));
        }
    }

    for ring_idx in 0..n_spans {
        let next_ring_idx = (ring_idx + 1) % n_rings;
        for seg_idx in 0..n_segs {
            let next_seg_idx = (seg_idx + 1) % n_segs;
            let curr = (ring_idx * n_segs + seg_idx) as u32;
            let next_seg = (ring_idx * n_segs + next_seg_idx) as u32;
            let next_ring = (next_ring_idx * n_segs + seg_idx) as u32;
            let next_both = (next_ring_idx * n_segs + next_seg_idx) as u32;

            // Two triangles for this quad
            mesh.faces.push([curr, next_seg, next_ring]);
            mesh.faces.push([next_seg, next_both, next_ring]);
        }
    }

    if config.capped && !config.closed {
        add_cap(&mut mesh, &frames[0], points[0], n_segs, 0, true);
        let last_ring_start = (n_rings - 1) * n_segs;
        add_cap(
            &mut mesh,
            &frames[n_rings - 1],
            points[n_rings - 1],
            n_segs,
            last_ring_start,
            false,
        );
    }

    Ok(mesh)
}

/// Add an end cap to the tube.
#[allow(clippy::cast_possible_truncation)]
fn add_cap(
    mesh: &mut IndexedMesh,
    frame: &Frame,
    center: Point3<f64>,
    n_segs: usize,
    ring_start: usize,
    is_start: bool,
) {
    let normal = if is_start {
        -frame.tangent
    } else {
        frame.tangent
    };
    let center_idx = mesh.vertices.len() as u32;
    mesh.vertices.push(Vertex::with_normal(center, normal));

    for seg_idx in 0..n_segs {
        let curr = (ring_start + seg_idx) as u32;
        let next = (ring_start + (seg_idx + 1) % n_segs) as u32;

        if is_start {
            mesh.faces.push([center_idx, next, curr]);
        } else {
            mesh.faces.push([center_idx, curr, next]);
        }
    }
}

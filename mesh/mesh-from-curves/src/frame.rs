//! Moving frame computation for curve sweeping.
//!
//! Provides parallel transport frames along open curves and closed loops
//! for consistent orientation.

use nalgebra::{Point3, UnitVector3, Vector3};

/// A reference frame at a point on a curve.
///
/// Consists of three orthonormal vectors: tangent, normal, and binormal.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    /// Tangent direction (forward along curve).
    pub tangent: Vector3<f64>,
    /// Normal direction (perpendicular to tangent).
    pub normal: Vector3<f64>,
    /// Binormal direction (perpendicular to both tangent and normal).
    pub binormal: Vector3<f64>,
}

impl Frame {
    /// Create an initial frame from a tangent vector.
    ///
    /// Computes a perpendicular normal and binormal.
    #[must_use]
    pub fn from_tangent(tangent: Vector3<f64>) -> Self {
        let tangent = tangent.try_normalize(f64::EPSILON).unwrap_or(Vector3::z());

        let normal = find_perpendicular(tangent);
        let binormal = tangent.cross(&normal);

        Self {
            tangent,
            normal,
            binormal,
        }
    }

    /// Rotate the frame's normal and binormal by an angle around the tangent.
    #[must_use]
    pub fn rotate_around_tangent(&self, angle: f64) -> Self {
        let cos_a = angle.cos();
        let sin_a = angle.sin();

        let new_normal = self.normal * cos_a + self.binormal * sin_a;
        let new_binormal = -self.normal * sin_a + self.binormal * cos_a;

        Self {
            tangent: self.tangent,
            normal: new_normal,
            binormal: new_binormal,
        }
    }
}

/// Find a vector perpendicular to the given vector.
fn find_perpendicular(v: Vector3<f64>) -> Vector3<f64> {
    // Choose the axis most perpendicular to v
    let abs_x = v.x.abs();
    let abs_y = v.y.abs();
    let abs_z = v.z.abs();

    let perp = if abs_x <= abs_y && abs_x <= abs_z {
        Vector3::x()
    } else if abs_y <= abs_z {
        Vector3::y()
    } else {
        Vector3::z()
    };

    v.cross(&perp)
        .try_normalize(f64::EPSILON)
        .unwrap_or(Vector3::y())
}

/// Compute parallel transport frames along an open curve.
///
/// Uses rotation minimizing frames to avoid twisting.
///
/// # Example
///
/// ```
/// use mesh_from_curves::parallel_transport_frames;
/// use nalgebra::Point3;
///
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
/// ];
///
/// let frames = parallel_transport_frames(&points);
/// assert_eq!(frames.len(), 3);
/// ```
#[must_use]
pub fn parallel_transport_frames(points: &[Point3<f64>]) -> Vec<Frame> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut frames = Vec::with_capacity(points.len());

    let first_tangent = (points[1] - points[0])
        .try_normalize(f64::EPSILON)
        .unwrap_or(Vector3::z());
    frames.push(Frame::from_tangent(first_tangent));

    for i in 1..points.len() {
        let prev_frame = frames[i - 1];

        let tangent = if i < points.len() - 1 {
            // Average of incoming and outgoing directions
            let prev_dir = points[i] - points[i - 1];
            let next_dir = points[i + 1] - points[i];
            (prev_dir + next_dir)
                .try_normalize(f64::EPSILON)
                .unwrap_or(prev_frame.tangent)
        } else {
            (points[i] - points[i - 1])
                .try_normalize(f64::EPSILON)
                .unwrap_or(prev_frame.tangent)
        };

        frames.push(parallel_transport_frame(&prev_frame, tangent));
    }

    frames
}

/// Compute parallel transport frames around a closed loop.
///
/// The last point connects back to the first. The twist accumulated by
/// transporting once around the loop is spread evenly over all steps,
/// including the closing step from the last point back to the first.
///
/// Returns an empty list for fewer than 3 points.
///
/// # Example
///
/// ```
/// use mesh_from_curves::closed_loop_frames;
/// use nalgebra::Point3;
///
/// let square = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
///
/// let frames = closed_loop_frames(&square);
/// assert_eq!(frames.len(), 4);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn closed_loop_frames(points: &[Point3<f64>]) -> Vec<Frame> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let tangent_at = |i: usize| {
        let prev = points[(i + n - 1) % n];
        let next = points[(i + 1) % n];
        (next - prev)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(|| (next - points[i]).try_normalize(f64::EPSILON).unwrap_or(Vector3::z()))
    };

    let mut frames = Vec::with_capacity(n);
    frames.push(Frame::from_tangent(tangent_at(0)));
    for i in 1..n {
        let frame = parallel_transport_frame(&frames[i - 1], tangent_at(i));
        frames.push(frame);
    }

    // Transport once more back onto the first tangent and measure the twist.
    let first = frames[0];
    let wrapped = parallel_transport_frame(&frames[n - 1], first.tangent);
    let twist = wrapped
        .normal
        .dot(&first.binormal)
        .atan2(wrapped.normal.dot(&first.normal));

    frames
        .into_iter()
        .enumerate()
        .map(|(i, frame)| frame.rotate_around_tangent(-twist * i as f64 / n as f64))
        .collect()
}

/// Transport a frame from one tangent to another.
///
/// Uses the rotation that maps the old tangent to the new one
/// to transform the normal and binormal.
fn parallel_transport_frame(prev_frame: &Frame, new_tangent: Vector3<f64>) -> Frame {
    let new_tangent = new_tangent
        .try_normalize(f64::EPSILON)
        .unwrap_or(prev_frame.tangent);

    let axis = prev_frame.tangent.cross(&new_tangent);
    let axis_len = axis.norm();

    if axis_len < f64::EPSILON {
        // Tangents are parallel
        let dot = prev_frame.tangent.dot(&new_tangent);
        if dot > 0.0 {
            Frame {
                tangent: new_tangent,
                normal: prev_frame.normal,
                binormal: prev_frame.binormal,
            }
        } else {
            Frame {
                tangent: new_tangent,
                normal: -prev_frame.normal,
                binormal: -prev_frame.binormal,
            }
        }
    } else {
        let axis = UnitVector3::new_normalize(axis);
        let dot = prev_frame.tangent.dot(&new_tangent).clamp(-1.0, 1.0);
        let angle = dot.acos();

        // Rodrigues rotation formula
        let rotate = |v: Vector3<f64>| {
            let k = axis.into_inner();
            let cos_a = angle.cos();
            let sin_a = angle.sin();
            v * cos_a + k.cross(&v) * sin_a + k * (k.dot(&v)) * (1.0 - cos_a)
        };

        Frame {
            tangent: new_tangent,
            normal: rotate(prev_frame.normal),
            binormal: rotate(prev_frame.binormal),
        }
    }
}

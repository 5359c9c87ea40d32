//! Rule-based fiber orientation.
//!
//! Each site gets a local frame built from the wall normals and the long
//! axis. A canonical fiber direction from Streeter's rule is expressed in
//! that frame and rotated back into global coordinates.

use mesh_sdf::SurfaceHit;
use mesh_types::{Point3, Vector3};
use nalgebra::Matrix3;
use rayon::prelude::*;
use tracing::info;

use crate::classify::TissueSample;
use crate::error::{TaggingError, TaggingResult};
use crate::labels::TransmuralClass;
use crate::params::StreeterCoefficients;

/// Fiber angles at one site, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreeterAngles {
    /// Elevation between apex and base, from `-pi/2` at the base to 0 at the
    /// apex.
    pub phi: f64,
    /// Helix angle.
    pub helix: f64,
    /// Transverse angle.
    pub transverse: f64,
}

impl StreeterAngles {
    /// Angles for transmural depth `w` and apex-to-base depth `apex_base`.
    ///
    /// `apex_base` is clamped into `[0, 1]` before taking its arccosine.
    #[must_use]
    pub fn new(coefficients: &StreeterCoefficients, w: f64, apex_base: f64) -> Self {
        let phi = apex_base.clamp(0.0, 1.0).acos().abs() - std::f64::consts::FRAC_PI_2;
        Self {
            phi,
            helix: coefficients.helix(w),
            transverse: coefficients.transverse(phi),
        }
    }

    /// Unit fiber direction in the (normal, tangential, axial) basis.
    ///
    /// # Example
    ///
    /// ```
    /// use cardiac_tagging::{StreeterAngles, StreeterCoefficients};
    ///
    /// let angles = StreeterAngles::new(&StreeterCoefficients::default(), 0.5, 0.5);
    /// let fiber = angles.canonical_fiber();
    /// assert!((fiber.norm() - 1.0).abs() < 1e-12);
    /// assert!(fiber.y > 0.0);
    /// ```
    #[must_use]
    pub fn canonical_fiber(&self) -> Vector3<f64> {
        Vector3::new(self.transverse.tan(), 1.0, self.helix.tan()).normalize()
    }
}

/// Orthonormal frame at a site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    /// Transmural direction.
    pub normal: Vector3<f64>,
    /// Circumferential direction.
    pub tangent: Vector3<f64>,
    /// Direction along the long axis, within the wall.
    pub axial: Vector3<f64>,
}

impl LocalFrame {
    /// Build the frame from unit wall normals, transmural depth `w` and the
    /// long axis.
    ///
    /// The normal blends the two wall normals by depth, the tangent is
    /// `long_axis x normal` and the axial direction completes the frame.
    ///
    /// # Errors
    ///
    /// Returns the name of the first vector that collapsed below `tolerance`.
    pub fn new(
        endo_normal: &Vector3<f64>,
        epi_normal: &Vector3<f64>,
        w: f64,
        long_axis: &Vector3<f64>,
        tolerance: f64,
    ) -> Result<Self, &'static str> {
        let normal = (epi_normal * w - endo_normal * (1.0 - w))
            .try_normalize(tolerance)
            .ok_or("frame normal")?;
        let tangent = long_axis
            .cross(&normal)
            .try_normalize(tolerance)
            .ok_or("frame tangent")?;
        let axial = normal
            .cross(&tangent)
            .try_normalize(tolerance)
            .ok_or("frame axial direction")?;
        Ok(Self {
            normal,
            tangent,
            axial,
        })
    }

    /// Express a vector given in (normal, tangential, axial) components in
    /// global coordinates.
    #[must_use]
    pub fn to_global(&self, local: &Vector3<f64>) -> Vector3<f64> {
        Matrix3::from_columns(&[self.normal, self.tangent, self.axial]) * local
    }
}

/// Unit vector from a point to its closest surface point.
///
/// With `flip` the direction is reversed. Returns `None` when the point lies
/// on the surface.
#[must_use]
pub fn surface_normal(point: &Point3<f64>, hit: &SurfaceHit, flip: bool, tolerance: f64) -> Option<Vector3<f64>> {
    let towards = hit.point - point;
    let v = if flip { -towards } else { towards };
    v.try_normalize(tolerance)
}

/// Fiber result for one site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiberSample {
    /// Unit fiber direction in global coordinates.
    pub fiber: Vector3<f64>,
    /// Unit endocardial normal.
    pub endo_normal: Vector3<f64>,
    /// Unit epicardial normal.
    pub epi_normal: Vector3<f64>,
    /// Local frame the fiber was built in.
    pub frame: LocalFrame,
    /// Angles used.
    pub angles: StreeterAngles,
}

/// Inputs shared by every site.
#[derive(Debug, Clone, Copy)]
pub struct FiberModel<'a> {
    /// Unit long axis, apex to base.
    pub long_axis: Vector3<f64>,
    /// Angle model.
    pub coefficients: &'a StreeterCoefficients,
    /// Vectors shorter than this are degenerate.
    pub tolerance: f64,
}

impl FiberModel<'_> {
    /// Fiber at one site.
    ///
    /// The endocardial normal points from the site to the endocardium,
    /// reversed for endocardial sites that fall outside the endocardial
    /// surface. The epicardial normal is built the same way against the
    /// epicardium for epicardial sites.
    ///
    /// # Errors
    ///
    /// Returns [`TaggingError::DegenerateFrame`] when a normal or frame
    /// vector has zero length.
    pub fn synthesize(
        &self,
        site: usize,
        point: &Point3<f64>,
        tissue: &TissueSample,
        apex_base_depth: f64,
    ) -> TaggingResult<FiberSample> {
        let degenerate = |vector| TaggingError::DegenerateFrame { site, vector };
        let d = &tissue.distances;

        let flip_endo = tissue.transmural_class == TransmuralClass::Endo && d.endocardium.distance >= 0.0;
        let endo_normal = surface_normal(point, &d.endocardium, flip_endo, self.tolerance)
            .ok_or_else(|| degenerate("endocardial normal"))?;

        let flip_epi = tissue.transmural_class == TransmuralClass::Epi && d.epicardium.distance >= 0.0;
        let epi_normal = surface_normal(point, &d.epicardium, flip_epi, self.tolerance)
            .ok_or_else(|| degenerate("epicardial normal"))?;

        let w = tissue.transmural_depth;
        let frame = LocalFrame::new(&endo_normal, &epi_normal, w, &self.long_axis, self.tolerance)
            .map_err(degenerate)?;

        let angles = StreeterAngles::new(self.coefficients, w, apex_base_depth);
        let fiber = frame
            .to_global(&angles.canonical_fiber())
            .try_normalize(self.tolerance)
            .ok_or_else(|| degenerate("fiber"))?;

        Ok(FiberSample {
            fiber,
            endo_normal,
            epi_normal,
            frame,
            angles,
        })
    }

    /// Fibers for every site in parallel.
    ///
    /// # Errors
    ///
    /// Returns the error of the lowest-indexed degenerate site.
    pub fn synthesize_all(
        &self,
        sites: &[Point3<f64>],
        tissue: &[TissueSample],
        apex_base_depths: &[f64],
    ) -> TaggingResult<Vec<FiberSample>> {
        let results: Vec<TaggingResult<FiberSample>> = sites
            .par_iter()
            .zip(tissue.par_iter())
            .zip(apex_base_depths.par_iter())
            .enumerate()
            .map(|(i, ((p, t), &ab))| self.synthesize(i, p, t, ab))
            .collect();

        let fibers = results.into_iter().collect::<TaggingResult<Vec<_>>>()?;
        info!(sites = fibers.len(), long_axis = ?self.long_axis, "synthesized fibers");
        Ok(fibers)
    }
}

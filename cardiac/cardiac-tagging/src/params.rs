//! Parameters for ventricle tagging.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{TaggingError, TaggingResult};
use crate::labels::TransmuralClass;

/// Where labels are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EvaluationSite {
    /// One label per mesh node.
    #[default]
    Node,
    /// One label per element, evaluated at the center of its bounds.
    ElementCentroid,
}

/// Breakpoints splitting the wall into endo, mid and epi layers.
///
/// The defaults split the wall 17% / 41% / 42%.
///
/// # Example
///
/// ```
/// use cardiac_tagging::{TransmuralClass, TransmuralThresholds};
///
/// let t = TransmuralThresholds::default();
/// assert_eq!(t.classify(0.17), TransmuralClass::Endo);
/// assert_eq!(t.classify(0.58), TransmuralClass::Mid);
/// assert_eq!(t.classify(0.9), TransmuralClass::Epi);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransmuralThresholds {
    /// Depths at or below this are endocardial.
    pub endo_max: f64,
    /// Depths at or below this (and above `endo_max`) are mid-wall.
    pub mid_max: f64,
}

impl Default for TransmuralThresholds {
    fn default() -> Self {
        Self {
            endo_max: 0.17,
            mid_max: 0.58,
        }
    }
}

impl TransmuralThresholds {
    /// Layer for a normalized transmural depth.
    #[must_use]
    pub fn classify(&self, depth: f64) -> TransmuralClass {
        if depth <= self.endo_max {
            TransmuralClass::Endo
        } else if depth <= self.mid_max {
            TransmuralClass::Mid
        } else {
            TransmuralClass::Epi
        }
    }
}

/// Coefficients of Streeter's rule.
///
/// `helix = helix_slope * w + helix_intercept` and
/// `transverse = t[0] * phi^2 + t[1] * phi + t[2]`, all angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StreeterCoefficients {
    /// Change of helix angle across the wall.
    pub helix_slope: f64,
    /// Helix angle at the endocardium.
    pub helix_intercept: f64,
    /// Quadratic, linear and constant terms of the transverse angle.
    pub transverse: [f64; 3],
}

impl Default for StreeterCoefficients {
    /// Helix angle from about +49 degrees at the endocardium to about
    /// -60 degrees at the epicardium.
    fn default() -> Self {
        Self {
            helix_slope: -1.9,
            helix_intercept: 0.862,
            transverse: [-0.2149, 0.0089, -0.0093],
        }
    }
}

impl StreeterCoefficients {
    /// The opposite handedness: helix angle increases towards the epicardium.
    #[must_use]
    pub fn mirrored() -> Self {
        Self {
            helix_slope: 1.9,
            ..Self::default()
        }
    }

    /// Helix angle at transmural depth `w`.
    #[must_use]
    pub fn helix(&self, w: f64) -> f64 {
        self.helix_slope.mul_add(w, self.helix_intercept)
    }

    /// Transverse angle at elevation `phi`.
    #[must_use]
    pub fn transverse(&self, phi: f64) -> f64 {
        let [a, b, c] = self.transverse;
        a.mul_add(phi * phi, b.mul_add(phi, c))
    }
}

/// Pacing-site selection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PacingParams {
    /// Number of sites of a segment to skip before a pacing site is taken,
    /// which moves the pick away from the first sites scanned.
    pub traversal_offset: usize,
}

impl Default for PacingParams {
    fn default() -> Self {
        Self {
            traversal_offset: 5000,
        }
    }
}

/// Parameters for ventricle tagging.
///
/// # Example
///
/// ```
/// use cardiac_tagging::{EvaluationSite, TaggingParams};
///
/// let params = TaggingParams::default();
/// assert_eq!(params.site, EvaluationSite::Node);
/// assert!((params.base_tube_radius - 1.5).abs() < 1e-12);
/// assert!(params.validate().is_ok());
///
/// let cells = TaggingParams::for_element_centroids().without_pacing();
/// assert_eq!(cells.site, EvaluationSite::ElementCentroid);
/// assert!(cells.pacing.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaggingParams {
    /// Evaluation site.
    pub site: EvaluationSite,

    /// Transmural layer breakpoints.
    pub transmural: TransmuralThresholds,

    /// Axis the ventricle is aligned with, pointing from apex towards base.
    /// Defines the lower half, the height bands and the segment plane.
    pub long_axis_hint: Vector3<f64>,

    /// In-plane axis whose minimum marks the septal wall.
    pub septal_axis: Vector3<f64>,

    /// Radius of the tube swept around the endocardial boundary.
    pub base_tube_radius: f64,

    /// Segments around the circumference of the base tube.
    pub base_tube_segments: usize,

    /// Half-width of the triangle marking the apex.
    pub apex_marker_half_width: f64,

    /// Endo sites at or below this depth bound the apical cap.
    pub apex_cap_depth: f64,

    /// Fiber angle model.
    pub streeter: StreeterCoefficients,

    /// Pacing-site selection, or `None` to skip it.
    pub pacing: Option<PacingParams>,

    /// Vectors shorter than this are treated as zero.
    pub degeneracy_tolerance: f64,
}

impl Default for TaggingParams {
    fn default() -> Self {
        Self {
            site: EvaluationSite::Node,
            transmural: TransmuralThresholds::default(),
            long_axis_hint: Vector3::z(),
            septal_axis: Vector3::x(),
            base_tube_radius: 1.5,
            base_tube_segments: 8,
            apex_marker_half_width: 0.5,
            apex_cap_depth: 0.01,
            streeter: StreeterCoefficients::default(),
            pacing: Some(PacingParams::default()),
            degeneracy_tolerance: 1e-9,
        }
    }
}

impl TaggingParams {
    /// Create params that label element centroids instead of nodes.
    #[must_use]
    pub fn for_element_centroids() -> Self {
        Self {
            site: EvaluationSite::ElementCentroid,
            ..Self::default()
        }
    }

    /// Set the evaluation site.
    #[must_use]
    pub const fn site(mut self, site: EvaluationSite) -> Self {
        self.site = site;
        self
    }

    /// Set the transmural breakpoints.
    #[must_use]
    pub const fn transmural(mut self, endo_max: f64, mid_max: f64) -> Self {
        self.transmural = TransmuralThresholds { endo_max, mid_max };
        self
    }

    /// Set the long axis and septal axis.
    #[must_use]
    pub const fn orientation(mut self, long_axis: Vector3<f64>, septal_axis: Vector3<f64>) -> Self {
        self.long_axis_hint = long_axis;
        self.septal_axis = septal_axis;
        self
    }

    /// Set the base tube radius.
    #[must_use]
    pub const fn base_tube_radius(mut self, radius: f64) -> Self {
        self.base_tube_radius = radius;
        self
    }

    /// Set the transmural depth that bounds the apical cap.
    #[must_use]
    pub const fn apex_cap_depth(mut self, depth: f64) -> Self {
        self.apex_cap_depth = depth;
        self
    }

    /// Set the fiber angle model.
    #[must_use]
    pub const fn streeter(mut self, coefficients: StreeterCoefficients) -> Self {
        self.streeter = coefficients;
        self
    }

    /// Set the pacing traversal offset.
    #[must_use]
    pub const fn pacing_offset(mut self, traversal_offset: usize) -> Self {
        self.pacing = Some(PacingParams { traversal_offset });
        self
    }

    /// Skip pacing-site selection.
    #[must_use]
    pub const fn without_pacing(mut self) -> Self {
        self.pacing = None;
        self
    }

    /// Check that the parameters describe a usable configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TaggingError::InvalidParams`] when a threshold is out of
    /// order, a length is not positive, or the axes are degenerate.
    pub fn validate(&self) -> TaggingResult<()> {
        let t = &self.transmural;
        if !(0.0..=1.0).contains(&t.endo_max) || !(t.endo_max..=1.0).contains(&t.mid_max) {
            return Err(TaggingError::InvalidParams(format!(
                "transmural thresholds must satisfy 0 <= endo_max <= mid_max <= 1, got {} and {}",
                t.endo_max, t.mid_max
            )));
        }
        if !(self.base_tube_radius > 0.0 && self.base_tube_radius.is_finite()) {
            return Err(TaggingError::InvalidParams(format!(
                "base tube radius must be positive, got {}",
                self.base_tube_radius
            )));
        }
        if self.base_tube_segments < 3 {
            return Err(TaggingError::InvalidParams(format!(
                "base tube needs at least 3 segments, got {}",
                self.base_tube_segments
            )));
        }
        if !(self.apex_marker_half_width > 0.0 && self.apex_marker_half_width.is_finite()) {
            return Err(TaggingError::InvalidParams(format!(
                "apex marker half-width must be positive, got {}",
                self.apex_marker_half_width
            )));
        }
        if self.degeneracy_tolerance.is_nan() || self.degeneracy_tolerance < 0.0 {
            return Err(TaggingError::InvalidParams(format!(
                "degeneracy tolerance must be non-negative, got {}",
                self.degeneracy_tolerance
            )));
        }
        if self.in_plane_axes().is_none() {
            return Err(TaggingError::InvalidParams(
                "long axis and septal axis must be non-zero and not parallel".to_string(),
            ));
        }
        Ok(())
    }

    /// Unit long axis plus two unit axes spanning the plane across it.
    ///
    /// The first in-plane axis is the septal axis with its long-axis
    /// component removed; the second completes a right-handed frame.
    #[must_use]
    pub fn in_plane_axes(&self) -> Option<(Vector3<f64>, Vector3<f64>, Vector3<f64>)> {
        let axis = self.long_axis_hint.try_normalize(f64::EPSILON)?;
        let septal = self.septal_axis - axis * self.septal_axis.dot(&axis);
        let x = septal.try_normalize(1e-9)?;
        let y = axis.cross(&x);
        Some((axis, x, y))
    }
}

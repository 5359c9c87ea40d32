//! Tissue and transmural classification.

use mesh_types::Point3;
use rayon::prelude::*;
use tracing::info;

use crate::labels::{CellType, TransmuralClass};
use crate::params::TransmuralThresholds;
use crate::surfaces::{DistanceFields, SurfaceDistances};

/// Tissue state from signed distances to the core and border zone.
///
/// A point on or inside the core is core even when it is also inside the
/// border zone.
///
/// # Example
///
/// ```
/// use cardiac_tagging::{classify_tissue, CellType};
///
/// assert_eq!(classify_tissue(-1.0, -2.0), CellType::Core);
/// assert_eq!(classify_tissue(0.5, 0.0), CellType::BorderZone);
/// assert_eq!(classify_tissue(0.5, 0.1), CellType::Healthy);
/// ```
#[must_use]
pub fn classify_tissue(core_distance: f64, border_zone_distance: f64) -> CellType {
    if core_distance <= 0.0 {
        CellType::Core
    } else if border_zone_distance <= 0.0 {
        CellType::BorderZone
    } else {
        CellType::Healthy
    }
}

/// Ratio `|a| / (|a| + |b|)`, or 0.5 when both are zero.
///
/// Used for both the endo-to-epi and the apex-to-base depth. The result is
/// clamped to `[0, 1]`.
///
/// # Example
///
/// ```
/// use cardiac_tagging::normalized_depth;
///
/// assert!((normalized_depth(-0.5, 0.5) - 0.5).abs() < 1e-12);
/// assert!((normalized_depth(0.0, 2.0)).abs() < 1e-12);
/// assert!((normalized_depth(0.0, 0.0) - 0.5).abs() < 1e-12);
/// ```
#[must_use]
pub fn normalized_depth(from: f64, to: f64) -> f64 {
    let (from, to) = (from.abs(), to.abs());
    let total = from + to;
    if total > 0.0 {
        (from / total).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// Classification of one site against the four segmented surfaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TissueSample {
    /// Tissue state.
    pub cell_type: CellType,
    /// Normalized depth, 0 at the endocardium and 1 at the epicardium.
    pub transmural_depth: f64,
    /// Transmural layer.
    pub transmural_class: TransmuralClass,
    /// Raw surface queries, kept for normal estimation.
    pub distances: SurfaceDistances,
}

impl TissueSample {
    /// Classify a site from its surface distances.
    #[must_use]
    pub fn from_distances(distances: SurfaceDistances, thresholds: &TransmuralThresholds) -> Self {
        let transmural_depth =
            normalized_depth(distances.endocardium.distance, distances.epicardium.distance);
        Self {
            cell_type: classify_tissue(distances.core, distances.border_zone),
            transmural_depth,
            transmural_class: thresholds.classify(transmural_depth),
            distances,
        }
    }
}

/// Classify a single point.
#[must_use]
pub fn classify_site(
    fields: &DistanceFields,
    point: Point3<f64>,
    thresholds: &TransmuralThresholds,
) -> TissueSample {
    TissueSample::from_distances(fields.sample(point), thresholds)
}

/// Classify every site in parallel.
///
/// Output order matches `sites`.
#[must_use]
pub fn classify_sites(
    fields: &DistanceFields,
    sites: &[Point3<f64>],
    thresholds: &TransmuralThresholds,
) -> Vec<TissueSample> {
    let samples: Vec<TissueSample> = sites
        .par_iter()
        .map(|&p| classify_site(fields, p, thresholds))
        .collect();

    let mut counts = [0usize; 3];
    for s in &samples {
        counts[usize::from(s.cell_type.code())] += 1;
    }
    info!(
        sites = samples.len(),
        healthy = counts[0],
        border_zone = counts[1],
        core = counts[2],
        "classified tissue"
    );

    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn core_wins_over_border_zone() {
        assert_eq!(classify_tissue(0.0, -1.0), CellType::Core);
        assert_eq!(classify_tissue(-0.1, 0.3), CellType::Core);
    }

    #[test]
    fn border_zone_on_surface() {
        assert_eq!(classify_tissue(1e-9, 0.0), CellType::BorderZone);
    }

    #[test]
    fn healthy_outside_both() {
        assert_eq!(classify_tissue(3.0, 1.0), CellType::Healthy);
    }

    #[test]
    fn depth_uses_absolute_distances() {
        assert_relative_eq!(normalized_depth(-1.0, -3.0), 0.25, epsilon = 1e-12);
        assert_relative_eq!(normalized_depth(1.0, 3.0), 0.25, epsilon = 1e-12);
        assert_relative_eq!(normalized_depth(3.0, 0.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn depth_guards_zero_total() {
        assert_relative_eq!(normalized_depth(0.0, -0.0), 0.5);
    }
}

//! AHA 17-segment partition and pacing-site selection.
//!
//! The wall is cut into four height bands along the long axis. The apical
//! cap is a single segment; the apical band is split into four 90 degree
//! sectors and the mid-cavity and basal bands into six 60 degree sectors,
//! all measured counter-clockwise from a rotated septal reference.

use std::f64::consts::TAU;

use mesh_types::{Point3, Vector3};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::classify::TissueSample;
use crate::error::{TaggingError, TaggingResult};
use crate::labels::{AhaSegment, CellType, TransmuralClass};
use crate::params::TaggingParams;

/// Rotation from the septal reference to the start of segment 13.
pub const APICAL_START: f64 = 5.0 * std::f64::consts::FRAC_PI_4;

/// Rotation from the septal reference to the start of segments 1 and 7.
pub const MID_BASAL_START: f64 = 4.0 * std::f64::consts::FRAC_PI_3;

/// Height bands along the long axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeightBand {
    /// At or below the apical cap height (segment 17).
    Apex,
    /// Segments 13 to 16.
    Apical,
    /// Segments 7 to 12.
    MidCavity,
    /// Segments 1 to 6.
    Basal,
}

/// Band boundaries, as coordinates along the long axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallHeights {
    /// Lowest site.
    pub min: f64,
    /// Highest site.
    pub max: f64,
    /// Top of the apical cap.
    pub apex: f64,
    /// Top of the apical band.
    pub apical: f64,
    /// Top of the mid-cavity band.
    pub mid_cavity: f64,
}

impl WallHeights {
    /// Compute band boundaries from per-site heights.
    ///
    /// The apical cap ends at the lowest endocardial site whose depth is at
    /// most `cap_depth`. Without such a site the cap collapses to the lowest
    /// site rather than the highest, and only sites at that height fall in
    /// segment 17. Returns `None` for an empty site list.
    #[must_use]
    pub fn compute(heights: &[f64], tissue: &[TissueSample], cap_depth: f64) -> Option<Self> {
        if heights.is_empty() {
            return None;
        }
        let min = heights.iter().copied().fold(f64::INFINITY, f64::min);
        let max = heights.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let apex = heights
            .iter()
            .zip(tissue)
            .filter(|(_, t)| t.transmural_class == TransmuralClass::Endo && t.transmural_depth <= cap_depth)
            .map(|(&h, _)| h)
            .fold(None, |acc: Option<f64>, h| Some(acc.map_or(h, |a| a.min(h))));

        let apex = apex.unwrap_or_else(|| {
            warn!(
                cap_depth,
                lowest = min,
                "no endocardial site at the apical cap depth; apical cap collapses to the lowest site instead of the highest"
            );
            min
        });

        let third = (max - min) / 3.0;
        let apical = min + third;
        Some(Self {
            min,
            max,
            apex,
            apical,
            mid_cavity: apical + third,
        })
    }

    /// Band holding a height. Upper boundaries are inclusive.
    #[must_use]
    pub fn band(&self, height: f64) -> HeightBand {
        if height <= self.apex {
            HeightBand::Apex
        } else if height <= self.apical {
            HeightBand::Apical
        } else if height <= self.mid_cavity {
            HeightBand::MidCavity
        } else {
            HeightBand::Basal
        }
    }
}

/// Counter-clockwise angle from `from` to `to` about `axis`, in `[0, 2pi)`.
///
/// # Example
///
/// ```
/// use cardiac_tagging::signed_angle;
/// use nalgebra::Vector3;
///
/// let a = signed_angle(&Vector3::x(), &Vector3::y(), &Vector3::z());
/// assert!((a - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
///
/// let b = signed_angle(&Vector3::x(), &-Vector3::y(), &Vector3::z());
/// assert!((b - 3.0 * std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// ```
#[must_use]
pub fn signed_angle(from: &Vector3<f64>, to: &Vector3<f64>, axis: &Vector3<f64>) -> f64 {
    let angle = from.cross(to).dot(axis).atan2(from.dot(to));
    if angle < 0.0 {
        angle + TAU
    } else {
        angle
    }
}

/// Sector of `count` equal sectors holding `angle`.
///
/// Upper sector boundaries are inclusive; angles past the last boundary
/// fall into the last sector.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sector(angle: f64, count: usize) -> usize {
    let width = TAU / count as f64;
    let k = (angle / width).ceil().max(1.0) as usize - 1;
    k.min(count - 1)
}

/// Plane across the long axis with the septal reference direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPlane {
    /// Ventricle centroid.
    pub origin: Point3<f64>,
    /// Unit long axis.
    pub axis: Vector3<f64>,
    /// Unit in-plane direction from the centroid to the septal wall.
    pub reference: Vector3<f64>,
}

impl SegmentPlane {
    /// Build the plane from the centroid and a point on the septal wall.
    ///
    /// Returns `None` when the septal point projects onto the centroid.
    #[must_use]
    pub fn new(origin: Point3<f64>, septal_point: &Point3<f64>, axis: Vector3<f64>, tolerance: f64) -> Option<Self> {
        let reference = project(&(septal_point - origin), &axis).try_normalize(tolerance)?;
        Some(Self {
            origin,
            axis,
            reference,
        })
    }

    /// Angle of a point from the reference rotated by `start`.
    #[must_use]
    pub fn angle(&self, point: &Point3<f64>, start: f64) -> f64 {
        let (sin, cos) = start.sin_cos();
        let rotated = self.reference * cos + self.axis.cross(&self.reference) * sin;
        let v = project(&(point - self.origin), &self.axis);
        signed_angle(&rotated, &v, &self.axis)
    }
}

fn project(v: &Vector3<f64>, axis: &Vector3<f64>) -> Vector3<f64> {
    v - axis * v.dot(axis)
}

/// AHA segment of a point.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn aha_segment(point: &Point3<f64>, heights: &WallHeights, plane: &SegmentPlane) -> AhaSegment {
    let h = point.coords.dot(&plane.axis);
    let number = match heights.band(h) {
        HeightBand::Apex => 17,
        HeightBand::Apical => 13 + sector(plane.angle(point, APICAL_START), 4),
        HeightBand::MidCavity => 7 + sector(plane.angle(point, MID_BASAL_START), 6),
        HeightBand::Basal => 1 + sector(plane.angle(point, MID_BASAL_START), 6),
    };
    AhaSegment::new(number as u8).unwrap_or(AhaSegment::APEX)
}

/// Segment partition of all sites.
#[derive(Debug, Clone)]
pub struct SegmentPartition {
    /// Segment of every site, in site order.
    pub segments: Vec<AhaSegment>,
    /// Band boundaries.
    pub heights: WallHeights,
    /// Site used as the septal reference.
    pub septal_site: usize,
    /// Plane the sector angles were measured in.
    pub plane: SegmentPlane,
}

impl SegmentPartition {
    /// Number of sites in each segment, indexed by segment number minus one.
    #[must_use]
    pub fn counts(&self) -> [usize; AhaSegment::COUNT] {
        let mut counts = [0; AhaSegment::COUNT];
        for s in &self.segments {
            counts[s.index()] += 1;
        }
        counts
    }
}

/// Assign an AHA segment to every site.
///
/// `centroid` is the ventricle centroid; the septal reference is the site
/// with the smallest coordinate along the septal axis (first on ties).
///
/// # Errors
///
/// Returns an error when there are no sites, the axes are degenerate, or
/// the septal site lies on the long axis through the centroid.
pub fn partition_segments(
    sites: &[Point3<f64>],
    tissue: &[TissueSample],
    centroid: &Point3<f64>,
    params: &TaggingParams,
) -> TaggingResult<SegmentPartition> {
    let (axis, septal_axis, _) = params.in_plane_axes().ok_or_else(|| {
        TaggingError::InvalidParams("long axis and septal axis must not be parallel".to_string())
    })?;

    let mut septal_site = None;
    let mut septal_min = f64::INFINITY;
    for (i, p) in sites.iter().enumerate() {
        let c = p.coords.dot(&septal_axis);
        if c < septal_min {
            septal_min = c;
            septal_site = Some(i);
        }
    }
    let septal_site = septal_site.ok_or(TaggingError::EmptyMesh)?;

    let plane = SegmentPlane::new(*centroid, &sites[septal_site], axis, params.degeneracy_tolerance).ok_or(
        TaggingError::DegenerateFrame {
            site: septal_site,
            vector: "septal reference",
        },
    )?;

    let heights_along: Vec<f64> = sites.iter().map(|p| p.coords.dot(&axis)).collect();
    let heights = WallHeights::compute(&heights_along, tissue, params.apex_cap_depth).ok_or(TaggingError::EmptyMesh)?;

    debug!(
        min = heights.min,
        max = heights.max,
        apex = heights.apex,
        apical = heights.apical,
        mid_cavity = heights.mid_cavity,
        septal_site,
        "wall heights"
    );

    let segments: Vec<AhaSegment> = sites
        .par_iter()
        .map(|p| aha_segment(p, &heights, &plane))
        .collect();

    let partition = SegmentPartition {
        segments,
        heights,
        septal_site,
        plane,
    };
    info!(counts = ?partition.counts(), "partitioned AHA segments");
    Ok(partition)
}

/// Number of pacing slots: one endocardial and one epicardial per segment.
pub const PACING_SLOTS: usize = 2 * AhaSegment::COUNT;

/// Representative stimulation sites per segment.
///
/// Slot `seg - 1` holds the endocardial site of segment `seg` and slot
/// `16 + seg` its epicardial site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingSites {
    /// Site index per slot, `None` when no site qualified.
    pub slots: [Option<usize>; PACING_SLOTS],
    /// Whether each site fills a slot.
    pub flags: Vec<bool>,
}

impl PacingSites {
    /// No pacing sites for `site_count` sites.
    #[must_use]
    pub fn none(site_count: usize) -> Self {
        Self {
            slots: [None; PACING_SLOTS],
            flags: vec![false; site_count],
        }
    }

    /// Pick pacing sites in site order.
    ///
    /// A running count of sites is kept per segment. A site qualifies once
    /// its segment count exceeds `offset`; apical cap sites always qualify.
    /// The first qualifying non-core endocardial site fills the endocardial
    /// slot, the first qualifying non-core epicardial site the epicardial
    /// slot. A site fills at most one slot.
    #[must_use]
    pub fn select(segments: &[AhaSegment], tissue: &[TissueSample], offset: usize) -> Self {
        let mut sites = Self::none(segments.len());
        let mut counts = [0usize; AhaSegment::COUNT];

        for (i, (seg, t)) in segments.iter().zip(tissue).enumerate() {
            let past_offset = if seg.is_apex() {
                true
            } else {
                counts[seg.index()] += 1;
                counts[seg.index()] > offset
            };
            if !past_offset || t.cell_type == CellType::Core {
                continue;
            }

            let slot = match t.transmural_class {
                TransmuralClass::Endo => seg.index(),
                TransmuralClass::Epi => AhaSegment::COUNT + seg.index(),
                TransmuralClass::Mid => continue,
            };
            if sites.slots[slot].is_none() {
                sites.slots[slot] = Some(i);
                sites.flags[i] = true;
            }
        }

        debug!(
            filled = sites.slots.iter().filter(|s| s.is_some()).count(),
            "selected pacing sites"
        );
        sites
    }

    /// Endocardial pacing site of a segment.
    #[must_use]
    pub fn endo(&self, segment: AhaSegment) -> Option<usize> {
        self.slots[segment.index()]
    }

    /// Epicardial pacing site of a segment.
    #[must_use]
    pub fn epi(&self, segment: AhaSegment) -> Option<usize> {
        self.slots[AhaSegment::COUNT + segment.index()]
    }
}

//! Per-site labels.
//!
//! Every label type carries the integer code used by the downstream solver
//! (`code()`), so output arrays never depend on enum discriminant layout.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tissue state of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CellType {
    /// Outside both scar surfaces.
    Healthy,
    /// Inside the border zone but not the core.
    BorderZone,
    /// Inside the scar core.
    Core,
}

impl CellType {
    /// Solver code: 0 healthy, 1 border zone, 2 core.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Healthy => 0,
            Self::BorderZone => 1,
            Self::Core => 2,
        }
    }
}

/// Transmural layer of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TransmuralClass {
    /// Endocardial layer.
    Endo,
    /// Mid-wall layer.
    Mid,
    /// Epicardial layer.
    Epi,
}

impl TransmuralClass {
    /// Solver code: 0 endo, 1 mid, 2 epi.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Endo => 0,
            Self::Mid => 1,
            Self::Epi => 2,
        }
    }
}

/// Position of a site between apex and base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ApexBaseTag {
    /// The apex site itself.
    Apex,
    /// Any site that is neither apex nor base.
    Mid,
    /// A site next to the valve ring.
    Base,
}

impl ApexBaseTag {
    /// Solver code: 0 apex, 1 mid, 2 base.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Apex => 0,
            Self::Mid => 1,
            Self::Base => 2,
        }
    }
}

/// One of the 17 AHA segments, numbered 1 through 17.
///
/// # Example
///
/// ```
/// use cardiac_tagging::AhaSegment;
///
/// assert_eq!(AhaSegment::new(3).map(AhaSegment::get), Some(3));
/// assert!(AhaSegment::new(0).is_none());
/// assert!(AhaSegment::new(18).is_none());
/// assert!(AhaSegment::APEX.is_apex());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AhaSegment(u8);

impl AhaSegment {
    /// Number of segments in the scheme.
    pub const COUNT: usize = 17;

    /// The apical cap, segment 17.
    pub const APEX: Self = Self(17);

    /// Create a segment from its number, if it lies in `1..=17`.
    #[must_use]
    pub const fn new(number: u8) -> Option<Self> {
        if matches!(number, 1..=17) {
            Some(Self(number))
        } else {
            None
        }
    }

    /// Segment number in `1..=17`.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index in `0..17`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// Whether this is the apical cap.
    #[must_use]
    pub const fn is_apex(self) -> bool {
        self.0 == 17
    }
}

/// Complete record for one evaluation site.
///
/// Assembled once all stages have run; stages never revisit a written field.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SiteLabel {
    /// Tissue state.
    pub cell_type: CellType,
    /// Transmural layer.
    pub transmural_class: TransmuralClass,
    /// Normalized wall depth, 0 at the endocardium and 1 at the epicardium.
    pub transmural_depth: f64,
    /// Apex/base tag.
    pub apex_base_tag: ApexBaseTag,
    /// Normalized position, 0 at the apex and 1 at the base.
    pub apex_base_depth: f64,
    /// AHA segment.
    pub aha_segment: AhaSegment,
    /// Whether the site was picked as a pacing site.
    pub pacing: bool,
    /// Unit fiber direction in global coordinates.
    pub fiber_orientation: Vector3<f64>,
    /// Unit endocardial normal.
    pub endo_normal: Vector3<f64>,
    /// Unit epicardial normal.
    pub epi_normal: Vector3<f64>,
}

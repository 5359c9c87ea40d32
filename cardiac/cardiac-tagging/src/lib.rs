//! Tissue, transmural, segment and fiber tagging of ventricle meshes.
//!
//! Takes a volumetric hexahedral mesh of the left ventricle and four closed
//! or open triangle surfaces (scar core, border zone, epicardium,
//! endocardium) and labels every evaluation site with what an
//! electrophysiology solver needs:
//!
//! - cell type (healthy, border zone, core)
//! - transmural class and normalized endocardium-to-epicardium depth
//! - apex/base tag and normalized apex-to-base depth
//! - AHA 17-segment number and pacing-site flag
//! - fiber direction from the Streeter helix/transverse rule
//!
//! plus the site adjacency used for propagation.
//!
//! # Pipeline
//!
//! 1. Signed distance fields for the four surfaces
//! 2. Tissue and transmural classification per site
//! 3. Apex, base boundary and long axis
//! 4. Apex-to-base depth from the apex marker and base tube fields
//! 5. AHA segments and the 34 pacing slots
//! 6. Fibers in the local wall frame
//! 7. Node or element adjacency
//!
//! Each stage is also usable on its own.
//!
//! # Example
//!
//! ```
//! use cardiac_tagging::{classify_tissue, normalized_depth, CellType, TaggingParams, TransmuralClass};
//!
//! let params = TaggingParams::default();
//! assert!(params.validate().is_ok());
//!
//! // Inside the border zone but outside the core
//! assert_eq!(classify_tissue(0.4, -0.2), CellType::BorderZone);
//!
//! let depth = normalized_depth(-0.3, 0.7);
//! assert_eq!(params.transmural.classify(depth), TransmuralClass::Mid);
//! ```
//!
//! # Running the whole pipeline
//!
//! ```no_run
//! use cardiac_tagging::{save_case, tag_ventricle, TaggingParams, VentricleSurfaces};
//! use mesh_types::HexMesh;
//!
//! # fn load() -> (HexMesh, VentricleSurfaces) { unimplemented!() }
//! let (mesh, surfaces) = load();
//! let tagged = tag_ventricle(&mesh, surfaces, &TaggingParams::default())?;
//!
//! for field in tagged.fields() {
//!     println!("{}: {} values", field.name, field.values.len());
//! }
//! save_case("case/Reader_VTK", &tagged, &mesh)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod classify;
mod error;
mod export;
mod fibers;
mod labels;
mod landmarks;
mod params;
mod pipeline;
mod segments;
mod surfaces;
mod topology;

pub use classify::{classify_site, classify_sites, classify_tissue, normalized_depth, TissueSample};
pub use error::{ExportError, ExportResult, TaggingError, TaggingResult};
pub use export::{
    save_adjacency, save_case, save_connectivity, save_scalar_column, write_adjacency,
    write_connectivity, write_pacing_sites, write_scalar_column,
};
pub use fibers::{surface_normal, FiberModel, FiberSample, LocalFrame, StreeterAngles};
pub use labels::{AhaSegment, ApexBaseTag, CellType, SiteLabel, TransmuralClass};
pub use landmarks::{
    apex_marker, base_sites, locate_apex, nearest_element, ApexBaseField, BaseBoundary, Landmarks,
};
pub use params::{
    EvaluationSite, PacingParams, StreeterCoefficients, TaggingParams, TransmuralThresholds,
};
pub use pipeline::{
    evaluation_sites, tag_ventricle, FieldValues, OutputField, TaggedVentricle,
};
pub use segments::{
    aha_segment, partition_segments, sector, signed_angle, HeightBand, PacingSites,
    SegmentPartition, SegmentPlane, WallHeights, APICAL_START, MID_BASAL_START, PACING_SLOTS,
};
pub use surfaces::{distance_field, DistanceFields, Surface, SurfaceDistances, VentricleSurfaces};
pub use topology::AdjacencyList;

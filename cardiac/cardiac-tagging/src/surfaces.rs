//! Anatomical surfaces and their distance fields.

use std::fmt;

use mesh_sdf::{SdfError, SignedDistanceField, SurfaceHit};
use mesh_types::{IndexedMesh, Point3};
use tracing::debug;

use crate::error::{TaggingError, TaggingResult};

/// Names of the surfaces queried during tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Dense scar.
    Core,
    /// Border zone around the scar.
    BorderZone,
    /// Outer wall.
    Epicardium,
    /// Inner wall.
    Endocardium,
    /// Tube around the valve ring.
    Base,
    /// Marker triangle at the apex.
    Apex,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Core => "core",
            Self::BorderZone => "border zone",
            Self::Epicardium => "epicardium",
            Self::Endocardium => "endocardium",
            Self::Base => "base",
            Self::Apex => "apex",
        };
        f.write_str(name)
    }
}

/// The four segmented surfaces of a ventricle.
///
/// The endocardium is expected to be open at the valve ring; that opening
/// defines the base.
#[derive(Debug, Clone, Default)]
pub struct VentricleSurfaces {
    /// Scar core.
    pub core: IndexedMesh,
    /// Border zone.
    pub border_zone: IndexedMesh,
    /// Epicardium.
    pub epicardium: IndexedMesh,
    /// Endocardium.
    pub endocardium: IndexedMesh,
}

/// Build a distance field for a named surface.
///
/// # Errors
///
/// Returns [`TaggingError::EmptySurface`] when the surface has no faces and
/// [`TaggingError::Sdf`] when a face references a missing vertex.
pub fn distance_field(surface: Surface, mesh: IndexedMesh) -> TaggingResult<SignedDistanceField> {
    match SignedDistanceField::new(mesh) {
        Ok(field) => {
            debug!(%surface, faces = field.mesh().face_count(), "distance field ready");
            Ok(field)
        }
        Err(SdfError::EmptyMesh) => Err(TaggingError::EmptySurface { surface }),
        Err(err) => Err(err.into()),
    }
}

/// Distance fields for the four segmented surfaces.
///
/// Built once before any site is processed and shared read-only by all
/// stages and worker threads.
#[derive(Debug, Clone)]
pub struct DistanceFields {
    /// Scar core.
    pub core: SignedDistanceField,
    /// Border zone.
    pub border_zone: SignedDistanceField,
    /// Epicardium.
    pub epicardium: SignedDistanceField,
    /// Endocardium.
    pub endocardium: SignedDistanceField,
}

impl DistanceFields {
    /// Build all four fields.
    ///
    /// Every surface is checked for faces before any field is built.
    ///
    /// # Errors
    ///
    /// Returns an error if any surface is empty or malformed.
    pub fn build(surfaces: VentricleSurfaces) -> TaggingResult<Self> {
        let VentricleSurfaces {
            core,
            border_zone,
            epicardium,
            endocardium,
        } = surfaces;

        for (surface, mesh) in [
            (Surface::Core, &core),
            (Surface::BorderZone, &border_zone),
            (Surface::Epicardium, &epicardium),
            (Surface::Endocardium, &endocardium),
        ] {
            if mesh.is_empty() {
                return Err(TaggingError::EmptySurface { surface });
            }
        }

        let ((core, border_zone), (epicardium, endocardium)) = rayon::join(
            || {
                rayon::join(
                    || distance_field(Surface::Core, core),
                    || distance_field(Surface::BorderZone, border_zone),
                )
            },
            || {
                rayon::join(
                    || distance_field(Surface::Epicardium, epicardium),
                    || distance_field(Surface::Endocardium, endocardium),
                )
            },
        );

        Ok(Self {
            core: core?,
            border_zone: border_zone?,
            epicardium: epicardium?,
            endocardium: endocardium?,
        })
    }

    /// Query all four fields at a point.
    #[must_use]
    pub fn sample(&self, point: Point3<f64>) -> SurfaceDistances {
        SurfaceDistances {
            core: self.core.distance(point),
            border_zone: self.border_zone.distance(point),
            epicardium: self.epicardium.query(point),
            endocardium: self.endocardium.query(point),
        }
    }
}

/// Distances from one point to the four surfaces.
///
/// The wall surfaces keep the closest point as well, which the fiber stage
/// turns into surface normals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDistances {
    /// Signed distance to the core.
    pub core: f64,
    /// Signed distance to the border zone.
    pub border_zone: f64,
    /// Epicardium hit.
    pub epicardium: SurfaceHit,
    /// Endocardium hit.
    pub endocardium: SurfaceHit,
}

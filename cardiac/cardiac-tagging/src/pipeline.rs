//! The full tagging pipeline.
//!
//! Stages run in order over one fixed list of evaluation sites:
//! classification, landmarks, apex-to-base depth, segments, pacing, fibers
//! and topology. Each stage writes its own output once; the labels are
//! assembled at the end.

use mesh_types::{HexMesh, Point3, Vector3};
use tracing::info;

use crate::classify::{classify_sites, TissueSample};
use crate::error::{TaggingError, TaggingResult};
use crate::fibers::{FiberModel, FiberSample, LocalFrame};
use crate::labels::{AhaSegment, SiteLabel};
use crate::landmarks::{ApexBaseField, Landmarks};
use crate::params::{EvaluationSite, TaggingParams};
use crate::segments::{partition_segments, PacingSites, WallHeights};
use crate::surfaces::{DistanceFields, VentricleSurfaces};
use crate::topology::AdjacencyList;

/// Coordinates of the evaluation sites of a mesh.
#[must_use]
pub fn evaluation_sites(mesh: &HexMesh, site: EvaluationSite) -> Vec<Point3<f64>> {
    match site {
        EvaluationSite::Node => mesh.nodes.clone(),
        EvaluationSite::ElementCentroid => mesh.element_centroids(),
    }
}

/// Values of one output field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValues {
    /// Integer codes.
    Integer(Vec<i32>),
    /// Scalars.
    Scalar(Vec<f64>),
    /// 3-component vectors.
    Vector(Vec<[f64; 3]>),
}

impl FieldValues {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Integer(v) => v.len(),
            Self::Scalar(v) => v.len(),
            Self::Vector(v) => v.len(),
        }
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named per-site array for an external mesh writer.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputField {
    /// Array name in the output mesh.
    pub name: &'static str,
    /// Per-site values.
    pub values: FieldValues,
}

/// Everything the pipeline computed for a ventricle.
#[derive(Debug, Clone)]
pub struct TaggedVentricle {
    /// Evaluation site the labels refer to.
    pub site: EvaluationSite,
    /// One label per site.
    pub labels: Vec<SiteLabel>,
    /// Local fiber frame per site.
    pub frames: Vec<LocalFrame>,
    /// Apex, base and long axis.
    pub landmarks: Landmarks,
    /// Segment band boundaries.
    pub heights: WallHeights,
    /// Site used as the septal reference.
    pub septal_site: usize,
    /// Pacing sites.
    pub pacing: PacingSites,
    /// Site adjacency.
    pub adjacency: AdjacencyList,
}

impl TaggedVentricle {
    /// Number of labeled sites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no site was labeled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Mean of the mesh node coordinates.
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        self.landmarks.centroid
    }

    /// Per-site arrays under the names the solver expects.
    #[must_use]
    pub fn fields(&self) -> Vec<OutputField> {
        let ints =
            |f: fn(&SiteLabel) -> i32| FieldValues::Integer(self.labels.iter().map(f).collect());
        let scalars =
            |f: fn(&SiteLabel) -> f64| FieldValues::Scalar(self.labels.iter().map(f).collect());
        let vectors = |f: fn(&SiteLabel) -> Vector3<f64>| {
            FieldValues::Vector(self.labels.iter().map(|l| <[f64; 3]>::from(f(l))).collect())
        };
        let axis: [f64; 3] = self.landmarks.long_axis.into();

        vec![
            OutputField {
                name: "Cell_type",
                values: ints(|l| i32::from(l.cell_type.code())),
            },
            OutputField {
                name: "EndoToEpi",
                values: ints(|l| i32::from(l.transmural_class.code())),
            },
            OutputField {
                name: "DistEndoToEpi",
                values: scalars(|l| l.transmural_depth),
            },
            OutputField {
                name: "fibers_OR",
                values: vectors(|l| l.fiber_orientation),
            },
            OutputField {
                name: "endo_Norm",
                values: vectors(|l| l.endo_normal),
            },
            OutputField {
                name: "epi_Norm",
                values: vectors(|l| l.epi_normal),
            },
            OutputField {
                name: "vector_LAxis",
                values: FieldValues::Vector(vec![axis; self.labels.len()]),
            },
            OutputField {
                name: "tagApexBase",
                values: ints(|l| i32::from(l.apex_base_tag.code())),
            },
            OutputField {
                name: "DistApexToBase",
                values: scalars(|l| l.apex_base_depth),
            },
            OutputField {
                name: "17_AHA",
                values: ints(|l| i32::from(l.aha_segment.get())),
            },
            OutputField {
                name: "34_pacing",
                values: ints(|l| i32::from(l.pacing)),
            },
        ]
    }
}

/// Tag a ventricle mesh.
///
/// All input is validated before any site is processed: parameters, mesh
/// connectivity and the four surfaces.
///
/// # Errors
///
/// Returns an error for malformed input, an unresolvable landmark, or a
/// degenerate fiber frame at any site.
pub fn tag_ventricle(
    mesh: &HexMesh,
    surfaces: VentricleSurfaces,
    params: &TaggingParams,
) -> TaggingResult<TaggedVentricle> {
    params.validate()?;
    if mesh.is_empty() {
        return Err(TaggingError::EmptyMesh);
    }
    mesh.validate()?;

    info!(
        nodes = mesh.node_count(),
        elements = mesh.element_count(),
        site = ?params.site,
        "starting ventricle tagging"
    );

    let fields = DistanceFields::build(surfaces)?;
    let sites = evaluation_sites(mesh, params.site);

    let tissue = classify_sites(&fields, &sites, &params.transmural);

    let landmarks = Landmarks::locate(mesh, &sites, fields.endocardium.mesh(), params)?;
    let apex_base = ApexBaseField::build(&landmarks, params)?;
    let apex_base_depths = apex_base.depths(&sites);

    let partition = partition_segments(&sites, &tissue, &landmarks.centroid, params)?;
    let pacing = params.pacing.map_or_else(
        || PacingSites::none(sites.len()),
        |p| PacingSites::select(&partition.segments, &tissue, p.traversal_offset),
    );

    let model = FiberModel {
        long_axis: landmarks.long_axis,
        coefficients: &params.streeter,
        tolerance: params.degeneracy_tolerance,
    };
    let fibers = model.synthesize_all(&sites, &tissue, &apex_base_depths)?;

    let adjacency = match params.site {
        EvaluationSite::Node => AdjacencyList::from_elements(mesh.node_count(), &mesh.elements),
        EvaluationSite::ElementCentroid => {
            AdjacencyList::element_neighbors(mesh.node_count(), &mesh.elements)
        }
    };

    let labels: Vec<SiteLabel> = tissue
        .iter()
        .zip(&fibers)
        .enumerate()
        .map(|(i, (t, f))| {
            assemble(i, t, f, &landmarks, apex_base_depths[i], &partition.segments, &pacing)
        })
        .collect();

    info!(
        sites = labels.len(),
        apex = landmarks.apex_site,
        base_sites = landmarks.base_sites.len(),
        adjacency_edges = adjacency.edge_count(),
        "tagged ventricle"
    );

    Ok(TaggedVentricle {
        site: params.site,
        labels,
        frames: fibers.iter().map(|f| f.frame).collect(),
        landmarks,
        heights: partition.heights,
        septal_site: partition.septal_site,
        pacing,
        adjacency,
    })
}

fn assemble(
    site: usize,
    tissue: &TissueSample,
    fiber: &FiberSample,
    landmarks: &Landmarks,
    apex_base_depth: f64,
    segments: &[AhaSegment],
    pacing: &PacingSites,
) -> SiteLabel {
    SiteLabel {
        cell_type: tissue.cell_type,
        transmural_class: tissue.transmural_class,
        transmural_depth: tissue.transmural_depth,
        apex_base_tag: landmarks.apex_base_tag(site),
        apex_base_depth,
        aha_segment: segments[site],
        pacing: pacing.flags[site],
        fiber_orientation: fiber.fiber,
        endo_normal: fiber.endo_normal,
        epi_normal: fiber.epi_normal,
    }
}

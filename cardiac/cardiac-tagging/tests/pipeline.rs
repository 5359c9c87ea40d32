//! End-to-end tagging of a synthetic ventricle.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use approx::assert_relative_eq;
use cardiac_tagging::{
    classify_sites, evaluation_sites, tag_ventricle, ApexBaseTag, CellType, DistanceFields,
    EvaluationSite, FieldValues, TaggedVentricle, TaggingError, TaggingParams, TransmuralClass,
    VentricleSurfaces, PACING_SLOTS,
};
use common::{
    healthy_surfaces, params, radial, scar_center, scarred_surfaces, ventricle_mesh, RIM_HEIGHT,
};
use mesh_types::{closed_box, HexMesh, Point3, Vector3};

fn tag(surfaces: VentricleSurfaces, params: &TaggingParams) -> (HexMesh, TaggedVentricle) {
    let mesh = ventricle_mesh();
    let tagged = tag_ventricle(&mesh, surfaces, params).expect("tagging succeeds");
    (mesh, tagged)
}

// ============================================================================
// Tissue classification
// ============================================================================

#[test]
fn cube_inside_core_is_all_core() {
    let mesh = HexMesh::structured_block([1, 1, 1], 1.0, Point3::new(-0.5, -0.5, -0.5));
    let big = |h: f64| closed_box(Point3::new(-h, -h, -h), Point3::new(h, h, h));
    let fields = DistanceFields::build(VentricleSurfaces {
        core: big(2.0),
        border_zone: big(3.0),
        epicardium: big(5.0),
        endocardium: big(4.0),
    })
    .expect("fields");

    let tissue = classify_sites(&fields, &mesh.nodes, &params().transmural);
    assert_eq!(tissue.len(), 8);
    assert!(tissue.iter().all(|t| t.cell_type == CellType::Core));
}

#[test]
fn spherical_shell_midpoint_is_mid_wall() {
    let far = Point3::new(50.0, 50.0, 50.0);
    let open_top = (-RIM_HEIGHT).acos();
    let fields = DistanceFields::build(VentricleSurfaces {
        core: common::cube(far, 0.5),
        border_zone: common::cube(far, 1.0),
        epicardium: common::ellipsoid(Vector3::repeat(2.0), 48, 64, std::f64::consts::PI),
        endocardium: common::ellipsoid(Vector3::repeat(1.0), 48, 64, open_top),
    })
    .expect("fields");

    let sites: Vec<Point3<f64>> = [
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, -1.0, -1.0),
        Vector3::new(1.0, 1.0, -1.0),
        Vector3::new(0.0, 0.0, -1.0),
    ]
    .iter()
    .map(|d| Point3::from(d.normalize() * 1.5))
    .collect();

    for (p, t) in sites.iter().zip(classify_sites(&fields, &sites, &params().transmural)) {
        assert_relative_eq!(t.transmural_depth, 0.5, epsilon = 5e-3);
        assert_eq!(t.transmural_class, TransmuralClass::Mid, "site {p}");
        assert_eq!(t.cell_type, CellType::Healthy);
    }
}

#[test]
fn far_scar_leaves_wall_healthy() {
    let (_, tagged) = tag(healthy_surfaces(), &params());
    assert!(tagged.labels.iter().all(|l| l.cell_type == CellType::Healthy));
}

#[test]
fn scar_core_and_border_zone() {
    let (mesh, tagged) = tag(scarred_surfaces(), &params());
    let c = scar_center();

    let mut core = 0;
    let mut border = 0;
    for (p, label) in mesh.nodes.iter().zip(&tagged.labels) {
        let offset = (p - c).abs().max();
        if offset < 0.19 {
            assert_eq!(label.cell_type, CellType::Core, "node {p:?}");
            core += 1;
        } else if offset > 0.21 && offset < 0.49 {
            assert_eq!(label.cell_type, CellType::BorderZone, "node {p:?}");
            border += 1;
        } else if offset > 0.51 {
            assert_eq!(label.cell_type, CellType::Healthy, "node {p:?}");
        }
    }
    assert!(core > 0);
    assert!(border > 0);
}

#[test]
fn transmural_depth_follows_the_wall() {
    let (mesh, tagged) = tag(healthy_surfaces(), &params());

    let mut midwall = 0;
    for (p, label) in mesh.nodes.iter().zip(&tagged.labels) {
        assert!((0.0..=1.0).contains(&label.transmural_depth));
        assert_eq!(
            label.transmural_class,
            params().transmural.classify(label.transmural_depth)
        );

        if p.z > -0.6 && p.z < 0.0 {
            let r = radial(p);
            if r < 1.3 {
                assert!(label.transmural_depth < 0.5, "node {p:?}");
            } else if r > 1.7 {
                assert!(label.transmural_depth > 0.5, "node {p:?}");
            }
            if p.z > -0.3 && r > 1.40 && r < 1.56 {
                assert_eq!(label.transmural_class, TransmuralClass::Mid, "node {p:?}");
                assert!((label.transmural_depth - 0.5).abs() < 0.1, "node {p:?}");
                midwall += 1;
            }
        }
    }
    assert!(midwall > 0);
}

// ============================================================================
// Landmarks
// ============================================================================

#[test]
fn single_apex_at_the_bottom() {
    let (mesh, tagged) = tag(healthy_surfaces(), &params());

    let apexes: Vec<usize> = tagged
        .labels
        .iter()
        .enumerate()
        .filter(|(_, l)| l.apex_base_tag == ApexBaseTag::Apex)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(apexes, vec![tagged.landmarks.apex_site]);
    assert!(mesh.nodes[apexes[0]].z < -3.0);
}

#[test]
fn base_sites_at_the_rim() {
    let (mesh, tagged) = tag(healthy_surfaces(), &params());

    let base: Vec<&Point3<f64>> = mesh
        .nodes
        .iter()
        .zip(&tagged.labels)
        .filter(|(_, l)| l.apex_base_tag == ApexBaseTag::Base)
        .map(|(p, _)| p)
        .collect();
    assert!(!base.is_empty());
    assert!(base.iter().all(|p| p.z > -0.3));

    assert_eq!(tagged.landmarks.base.loops.len(), 1);
    assert!(tagged.landmarks.base.loops[0].closed);
    assert_relative_eq!(
        tagged.landmarks.base_center.z,
        mesh.bounds().max.z,
        epsilon = 1e-9
    );
    assert!(tagged.landmarks.base.tube_center().expect("tube").z > RIM_HEIGHT - 0.05);
}

#[test]
fn long_axis_points_to_the_base() {
    let (_, tagged) = tag(healthy_surfaces(), &params());
    let axis = tagged.landmarks.long_axis;
    assert_relative_eq!(axis.norm(), 1.0, epsilon = 1e-12);
    assert!(axis.z > 0.9);
}

#[test]
fn apex_base_depth_runs_bottom_to_top() {
    let (mesh, tagged) = tag(healthy_surfaces(), &params());
    for (p, label) in mesh.nodes.iter().zip(&tagged.labels) {
        assert!((0.0..=1.0).contains(&label.apex_base_depth));
        if p.z < -3.3 {
            assert!(label.apex_base_depth < 0.5, "node {p:?}");
        }
    }
    let apex = tagged.landmarks.apex_site;
    assert!(tagged.labels[apex].apex_base_depth < 0.1);
}

// ============================================================================
// Segments and pacing
// ============================================================================

#[test]
fn every_segment_is_populated() {
    // No site lies exactly on the endocardium, so the apical cap collapses
    // to the lowest sites
    let (_, tagged) = tag(healthy_surfaces(), &params().apex_cap_depth(0.0));

    let mut counts = [0usize; 17];
    for label in &tagged.labels {
        let n = label.aha_segment.get();
        assert!((1..=17).contains(&n));
        counts[usize::from(n) - 1] += 1;
    }
    for (i, &count) in counts.iter().enumerate() {
        assert!(count > 0, "segment {} is empty", i + 1);
    }
}

#[test]
fn heights_split_the_wall_in_thirds() {
    let (mesh, tagged) = tag(healthy_surfaces(), &params());
    let h = tagged.heights;
    let bounds = mesh.bounds();
    assert_relative_eq!(h.min, bounds.min.z, epsilon = 1e-9);
    assert_relative_eq!(h.max, bounds.max.z, epsilon = 1e-9);
    assert!(h.min <= h.apex && h.apex <= h.max);
    assert_relative_eq!(h.apical - h.min, (h.max - h.min) / 3.0, epsilon = 1e-9);
    assert_relative_eq!(h.mid_cavity - h.apical, (h.max - h.min) / 3.0, epsilon = 1e-9);
}

#[test]
fn apical_cap_ends_at_the_cavity() {
    let (mesh, tagged) = tag(healthy_surfaces(), &params().apex_cap_depth(0.2));
    let lowest_endo = mesh
        .nodes
        .iter()
        .zip(&tagged.labels)
        .filter(|(_, l)| l.transmural_class == TransmuralClass::Endo)
        .map(|(p, _)| p.z)
        .fold(f64::INFINITY, f64::min);
    assert_relative_eq!(tagged.heights.apex, lowest_endo, epsilon = 1e-9);
    for (p, label) in mesh.nodes.iter().zip(&tagged.labels) {
        assert_eq!(label.aha_segment.is_apex(), p.z <= lowest_endo, "node {p:?}");
    }
}

#[test]
fn pacing_with_zero_offset() {
    let (_, tagged) = tag(healthy_surfaces(), &params().pacing_offset(0));

    let filled: Vec<(usize, usize)> = tagged
        .pacing
        .slots
        .iter()
        .enumerate()
        .filter_map(|(slot, site)| site.map(|s| (slot, s)))
        .collect();
    assert!(!filled.is_empty());
    assert_eq!(
        tagged.labels.iter().filter(|l| l.pacing).count(),
        filled.len()
    );

    for (slot, site) in filled {
        let label = &tagged.labels[site];
        assert!(label.pacing);
        assert_ne!(label.cell_type, CellType::Core);
        let (class, segment) = if slot < 17 {
            (TransmuralClass::Endo, slot + 1)
        } else {
            (TransmuralClass::Epi, slot - 16)
        };
        assert_eq!(label.transmural_class, class);
        assert_eq!(usize::from(label.aha_segment.get()), segment);
    }
}

#[test]
fn pacing_disabled() {
    let (_, tagged) = tag(healthy_surfaces(), &params().without_pacing());
    assert!(tagged.pacing.slots.iter().all(Option::is_none));
    assert!(tagged.labels.iter().all(|l| !l.pacing));
}

// ============================================================================
// Fibers and topology
// ============================================================================

#[test]
fn fibers_and_normals_are_unit() {
    let (_, tagged) = tag(healthy_surfaces(), &params());
    for label in &tagged.labels {
        assert_relative_eq!(label.fiber_orientation.norm(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(label.endo_normal.norm(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(label.epi_normal.norm(), 1.0, epsilon = 1e-9);
    }
    for frame in &tagged.frames {
        assert_relative_eq!(frame.normal.dot(&frame.tangent), 0.0, epsilon = 1e-9);
        assert_relative_eq!(frame.normal.dot(&frame.axial), 0.0, epsilon = 1e-9);
        assert_relative_eq!(frame.tangent.dot(&frame.axial), 0.0, epsilon = 1e-9);
    }
}

#[test]
fn node_adjacency_is_symmetric() {
    let (mesh, tagged) = tag(healthy_surfaces(), &params());
    let adjacency = &tagged.adjacency;
    assert_eq!(adjacency.len(), mesh.node_count());
    assert!(adjacency.is_symmetric());
    for (site, neighbors) in adjacency.iter().enumerate() {
        assert!(!neighbors.is_empty());
        assert!(!neighbors.contains(&(site as u32)));
        assert!(neighbors.windows(2).all(|w| w[0] < w[1]));
        // A node touches at most 8 elements of 8 nodes each
        assert!(neighbors.len() <= 26);
    }
}

#[test]
fn deterministic_across_runs() {
    let (_, first) = tag(scarred_surfaces(), &params().pacing_offset(3));
    let (_, second) = tag(scarred_surfaces(), &params().pacing_offset(3));
    assert_eq!(first.labels, second.labels);
    assert_eq!(first.pacing, second.pacing);
    assert_eq!(first.adjacency, second.adjacency);
    assert_eq!(first.fields(), second.fields());
}

// ============================================================================
// Element centroid mode
// ============================================================================

#[test]
fn element_centroid_mode() {
    let params = TaggingParams::for_element_centroids().base_tube_radius(0.1);
    let (mesh, tagged) = tag(healthy_surfaces(), &params);

    assert_eq!(tagged.site, EvaluationSite::ElementCentroid);
    assert_eq!(tagged.len(), mesh.element_count());
    assert_eq!(tagged.adjacency.len(), mesh.element_count());
    assert!(tagged.adjacency.is_symmetric());

    let centroids = evaluation_sites(&mesh, EvaluationSite::ElementCentroid);
    assert!(centroids[tagged.landmarks.apex_site].z < -3.0);

    // Base center sits at the highest centroid, half an element below the top nodes
    let top = centroids.iter().map(|c| c.z).fold(f64::NEG_INFINITY, f64::max);
    assert_relative_eq!(tagged.landmarks.base_center.z, top, epsilon = 1e-9);
    assert!(tagged.landmarks.base_center.z < mesh.bounds().max.z - 0.1);
    assert_eq!(
        tagged
            .labels
            .iter()
            .filter(|l| l.apex_base_tag == ApexBaseTag::Apex)
            .count(),
        1
    );
    assert!(tagged
        .labels
        .iter()
        .any(|l| l.apex_base_tag == ApexBaseTag::Base));
}

// ============================================================================
// Output fields and errors
// ============================================================================

#[test]
fn output_fields() {
    let (mesh, tagged) = tag(healthy_surfaces(), &params());
    let fields = tagged.fields();

    let names: Vec<&str> = fields.iter().map(|f| f.name).collect();
    assert_eq!(
        names,
        vec![
            "Cell_type",
            "EndoToEpi",
            "DistEndoToEpi",
            "fibers_OR",
            "endo_Norm",
            "epi_Norm",
            "vector_LAxis",
            "tagApexBase",
            "DistApexToBase",
            "17_AHA",
            "34_pacing",
        ]
    );
    assert!(fields.iter().all(|f| f.values.len() == mesh.node_count()));

    let tags = fields
        .iter()
        .find(|f| f.name == "tagApexBase")
        .expect("apex-base field");
    let FieldValues::Integer(tags) = &tags.values else {
        panic!("tagApexBase should hold integers");
    };
    assert_eq!(tags.iter().filter(|&&t| t == 0).count(), 1);
    assert!(tags.iter().all(|t| (0..=2).contains(t)));

    let pacing = fields.iter().find(|f| f.name == "34_pacing").expect("pacing");
    let FieldValues::Integer(pacing) = &pacing.values else {
        panic!("34_pacing should hold integers");
    };
    assert!(pacing.iter().filter(|&&p| p == 1).count() <= PACING_SLOTS);
}

#[test]
fn closed_endocardium_is_rejected() {
    let mut surfaces = healthy_surfaces();
    surfaces.endocardium = common::ellipsoid(
        Vector3::new(1.0, 1.0, 2.0),
        12,
        16,
        std::f64::consts::PI,
    );
    let err = tag_ventricle(&ventricle_mesh(), surfaces, &params()).expect_err("no base");
    assert!(matches!(err, TaggingError::MissingBaseBoundary));
}

#[test]
fn single_element_layer_has_no_apex() {
    // Every element centroid sits at the height of the node centroid
    let mesh = HexMesh::structured_block([2, 2, 1], 0.5, Point3::new(-0.5, -0.5, -2.0));
    let params = TaggingParams::for_element_centroids().base_tube_radius(0.1);

    let err = tag_ventricle(&mesh, healthy_surfaces(), &params).expect_err("no apex");
    assert!(matches!(err, TaggingError::ApexNotFound));
}

#[test]
fn flattened_mesh_has_degenerate_long_axis() {
    // The base center is lifted only to the top of the mesh, which is
    // within the tolerance of the apex at the origin.
    let mut mesh = HexMesh::structured_block([1, 1, 1], 1.0, Point3::origin());
    for node in &mut mesh.nodes {
        node.z *= 1e-12;
    }

    let err = tag_ventricle(&mesh, healthy_surfaces(), &params()).expect_err("degenerate axis");
    assert!(matches!(err, TaggingError::DegenerateLongAxis));
}

#[test]
fn invalid_thresholds_are_rejected() {
    let bad = params().transmural(0.7, 0.3);
    let err = tag_ventricle(&ventricle_mesh(), healthy_surfaces(), &bad).expect_err("bad params");
    assert!(matches!(err, TaggingError::InvalidParams(_)));
}

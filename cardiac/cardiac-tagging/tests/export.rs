//! Case directory export.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::fs;
use std::path::Path;

use cardiac_tagging::{save_case, tag_ventricle, ExportError, TaggingParams, PACING_SLOTS};
use common::{healthy_surfaces, params, scarred_surfaces, ventricle_mesh};
use mesh_types::HexMesh;

fn read_column(path: &Path) -> Vec<f64> {
    fs::read_to_string(path)
        .expect("read column")
        .lines()
        .map(|l| l.parse().expect("number"))
        .collect()
}

fn read_rows(path: &Path) -> Vec<Vec<u32>> {
    fs::read_to_string(path)
        .expect("read rows")
        .lines()
        .map(|l| l.split_whitespace().map(|v| v.parse().expect("index")).collect())
        .collect()
}

#[test]
fn case_files_match_the_tagging() {
    let mesh = ventricle_mesh();
    let tagged = tag_ventricle(&mesh, scarred_surfaces(), &params().pacing_offset(0)).expect("tag");
    let dir = tempfile::tempdir().expect("temp dir");
    let case = dir.path().join("Reader_VTK");

    save_case(&case, &tagged, &mesh).expect("save case");

    for name in [
        "vecinos.txt",
        "cell_conex_nodos.txt",
        "centroidCellX.txt",
        "centroidCellY.txt",
        "centroidCellZ.txt",
        "EndoToEpi.txt",
        "scarTissue.txt",
        "fibreOrientationX.txt",
        "fibreOrientationY.txt",
        "fibreOrientationZ.txt",
        "centerMass-BPL.txt",
        "pacing_34.txt",
    ] {
        assert!(case.join(name).is_file(), "{name} missing");
    }

    let neighbors = read_rows(&case.join("vecinos.txt"));
    assert_eq!(neighbors.len(), mesh.node_count());
    for (site, row) in neighbors.iter().enumerate() {
        assert_eq!(row.as_slice(), tagged.adjacency.neighbors(site));
    }

    let connectivity = read_rows(&case.join("cell_conex_nodos.txt"));
    assert_eq!(connectivity.len(), mesh.element_count());
    assert_eq!(connectivity[0].as_slice(), mesh.elements[0].as_slice());

    let x = read_column(&case.join("centroidCellX.txt"));
    assert_eq!(x.len(), mesh.node_count());
    assert!((x[0] - mesh.nodes[0].x).abs() < 1e-6);

    let scar = read_column(&case.join("scarTissue.txt"));
    assert!(scar.iter().any(|&v| v == 2.0));
    for (v, label) in scar.iter().zip(&tagged.labels) {
        assert_eq!(*v, f64::from(label.cell_type.code()));
    }

    let classes = read_column(&case.join("EndoToEpi.txt"));
    for (v, label) in classes.iter().zip(&tagged.labels) {
        assert_eq!(*v, f64::from(label.transmural_class.code()));
    }

    let fx = read_column(&case.join("fibreOrientationX.txt"));
    let fy = read_column(&case.join("fibreOrientationY.txt"));
    let fz = read_column(&case.join("fibreOrientationZ.txt"));
    for i in 0..fx.len() {
        let norm = (fx[i] * fx[i] + fy[i] * fy[i] + fz[i] * fz[i]).sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    assert!(!case.join("centerMass.txt").exists());
    let center = read_column(&case.join("centerMass-BPL.txt"));
    assert_eq!(center.len(), 3);
    assert!((center[2] - tagged.centroid().z).abs() < 1e-6);

    let pacing = read_column(&case.join("pacing_34.txt"));
    assert_eq!(pacing.len(), PACING_SLOTS);
    for (value, slot) in pacing.iter().zip(&tagged.pacing.slots) {
        match slot {
            Some(site) => assert_eq!(*value, *site as f64),
            None => assert_eq!(*value, -1.0),
        }
    }
}

#[test]
fn element_centroid_case_uses_centroids() {
    let mesh = ventricle_mesh();
    let params = TaggingParams::for_element_centroids().base_tube_radius(0.1);
    let tagged = tag_ventricle(&mesh, healthy_surfaces(), &params).expect("tag");
    let dir = tempfile::tempdir().expect("temp dir");

    save_case(dir.path(), &tagged, &mesh).expect("save case");

    let z = read_column(&dir.path().join("centroidCellZ.txt"));
    assert_eq!(z.len(), mesh.element_count());
    let centroid = mesh.element_centroid(0).expect("element 0");
    assert!((z[0] - centroid.z).abs() < 1e-6);
    assert_eq!(read_rows(&dir.path().join("vecinos.txt")).len(), mesh.element_count());

    let center = read_column(&dir.path().join("centerMass.txt"));
    assert!((center[0] - tagged.centroid().x).abs() < 1e-6);
    assert!(!dir.path().join("centerMass-BPL.txt").exists());
}

#[test]
fn mismatched_mesh_is_rejected() {
    let mesh = ventricle_mesh();
    let tagged = tag_ventricle(&mesh, healthy_surfaces(), &params()).expect("tag");
    let other = HexMesh::structured_block([1, 1, 1], 1.0, mesh_types::Point3::origin());
    let dir = tempfile::tempdir().expect("temp dir");

    let err = save_case(dir.path(), &tagged, &other).expect_err("mismatch");
    assert!(matches!(
        err,
        ExportError::LengthMismatch {
            what: "labels",
            expected: 8,
            ..
        }
    ));
    assert!(!dir.path().join("vecinos.txt").exists());
}

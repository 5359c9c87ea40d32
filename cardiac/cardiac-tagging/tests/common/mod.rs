//! Synthetic ventricle shared by the integration tests.
//!
//! The wall is the space between two coaxial ellipsoids with semi-axes
//! `(1, 1, 2)` (endocardium) and `(2, 2, 4)` (epicardium), cut off just
//! above their equator. The endocardium is open at the top so it has a
//! base boundary; the epicardium is closed.

#![allow(dead_code)]

use std::f64::consts::{PI, TAU};

use cardiac_tagging::{TaggingParams, VentricleSurfaces};
use mesh_types::{closed_box, HexMesh, IndexedMesh, Point3, Vector3};

/// Height of the open endocardial rim.
pub const RIM_HEIGHT: f64 = 0.3;

/// Elements are kept up to this centroid height.
pub const CUT_HEIGHT: f64 = 0.4;

/// Ellipsoid surface around the origin with outward-facing triangles.
///
/// Rings run from the south pole up to polar angle `max_polar` (measured
/// from `-z`). With `max_polar >= pi` the north pole closes the surface.
pub fn ellipsoid(semi_axes: Vector3<f64>, rings: usize, segments: usize, max_polar: f64) -> IndexedMesh {
    let closed = max_polar >= PI;
    let top = max_polar.min(PI);
    let ring_count = if closed { rings - 1 } else { rings };

    let mut positions = vec![Point3::new(0.0, 0.0, -semi_axes.z)];
    for k in 1..=ring_count {
        let theta = top * k as f64 / rings as f64;
        let (rho, z) = (theta.sin(), -theta.cos());
        for j in 0..segments {
            let phi = TAU * j as f64 / segments as f64;
            positions.push(Point3::new(
                semi_axes.x * rho * phi.cos(),
                semi_axes.y * rho * phi.sin(),
                semi_axes.z * z,
            ));
        }
    }

    let ring = |k: usize, j: usize| (1 + (k - 1) * segments + j % segments) as u32;
    let mut faces = Vec::new();
    for j in 0..segments {
        faces.push([0, ring(1, j + 1), ring(1, j)]);
    }
    for k in 1..ring_count {
        for j in 0..segments {
            let (a, b) = (ring(k, j), ring(k, j + 1));
            let (c, d) = (ring(k + 1, j + 1), ring(k + 1, j));
            faces.push([a, b, c]);
            faces.push([a, c, d]);
        }
    }
    if closed {
        let north = positions.len() as u32;
        positions.push(Point3::new(0.0, 0.0, semi_axes.z));
        for j in 0..segments {
            faces.push([ring(ring_count, j), ring(ring_count, j + 1), north]);
        }
    }

    IndexedMesh::from_positions(&positions, faces)
}

/// Endocardium: ellipsoid `(1, 1, 2)` open above [`RIM_HEIGHT`].
pub fn endocardium() -> IndexedMesh {
    let max_polar = (-RIM_HEIGHT / 2.0).acos();
    ellipsoid(Vector3::new(1.0, 1.0, 2.0), 24, 32, max_polar)
}

/// Epicardium: closed ellipsoid `(2, 2, 4)`.
pub fn epicardium() -> IndexedMesh {
    ellipsoid(Vector3::new(2.0, 2.0, 4.0), 32, 32, PI)
}

/// Cube of half width `half` around `center`.
pub fn cube(center: Point3<f64>, half: f64) -> IndexedMesh {
    let h = Vector3::repeat(half);
    closed_box(center - h, center + h)
}

/// Surfaces with the scar far away from the wall.
pub fn healthy_surfaces() -> VentricleSurfaces {
    let far = Point3::new(50.0, 50.0, 50.0);
    VentricleSurfaces {
        core: cube(far, 0.5),
        border_zone: cube(far, 1.0),
        epicardium: epicardium(),
        endocardium: endocardium(),
    }
}

/// Center of the scar used by [`scarred_surfaces`].
pub fn scar_center() -> Point3<f64> {
    Point3::new(0.0, -1.5, -0.5)
}

/// Surfaces with a small scar in the lateral wall.
///
/// The core is a cube of half width 0.2 and the border zone one of half
/// width 0.5, both around [`scar_center`].
pub fn scarred_surfaces() -> VentricleSurfaces {
    VentricleSurfaces {
        core: cube(scar_center(), 0.2),
        border_zone: cube(scar_center(), 0.5),
        ..healthy_surfaces()
    }
}

/// Hexahedral wall between the two ellipsoids.
///
/// Node coordinates are offset from the axes so no node sits on the long
/// axis.
pub fn ventricle_mesh() -> HexMesh {
    let block = HexMesh::structured_block([14, 14, 16], 0.3, Point3::new(-2.05, -2.05, -4.15));
    block.extract_elements(|c| {
        let q = (c.x * c.x + c.y * c.y + c.z * c.z / 4.0).sqrt();
        (1.0..=2.0).contains(&q) && c.z <= CUT_HEIGHT
    })
}

/// Parameters scaled to the synthetic ventricle.
pub fn params() -> TaggingParams {
    TaggingParams::default().base_tube_radius(0.1)
}

/// Distance of a point from the long axis.
pub fn radial(p: &Point3<f64>) -> f64 {
    p.x.hypot(p.y)
}

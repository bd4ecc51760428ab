//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use csgweld::{
    CsgObject, Shared,
    float_types::Real,
    mesh::{plane::Plane, polygon::Polygon, vertex::Vertex},
    shapes,
    traits::CsgOps,
};
use nalgebra::{Point3, Vector3};

/// Returns the approximate bounding box `[min_x, min_y, min_z, max_x, max_y, max_z]`
/// for a set of polygons.
pub fn bounding_box<S: Clone>(polygons: &[Polygon<S>]) -> [Real; 6] {
    let mut bb = [
        Real::MAX,
        Real::MAX,
        Real::MAX,
        Real::MIN,
        Real::MIN,
        Real::MIN,
    ];
    for p in polygons.iter().flat_map(|poly| &poly.vertices).map(|v| v.pos) {
        bb[0] = bb[0].min(p.x);
        bb[1] = bb[1].min(p.y);
        bb[2] = bb[2].min(p.z);
        bb[3] = bb[3].max(p.x);
        bb[4] = bb[4].max(p.y);
        bb[5] = bb[5].max(p.z);
    }
    bb
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Helper to make a simple Polygon in 3D with given vertices.
pub fn make_polygon_3d(points: &[[Real; 3]]) -> Polygon<()> {
    let verts = points
        .iter()
        .map(|p| Vertex::new(Point3::new(p[0], p[1], p[2]), Vector3::z()))
        .collect();
    Polygon::new(verts, None)
}

/// Axis-aligned cube of edge `size` centered on `center`, tagged as `object_id`.
pub fn tagged_cube(size: Real, center: [Real; 3], object_id: usize) -> CsgObject<Shared> {
    shapes::cube::<()>(size)
        .expect("positive size")
        .translate(center[0], center[1], center[2])
        .with_provenance(object_id, 0)
}

/// Cut every polygon of `solid` along the three coordinate planes through the origin.
pub fn fragment_at_origin<S: Clone>(solid: &CsgObject<S>) -> Vec<Polygon<S>> {
    let cuts = [Vector3::x(), Vector3::y(), Vector3::z()].map(|n| Plane::from_normal(n, 0.0));
    let mut polygons = solid.polygons.clone();
    for cut in &cuts {
        polygons = polygons
            .iter()
            .flat_map(|p| {
                let split = cut.split_polygon(p, 1e-9);
                split
                    .coplanar_front
                    .into_iter()
                    .chain(split.coplanar_back)
                    .chain(split.front)
                    .chain(split.back)
            })
            .collect();
    }
    polygons
}

/// `(inside A, inside B)` for points well away from both boundaries.
pub fn sample_points() -> [([Real; 3], bool, bool); 4] {
    [
        ([0.5, 0.5, 0.5], true, true),
        ([-0.5, -0.5, -0.5], true, false),
        ([1.5, 1.5, 1.5], false, true),
        ([5.0, 5.0, 5.0], false, false),
    ]
}

//! Primitive solids centered at the origin, y-up, with outward (counter-clockwise) winding.
//!
//! Every generator validates its parameters and returns polygons without provenance; use
//! [`CsgObject::with_provenance`] to tag them before boolean operations that should merge
//! fragments afterwards.

use crate::errors::CsgError;
use crate::float_types::{PI, Real, TAU};
use crate::mesh::CsgObject;
use crate::mesh::polygon::{Polygon, build_orthonormal_basis};
use crate::mesh::provenance::Shared;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector3};

/// Accumulates indexed vertices and faces, then emits one polygon per face.
#[derive(Debug, Clone, Default)]
pub struct PrimitiveBuilder {
    pub points: Vec<Point3<Real>>,
    pub faces: Vec<Vec<usize>>,
}

impl PrimitiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, point: Point3<Real>) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    pub fn add_face(&mut self, indices: Vec<usize>) {
        self.faces.push(indices);
    }

    pub fn build<S: Clone>(&self) -> Result<CsgObject<S>, CsgError> {
        polyhedron(&self.points, &self.faces)
    }
}

/// Polygons from an indexed face list.
///
/// Faces with fewer than three indices and faces whose plane is undefined are
/// skipped. Vertex normals are the face normal.
pub fn polyhedron<S: Clone>(
    points: &[Point3<Real>],
    faces: &[Vec<usize>],
) -> Result<CsgObject<S>, CsgError> {
    let mut polygons = Vec::with_capacity(faces.len());

    for face in faces {
        if face.len() < 3 {
            continue;
        }
        if let Some(&index) = face.iter().find(|&&idx| idx >= points.len()) {
            return Err(CsgError::FaceIndexOutOfRange {
                index,
                len: points.len(),
            });
        }

        let vertices = face.iter().map(|&idx| Vertex::at(points[idx])).collect();
        if let Some(mut polygon) = Polygon::try_new(vertices, None) {
            let normal = polygon.plane.normal;
            for v in &mut polygon.vertices {
                v.normal = normal;
            }
            polygons.push(polygon);
        }
    }

    Ok(CsgObject::from_polygons(polygons))
}

fn positive(name: &'static str, value: Real) -> Result<Real, CsgError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(CsgError::InvalidParameter { name, value })
    }
}

fn at_least(name: &'static str, value: usize, min: usize) -> Result<usize, CsgError> {
    if value >= min {
        Ok(value)
    } else {
        Err(CsgError::InvalidParameter {
            name,
            value: value as Real,
        })
    }
}

/// Axis-aligned box with edge lengths `width` (x), `height` (y), `depth` (z).
///
/// ```text
///       7-------6
///      /|      /|
///     4-------5 |      y
///     | 3-----|-2      |
///     |/      |/       o-- x
///     0-------1       /
///                    z (out of the page for 4..7)
/// ```
pub fn cuboid<S: Clone>(width: Real, height: Real, depth: Real) -> Result<CsgObject<S>, CsgError> {
    let hx = positive("width", width)? * 0.5;
    let hy = positive("height", height)? * 0.5;
    let hz = positive("depth", depth)? * 0.5;

    let points = [
        Point3::new(-hx, -hy, -hz),
        Point3::new(hx, -hy, -hz),
        Point3::new(hx, hy, -hz),
        Point3::new(-hx, hy, -hz),
        Point3::new(-hx, -hy, hz),
        Point3::new(hx, -hy, hz),
        Point3::new(hx, hy, hz),
        Point3::new(-hx, hy, hz),
    ];
    let faces = [
        vec![3, 2, 1, 0], // -z
        vec![4, 5, 6, 7], // +z
        vec![5, 4, 0, 1], // -y
        vec![7, 6, 2, 3], // +y
        vec![6, 5, 1, 2], // +x
        vec![4, 7, 3, 0], // -x
    ];

    polyhedron(&points, &faces)
}

pub fn cube<S: Clone>(size: Real) -> Result<CsgObject<S>, CsgError> {
    cuboid(size, size, size)
}

/// UV sphere with `segments` slices around y and `stacks` bands from pole to pole.
///
/// Each pole is a single vertex closed by a triangle fan.
pub fn sphere<S: Clone>(radius: Real, segments: usize, stacks: usize) -> Result<CsgObject<S>, CsgError> {
    let radius = positive("radius", radius)?;
    let segments = at_least("segments", segments, 3)?;
    let stacks = at_least("stacks", stacks, 2)?;

    let mut builder = PrimitiveBuilder::new();
    let north = builder.add_vertex(Point3::new(0.0, radius, 0.0));

    let rings: Vec<Vec<usize>> = (1..stacks)
        .map(|j| {
            let phi = PI * j as Real / stacks as Real;
            let (y, ring_radius) = (radius * phi.cos(), radius * phi.sin());
            (0..segments)
                .map(|i| {
                    let theta = TAU * i as Real / segments as Real;
                    builder.add_vertex(Point3::new(
                        theta.cos() * ring_radius,
                        y,
                        theta.sin() * ring_radius,
                    ))
                })
                .collect()
        })
        .collect();

    let south = builder.add_vertex(Point3::new(0.0, -radius, 0.0));

    for i in 0..segments {
        let next = (i + 1) % segments;

        let first = &rings[0];
        builder.add_face(vec![north, first[next], first[i]]);

        for band in rings.windows(2) {
            let (upper, lower) = (&band[0], &band[1]);
            builder.add_face(vec![upper[next], lower[next], lower[i], upper[i]]);
        }

        let last = &rings[rings.len() - 1];
        builder.add_face(vec![last[next], south, last[i]]);
    }

    builder.build()
}

/// Cylinder along y, centered, with n-gon caps.
pub fn cylinder<S: Clone>(radius: Real, height: Real, segments: usize) -> Result<CsgObject<S>, CsgError> {
    let radius = positive("radius", radius)?;
    let half = positive("height", height)? * 0.5;
    let segments = at_least("segments", segments, 3)?;

    let mut builder = PrimitiveBuilder::new();
    let mut bottom = Vec::with_capacity(segments);
    let mut top = Vec::with_capacity(segments);
    for i in 0..segments {
        let theta = TAU * i as Real / segments as Real;
        let (x, z) = (theta.cos() * radius, theta.sin() * radius);
        bottom.push(builder.add_vertex(Point3::new(x, -half, z)));
        top.push(builder.add_vertex(Point3::new(x, half, z)));
    }

    for i in 0..segments {
        let next = (i + 1) % segments;
        builder.add_face(vec![top[next], bottom[next], bottom[i], top[i]]);
    }
    builder.add_face(top.iter().rev().copied().collect());
    builder.add_face(bottom);

    builder.build()
}

/// Single upward-facing square of edge `size` in the y = 0 plane.
pub fn plane<S: Clone>(size: Real) -> Result<CsgObject<S>, CsgError> {
    let h = positive("size", size)? * 0.5;
    let points = [
        Point3::new(-h, 0.0, -h),
        Point3::new(h, 0.0, -h),
        Point3::new(h, 0.0, h),
        Point3::new(-h, 0.0, h),
    ];
    polyhedron(&points, &[vec![3, 2, 1, 0]])
}

/// Convex solid whose vertices are `directions` scaled to `radius`, with one face per
/// entry of `face_normals`. Each face gathers the vertices furthest along its normal
/// and orders them counter-clockwise about it.
fn regular_polyhedron<S: Clone>(
    radius: Real,
    directions: &[Vector3<Real>],
    face_normals: &[Vector3<Real>],
) -> Result<CsgObject<S>, CsgError> {
    let radius = positive("radius", radius)?;
    let points: Vec<Point3<Real>> = directions
        .iter()
        .map(|d| Point3::from(d.normalize() * radius))
        .collect();
    let tolerance = radius * 1e-6;

    let faces: Vec<Vec<usize>> = face_normals
        .iter()
        .map(|n| {
            let n = n.normalize();
            let reach = points
                .iter()
                .map(|p| p.coords.dot(&n))
                .fold(-Real::MAX, Real::max);
            let mut face: Vec<usize> = (0..points.len())
                .filter(|&k| points[k].coords.dot(&n) > reach - tolerance)
                .collect();

            let center = face.iter().fold(Vector3::zeros(), |acc, &k| acc + points[k].coords)
                / face.len() as Real;
            let (u, v) = build_orthonormal_basis(n);
            let angle = |k: usize| {
                let d = points[k].coords - center;
                d.dot(&v).atan2(d.dot(&u))
            };
            face.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
            face
        })
        .collect();

    polyhedron(&points, &faces)
}

/// Sign combinations of `(x, y, z)` where a zero component stays unsigned.
fn signed(x: Real, y: Real, z: Real) -> Vec<Vector3<Real>> {
    let signs = |c: Real| if c == 0.0 { vec![0.0] } else { vec![c, -c] };
    let mut out = Vec::new();
    for &sx in &signs(x) {
        for &sy in &signs(y) {
            for &sz in &signs(z) {
                out.push(Vector3::new(sx, sy, sz));
            }
        }
    }
    out
}

/// Sign combinations of the three cyclic permutations of `(0, a, b)`.
fn cyclic(a: Real, b: Real) -> Vec<Vector3<Real>> {
    let mut out = signed(0.0, a, b);
    out.extend(signed(b, 0.0, a));
    out.extend(signed(a, b, 0.0));
    out
}

fn golden_ratio() -> Real {
    (1.0 + (5.0 as Real).sqrt()) * 0.5
}

/// Regular tetrahedron with circumradius `radius`.
pub fn tetrahedron<S: Clone>(radius: Real) -> Result<CsgObject<S>, CsgError> {
    let directions = [
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(1.0, -1.0, -1.0),
        Vector3::new(-1.0, 1.0, -1.0),
        Vector3::new(-1.0, -1.0, 1.0),
    ];
    let normals: Vec<Vector3<Real>> = directions.iter().map(|d| -d).collect();
    regular_polyhedron(radius, &directions, &normals)
}

/// Cube with circumradius `radius`.
pub fn hexahedron<S: Clone>(radius: Real) -> Result<CsgObject<S>, CsgError> {
    let normals = [
        Vector3::x(),
        -Vector3::x(),
        Vector3::y(),
        -Vector3::y(),
        Vector3::z(),
        -Vector3::z(),
    ];
    regular_polyhedron(radius, &signed(1.0, 1.0, 1.0), &normals)
}

/// Regular octahedron with circumradius `radius`.
pub fn octahedron<S: Clone>(radius: Real) -> Result<CsgObject<S>, CsgError> {
    let directions = [
        Vector3::x(),
        -Vector3::x(),
        Vector3::y(),
        -Vector3::y(),
        Vector3::z(),
        -Vector3::z(),
    ];
    regular_polyhedron(radius, &directions, &signed(1.0, 1.0, 1.0))
}

/// Regular dodecahedron with circumradius `radius`.
pub fn dodecahedron<S: Clone>(radius: Real) -> Result<CsgObject<S>, CsgError> {
    let phi = golden_ratio();
    let mut directions = signed(1.0, 1.0, 1.0);
    directions.extend(cyclic(1.0 / phi, phi));
    regular_polyhedron(radius, &directions, &cyclic(phi, 1.0))
}

/// Regular icosahedron with circumradius `radius`.
pub fn icosahedron<S: Clone>(radius: Real) -> Result<CsgObject<S>, CsgError> {
    let phi = golden_ratio();
    let mut normals = signed(1.0, 1.0, 1.0);
    normals.extend(cyclic(phi, 1.0 / phi));
    regular_polyhedron(radius, &cyclic(1.0, phi), &normals)
}

impl<S: Clone> CsgObject<S> {
    /// Tag every polygon as its own face of object `object_id`: polygon `i` gets face id
    /// `i` and `material`.
    pub fn with_provenance(&self, object_id: usize, material: usize) -> CsgObject<Shared> {
        self.map_shared(|i, _| Some(Shared::new(object_id, i, material)))
    }
}

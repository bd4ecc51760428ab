//! Planar polygons with provenance.

use crate::float_types::Real;
use crate::float_types::parry3d::bounding_volume::Aabb;
use crate::mesh::plane::{Plane, newell_normal};
use crate::mesh::vertex::Vertex;
use nalgebra::{Matrix4, Point3, Vector3};

/// An ordered, planar, counter-clockwise ring of vertices.
///
/// - `plane` is cached at construction; fragments produced by splitting inherit the
///   plane of the polygon they were cut from.
/// - `shared` is the provenance tag, `None` for synthetic polygons.
#[derive(Debug, Clone)]
pub struct Polygon<S: Clone> {
    pub vertices: Vec<Vertex>,
    pub plane: Plane,
    pub shared: Option<S>,
}

impl<S: Clone> Polygon<S> {
    /// Create a polygon, deriving its plane from the vertices.
    ///
    /// # Panics
    /// When given fewer than three vertices.
    pub fn new(vertices: Vec<Vertex>, shared: Option<S>) -> Self {
        assert!(vertices.len() >= 3, "degenerate polygon");
        let plane = Plane::from_vertices(&vertices);
        Polygon { vertices, plane, shared }
    }

    /// Like [`Polygon::new`], but returns `None` for rings that are too short or
    /// whose plane is undefined.
    pub fn try_new(vertices: Vec<Vertex>, shared: Option<S>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let polygon = Polygon::new(vertices, shared);
        polygon.plane.is_valid().then_some(polygon)
    }

    /// Create a polygon with a known plane.
    pub const fn with_plane(vertices: Vec<Vertex>, plane: Plane, shared: Option<S>) -> Self {
        Polygon { vertices, plane, shared }
    }

    /// Polygon from bare positions; vertex normals are set to the plane normal.
    pub fn from_positions(points: &[Point3<Real>], shared: Option<S>) -> Self {
        let mut polygon = Polygon::new(points.iter().copied().map(Vertex::at).collect(), shared);
        let normal = polygon.plane.normal;
        for v in &mut polygon.vertices {
            v.normal = normal;
        }
        polygon
    }

    /// Reverses winding order, flips vertex normals and the plane.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        for v in &mut self.vertices {
            v.flip();
        }
        self.plane.flip();
    }

    pub fn flipped(&self) -> Self {
        let mut polygon = self.clone();
        polygon.flip();
        polygon
    }

    /// Iterator over `(start, end)` of each edge, closing the ring.
    pub fn edges(&self) -> impl Iterator<Item = (&Vertex, &Vertex)> {
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
    }

    /// Area-weighted normal of the ring (length equals the area).
    pub fn area_vector(&self) -> Vector3<Real> {
        newell_normal(self.vertices.iter().map(|v| &v.pos)) * 0.5
    }

    pub fn centroid(&self) -> Point3<Real> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.pos.coords);
        Point3::from(sum / self.vertices.len() as Real)
    }

    pub fn bounding_box(&self) -> Aabb {
        let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
        let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
        for v in &self.vertices {
            mins = mins.inf(&v.pos);
            maxs = maxs.sup(&v.pos);
        }
        Aabb::new(mins, maxs)
    }

    /// Apply `mat` to every corner and recompute the plane from the moved corners.
    ///
    /// Returns `None` when the result is degenerate (for example a projection
    /// that flattens the polygon).
    pub fn transformed(&self, mat: &Matrix4<Real>, normal_mat: &Matrix4<Real>) -> Option<Self> {
        let vertices = self
            .vertices
            .iter()
            .map(|v| v.transformed(mat, normal_mat))
            .collect::<Option<Vec<_>>>()?;
        Polygon::try_new(vertices, self.shared.clone())
    }

    /// Split into a fan of triangles around the first corner.
    pub fn triangulate_fan(&self) -> Vec<[Point3<Real>; 3]> {
        let first = self.vertices[0].pos;
        self.vertices[1..]
            .windows(2)
            .map(|pair| [first, pair[0].pos, pair[1].pos])
            .collect()
    }
}

/// Build a right-handed orthonormal basis `(u, v)` of the plane with normal `n`,
/// so that `u × v == n`.
pub fn build_orthonormal_basis(n: Vector3<Real>) -> (Vector3<Real>, Vector3<Real>) {
    let n = n.normalize();

    // Pick a vector that is not parallel to `n`.
    let other = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };

    let v = n.cross(&other).normalize();
    let u = v.cross(&n).normalize();

    (u, v)
}

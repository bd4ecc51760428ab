//! Polygon corner: a position plus an optional shading normal.

use crate::float_types::Real;
use nalgebra::{Matrix4, Point3, Vector3};

/// A polygon corner. The normal is carried for shading only; all geometric
/// decisions use the owning polygon's plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub pos: Point3<Real>,
    pub normal: Vector3<Real>,
}

impl Vertex {
    pub const fn new(pos: Point3<Real>, normal: Vector3<Real>) -> Self {
        Vertex { pos, normal }
    }

    /// A corner with a zero normal, for sources that carry positions only.
    pub fn at(pos: Point3<Real>) -> Self {
        Vertex::new(pos, Vector3::zeros())
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
    }

    /// Point on the segment `self → other` at parameter `t`; the normal is blended linearly.
    pub fn interpolate(&self, other: &Vertex, t: Real) -> Vertex {
        Vertex::new(
            self.pos + (other.pos - self.pos) * t,
            self.normal + (other.normal - self.normal) * t,
        )
    }

    /// Move the position by `mat` and the normal by `normal_mat` (the inverse transpose).
    ///
    /// Returns `None` when the homogeneous coordinate collapses.
    pub fn transformed(&self, mat: &Matrix4<Real>, normal_mat: &Matrix4<Real>) -> Option<Vertex> {
        let pos = Point3::from_homogeneous(mat * self.pos.to_homogeneous())?;
        let normal = normal_mat.transform_vector(&self.normal);
        let normal = normal.try_normalize(Real::EPSILON).unwrap_or(normal);
        Some(Vertex::new(pos, normal))
    }

    /// Squared distance between the two positions.
    #[inline]
    pub fn distance_squared(&self, other: &Vertex) -> Real {
        (self.pos - other.pos).norm_squared()
    }
}

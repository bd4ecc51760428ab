//! `CsgObject`: a bag of polygons with boolean operations, cleanup and export.

use crate::config::Tolerance;
use crate::float_types::Real;
use crate::float_types::parry3d::bounding_volume::Aabb;
use crate::mesh::bsp::{Node, Partition};
use crate::mesh::plane::BACK;
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector3, partial_max, partial_min};
use std::sync::OnceLock;

pub mod boolean;
pub mod bsp;
pub mod import;
pub mod manifold;
pub mod merge;
pub mod plane;
pub mod polygon;
pub mod provenance;
pub mod remesh;
pub mod vertex;

/// An unordered bag of boundary polygons describing a solid.
///
/// Polygons do not refer back to the object that holds them, and every operation
/// returns a new object built from cloned polygons.
#[derive(Clone, Debug)]
pub struct CsgObject<S: Clone> {
    pub polygons: Vec<Polygon<S>>,

    /// Lazily calculated AABB that spans `polygons`.
    pub bounding_box: OnceLock<Aabb>,

    /// Tolerances used by every operation on this object.
    pub tolerance: Tolerance,
}

impl<S: Clone> Default for CsgObject<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone> CsgObject<S> {
    /// An empty object.
    pub fn new() -> Self {
        CsgObject {
            polygons: Vec::new(),
            bounding_box: OnceLock::new(),
            tolerance: Tolerance::default(),
        }
    }

    /// Wrap `polygons`, dropping any whose plane is undefined.
    pub fn from_polygons(polygons: Vec<Polygon<S>>) -> Self {
        CsgObject {
            polygons: polygons
                .into_iter()
                .filter(|p| p.vertices.len() >= 3 && p.plane.is_valid())
                .collect(),
            ..Self::new()
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// New object over `polygons` sharing this object's tolerance.
    pub(crate) fn derived(&self, polygons: Vec<Polygon<S>>) -> Self {
        CsgObject {
            polygons,
            bounding_box: OnceLock::new(),
            tolerance: self.tolerance,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Helper to collect all vertices from the object.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.polygons
            .iter()
            .flat_map(|p| p.vertices.clone())
            .collect()
    }

    /// Replace every polygon's provenance with `f(index, polygon)`.
    pub fn map_shared<T: Clone>(
        &self,
        mut f: impl FnMut(usize, &Polygon<S>) -> Option<T>,
    ) -> CsgObject<T> {
        let polygons = self
            .polygons
            .iter()
            .enumerate()
            .map(|(i, p)| Polygon::with_plane(p.vertices.clone(), p.plane.clone(), f(i, p)))
            .collect();
        CsgObject {
            polygons,
            bounding_box: OnceLock::new(),
            tolerance: self.tolerance,
        }
    }

    /// Build a partition of this object's boundary, `None` when there is nothing to partition.
    pub fn partition<P: Partition>(&self) -> Option<P> {
        P::build(&self.polygons, self.tolerance.epsilon)
    }

    /// [`FRONT`](plane::FRONT) outside, [`BACK`] inside,
    /// [`COPLANAR`](plane::COPLANAR) on the boundary. Empty objects contain nothing.
    pub fn classify_point(&self, point: &Point3<Real>) -> i8 {
        match self.partition::<Node>() {
            Some(tree) => tree.classify_point(point, self.tolerance.epsilon),
            None => plane::FRONT,
        }
    }

    /// `true` when `point` is strictly inside the solid.
    pub fn contains_point(&self, point: &Point3<Real>) -> bool {
        self.classify_point(point) == BACK
    }

    /// Enclosed volume by the divergence theorem; negative for inside-out solids.
    pub fn volume(&self) -> Real {
        self.polygons
            .iter()
            .flat_map(|p| p.triangulate_fan())
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)))
            .sum::<Real>()
            / 6.0
    }

    /// Sum of the polygons' area vectors; zero for a closed boundary.
    pub fn area_vector(&self) -> Vector3<Real> {
        self.polygons
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.area_vector())
    }

    /// `true` when the area vectors cancel, i.e. the boundary has no open side.
    pub fn is_closed(&self) -> bool {
        let total: Real = self.polygons.iter().map(|p| p.area_vector().norm()).sum();
        !self.is_empty() && self.area_vector().norm() <= self.tolerance.epsilon * total.max(1.0)
    }

    pub(crate) fn compute_bounding_box(&self) -> Aabb {
        let mut min_x = Real::MAX;
        let mut min_y = Real::MAX;
        let mut min_z = Real::MAX;
        let mut max_x = -Real::MAX;
        let mut max_y = -Real::MAX;
        let mut max_z = -Real::MAX;

        for v in self.polygons.iter().flat_map(|p| &p.vertices) {
            min_x = *partial_min(&min_x, &v.pos.x).unwrap_or(&min_x);
            min_y = *partial_min(&min_y, &v.pos.y).unwrap_or(&min_y);
            min_z = *partial_min(&min_z, &v.pos.z).unwrap_or(&min_z);

            max_x = *partial_max(&max_x, &v.pos.x).unwrap_or(&max_x);
            max_y = *partial_max(&max_y, &v.pos.y).unwrap_or(&max_y);
            max_z = *partial_max(&max_z, &v.pos.z).unwrap_or(&max_z);
        }

        // No polygons: a trivial AABB at the origin
        if min_x > max_x {
            return Aabb::new(Point3::origin(), Point3::origin());
        }

        Aabb::new(
            Point3::new(min_x, min_y, min_z),
            Point3::new(max_x, max_y, max_z),
        )
    }
}

//! Traits decoupling the boolean engine from the partition it clips against

use crate::float_types::Real;
use crate::mesh::plane::{BACK, COPLANAR, FRONT, Plane};
use crate::mesh::polygon::Polygon;
use nalgebra::Point3;

/// A spatial partition of a closed solid.
///
/// `invert == false` keeps what lies outside the solid, `invert == true` keeps what
/// lies inside.
pub trait Partition: Sized {
    /// Build a partition from the boundary polygons of a solid.
    ///
    /// Returns `None` when no polygon has a usable plane.
    fn build<S: Clone>(polygons: &[Polygon<S>], epsilon: Real) -> Option<Self>;

    /// Split `polygons` into the fragments inside and outside the solid, in that order.
    fn split_polygons<S: Clone>(
        &self,
        polygons: &[Polygon<S>],
        epsilon: Real,
    ) -> (Vec<Polygon<S>>, Vec<Polygon<S>>);

    /// Clip each polygon against the solid.
    ///
    /// A polygon with nothing on the rejected side is returned unchanged; otherwise
    /// only its kept fragments are returned. Fragments keep their source polygon's
    /// plane and provenance.
    fn clip_polygons<S: Clone>(
        &self,
        polygons: &[Polygon<S>],
        invert: bool,
        epsilon: Real,
    ) -> Vec<Polygon<S>>;

    /// [`FRONT`] outside, [`BACK`] inside, [`COPLANAR`] on the boundary.
    fn classify_point(&self, point: &Point3<Real>, epsilon: Real) -> i8;

    /// Convenience wrapper over [`Partition::classify_point`].
    fn contains_point(&self, point: &Point3<Real>, epsilon: Real) -> bool {
        self.classify_point(point, epsilon) == BACK
    }
}

/// Trait for picking splitting planes
pub trait SplittingPlaneStrategy {
    /// Pick a splitting plane from a non-empty set of polygons
    fn pick_splitting_plane<S: Clone>(&self, polygons: &[Polygon<S>], epsilon: Real) -> Plane;
}

/// Always split on the first polygon's plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstPolygonStrategy;

impl SplittingPlaneStrategy for FirstPolygonStrategy {
    fn pick_splitting_plane<S: Clone>(&self, polygons: &[Polygon<S>], _epsilon: Real) -> Plane {
        polygons[0].plane.clone()
    }
}

/// Score a sample of candidate planes by how many polygons they cut and how evenly
/// they divide the rest; lowest score wins.
#[derive(Debug, Clone, Copy)]
pub struct BalancedSplittingStrategy {
    pub span_weight: Real,
    pub balance_weight: Real,
    pub sample_size: usize,
}

impl Default for BalancedSplittingStrategy {
    fn default() -> Self {
        Self {
            span_weight: 8.0,
            balance_weight: 1.0,
            sample_size: 20,
        }
    }
}

impl SplittingPlaneStrategy for BalancedSplittingStrategy {
    fn pick_splitting_plane<S: Clone>(&self, polygons: &[Polygon<S>], epsilon: Real) -> Plane {
        let mut best_plane = &polygons[0].plane;
        let mut best_score = Real::MAX;

        for candidate in polygons.iter().take(self.sample_size.max(1)) {
            let plane = &candidate.plane;
            let (num_front, num_back, num_spanning) = polygons
                .iter()
                .map(|poly| match plane.classify_polygon(poly, epsilon) {
                    COPLANAR => (0, 0, 0),
                    FRONT => (1, 0, 0),
                    BACK => (0, 1, 0),
                    _ => (0, 0, 1),
                })
                .fold((0i64, 0i64, 0i64), |acc, x| {
                    (acc.0 + x.0, acc.1 + x.1, acc.2 + x.2)
                });

            let score = self.span_weight * num_spanning as Real
                + self.balance_weight * ((num_front - num_back) as Real).abs();

            if score < best_score {
                best_score = score;
                best_plane = plane;
            }
        }

        best_plane.clone()
    }
}

//! Solid-leaf [BSP](https://en.wikipedia.org/wiki/Binary_space_partitioning) trees used to
//! classify and clip polygons against a closed solid.
//!
//! The tree stores splitting planes only. Walking a point or polygon down the tree ends
//! in an outside leaf (missing front child) or an inside leaf (missing back child).

pub mod node;
pub mod serial;
pub mod traits;

pub use node::Node;
pub use serial::SerialBspOps;
pub use traits::{
    BalancedSplittingStrategy, FirstPolygonStrategy, Partition, SplittingPlaneStrategy,
};

use crate::float_types::Real;
use crate::mesh::polygon::Polygon;
use nalgebra::Point3;

impl Partition for Node {
    fn build<S: Clone>(polygons: &[Polygon<S>], epsilon: Real) -> Option<Self> {
        SerialBspOps::new().build(polygons, epsilon)
    }

    fn split_polygons<S: Clone>(
        &self,
        polygons: &[Polygon<S>],
        epsilon: Real,
    ) -> (Vec<Polygon<S>>, Vec<Polygon<S>>) {
        SerialBspOps::new().split_polygons(self, polygons, epsilon)
    }

    fn clip_polygons<S: Clone>(
        &self,
        polygons: &[Polygon<S>],
        invert: bool,
        epsilon: Real,
    ) -> Vec<Polygon<S>> {
        SerialBspOps::new().clip_polygons(self, polygons, invert, epsilon)
    }

    fn classify_point(&self, point: &Point3<Real>, epsilon: Real) -> i8 {
        SerialBspOps::new().classify_point(self, point, epsilon)
    }
}

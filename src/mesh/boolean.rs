//! Boolean operations expressed as clip sequences against two partitions.
//!
//! `clip(P, polys, invert)` keeps the parts of `polys` outside the solid `P`
//! (`invert == false`) or inside it (`invert == true`). Partitions are always built
//! from the complete operands; the bounding-box filter only decides which polygons
//! need clipping at all.

use crate::float_types::Real;
use crate::float_types::parry3d::bounding_volume::{Aabb, BoundingVolume};
use crate::mesh::CsgObject;
use crate::mesh::bsp::{Node, Partition};
use crate::mesh::polygon::Polygon;
use crate::traits::CsgOps;
use nalgebra::{Matrix3, Matrix4};

/// Split polygons into (may_touch, cannot_touch) using bounding‑box tests
fn partition_polys<S: Clone>(
    polys: &[Polygon<S>],
    other_bb: &Aabb,
) -> (Vec<Polygon<S>>, Vec<Polygon<S>>) {
    let mut maybe = Vec::new();
    let mut never = Vec::new();
    for p in polys {
        if p.bounding_box().intersects(other_bb) {
            maybe.push(p.clone());
        } else {
            never.push(p.clone());
        }
    }
    (maybe, never)
}

fn flip_all<S: Clone>(polys: &mut [Polygon<S>]) {
    for p in polys {
        p.flip();
    }
}

impl<S: Clone> CsgObject<S> {
    /// Bounding box grown by the classification tolerance so touching faces still clip.
    fn loose_bounding_box(&self) -> Aabb {
        self.compute_bounding_box()
            .loosened(self.tolerance.epsilon * 10.0)
    }

    /// `(may_touch, cannot_touch)` split of this object's polygons against `other`.
    ///
    /// Only valid when both sides are closed solids of positive volume. An open or
    /// inside-out partition reaches past its bounding box, so everything is clipped.
    fn clip_candidates(&self, other: &Self) -> (Vec<Polygon<S>>, Vec<Polygon<S>>) {
        let bounded = |o: &Self| o.is_closed() && o.volume() > 0.0;
        if !bounded(self) || !bounded(other) {
            return (self.polygons.clone(), Vec::new());
        }
        partition_polys(&self.polygons, &other.loose_bounding_box())
    }

    fn build_pair<P: Partition>(&self, other: &Self) -> Option<(P, P)> {
        let epsilon = self.tolerance.epsilon;
        let a = P::build(&self.polygons, epsilon)?;
        let b = P::build(&other.polygons, epsilon)?;
        Some((a, b))
    }

    /// Union with a caller-chosen partition type.
    pub fn union_with<P: Partition>(&self, other: &Self) -> Self {
        let Some((pa, pb)) = self.build_pair::<P>(other) else {
            log::debug!("union with empty operand");
            return if other.is_empty() {
                self.clone()
            } else {
                self.derived(other.polygons.clone())
            };
        };
        let epsilon = self.tolerance.epsilon;

        let (a_clip, a_passthru) = self.clip_candidates(other);
        let (b_clip, b_passthru) = other.clip_candidates(self);

        let ap = pb.clip_polygons(&a_clip, false, epsilon);

        let mut bp = pa.clip_polygons(&b_clip, false, epsilon);
        flip_all(&mut bp);
        let mut bp = pa.clip_polygons(&bp, false, epsilon);
        flip_all(&mut bp);

        let mut polygons = ap;
        polygons.extend(a_passthru);
        polygons.extend(bp);
        polygons.extend(b_passthru);
        self.derived(polygons)
    }

    /// Difference with a caller-chosen partition type.
    ///
    /// Cavity walls are `other`'s polygons flipped inward and keep `other`'s provenance.
    pub fn subtract_with<P: Partition>(&self, other: &Self) -> Self {
        let Some((pa, pb)) = self.build_pair::<P>(other) else {
            log::debug!("subtract with empty operand");
            return self.clone();
        };
        let epsilon = self.tolerance.epsilon;

        let (mut a_clip, a_passthru) = self.clip_candidates(other);
        let (b_clip, _b_passthru) = other.clip_candidates(self);

        flip_all(&mut a_clip);
        let mut ap = pb.clip_polygons(&a_clip, false, epsilon);
        let mut bp = pa.clip_polygons(&b_clip, true, epsilon);
        flip_all(&mut ap);
        flip_all(&mut bp);
        let bp = pa.clip_polygons(&bp, true, epsilon);

        let mut polygons = ap;
        polygons.extend(a_passthru);
        polygons.extend(bp);
        self.derived(polygons)
    }

    /// Intersection with a caller-chosen partition type.
    pub fn intersect_with<P: Partition>(&self, other: &Self) -> Self {
        let Some((pa, pb)) = self.build_pair::<P>(other) else {
            log::debug!("intersect with empty operand");
            return self.derived(Vec::new());
        };
        let epsilon = self.tolerance.epsilon;

        let (mut a_clip, _a_passthru) = self.clip_candidates(other);
        let (b_clip, _b_passthru) = other.clip_candidates(self);

        flip_all(&mut a_clip);
        let mut bp = pa.clip_polygons(&b_clip, true, epsilon);
        flip_all(&mut bp);
        let ap = pb.clip_polygons(&a_clip, true, epsilon);
        let bp = pa.clip_polygons(&bp, true, epsilon);

        let mut polygons = ap;
        polygons.extend(bp);
        flip_all(&mut polygons);
        self.derived(polygons)
    }
}

impl<S: Clone> CsgOps for CsgObject<S> {
    fn new() -> Self {
        CsgObject::new()
    }

    /// Return a new object representing the union of the two objects.
    ///
    /// ```text
    /// let c = a.union(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |       +----+
    ///     +----+--+    |       +----+       |
    ///          |   b   |            |   c   |
    ///          |       |            |       |
    ///          +-------+            +-------+
    /// ```
    fn union(&self, other: &Self) -> Self {
        self.union_with::<Node>(other)
    }

    /// Return a new object representing `self` with `other` carved out.
    ///
    /// ```text
    /// let c = a.subtract(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |    +--+
    ///     +----+--+    |       +----+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    fn subtract(&self, other: &Self) -> Self {
        self.subtract_with::<Node>(other)
    }

    /// Return a new object representing the space shared by both objects.
    ///
    /// ```text
    /// let c = a.intersect(b);
    ///     +-------+
    ///     |       |
    ///     |   a   |
    ///     |    +--+----+   =   +--+
    ///     +----+--+    |       +--+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    fn intersect(&self, other: &Self) -> Self {
        self.intersect_with::<Node>(other)
    }

    /// Flip inside and outside.
    fn inverse(&self) -> Self {
        let mut polygons = self.polygons.clone();
        flip_all(&mut polygons);
        self.derived(polygons)
    }

    /// Apply an affine map to every vertex.
    ///
    /// Planes are recomputed from the moved vertices and normals use the inverse
    /// transpose. Polygons that become degenerate are dropped. A mirroring map
    /// (negative determinant) reverses the winding so the boundary still faces out.
    fn transformed(&self, mat: &Matrix4<Real>) -> Self {
        let normal_mat = mat.try_inverse().map_or(*mat, |inv| inv.transpose());
        let linear: Matrix3<Real> = mat.fixed_view::<3, 3>(0, 0).into_owned();
        let mirrored = linear.determinant() < 0.0;

        let polygons = self
            .polygons
            .iter()
            .filter_map(|p| p.transformed(mat, &normal_mat))
            .map(|mut p| {
                // Vertex normals are already outward after the inverse transpose.
                if mirrored {
                    p.vertices.reverse();
                    p.plane.flip();
                }
                p
            })
            .collect();

        self.derived(polygons)
    }

    /// Returns a [`parry3d::bounding_volume::Aabb`](Aabb) spanning all polygons.
    fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| self.compute_bounding_box())
    }

    /// Invalidates object's cached bounding box.
    fn invalidate_bounding_box(&mut self) {
        self.bounding_box = std::sync::OnceLock::new();
    }
}

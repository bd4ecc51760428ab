//! Oriented planes and polygon splitting.

use crate::float_types::Real;
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector3};

// Plane-side classification. SPANNING is the bitwise OR of FRONT and BACK so a
// polygon's class is the OR of its vertices' classes.
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// Polygons produced by [`Plane::split_polygon`], one bucket per side.
#[derive(Debug, Clone)]
pub struct SplitResult<S: Clone> {
    pub coplanar_front: Vec<Polygon<S>>,
    pub coplanar_back: Vec<Polygon<S>>,
    pub front: Vec<Polygon<S>>,
    pub back: Vec<Polygon<S>>,
}

impl<S: Clone> Default for SplitResult<S> {
    fn default() -> Self {
        Self {
            coplanar_front: Vec::new(),
            coplanar_back: Vec::new(),
            front: Vec::new(),
            back: Vec::new(),
        }
    }
}

/// A plane `normal · p == w` with a unit normal.
///
/// Planes built from degenerate input carry NaN components; check with
/// [`Plane::is_valid`] before using them for classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub normal: Vector3<Real>,
    pub w: Real,
}

impl Plane {
    pub const fn from_normal(normal: Vector3<Real>, w: Real) -> Self {
        Plane { normal, w }
    }

    /// Plane through `a`, `b`, `c`, oriented counter-clockwise.
    ///
    /// Collinear or repeated points give a NaN plane.
    pub fn from_points(a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> Plane {
        let normal = (b - a).cross(&(c - a)).normalize();
        let w = normal.dot(&a.coords);
        Plane { normal, w }
    }

    /// Best-fit plane of a vertex ring using Newell's method, so rings whose
    /// first three corners happen to be collinear still get a usable plane.
    ///
    /// Zero-area rings give a NaN plane.
    pub fn from_vertices(vertices: &[Vertex]) -> Plane {
        let n = vertices.len();
        if n < 3 {
            return Plane::from_normal(Vector3::repeat(Real::NAN), Real::NAN);
        }
        let normal = newell_normal(vertices.iter().map(|v| &v.pos)).normalize();
        let w = normal.dot(&vertices[0].pos.coords);
        Plane { normal, w }
    }

    /// `false` for planes derived from degenerate input. `w == w` fails only for NaN.
    #[allow(clippy::eq_op)]
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.w == self.w && self.normal.iter().all(|c| c.is_finite())
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    pub fn flipped(&self) -> Plane {
        Plane::from_normal(-self.normal, -self.w)
    }

    #[inline]
    pub fn signed_distance(&self, point: &Point3<Real>) -> Real {
        self.normal.dot(&point.coords) - self.w
    }

    /// Classify a point as [`FRONT`], [`BACK`] or [`COPLANAR`] within `epsilon`.
    #[inline]
    pub fn orient_point(&self, point: &Point3<Real>, epsilon: Real) -> i8 {
        let t = self.signed_distance(point);
        if t < -epsilon {
            BACK
        } else if t > epsilon {
            FRONT
        } else {
            COPLANAR
        }
    }

    /// OR of the vertex classes of `polygon`.
    pub fn classify_polygon<S: Clone>(&self, polygon: &Polygon<S>, epsilon: Real) -> i8 {
        polygon
            .vertices
            .iter()
            .fold(COPLANAR, |acc, v| acc | self.orient_point(&v.pos, epsilon))
    }

    /// Split `polygon` by this plane.
    ///
    /// Coplanar polygons go to `coplanar_front` when they face the same way as the
    /// plane and to `coplanar_back` otherwise. Spanning polygons are cut with new
    /// corners at the edge crossings; both fragments keep the source polygon's
    /// plane and provenance. Fragments with fewer than three corners are dropped.
    pub fn split_polygon<S: Clone>(&self, polygon: &Polygon<S>, epsilon: Real) -> SplitResult<S> {
        let mut result = SplitResult::default();

        let types: Vec<i8> = polygon
            .vertices
            .iter()
            .map(|v| self.orient_point(&v.pos, epsilon))
            .collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, &t| acc | t);

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    result.coplanar_front.push(polygon.clone());
                } else {
                    result.coplanar_back.push(polygon.clone());
                }
            },
            FRONT => result.front.push(polygon.clone()),
            BACK => result.back.push(polygon.clone()),
            _ => {
                let n = polygon.vertices.len();
                let mut split_front = Vec::with_capacity(n + 1);
                let mut split_back = Vec::with_capacity(n + 1);

                for i in 0..n {
                    let j = (i + 1) % n;
                    let (type_i, type_j) = (types[i], types[j]);
                    let vertex_i = &polygon.vertices[i];
                    let vertex_j = &polygon.vertices[j];

                    if type_i != BACK {
                        split_front.push(vertex_i.clone());
                    }
                    if type_i != FRONT {
                        split_back.push(vertex_i.clone());
                    }

                    if (type_i | type_j) == SPANNING {
                        let denom = self.normal.dot(&(vertex_j.pos - vertex_i.pos));
                        if denom.abs() > Real::EPSILON {
                            let t = (self.w - self.normal.dot(&vertex_i.pos.coords)) / denom;
                            let crossing = vertex_i.interpolate(vertex_j, t);
                            split_front.push(crossing.clone());
                            split_back.push(crossing);
                        }
                    }
                }

                if split_front.len() >= 3 {
                    result.front.push(Polygon::with_plane(
                        split_front,
                        polygon.plane.clone(),
                        polygon.shared.clone(),
                    ));
                }
                if split_back.len() >= 3 {
                    result.back.push(Polygon::with_plane(
                        split_back,
                        polygon.plane.clone(),
                        polygon.shared.clone(),
                    ));
                }
            },
        }

        result
    }
}

/// Unnormalized Newell normal of a closed ring; its length is twice the ring's area.
pub fn newell_normal<'a>(points: impl Iterator<Item = &'a Point3<Real>> + Clone) -> Vector3<Real> {
    let mut normal = Vector3::zeros();
    let next = points.clone().cycle().skip(1);
    for (p, q) in points.zip(next) {
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }
    normal
}

//! Import of host faces into polygons, triangulating faces with more than three corners.

use crate::errors::CsgError;
use crate::float_types::Real;
use crate::mesh::CsgObject;
use crate::mesh::plane::newell_normal;
use crate::mesh::polygon::{Polygon, build_orthonormal_basis};
use crate::mesh::provenance::Shared;
use crate::mesh::remesh::MeshData;
use crate::mesh::vertex::Vertex;
use geo::{LineString, Polygon as GeoPolygon, TriangulateEarcut, coord};
use nalgebra::Point3;

/// Triangulation of a planar point ring.
pub trait Triangulate {
    /// Flat list of indices into `points`, three per triangle.
    fn triangulate(&self, points: &[Point3<Real>]) -> Vec<usize>;
}

/// Ear-clipping via `geo`, after projecting the ring onto its best-fit plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarcutTriangulator;

impl Triangulate for EarcutTriangulator {
    fn triangulate(&self, points: &[Point3<Real>]) -> Vec<usize> {
        let n = points.len();
        if n < 3 {
            return Vec::new();
        }
        let normal = newell_normal(points.iter());
        if normal.norm_squared() <= Real::EPSILON * Real::EPSILON {
            return Vec::new();
        }

        let (u, v) = build_orthonormal_basis(normal);
        let origin = points[0];
        let ring: Vec<_> = points
            .iter()
            .map(|p| {
                let offset = p - origin;
                coord! { x: offset.dot(&u), y: offset.dot(&v) }
            })
            .collect();

        let triangulation =
            GeoPolygon::new(LineString::new(ring), Vec::new()).earcut_triangles_raw();

        // The closed ring repeats the first point at index n.
        triangulation
            .triangle_indices
            .into_iter()
            .map(|idx| idx % n)
            .collect()
    }
}

impl CsgObject<Shared> {
    /// Polygons for every face of `mesh`, tagged `(face index, face material)` of
    /// `object_id`.
    ///
    /// Host faces are clockwise, so every imported triangle is reversed. Faces with
    /// fewer than three corners and triangles without a plane are skipped.
    pub fn from_mesh_data(
        mesh: &MeshData,
        object_id: usize,
        triangulator: &impl Triangulate,
    ) -> Result<Self, CsgError> {
        let mut polygons = Vec::new();

        for (face_index, face) in mesh.faces.iter().enumerate() {
            if face.indices.len() < 3 {
                continue;
            }
            if let Some(&index) = face.indices.iter().find(|&&i| i >= mesh.vertices.len()) {
                return Err(CsgError::FaceIndexOutOfRange {
                    index,
                    len: mesh.vertices.len(),
                });
            }

            let shared = Shared::new(object_id, face_index, face.material);
            let points: Vec<Point3<Real>> =
                face.indices.iter().map(|&i| mesh.vertices[i]).collect();

            if points.len() == 3 {
                polygons.extend(reversed_triangle(&points, [0, 1, 2], shared));
                continue;
            }

            let face_normal = newell_normal(points.iter());
            for tri in triangulator.triangulate(&points).chunks_exact(3) {
                let [a, b, c] = [tri[0], tri[1], tri[2]];
                let tri_normal = (points[b] - points[a]).cross(&(points[c] - points[a]));
                let ordered = if tri_normal.dot(&face_normal) < 0.0 {
                    [a, c, b]
                } else {
                    [a, b, c]
                };
                polygons.extend(reversed_triangle(&points, ordered, shared));
            }
        }

        Ok(CsgObject::from_polygons(polygons))
    }
}

fn reversed_triangle(
    points: &[Point3<Real>],
    [a, b, c]: [usize; 3],
    shared: Shared,
) -> Option<Polygon<Shared>> {
    let vertices = [c, b, a].map(|i| Vertex::at(points[i])).to_vec();
    let mut polygon = Polygon::try_new(vertices, Some(shared))?;
    let normal = polygon.plane.normal;
    for v in &mut polygon.vertices {
        v.normal = normal;
    }
    Some(polygon)
}

//! Re-materialization: polygons back into a welded, indexed vertex/face mesh.

use crate::float_types::Real;
use crate::mesh::CsgObject;
use crate::mesh::merge::merge_polygons;
use crate::mesh::provenance::Provenance;
use nalgebra::Point3;

/// Destination of re-materialization. Only appends are ever issued.
pub trait HostMesh {
    fn append_vertex(&mut self, position: Point3<Real>) -> usize;
    fn append_face(&mut self, indices: Vec<usize>, material: usize) -> usize;
}

/// One face of a [`MeshData`]: vertex indices in host winding order plus a material.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Face {
    pub indices: Vec<usize>,
    pub material: usize,
}

impl Face {
    pub fn new(indices: Vec<usize>, material: usize) -> Self {
        Face { indices, material }
    }
}

/// Plain indexed mesh in host winding (clockwise seen from outside).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub vertices: Vec<Point3<Real>>,
    pub faces: Vec<Face>,
}

impl HostMesh for MeshData {
    fn append_vertex(&mut self, position: Point3<Real>) -> usize {
        self.vertices.push(position);
        self.vertices.len() - 1
    }

    fn append_face(&mut self, indices: Vec<usize>, material: usize) -> usize {
        self.faces.push(Face::new(indices, material));
        self.faces.len() - 1
    }
}

/// Controls for [`CsgObject::rematerialize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemeshOptions {
    /// Run the merge pass first.
    pub merge_faces: bool,
    /// Share vertices closer than the weld threshold; otherwise every corner is appended.
    pub weld_vertices: bool,
    /// Material for polygons without provenance.
    pub default_material: usize,
}

impl Default for RemeshOptions {
    fn default() -> Self {
        Self {
            merge_faces: true,
            weld_vertices: true,
            default_material: 0,
        }
    }
}

/// Tolerance weld over a linear list of emitted vertices.
///
/// Every lookup scans all vertices emitted so far, so welding `n` corners is O(n²).
#[derive(Debug, Clone)]
pub struct VertexWelder {
    emitted: Vec<(Point3<Real>, usize)>,
    threshold: Real,
}

impl VertexWelder {
    /// `threshold` is a squared distance.
    pub const fn new(threshold: Real) -> Self {
        Self {
            emitted: Vec::new(),
            threshold,
        }
    }

    /// Index of an emitted vertex within the threshold of `position`, appending a new
    /// one to `host` when there is none.
    pub fn index_of<H: HostMesh>(&mut self, host: &mut H, position: Point3<Real>) -> usize {
        if let Some(&(_, index)) = self
            .emitted
            .iter()
            .find(|(p, _)| (p - position).norm_squared() < self.threshold)
        {
            return index;
        }
        let index = host.append_vertex(position);
        self.emitted.push((position, index));
        index
    }

    fn position(&self, index: usize) -> Option<Point3<Real>> {
        self.emitted
            .iter()
            .find(|(_, i)| *i == index)
            .map(|(p, _)| *p)
    }

    /// `ring` with every emitted vertex lying inside one of its edges spliced into
    /// that edge, ordered along it.
    ///
    /// Clipping and merging leave corners of one face in the middle of a neighbour's
    /// edge. Splitting that edge makes both faces reference the same sub-edges.
    pub fn split_edges(&self, ring: &[usize]) -> Vec<usize> {
        let mut out = Vec::with_capacity(ring.len());
        for (k, &a) in ring.iter().enumerate() {
            out.push(a);
            let b = ring[(k + 1) % ring.len()];
            let (Some(pa), Some(pb)) = (self.position(a), self.position(b)) else {
                continue;
            };
            let edge = pb - pa;
            let len2 = edge.norm_squared();
            if len2 < self.threshold {
                continue;
            }

            let mut inside: Vec<(Real, usize)> = self
                .emitted
                .iter()
                .filter(|(_, i)| *i != a && *i != b)
                .filter_map(|(p, i)| {
                    let t = (p - pa).dot(&edge) / len2;
                    if t <= 0.0 || t >= 1.0 {
                        return None;
                    }
                    let foot = pa + edge * t;
                    ((p - foot).norm_squared() < self.threshold).then_some((t, *i))
                })
                .collect();
            inside.sort_by(|x, y| x.0.total_cmp(&y.0));
            out.extend(inside.into_iter().map(|(_, i)| i));
        }
        out
    }

    pub fn len(&self) -> usize {
        self.emitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitted.is_empty()
    }
}

impl<S: Provenance + Send + Sync> CsgObject<S> {
    /// Copy of this object with coplanar fragments of each source face merged.
    pub fn merged(&self) -> Self {
        self.derived(merge_polygons(self.polygons.clone(), &self.tolerance))
    }

    /// Append this object's boundary to `host`.
    ///
    /// Face winding is reversed into host order and each face takes its material from
    /// provenance. Faces that welding collapses below three distinct corners are skipped.
    /// With welding on, every vertex is emitted before any face so that corners
    /// sitting on another face's edge can be spliced into it.
    pub fn rematerialize<H: HostMesh>(&self, host: &mut H, options: &RemeshOptions) {
        let merged;
        let source = if options.merge_faces {
            merged = self.merged();
            &merged
        } else {
            self
        };

        let mut welder = VertexWelder::new(self.tolerance.weld_threshold());
        let mut faces: Vec<(Vec<usize>, usize)> = Vec::with_capacity(source.polygons.len());
        let mut corners = 0;
        let mut skipped = 0;

        for polygon in &source.polygons {
            let mut indices: Vec<usize> = polygon
                .vertices
                .iter()
                .rev()
                .map(|v| {
                    if options.weld_vertices {
                        welder.index_of(host, v.pos)
                    } else {
                        host.append_vertex(v.pos)
                    }
                })
                .collect();
            corners += indices.len();

            indices.dedup();
            while indices.len() > 1 && indices.first() == indices.last() {
                indices.pop();
            }
            if indices.len() < 3 {
                skipped += 1;
                continue;
            }

            let material = polygon
                .shared
                .as_ref()
                .and_then(Provenance::material)
                .unwrap_or(options.default_material);
            faces.push((indices, material));
        }

        let mut spliced = 0;
        for (indices, material) in faces {
            let indices = if options.weld_vertices {
                let split = welder.split_edges(&indices);
                spliced += split.len() - indices.len();
                split
            } else {
                indices
            };
            host.append_face(indices, material);
        }

        log::debug!(
            "welded {} corners into {} vertices, spliced {} edge vertices, skipped {} collapsed faces",
            corners,
            if options.weld_vertices { welder.len() } else { corners },
            spliced,
            skipped
        );
    }

    /// Re-materialize into a fresh [`MeshData`].
    pub fn to_mesh_data(&self, options: &RemeshOptions) -> MeshData {
        let mut mesh = MeshData::default();
        self.rematerialize(&mut mesh, options);
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::polygon::Polygon;
    use crate::mesh::provenance::Shared;
    use crate::shapes;

    #[test]
    fn cube_welds_to_eight_vertices() {
        let cube = shapes::cube::<()>(2.0).expect("valid size").with_provenance(1, 4);
        let mesh = cube.to_mesh_data(&RemeshOptions::default());
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.faces.len(), 6);
        assert!(mesh.faces.iter().all(|f| f.material == 4));
    }

    #[test]
    fn without_welding_every_corner_is_emitted() {
        let cube = shapes::cube::<()>(2.0).expect("valid size").with_provenance(1, 0);
        let options = RemeshOptions {
            weld_vertices: false,
            ..RemeshOptions::default()
        };
        assert_eq!(cube.to_mesh_data(&options).vertices.len(), 24);
    }

    #[test]
    fn winding_is_reversed_for_host() {
        let plane = shapes::plane::<Shared>(2.0).expect("valid size");
        let mesh = plane.to_mesh_data(&RemeshOptions {
            default_material: 3,
            ..RemeshOptions::default()
        });
        let face = &mesh.faces[0];
        assert_eq!(face.material, 3);
        let [a, b, c] = [0, 1, 2].map(|k| mesh.vertices[face.indices[k]]);
        let normal = (b - a).cross(&(c - a));
        assert!(normal.y < 0.0);
    }

    #[test]
    fn near_duplicates_share_an_index() {
        let mut mesh = MeshData::default();
        let mut welder = VertexWelder::new(1e-10);
        let a = welder.index_of(&mut mesh, Point3::new(1.0, 2.0, 3.0));
        let b = welder.index_of(&mut mesh, Point3::new(1.0, 2.0, 3.0 + 1e-7));
        let c = welder.index_of(&mut mesh, Point3::new(1.0, 2.0, 3.1));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(mesh.vertices.len(), 2);
    }

    #[test]
    fn corners_on_an_edge_are_spliced_in_order() {
        let mut mesh = MeshData::default();
        let mut welder = VertexWelder::new(1e-10);
        let ring: Vec<usize> = [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]
            .iter()
            .map(|&(x, y)| welder.index_of(&mut mesh, Point3::new(x, y, 0.0)))
            .collect();
        let far = welder.index_of(&mut mesh, Point3::new(3.0, 0.0, 0.0));
        let near = welder.index_of(&mut mesh, Point3::new(1.0, 0.0, 0.0));
        let off = welder.index_of(&mut mesh, Point3::new(2.0, 0.5, 0.0));
        let beyond = welder.index_of(&mut mesh, Point3::new(6.0, 0.0, 0.0));

        let split = welder.split_edges(&ring);
        assert_eq!(split, vec![ring[0], near, far, ring[1], ring[2], ring[3]]);
        assert!(!split.contains(&off));
        assert!(!split.contains(&beyond));
    }

    #[test]
    fn t_junction_between_faces_is_closed() {
        // A 2x1 block whose top is one quad while the bottom is cut in two.
        let p = |x: Real, y: Real, z: Real| Point3::new(x, y, z);
        let shared = |face: usize| Some(Shared::new(face, face, 0));
        let polygons = vec![
            Polygon::from_positions(&[p(0., 0., 1.), p(2., 0., 1.), p(2., 1., 1.), p(0., 1., 1.)], shared(0)),
            Polygon::from_positions(&[p(0., 0., 0.), p(0., 1., 0.), p(1., 1., 0.), p(1., 0., 0.)], shared(1)),
            Polygon::from_positions(&[p(1., 0., 0.), p(1., 1., 0.), p(2., 1., 0.), p(2., 0., 0.)], shared(2)),
            Polygon::from_positions(&[p(0., 0., 0.), p(1., 0., 0.), p(2., 0., 0.), p(2., 0., 1.), p(0., 0., 1.)], shared(3)),
            Polygon::from_positions(&[p(0., 1., 0.), p(0., 1., 1.), p(2., 1., 1.), p(2., 1., 0.)], shared(4)),
            Polygon::from_positions(&[p(0., 0., 0.), p(0., 0., 1.), p(0., 1., 1.), p(0., 1., 0.)], shared(5)),
            Polygon::from_positions(&[p(2., 0., 0.), p(2., 1., 0.), p(2., 1., 1.), p(2., 0., 1.)], shared(6)),
        ];
        let block = CsgObject::from_polygons(polygons);
        assert!(block.area_vector().norm() < 1e-12);

        let options = RemeshOptions {
            merge_faces: false,
            ..RemeshOptions::default()
        };
        let mesh = block.to_mesh_data(&options);
        assert_eq!(mesh.vertices.len(), 10);
        let analysis = mesh.analyze_manifold();
        assert_eq!(analysis.boundary_edges, 0);
        assert!(analysis.is_manifold);
        assert!(analysis.consistent_orientation);
    }
}

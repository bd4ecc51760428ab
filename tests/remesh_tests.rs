mod support;

use csgweld::{
    CsgObject, Shared, Tolerance,
    float_types::Real,
    mesh::{
        polygon::Polygon,
        remesh::{HostMesh, MeshData, RemeshOptions},
    },
    shapes,
    traits::CsgOps,
};
use nalgebra::Point3;

use crate::support::tagged_cube;

/// Host that only counts appends.
#[derive(Default)]
struct CountingHost {
    vertices: usize,
    faces: Vec<(usize, usize)>,
}

impl HostMesh for CountingHost {
    fn append_vertex(&mut self, _position: Point3<Real>) -> usize {
        self.vertices += 1;
        self.vertices - 1
    }

    fn append_face(&mut self, indices: Vec<usize>, material: usize) -> usize {
        self.faces.push((indices.len(), material));
        self.faces.len() - 1
    }
}

#[test]
fn emitted_vertices_are_never_near_duplicates() {
    let part = tagged_cube(10.0, [0.0, 0.0, 0.0], 1)
        .subtract(&tagged_cube(4.0, [0.0, 0.0, 0.0], 2))
        .subtract(
            &shapes::cylinder::<()>(1.5, 12.0, 16)
                .expect("valid cylinder")
                .with_provenance(3, 1),
        );
    let mesh = part.to_mesh_data(&RemeshOptions::default());
    let threshold = part.tolerance.weld_threshold();

    for (i, a) in mesh.vertices.iter().enumerate() {
        for b in &mesh.vertices[i + 1..] {
            assert!((a - b).norm_squared() >= threshold);
        }
    }
    assert!(mesh.faces.iter().all(|f| f.indices.len() >= 3));
    assert!(mesh.faces.iter().any(|f| f.material == 1));
}

#[test]
fn faces_collapsed_by_welding_are_skipped() {
    let cube = tagged_cube(2.0, [0.0, 0.0, 0.0], 1);
    let speck: Polygon<Shared> = Polygon::from_positions(
        &[
            Point3::new(5.0, 5.0, 5.0),
            Point3::new(5.3, 5.0, 5.0),
            Point3::new(5.0, 5.3, 5.0),
        ],
        Some(Shared::new(9, 0, 0)),
    );
    let mut polygons = cube.polygons.clone();
    polygons.push(speck);

    // epsilon 0.1 welds points closer than 1.0.
    let coarse = CsgObject::from_polygons(polygons)
        .with_tolerance(Tolerance::default().with_epsilon(0.1));
    let mesh = coarse.to_mesh_data(&RemeshOptions::default());

    assert_eq!(mesh.faces.len(), 6);
    assert_eq!(mesh.vertices.len(), 9);
}

#[test]
fn host_only_receives_appends_in_host_winding() {
    let mut host = CountingHost::default();
    tagged_cube(2.0, [0.0, 0.0, 0.0], 1).rematerialize(&mut host, &RemeshOptions::default());
    assert_eq!(host.vertices, 8);
    assert_eq!(host.faces, vec![(4, 0); 6]);

    let mut mesh = MeshData::default();
    tagged_cube(2.0, [0.0, 0.0, 0.0], 1).rematerialize(&mut mesh, &RemeshOptions::default());
    // Host faces are clockwise seen from outside.
    for face in &mesh.faces {
        let [a, b, c] = [0, 1, 2].map(|k| mesh.vertices[face.indices[k]]);
        let normal = (b - a).cross(&(c - a));
        let center = (a.coords + c.coords) * 0.5;
        assert!(normal.dot(&center) < 0.0);
    }
}

#[test]
fn merging_can_be_switched_off() {
    let a = tagged_cube(2.0, [0.0, 0.0, 0.0], 1);
    let b = tagged_cube(2.0, [1.0, 1.0, 1.0], 2);
    let union = a.union(&b);

    let raw = union.to_mesh_data(&RemeshOptions {
        merge_faces: false,
        ..RemeshOptions::default()
    });
    let merged = union.to_mesh_data(&RemeshOptions::default());
    assert_eq!(raw.faces.len(), union.polygons.len());
    assert!(merged.faces.len() <= raw.faces.len());
}

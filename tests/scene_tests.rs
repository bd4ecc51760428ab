use approx::assert_relative_eq;
use csgweld::{
    CsgError, CsgObject,
    build::{BooleanOp, Builder, CsgNode, Dimensions, PrimitiveKind, SceneNode},
    float_types::Real,
    mesh::{
        import::EarcutTriangulator,
        remesh::{MeshData, RemeshOptions},
    },
    shapes,
};
use nalgebra::{Matrix4, Point3, Vector3};
use std::sync::{Arc, atomic::AtomicBool};

fn cube_node(name: &str, id: usize, size: Real) -> SceneNode {
    SceneNode::primitive(
        name,
        id,
        PrimitiveKind::Cube,
        Dimensions {
            size,
            ..Dimensions::default()
        },
    )
}

fn shifted(node: SceneNode) -> SceneNode {
    node.with_transform(Matrix4::new_translation(&Vector3::new(1.0, 1.0, 1.0)))
}

#[test]
fn operators_fold_children_in_parent_space() {
    let cases = [
        (BooleanOp::Union, 15.0),
        (BooleanOp::Sub, 7.0),
        (BooleanOp::And, 1.0),
        (BooleanOp::Inv, -15.0),
    ];
    for (op, volume) in cases {
        let scene = SceneNode::boolean(
            "root",
            0,
            op,
            vec![cube_node("a", 1, 2.0), shifted(cube_node("b", 2, 2.0))],
        );
        let solid = Builder::new().build(&scene).expect("scene builds");
        assert_relative_eq!(solid.volume(), volume, epsilon = 1e-9);
    }
}

#[test]
fn disabled_children_are_skipped() {
    let scene = SceneNode::boolean(
        "root",
        0,
        BooleanOp::Sub,
        vec![
            cube_node("a", 1, 2.0),
            SceneNode::new("off", 2, CsgNode::Disabled),
        ],
    );
    let solid = Builder::new().build(&scene).expect("scene builds");
    assert_relative_eq!(solid.volume(), 8.0, epsilon = 1e-12);
}

#[test]
fn references_reuse_earlier_objects() {
    let scene = SceneNode::boolean(
        "root",
        0,
        BooleanOp::Union,
        vec![
            cube_node("a", 1, 2.0),
            shifted(SceneNode::new("copy", 2, CsgNode::Reference("a".into()))),
        ],
    );
    let mut builder = Builder::new();
    let solid = builder.build(&scene).expect("scene builds");
    assert_relative_eq!(solid.volume(), 15.0, epsilon = 1e-9);
    assert!(builder.get("a").is_some());
    assert!(builder.get("copy").is_some());
}

#[test]
fn hollow_box_is_written_into_the_host() {
    let scene = SceneNode::boolean(
        "root",
        0,
        BooleanOp::Sub,
        vec![cube_node("outer", 1, 10.0), cube_node("inner", 2, 4.0)],
    );
    let mut host = MeshData::default();
    Builder::new()
        .build_into(&scene, &mut host, &RemeshOptions::default())
        .expect("scene builds");

    assert_eq!(host.vertices.len(), 16);
    assert_eq!(host.faces.len(), 12);
    assert!(host.analyze_manifold().is_manifold);
}

#[test]
fn primitive_material_reaches_host_faces() {
    let scene = SceneNode::new(
        "box",
        3,
        CsgNode::Primitive {
            kind: "BOX".parse().expect("known primitive"),
            dimensions: Dimensions {
                width: 1.0,
                height: 2.0,
                depth: 3.0,
                ..Dimensions::default()
            },
            material: 7,
        },
    );
    let mut host = MeshData::default();
    Builder::new()
        .build_into(&scene, &mut host, &RemeshOptions::default())
        .expect("scene builds");
    assert_eq!(host.faces.len(), 6);
    assert!(host.faces.iter().all(|f| f.material == 7));
}

#[test]
fn mesh_nodes_import_host_geometry() {
    let cube: CsgObject<()> = shapes::cube(2.0).expect("valid size");
    let host_cube = cube.with_provenance(1, 2).to_mesh_data(&RemeshOptions::default());

    let scene = SceneNode::boolean(
        "root",
        0,
        BooleanOp::Sub,
        vec![
            SceneNode::new("imported", 5, CsgNode::Mesh(host_cube)),
            shifted(cube_node("cutter", 6, 2.0)),
        ],
    );
    let solid = Builder::new().build(&scene).expect("scene builds");
    assert_relative_eq!(solid.volume(), 7.0, epsilon = 1e-9);
    assert!(solid.area_vector().norm() < 1e-9);

    // Faces cut from the imported cube keep its material.
    let host = solid.to_mesh_data(&RemeshOptions::default());
    assert!(host.faces.iter().any(|f| f.material == 2));
    assert!(host.faces.iter().any(|f| f.material == 0));
}

#[test]
fn import_round_trip_keeps_the_solid() {
    let cube: CsgObject<()> = shapes::cube(2.0).expect("valid size");
    let host_cube = cube.with_provenance(1, 0).to_mesh_data(&RemeshOptions::default());
    let imported = CsgObject::from_mesh_data(&host_cube, 1, &EarcutTriangulator)
        .expect("indices in range");

    assert_eq!(imported.polygons.len(), 12);
    assert_relative_eq!(imported.volume(), 8.0, epsilon = 1e-12);
    assert!(imported.contains_point(&Point3::origin()));

    let again = imported.to_mesh_data(&RemeshOptions::default());
    assert_eq!(again.vertices.len(), 8);
    assert_eq!(again.faces.len(), 6);
}

#[test]
fn failures_surface_as_errors() {
    assert_eq!(
        "TORUS".parse::<PrimitiveKind>().unwrap_err(),
        CsgError::UnsupportedPrimitive("TORUS".into())
    );

    let bad = SceneNode::primitive(
        "flat",
        1,
        PrimitiveKind::Sphere,
        Dimensions {
            radius: -1.0,
            ..Dimensions::default()
        },
    );
    assert!(matches!(
        Builder::new().build(&bad),
        Err(CsgError::InvalidParameter { name: "radius", .. })
    ));

    let mut builder = Builder::new().with_cancel_flag(Arc::new(AtomicBool::new(true)));
    assert_eq!(
        builder
            .build_into(&cube_node("a", 1, 1.0), &mut MeshData::default(), &RemeshOptions::default())
            .unwrap_err(),
        CsgError::Cancelled
    );
}

#[test]
fn empty_operator_yields_an_empty_solid() {
    let scene = SceneNode::boolean("root", 0, BooleanOp::And, Vec::new());
    let mut host = MeshData::default();
    Builder::new()
        .build_into(&scene, &mut host, &RemeshOptions::default())
        .expect("scene builds");
    assert!(host.vertices.is_empty());
    assert!(host.faces.is_empty());
}

mod support;

use approx::assert_relative_eq;
use csgweld::{
    CsgObject, Shared, Tolerance,
    mesh::{merge::merge_polygons, polygon::Polygon},
    traits::CsgOps,
};
use nalgebra::Point3;

use crate::support::{fragment_at_origin, tagged_cube};

#[test]
fn octant_fragments_of_a_cube_merge_back_to_six_quads() {
    let cube = tagged_cube(2.0, [0.0, 0.0, 0.0], 4);
    let fragments = fragment_at_origin(&cube);
    assert_eq!(fragments.len(), 24);

    let merged = merge_polygons(fragments, &Tolerance::default());
    assert_eq!(merged.len(), 6);
    for p in &merged {
        assert_eq!(p.vertices.len(), 4);
        assert_relative_eq!(p.area_vector().norm(), 4.0, epsilon = 1e-12);
    }
}

#[test]
fn merge_never_changes_the_solid() {
    let cube = tagged_cube(2.0, [0.0, 0.0, 0.0], 4);
    let fragmented = CsgObject::from_polygons(fragment_at_origin(&cube));
    let merged = fragmented.merged();

    assert_relative_eq!(merged.volume(), fragmented.volume(), epsilon = 1e-12);
    for p in [[0.5, 0.5, 0.5], [-0.9, 0.2, 0.1], [3.0, 0.0, 0.0]] {
        let p = Point3::from(p);
        assert_eq!(merged.contains_point(&p), fragmented.contains_point(&p));
    }
}

#[test]
fn merged_polygons_keep_their_provenance() {
    let cube = tagged_cube(2.0, [0.0, 0.0, 0.0], 4);
    let merged = merge_polygons(fragment_at_origin(&cube), &Tolerance::default());

    let mut faces: Vec<usize> = merged
        .iter()
        .map(|p| p.shared.expect("tagged").face.id)
        .collect();
    faces.sort_unstable();
    assert_eq!(faces, vec![0, 1, 2, 3, 4, 5]);
    assert!(merged.iter().all(|p| p.shared.is_some_and(|s| s.object.id == 4)));
}

#[test]
fn fragments_without_provenance_are_left_alone() {
    let cube = tagged_cube(2.0, [0.0, 0.0, 0.0], 4).map_shared::<Shared>(|_, _| None);
    let fragments = fragment_at_origin(&cube);
    assert_eq!(merge_polygons(fragments, &Tolerance::default()).len(), 24);
}

#[test]
fn boolean_fragments_merge_per_face() {
    let a = tagged_cube(2.0, [0.0, 0.0, 0.0], 1);
    let b = tagged_cube(2.0, [1.0, 1.0, 1.0], 2);
    let union = a.union(&b);
    let merged = union.merged();

    assert!(merged.polygons.len() <= union.polygons.len());
    assert_relative_eq!(merged.volume(), 15.0, epsilon = 1e-9);
    assert!(merged.area_vector().norm() < 1e-9);
    // No two surviving polygons of the same face can be spliced any further.
    assert_eq!(
        merge_polygons(merged.polygons.clone(), &merged.tolerance).len(),
        merged.polygons.len()
    );
}

#[test]
fn opposite_copies_are_not_merged() {
    let shared = Some(Shared::new(1, 0, 0));
    let tri = Polygon::from_positions(
        &[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        shared,
    );
    let merged = merge_polygons(vec![tri.clone(), tri.flipped()], &Tolerance::default());
    assert_eq!(merged.len(), 2);
}

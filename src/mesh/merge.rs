//! Re-welding of coplanar fragments left behind by clipping.
//!
//! Every clip can cut an original face into many small polygons. Fragments that trace
//! back to the same face of the same object are spliced together along shared edges
//! until no pair in the group can be joined any more. The solid itself never changes,
//! only how its boundary is cut into polygons.

use crate::config::Tolerance;
use crate::float_types::Real;
use crate::mesh::polygon::Polygon;
use crate::mesh::provenance::{MergeKey, Provenance};
use crate::mesh::vertex::Vertex;
use hashbrown::HashMap;
use nalgebra::Point3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Merge fragments sharing a provenance key. Polygons without provenance pass
/// through unchanged.
pub fn merge_polygons<S>(polygons: Vec<Polygon<S>>, tolerance: &Tolerance) -> Vec<Polygon<S>>
where
    S: Provenance + Send + Sync,
{
    let before = polygons.len();
    let mut output = Vec::with_capacity(before);
    let mut groups: Vec<Vec<Polygon<S>>> = Vec::new();
    let mut group_index: HashMap<MergeKey, usize> = HashMap::new();

    for polygon in polygons {
        let Some(key) = polygon.shared.as_ref().map(Provenance::merge_key) else {
            output.push(polygon);
            continue;
        };
        let index = *group_index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[index].push(polygon);
    }

    #[cfg(not(feature = "parallel"))]
    let merged: Vec<Vec<Polygon<S>>> = groups
        .into_iter()
        .map(|group| merge_group(group, tolerance))
        .collect();

    #[cfg(feature = "parallel")]
    let merged: Vec<Vec<Polygon<S>>> = groups
        .into_par_iter()
        .map(|group| merge_group(group, tolerance))
        .collect();

    output.extend(merged.into_iter().flatten());
    log::debug!("merged {} -> {} polygons", before, output.len());
    output
}

/// Merge one provenance group to a fixpoint.
fn merge_group<S: Clone>(group: Vec<Polygon<S>>, tolerance: &Tolerance) -> Vec<Polygon<S>> {
    let mut alive: Vec<Option<Polygon<S>>> = group.into_iter().map(Some).collect();
    let mut passes = 0;

    loop {
        passes += 1;
        let mut merged_any = false;

        for i in 0..alive.len() {
            for j in (i + 1)..alive.len() {
                let (Some(p1), Some(p2)) = (&alive[i], &alive[j]) else {
                    continue;
                };
                if let Some(merged) = try_merge(p1, p2, tolerance) {
                    alive[i] = Some(merged);
                    alive[j] = None;
                    merged_any = true;
                }
            }
        }

        if !merged_any {
            break;
        }
    }

    let survivors: Vec<Polygon<S>> = alive.into_iter().flatten().collect();
    log::trace!("group settled after {} passes with {} polygons", passes, survivors.len());
    survivors
}

/// Splice `p1` and `p2` along the first overlapping edge pair.
///
/// The merged ring carries `p1`'s plane and provenance. Returns `None` when no
/// edges overlap or the cleaned ring has fewer than three corners; neither input
/// is modified.
pub fn try_merge<S: Clone>(
    p1: &Polygon<S>,
    p2: &Polygon<S>,
    tolerance: &Tolerance,
) -> Option<Polygon<S>> {
    let vs1 = &p1.vertices;
    let vs2 = &p2.vertices;
    let (n1, n2) = (vs1.len(), vs2.len());
    if n1 < 3 || n2 < 3 {
        return None;
    }

    for i in 0..n1 {
        let i2 = (i + 1) % n1;
        for j in 0..n2 {
            let j2 = (j + n2 - 1) % n2;
            if !overwrap(
                &vs1[i].pos,
                &vs1[i2].pos,
                &vs2[j].pos,
                &vs2[j2].pos,
                tolerance.merge_epsilon,
            ) {
                continue;
            }

            // p1 from the far end of the shared edge round to its start, then p2 likewise.
            let mut ring: Vec<Vertex> = (0..n1)
                .map(|k| vs1[(i2 + k) % n1].clone())
                .chain((0..n2).map(|k| vs2[(j + k) % n2].clone()))
                .collect();
            clean_edge(&mut ring, tolerance);

            if ring.len() < 3 {
                return None;
            }
            return Some(Polygon::with_plane(ring, p1.plane.clone(), p1.shared.clone()));
        }
    }

    None
}

/// Remove collinear corners, then mirrored "bowtie" corner pairs left by splicing.
///
/// Stops early once fewer than three corners remain.
pub fn clean_edge(ring: &mut Vec<Vertex>, tolerance: &Tolerance) {
    let epsilon = tolerance.merge_epsilon;
    let threshold = tolerance.weld_threshold();

    loop {
        let mut update = false;
        let mut k = 0;
        while k < ring.len() {
            let len = ring.len();
            if len < 3 {
                return;
            }
            let d = (k + 1) % len;
            if collinear(&ring[k].pos, &ring[d].pos, &ring[(k + 2) % len].pos, epsilon) {
                ring.remove(d);
                update = true;
            }
            k += 1;
        }
        if !update {
            break;
        }
    }

    while ring.len() > 5 {
        let Some((i, j)) = find_bowtie(ring, threshold) else {
            break;
        };
        ring.remove(i.max(j));
        ring.remove(i.min(j));
    }
}

/// Corner pair `(i, j)` whose neighbourhoods mirror each other and whose triangle
/// at `i` contains no other corner.
fn find_bowtie(ring: &[Vertex], threshold: Real) -> Option<(usize, usize)> {
    let len = ring.len();
    let at = |k: usize| &ring[k % len].pos;

    for i in 0..len {
        let (iv0, iv1, iv2) = (at(i + len - 1), at(i), at(i + 1));
        for j in (0..len).filter(|&j| j != i) {
            let (jv0, jv1, jv2) = (at(j + 1), at(j), at(j + len - 1));
            let mirrored = (iv0 - jv0).norm_squared() < threshold
                && (iv1 - jv1).norm_squared() < threshold
                && (iv2 - jv2).norm_squared() < threshold;
            if !mirrored {
                continue;
            }
            let exposes_corner =
                ((i + 2)..(i + len - 1)).any(|k| inside_triangle(at(k), iv0, iv1, iv2));
            if !exposes_corner {
                return Some((i, j));
            }
        }
    }

    None
}

/// `true` when `v1` lies on the line through `v0` and `v2`, including spikes
/// that double back.
pub fn collinear(v0: &Point3<Real>, v1: &Point3<Real>, v2: &Point3<Real>, epsilon: Real) -> bool {
    let v01 = v1 - v0;
    let v02 = v2 - v0;
    v01.norm() * v02.norm() - v01.dot(&v02).abs() < epsilon
}

/// `true` when segments `a1→a2` and `b1→b2` point the same way and one starts
/// strictly inside the span of the other.
pub fn overwrap(
    a1: &Point3<Real>,
    a2: &Point3<Real>,
    b1: &Point3<Real>,
    b2: &Point3<Real>,
    epsilon: Real,
) -> bool {
    let a = a2 - a1;
    let b = b2 - b1;
    let (a_len, b_len) = (a.norm(), b.norm());
    if a.dot(&b) <= a_len * b_len - epsilon {
        return false;
    }

    let a1b1 = b1 - a1;
    let a1b1_len = a1b1.norm();
    if a1b1_len < a_len - epsilon && a.dot(&a1b1) > a_len * a1b1_len - epsilon {
        return true;
    }

    let b1a1 = a1 - b1;
    let b1a1_len = b1a1.norm();
    b1a1_len < b_len - epsilon && b.dot(&b1a1) > b_len * b1a1_len - epsilon
}

/// Strict containment of `p` in triangle `abc`; points on an edge are outside.
pub fn inside_triangle(
    p: &Point3<Real>,
    a: &Point3<Real>,
    b: &Point3<Real>,
    c: &Point3<Real>,
) -> bool {
    let c1 = (b - a).cross(&(p - a));
    let c2 = (c - b).cross(&(p - b));
    let c3 = (a - c).cross(&(p - c));
    c1.dot(&c2) > 0.0 && c2.dot(&c3) > 0.0 && c3.dot(&c1) > 0.0
}

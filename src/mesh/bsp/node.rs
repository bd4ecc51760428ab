//! Solid-leaf BSP tree node

use crate::mesh::plane::Plane;

/// Interior node of a solid-leaf BSP tree.
///
/// Nodes store no polygons. A missing `front` child is an *outside* leaf and a
/// missing `back` child is an *inside* leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Splitting plane of this node.
    pub plane: Plane,

    /// Subtree in the plane's front half-space, `None` for outside.
    pub front: Option<Box<Node>>,

    /// Subtree in the plane's back half-space, `None` for inside.
    pub back: Option<Box<Node>>,
}

impl Node {
    pub const fn new(plane: Plane) -> Self {
        Self {
            plane,
            front: None,
            back: None,
        }
    }

    /// Number of nodes in the tree rooted here.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.front.as_deref());
            stack.extend(node.back.as_deref());
        }
        count
    }

    /// Swap inside and outside for the whole tree.
    pub fn invert(&mut self) {
        let mut stack = vec![self];

        while let Some(current) = stack.pop() {
            current.plane.flip();
            std::mem::swap(&mut current.front, &mut current.back);

            if let Some(ref mut front) = current.front {
                stack.push(front.as_mut());
            }
            if let Some(ref mut back) = current.back {
                stack.push(back.as_mut());
            }
        }
    }
}

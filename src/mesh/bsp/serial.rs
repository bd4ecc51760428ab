//! Serial, stack-based implementation of the solid-leaf BSP operations

use crate::float_types::Real;
use crate::mesh::bsp::node::Node;
use crate::mesh::bsp::traits::{BalancedSplittingStrategy, SplittingPlaneStrategy};
use crate::mesh::plane::{BACK, COPLANAR, FRONT};
use crate::mesh::polygon::Polygon;
use nalgebra::Point3;

/// Serial implementation of BSP operations
#[derive(Debug, Clone, Default)]
pub struct SerialBspOps<SP: SplittingPlaneStrategy = BalancedSplittingStrategy> {
    splitting_strategy: SP,
}

impl SerialBspOps<BalancedSplittingStrategy> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<SP: SplittingPlaneStrategy> SerialBspOps<SP> {
    pub const fn with_strategy(strategy: SP) -> Self {
        Self {
            splitting_strategy: strategy,
        }
    }

    /// Build a solid-leaf tree. Polygons coplanar with a node's plane are consumed
    /// by that node; front and back fragments are pushed down to new children.
    ///
    /// Returns `None` when no polygon has a usable plane.
    pub fn build<S: Clone>(&self, polygons: &[Polygon<S>], epsilon: Real) -> Option<Node> {
        let usable: Vec<Polygon<S>> = polygons
            .iter()
            .filter(|p| p.plane.is_valid())
            .cloned()
            .collect();
        if usable.is_empty() {
            return None;
        }

        let mut root = Node::new(self.splitting_strategy.pick_splitting_plane(&usable, epsilon));
        let mut stack: Vec<(&mut Node, Vec<Polygon<S>>)> = vec![(&mut root, usable)];

        while let Some((node, polygons)) = stack.pop() {
            let mut front = Vec::with_capacity(polygons.len() / 2);
            let mut back = Vec::with_capacity(polygons.len() / 2);

            for polygon in &polygons {
                let mut split = node.plane.split_polygon(polygon, epsilon);
                front.append(&mut split.front);
                back.append(&mut split.back);
            }

            let Node {
                front: front_child,
                back: back_child,
                ..
            } = node;

            if !front.is_empty() {
                let plane = self.splitting_strategy.pick_splitting_plane(&front, epsilon);
                let child = front_child.insert(Box::new(Node::new(plane)));
                stack.push((child.as_mut(), front));
            }
            if !back.is_empty() {
                let plane = self.splitting_strategy.pick_splitting_plane(&back, epsilon);
                let child = back_child.insert(Box::new(Node::new(plane)));
                stack.push((child.as_mut(), back));
            }
        }
        drop(stack);

        Some(root)
    }

    /// Push each polygon down the tree, collecting `(inside, outside)` fragments.
    ///
    /// Coplanar polygons follow the node's front side when they face the same way
    /// as the node plane and its back side otherwise.
    pub fn split_polygons<S: Clone>(
        &self,
        node: &Node,
        polygons: &[Polygon<S>],
        epsilon: Real,
    ) -> (Vec<Polygon<S>>, Vec<Polygon<S>>) {
        let mut inner = Vec::new();
        let mut outer = Vec::new();
        let mut stack: Vec<(&Node, Polygon<S>)> =
            polygons.iter().rev().map(|p| (node, p.clone())).collect();

        while let Some((current, polygon)) = stack.pop() {
            let split = current.plane.split_polygon(&polygon, epsilon);

            let fronts = split.coplanar_front.into_iter().chain(split.front);
            match current.front.as_deref() {
                Some(child) => stack.extend(fronts.map(|p| (child, p))),
                None => outer.extend(fronts),
            }

            let backs = split.coplanar_back.into_iter().chain(split.back);
            match current.back.as_deref() {
                Some(child) => stack.extend(backs.map(|p| (child, p))),
                None => inner.extend(backs),
            }
        }

        (inner, outer)
    }

    pub fn clip_polygons<S: Clone>(
        &self,
        node: &Node,
        polygons: &[Polygon<S>],
        invert: bool,
        epsilon: Real,
    ) -> Vec<Polygon<S>> {
        let mut result = Vec::with_capacity(polygons.len());

        for polygon in polygons {
            let (inner, outer) =
                self.split_polygons(node, std::slice::from_ref(polygon), epsilon);
            let (kept, rejected) = if invert { (inner, outer) } else { (outer, inner) };

            if rejected.is_empty() {
                result.push(polygon.clone());
            } else {
                result.extend(kept);
            }
        }

        result
    }

    /// Locate `point` relative to the solid.
    ///
    /// A point on a node plane is resolved by both subtrees; when they disagree
    /// the point is on the boundary.
    pub fn classify_point(&self, node: &Node, point: &Point3<Real>, epsilon: Real) -> i8 {
        enum Task<'a> {
            Visit(&'a Node),
            Leaf(i8),
            Combine,
        }

        let mut tasks = vec![Task::Visit(node)];
        let mut values: Vec<i8> = Vec::new();

        while let Some(task) = tasks.pop() {
            match task {
                Task::Leaf(side) => values.push(side),
                Task::Combine => {
                    let back = values.pop().unwrap_or(BACK);
                    let front = values.pop().unwrap_or(FRONT);
                    values.push(if front == back { front } else { COPLANAR });
                },
                Task::Visit(current) => {
                    let front = current.front.as_deref().map_or(Task::Leaf(FRONT), Task::Visit);
                    let back = current.back.as_deref().map_or(Task::Leaf(BACK), Task::Visit);
                    match current.plane.orient_point(point, epsilon) {
                        FRONT => tasks.push(front),
                        BACK => tasks.push(back),
                        _ => {
                            tasks.push(Task::Combine);
                            tasks.push(back);
                            tasks.push(front);
                        },
                    }
                },
            }
        }

        values.pop().unwrap_or(FRONT)
    }
}

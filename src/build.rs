//! Scene-level composition: named primitives and operators folded into one solid.
//!
//! A [`SceneNode`] tree mirrors a host document: every node is an object with a name,
//! an id used for provenance, a transform into its parent's space and a payload.
//! [`Builder`] evaluates the tree bottom-up and can write the result straight back into
//! a [`HostMesh`].

use crate::config::Tolerance;
use crate::errors::CsgError;
use crate::float_types::Real;
use crate::mesh::CsgObject;
use crate::mesh::import::EarcutTriangulator;
use crate::mesh::provenance::Shared;
use crate::mesh::remesh::{HostMesh, MeshData, RemeshOptions};
use crate::shapes;
use crate::traits::CsgOps;
use hashbrown::HashMap;
use nalgebra::Matrix4;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Primitive generators addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Cube,
    Box,
    Sphere,
    Cylinder,
    Plane,
    Tetrahedron,
    Hexahedron,
    Octahedron,
    Dodecahedron,
    Icosahedron,
}

impl FromStr for PrimitiveKind {
    type Err = CsgError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(match name.to_ascii_uppercase().as_str() {
            "CUBE" => PrimitiveKind::Cube,
            "BOX" => PrimitiveKind::Box,
            "SPHERE" => PrimitiveKind::Sphere,
            "CYLINDER" => PrimitiveKind::Cylinder,
            "PLANE" => PrimitiveKind::Plane,
            "TETRAHEDRON" => PrimitiveKind::Tetrahedron,
            "HEXAHEDRON" => PrimitiveKind::Hexahedron,
            "OCTAHEDRON" => PrimitiveKind::Octahedron,
            "DODECAHEDRON" => PrimitiveKind::Dodecahedron,
            "ICOSAHEDRON" => PrimitiveKind::Icosahedron,
            _ => return Err(CsgError::UnsupportedPrimitive(name.to_string())),
        })
    }
}

/// Boolean operators addressable by name. `Inv` unions its children, then inverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    Union,
    Sub,
    And,
    Inv,
}

impl FromStr for BooleanOp {
    type Err = CsgError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(match name.to_ascii_uppercase().as_str() {
            "UNION" => BooleanOp::Union,
            "SUB" => BooleanOp::Sub,
            "AND" => BooleanOp::And,
            "INV" => BooleanOp::Inv,
            _ => return Err(CsgError::UnsupportedOperator(name.to_string())),
        })
    }
}

/// Parameters of a primitive; each generator reads the fields it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub size: Real,
    pub width: Real,
    pub height: Real,
    pub depth: Real,
    pub radius: Real,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            size: 1.0,
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            radius: 1.0,
        }
    }
}

/// What a scene object evaluates to.
#[derive(Debug, Clone)]
pub enum CsgNode {
    Primitive {
        kind: PrimitiveKind,
        dimensions: Dimensions,
        material: usize,
    },
    /// An existing mesh imported face by face.
    Mesh(MeshData),
    /// The solid of an object built earlier in the same session.
    Reference(String),
    Boolean {
        op: BooleanOp,
        children: Vec<SceneNode>,
    },
    /// Skipped by its parent operator.
    Disabled,
}

/// A named object in the scene.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub object_id: usize,
    /// Maps this object's local space into its parent's.
    pub transform: Matrix4<Real>,
    pub node: CsgNode,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, object_id: usize, node: CsgNode) -> Self {
        Self {
            name: name.into(),
            object_id,
            transform: Matrix4::identity(),
            node,
        }
    }

    pub fn with_transform(mut self, transform: Matrix4<Real>) -> Self {
        self.transform = transform;
        self
    }

    pub fn primitive(
        name: impl Into<String>,
        object_id: usize,
        kind: PrimitiveKind,
        dimensions: Dimensions,
    ) -> Self {
        Self::new(
            name,
            object_id,
            CsgNode::Primitive {
                kind,
                dimensions,
                material: 0,
            },
        )
    }

    pub fn boolean(
        name: impl Into<String>,
        object_id: usize,
        op: BooleanOp,
        children: Vec<SceneNode>,
    ) -> Self {
        Self::new(name, object_id, CsgNode::Boolean { op, children })
    }
}

/// Evaluates scene trees into solids.
#[derive(Debug)]
pub struct Builder {
    /// Radial segments of spheres and cylinders; spheres use half as many stacks.
    pub segments: usize,
    pub tolerance: Tolerance,
    /// Checked between sub-builds; raising it aborts with [`CsgError::Cancelled`].
    pub cancel: Option<Arc<AtomicBool>>,
    built: HashMap<String, CsgObject<Shared>>,
    started: Instant,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            segments: 32,
            tolerance: Tolerance::default(),
            cancel: None,
            built: HashMap::new(),
            started: Instant::now(),
        }
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn log(&self, msg: &str) {
        log::info!("{}ms: {}", self.started.elapsed().as_millis(), msg);
    }

    fn check_cancel(&self) -> Result<(), CsgError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(CsgError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Solid of an object built earlier in this session. [`Builder::build`] keeps
    /// adding to the session until the next [`Builder::build_into`].
    pub fn get(&self, name: &str) -> Option<&CsgObject<Shared>> {
        self.built.get(name)
    }

    /// Evaluate `node` in its own local space.
    pub fn build(&mut self, node: &SceneNode) -> Result<CsgObject<Shared>, CsgError> {
        self.check_cancel()?;
        self.log(&format!("building... {}", node.name));

        let csg = match &node.node {
            CsgNode::Primitive {
                kind,
                dimensions,
                material,
            } => self
                .primitive(*kind, dimensions)?
                .with_provenance(node.object_id, *material),
            CsgNode::Mesh(mesh) => {
                CsgObject::from_mesh_data(mesh, node.object_id, &EarcutTriangulator)?
            },
            CsgNode::Reference(name) => self
                .built
                .get(name)
                .cloned()
                .ok_or_else(|| CsgError::UnknownObject(name.clone()))?,
            CsgNode::Boolean { op, children } => self.boolean(*op, children)?,
            CsgNode::Disabled => CsgObject::new(),
        }
        .with_tolerance(self.tolerance);

        self.built.insert(node.name.clone(), csg.clone());
        self.log(&format!("built {}", node.name));
        Ok(csg)
    }

    fn primitive(
        &self,
        kind: PrimitiveKind,
        d: &Dimensions,
    ) -> Result<CsgObject<()>, CsgError> {
        match kind {
            PrimitiveKind::Cube => shapes::cube(d.size),
            PrimitiveKind::Box => shapes::cuboid(d.width, d.height, d.depth),
            PrimitiveKind::Sphere => {
                shapes::sphere(d.radius, self.segments, (self.segments / 2).max(2))
            },
            PrimitiveKind::Cylinder => shapes::cylinder(d.radius, d.height, self.segments),
            PrimitiveKind::Plane => shapes::plane(d.size),
            PrimitiveKind::Tetrahedron => shapes::tetrahedron(d.radius),
            PrimitiveKind::Hexahedron => shapes::hexahedron(d.radius),
            PrimitiveKind::Octahedron => shapes::octahedron(d.radius),
            PrimitiveKind::Dodecahedron => shapes::dodecahedron(d.radius),
            PrimitiveKind::Icosahedron => shapes::icosahedron(d.radius),
        }
    }

    /// Fold the enabled children, each moved by its transform, left to right.
    fn boolean(
        &mut self,
        op: BooleanOp,
        children: &[SceneNode],
    ) -> Result<CsgObject<Shared>, CsgError> {
        let mut operands = Vec::with_capacity(children.len());
        for child in children
            .iter()
            .filter(|c| !matches!(c.node, CsgNode::Disabled))
        {
            let csg = self.build(child)?;
            operands.push(csg.transformed(&child.transform));
        }

        let mut operands = operands.into_iter();
        let Some(first) = operands.next() else {
            return Ok(CsgObject::new());
        };

        let mut result = first;
        for next in operands {
            self.check_cancel()?;
            result = match op {
                BooleanOp::Union | BooleanOp::Inv => result.union(&next),
                BooleanOp::Sub => result.subtract(&next),
                BooleanOp::And => result.intersect(&next),
            };
        }

        Ok(match op {
            BooleanOp::Inv => result.inverse(),
            _ => result,
        })
    }

    /// Build `node` and append the merged, welded result to `host`.
    ///
    /// Starts a new session: objects built by earlier calls are forgotten, so
    /// references only resolve within `node`.
    pub fn build_into<H: HostMesh>(
        &mut self,
        node: &SceneNode,
        host: &mut H,
        options: &RemeshOptions,
    ) -> Result<(), CsgError> {
        self.built.clear();
        self.started = Instant::now();
        let csg = self.build(node)?;
        self.log("buildCsg");
        self.check_cancel()?;
        csg.rematerialize(host, options);
        self.log("finished.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("cube".parse::<PrimitiveKind>(), Ok(PrimitiveKind::Cube));
        assert_eq!("SUB".parse::<BooleanOp>(), Ok(BooleanOp::Sub));
    }

    #[test]
    fn unknown_names_fail_loudly() {
        assert_eq!(
            "TORUS".parse::<PrimitiveKind>(),
            Err(CsgError::UnsupportedPrimitive("TORUS".to_string()))
        );
        assert_eq!(
            "XOR".parse::<BooleanOp>(),
            Err(CsgError::UnsupportedOperator("XOR".to_string()))
        );
    }

    #[test]
    fn boolean_without_children_is_empty() {
        let mut builder = Builder::new();
        let node = SceneNode::boolean("empty", 0, BooleanOp::Union, Vec::new());
        assert!(builder.build(&node).expect("builds").is_empty());
    }

    #[test]
    fn raised_flag_cancels() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut builder = Builder::new().with_cancel_flag(flag);
        let node = SceneNode::primitive("c", 1, PrimitiveKind::Cube, Dimensions::default());
        assert_eq!(builder.build(&node).unwrap_err(), CsgError::Cancelled);
    }

    #[test]
    fn unknown_reference_is_an_error() {
        let mut builder = Builder::new();
        let node = SceneNode::new("r", 2, CsgNode::Reference("missing".into()));
        assert_eq!(
            builder.build(&node).unwrap_err(),
            CsgError::UnknownObject("missing".to_string())
        );
    }

    #[test]
    fn build_into_starts_a_fresh_session() {
        let mut builder = Builder::new();
        let cube = SceneNode::primitive("a", 1, PrimitiveKind::Cube, Dimensions::default());
        builder.build(&cube).expect("builds");
        assert!(builder.get("a").is_some());

        let other = SceneNode::primitive("b", 2, PrimitiveKind::Cube, Dimensions::default());
        let mut host = MeshData::default();
        builder
            .build_into(&other, &mut host, &RemeshOptions::default())
            .expect("builds");
        assert!(builder.get("a").is_none());
        assert!(builder.get("b").is_some());

        let stale = SceneNode::new("r", 3, CsgNode::Reference("a".into()));
        assert_eq!(
            builder.build_into(&stale, &mut host, &RemeshOptions::default()).unwrap_err(),
            CsgError::UnknownObject("a".to_string())
        );
    }
}

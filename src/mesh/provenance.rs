//! Provenance tags: which source face of which source object a polygon came from.

/// Grouping key of the merge pass: fragments merge only when both come from the
/// same face of the same object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MergeKey {
    pub object: usize,
    pub face: usize,
}

/// What the merge pass and re-materializer need to know about a polygon's origin.
pub trait Provenance: Clone {
    fn merge_key(&self) -> MergeKey;

    /// Material index the emitted face should carry, if the source had one.
    fn material(&self) -> Option<usize>;
}

/// Source face reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceRef {
    pub id: usize,
    pub material: usize,
}

/// Source object reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub id: usize,
}

/// Provenance pair carried by imported and generated polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shared {
    pub face: FaceRef,
    pub object: ObjectRef,
}

impl Shared {
    pub const fn new(object: usize, face: usize, material: usize) -> Self {
        Shared {
            face: FaceRef { id: face, material },
            object: ObjectRef { id: object },
        }
    }
}

impl Provenance for Shared {
    fn merge_key(&self) -> MergeKey {
        MergeKey {
            object: self.object.id,
            face: self.face.id,
        }
    }

    fn material(&self) -> Option<usize> {
        Some(self.face.material)
    }
}

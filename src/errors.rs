//! Errors raised for malformed build requests.
//!
//! Degenerate geometry is never an error: zero-area polygons and NaN planes are
//! dropped where they are found.

use crate::float_types::Real;

/// All the ways a build request can be rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CsgError {
    /// (UnsupportedPrimitive) No generator exists for the requested primitive name
    #[error("(UnsupportedPrimitive) Not supported primitive: {0}")]
    UnsupportedPrimitive(String),
    /// (UnsupportedOperator) No boolean operator exists for the requested name
    #[error("(UnsupportedOperator) Not supported operator: {0}")]
    UnsupportedOperator(String),
    /// (InvalidParameter) A primitive dimension or tessellation count is out of range
    #[error("(InvalidParameter) {name} = {value} is out of range")]
    InvalidParameter { name: &'static str, value: Real },
    /// (FaceIndexOutOfRange) A face references a vertex that does not exist
    #[error("(FaceIndexOutOfRange) Face index {index} is out of range (points.len = {len})")]
    FaceIndexOutOfRange { index: usize, len: usize },
    /// (UnknownObject) A scene node references an object that is not part of the scene
    #[error("(UnknownObject) No object named {0}")]
    UnknownObject(String),
    /// (Cancelled) The caller raised the abort flag between sub-builds
    #[error("(Cancelled) Build cancelled")]
    Cancelled,
}

//! Numeric tolerances threaded through booleans, merging and welding.

use crate::float_types::{DEFAULT_MERGE_EPSILON, MIN_EPSILON, Real, default_epsilon};

/// Tolerances used by one [`CsgObject`](crate::CsgObject) and every operation it performs.
///
/// A boolean operation uses the receiver's tolerance for all of its clips, so both
/// operands are classified against the same `epsilon`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Plane-side classification tolerance for splitting and clipping.
    pub epsilon: Real,
    /// Edge-overwrap and collinearity tolerance of the merge pass.
    pub merge_epsilon: Real,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            merge_epsilon: DEFAULT_MERGE_EPSILON,
        }
    }
}

impl Tolerance {
    /// Build a tolerance pair. `epsilon` is clamped to [`MIN_EPSILON`] and
    /// `merge_epsilon` to be non-negative.
    pub fn new(epsilon: Real, merge_epsilon: Real) -> Self {
        Self {
            epsilon: epsilon.max(MIN_EPSILON),
            merge_epsilon: merge_epsilon.max(0.0),
        }
    }

    /// Same merge tolerance, different classification tolerance.
    pub fn with_epsilon(self, epsilon: Real) -> Self {
        Self::new(epsilon, self.merge_epsilon)
    }

    /// Squared distance under which two points are the same vertex: `epsilon² · 100`.
    #[inline]
    pub fn weld_threshold(&self) -> Real {
        self.epsilon * self.epsilon * 100.0
    }
}

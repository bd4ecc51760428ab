// Re-export parry for the appropriate float size
#[cfg(feature = "f64")]
pub use parry3d_f64 as parry3d;

#[cfg(feature = "f32")]
pub use parry3d;

// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

use core::str::FromStr;

/// Smallest plane-side tolerance the partition accepts; requested values below
/// this are clamped up to it.
pub const MIN_EPSILON: Real = 1e-10;

/// Default plane-side classification tolerance.
#[cfg(feature = "f32")]
pub const DEFAULT_EPSILON: Real = 1e-4;
/// Default plane-side classification tolerance.
#[cfg(feature = "f64")]
pub const DEFAULT_EPSILON: Real = 1e-6;

/// Default edge-overwrap / collinearity tolerance of the merge pass.
#[cfg(feature = "f32")]
pub const DEFAULT_MERGE_EPSILON: Real = 1e-5;
/// Default edge-overwrap / collinearity tolerance of the merge pass.
#[cfg(feature = "f64")]
pub const DEFAULT_MERGE_EPSILON: Real = 1e-10;

/// Classification tolerance baked in at build time.
///
/// Set `CSGWELD_TOLERANCE` (e.g. `CSGWELD_TOLERANCE=1e-7 cargo build`) to override
/// [`DEFAULT_EPSILON`]; unparsable values are ignored.
pub fn default_epsilon() -> Real {
    if let Some(environment_variable) = option_env!("CSGWELD_TOLERANCE") {
        if let Ok(value) = Real::from_str(environment_variable) {
            return value.max(MIN_EPSILON);
        }
    }
    DEFAULT_EPSILON
}

// Pi
/// Archimedes' constant (π)
#[cfg(feature = "f32")]
pub const PI: Real = core::f32::consts::PI;
/// Archimedes' constant (π)
#[cfg(feature = "f64")]
pub const PI: Real = core::f64::consts::PI;

// Frac Pi 2
/// π/2
#[cfg(feature = "f32")]
pub const FRAC_PI_2: Real = core::f32::consts::FRAC_PI_2;
/// π/2
#[cfg(feature = "f64")]
pub const FRAC_PI_2: Real = core::f64::consts::FRAC_PI_2;

// Tau
/// The full circle constant (τ)
#[cfg(feature = "f32")]
pub const TAU: Real = core::f32::consts::TAU;
/// The full circle constant (τ)
#[cfg(feature = "f64")]
pub const TAU: Real = core::f64::consts::TAU;

//! **Constructive Solid Geometry (CSG)** on polygon meshes, built around Boolean operations
//! (*union*, *subtract*, *intersect*, *inverse*) on bags of planar polygons clipped against
//! solid-leaf [BSP](mesh::bsp) trees, followed by a cleanup pipeline that merges the coplanar
//! fragments produced by clipping and welds near-coincident vertices back into an indexed mesh.
//!
//! ```text
//!  primitives / imported meshes ──► CsgObject ──► union / subtract / intersect / inverse
//!                                                          │
//!               indexed mesh ◄── weld vertices ◄── merge fragments
//! ```
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon to merge independent fragment groups concurrently

#![forbid(unsafe_code)]
#![warn(clippy::approx_constant, clippy::all)]

pub mod build;
pub mod config;
pub mod errors;
pub mod float_types;
pub mod mesh;
pub mod shapes;
pub mod traits;

#[cfg(any(
    all(feature = "f64", feature = "f32"),
    not(any(feature = "f64", feature = "f32"))
))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use config::Tolerance;
pub use errors::CsgError;
pub use mesh::CsgObject;
pub use mesh::provenance::{FaceRef, MergeKey, ObjectRef, Provenance, Shared};
pub use traits::CsgOps;

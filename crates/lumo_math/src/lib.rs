//! LUMO math - geometry and transform primitives.
//!
//! `glam` supplies vectors and matrices; this crate adds the ray
//! tracing vocabulary on top: `Point` and `Normal` newtypes with their
//! distinct transform rules, `Ray`, and `Transformation` with a cached
//! inverse.

// Re-export glam for convenience
pub use glam::*;

// LUMO math types
mod geometry;
mod ray;
mod transform;

pub use geometry::{onb_from_z, Normal, Point};
pub use ray::Ray;
pub use transform::{
    rotation_x, rotation_y, rotation_z, scaling, translation, SingularTransformError,
    Transformation,
};

//! Scene description language for LUMO.
//!
//! Scenes are plain text files declaring materials, shapes, lights and
//! a camera:
//!
//! ```text
//! # A checkered floor under a reflective sphere
//! float angle(0)
//!
//! material ground_material(
//!     diffuse(checkered(<0.3, 0.5, 0.1>, <0.1, 0.2, 0.5>, 4)),
//!     uniform(<0, 0, 0>)
//! )
//! material mirror_material(
//!     specular(uniform(<0.6, 0.2, 0.3>)),
//!     uniform(<0, 0, 0>)
//! )
//!
//! plane(ground_material, identity)
//! sphere(mirror_material, translation([0, 0, 1]))
//!
//! camera(perspective, rotation_z(angle) * translation([-4, 0, 1]), 1.0, 1.0)
//! ```
//!
//! Parsing happens in two stages: [`lexer::InputStream`] turns the
//! character stream into tokens, and [`parser::parse_scene`] assembles
//! them into a [`parser::Scene`] holding a ready-to-render world.
//! Either stage stops at the first problem and reports it as a
//! [`SceneError`] tagged with the source location.

pub mod lexer;
pub mod parser;

mod error;

pub use error::SceneError;
pub use lexer::{InputStream, Keyword, SourceLocation, Token, TokenKind};
pub use parser::{parse_scene, Scene};

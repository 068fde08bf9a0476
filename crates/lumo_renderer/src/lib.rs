//! LUMO renderer - CPU Monte Carlo path tracing.
//!
//! The crate ties together the geometric primitives from `lumo_math`
//! and the image types from `lumo_core`: shapes are collected into a
//! [`World`], a [`Camera`] turns screen coordinates into rays, and a
//! [`Renderer`] strategy estimates the radiance carried by each ray.
//! The top-level [`render`] function distributes image rows across a
//! rayon thread pool, giving every row its own PCG stream so the
//! output is reproducible regardless of scheduling.

mod camera;
mod lights;
mod material;
mod pcg;
mod renderer;
mod shape;
mod tracer;
mod world;

pub use camera::Camera;
pub use lights::PointLight;
pub use material::{Brdf, Material, Pigment};
pub use pcg::Pcg;
pub use renderer::Renderer;
pub use shape::{HitRecord, Shape};
pub use tracer::{render, ImageTracer, RenderOptions};
pub use world::World;

pub use lumo_core::{Color, HdrImage, BLACK, WHITE};
pub use lumo_math::{Normal, Point, Ray, Transformation};

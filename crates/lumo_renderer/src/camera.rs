//! Projections from screen coordinates to rays.
//!
//! Screen coordinates `(u, v)` span `[0, 1] x [0, 1]` with `(0, 0)` at
//! the bottom-left corner. The camera looks down the positive x axis
//! of its local frame, with y pointing left and z pointing up; the
//! transformation places it in the world.

use glam::Vec3;
use lumo_math::{Point, Ray, Transformation};

/// A camera projecting the 3D world onto the 2D screen.
#[derive(Debug, Clone, Copy)]
pub enum Camera {
    /// Parallel projection; all rays share the direction +x.
    Orthogonal {
        aspect_ratio: f32,
        transformation: Transformation,
    },
    /// Central projection from an eye `screen_distance` behind the
    /// screen.
    Perspective {
        screen_distance: f32,
        aspect_ratio: f32,
        transformation: Transformation,
    },
}

impl Camera {
    pub fn orthogonal(aspect_ratio: f32, transformation: Transformation) -> Self {
        Self::Orthogonal {
            aspect_ratio,
            transformation,
        }
    }

    pub fn perspective(
        screen_distance: f32,
        aspect_ratio: f32,
        transformation: Transformation,
    ) -> Self {
        Self::Perspective {
            screen_distance,
            aspect_ratio,
            transformation,
        }
    }

    /// Fires the ray through screen position `(u, v)`.
    ///
    /// The screen sits at `t = 1` along the ray, so `tmin = 1.0`
    /// rejects anything between the eye and the screen.
    pub fn fire_ray(&self, u: f32, v: f32) -> Ray {
        match self {
            Self::Orthogonal {
                aspect_ratio,
                transformation,
            } => Ray {
                origin: Point::new(-1.0, (1.0 - 2.0 * u) * aspect_ratio, 2.0 * v - 1.0),
                dir: Vec3::X,
                tmin: 1.0,
                tmax: f32::INFINITY,
                depth: 0,
            }
            .transform(transformation),
            Self::Perspective {
                screen_distance,
                aspect_ratio,
                transformation,
            } => Ray {
                origin: Point::new(-screen_distance, 0.0, 0.0),
                dir: Vec3::new(
                    *screen_distance,
                    (1.0 - 2.0 * u) * aspect_ratio,
                    2.0 * v - 1.0,
                ),
                tmin: 1.0,
                tmax: f32::INFINITY,
                depth: 0,
            }
            .transform(transformation),
        }
    }
}

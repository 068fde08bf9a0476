//! Light sources for the point-light renderer.

use lumo_core::Color;
use lumo_math::Point;

/// A point light source.
///
/// When `linear_radius` is positive the light's contribution falls off
/// as `(linear_radius / distance)^2`; at zero the light has constant
/// intensity regardless of distance.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Point,
    pub color: Color,
    pub linear_radius: f32,
}

impl PointLight {
    pub fn new(position: Point, color: Color) -> Self {
        Self {
            position,
            color,
            linear_radius: 0.0,
        }
    }
}

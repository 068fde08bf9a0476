//! Linear RGB radiance values.

use glam::Vec3;

/// Color type alias (linear RGB, unbounded radiance)
pub type Color = Vec3;

pub const BLACK: Color = Vec3::ZERO;
pub const WHITE: Color = Vec3::ONE;

/// Luminosity of a color, taken as the mean of its largest and smallest
/// channel. This is what the tone mapper normalizes against.
#[inline]
pub fn luminosity(c: Color) -> f32 {
    (c.max_element() + c.min_element()) / 2.0
}

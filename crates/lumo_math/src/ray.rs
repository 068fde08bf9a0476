use crate::{Point, Transformation, Vec3};

/// A ray of light propagating through space.
///
/// The ray covers the parameter interval `(tmin, tmax)`; intersections
/// outside it are discarded. `depth` counts how many times the ray has been
/// scattered, and is what bounds the path-tracing recursion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point,
    pub dir: Vec3,
    pub tmin: f32,
    pub tmax: f32,
    pub depth: u32,
}

impl Ray {
    /// Create a primary ray with the default parameter interval.
    pub fn new(origin: Point, dir: Vec3) -> Self {
        Self {
            origin,
            dir,
            tmin: 1e-5,
            tmax: f32::INFINITY,
            depth: 0,
        }
    }

    /// Get the point along the ray at parameter t.
    pub fn at(&self, t: f32) -> Point {
        self.origin + self.dir * t
    }

    /// Return a copy of the ray mapped through `transformation`.
    ///
    /// The parameter interval and the depth counter are preserved, so the
    /// same `t` identifies the same event on both rays.
    pub fn transform(&self, transformation: &Transformation) -> Ray {
        Ray {
            origin: transformation.transform_point(self.origin),
            dir: transformation.transform_vector(self.dir),
            ..*self
        }
    }

    /// True if origin and direction differ by at most `max_abs_diff`.
    pub fn abs_diff_eq(&self, other: &Ray, max_abs_diff: f32) -> bool {
        self.origin.abs_diff_eq(other.origin, max_abs_diff)
            && self.dir.abs_diff_eq(other.dir, max_abs_diff)
    }
}

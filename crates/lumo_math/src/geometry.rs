//! Points and surface normals.
//!
//! Free directions are plain `glam::Vec3`. `Point` and `Normal` are thin
//! wrappers that keep the three transform semantics distinct: points pick up
//! the translation column, vectors do not, and normals go through the
//! inverse-transpose (see `Transformation`).

use std::ops::{Add, Neg, Sub};

use glam::Vec3;

/// A location in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point(pub Vec3);

impl Point {
    pub const ORIGIN: Point = Point(Vec3::ZERO);

    /// Create a new point from its coordinates.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    /// Reinterpret the point as a displacement from the origin.
    #[inline]
    pub fn to_vec(self) -> Vec3 {
        self.0
    }

    /// True if all components differ by at most `max_abs_diff`.
    pub fn abs_diff_eq(self, other: Point, max_abs_diff: f32) -> bool {
        self.0.abs_diff_eq(other.0, max_abs_diff)
    }
}

impl Add<Vec3> for Point {
    type Output = Point;

    fn add(self, rhs: Vec3) -> Point {
        Point(self.0 + rhs)
    }
}

impl Sub<Vec3> for Point {
    type Output = Point;

    fn sub(self, rhs: Vec3) -> Point {
        Point(self.0 - rhs)
    }
}

impl Sub<Point> for Point {
    type Output = Vec3;

    fn sub(self, rhs: Point) -> Vec3 {
        self.0 - rhs.0
    }
}

/// The orientation of a surface at a point.
///
/// Kept distinct from `Vec3` because normals must be transformed by the
/// inverse-transpose of a matrix to stay perpendicular under scaling.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Normal(pub Vec3);

impl Normal {
    /// Create a new normal from its components.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    /// View the normal as a plain direction.
    #[inline]
    pub fn to_vec(self) -> Vec3 {
        self.0
    }

    /// Return the normal scaled to unit length.
    pub fn normalize(self) -> Normal {
        Normal(self.0.normalize())
    }

    /// Dot product against a direction.
    #[inline]
    pub fn dot(self, rhs: Vec3) -> f32 {
        self.0.dot(rhs)
    }

    /// True if all components differ by at most `max_abs_diff`.
    pub fn abs_diff_eq(self, other: Normal, max_abs_diff: f32) -> bool {
        self.0.abs_diff_eq(other.0, max_abs_diff)
    }
}

impl Neg for Normal {
    type Output = Normal;

    fn neg(self) -> Normal {
        Normal(-self.0)
    }
}

/// Build an orthonormal basis whose third axis is `normal`.
///
/// Branchless construction from Duff et al. (2017), "Building an Orthonormal
/// Basis, Revisited". The input must already be normalized.
pub fn onb_from_z(normal: Vec3) -> (Vec3, Vec3, Vec3) {
    let sign = 1.0_f32.copysign(normal.z);
    let a = -1.0 / (sign + normal.z);
    let b = normal.x * normal.y * a;

    let e1 = Vec3::new(
        1.0 + sign * normal.x * normal.x * a,
        sign * b,
        -sign * normal.x,
    );
    let e2 = Vec3::new(b, sign + normal.y * normal.y * a, -normal.y);

    (e1, e2, normal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_vector_arithmetic() {
        let p = Point::new(1.0, 2.0, 3.0);
        let v = Vec3::new(4.0, 6.0, 8.0);

        assert_eq!(p + v, Point::new(5.0, 8.0, 11.0));
        assert_eq!(p - v, Point::new(-3.0, -4.0, -5.0));
        assert_eq!(Point::new(5.0, 8.0, 11.0) - p, v);
    }

    #[test]
    fn test_normal_negation() {
        let n = Normal::new(1.0, -2.0, 3.0);
        assert_eq!(-n, Normal::new(-1.0, 2.0, -3.0));
    }

    #[test]
    fn test_onb_is_right_handed_for_trivial_normal() {
        let (e1, e2, e3) = onb_from_z(Vec3::Z);
        assert!(e1.cross(e2).abs_diff_eq(e3, 1e-6));
    }

    #[test]
    fn test_onb_orthonormality_random_normals() {
        // A small deterministic LCG is enough to sweep a few hundred
        // directions over the sphere.
        let mut state: u64 = 1;
        let mut next = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (state >> 33) as f32 / (1u64 << 31) as f32 - 1.0
        };

        for _ in 0..500 {
            let v = Vec3::new(next(), next(), next());
            if v.length_squared() < 1e-4 {
                continue;
            }
            let normal = v.normalize();
            let (e1, e2, e3) = onb_from_z(normal);

            assert!(e3.abs_diff_eq(normal, 1e-5));
            assert!((e1.length() - 1.0).abs() < 1e-5);
            assert!((e2.length() - 1.0).abs() < 1e-5);
            assert!(e1.dot(e2).abs() < 1e-5);
            assert!(e2.dot(e3).abs() < 1e-5);
            assert!(e3.dot(e1).abs() < 1e-5);
        }
    }
}

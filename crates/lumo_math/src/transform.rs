//! Affine transformations with a cached inverse.
//!
//! Every `Transformation` stores both the forward matrix and its inverse, so
//! shapes can map incoming rays into their local frame without ever paying
//! for a matrix inversion during rendering. The named constructors build the
//! inverse analytically; `from_matrix` inverts once and rejects singular
//! input.

use std::ops::Mul;

use glam::{Mat4, Vec3};
use thiserror::Error;

use crate::{Normal, Point};

/// A 4x4 matrix whose inverse does not exist.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("transformation matrix is singular (determinant {determinant})")]
pub struct SingularTransformError {
    pub determinant: f32,
}

/// An invertible affine transformation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    m: Mat4,
    invm: Mat4,
}

impl Default for Transformation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transformation {
    pub const IDENTITY: Transformation = Transformation {
        m: Mat4::IDENTITY,
        invm: Mat4::IDENTITY,
    };

    /// Build a transformation from an arbitrary matrix, inverting it once.
    ///
    /// Returns `SingularTransformError` if the matrix cannot be inverted.
    pub fn from_matrix(m: Mat4) -> Result<Self, SingularTransformError> {
        let determinant = m.determinant();
        if determinant.abs() < 1e-10 || !determinant.is_finite() {
            return Err(SingularTransformError { determinant });
        }
        Ok(Self { m, invm: m.inverse() })
    }

    /// The forward matrix.
    pub fn matrix(&self) -> Mat4 {
        self.m
    }

    /// The cached inverse matrix.
    pub fn inverse_matrix(&self) -> Mat4 {
        self.invm
    }

    /// The inverse transformation. Free: the two matrices just swap roles.
    pub fn inverse(&self) -> Transformation {
        Transformation {
            m: self.invm,
            invm: self.m,
        }
    }

    /// Check the `m * invm = I` invariant within `max_abs_diff`.
    pub fn is_consistent(&self, max_abs_diff: f32) -> bool {
        (self.m * self.invm).abs_diff_eq(Mat4::IDENTITY, max_abs_diff)
    }

    /// Apply the transformation to a point (picks up the translation).
    #[inline]
    pub fn transform_point(&self, p: Point) -> Point {
        Point(self.m.transform_point3(p.0))
    }

    /// Apply the transformation to a free direction (ignores translation).
    #[inline]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.m.transform_vector3(v)
    }

    /// Apply the transformation to a surface normal.
    ///
    /// Normals go through the transpose of the inverse, and are renormalized
    /// so that non-uniform scalings cannot leave them denormalized.
    #[inline]
    pub fn transform_normal(&self, n: Normal) -> Normal {
        Normal(self.invm.transpose().transform_vector3(n.0).normalize())
    }

    /// True if both matrices differ by at most `max_abs_diff` componentwise.
    pub fn abs_diff_eq(&self, other: &Transformation, max_abs_diff: f32) -> bool {
        self.m.abs_diff_eq(other.m, max_abs_diff) && self.invm.abs_diff_eq(other.invm, max_abs_diff)
    }
}

impl Mul for Transformation {
    type Output = Transformation;

    /// Compose two transformations; `(a * b)` applies `b` first, then `a`.
    fn mul(self, rhs: Transformation) -> Transformation {
        Transformation {
            m: self.m * rhs.m,
            // (A B)^-1 = B^-1 A^-1
            invm: rhs.invm * self.invm,
        }
    }
}

/// A rigid translation by `v`.
pub fn translation(v: Vec3) -> Transformation {
    Transformation {
        m: Mat4::from_translation(v),
        invm: Mat4::from_translation(-v),
    }
}

/// A rotation around the x axis. Angles are in degrees, matching the unit
/// used by the scene description language.
pub fn rotation_x(angle_deg: f32) -> Transformation {
    let rad = angle_deg.to_radians();
    Transformation {
        m: Mat4::from_rotation_x(rad),
        invm: Mat4::from_rotation_x(-rad),
    }
}

/// A rotation around the y axis, in degrees.
pub fn rotation_y(angle_deg: f32) -> Transformation {
    let rad = angle_deg.to_radians();
    Transformation {
        m: Mat4::from_rotation_y(rad),
        invm: Mat4::from_rotation_y(-rad),
    }
}

/// A rotation around the z axis, in degrees.
pub fn rotation_z(angle_deg: f32) -> Transformation {
    let rad = angle_deg.to_radians();
    Transformation {
        m: Mat4::from_rotation_z(rad),
        invm: Mat4::from_rotation_z(-rad),
    }
}

/// A (possibly non-uniform) scaling.
///
/// A zero component would collapse space onto a plane, so it is rejected
/// with `SingularTransformError`.
pub fn scaling(v: Vec3) -> Result<Transformation, SingularTransformError> {
    if v.x == 0.0 || v.y == 0.0 || v.z == 0.0 {
        return Err(SingularTransformError { determinant: 0.0 });
    }
    Ok(Transformation {
        m: Mat4::from_scale(v),
        invm: Mat4::from_scale(Vec3::new(1.0 / v.x, 1.0 / v.y, 1.0 / v.z)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_are_consistent() {
        assert!(translation(Vec3::new(1.0, 2.0, 3.0)).is_consistent(1e-5));
        assert!(rotation_x(37.0).is_consistent(1e-5));
        assert!(rotation_y(129.0).is_consistent(1e-5));
        assert!(rotation_z(-45.0).is_consistent(1e-5));
        assert!(scaling(Vec3::new(2.0, 5.0, 10.0)).unwrap().is_consistent(1e-5));
    }

    #[test]
    fn test_singular_scaling_rejected() {
        assert!(scaling(Vec3::new(1.0, 0.0, 1.0)).is_err());
    }

    #[test]
    fn test_singular_matrix_rejected() {
        assert!(Transformation::from_matrix(Mat4::ZERO).is_err());
        assert!(Transformation::from_matrix(Mat4::IDENTITY).is_ok());
    }

    #[test]
    fn test_inverse_law_point_vector_normal() {
        let t = translation(Vec3::new(4.0, -2.0, 1.0))
            * rotation_y(63.0)
            * scaling(Vec3::new(2.0, 3.0, 4.0)).unwrap();
        assert!(t.is_consistent(1e-4));

        let p = Point::new(1.0, 2.0, 3.0);
        assert!(t
            .inverse()
            .transform_point(t.transform_point(p))
            .abs_diff_eq(p, 1e-4));

        let v = Vec3::new(-1.0, 5.0, 0.5);
        assert!(t
            .inverse()
            .transform_vector(t.transform_vector(v))
            .abs_diff_eq(v, 1e-4));

        let n = Normal::new(0.0, 0.0, 1.0);
        let round_trip = t.inverse().transform_normal(t.transform_normal(n));
        assert!(round_trip.abs_diff_eq(n, 1e-4));
    }

    #[test]
    fn test_translation_moves_points_not_vectors() {
        let t = translation(Vec3::new(10.0, 20.0, 30.0));

        assert!(t
            .transform_point(Point::new(1.0, 2.0, 3.0))
            .abs_diff_eq(Point::new(11.0, 22.0, 33.0), 1e-6));
        assert!(t
            .transform_vector(Vec3::X)
            .abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn test_rotations_map_axes() {
        assert!(rotation_x(90.0)
            .transform_vector(Vec3::Y)
            .abs_diff_eq(Vec3::Z, 1e-6));
        assert!(rotation_y(90.0)
            .transform_vector(Vec3::Z)
            .abs_diff_eq(Vec3::X, 1e-6));
        assert!(rotation_z(90.0)
            .transform_vector(Vec3::X)
            .abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_composition_applies_rightmost_first() {
        let t = translation(Vec3::new(1.0, 0.0, 0.0)) * scaling(Vec3::splat(2.0)).unwrap();
        // Scaling happens first, translation second.
        assert!(t
            .transform_point(Point::new(1.0, 1.0, 1.0))
            .abs_diff_eq(Point::new(3.0, 2.0, 2.0), 1e-6));
    }

    #[test]
    fn test_normal_transform_keeps_perpendicularity() {
        // Under a non-uniform scaling, a naively transformed normal would no
        // longer be perpendicular to transformed tangents.
        let t = scaling(Vec3::new(2.0, 1.0, 1.0)).unwrap();
        let tangent = Vec3::new(1.0, -1.0, 0.0);
        let normal = Normal::new(1.0, 1.0, 0.0).normalize();
        assert!(normal.dot(tangent).abs() < 1e-6);

        let new_tangent = t.transform_vector(tangent);
        let new_normal = t.transform_normal(normal);
        assert!(new_normal.dot(new_tangent).abs() < 1e-5);
        assert!((new_normal.to_vec().length() - 1.0).abs() < 1e-5);
    }
}

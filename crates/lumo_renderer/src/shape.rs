//! Geometric shapes and ray intersections.
//!
//! Every shape is defined in its own local frame (the unit sphere at
//! the origin, the z = 0 plane) and carries a `Transformation` into
//! world space. Intersection maps the ray into the local frame with
//! the cached inverse, solves there, and maps the hit back out.

use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use lumo_math::{Normal, Point, Ray, Transformation};

use crate::material::Material;

/// Everything known about a ray/shape intersection.
#[derive(Debug, Clone)]
pub struct HitRecord<'a> {
    /// The hit point in world coordinates.
    pub world_point: Point,
    /// The surface normal at the hit, oriented against the ray.
    pub normal: Normal,
    /// The `(u, v)` surface coordinates of the hit.
    pub surface_point: Vec2,
    /// The ray parameter at the hit.
    pub t: f32,
    /// The ray that produced the hit.
    pub ray: Ray,
    /// The material of the shape that was hit.
    pub material: &'a Material,
}

/// A shape positioned in the world by a transformation.
#[derive(Debug, Clone)]
pub enum Shape {
    /// The unit sphere centered at the local origin.
    Sphere {
        transformation: Transformation,
        material: Material,
    },
    /// The infinite plane z = 0 in the local frame.
    Plane {
        transformation: Transformation,
        material: Material,
    },
}

impl Shape {
    pub fn sphere(transformation: Transformation, material: Material) -> Self {
        Self::Sphere {
            transformation,
            material,
        }
    }

    pub fn plane(transformation: Transformation, material: Material) -> Self {
        Self::Plane {
            transformation,
            material,
        }
    }

    pub fn material(&self) -> &Material {
        match self {
            Self::Sphere { material, .. } | Self::Plane { material, .. } => material,
        }
    }

    pub fn transformation(&self) -> &Transformation {
        match self {
            Self::Sphere { transformation, .. } | Self::Plane { transformation, .. } => {
                transformation
            }
        }
    }

    /// Intersects `ray` with the shape, returning the closest hit
    /// within the ray's `(tmin, tmax)` interval, if any.
    pub fn ray_intersection(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        match self {
            Self::Sphere {
                transformation,
                material,
            } => {
                let inv_ray = ray.transform(&transformation.inverse());
                let t = sphere_intersection_t(&inv_ray)?;
                let hit_point = inv_ray.at(t);
                Some(HitRecord {
                    world_point: transformation.transform_point(hit_point),
                    normal: transformation.transform_normal(sphere_normal(hit_point, inv_ray.dir)),
                    surface_point: sphere_point_to_uv(hit_point),
                    t,
                    ray: *ray,
                    material,
                })
            }
            Self::Plane {
                transformation,
                material,
            } => {
                let inv_ray = ray.transform(&transformation.inverse());
                let t = plane_intersection_t(&inv_ray)?;
                let hit_point = inv_ray.at(t);
                let local_normal = if inv_ray.dir.z < 0.0 {
                    Normal::new(0.0, 0.0, 1.0)
                } else {
                    Normal::new(0.0, 0.0, -1.0)
                };
                Some(HitRecord {
                    world_point: transformation.transform_point(hit_point),
                    normal: transformation.transform_normal(local_normal),
                    surface_point: Vec2::new(
                        hit_point.0.x - hit_point.0.x.floor(),
                        hit_point.0.y - hit_point.0.y.floor(),
                    ),
                    t,
                    ray: *ray,
                    material,
                })
            }
        }
    }

    /// True if `ray` hits the shape at all. Cheaper than
    /// [`ray_intersection`](Self::ray_intersection) because no hit
    /// record is assembled; used for shadow rays.
    pub fn quick_intersection(&self, ray: &Ray) -> bool {
        match self {
            Self::Sphere { transformation, .. } => {
                let inv_ray = ray.transform(&transformation.inverse());
                sphere_intersection_t(&inv_ray).is_some()
            }
            Self::Plane { transformation, .. } => {
                let inv_ray = ray.transform(&transformation.inverse());
                plane_intersection_t(&inv_ray).is_some()
            }
        }
    }
}

/// Smallest valid `t` for a ray against the unit sphere, if any.
fn sphere_intersection_t(inv_ray: &Ray) -> Option<f32> {
    let origin_vec = inv_ray.origin.to_vec();
    let a = inv_ray.dir.length_squared();
    let b = 2.0 * origin_vec.dot(inv_ray.dir);
    let c = origin_vec.length_squared() - 1.0;

    let delta = b * b - 4.0 * a * c;
    if delta <= 0.0 {
        return None;
    }
    let sqrt_delta = delta.sqrt();
    let t1 = (-b - sqrt_delta) / (2.0 * a);
    let t2 = (-b + sqrt_delta) / (2.0 * a);

    if t1 > inv_ray.tmin && t1 < inv_ray.tmax {
        Some(t1)
    } else if t2 > inv_ray.tmin && t2 < inv_ray.tmax {
        Some(t2)
    } else {
        None
    }
}

/// The normal to the unit sphere at `point`, flipped to face against
/// `ray_dir`.
fn sphere_normal(point: Point, ray_dir: Vec3) -> Normal {
    if point.to_vec().dot(ray_dir) < 0.0 {
        Normal(point.to_vec())
    } else {
        Normal(-point.to_vec())
    }
}

/// Spherical `(u, v)` coordinates of a point on the unit sphere.
fn sphere_point_to_uv(point: Point) -> Vec2 {
    let u = point.0.y.atan2(point.0.x) / (2.0 * PI);
    Vec2::new(
        if u >= 0.0 { u } else { u + 1.0 },
        // The clamp guards against |z| creeping past 1 from rounding.
        point.0.z.clamp(-1.0, 1.0).acos() / PI,
    )
}

/// Valid `t` for a ray against the z = 0 plane, if any.
fn plane_intersection_t(inv_ray: &Ray) -> Option<f32> {
    if inv_ray.dir.z.abs() < 1e-5 {
        return None;
    }
    let t = -inv_ray.origin.0.z / inv_ray.dir.z;
    if t > inv_ray.tmin && t < inv_ray.tmax {
        Some(t)
    } else {
        None
    }
}

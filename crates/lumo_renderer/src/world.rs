//! The collection of shapes and lights making up a scene.

use lumo_math::{Point, Ray};

use crate::lights::PointLight;
use crate::shape::{HitRecord, Shape};

/// Holds every shape and light in the scene.
///
/// Intersection is a linear scan over the shapes; scenes are small
/// enough that no acceleration structure is needed.
#[derive(Debug, Clone, Default)]
pub struct World {
    shapes: Vec<Shape>,
    point_lights: Vec<PointLight>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.point_lights.push(light);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn point_lights(&self) -> &[PointLight] {
        &self.point_lights
    }

    /// The closest intersection of `ray` with any shape.
    ///
    /// The strict comparison keeps the earliest-added shape when two
    /// hits land at exactly the same `t`.
    pub fn ray_intersection(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord> = None;
        for shape in &self.shapes {
            if let Some(hit) = shape.ray_intersection(ray) {
                if closest.as_ref().map_or(true, |c| hit.t < c.t) {
                    closest = Some(hit);
                }
            }
        }
        closest
    }

    /// True if nothing blocks the segment from `observer_pos` to
    /// `point`. Used for shadow rays.
    pub fn is_point_visible(&self, point: Point, observer_pos: Point) -> bool {
        let direction = point - observer_pos;
        let dir_norm = direction.length();

        let ray = Ray {
            origin: observer_pos,
            dir: direction,
            tmin: 1e-2 / dir_norm,
            tmax: 1.0,
            depth: 0,
        };
        self.shapes.iter().all(|shape| !shape.quick_intersection(&ray))
    }
}

//! Radiance estimation strategies.
//!
//! Every variant answers the same question, "how much light does this
//! ray carry", with a different tradeoff between speed and realism.
//! The on/off and flat renderers exist for debugging scene setup; the
//! path tracer is the physically based solver and the point-light
//! renderer is a fast direct-lighting approximation.

use lumo_core::{Color, BLACK, WHITE};
use lumo_math::Ray;

use crate::pcg::Pcg;
use crate::world::World;

/// A strategy for estimating the radiance carried by a ray.
#[derive(Debug, Clone)]
pub enum Renderer {
    /// `color` wherever a shape is hit, `background` elsewhere.
    OnOff { background: Color, color: Color },
    /// Pigment plus emission at the hit, ignoring all light transport.
    Flat { background: Color },
    /// Monte Carlo path tracing with Russian roulette termination.
    PathTracer {
        background: Color,
        num_rays: u32,
        max_depth: u32,
        russian_roulette_limit: u32,
    },
    /// Direct lighting from point lights with hard shadows.
    PointLight { background: Color, ambient: Color },
}

impl Renderer {
    pub fn on_off() -> Self {
        Self::OnOff {
            background: BLACK,
            color: WHITE,
        }
    }

    pub fn flat() -> Self {
        Self::Flat { background: BLACK }
    }

    pub fn path_tracer() -> Self {
        Self::PathTracer {
            background: BLACK,
            num_rays: 10,
            max_depth: 2,
            russian_roulette_limit: 3,
        }
    }

    pub fn point_light() -> Self {
        Self::PointLight {
            background: BLACK,
            ambient: Color::splat(0.1),
        }
    }

    /// Estimates the radiance arriving along `ray`.
    pub fn radiance(&self, world: &World, ray: &Ray, pcg: &mut Pcg) -> Color {
        match self {
            Self::OnOff { background, color } => {
                if world.ray_intersection(ray).is_some() {
                    *color
                } else {
                    *background
                }
            }
            Self::Flat { background } => match world.ray_intersection(ray) {
                None => *background,
                Some(hit) => {
                    let material = hit.material;
                    material.brdf.pigment().color_at(hit.surface_point)
                        + material.emitted_radiance.color_at(hit.surface_point)
                }
            },
            Self::PathTracer {
                background,
                num_rays,
                max_depth,
                russian_roulette_limit,
            } => {
                if ray.depth > *max_depth {
                    return BLACK;
                }
                let Some(hit) = world.ray_intersection(ray) else {
                    return *background;
                };

                let material = hit.material;
                let mut hit_color = material.brdf.pigment().color_at(hit.surface_point);
                let emitted_radiance = material.emitted_radiance.color_at(hit.surface_point);

                // Russian roulette: beyond the depth limit each path
                // survives with probability q equal to the brightest
                // pigment channel, and the survivors are reweighted by
                // 1/q to keep the estimator unbiased.
                if ray.depth >= *russian_roulette_limit {
                    let q = hit_color.max_element().min(1.0);
                    if pcg.random_float() > q {
                        return emitted_radiance;
                    }
                    hit_color /= q;
                }

                let mut cum_radiance = BLACK;
                if hit_color.max_element() > 0.0 {
                    for _ in 0..*num_rays {
                        let new_ray = material.brdf.scatter_ray(
                            pcg,
                            hit.ray.dir,
                            hit.world_point,
                            hit.normal,
                            ray.depth + 1,
                        );
                        let new_radiance = self.radiance(world, &new_ray, pcg);
                        cum_radiance += hit_color * new_radiance;
                    }
                }

                emitted_radiance + cum_radiance / *num_rays as f32
            }
            Self::PointLight {
                background,
                ambient,
            } => {
                let Some(hit) = world.ray_intersection(ray) else {
                    return *background;
                };

                let material = hit.material;
                let mut result = *ambient + material.emitted_radiance.color_at(hit.surface_point);

                for light in world.point_lights() {
                    if !world.is_point_visible(light.position, hit.world_point) {
                        continue;
                    }
                    let distance_vec = hit.world_point - light.position;
                    let distance = distance_vec.length();
                    let in_dir = distance_vec / distance;

                    let cos_theta = hit.normal.to_vec().normalize().dot(-in_dir).max(0.0);
                    let distance_factor = if light.linear_radius > 0.0 {
                        (light.linear_radius / distance).powi(2)
                    } else {
                        1.0
                    };

                    let brdf_color =
                        material
                            .brdf
                            .eval(hit.normal, in_dir, -ray.dir, hit.surface_point);
                    result += brdf_color * light.color * cos_theta * distance_factor;
                }
                result
            }
        }
    }
}

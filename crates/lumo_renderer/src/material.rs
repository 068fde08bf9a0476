//! Surface appearance: pigments, BRDFs and materials.
//!
//! A [`Pigment`] maps `(u, v)` surface coordinates to a color, a
//! [`Brdf`] describes how light scatters off the surface, and a
//! [`Material`] pairs a BRDF with an emitted-radiance pigment.

use std::f32::consts::PI;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use lumo_core::{Color, HdrImage, BLACK, WHITE};
use lumo_math::{onb_from_z, Normal, Point, Ray};

use crate::pcg::Pcg;

/// Offset applied along the surface normal to scattered-ray origins
/// so they do not immediately re-intersect the surface they left.
const SCATTER_ORIGIN_EPS: f32 = 1e-4;

/// Angular tolerance (0.1 degrees) when evaluating the mirror BRDF.
const SPECULAR_THRESHOLD: f32 = PI / 1800.0;

/// A function mapping `(u, v)` surface coordinates to a color.
#[derive(Debug, Clone)]
pub enum Pigment {
    /// The same color everywhere.
    Uniform { color: Color },
    /// A checkered pattern with `steps` squares along each axis.
    Checkered {
        color1: Color,
        color2: Color,
        steps: u32,
    },
    /// Colors looked up from an HDR image, nearest-pixel.
    Image { image: Arc<HdrImage> },
}

impl Pigment {
    pub fn uniform(color: Color) -> Self {
        Self::Uniform { color }
    }

    /// Returns the pigment color at the given surface coordinates.
    pub fn color_at(&self, uv: Vec2) -> Color {
        match self {
            Self::Uniform { color } => *color,
            Self::Checkered {
                color1,
                color2,
                steps,
            } => {
                let int_u = (uv.x * *steps as f32).floor() as i64;
                let int_v = (uv.y * *steps as f32).floor() as i64;
                if int_u.rem_euclid(2) == int_v.rem_euclid(2) {
                    *color1
                } else {
                    *color2
                }
            }
            Self::Image { image } => {
                // u = 1 or v = 1 would index one past the edge, so the
                // lookup is clamped to the last pixel.
                let col = ((uv.x * image.width as f32) as u32).min(image.width - 1);
                let row = ((uv.y * image.height as f32) as u32).min(image.height - 1);
                image.get_pixel(col, row)
            }
        }
    }
}

/// A bidirectional reflectance distribution function.
#[derive(Debug, Clone)]
pub enum Brdf {
    /// Ideal diffuse (Lambertian) surface.
    Diffuse { pigment: Pigment },
    /// Ideal mirror.
    Specular { pigment: Pigment },
}

impl Brdf {
    pub fn pigment(&self) -> &Pigment {
        match self {
            Self::Diffuse { pigment } | Self::Specular { pigment } => pigment,
        }
    }

    /// Evaluates the BRDF for the given incoming and outgoing
    /// directions at surface coordinates `uv`.
    pub fn eval(&self, normal: Normal, in_dir: Vec3, out_dir: Vec3, uv: Vec2) -> Color {
        match self {
            Self::Diffuse { pigment } => pigment.color_at(uv) / PI,
            Self::Specular { pigment } => {
                let n = normal.to_vec().normalize();
                let theta_in = n.dot(in_dir.normalize()).clamp(-1.0, 1.0).acos();
                let theta_out = n.dot(out_dir.normalize()).clamp(-1.0, 1.0).acos();
                if (theta_in - theta_out).abs() < SPECULAR_THRESHOLD {
                    pigment.color_at(uv)
                } else {
                    BLACK
                }
            }
        }
    }

    /// Samples a scattered ray leaving `interaction_point`.
    ///
    /// Diffuse surfaces draw a cosine-weighted direction over the
    /// hemisphere around the normal; mirrors reflect deterministically.
    pub fn scatter_ray(
        &self,
        pcg: &mut Pcg,
        incoming_dir: Vec3,
        interaction_point: Point,
        normal: Normal,
        depth: u32,
    ) -> Ray {
        let n = normal.to_vec().normalize();
        let origin = interaction_point + n * SCATTER_ORIGIN_EPS;
        match self {
            Self::Diffuse { .. } => {
                let (e1, e2, e3) = onb_from_z(n);
                // Importance sampling the cosine lobe: the component
                // along the normal is distributed as sqrt(uniform).
                let cos_theta_sq = pcg.random_float();
                let (cos_theta, sin_theta) = (cos_theta_sq.sqrt(), (1.0 - cos_theta_sq).sqrt());
                let phi = 2.0 * PI * pcg.random_float();
                Ray {
                    origin,
                    dir: e1 * (phi.cos() * cos_theta) + e2 * (phi.sin() * cos_theta) + e3 * sin_theta,
                    tmin: 1e-5,
                    tmax: f32::INFINITY,
                    depth,
                }
            }
            Self::Specular { .. } => {
                let dir = incoming_dir.normalize();
                Ray {
                    origin,
                    dir: dir - n * (2.0 * n.dot(dir)),
                    tmin: 1e-5,
                    tmax: f32::INFINITY,
                    depth,
                }
            }
        }
    }
}

/// Pairs a BRDF with the radiance the surface emits on its own.
#[derive(Debug, Clone)]
pub struct Material {
    pub brdf: Brdf,
    pub emitted_radiance: Pigment,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            brdf: Brdf::Diffuse {
                pigment: Pigment::uniform(WHITE),
            },
            emitted_radiance: Pigment::uniform(BLACK),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;

    #[test]
    fn test_uniform_pigment() {
        let color = vec3(1.0, 2.0, 3.0);
        let pigment = Pigment::uniform(color);
        assert_eq!(pigment.color_at(Vec2::new(0.0, 0.0)), color);
        assert_eq!(pigment.color_at(Vec2::new(1.0, 0.0)), color);
        assert_eq!(pigment.color_at(Vec2::new(0.0, 1.0)), color);
        assert_eq!(pigment.color_at(Vec2::new(1.0, 1.0)), color);
    }

    #[test]
    fn test_checkered_pigment() {
        let color1 = vec3(1.0, 2.0, 3.0);
        let color2 = vec3(10.0, 20.0, 30.0);
        let pigment = Pigment::Checkered {
            color1,
            color2,
            steps: 2,
        };

        // With steps == 2 each square covers half of [0, 1].
        assert_eq!(pigment.color_at(Vec2::new(0.25, 0.25)), color1);
        assert_eq!(pigment.color_at(Vec2::new(0.75, 0.25)), color2);
        assert_eq!(pigment.color_at(Vec2::new(0.25, 0.75)), color2);
        assert_eq!(pigment.color_at(Vec2::new(0.75, 0.75)), color1);
    }

    #[test]
    fn test_image_pigment() {
        let mut image = HdrImage::new(2, 2);
        image.set_pixel(0, 0, vec3(1.0, 2.0, 3.0));
        image.set_pixel(1, 0, vec3(2.0, 3.0, 1.0));
        image.set_pixel(0, 1, vec3(2.0, 1.0, 3.0));
        image.set_pixel(1, 1, vec3(3.0, 2.0, 1.0));

        let pigment = Pigment::Image {
            image: Arc::new(image),
        };
        assert_eq!(pigment.color_at(Vec2::new(0.0, 0.0)), vec3(1.0, 2.0, 3.0));
        assert_eq!(pigment.color_at(Vec2::new(1.0, 0.0)), vec3(2.0, 3.0, 1.0));
        assert_eq!(pigment.color_at(Vec2::new(0.0, 1.0)), vec3(2.0, 1.0, 3.0));
        assert_eq!(pigment.color_at(Vec2::new(1.0, 1.0)), vec3(3.0, 2.0, 1.0));
    }

    #[test]
    fn test_diffuse_eval_is_pigment_over_pi() {
        let brdf = Brdf::Diffuse {
            pigment: Pigment::uniform(WHITE),
        };
        let color = brdf.eval(
            Normal::new(0.0, 0.0, 1.0),
            vec3(0.0, 0.0, -1.0),
            vec3(0.0, 0.0, 1.0),
            Vec2::new(0.5, 0.5),
        );
        assert!((color.x - 1.0 / PI).abs() < 1e-6);
    }

    #[test]
    fn test_specular_scatter_reflects() {
        let brdf = Brdf::Specular {
            pigment: Pigment::uniform(WHITE),
        };
        let mut pcg = Pcg::default();
        let incoming = vec3(1.0, 0.0, -1.0).normalize();
        let ray = brdf.scatter_ray(
            &mut pcg,
            incoming,
            Point::new(0.0, 0.0, 0.0),
            Normal::new(0.0, 0.0, 1.0),
            1,
        );
        assert!(ray
            .dir
            .abs_diff_eq(vec3(1.0, 0.0, 1.0).normalize(), 1e-5));
        assert_eq!(ray.depth, 1);
    }

    #[test]
    fn test_diffuse_scatter_stays_in_hemisphere() {
        let brdf = Brdf::Diffuse {
            pigment: Pigment::uniform(WHITE),
        };
        let mut pcg = Pcg::default();
        let normal = Normal::new(0.0, 0.0, 1.0);
        for depth in 0..100 {
            let ray = brdf.scatter_ray(
                &mut pcg,
                vec3(0.0, 0.0, -1.0),
                Point::new(0.0, 0.0, 0.0),
                normal,
                depth,
            );
            assert!(ray.dir.z >= 0.0);
            assert!((ray.dir.length() - 1.0).abs() < 1e-4);
        }
    }
}

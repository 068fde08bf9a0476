//! Shooting rays through every pixel of an image.
//!
//! `ImageTracer` connects a camera to an `HdrImage`, optionally
//! averaging a grid of jittered sub-pixel samples to fight aliasing.
//! The [`render`] function is the top-level entry point: it splits the
//! image into rows, renders them on a rayon thread pool and gives each
//! row its own PCG stream so the result does not depend on how the
//! rows are scheduled.

use lumo_core::{Color, HdrImage, BLACK};
use lumo_math::Ray;
use rayon::prelude::*;

use crate::camera::Camera;
use crate::pcg::Pcg;
use crate::renderer::Renderer;
use crate::world::World;

/// Maps pixel coordinates to rays and samples one pixel. Shared
/// between the sequential tracer and the parallel renderer.
#[derive(Clone, Copy)]
struct PixelSampler<'a> {
    camera: &'a Camera,
    width: u32,
    height: u32,
    samples_per_side: u32,
}

impl PixelSampler<'_> {
    fn fire_ray(&self, col: u32, row: u32, u_pixel: f32, v_pixel: f32) -> Ray {
        let u = (col as f32 + u_pixel) / self.width as f32;
        let v = 1.0 - (row as f32 + v_pixel) / self.height as f32;
        self.camera.fire_ray(u, v)
    }

    /// Estimates the color of one pixel.
    ///
    /// With `samples_per_side == 0` a single ray goes through the
    /// pixel center; otherwise `samples_per_side^2` rays are jittered
    /// inside a stratified sub-pixel grid and averaged.
    fn sample_pixel(
        &self,
        renderer: &Renderer,
        world: &World,
        pcg: &mut Pcg,
        col: u32,
        row: u32,
    ) -> Color {
        if self.samples_per_side == 0 {
            let ray = self.fire_ray(col, row, 0.5, 0.5);
            return renderer.radiance(world, &ray, pcg);
        }

        let mut cum_color = BLACK;
        for sub_row in 0..self.samples_per_side {
            for sub_col in 0..self.samples_per_side {
                let u_pixel = (sub_col as f32 + pcg.random_float()) / self.samples_per_side as f32;
                let v_pixel = (sub_row as f32 + pcg.random_float()) / self.samples_per_side as f32;
                let ray = self.fire_ray(col, row, u_pixel, v_pixel);
                cum_color += renderer.radiance(world, &ray, pcg);
            }
        }
        cum_color / (self.samples_per_side * self.samples_per_side) as f32
    }
}

/// Traces an image one pixel at a time.
pub struct ImageTracer<'a> {
    image: &'a mut HdrImage,
    sampler: PixelSampler<'a>,
}

impl<'a> ImageTracer<'a> {
    pub fn new(image: &'a mut HdrImage, camera: &'a Camera, samples_per_side: u32) -> Self {
        let sampler = PixelSampler {
            camera,
            width: image.width,
            height: image.height,
            samples_per_side,
        };
        Self { image, sampler }
    }

    /// Fires the ray through pixel `(col, row)`.
    ///
    /// `(u_pixel, v_pixel)` locate the sample inside the pixel, with
    /// `(0.5, 0.5)` at its center. Row 0 is the top of the image, but
    /// screen coordinate `v` grows upward, hence the flip.
    pub fn fire_ray(&self, col: u32, row: u32, u_pixel: f32, v_pixel: f32) -> Ray {
        self.sampler.fire_ray(col, row, u_pixel, v_pixel)
    }

    /// Renders every pixel of the image sequentially.
    pub fn fire_all_rays(&mut self, renderer: &Renderer, world: &World, pcg: &mut Pcg) {
        for row in 0..self.image.height {
            for col in 0..self.image.width {
                let color = self.sampler.sample_pixel(renderer, world, pcg, col, row);
                self.image.set_pixel(col, row, color);
            }
        }
    }
}

/// Settings for a [`render`] run.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    /// Sub-pixel samples per pixel side; 0 disables antialiasing.
    pub samples_per_side: u32,
    /// Seed for the per-row random generators.
    pub seed: u64,
    /// Base stream number; row `r` uses stream `sequence + r`.
    pub sequence: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            samples_per_side: 0,
            seed: 42,
            sequence: 54,
        }
    }
}

/// Renders the world into a new image, distributing rows across the
/// rayon thread pool.
///
/// Every row draws from its own PCG stream, so repeated runs with the
/// same options produce bit-identical images no matter how many
/// threads are available.
pub fn render(
    world: &World,
    camera: &Camera,
    renderer: &Renderer,
    options: &RenderOptions,
) -> HdrImage {
    log::info!(
        "rendering {}x{} image, {} samples per pixel",
        options.width,
        options.height,
        (options.samples_per_side * options.samples_per_side).max(1)
    );

    let sampler = PixelSampler {
        camera,
        width: options.width,
        height: options.height,
        samples_per_side: options.samples_per_side,
    };

    let rows: Vec<Vec<Color>> = (0..options.height)
        .into_par_iter()
        .map(|row| {
            let mut pcg = Pcg::new(options.seed, options.sequence.wrapping_add(row as u64));
            (0..options.width)
                .map(|col| sampler.sample_pixel(renderer, world, &mut pcg, col, row))
                .collect()
        })
        .collect();

    let mut image = HdrImage::new(options.width, options.height);
    for (row, colors) in rows.iter().enumerate() {
        for (col, &color) in colors.iter().enumerate() {
            image.set_pixel(col as u32, row as u32, color);
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;
    use lumo_math::{Point, Transformation};

    use crate::material::{Brdf, Material, Pigment};
    use crate::shape::Shape;

    fn test_camera() -> Camera {
        Camera::perspective(1.0, 2.0, Transformation::IDENTITY)
    }

    #[test]
    fn test_orientation() {
        let mut image = HdrImage::new(4, 2);
        let camera = test_camera();
        let tracer = ImageTracer::new(&mut image, &camera, 0);

        // The ray through the top-left corner of the screen.
        let top_left_ray = tracer.fire_ray(0, 0, 0.0, 0.0);
        assert!(top_left_ray.at(1.0).abs_diff_eq(Point::new(0.0, 2.0, 1.0), 1e-5));

        // The ray through the bottom-right corner.
        let bottom_right_ray = tracer.fire_ray(3, 1, 1.0, 1.0);
        assert!(bottom_right_ray
            .at(1.0)
            .abs_diff_eq(Point::new(0.0, -2.0, -1.0), 1e-5));
    }

    #[test]
    fn test_uv_sub_mapping() {
        let mut image = HdrImage::new(4, 2);
        let camera = test_camera();
        let tracer = ImageTracer::new(&mut image, &camera, 0);

        // A sample far outside pixel (0, 0) coincides with the center
        // of pixel (2, 1).
        let ray1 = tracer.fire_ray(0, 0, 2.5, 1.5);
        let ray2 = tracer.fire_ray(2, 1, 0.5, 0.5);
        assert!(ray1.abs_diff_eq(&ray2, 1e-6));
    }

    #[test]
    fn test_image_coverage() {
        let mut image = HdrImage::new(4, 2);
        let camera = test_camera();
        let mut tracer = ImageTracer::new(&mut image, &camera, 0);

        let background = vec3(1.0, 2.0, 3.0);
        let world = World::new();
        let renderer = Renderer::Flat { background };
        let mut pcg = Pcg::default();
        tracer.fire_all_rays(&renderer, &world, &mut pcg);

        for row in 0..2 {
            for col in 0..4 {
                assert_eq!(image.get_pixel(col, row), background);
            }
        }
    }

    #[test]
    fn test_antialiasing_averages_samples() {
        // With a uniform background every jittered sample returns the
        // same value, so the average must equal it exactly.
        let mut image = HdrImage::new(2, 2);
        let camera = test_camera();
        let mut tracer = ImageTracer::new(&mut image, &camera, 3);

        let background = vec3(0.5, 0.25, 0.125);
        let world = World::new();
        let renderer = Renderer::Flat { background };
        let mut pcg = Pcg::default();
        tracer.fire_all_rays(&renderer, &world, &mut pcg);

        for row in 0..2 {
            for col in 0..2 {
                assert!(image.get_pixel(col, row).abs_diff_eq(background, 1e-6));
            }
        }
    }

    #[test]
    fn test_render_is_reproducible() {
        let material = Material {
            brdf: Brdf::Diffuse {
                pigment: Pigment::uniform(vec3(0.6, 0.5, 0.4)),
            },
            emitted_radiance: Pigment::uniform(vec3(0.2, 0.2, 0.2)),
        };
        let mut world = World::new();
        world.add(Shape::sphere(Transformation::IDENTITY, material));

        let camera = test_camera();
        let renderer = Renderer::PathTracer {
            background: BLACK,
            num_rays: 2,
            max_depth: 3,
            russian_roulette_limit: 2,
        };
        let options = RenderOptions {
            width: 8,
            height: 6,
            samples_per_side: 2,
            ..RenderOptions::default()
        };

        let first = render(&world, &camera, &renderer, &options);
        let second = render(&world, &camera, &renderer, &options);
        for row in 0..options.height {
            for col in 0..options.width {
                assert_eq!(first.get_pixel(col, row), second.get_pixel(col, row));
            }
        }
    }

    #[test]
    fn test_render_matches_sequential_tracer() {
        let world = World::new();
        let camera = test_camera();
        let renderer = Renderer::Flat {
            background: vec3(0.25, 0.5, 0.75),
        };
        let options = RenderOptions {
            width: 4,
            height: 2,
            samples_per_side: 0,
            ..RenderOptions::default()
        };

        let parallel = render(&world, &camera, &renderer, &options);

        let mut sequential = HdrImage::new(options.width, options.height);
        let mut tracer = ImageTracer::new(&mut sequential, &camera, 0);
        let mut pcg = Pcg::default();
        tracer.fire_all_rays(&renderer, &world, &mut pcg);

        for row in 0..options.height {
            for col in 0..options.width {
                assert_eq!(
                    parallel.get_pixel(col, row),
                    sequential.get_pixel(col, row)
                );
            }
        }
    }
}

//! Core path tracing: per-ray color integration, per-pixel sampling and
//! the display transform.
//!
//! Implements Monte Carlo path tracing with:
//! - Iterative bounce loop with configurable depth
//! - Gamma correction
//! - Anti-aliasing via multi-sampling

use crate::{Camera, Color, Hittable, Scatter, Scene};
use ember_math::{Interval, Ray, Vec3};
use rand::RngCore;

/// Lower bound of the hit interval; keeps scattered rays from re-hitting
/// the surface they start on.
pub const HIT_EPSILON: f32 = 0.001;

/// Displayable intensity range before 8-bit quantization.
const INTENSITY: Interval = Interval::new(0.0, 0.999);

/// Compute the color seen by a ray.
///
/// Follows the ray through at most `depth` bounces, multiplying the
/// attenuation of every surface it scatters off. Running out of depth or
/// being absorbed yields black; escaping the scene picks up the sky.
pub fn ray_color(ray: &Ray, depth: u32, scene: &Scene, rng: &mut dyn RngCore) -> Color {
    let mut ray = *ray;
    let mut throughput = Color::ONE;

    for _ in 0..depth {
        let Some(rec) = scene.hit(&ray, Interval::beyond(HIT_EPSILON)) else {
            return throughput * sky_gradient(&ray);
        };

        let Some(material) = rec.material.and_then(|id| scene.material(id)) else {
            return throughput * normal_shade(rec.normal);
        };

        match material.scatter(&ray, &rec, rng) {
            Some(result) => {
                throughput *= result.attenuation;
                ray = result.scattered;
            }
            None => return Color::ZERO,
        }
    }

    // Out of bounces: no more light is gathered
    Color::ZERO
}

/// Background gradient from white (looking down) to sky blue (looking up).
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Map a unit normal into RGB; used for surfaces without a material.
#[inline]
pub fn normal_shade(normal: Vec3) -> Color {
    0.5 * (normal + Color::ONE)
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Gamma-encode a linear color and clamp each channel to [0, 0.999].
pub fn to_display(color: Color) -> Color {
    Color::new(
        INTENSITY.clamp(linear_to_gamma(color.x)),
        INTENSITY.clamp(linear_to_gamma(color.y)),
        INTENSITY.clamp(linear_to_gamma(color.z)),
    )
}

/// Quantize a display color to 8 bits per channel.
pub fn quantize(color: Color) -> [u8; 3] {
    let byte = |c: f32| (256.0 * INTENSITY.clamp(c)) as u8;
    [byte(color.x), byte(color.y), byte(color.z)]
}

/// Render a single pixel with multi-sampling.
///
/// Returns the averaged linear color.
pub fn render_pixel(camera: &Camera, scene: &Scene, i: u32, j: u32, rng: &mut dyn RngCore) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..camera.samples_per_pixel() {
        let ray = camera.sample_ray(i, j, rng);
        pixel_color += ray_color(&ray, camera.max_depth(), scene, rng);
    }

    pixel_color / camera.samples_per_pixel() as f32
}

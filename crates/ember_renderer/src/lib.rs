//! Ember renderer - multithreaded CPU ray tracing.
//!
//! Traces spheres with Lambertian, metal and dielectric surfaces through a
//! thin-lens camera. The image is split into row blocks that a fixed pool
//! of workers renders in parallel; finished blocks are merged into a single
//! row-major buffer that can be written as PPM or PNG.
//!
//! ```ignore
//! let mut scene = Scene::new();
//! let red = scene.add_material(Lambertian::new(Color::new(0.7, 0.3, 0.3)));
//! scene.add(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, red)?)?;
//!
//! let camera = CameraConfig::new().with_resolution(400, 16.0 / 9.0).initialize();
//! let image = render(&camera, &scene, &RenderConfig::default());
//! image.save("image.ppm")?;
//! ```

mod block;
mod camera;
mod error;
mod hittable;
mod material;
mod output;
mod renderer;
mod scene;
mod scheduler;
mod sphere;

pub use block::{generate_blocks, render_block, BlockResult, RowBlock, DEFAULT_BLOCK_ROWS};
pub use camera::{Camera, CameraConfig};
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable};
pub use material::{Color, Dielectric, Lambertian, Material, MaterialId, Metal, Scatter, ScatterResult};
pub use output::ImageBuffer;
pub use renderer::{
    linear_to_gamma, normal_shade, quantize, ray_color, render_pixel, sky_gradient, to_display,
    HIT_EPSILON,
};
pub use scene::Scene;
pub use scheduler::{render, render_blocks, RenderConfig, RenderState};
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from ember_math
pub use ember_math::{Interval, Ray, Vec3};

//! Camera for ray generation.

use ember_math::sampling::{random_in_unit_disk, sample_square};
use ember_math::{Ray, Vec3};
use rand::RngCore;

/// User-facing camera settings.
///
/// Set the fields (or use the `with_*` builders), then call
/// [`CameraConfig::initialize`] to get a [`Camera`] that can produce rays.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    // Image settings
    pub aspect_ratio: f32,
    pub image_width: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,

    // Camera positioning
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,

    // Lens settings
    pub vertical_fov: f32,   // Vertical field of view in degrees
    pub defocus_angle: f32,  // Variation angle of rays through each pixel, in degrees
    pub focus_distance: f32, // Distance from camera to plane of perfect focus

    /// Jitter samples across the pixel footprint for anti-aliasing
    pub jitter: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 100,
            samples_per_pixel: 10,
            max_depth: 10,
            look_from: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            up: Vec3::Y,
            vertical_fov: 90.0,
            defocus_angle: 0.0,
            focus_distance: 10.0,
            jitter: true,
        }
    }
}

impl CameraConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set image width and aspect ratio (height is derived).
    pub fn with_resolution(mut self, image_width: u32, aspect_ratio: f32) -> Self {
        self.image_width = image_width;
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, up: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.up = up;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vertical_fov: f32, defocus_angle: f32, focus_distance: f32) -> Self {
        self.vertical_fov = vertical_fov;
        self.defocus_angle = defocus_angle;
        self.focus_distance = focus_distance;
        self
    }

    /// Enable or disable per-sample pixel jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Image height derived from width and aspect ratio, never below 1.
    pub fn image_height(&self) -> u32 {
        let height = self.image_width as f32 / self.aspect_ratio;
        if height.is_finite() && height >= 1.0 {
            height as u32
        } else {
            1
        }
    }

    /// Derive the per-render camera state.
    pub fn initialize(&self) -> Camera {
        Camera::new(self)
    }
}

/// Camera with its derived viewport, ready to generate rays.
///
/// Immutable once built, so it can be shared by every render worker.
#[derive(Debug, Clone)]
pub struct Camera {
    image_width: u32,
    image_height: u32,
    samples_per_pixel: u32,
    max_depth: u32,
    jitter: bool,
    defocus_angle: f32,

    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Compute viewport, basis and defocus disk from a configuration.
    pub fn new(config: &CameraConfig) -> Self {
        let image_width = config.image_width;
        let image_height = config.image_height();
        let center = config.look_from;

        // Calculate viewport dimensions
        let theta = config.vertical_fov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * config.focus_distance;
        let viewport_width = viewport_height * (image_width as f32 / image_height as f32);

        // Calculate camera basis vectors
        let w = (config.look_from - config.look_at).normalize();
        let u = config.up.cross(w).normalize();
        let v = w.cross(u);

        // Vectors across the horizontal and down the vertical viewport edges
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        let pixel_delta_u = viewport_u / image_width as f32;
        let pixel_delta_v = viewport_v / image_height as f32;

        let viewport_upper_left =
            center - config.focus_distance * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        // Calculate defocus disk basis vectors
        let defocus_radius = config.focus_distance * (config.defocus_angle / 2.0).to_radians().tan();

        Self {
            image_width,
            image_height,
            samples_per_pixel: config.samples_per_pixel.max(1),
            max_depth: config.max_depth,
            jitter: config.jitter,
            defocus_angle: config.defocus_angle,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            u,
            v,
            w,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
        }
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Orthonormal camera basis (right, up, backward).
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    /// Generate a sample ray for pixel (i, j).
    ///
    /// The target is jittered within the pixel when jitter is enabled and
    /// the origin is drawn from the defocus disk when the lens has an
    /// aperture.
    pub fn sample_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.jitter {
            sample_square(rng)
        } else {
            Vec3::ZERO
        };

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + offset.x) * self.pixel_delta_u
            + ((j as f32) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }

    /// Ray from the camera center through the exact center of pixel (i, j).
    pub fn center_ray(&self, i: u32, j: u32) -> Ray {
        let pixel_center =
            self.pixel00_loc + (i as f32) * self.pixel_delta_u + (j as f32) * self.pixel_delta_v;
        Ray::new(self.center, pixel_center - self.center)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_defaults() {
        let config = CameraConfig::default();
        assert_eq!(config.aspect_ratio, 1.0);
        assert_eq!(config.image_width, 100);
        assert_eq!(config.samples_per_pixel, 10);
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.vertical_fov, 90.0);
        assert_eq!(config.defocus_angle, 0.0);
        assert_eq!(config.focus_distance, 10.0);
        assert_eq!(config.image_height(), 100);
    }

    #[test]
    fn test_image_height_from_aspect() {
        let config = CameraConfig::new().with_resolution(400, 16.0 / 9.0);
        assert_eq!(config.image_height(), 225);
    }

    #[test]
    fn test_image_height_clamped_for_degenerate_input() {
        assert_eq!(CameraConfig::new().with_resolution(0, 1.0).image_height(), 1);
        assert_eq!(CameraConfig::new().with_resolution(10, 100.0).image_height(), 1);
        assert_eq!(CameraConfig::new().with_resolution(100, 0.0).image_height(), 1);
        assert_eq!(CameraConfig::new().with_resolution(100, -2.0).image_height(), 1);
    }

    #[test]
    fn test_camera_basis() {
        let camera = CameraConfig::new()
            .with_position(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
            .initialize();

        let (u, v, w) = camera.basis();
        assert!((w - Vec3::Z).length() < 1e-6);
        assert!((u - Vec3::X).length() < 1e-6);
        assert!((v - Vec3::Y).length() < 1e-6);
        assert_eq!(camera.center(), Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_corner_rays_span_field_of_view() {
        // 90 degree fov, square image: the viewport spans [-f, f] at distance f
        let camera = CameraConfig::new()
            .with_resolution(2, 1.0)
            .with_lens(90.0, 0.0, 1.0)
            .initialize();

        let top_left = camera.center_ray(0, 0).direction();
        assert!((top_left - Vec3::new(-0.5, 0.5, -1.0)).length() < 1e-5);

        let bottom_right = camera.center_ray(1, 1).direction();
        assert!((bottom_right - Vec3::new(0.5, -0.5, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_unjittered_pinhole_sample_matches_center_ray() {
        let camera = CameraConfig::new().with_jitter(false).initialize();
        let mut rng = StdRng::seed_from_u64(42);

        let sampled = camera.sample_ray(13, 57, &mut rng);
        let center = camera.center_ray(13, 57);
        assert_eq!(sampled, center);
    }

    #[test]
    fn test_jitter_stays_within_pixel_footprint() {
        let camera = CameraConfig::new()
            .with_resolution(100, 1.0)
            .with_lens(90.0, 0.0, 1.0)
            .initialize();
        let mut rng = StdRng::seed_from_u64(9);
        let center = camera.center_ray(50, 50).direction();

        for _ in 0..200 {
            let d = camera.sample_ray(50, 50, &mut rng).direction();
            // Pixel is 0.02 wide at focus distance 1
            assert!((d.x - center.x).abs() <= 0.01 + 1e-6);
            assert!((d.y - center.y).abs() <= 0.01 + 1e-6);
            assert!((d.z + 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_defocus_origins_on_lens_disk() {
        let camera = CameraConfig::new()
            .with_lens(90.0, 10.0, 3.4)
            .initialize();
        let radius = 3.4 * (5.0f32).to_radians().tan();
        let mut rng = StdRng::seed_from_u64(21);

        let mut moved = false;
        for _ in 0..200 {
            let origin = camera.sample_ray(50, 50, &mut rng).origin();
            assert!(origin.length() < radius + 1e-5);
            assert!(origin.z.abs() < 1e-6);
            moved |= origin != Vec3::ZERO;
        }
        assert!(moved);
    }
}

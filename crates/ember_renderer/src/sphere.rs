//! Sphere primitive for ray tracing.

use crate::{
    error::RenderError,
    hittable::{HitRecord, Hittable},
    MaterialId, RenderResult,
};
use ember_math::{Interval, Ray, Vec3};

/// A sphere primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Option<MaterialId>,
}

impl Sphere {
    /// Create a new sphere shaded by `material`.
    pub fn new(center: Vec3, radius: f32, material: MaterialId) -> RenderResult<Self> {
        Self::build(center, radius, Some(material))
    }

    /// Create a sphere without a material. Hits on it are shaded by their
    /// surface normal instead of being scattered.
    pub fn unshaded(center: Vec3, radius: f32) -> RenderResult<Self> {
        Self::build(center, radius, None)
    }

    fn build(center: Vec3, radius: f32, material: Option<MaterialId>) -> RenderResult<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(RenderError::InvalidRadius(radius));
        }
        Ok(Self {
            center,
            radius,
            material,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        Some(HitRecord::new(ray, root, outward_normal, self.material))
    }
}

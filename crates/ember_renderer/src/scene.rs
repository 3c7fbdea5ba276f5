//! Scene: the objects to render plus the material arena they reference.

use crate::{
    error::RenderError,
    hittable::{HitRecord, Hittable},
    Material, MaterialId, RenderResult, Sphere,
};
use ember_math::{Interval, Ray};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(0);

/// An ordered collection of spheres and the materials they use.
///
/// The scene owns both. Shapes refer to materials by [`MaterialId`], so one
/// material can be shared by any number of shapes. A scene is never mutated
/// while a render is running; workers only hold `&Scene`.
///
/// A clone keeps the original's id, so handles stay valid in both copies.
#[derive(Debug, Clone)]
pub struct Scene {
    id: u64,
    materials: Vec<Material>,
    objects: Vec<Sphere>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),
            materials: Vec::new(),
            objects: Vec::new(),
        }
    }
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a material and return its handle.
    pub fn add_material(&mut self, material: impl Into<Material>) -> MaterialId {
        self.materials.push(material.into());
        MaterialId {
            scene: self.id,
            index: self.materials.len() - 1,
        }
    }

    /// Add an object to the scene.
    ///
    /// Fails if the sphere refers to a material that was not added to this
    /// scene, even when another scene issued a handle with the same index.
    pub fn add(&mut self, sphere: Sphere) -> RenderResult<()> {
        if let Some(id) = sphere.material() {
            if self.material(id).is_none() {
                return Err(RenderError::UnknownMaterial(id.index));
            }
        }
        self.objects.push(sphere);
        Ok(())
    }

    /// Look up a material by handle. Handles from other scenes resolve to
    /// `None`.
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        if id.scene != self.id {
            return None;
        }
        self.materials.get(id.index)
    }

    pub fn objects(&self) -> &[Sphere] {
        &self.objects
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the scene has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Hittable for Scene {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest: Option<HitRecord> = None;

        for object in &self.objects {
            let search = closest.map_or(ray_t, |rec| ray_t.up_to(rec.t));
            if let Some(rec) = object.hit(ray, search) {
                closest = Some(rec);
            }
        }

        closest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Lambertian, Metal};
    use ember_math::Vec3;

    #[test]
    fn test_nearest_hit_wins_regardless_of_order() {
        let mut scene = Scene::new();
        let far_mat = scene.add_material(Lambertian::new(Color::ONE));
        let near_mat = scene.add_material(Metal::new(Color::ONE, 0.0).unwrap());

        // Far sphere is added first so a first-hit scan would return it
        scene.add(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 0.5, far_mat).unwrap()).unwrap();
        scene.add(Sphere::new(Vec3::new(0.0, 0.0, -2.0), 0.5, near_mat).unwrap()).unwrap();

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let rec = scene.hit(&ray, Interval::beyond(0.001)).unwrap();

        assert!((rec.t - 1.5).abs() < 1e-5);
        assert_eq!(rec.material, Some(near_mat));
    }

    #[test]
    fn test_empty_scene_misses() {
        let scene = Scene::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        assert!(scene.is_empty());
        assert!(scene.hit(&ray, Interval::beyond(f32::NEG_INFINITY)).is_none());
    }

    #[test]
    fn test_shared_material_handle() {
        let mut scene = Scene::new();
        let shared = scene.add_material(Lambertian::new(Color::new(0.7, 0.3, 0.3)));
        scene.add(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, shared).unwrap()).unwrap();
        scene.add(Sphere::new(Vec3::new(1.0, 0.0, -1.0), 0.5, shared).unwrap()).unwrap();

        assert_eq!(scene.len(), 2);
        assert_eq!(
            scene.material(shared),
            Some(&Material::Lambertian(Lambertian::new(Color::new(0.7, 0.3, 0.3))))
        );
    }

    #[test]
    fn test_material_handle_out_of_range_rejected() {
        let mut scene = Scene::new();
        let stale = MaterialId {
            scene: scene.id,
            index: 1,
        };
        assert!(scene.material(stale).is_none());

        let sphere = Sphere::new(Vec3::ZERO, 1.0, stale).unwrap();
        assert!(matches!(scene.add(sphere), Err(RenderError::UnknownMaterial(1))));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_foreign_handle_with_valid_index_rejected() {
        let mut other = Scene::new();
        let foreign = other.add_material(Lambertian::new(Color::ONE));

        let mut scene = Scene::new();
        let local = scene.add_material(Metal::new(Color::ONE, 0.0).unwrap());
        assert_ne!(foreign, local);
        assert!(scene.material(foreign).is_none());

        let sphere = Sphere::new(Vec3::ZERO, 1.0, foreign).unwrap();
        assert!(matches!(scene.add(sphere), Err(RenderError::UnknownMaterial(0))));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_cloned_scene_accepts_original_handles() {
        let mut scene = Scene::new();
        let id = scene.add_material(Lambertian::new(Color::ONE));
        let mut copy = scene.clone();

        assert!(copy.add(Sphere::new(Vec3::ZERO, 1.0, id).unwrap()).is_ok());
        assert_eq!(copy.material(id), scene.material(id));
    }
}

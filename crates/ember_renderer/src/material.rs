//! Surface materials and their scattering rules.

use crate::{error::RenderError, hittable::HitRecord, RenderResult};
use ember_math::sampling::{gen_f32, random_unit_vector};
use ember_math::{near_zero, reflect, refract, Ray, Vec3};
use rand::RngCore;

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Outcome of a scattering event.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Per-channel factor applied to the light carried by `scattered`
    pub attenuation: Color,
    /// The outgoing ray
    pub scattered: Ray,
}

/// Scattering behaviour of a surface.
pub trait Scatter {
    /// Scatter an incoming ray at a hit point.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult>;
}

/// Stable handle to a material stored in a [`Scene`](crate::Scene).
///
/// Handles carry the id of the scene that issued them, so a handle from one
/// scene never resolves in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId {
    pub(crate) scene: u64,
    pub(crate) index: usize,
}

/// The closed set of materials a surface can carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
}

impl Scatter for Material {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        match self {
            Material::Lambertian(m) => m.scatter(ray_in, rec, rng),
            Material::Metal(m) => m.scatter(ray_in, rec, rng),
            Material::Dielectric(m) => m.scatter(ray_in, rec, rng),
        }
    }
}

impl From<Lambertian> for Material {
    fn from(m: Lambertian) -> Self {
        Material::Lambertian(m)
    }
}

impl From<Metal> for Material {
    fn from(m: Metal) -> Self {
        Material::Metal(m)
    }
}

impl From<Dielectric> for Material {
    fn from(m: Dielectric) -> Self {
        Material::Dielectric(m)
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }
}

impl Scatter for Lambertian {
    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let direction = diffuse_direction(rec.normal, random_unit_vector(rng));
        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, direction),
        })
    }
}

/// Offset the normal by a unit vector, falling back to the bare normal
/// when the two nearly cancel.
#[inline]
pub(crate) fn diffuse_direction(normal: Vec3, offset: Vec3) -> Vec3 {
    let direction = normal + offset;
    if near_zero(direction) {
        normal
    } else {
        direction
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough.
    ///   Values above 1 are clamped; negative values are rejected.
    pub fn new(albedo: Color, fuzz: f32) -> RenderResult<Self> {
        if fuzz.is_nan() || fuzz < 0.0 {
            return Err(RenderError::InvalidFuzz(fuzz));
        }
        Ok(Self {
            albedo,
            fuzz: fuzz.min(1.0),
        })
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    pub fn fuzz(&self) -> f32 {
        self.fuzz
    }
}

impl Scatter for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let direction = if self.fuzz > 0.0 {
            reflected + self.fuzz * random_unit_vector(rng)
        } else {
            reflected
        };

        // The reflection has to leave the surface
        if direction.dot(rec.normal) > 0.0 {
            Some(ScatterResult {
                attenuation: self.albedo,
                scattered: Ray::new(rec.p, direction),
            })
        } else {
            None
        }
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dielectric {
    /// Index of refraction relative to the surrounding medium
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> RenderResult<Self> {
        if ior.is_nan() || ior <= 0.0 {
            return Err(RenderError::InvalidRefractiveIndex(ior));
        }
        Ok(Self { ior })
    }

    pub fn refractive_index(&self) -> f32 {
        self.ior
    }

    /// Schlick's approximation for reflectance.
    fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
        let r0 = ((1.0 - refraction_ratio) / (1.0 + refraction_ratio)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Scatter for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let refraction_ratio = if rec.front_face { 1.0 / self.ior } else { self.ior };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        let cannot_refract = refraction_ratio * sin_theta > 1.0;
        let direction =
            if cannot_refract || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng) {
                reflect(unit_direction, rec.normal)
            } else {
                refract(unit_direction, rec.normal, refraction_ratio)
            };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, direction),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(normal: Vec3, front_face: bool) -> HitRecord {
        HitRecord {
            p: Vec3::ZERO,
            normal,
            t: 1.0,
            front_face,
            material: None,
        }
    }

    #[test]
    fn test_diffuse_direction_falls_back_to_normal() {
        let normals = [
            Vec3::Y,
            Vec3::NEG_Z,
            Vec3::new(1.0, 1.0, 1.0).normalize(),
            Vec3::new(-0.3, 0.2, 0.9).normalize(),
        ];
        for n in normals {
            assert_eq!(diffuse_direction(n, -n), n);
            let nearly_opposite = -n + Vec3::splat(1e-9);
            assert_eq!(diffuse_direction(n, nearly_opposite), n);
        }
    }

    #[test]
    fn test_lambertian_never_scatters_zero_direction() {
        let material = Lambertian::new(Color::new(0.8, 0.3, 0.3));
        let rec = record(Vec3::Y, true);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..1000 {
            let result = material
                .scatter(&Ray::new(Vec3::Y, Vec3::NEG_Y), &rec, &mut rng)
                .unwrap();
            assert!(!near_zero(result.scattered.direction()));
            assert_eq!(result.attenuation, Color::new(0.8, 0.3, 0.3));
        }
    }

    #[test]
    fn test_metal_rejects_reflection_into_surface() {
        let metal = Metal::new(Color::splat(0.8), 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(2);

        // Travelling along the normal: the mirror direction points into the surface
        let rec = record(Vec3::Y, true);
        let ray = Ray::new(Vec3::NEG_Y, Vec3::Y);
        assert!(metal.scatter(&ray, &rec, &mut rng).is_none());

        // Grazing: reflected direction is perpendicular to the normal
        let grazing = Ray::new(Vec3::NEG_X, Vec3::X);
        assert!(metal.scatter(&grazing, &rec, &mut rng).is_none());
    }

    #[test]
    fn test_metal_mirror_reflection() {
        let metal = Metal::new(Color::new(0.8, 0.6, 0.2), 0.0).unwrap();
        let rec = record(Vec3::Y, true);
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(3);

        let result = metal.scatter(&ray, &rec, &mut rng).unwrap();
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((result.scattered.direction() - expected).length() < 1e-6);
        assert_eq!(result.attenuation, Color::new(0.8, 0.6, 0.2));
    }

    #[test]
    fn test_metal_fuzz_validation() {
        assert!(matches!(
            Metal::new(Color::ONE, -0.1),
            Err(RenderError::InvalidFuzz(_))
        ));
        assert!(Metal::new(Color::ONE, f32::NAN).is_err());
        assert_eq!(Metal::new(Color::ONE, 3.0).unwrap().fuzz(), 1.0);
        assert_eq!(Metal::new(Color::ONE, 0.3).unwrap().fuzz(), 0.3);
    }

    #[test]
    fn test_dielectric_index_validation() {
        assert!(matches!(
            Dielectric::new(0.0),
            Err(RenderError::InvalidRefractiveIndex(_))
        ));
        assert!(Dielectric::new(-1.5).is_err());
        assert_eq!(Dielectric::new(1.5).unwrap().refractive_index(), 1.5);
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        // Leaving glass at a steep angle: 1.5 * sin(60deg) > 1
        let glass = Dielectric::new(1.5).unwrap();
        let rec = record(Vec3::NEG_Y, false);
        let direction = Vec3::new(60f32.to_radians().sin(), 60f32.to_radians().cos(), 0.0);
        let ray = Ray::new(Vec3::NEG_Y, direction);
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..100 {
            let result = glass.scatter(&ray, &rec, &mut rng).unwrap();
            assert_eq!(result.attenuation, Color::ONE);
            // Reflected back inside (same side as the flipped normal)
            assert!(result.scattered.direction().y < 0.0);
        }
    }

    #[test]
    fn test_dielectric_head_on_mostly_refracts() {
        let glass = Dielectric::new(1.5).unwrap();
        let rec = record(Vec3::Y, true);
        let ray = Ray::new(Vec3::Y, Vec3::NEG_Y);
        let mut rng = StdRng::seed_from_u64(5);

        let refracted = (0..1000)
            .filter(|_| {
                let result = glass.scatter(&ray, &rec, &mut rng).unwrap();
                result.scattered.direction().y < 0.0
            })
            .count();
        // Schlick reflectance at normal incidence is 4%
        assert!(refracted > 900, "only {} of 1000 refracted", refracted);
    }

    #[test]
    fn test_material_enum_dispatch() {
        let material: Material = Lambertian::new(Color::splat(0.5)).into();
        let rec = record(Vec3::Z, true);
        let mut rng = StdRng::seed_from_u64(6);
        let result = material
            .scatter(&Ray::new(Vec3::Z, Vec3::NEG_Z), &rec, &mut rng)
            .unwrap();
        assert_eq!(result.attenuation, Color::splat(0.5));
    }
}

//! Scene setup: the built-in demo scene and JSON scene descriptions.

use anyhow::{bail, Context, Result};
use ember_renderer::{
    CameraConfig, Color, Dielectric, Lambertian, Material, Metal, Scene, Sphere, Vec3,
};
use serde::Deserialize;
use std::path::Path;

/// Camera block of a scene file. Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraDescription {
    pub aspect_ratio: f32,
    pub image_width: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub vertical_fov: f32,
    pub look_from: [f32; 3],
    pub look_at: [f32; 3],
    pub up: [f32; 3],
    pub defocus_angle: f32,
    pub focus_distance: f32,
    pub jitter: bool,
}

impl Default for CameraDescription {
    fn default() -> Self {
        let config = CameraConfig::default();
        Self {
            aspect_ratio: config.aspect_ratio,
            image_width: config.image_width,
            samples_per_pixel: config.samples_per_pixel,
            max_depth: config.max_depth,
            vertical_fov: config.vertical_fov,
            look_from: config.look_from.to_array(),
            look_at: config.look_at.to_array(),
            up: config.up.to_array(),
            defocus_angle: config.defocus_angle,
            focus_distance: config.focus_distance,
            jitter: config.jitter,
        }
    }
}

impl From<&CameraDescription> for CameraConfig {
    fn from(desc: &CameraDescription) -> Self {
        CameraConfig {
            aspect_ratio: desc.aspect_ratio,
            image_width: desc.image_width,
            samples_per_pixel: desc.samples_per_pixel,
            max_depth: desc.max_depth,
            vertical_fov: desc.vertical_fov,
            look_from: Vec3::from_array(desc.look_from),
            look_at: Vec3::from_array(desc.look_at),
            up: Vec3::from_array(desc.up),
            defocus_angle: desc.defocus_angle,
            focus_distance: desc.focus_distance,
            jitter: desc.jitter,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDescription {
    Lambertian { albedo: [f32; 3] },
    Metal { albedo: [f32; 3], fuzz: f32 },
    Dielectric { refractive_index: f32 },
}

impl MaterialDescription {
    fn build(&self) -> Result<Material> {
        let material = match self {
            Self::Lambertian { albedo } => Lambertian::new(Color::from_array(*albedo)).into(),
            Self::Metal { albedo, fuzz } => Metal::new(Color::from_array(*albedo), *fuzz)?.into(),
            Self::Dielectric { refractive_index } => Dielectric::new(*refractive_index)?.into(),
        };
        Ok(material)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SphereDescription {
    pub center: [f32; 3],
    pub radius: f32,
    /// Index into the scene's `materials`; `null` renders by normal
    #[serde(default)]
    pub material: Option<usize>,
}

/// A scene file: camera settings, a material list and spheres that refer
/// to materials by their position in that list.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDescription {
    #[serde(default)]
    pub camera: CameraDescription,
    #[serde(default)]
    pub materials: Vec<MaterialDescription>,
    pub spheres: Vec<SphereDescription>,
}

impl SceneDescription {
    /// Parse a scene from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid scene description")
    }

    /// Read and parse a scene file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Build the renderer's camera configuration and scene.
    pub fn build(&self) -> Result<(CameraConfig, Scene)> {
        let mut scene = Scene::new();

        let mut ids = Vec::with_capacity(self.materials.len());
        for (i, desc) in self.materials.iter().enumerate() {
            let material = desc.build().with_context(|| format!("Material {} is invalid", i))?;
            ids.push(scene.add_material(material));
        }

        for (i, desc) in self.spheres.iter().enumerate() {
            let center = Vec3::from_array(desc.center);
            let sphere = match desc.material {
                Some(m) => {
                    let Some(&id) = ids.get(m) else {
                        bail!(
                            "Sphere {} uses material {} but only {} are defined",
                            i,
                            m,
                            ids.len()
                        );
                    };
                    Sphere::new(center, desc.radius, id)
                }
                None => Sphere::unshaded(center, desc.radius),
            }
            .with_context(|| format!("Sphere {} is invalid", i))?;
            scene.add(sphere)?;
        }

        Ok((CameraConfig::from(&self.camera), scene))
    }
}

/// Ground plane with a diffuse, a glass and a brushed metal sphere.
pub fn demo_scene() -> Result<(CameraConfig, Scene)> {
    let mut scene = Scene::new();

    let ground = scene.add_material(Lambertian::new(Color::new(0.8, 0.8, 0.0)));
    let center = scene.add_material(Lambertian::new(Color::new(0.7, 0.3, 0.3)));
    let left = scene.add_material(Dielectric::new(1.5)?);
    let right = scene.add_material(Metal::new(Color::new(0.8, 0.6, 0.2), 0.3)?);

    scene.add(Sphere::new(Vec3::new(0.0, -100.5, -1.0), 100.0, ground)?)?;
    scene.add(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, center)?)?;
    scene.add(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, left)?)?;
    scene.add(Sphere::new(Vec3::new(1.0, 0.0, -1.0), 0.5, right)?)?;

    let camera = CameraConfig::new()
        .with_resolution(400, 16.0 / 9.0)
        .with_quality(10, 50)
        .with_lens(90.0, 0.0, 1.0);

    Ok((camera, scene))
}

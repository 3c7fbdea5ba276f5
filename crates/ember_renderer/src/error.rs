//! Error types for scene construction and image output.

use thiserror::Error;

/// Errors surfaced by the renderer's public API.
///
/// Geometry queries never fail; these only come from building a scene
/// with invalid parameters or from writing the finished image.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Metal fuzz must be non-negative, got {0}")]
    InvalidFuzz(f32),

    #[error("Refractive index must be positive, got {0}")]
    InvalidRefractiveIndex(f32),

    #[error("Sphere radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    #[error("Material handle {0} does not belong to this scene")]
    UnknownMaterial(usize),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type RenderResult<T> = Result<T, RenderError>;

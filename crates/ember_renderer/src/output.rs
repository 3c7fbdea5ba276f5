//! Final image buffer and file output (ASCII PPM, PNG).

use crate::block::BlockResult;
use crate::error::RenderError;
use crate::renderer::quantize;
use crate::{Color, RenderResult};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Row-major image of display-ready colors (gamma-encoded, clamped).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Assemble an image from rendered blocks.
    ///
    /// Each pixel lands at its recorded linear index, so the order in which
    /// blocks finished does not matter.
    pub fn from_blocks(width: u32, height: u32, blocks: Vec<BlockResult>) -> Self {
        let mut image = Self::new(width, height);
        #[cfg(debug_assertions)]
        let mut written = vec![false; image.pixels.len()];

        for result in blocks {
            for (index, color) in result.pixels {
                #[cfg(debug_assertions)]
                {
                    debug_assert!(!written[index], "pixel {} written twice", index);
                    written[index] = true;
                }
                image.pixels[index] = color;
            }
        }

        #[cfg(debug_assertions)]
        debug_assert!(written.iter().all(|w| *w), "image has unrendered pixels");

        image
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Quantize to packed 8-bit RGB, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|color| quantize(*color)).collect()
    }

    /// Write the image as ASCII PPM (`P3`), one `R G B` line per pixel.
    pub fn write_ppm<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "P3")?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;

        for color in &self.pixels {
            let [r, g, b] = quantize(*color);
            writeln!(writer, "{} {} {}", r, g, b)?;
        }

        Ok(())
    }

    /// Save as an ASCII PPM file.
    pub fn save_ppm(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Save as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let png = image::RgbImage::from_fn(self.width, self.height, |x, y| {
            image::Rgb(quantize(self.get(x, y)))
        });
        png.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Save the image, picking the format from the file extension
    /// (`.ppm` or `.png`).
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "ppm" => self.save_ppm(path)?,
            "png" => self.save_png(path)?,
            _ => return Err(RenderError::UnsupportedFormat(path.display().to_string())),
        }

        info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

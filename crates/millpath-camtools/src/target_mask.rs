//! Target silhouette mask
//!
//! Turns a decoded raster into the per-pixel "must not be cut" predicate.
//! A pixel is target material when the sum of its four alpha-premultiplied
//! 16-bit channels is below `3 * 32768`, i.e. dark and opaque.

use crate::error::{CamToolError, CamToolResult};
use image::{DynamicImage, Rgba};
use std::path::Path;

/// Channel sum below which a pixel is target material
pub const LUMINANCE_THRESHOLD: u32 = 3 * 32768;

/// True when the pixel marks target material
pub fn is_target_pixel(pixel: &Rgba<u16>) -> bool {
    let [r, g, b, a] = pixel.0;
    let alpha = a as u32;
    let premultiply = |c: u16| c as u32 * alpha / u16::MAX as u32;
    premultiply(r) + premultiply(g) + premultiply(b) + alpha < LUMINANCE_THRESHOLD
}

/// Boolean raster of the protected shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl TargetMask {
    /// Mask with no target material
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width as usize) * (height as usize)],
        }
    }

    /// Classify every pixel of a decoded image
    pub fn from_image(image: &DynamicImage) -> CamToolResult<Self> {
        let rgba = image.to_rgba16();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(CamToolError::ImageError(format!(
                "image has no pixels ({}x{})",
                width, height
            )));
        }
        let bits = rgba.pixels().map(is_target_pixel).collect();
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Decode an image file and classify it
    pub fn load(path: &Path) -> CamToolResult<Self> {
        let image = image::open(path).map_err(|e| {
            CamToolError::ImageError(format!("failed to load {}: {}", path.display(), e))
        })?;
        let mask = Self::from_image(&image)?;
        tracing::debug!(
            "Loaded {} ({}x{}, {} target pixels)",
            path.display(),
            mask.width,
            mask.height,
            mask.target_count()
        );
        Ok(mask)
    }

    /// Build a mask from text rows, `#` marking target material
    ///
    /// Every row must have the same length. Any character other than `#`
    /// is stock.
    pub fn from_rows(rows: &[&str]) -> CamToolResult<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |row| row.chars().count()) as u32;
        if width == 0 || height == 0 {
            return Err(CamToolError::InvalidParameters(
                "mask rows are empty".to_string(),
            ));
        }
        let mut bits = Vec::with_capacity((width * height) as usize);
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() as u32 != width {
                return Err(CamToolError::InvalidParameters(format!(
                    "mask row {} has {} columns, expected {}",
                    y,
                    row.chars().count(),
                    width
                )));
            }
            bits.extend(row.chars().map(|c| c == '#'));
        }
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Target flag at `(x, y)`; false outside the mask
    pub fn is_target(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bits[(y * self.width + x) as usize]
    }

    /// Set the target flag; ignored outside the mask
    pub fn set_target(&mut self, x: u32, y: u32, target: bool) {
        if x < self.width && y < self.height {
            self.bits[(y * self.width + x) as usize] = target;
        }
    }

    pub fn target_count(&self) -> usize {
        self.bits.iter().filter(|bit| **bit).count()
    }
}

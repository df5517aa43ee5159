//! RGBA8 texture data for the posable objects.

use std::path::Path;

use anyhow::{Context, Result, ensure};

/// Decoded texture, rows top to bottom, ready for upload.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureData {
    pub const BYTES_PER_PIXEL: u32 = 4;

    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * Self::BYTES_PER_PIXEL as usize;
        ensure!(
            width > 0 && height > 0 && data.len() == expected,
            "RGBA8 texture {}x{} needs {} bytes, got {}",
            width,
            height,
            expected,
            data.len()
        );
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Single texel of one color. Untextured objects sample this.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            data: rgba.to_vec(),
            width: 1,
            height: 1,
        }
    }

    pub fn load_png(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read texture {}", path.display()))?;
        let tex = Self::from_png_bytes(&bytes)
            .with_context(|| format!("Failed to decode texture {}", path.display()))?;
        log::info!("Loaded texture {} ({}x{})", path.display(), tex.width, tex.height);
        Ok(tex)
    }

    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self> {
        let rgba = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new_rgba8(width, height, rgba.into_raw())
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * Self::BYTES_PER_PIXEL
    }
}

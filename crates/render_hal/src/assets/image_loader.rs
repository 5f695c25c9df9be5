//! Image loading utilities for texture data
//!
//! Decodes PNG and JPEG through the `image` crate into tightly packed RGBA8
//! rows, top row first.

use std::path::Path;

use crate::assets::AssetError;

/// Decoded image ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// RGBA8 pixels, row-major
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Bits per channel of the source image
    pub bit_depth: u8,
}

impl ImageData {
    /// Decode an image file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        log::debug!("Loading image from: {:?}", path);
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Decode an encoded image held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to decode image: {e}")))?;

        let color = img.color();
        let channels = u16::from(color.channel_count()).max(1);
        let bit_depth = u8::try_from(color.bits_per_pixel() / channels).unwrap_or(u8::MAX);

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("Decoded {}x{} image ({} bits per channel)", width, height, bit_depth);

        Ok(Self {
            data: rgba.into_raw(),
            width,
            height,
            bit_depth,
        })
    }

    /// Create a solid color image (useful for testing and defaults)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            data: color.repeat(pixel_count),
            width,
            height,
            bit_depth: 8,
        }
    }

    /// Reverse the row order in place
    ///
    /// GL samples row 0 as the bottom of the texture; decoders produce the
    /// top row first.
    pub fn flip_vertically(&mut self) {
        let row = self.width as usize * 4;
        if row == 0 {
            return;
        }
        let rows = self.data.len() / row;
        for top in 0..rows / 2 {
            let bottom = rows - 1 - top;
            let (upper, lower) = self.data.split_at_mut(bottom * row);
            upper[top * row..(top + 1) * row].swap_with_slice(&mut lower[..row]);
        }
    }

    /// Size of the pixel data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

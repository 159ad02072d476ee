//! Owned pixel buffers produced by capture backends
//!
//! All supported layouts are 4 bytes per pixel. Rows may carry padding,
//! so `stride` can be larger than `width * 4`.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::image::{BYTES_PER_PIXEL, MAX_IMAGE_BYTES};

/// Pixel layout of captured image data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// B8G8R8A8 (most capture APIs)
    #[default]
    Bgra8,
    /// R8G8B8A8
    Rgba8,
    /// Platform native layout, passed through without conversion
    Native,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgra8 | PixelFormat::Rgba8 | PixelFormat::Native => BYTES_PER_PIXEL,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            PixelFormat::Bgra8 => "BGRA8",
            PixelFormat::Rgba8 => "RGBA8",
            PixelFormat::Native => "Native",
        };
        write!(f, "{}", value)
    }
}

/// Computes `stride * height`, rejecting overflow and oversized buffers
pub(crate) fn buffer_len(stride: u32, height: u32) -> Option<usize> {
    let len = (stride as usize).checked_mul(height as usize)?;
    (len <= MAX_IMAGE_BYTES).then_some(len)
}

/// A captured pixel buffer with explicit layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    stride: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Image {
    /// Create a zero-filled, tightly packed image
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let stride = width
            .checked_mul(format.bytes_per_pixel() as u32)
            .with_context(|| format!("Image row too wide: {} pixels", width))?;
        let len = buffer_len(stride, height)
            .with_context(|| format!("Image too large: {}x{}", width, height))?;

        Ok(Self {
            width,
            height,
            stride,
            format,
            data: vec![0; len],
        })
    }

    /// Wrap an existing pixel buffer, taking ownership of it
    pub fn from_data(
        width: u32,
        height: u32,
        stride: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self> {
        let min_stride = (width as usize) * format.bytes_per_pixel();
        if (stride as usize) < min_stride {
            bail!(
                "Stride {} too small for width {} ({} bytes per pixel)",
                stride,
                width,
                format.bytes_per_pixel()
            );
        }

        let len = buffer_len(stride, height)
            .with_context(|| format!("Image too large: stride {} x {} rows", stride, height))?;
        if data.len() < len {
            bail!(
                "Pixel buffer too short: {} bytes, expected at least {}",
                data.len(),
                len
            );
        }

        Ok(Self {
            width,
            height,
            stride,
            format,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row, including any padding
    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// The `stride * height` bytes that make up the image
    pub fn data(&self) -> &[u8] {
        &self.data[..self.byte_len()]
    }

    /// Mutable pixel data (for backends to fill)
    pub fn data_mut(&mut self) -> &mut [u8] {
        let len = self.byte_len();
        &mut self.data[..len]
    }

    pub fn byte_len(&self) -> usize {
        self.stride as usize * self.height as usize
    }

    pub fn into_data(mut self) -> Vec<u8> {
        self.data.truncate(self.byte_len());
        self.data
    }

    /// Read one pixel as its 4 raw channel bytes
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride as usize + x as usize * BYTES_PER_PIXEL;
        let px = self.data.get(offset..offset + BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

//! Pixel buffers and immutable rasters.
//!
//! [`PixelBuffer`] is the mutable working surface edit operations write
//! into. [`Raster`] is what the pipeline hands around: an immutable snapshot
//! holding both the decoded pixels and the encoded bytes they came from.
//! Cloning a `Raster` shares its buffers.

use std::sync::Arc;

use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::decode::{decode_image, DecodeError};
use crate::encode::{encode, OutputFormat};
use crate::error::EditError;

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// A decoded image with RGBA pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new PixelBuffer with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * BYTES_PER_PIXEL,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a buffer filled with a single colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::new(width, height, rgba.repeat(width as usize * height as usize))
    }

    /// Create a PixelBuffer from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an image::RgbaImage for further processing.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Byte offset of the pixel at (x, y).
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }

    /// Read the pixel at (x, y). Panics if out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Check if this is an empty/invalid buffer.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

/// Encoded container format of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RasterFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
}

impl RasterFormat {
    /// Map an `image` crate format onto the formats Retouch reads.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(RasterFormat::Jpeg),
            ImageFormat::Png => Some(RasterFormat::Png),
            ImageFormat::WebP => Some(RasterFormat::WebP),
            ImageFormat::Gif => Some(RasterFormat::Gif),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            RasterFormat::Jpeg => "image/jpeg",
            RasterFormat::Png => "image/png",
            RasterFormat::WebP => "image/webp",
            RasterFormat::Gif => "image/gif",
        }
    }
}

impl From<OutputFormat> for RasterFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Jpeg { .. } => RasterFormat::Jpeg,
            OutputFormat::Png => RasterFormat::Png,
        }
    }
}

/// Immutable image snapshot: decoded pixels plus the bytes they decode from.
#[derive(Debug, Clone)]
pub struct Raster {
    buffer: Arc<PixelBuffer>,
    encoded: Arc<[u8]>,
    format: RasterFormat,
}

impl Raster {
    /// Decode raw image bytes into a raster.
    pub fn decode(bytes: impl Into<Arc<[u8]>>) -> Result<Self, DecodeError> {
        let encoded: Arc<[u8]> = bytes.into();
        let (buffer, format) = decode_image(&encoded)?;
        Ok(Self {
            buffer: Arc::new(buffer),
            encoded,
            format,
        })
    }

    /// Encode a working buffer and produce the raster a consumer of the
    /// encoded bytes would see.
    ///
    /// Lossy output is decoded back so the pixels carry the compression
    /// loss. Lossless output keeps the buffer as is.
    pub fn encode(buffer: PixelBuffer, format: OutputFormat) -> Result<Self, EditError> {
        let bytes = encode(&buffer, format)?;

        if format.is_lossy() {
            return Ok(Self::decode(bytes)?);
        }

        Ok(Self {
            buffer: Arc::new(buffer),
            encoded: bytes.into(),
            format: format.into(),
        })
    }

    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    pub fn height(&self) -> u32 {
        self.buffer.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.buffer.width, self.buffer.height)
    }

    /// Decoded pixels.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// RGBA bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.buffer.pixels
    }

    /// The encoded bytes this raster was produced from.
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    pub fn format(&self) -> RasterFormat {
        self.format
    }

    /// Copy the pixels out into a fresh working buffer.
    pub fn to_buffer(&self) -> PixelBuffer {
        PixelBuffer::clone(&self.buffer)
    }

    /// True if both rasters share the same underlying pixel allocation.
    pub fn ptr_eq(&self, other: &Raster) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }
}

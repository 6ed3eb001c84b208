//! Image encoding for Retouch.
//!
//! Lossy edits (colour adjustment, compression, quality presets) are written
//! as JPEG with a quality parameter. Lossless edits (crop, flip, rotate,
//! overlay, background removal) are written as PNG so repeated application is
//! pixel exact.

mod jpeg;
mod png;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::raster::PixelBuffer;

pub use jpeg::encode_jpeg;
pub use png::encode_png;

/// Errors that can occur while encoding pixels.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The encoder itself failed (surface unavailable, writer error)
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: &'static str,
        message: String,
    },
}

/// Output encoding chosen by an edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Lossy JPEG with quality 1-100.
    Jpeg { quality: u8 },
    /// Lossless PNG, alpha preserved.
    Png,
}

impl OutputFormat {
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg { .. })
    }
}

/// Encode a pixel buffer in the requested output format.
pub fn encode(buffer: &PixelBuffer, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
    match format {
        OutputFormat::Jpeg { quality } => {
            encode_jpeg(&buffer.pixels, buffer.width, buffer.height, quality)
        }
        OutputFormat::Png => encode_png(&buffer.pixels, buffer.width, buffer.height),
    }
}

/// Shared validation for RGBA input.
fn validate_rgba(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * 4;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }

    Ok(())
}

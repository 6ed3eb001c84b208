//! Image cropping operations.
//!
//! Crops are direct pixel copies of an integer rectangle. Aspect-ratio crops
//! first compute the largest centered rectangle of the requested ratio.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::geometry::PixelRect;
use crate::raster::{PixelBuffer, BYTES_PER_PIXEL};

/// Target aspect ratio expressed as width / height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: f64,
    pub height: f64,
}

impl AspectRatio {
    pub const SQUARE: AspectRatio = AspectRatio {
        width: 1.0,
        height: 1.0,
    };

    pub fn new(width: f64, height: f64) -> Result<Self, EditError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(EditError::invalid(format!(
                "aspect ratio must be positive, got {width}:{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Width divided by height.
    pub fn value(&self) -> f64 {
        self.width / self.height
    }
}

impl FromStr for AspectRatio {
    type Err = EditError;

    /// Parses `"W:H"` (e.g. `"16:9"`) or a bare decimal ratio (e.g. `"1.5"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| EditError::invalid(format!("malformed aspect ratio '{s}'")))
        };

        match s.split_once(':') {
            Some((w, h)) => AspectRatio::new(parse(w)?, parse(h)?),
            None => AspectRatio::new(parse(s)?, 1.0),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// Largest rectangle of the given ratio centered in a `width` x `height`
/// image.
///
/// A source wider than the target keeps its full height and is trimmed
/// equally left and right; otherwise it keeps its full width and is trimmed
/// top and bottom. Coordinates are rounded to whole pixels.
pub fn centered_ratio_rect(width: u32, height: u32, ratio: AspectRatio) -> PixelRect {
    let (w, h) = (width as f64, height as f64);
    let target = ratio.value();
    let source = w / h;

    if source > target {
        let crop_w = (h * target).round().clamp(1.0, w);
        let sx = ((w - crop_w) / 2.0).round();
        PixelRect::new(sx as u32, 0, crop_w as u32, height)
    } else {
        let crop_h = (w / target).round().clamp(1.0, h);
        let sy = ((h - crop_h) / 2.0).round();
        PixelRect::new(0, sy as u32, width, crop_h as u32)
    }
}

/// Copy a pixel rectangle out of an image.
///
/// The rectangle is clamped to the image bounds and the output is never
/// smaller than 1x1 for a non-empty source.
pub fn apply_crop(image: &PixelBuffer, rect: PixelRect) -> PixelBuffer {
    // Fast path: full crop returns a clone
    if rect.x == 0 && rect.y == 0 && rect.width >= image.width && rect.height >= image.height {
        return image.clone();
    }

    let px_left = rect.x.min(image.width.saturating_sub(1));
    let px_top = rect.y.min(image.height.saturating_sub(1));
    let px_right = px_left.saturating_add(rect.width).min(image.width);
    let px_bottom = px_top.saturating_add(rect.height).min(image.height);

    let out_width = px_right.saturating_sub(px_left).max(1);
    let out_height = px_bottom.saturating_sub(px_top).max(1);

    let row_bytes = out_width as usize * BYTES_PER_PIXEL;
    let mut output = Vec::with_capacity(row_bytes * out_height as usize);

    // Copy pixel data row by row
    for y in px_top..px_top + out_height {
        let start = image.offset(px_left, y);
        output.extend_from_slice(&image.pixels[start..start + row_bytes]);
    }

    PixelBuffer::new(out_width, out_height, output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

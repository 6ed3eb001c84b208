//! Overlay compositing
//!
//! Blends one RGBA buffer over another at a global opacity using the
//! standard source-over operator. There are no blend modes and no per-pixel
//! masks beyond the overlay's own alpha channel.
//!
//! ## Algorithm
//! The overlay is stretched to its placement by bilinear sampling, and only
//! the part of the placement that lands on the base is visited. For each of
//! those pixels:
//! 1. `sa = overlay_alpha * opacity`
//! 2. `out_a = sa + base_alpha * (1 - sa)`
//! 3. `out = (overlay * sa + base * base_alpha * (1 - sa)) / out_a`

use serde::{Deserialize, Serialize};

use crate::geometry::{DisplayRect, PixelRect};
use crate::raster::PixelBuffer;

/// Where an overlay lands on the base raster, in natural pixels.
///
/// The origin may be negative or past the raster edge; pixels that fall
/// outside the base are dropped when compositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Convert an overlay rectangle from display space to the natural space
    /// of a raster rendered in `image_box`.
    ///
    /// X and Y use independent scale factors. Returns `None` for a degenerate
    /// image box or an overlay that rounds to zero pixels.
    pub fn from_display(
        rect: &DisplayRect,
        image_box: &DisplayRect,
        natural_width: u32,
        natural_height: u32,
    ) -> Option<Self> {
        let (scale_x, scale_y) = image_box.natural_scale(natural_width, natural_height)?;

        let width = (rect.width * scale_x).round();
        let height = (rect.height * scale_y).round();
        if width < 1.0 || height < 1.0 {
            return None;
        }

        Some(Self {
            x: ((rect.x - image_box.x) * scale_x).round() as i64,
            y: ((rect.y - image_box.y) * scale_y).round() as i64,
            width: width as u32,
            height: height as u32,
        })
    }

    /// The part of this placement that lands on a `width` x `height` raster,
    /// or `None` if it misses the raster entirely.
    pub fn visible_on(&self, width: u32, height: u32) -> Option<PixelRect> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.x.saturating_add(self.width as i64).min(width as i64);
        let y1 = self.y.saturating_add(self.height as i64).min(height as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRect::new(
            x0 as u32,
            y0 as u32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        ))
    }
}

/// Composite `overlay`, stretched to `placement`, onto a copy of `base`.
///
/// Only the visible part of the placement is sampled, so the cost is bounded
/// by the base size however large the placement is. `opacity` is clamped to
/// [0, 1]. At 0 the base is returned unchanged.
pub fn composite_over(
    base: &PixelBuffer,
    overlay: &PixelBuffer,
    placement: Placement,
    opacity: f32,
) -> PixelBuffer {
    let mut output = base.clone();
    let opacity = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if opacity <= 0.0 || overlay.is_empty() {
        return output;
    }
    let Some(visible) = placement.visible_on(base.width, base.height) else {
        return output;
    };

    let step_x = overlay.width as f64 / placement.width as f64;
    let step_y = overlay.height as f64 / placement.height as f64;

    for by in visible.y..visible.bottom() {
        let sy = ((by as i64 - placement.y) as f64 + 0.5) * step_y - 0.5;
        for bx in visible.x..visible.right() {
            let sx = ((bx as i64 - placement.x) as f64 + 0.5) * step_x - 0.5;
            let src = sample_bilinear(overlay, sx, sy);
            let dst = base.offset(bx, by);

            let sa = src[3] / 255.0 * opacity;
            // Skip pixels the overlay doesn't cover
            if sa <= 0.0 {
                continue;
            }

            let da = output.pixels[dst + 3] as f32 / 255.0;
            let out_a = sa + da * (1.0 - sa);

            for c in 0..3 {
                let s = src[c];
                let d = output.pixels[dst + c] as f32;
                let v = (s * sa + d * da * (1.0 - sa)) / out_a;
                output.pixels[dst + c] = v.round().clamp(0.0, 255.0) as u8;
            }
            output.pixels[dst + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }

    output
}

/// Bilinear RGBA sample at a fractional source coordinate, clamped to the
/// buffer edges.
fn sample_bilinear(buffer: &PixelBuffer, x: f64, y: f64) -> [f32; 4] {
    let x = x.clamp(0.0, (buffer.width - 1) as f64);
    let y = y.clamp(0.0, (buffer.height - 1) as f64);
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(buffer.width - 1);
    let y1 = (y0 + 1).min(buffer.height - 1);
    let tx = (x - x0 as f64) as f32;
    let ty = (y - y0 as f64) as f32;

    let p00 = buffer.offset(x0, y0);
    let p10 = buffer.offset(x1, y0);
    let p01 = buffer.offset(x0, y1);
    let p11 = buffer.offset(x1, y1);

    let mut out = [0.0f32; 4];
    for (c, value) in out.iter_mut().enumerate() {
        let top = buffer.pixels[p00 + c] as f32 * (1.0 - tx) + buffer.pixels[p10 + c] as f32 * tx;
        let bottom = buffer.pixels[p01 + c] as f32 * (1.0 - tx) + buffer.pixels[p11 + c] as f32 * tx;
        *value = top * (1.0 - ty) + bottom * ty;
    }
    out
}

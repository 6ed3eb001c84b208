//! Small geometry types shared by the interactive engines.
//!
//! Two coordinate spaces are in play:
//! - **Display space**: CSS-pixel coordinates inside the editor container,
//!   origin at the container's top-left corner (`f64`).
//! - **Natural space**: integer pixel coordinates of the raster itself.
//!
//! Conversions between the two are always computed from a freshly measured
//! [`DisplayRect`] and never cached across container resizes.

use serde::{Deserialize, Serialize};

/// Width and height of a display-space area (container or viewport).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Center point of an area of this size anchored at the origin.
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Axis-aligned rectangle in display space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True if this rectangle lies entirely inside a container of `size`
    /// anchored at the origin, with a small tolerance for float error.
    pub fn is_inside(&self, size: Size) -> bool {
        const EPS: f64 = 1e-6;
        self.x >= -EPS
            && self.y >= -EPS
            && self.right() <= size.width + EPS
            && self.bottom() <= size.height + EPS
    }

    /// Scale factors that map this display box onto a raster of the given
    /// natural dimensions. X and Y are independent: the rendered box may be
    /// stretched relative to the raster.
    pub fn natural_scale(&self, natural_width: u32, natural_height: u32) -> Option<(f64, f64)> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some((
            natural_width as f64 / self.width,
            natural_height as f64 / self.height,
        ))
    }
}

/// Integer rectangle in natural (raster) pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Map a display-space rectangle into natural pixel space.
    ///
    /// `image_box` is where the raster is currently rendered inside the
    /// container. Each edge is rounded to the nearest pixel and the result is
    /// clipped to the raster. Returns `None` if nothing of `rect` overlaps the
    /// raster.
    pub fn from_display(
        rect: &DisplayRect,
        image_box: &DisplayRect,
        natural_width: u32,
        natural_height: u32,
    ) -> Option<Self> {
        let (scale_x, scale_y) = image_box.natural_scale(natural_width, natural_height)?;

        let left = ((rect.x - image_box.x) * scale_x).round();
        let top = ((rect.y - image_box.y) * scale_y).round();
        let right = left + (rect.width * scale_x).round();
        let bottom = top + (rect.height * scale_y).round();

        let left = left.clamp(0.0, natural_width as f64) as u32;
        let top = top.clamp(0.0, natural_height as f64) as u32;
        let right = right.clamp(0.0, natural_width as f64) as u32;
        let bottom = bottom.clamp(0.0, natural_height as f64) as u32;

        if right <= left || bottom <= top {
            return None;
        }

        Some(Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        })
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_scale_independent_axes() {
        let image_box = DisplayRect::new(0.0, 0.0, 200.0, 100.0);
        let (sx, sy) = image_box.natural_scale(400, 400).unwrap();
        assert!((sx - 2.0).abs() < 1e-9);
        assert!((sy - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_natural_scale_degenerate_box() {
        let image_box = DisplayRect::new(0.0, 0.0, 0.0, 100.0);
        assert!(image_box.natural_scale(400, 400).is_none());
    }

    #[test]
    fn test_pixel_rect_from_display_with_offset_box() {
        // Image rendered at half size, letterboxed 10px from the top.
        let image_box = DisplayRect::new(0.0, 10.0, 200.0, 150.0);
        let rect = DisplayRect::new(50.0, 35.0, 100.0, 50.0);

        let px = PixelRect::from_display(&rect, &image_box, 400, 300).unwrap();
        assert_eq!(px, PixelRect::new(100, 50, 200, 100));
    }

    #[test]
    fn test_pixel_rect_clipped_to_raster() {
        let image_box = DisplayRect::new(20.0, 20.0, 100.0, 100.0);
        let rect = DisplayRect::new(0.0, 0.0, 60.0, 60.0);

        let px = PixelRect::from_display(&rect, &image_box, 100, 100).unwrap();
        assert_eq!(px, PixelRect::new(0, 0, 40, 40));
    }

    #[test]
    fn test_pixel_rect_outside_raster() {
        let image_box = DisplayRect::new(100.0, 100.0, 50.0, 50.0);
        let rect = DisplayRect::new(0.0, 0.0, 40.0, 40.0);
        assert!(PixelRect::from_display(&rect, &image_box, 50, 50).is_none());
    }

    #[test]
    fn test_is_inside() {
        let size = Size::new(100.0, 100.0);
        assert!(DisplayRect::new(0.0, 0.0, 100.0, 100.0).is_inside(size));
        assert!(!DisplayRect::new(1.0, 0.0, 100.0, 100.0).is_inside(size));
        assert!(!DisplayRect::new(-1.0, 0.0, 10.0, 10.0).is_inside(size));
    }
}

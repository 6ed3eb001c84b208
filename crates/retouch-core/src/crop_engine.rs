//! Interactive crop selection.
//!
//! The selection is a rectangle in display coordinates that always lies
//! fully inside the container and is never smaller than the minimum size
//! (or the container, if that is smaller). Drags are computed from the
//! rectangle at drag start plus the total pointer displacement, so rounding
//! never accumulates.
//!
//! Applying converts the selection to natural pixels against the image box
//! measured by the host at apply time and crops through the pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::CropConfig;
use crate::error::EditError;
use crate::geometry::{DisplayRect, PixelRect, Size};
use crate::pipeline::EditPipeline;
use crate::raster::Raster;

/// Which part of the selection a drag grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropHandle {
    /// The body: moves the whole rectangle.
    Move,
    /// Bottom-right corner: resizes with the top-left corner fixed.
    Se,
    /// Top-left corner: resizes with the bottom-right corner fixed.
    Nw,
}

impl FromStr for CropHandle {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "move" => Ok(CropHandle::Move),
            "se" => Ok(CropHandle::Se),
            "nw" => Ok(CropHandle::Nw),
            other => Err(EditError::invalid(format!("unknown crop handle '{other}'"))),
        }
    }
}

impl fmt::Display for CropHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CropHandle::Move => "move",
            CropHandle::Se => "se",
            CropHandle::Nw => "nw",
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    handle: CropHandle,
    start_x: f64,
    start_y: f64,
    start: DisplayRect,
}

/// Crop selection state.
#[derive(Debug, Clone)]
pub struct CropEngine {
    config: CropConfig,
    container: Size,
    rect: DisplayRect,
    drag: Option<Drag>,
}

impl CropEngine {
    pub fn new(config: CropConfig, container: Size) -> Self {
        let rect = initial_rect(&config, container);
        Self {
            config,
            container,
            rect,
            drag: None,
        }
    }

    /// Current selection in display coordinates.
    pub fn rect(&self) -> DisplayRect {
        self.rect
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Minimum selection width and height for the current container.
    pub fn min_size(&self) -> (f64, f64) {
        min_size(&self.config, self.container)
    }

    /// The container was resized. The selection is shrunk and shifted as
    /// needed to stay inside, and any drag in progress ends.
    pub fn set_container(&mut self, width: f64, height: f64) {
        self.container = Size::new(width, height);
        self.drag = None;

        let (min_w, min_h) = self.min_size();
        let r = &mut self.rect;
        r.width = clamp(r.width, min_w, self.container.width);
        r.height = clamp(r.height, min_h, self.container.height);
        r.x = clamp(r.x, 0.0, self.container.width - r.width);
        r.y = clamp(r.y, 0.0, self.container.height - r.height);
        tracing::debug!(rect = ?self.rect, "crop container resized");
    }

    /// Return the selection to its initial placement.
    pub fn reset(&mut self) {
        self.rect = initial_rect(&self.config, self.container);
        self.drag = None;
    }

    pub fn begin_drag(&mut self, handle: CropHandle, x: f64, y: f64) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        self.drag = Some(Drag {
            handle,
            start_x: x,
            start_y: y,
            start: self.rect,
        });
    }

    /// Update the selection for a pointer at (x, y). Without an active drag
    /// this does nothing.
    pub fn drag_to(&mut self, x: f64, y: f64) -> DisplayRect {
        let Some(drag) = self.drag else {
            return self.rect;
        };
        if !(x.is_finite() && y.is_finite()) {
            return self.rect;
        }

        let dx = x - drag.start_x;
        let dy = y - drag.start_y;
        let s = drag.start;
        let (min_w, min_h) = self.min_size();
        let (cw, ch) = (self.container.width, self.container.height);

        self.rect = match drag.handle {
            CropHandle::Move => DisplayRect::new(
                clamp(s.x + dx, 0.0, cw - s.width),
                clamp(s.y + dy, 0.0, ch - s.height),
                s.width,
                s.height,
            ),
            CropHandle::Se => DisplayRect::new(
                s.x,
                s.y,
                clamp(s.width + dx, min_w, cw - s.x),
                clamp(s.height + dy, min_h, ch - s.y),
            ),
            CropHandle::Nw => {
                let (right, bottom) = (s.right(), s.bottom());
                let x = clamp(s.x + dx, 0.0, right - min_w);
                let y = clamp(s.y + dy, 0.0, bottom - min_h);
                DisplayRect::new(x, y, right - x, bottom - y)
            }
        };
        self.rect
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Crop the pipeline's current raster to the selection.
    ///
    /// `image_box` is where the raster is rendered inside the container,
    /// measured now. On success the selection resets for the new image.
    pub fn apply<'p>(
        &mut self,
        pipeline: &'p mut EditPipeline,
        image_box: DisplayRect,
    ) -> Result<&'p Raster, EditError> {
        let (width, height) = pipeline
            .current()
            .map(Raster::dimensions)
            .ok_or(EditError::NoImage)?;

        let rect = PixelRect::from_display(&self.rect, &image_box, width, height).ok_or_else(
            || EditError::invalid("crop selection does not overlap the image"),
        )?;
        tracing::debug!(selection = ?self.rect, ?image_box, ?rect, "applying crop");

        let raster = pipeline.crop(rect)?;
        self.reset();
        Ok(raster)
    }

    /// Discard the selection. The pipeline is not touched.
    pub fn cancel(&mut self) {
        self.reset();
    }
}

fn min_size(config: &CropConfig, container: Size) -> (f64, f64) {
    (
        config.min_size.min(container.width),
        config.min_size.min(container.height),
    )
}

fn initial_rect(config: &CropConfig, container: Size) -> DisplayRect {
    let (min_w, min_h) = min_size(config, container);
    let width = (container.width * (1.0 - 2.0 * config.initial_inset)).max(min_w);
    let height = (container.height * (1.0 - 2.0 * config.initial_inset)).max(min_h);
    DisplayRect::new(
        (container.width - width) / 2.0,
        (container.height - height) / 2.0,
        width,
        height,
    )
}

/// Clamp that favours `lo` when the range is inverted by float error.
#[inline]
fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::OutputFormat;
    use crate::raster::PixelBuffer;

    fn engine(w: f64, h: f64) -> CropEngine {
        CropEngine::new(CropConfig::default(), Size::new(w, h))
    }

    #[test]
    fn test_initial_rect_is_inset() {
        let e = engine(500.0, 400.0);
        assert_eq!(e.rect(), DisplayRect::new(50.0, 40.0, 400.0, 320.0));
    }

    #[test]
    fn test_initial_rect_small_container() {
        let e = engine(30.0, 100.0);
        let r = e.rect();
        assert_eq!(r.width, 30.0);
        assert!(r.is_inside(e.container()));
    }

    #[test]
    fn test_move_is_clamped() {
        let mut e = engine(500.0, 400.0);
        e.begin_drag(CropHandle::Move, 100.0, 100.0);

        let r = e.drag_to(130.0, 90.0);
        assert_eq!((r.x, r.y), (80.0, 30.0));

        let r = e.drag_to(-1000.0, 1000.0);
        assert_eq!((r.x, r.y), (0.0, 80.0));
        assert_eq!((r.width, r.height), (400.0, 320.0));
    }

    #[test]
    fn test_se_resize_respects_min_and_container() {
        let mut e = engine(500.0, 400.0);
        e.begin_drag(CropHandle::Se, 450.0, 360.0);

        let r = e.drag_to(10.0, 10.0);
        assert_eq!((r.x, r.y, r.width, r.height), (50.0, 40.0, 40.0, 40.0));

        let r = e.drag_to(900.0, 900.0);
        assert_eq!((r.width, r.height), (450.0, 360.0));
        assert!(r.is_inside(e.container()));
    }

    #[test]
    fn test_nw_resize_keeps_opposite_corner() {
        let mut e = engine(500.0, 400.0);
        let before = e.rect();
        e.begin_drag(CropHandle::Nw, 50.0, 40.0);

        let r = e.drag_to(100.0, 60.0);
        assert_eq!((r.x, r.y), (100.0, 60.0));
        assert_eq!((r.right(), r.bottom()), (before.right(), before.bottom()));

        // Past the minimum, the corner stops
        let r = e.drag_to(1000.0, 1000.0);
        assert_eq!((r.width, r.height), (40.0, 40.0));
        assert_eq!((r.right(), r.bottom()), (before.right(), before.bottom()));

        // Past the container edge
        let r = e.drag_to(-500.0, -500.0);
        assert_eq!((r.x, r.y), (0.0, 0.0));
        assert_eq!((r.right(), r.bottom()), (before.right(), before.bottom()));
    }

    #[test]
    fn test_drag_without_begin_is_ignored() {
        let mut e = engine(500.0, 400.0);
        let before = e.rect();
        assert_eq!(e.drag_to(0.0, 0.0), before);

        e.begin_drag(CropHandle::Move, 100.0, 100.0);
        e.end_drag();
        assert_eq!(e.drag_to(0.0, 0.0), before);
    }

    #[test]
    fn test_set_container_reclamps() {
        let mut e = engine(500.0, 400.0);
        e.begin_drag(CropHandle::Move, 0.0, 0.0);
        e.drag_to(100.0, 80.0);

        e.set_container(300.0, 200.0);
        let r = e.rect();
        assert!(r.is_inside(e.container()));
        assert_eq!((r.width, r.height), (300.0, 200.0));
        assert!(!e.is_dragging());
    }

    #[test]
    fn test_parse_handle() {
        assert_eq!("se".parse::<CropHandle>().unwrap(), CropHandle::Se);
        assert_eq!(CropHandle::Nw.to_string(), "nw");
        assert!("ne".parse::<CropHandle>().is_err());
    }

    fn pipeline_with(width: u32, height: u32) -> EditPipeline {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        let raster =
            Raster::encode(PixelBuffer::new(width, height, pixels), OutputFormat::Png).unwrap();
        let mut pipeline = EditPipeline::default();
        pipeline.load_raster(raster).unwrap();
        pipeline
    }

    #[test]
    fn test_apply_maps_to_natural_pixels() {
        let mut pipeline = pipeline_with(200, 100);
        // Raster rendered at half size: 100x50 display pixels
        let mut e = engine(100.0, 50.0);
        e.begin_drag(CropHandle::Move, 0.0, 0.0);
        e.drag_to(-100.0, -100.0);
        e.end_drag();

        let image_box = DisplayRect::new(0.0, 0.0, 100.0, 50.0);
        let cropped = e.apply(&mut pipeline, image_box).unwrap();

        // Selection (0, 0, 80, 40) -> natural (0, 0, 160, 80)
        assert_eq!(cropped.dimensions(), (160, 80));
        assert_eq!(cropped.buffer().pixel(10, 20), [10, 20, 0, 255]);
        assert_eq!(pipeline.undo_depth(), 1);
    }

    #[test]
    fn test_apply_uses_box_measured_at_apply_time() {
        let mut pipeline = pipeline_with(100, 100);
        let mut e = engine(200.0, 200.0);

        // Same selection, two different image boxes
        let small = e.clone().apply(&mut pipeline, DisplayRect::new(0.0, 0.0, 200.0, 200.0));
        assert_eq!(small.unwrap().dimensions(), (80, 80));
        assert_eq!(
            pipeline.current().unwrap().buffer().pixel(0, 0),
            [10, 10, 0, 255]
        );

        pipeline.undo().unwrap();
        let large = e.apply(&mut pipeline, DisplayRect::new(0.0, 0.0, 400.0, 400.0));
        assert_eq!(large.unwrap().dimensions(), (40, 40));
        // Selection starts at display 20 -> natural 5
        assert_eq!(
            pipeline.current().unwrap().buffer().pixel(0, 0),
            [5, 5, 0, 255]
        );
    }

    #[test]
    fn test_apply_outside_image_fails_cleanly() {
        let mut pipeline = pipeline_with(50, 50);
        let mut e = engine(500.0, 400.0);
        let before = e.rect();

        let result = e.apply(&mut pipeline, DisplayRect::new(480.0, 390.0, 20.0, 10.0));
        assert!(matches!(result, Err(EditError::InvalidArgument(_))));
        assert_eq!(pipeline.undo_depth(), 0);
        assert_eq!(e.rect(), before);
    }

    #[test]
    fn test_apply_without_image() {
        let mut pipeline = EditPipeline::default();
        let mut e = engine(100.0, 100.0);
        let result = e.apply(&mut pipeline, DisplayRect::new(0.0, 0.0, 100.0, 100.0));
        assert!(matches!(result, Err(EditError::NoImage)));
    }

    #[test]
    fn test_cancel_leaves_pipeline_alone() {
        let mut pipeline = pipeline_with(50, 50);
        let revision = pipeline.revision();
        let mut e = engine(500.0, 400.0);
        e.begin_drag(CropHandle::Se, 0.0, 0.0);
        e.drag_to(-200.0, -200.0);

        e.cancel();
        assert_eq!(e.rect(), DisplayRect::new(50.0, 40.0, 400.0, 320.0));
        assert_eq!(pipeline.revision(), revision);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

//! Single imported overlay, positioned in display space and composited onto
//! the current raster on apply.
//!
//! At most one overlay is live. Importing replaces any existing overlay;
//! applying or cancelling removes it.

use std::sync::Arc;

use crate::composite::Placement;
use crate::config::OverlayConfig;
use crate::error::EditError;
use crate::geometry::{DisplayRect, Size};
use crate::pipeline::EditPipeline;
use crate::raster::Raster;

/// An imported raster and where it sits over the editor.
#[derive(Debug, Clone)]
pub struct Overlay {
    source: Raster,
    rect: DisplayRect,
    opacity: f64,
}

impl Overlay {
    pub fn source(&self) -> &Raster {
        &self.source
    }

    /// Placement in display coordinates.
    pub fn rect(&self) -> DisplayRect {
        self.rect
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    start_x: f64,
    start_y: f64,
    start: DisplayRect,
}

/// Positions and composites the live overlay.
#[derive(Debug, Clone)]
pub struct OverlayCompositor {
    config: OverlayConfig,
    container: Size,
    overlay: Option<Overlay>,
    drag: Option<Drag>,
}

impl OverlayCompositor {
    pub fn new(config: OverlayConfig, container: Size) -> Self {
        Self {
            config,
            container,
            overlay: None,
            drag: None,
        }
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn container(&self) -> Size {
        self.container
    }

    /// Decode and import an overlay image.
    pub fn import_bytes(&mut self, bytes: impl Into<Arc<[u8]>>) -> Result<&Overlay, EditError> {
        let raster = Raster::decode(bytes)?;
        Ok(self.import(raster))
    }

    /// Import an overlay as a centered square no wider than the configured
    /// fraction of the container.
    pub fn import(&mut self, source: Raster) -> &Overlay {
        let side = (self.container.width * self.config.max_width_fraction)
            .min(self.container.height);
        let (cx, cy) = self.container.center();
        let rect = DisplayRect::new(cx - side / 2.0, cy - side / 2.0, side, side);

        tracing::debug!(
            width = source.width(),
            height = source.height(),
            ?rect,
            "overlay imported"
        );
        self.drag = None;
        self.overlay.insert(Overlay {
            source,
            rect,
            opacity: self.config.default_opacity,
        })
    }

    /// Set the overlay's opacity, clamped to [0, 1]. Non-finite values are
    /// ignored.
    pub fn set_opacity(&mut self, opacity: f64) {
        if !opacity.is_finite() {
            return;
        }
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    /// The container was resized. The overlay shrinks, staying square, and
    /// shifts as needed to stay inside.
    pub fn set_container(&mut self, width: f64, height: f64) {
        self.container = Size::new(width, height);
        self.drag = None;
        if let Some(overlay) = self.overlay.as_mut() {
            let r = &mut overlay.rect;
            let side = r
                .width
                .min(r.height)
                .min(self.container.width)
                .min(self.container.height);
            r.width = side;
            r.height = side;
            r.x = clamp(r.x, 0.0, self.container.width - r.width);
            r.y = clamp(r.y, 0.0, self.container.height - r.height);
        }
    }

    pub fn begin_drag(&mut self, x: f64, y: f64) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        if let Some(overlay) = &self.overlay {
            self.drag = Some(Drag {
                start_x: x,
                start_y: y,
                start: overlay.rect,
            });
        }
    }

    /// Move the overlay with the pointer, keeping it inside the container.
    pub fn drag_to(&mut self, x: f64, y: f64) -> Option<DisplayRect> {
        let drag = self.drag?;
        let overlay = self.overlay.as_mut()?;
        if x.is_finite() && y.is_finite() {
            let s = drag.start;
            overlay.rect.x = clamp(s.x + x - drag.start_x, 0.0, self.container.width - s.width);
            overlay.rect.y = clamp(s.y + y - drag.start_y, 0.0, self.container.height - s.height);
        }
        Some(overlay.rect)
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Composite the overlay onto the pipeline's current raster and clear
    /// it.
    ///
    /// `image_box` is where the base raster is rendered inside the
    /// container, measured now. On failure the overlay stays so the user can
    /// retry, and the pipeline is unchanged.
    pub fn apply<'p>(
        &mut self,
        pipeline: &'p mut EditPipeline,
        image_box: DisplayRect,
    ) -> Result<&'p Raster, EditError> {
        let overlay = self
            .overlay
            .as_ref()
            .ok_or_else(|| EditError::invalid("no overlay to apply"))?;
        let (width, height) = pipeline
            .current()
            .map(Raster::dimensions)
            .ok_or(EditError::NoImage)?;

        let placement = Placement::from_display(&overlay.rect, &image_box, width, height)
            .ok_or_else(|| EditError::invalid("overlay cannot be placed on the image"))?;
        tracing::debug!(?placement, opacity = overlay.opacity, "applying overlay");

        let raster = pipeline.composite(
            overlay.source.buffer(),
            placement,
            overlay.opacity as f32,
        )?;
        self.overlay = None;
        self.drag = None;
        Ok(raster)
    }

    /// Remove the overlay without touching the pipeline.
    pub fn cancel(&mut self) {
        self.overlay = None;
        self.drag = None;
    }
}

#[inline]
fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

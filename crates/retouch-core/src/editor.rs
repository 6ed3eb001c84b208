//! Editor session.
//!
//! Ties the engines together the way the UI uses them: every tool call goes
//! through here, failures become a dismissible [`Notice`] instead of an
//! error, and the viewport transform returns to identity whenever the
//! current raster changes.

use std::sync::Arc;

use crate::adjustments::ColorAdjustment;
use crate::config::EditorConfig;
use crate::crop_engine::{CropEngine, CropHandle};
use crate::error::EditError;
use crate::geometry::{DisplayRect, Size};
use crate::gesture::{FrameRequest, GestureTransformEngine, PointerSample, Transform};
use crate::overlay::OverlayCompositor;
use crate::pipeline::{BackgroundJob, BackgroundRemover, EditPipeline};
use crate::raster::Raster;
use crate::transform::AspectRatio;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The tool was rejected because another one is still running.
    Warning,
    /// The tool failed.
    Error,
}

/// A dismissible message shown after a failed tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl From<&EditError> for Notice {
    fn from(err: &EditError) -> Self {
        let kind = match err {
            EditError::Busy { .. } => NoticeKind::Warning,
            _ => NoticeKind::Error,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// One editing session over a single image.
#[derive(Debug)]
pub struct Editor {
    pipeline: EditPipeline,
    gesture: GestureTransformEngine,
    crop: CropEngine,
    overlay: OverlayCompositor,
    notice: Option<Notice>,
    seen_revision: u64,
}

impl Editor {
    pub fn new(config: EditorConfig, viewport: Size) -> Self {
        let config = config.sanitize();
        Self {
            pipeline: EditPipeline::new(config.pipeline),
            gesture: GestureTransformEngine::new(config.gesture, viewport),
            crop: CropEngine::new(config.crop, viewport),
            overlay: OverlayCompositor::new(config.overlay, viewport),
            notice: None,
            seen_revision: 0,
        }
    }

    pub fn pipeline(&self) -> &EditPipeline {
        &self.pipeline
    }

    pub fn gesture(&self) -> &GestureTransformEngine {
        &self.gesture
    }

    pub fn crop(&self) -> &CropEngine {
        &self.crop
    }

    pub fn overlay(&self) -> &OverlayCompositor {
        &self.overlay
    }

    pub fn current(&self) -> Option<&Raster> {
        self.pipeline.current()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// The editor area was resized.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.gesture.set_viewport(width, height);
        self.crop.set_container(width, height);
        self.overlay.set_container(width, height);
    }

    // ------------------------------------------------------------------
    // Pipeline tools
    // ------------------------------------------------------------------

    pub fn load(&mut self, bytes: impl Into<Arc<[u8]>>) -> bool {
        let result = self.pipeline.load(bytes).map(|_| ());
        if result.is_ok() {
            self.crop.reset();
            self.overlay.cancel();
        }
        self.settle(result)
    }

    pub fn adjust(&mut self, adjustment: ColorAdjustment) -> bool {
        let result = self.pipeline.adjust(adjustment).map(|_| ());
        self.settle(result)
    }

    pub fn crop_to_ratio(&mut self, ratio: AspectRatio) -> bool {
        let result = self.pipeline.crop_to_ratio(ratio).map(|_| ());
        self.settle(result)
    }

    pub fn flip_horizontal(&mut self) -> bool {
        let result = self.pipeline.flip_horizontal().map(|_| ());
        self.settle(result)
    }

    pub fn rotate90(&mut self) -> bool {
        let result = self.pipeline.rotate90().map(|_| ());
        self.settle(result)
    }

    pub fn compress(&mut self, quality_percent: u32) -> bool {
        let result = self.pipeline.compress(quality_percent).map(|_| ());
        self.settle(result)
    }

    pub fn improve_quality(&mut self) -> bool {
        let result = self.pipeline.improve_quality().map(|_| ());
        self.settle(result)
    }

    /// Returns `false` both on failure and when there is nothing to undo;
    /// only failure produces a notice.
    pub fn undo(&mut self) -> bool {
        match self.pipeline.undo() {
            Ok(undone) => {
                self.settle(Ok(()));
                undone
            }
            Err(err) => self.settle(Err(err)),
        }
    }

    pub async fn remove_background<R>(&mut self, remover: &R) -> bool
    where
        R: BackgroundRemover + ?Sized,
    {
        let result = self.pipeline.remove_background(remover).await.map(|_| ());
        self.settle(result)
    }

    pub fn begin_background_removal(&mut self) -> Option<BackgroundJob> {
        match self.pipeline.begin_background_removal() {
            Ok(job) => Some(job),
            Err(err) => {
                self.settle(Err(err));
                None
            }
        }
    }

    pub fn complete_background_removal(&mut self, job: u64, outcome: anyhow::Result<Raster>) -> bool {
        let result = self
            .pipeline
            .complete_background_removal(job, outcome)
            .map(|_| ());
        self.settle(result)
    }

    pub fn abandon_background_removal(&mut self) -> bool {
        self.pipeline.abandon_background_removal()
    }

    // ------------------------------------------------------------------
    // Crop selection
    // ------------------------------------------------------------------

    pub fn begin_crop_drag(&mut self, handle: CropHandle, x: f64, y: f64) {
        self.crop.begin_drag(handle, x, y);
    }

    pub fn crop_drag_to(&mut self, x: f64, y: f64) -> DisplayRect {
        self.crop.drag_to(x, y)
    }

    pub fn end_crop_drag(&mut self) {
        self.crop.end_drag();
    }

    pub fn apply_crop(&mut self, image_box: DisplayRect) -> bool {
        let result = self.crop.apply(&mut self.pipeline, image_box).map(|_| ());
        self.settle(result)
    }

    pub fn cancel_crop(&mut self) {
        self.crop.cancel();
    }

    // ------------------------------------------------------------------
    // Overlay
    // ------------------------------------------------------------------

    pub fn import_overlay(&mut self, bytes: impl Into<Arc<[u8]>>) -> bool {
        let result = self.overlay.import_bytes(bytes).map(|_| ());
        self.settle(result)
    }

    pub fn set_overlay_opacity(&mut self, opacity: f64) {
        self.overlay.set_opacity(opacity);
    }

    pub fn begin_overlay_drag(&mut self, x: f64, y: f64) {
        self.overlay.begin_drag(x, y);
    }

    pub fn overlay_drag_to(&mut self, x: f64, y: f64) -> Option<DisplayRect> {
        self.overlay.drag_to(x, y)
    }

    pub fn end_overlay_drag(&mut self) {
        self.overlay.end_drag();
    }

    pub fn apply_overlay(&mut self, image_box: DisplayRect) -> bool {
        let result = self.overlay.apply(&mut self.pipeline, image_box).map(|_| ());
        self.settle(result)
    }

    pub fn cancel_overlay(&mut self) {
        self.overlay.cancel();
    }

    // ------------------------------------------------------------------
    // Viewport gestures
    // ------------------------------------------------------------------

    pub fn pointer_down(&mut self, sample: PointerSample) -> FrameRequest {
        self.gesture.pointer_down(sample)
    }

    pub fn pointer_move(&mut self, sample: PointerSample) -> FrameRequest {
        self.gesture.pointer_move(sample)
    }

    pub fn pointer_up(&mut self, id: i32) -> FrameRequest {
        self.gesture.pointer_up(id)
    }

    pub fn pointer_cancel(&mut self, id: i32) -> FrameRequest {
        self.gesture.pointer_cancel(id)
    }

    pub fn zoom_at(&mut self, factor: f64, x: f64, y: f64) -> FrameRequest {
        self.gesture.zoom_at(factor, x, y)
    }

    pub fn tick(&mut self) -> FrameRequest {
        self.gesture.tick()
    }

    /// Transform to render this frame.
    pub fn transform(&self) -> Transform {
        self.gesture.display()
    }

    /// Record the outcome of a tool call. Returns `true` on success.
    fn settle(&mut self, result: Result<(), EditError>) -> bool {
        let revision = self.pipeline.revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.gesture.reset();
        }

        match result {
            Ok(()) => {
                self.notice = None;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "tool failed");
                self.notice = Some(Notice::from(&err));
                false
            }
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default(), Size::default())
    }
}

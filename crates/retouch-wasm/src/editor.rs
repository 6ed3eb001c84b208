//! Editor session WASM bindings.
//!
//! Wraps [`retouch_core::Editor`] for a browser host. Tool failures throw the
//! same message that is left in the editor's notice; pointer and tick calls
//! return `true` when the host should request an animation frame.
//!
//! # Example
//!
//! ```typescript
//! import { JsEditor } from '@retouch/wasm';
//!
//! const editor = new JsEditor(container.clientWidth, container.clientHeight, undefined);
//! editor.load(new Uint8Array(await file.arrayBuffer()));
//!
//! const frame = () => {
//!   const [tx, ty, scale] = editor.transform();
//!   img.style.transform = `translate(${tx}px, ${ty}px) scale(${scale})`;
//!   if (editor.tick()) requestAnimationFrame(frame);
//! };
//! canvas.onpointermove = (e) => {
//!   if (editor.pointer_move(e.pointerId, e.offsetX, e.offsetY, e.timeStamp)) {
//!     requestAnimationFrame(frame);
//!   }
//! };
//! ```

use js_sys::Float64Array;
use retouch_core::editor::Editor;
use retouch_core::geometry::{DisplayRect, Size};
use retouch_core::gesture::{FrameRequest, PointerSample};
use retouch_core::pipeline::BackgroundJob;
use retouch_core::{AspectRatio, CropHandle, EditorConfig};
use wasm_bindgen::prelude::*;

use crate::adjustments::ColorAdjustment;
use crate::types::{to_js_error, JsRaster};

/// A background removal handed to the host.
#[wasm_bindgen]
pub struct JsBackgroundJob {
    inner: BackgroundJob,
}

#[wasm_bindgen]
impl JsBackgroundJob {
    /// Job id to pass back on completion.
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> f64 {
        self.inner.id() as f64
    }

    /// The raster to cut the subject out of.
    pub fn source(&self) -> JsRaster {
        JsRaster::from_raster(self.inner.source().clone())
    }
}

/// Editor session for JavaScript.
#[wasm_bindgen]
pub struct JsEditor {
    inner: Editor,
}

#[wasm_bindgen]
impl JsEditor {
    /// Create an editor for a container of the given size. `config` is a
    /// partial `EditorConfig` object or `undefined`.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, config: JsValue) -> Result<JsEditor, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };
        Ok(Self::with_config(config, width, height))
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.inner.set_viewport(width, height);
    }

    // =====================================================================
    // Pipeline tools
    // =====================================================================

    pub fn load(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        let ok = self.inner.load(bytes);
        self.outcome(ok)
    }

    pub fn adjust(&mut self, adjustment: &ColorAdjustment) -> Result<(), JsValue> {
        let ok = self.inner.adjust(adjustment.inner());
        self.outcome(ok)
    }

    /// Crop to a centered `"W:H"` ratio such as `"1:1"` or `"16:9"`.
    pub fn crop_to_ratio(&mut self, ratio: &str) -> Result<(), JsValue> {
        let ratio: AspectRatio = ratio.parse().map_err(to_js_error)?;
        let ok = self.inner.crop_to_ratio(ratio);
        self.outcome(ok)
    }

    pub fn flip_horizontal(&mut self) -> Result<(), JsValue> {
        let ok = self.inner.flip_horizontal();
        self.outcome(ok)
    }

    pub fn rotate90(&mut self) -> Result<(), JsValue> {
        let ok = self.inner.rotate90();
        self.outcome(ok)
    }

    /// Re-encode as JPEG at `quality_percent`; values outside 1..=100 throw.
    pub fn compress(&mut self, quality_percent: u32) -> Result<(), JsValue> {
        let ok = self.inner.compress(quality_percent);
        self.outcome(ok)
    }

    pub fn improve_quality(&mut self) -> Result<(), JsValue> {
        let ok = self.inner.improve_quality();
        self.outcome(ok)
    }

    /// Returns `false` when there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool, JsValue> {
        if self.inner.undo() {
            return Ok(true);
        }
        match self.inner.notice() {
            Some(notice) => Err(to_js_error(&notice.message)),
            None => Ok(false),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn can_undo(&self) -> bool {
        self.inner.pipeline().can_undo()
    }

    #[wasm_bindgen(getter)]
    pub fn undo_depth(&self) -> usize {
        self.inner.pipeline().undo_depth()
    }

    #[wasm_bindgen(getter)]
    pub fn is_busy(&self) -> bool {
        self.inner.pipeline().is_busy()
    }

    /// Changes every time the current raster does.
    #[wasm_bindgen(getter)]
    pub fn revision(&self) -> f64 {
        self.inner.pipeline().revision() as f64
    }

    pub fn current(&self) -> Option<JsRaster> {
        self.inner.current().cloned().map(JsRaster::from_raster)
    }

    /// Encoded bytes of the current raster.
    pub fn current_bytes(&self) -> Option<Vec<u8>> {
        self.inner.current().map(|r| r.encoded().to_vec())
    }

    // =====================================================================
    // Background removal
    // =====================================================================

    /// Mark the editor busy and hand out the raster to process.
    pub fn begin_background_removal(&mut self) -> Result<JsBackgroundJob, JsValue> {
        match self.inner.begin_background_removal() {
            Some(inner) => Ok(JsBackgroundJob { inner }),
            None => Err(self.notice_error()),
        }
    }

    /// Deliver the processed raster. A job that was abandoned is discarded
    /// and reported as an error.
    pub fn complete_background_removal(&mut self, job_id: f64, result: JsRaster) -> Result<(), JsValue> {
        let ok = self
            .inner
            .complete_background_removal(job_id as u64, Ok(result.into_raster()));
        self.outcome(ok)
    }

    /// Report that the removal service failed.
    pub fn fail_background_removal(&mut self, job_id: f64, message: String) -> Result<(), JsValue> {
        let ok = self
            .inner
            .complete_background_removal(job_id as u64, Err(anyhow::anyhow!(message)));
        self.outcome(ok)
    }

    /// Stop waiting for the in-flight job. Returns `true` if one was running.
    pub fn abandon_background_removal(&mut self) -> bool {
        self.inner.abandon_background_removal()
    }

    // =====================================================================
    // Viewport gestures
    // =====================================================================

    pub fn pointer_down(&mut self, id: i32, x: f64, y: f64, t: f64) -> bool {
        self.inner
            .pointer_down(PointerSample::new(id, x, y, t))
            .should_schedule()
    }

    pub fn pointer_move(&mut self, id: i32, x: f64, y: f64, t: f64) -> bool {
        self.inner
            .pointer_move(PointerSample::new(id, x, y, t))
            .should_schedule()
    }

    pub fn pointer_up(&mut self, id: i32) -> bool {
        self.inner.pointer_up(id).should_schedule()
    }

    pub fn pointer_cancel(&mut self, id: i32) -> bool {
        self.inner.pointer_cancel(id).should_schedule()
    }

    pub fn zoom_at(&mut self, factor: f64, x: f64, y: f64) -> bool {
        self.inner.zoom_at(factor, x, y).should_schedule()
    }

    /// Advance one animation frame. Returns `true` if another is needed.
    pub fn tick(&mut self) -> bool {
        self.inner.tick() == FrameRequest::Schedule
    }

    /// `[tx, ty, scale]` to render this frame.
    pub fn transform(&self) -> Float64Array {
        let t = self.inner.transform();
        Float64Array::from(&[t.tx, t.ty, t.scale][..])
    }

    // =====================================================================
    // Crop selection
    // =====================================================================

    /// `handle` is `"move"`, `"se"` or `"nw"`.
    pub fn begin_crop_drag(&mut self, handle: &str, x: f64, y: f64) -> Result<(), JsValue> {
        let handle: CropHandle = handle.parse().map_err(to_js_error)?;
        self.inner.begin_crop_drag(handle, x, y);
        Ok(())
    }

    pub fn crop_drag_to(&mut self, x: f64, y: f64) -> Float64Array {
        rect_array(self.inner.crop_drag_to(x, y))
    }

    pub fn end_crop_drag(&mut self) {
        self.inner.end_crop_drag();
    }

    /// `[x, y, width, height]` of the selection.
    pub fn crop_rect(&self) -> Float64Array {
        rect_array(self.inner.crop().rect())
    }

    /// Crop to the selection. The image box is where the image is rendered
    /// inside the container right now.
    pub fn apply_crop(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<(), JsValue> {
        let ok = self
            .inner
            .apply_crop(DisplayRect::new(x, y, width, height));
        self.outcome(ok)
    }

    pub fn cancel_crop(&mut self) {
        self.inner.cancel_crop();
    }

    // =====================================================================
    // Overlay
    // =====================================================================

    pub fn import_overlay(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        let ok = self.inner.import_overlay(bytes);
        self.outcome(ok)
    }

    pub fn set_overlay_opacity(&mut self, opacity: f64) {
        self.inner.set_overlay_opacity(opacity);
    }

    pub fn begin_overlay_drag(&mut self, x: f64, y: f64) {
        self.inner.begin_overlay_drag(x, y);
    }

    pub fn overlay_drag_to(&mut self, x: f64, y: f64) -> Option<Float64Array> {
        self.inner.overlay_drag_to(x, y).map(rect_array)
    }

    pub fn end_overlay_drag(&mut self) {
        self.inner.end_overlay_drag();
    }

    /// `[x, y, width, height, opacity]` of the live overlay.
    pub fn overlay_state(&self) -> Option<Float64Array> {
        self.inner.overlay().overlay().map(|o| {
            let r = o.rect();
            Float64Array::from(&[r.x, r.y, r.width, r.height, o.opacity()][..])
        })
    }

    pub fn apply_overlay(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<(), JsValue> {
        let ok = self
            .inner
            .apply_overlay(DisplayRect::new(x, y, width, height));
        self.outcome(ok)
    }

    pub fn cancel_overlay(&mut self) {
        self.inner.cancel_overlay();
    }

    // =====================================================================
    // Notices
    // =====================================================================

    /// Message from the last failed tool call, if not yet dismissed.
    pub fn notice(&self) -> Option<String> {
        self.inner.notice().map(|n| n.message.clone())
    }

    pub fn dismiss_notice(&mut self) {
        self.inner.dismiss_notice();
    }
}

impl JsEditor {
    pub(crate) fn with_config(config: EditorConfig, width: f64, height: f64) -> Self {
        Self {
            inner: Editor::new(config, Size::new(width, height)),
        }
    }

    fn outcome(&self, ok: bool) -> Result<(), JsValue> {
        if ok {
            Ok(())
        } else {
            Err(self.notice_error())
        }
    }

    fn notice_error(&self) -> JsValue {
        match self.inner.notice() {
            Some(notice) => to_js_error(&notice.message),
            None => to_js_error("operation failed"),
        }
    }
}

fn rect_array(r: DisplayRect) -> Float64Array {
    Float64Array::from(&[r.x, r.y, r.width, r.height][..])
}

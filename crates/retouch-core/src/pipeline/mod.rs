//! Non-destructive edit pipeline.
//!
//! The pipeline owns the current raster and a bounded undo history. Every
//! successful operation archives the previous raster and installs the result
//! in one step; every failed operation leaves both untouched.
//!
//! ## Output Encoding
//! - Colour adjustment, compression, quality preset: JPEG
//! - Crop, flip, rotate, overlay: PNG
//! - Background removal: whatever the remover returns
//!
//! ## Busy Gate
//! Synchronous operations complete within the call. Background removal is
//! asynchronous; while it is in flight the pipeline is
//! [`PipelineState::Busy`] and every other operation is rejected with
//! [`EditError::Busy`].

mod background;

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::adjustments::{apply_color_adjustment, ColorAdjustment};
use crate::composite::{composite_over, Placement};
use crate::config::PipelineConfig;
use crate::decode::resize_exact;
use crate::encode::OutputFormat;
use crate::error::EditError;
use crate::geometry::PixelRect;
use crate::history::UndoStack;
use crate::raster::{PixelBuffer, Raster};
use crate::transform::{apply_crop, centered_ratio_rect, flip_horizontal, rotate90_cw, AspectRatio};

pub use background::{BackgroundJob, BackgroundRemover};

/// The kind of edit an operation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    Adjust,
    CropToRatio,
    Crop,
    FlipHorizontal,
    Rotate90,
    Compress,
    ImproveQuality,
    RemoveBackground,
    Overlay,
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditKind::Adjust => "colour adjustment",
            EditKind::CropToRatio => "aspect crop",
            EditKind::Crop => "crop",
            EditKind::FlipHorizontal => "flip",
            EditKind::Rotate90 => "rotation",
            EditKind::Compress => "compression",
            EditKind::ImproveQuality => "quality improvement",
            EditKind::RemoveBackground => "background removal",
            EditKind::Overlay => "overlay",
        };
        f.write_str(name)
    }
}

/// Whether an operation is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Busy { kind: EditKind, job: u64 },
}

/// Current raster plus bounded undo history.
#[derive(Debug)]
pub struct EditPipeline {
    config: PipelineConfig,
    current: Option<Raster>,
    history: UndoStack,
    state: PipelineState,
    revision: u64,
    next_job: u64,
}

impl Default for EditPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl EditPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            history: UndoStack::new(config.undo_capacity),
            config,
            current: None,
            state: PipelineState::Idle,
            revision: 0,
            next_job: 1,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Decode bytes and start a new editing session with them.
    ///
    /// History is cleared: the previous image belongs to another session.
    pub fn load(&mut self, bytes: impl Into<Arc<[u8]>>) -> Result<&Raster, EditError> {
        self.ensure_idle()?;
        let raster = Raster::decode(bytes).inspect_err(|e| {
            tracing::warn!(error = %e, "failed to decode source image");
        })?;
        Ok(self.start_session(raster))
    }

    /// Start a new editing session from an already decoded raster.
    pub fn load_raster(&mut self, raster: Raster) -> Result<&Raster, EditError> {
        self.ensure_idle()?;
        Ok(self.start_session(raster))
    }

    fn start_session(&mut self, raster: Raster) -> &Raster {
        tracing::info!(
            width = raster.width(),
            height = raster.height(),
            bytes = raster.encoded().len(),
            "loaded image"
        );
        self.history.clear();
        self.revision += 1;
        self.current.insert(raster)
    }

    pub fn current(&self) -> Option<&Raster> {
        self.current.as_ref()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state != PipelineState::Idle
    }

    /// Bumped every time the current raster changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.is_busy() && !self.history.is_empty()
    }

    /// Brightness, contrast and saturation in that order, then JPEG at the
    /// configured adjustment quality.
    pub fn adjust(&mut self, adjustment: ColorAdjustment) -> Result<&Raster, EditError> {
        let adjustment = adjustment.sanitized();
        let quality = self.config.adjust_quality;
        self.apply(EditKind::Adjust, OutputFormat::Jpeg { quality }, |base| {
            let mut out = base.clone();
            apply_color_adjustment(&mut out.pixels, &adjustment);
            Ok(out)
        })
    }

    /// Crop to the largest centered rectangle of the given ratio.
    pub fn crop_to_ratio(&mut self, ratio: AspectRatio) -> Result<&Raster, EditError> {
        self.apply(EditKind::CropToRatio, OutputFormat::Png, |base| {
            let rect = centered_ratio_rect(base.width, base.height, ratio);
            tracing::debug!(%ratio, ?rect, "aspect crop");
            Ok(apply_crop(base, rect))
        })
    }

    /// Copy an exact pixel rectangle out of the current raster.
    pub fn crop(&mut self, rect: PixelRect) -> Result<&Raster, EditError> {
        self.apply(EditKind::Crop, OutputFormat::Png, |base| {
            if rect.is_empty() || rect.x >= base.width || rect.y >= base.height {
                return Err(EditError::invalid(format!(
                    "crop rectangle {rect:?} is outside a {}x{} image",
                    base.width, base.height
                )));
            }
            Ok(apply_crop(base, rect))
        })
    }

    pub fn flip_horizontal(&mut self) -> Result<&Raster, EditError> {
        self.apply(EditKind::FlipHorizontal, OutputFormat::Png, |base| {
            Ok(flip_horizontal(base))
        })
    }

    /// Rotate 90 degrees clockwise.
    pub fn rotate90(&mut self) -> Result<&Raster, EditError> {
        self.apply(EditKind::Rotate90, OutputFormat::Png, |base| Ok(rotate90_cw(base)))
    }

    /// Re-encode as JPEG at `quality_percent` (1-100) with no other change.
    pub fn compress(&mut self, quality_percent: u32) -> Result<&Raster, EditError> {
        let quality = u8::try_from(quality_percent)
            .ok()
            .filter(|q| (1..=100).contains(q))
            .ok_or_else(|| {
                EditError::invalid(format!(
                    "quality must be between 1 and 100, got {quality_percent}"
                ))
            })?;
        self.apply(EditKind::Compress, OutputFormat::Jpeg { quality }, |base| {
            Ok(base.clone())
        })
    }

    /// Apply the configured enhancement preset and re-encode at the
    /// enhancement quality.
    pub fn improve_quality(&mut self) -> Result<&Raster, EditError> {
        let preset = self.config.enhance_preset;
        let quality = self.config.enhance_quality;
        self.apply(EditKind::ImproveQuality, OutputFormat::Jpeg { quality }, |base| {
            let mut out = base.clone();
            apply_color_adjustment(&mut out.pixels, &preset);
            Ok(out)
        })
    }

    /// Stretch `overlay` to the placement and blend it over the current
    /// raster at `opacity`.
    ///
    /// A placement that misses the raster entirely is rejected. Overlays
    /// larger than their placement are downscaled first; upscaling happens
    /// while sampling so nothing outside the raster is ever allocated.
    pub fn composite(
        &mut self,
        overlay: &PixelBuffer,
        placement: Placement,
        opacity: f32,
    ) -> Result<&Raster, EditError> {
        if placement.width == 0 || placement.height == 0 {
            return Err(EditError::invalid("overlay must cover at least one pixel"));
        }
        if overlay.is_empty() {
            return Err(EditError::invalid("overlay image is empty"));
        }
        self.apply(EditKind::Overlay, OutputFormat::Png, |base| {
            if placement.visible_on(base.width, base.height).is_none() {
                return Err(EditError::invalid("overlay does not overlap the image"));
            }
            let width = overlay.width.min(placement.width);
            let height = overlay.height.min(placement.height);
            let source = if (width, height) == (overlay.width, overlay.height) {
                Cow::Borrowed(overlay)
            } else {
                Cow::Owned(resize_exact(overlay, width, height)?)
            };
            Ok(composite_over(base, &source, placement, opacity))
        })
    }

    /// Run a pixel operation against the current raster and commit the
    /// encoded result.
    ///
    /// This is the single entry point every synchronous edit goes through.
    pub fn apply<F>(
        &mut self,
        kind: EditKind,
        format: OutputFormat,
        op: F,
    ) -> Result<&Raster, EditError>
    where
        F: FnOnce(&PixelBuffer) -> Result<PixelBuffer, EditError>,
    {
        self.ensure_idle()?;
        let base = self.current.as_ref().ok_or(EditError::NoImage)?;

        let result = op(base.buffer()).and_then(|buffer| Raster::encode(buffer, format));
        match result {
            Ok(raster) => Ok(self.commit(kind, raster)),
            Err(err) => {
                tracing::warn!(%kind, error = %err, "edit failed, image unchanged");
                Err(err)
            }
        }
    }

    /// Restore the most recently archived raster.
    ///
    /// Returns `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditError> {
        self.ensure_idle()?;
        match self.history.pop() {
            Some(previous) => {
                tracing::info!(
                    width = previous.width(),
                    height = previous.height(),
                    remaining = self.history.len(),
                    "undo"
                );
                self.current = Some(previous);
                self.revision += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Run background removal through an external collaborator.
    ///
    /// If the returned future is dropped before it resolves, the job is
    /// abandoned and the pipeline returns to idle with nothing changed.
    pub async fn remove_background<R>(&mut self, remover: &R) -> Result<Raster, EditError>
    where
        R: BackgroundRemover + ?Sized,
    {
        let job = self.begin_background_removal()?;
        let mut guard = JobGuard {
            pipeline: self,
            job: job.id,
            finished: false,
        };

        let outcome = remover.remove_background(&job.source).await;

        guard.finished = true;
        let result = guard
            .pipeline
            .complete_background_removal(job.id, outcome)
            .cloned();
        drop(guard);
        result
    }

    /// Mark the pipeline busy and hand out a snapshot for an external
    /// background removal.
    pub fn begin_background_removal(&mut self) -> Result<BackgroundJob, EditError> {
        self.ensure_idle()?;
        let source = self.current.clone().ok_or(EditError::NoImage)?;

        let id = self.next_job;
        self.next_job += 1;
        self.state = PipelineState::Busy {
            kind: EditKind::RemoveBackground,
            job: id,
        };
        tracing::debug!(job = id, "background removal started");

        Ok(BackgroundJob { id, source })
    }

    /// Deliver the outcome of a background removal job.
    ///
    /// A result for a job that is no longer in flight (abandoned, or never
    /// started) is discarded and reported as an operation failure.
    pub fn complete_background_removal(
        &mut self,
        job: u64,
        outcome: anyhow::Result<Raster>,
    ) -> Result<&Raster, EditError> {
        let in_flight = matches!(
            self.state,
            PipelineState::Busy { kind: EditKind::RemoveBackground, job: running } if running == job
        );
        if !in_flight {
            tracing::warn!(job, "discarding background removal result for a job no longer in flight");
            return Err(EditError::operation(
                "background removal result arrived after the request was abandoned",
            ));
        }

        self.state = PipelineState::Idle;
        match outcome {
            Ok(raster) => Ok(self.commit(EditKind::RemoveBackground, raster)),
            Err(err) => {
                tracing::warn!(job, error = %err, "background removal failed, image unchanged");
                Err(EditError::operation(format!("Background removal failed: {err}")))
            }
        }
    }

    /// Give up on an in-flight background removal. Returns `true` if a job
    /// was abandoned.
    pub fn abandon_background_removal(&mut self) -> bool {
        match self.state {
            PipelineState::Busy {
                kind: EditKind::RemoveBackground,
                job,
            } => {
                tracing::debug!(job, "background removal abandoned");
                self.state = PipelineState::Idle;
                true
            }
            _ => false,
        }
    }

    fn ensure_idle(&self) -> Result<(), EditError> {
        match self.state {
            PipelineState::Idle => Ok(()),
            PipelineState::Busy { kind, .. } => {
                tracing::warn!(running = %kind, "operation rejected while busy");
                Err(EditError::Busy { running: kind })
            }
        }
    }

    fn commit(&mut self, kind: EditKind, raster: Raster) -> &Raster {
        tracing::info!(
            %kind,
            width = raster.width(),
            height = raster.height(),
            bytes = raster.encoded().len(),
            "edit applied"
        );
        if let Some(previous) = self.current.take() {
            self.history.push(previous);
        }
        self.revision += 1;
        self.current.insert(raster)
    }
}

/// Returns the pipeline to idle if a background removal future is dropped
/// before completing.
struct JobGuard<'a> {
    pipeline: &'a mut EditPipeline,
    job: u64,
    finished: bool,
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        if !self.finished
            && matches!(self.pipeline.state, PipelineState::Busy { job, .. } if job == self.job)
        {
            self.pipeline.abandon_background_removal();
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

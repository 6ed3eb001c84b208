//! Retouch Core - Interactive photo retouching engine
//!
//! This crate provides the editing core behind the Retouch editor: a
//! non-destructive edit pipeline with bounded undo, the viewport gesture
//! engine (pan, pinch and wheel zoom with inertia), crop selection and
//! overlay compositing.
//!
//! ## Layout
//!
//! - [`pipeline`]: current raster, undo history and every pixel-changing tool
//! - [`gesture`]: display-only viewport transform driven by pointer events
//! - [`crop_engine`] / [`overlay`]: interactive selections that commit
//!   through the pipeline
//! - [`editor`]: the session that wires the above together for a UI
//!
//! The crate emits `tracing` events but never installs a subscriber.

pub mod adjustments;
pub mod composite;
pub mod config;
pub mod crop_engine;
pub mod decode;
pub mod editor;
pub mod encode;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod overlay;
pub mod pipeline;
pub mod raster;
pub mod transform;

pub use adjustments::ColorAdjustment;
pub use config::EditorConfig;
pub use crop_engine::{CropEngine, CropHandle};
pub use editor::{Editor, Notice, NoticeKind};
pub use encode::OutputFormat;
pub use error::EditError;
pub use geometry::{DisplayRect, PixelRect, Size};
pub use gesture::{FrameRequest, GestureTransformEngine, PointerSample, Transform};
pub use overlay::OverlayCompositor;
pub use pipeline::{BackgroundJob, BackgroundRemover, EditKind, EditPipeline, PipelineState};
pub use raster::{PixelBuffer, Raster, RasterFormat};
pub use transform::AspectRatio;

//! Editor configuration.
//!
//! All sections deserialize with `#[serde(default)]`, so a host only needs to
//! supply the values it wants to override. `sanitize()` clamps anything out
//! of range back to something the engines can work with.

use serde::{Deserialize, Serialize};

use crate::adjustments::ColorAdjustment;

/// Complete editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub gesture: GestureConfig,
    pub pipeline: PipelineConfig,
    pub crop: CropConfig,
    pub overlay: OverlayConfig,
}

impl EditorConfig {
    pub fn sanitize(mut self) -> Self {
        self.gesture.sanitize();
        self.pipeline.sanitize();
        self.crop.sanitize();
        self.overlay.sanitize();
        self
    }
}

/// Viewport gesture and animation tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Smallest display scale.
    pub min_scale: f64,
    /// Largest display scale.
    pub max_scale: f64,
    /// Fraction of the remaining distance covered per frame.
    pub smoothing: f64,
    /// Per-frame velocity decay during inertia.
    pub friction: f64,
    /// Velocity (units/frame) below which inertia stops.
    pub velocity_epsilon: f64,
    /// Duration of one animation frame in milliseconds.
    pub frame_ms: f64,
    /// Translation distance (px) treated as converged.
    pub converge_translation: f64,
    /// Scale distance treated as converged.
    pub converge_scale: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.3,
            max_scale: 4.0,
            smoothing: 0.15,
            friction: 0.92,
            velocity_epsilon: 0.05,
            frame_ms: 16.67,
            converge_translation: 0.3,
            converge_scale: 0.001,
        }
    }
}

impl GestureConfig {
    fn sanitize(&mut self) {
        let defaults = Self::default();
        if !(self.min_scale.is_finite() && self.min_scale > 0.0) {
            self.min_scale = defaults.min_scale;
        }
        if !(self.max_scale.is_finite() && self.max_scale >= self.min_scale) {
            self.max_scale = defaults.max_scale.max(self.min_scale);
        }
        self.smoothing = sanitize_fraction(self.smoothing, defaults.smoothing);
        self.friction = sanitize_fraction(self.friction, defaults.friction);
        self.velocity_epsilon = sanitize_positive(self.velocity_epsilon, defaults.velocity_epsilon);
        self.frame_ms = sanitize_positive(self.frame_ms, defaults.frame_ms);
        self.converge_translation =
            sanitize_positive(self.converge_translation, defaults.converge_translation);
        self.converge_scale = sanitize_positive(self.converge_scale, defaults.converge_scale);
    }
}

/// Edit pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of archived rasters.
    pub undo_capacity: usize,
    /// JPEG quality used after a colour adjustment.
    pub adjust_quality: u8,
    /// JPEG quality used by the quality-improvement preset.
    pub enhance_quality: u8,
    /// Colour preset applied by the quality-improvement tool.
    pub enhance_preset: ColorAdjustment,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            undo_capacity: 10,
            adjust_quality: 92,
            enhance_quality: 95,
            enhance_preset: ColorAdjustment::new(105.0, 105.0, 102.0),
        }
    }
}

impl PipelineConfig {
    fn sanitize(&mut self) {
        self.undo_capacity = self.undo_capacity.max(1);
        self.adjust_quality = self.adjust_quality.clamp(1, 100);
        self.enhance_quality = self.enhance_quality.clamp(1, 100);
        self.enhance_preset = self.enhance_preset.sanitized();
    }
}

/// Crop selection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Minimum selection width and height in display pixels.
    pub min_size: f64,
    /// Initial inset on each side, as a fraction of the container.
    pub initial_inset: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            min_size: 40.0,
            initial_inset: 0.1,
        }
    }
}

impl CropConfig {
    fn sanitize(&mut self) {
        self.min_size = sanitize_positive(self.min_size, 40.0);
        if !(self.initial_inset.is_finite() && (0.0..0.5).contains(&self.initial_inset)) {
            self.initial_inset = 0.1;
        }
    }
}

/// Overlay placement settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Initial overlay width as a fraction of the container width.
    pub max_width_fraction: f64,
    /// Initial overlay opacity.
    pub default_opacity: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            max_width_fraction: 0.5,
            default_opacity: 1.0,
        }
    }
}

impl OverlayConfig {
    fn sanitize(&mut self) {
        self.max_width_fraction = sanitize_fraction(self.max_width_fraction, 0.5);
        self.default_opacity = if self.default_opacity.is_finite() {
            self.default_opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }
}

/// Keep a value in (0, 1], falling back when it is not.
fn sanitize_fraction(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        value
    } else {
        fallback
    }
}

fn sanitize_positive(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

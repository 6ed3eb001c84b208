//! Colour adjustment WASM bindings.
//!
//! This module provides JavaScript bindings for the ColorAdjustment type,
//! allowing the brightness/contrast/saturation sliders to be driven from
//! TypeScript.

use wasm_bindgen::prelude::*;

use crate::types::to_js_error;

/// Colour adjustment wrapper for JavaScript. Values are percentages,
/// 100 = unchanged.
#[wasm_bindgen]
pub struct ColorAdjustment {
    inner: retouch_core::ColorAdjustment,
}

#[wasm_bindgen]
impl ColorAdjustment {
    /// Create a new adjustment with every value at 100%
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: retouch_core::ColorAdjustment::default(),
        }
    }

    /// Get brightness value
    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f32 {
        self.inner.brightness
    }

    /// Set brightness value
    #[wasm_bindgen(setter)]
    pub fn set_brightness(&mut self, value: f32) {
        self.inner.brightness = value;
    }

    /// Get contrast value
    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f32 {
        self.inner.contrast
    }

    /// Set contrast value
    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f32) {
        self.inner.contrast = value;
    }

    /// Get saturation value
    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f32 {
        self.inner.saturation
    }

    /// Set saturation value
    #[wasm_bindgen(setter)]
    pub fn set_saturation(&mut self, value: f32) {
        self.inner.saturation = value;
    }

    /// Check if all adjustments are at 100%
    pub fn is_identity(&self) -> bool {
        self.inner.is_identity()
    }

    /// Serialize to a plain JS object
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(to_js_error)
    }

    /// Deserialize from a plain JS object
    pub fn from_json(value: JsValue) -> Result<ColorAdjustment, JsValue> {
        let inner: retouch_core::ColorAdjustment =
            serde_wasm_bindgen::from_value(value).map_err(to_js_error)?;
        Ok(Self { inner })
    }
}

impl Default for ColorAdjustment {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorAdjustment {
    pub(crate) fn inner(&self) -> retouch_core::ColorAdjustment {
        self.inner
    }
}

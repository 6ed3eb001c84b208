//! WASM-compatible wrapper types for rasters and errors.
//!
//! This module provides JavaScript-friendly types that wrap the core Retouch
//! types, handling the conversion between Rust and JavaScript data
//! representations.

use retouch_core::Raster;
use wasm_bindgen::prelude::*;

/// An immutable raster snapshot for JavaScript.
///
/// Cloning the underlying raster shares its buffers, so handing one out is
/// cheap. `bytes()` and `pixels()` copy into JavaScript memory.
#[wasm_bindgen]
pub struct JsRaster {
    inner: Raster,
}

#[wasm_bindgen]
impl JsRaster {
    /// Decode encoded image bytes (JPEG, PNG, WebP or GIF).
    #[wasm_bindgen(constructor)]
    pub fn new(bytes: &[u8]) -> Result<JsRaster, JsValue> {
        Raster::decode(bytes.to_vec())
            .map(JsRaster::from_raster)
            .map_err(to_js_error)
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// MIME type of the encoded bytes, e.g. `image/png`.
    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner.format().mime_type().to_string()
    }

    /// Number of encoded bytes.
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.encoded().len()
    }

    /// Returns the encoded bytes as a Uint8Array, ready for a Blob.
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.encoded().to_vec()
    }

    /// Returns RGBA pixel data as a Uint8Array.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels().to_vec()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsRaster {
    pub(crate) fn from_raster(inner: Raster) -> Self {
        Self { inner }
    }

    pub(crate) fn into_raster(self) -> Raster {
        self.inner
    }
}

/// Convert an error into a `JsValue`, logging it to the browser console.
pub(crate) fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    let message = err.to_string();
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

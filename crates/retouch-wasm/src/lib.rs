//! Retouch WASM - WebAssembly bindings for Retouch
//!
//! This crate exposes the retouch-core editor session to JavaScript/TypeScript
//! applications.
//!
//! # Module Structure
//!
//! - `adjustments` - Brightness, contrast and saturation sliders
//! - `editor` - The editor session: tools, undo, gestures, crop and overlay
//! - `types` - WASM-compatible wrapper types for rasters and errors
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditor, ColorAdjustment } from '@retouch/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const editor = new JsEditor(800, 600, undefined);
//! editor.load(new Uint8Array(await file.arrayBuffer()));
//!
//! const adj = new ColorAdjustment();
//! adj.brightness = 120;
//! editor.adjust(adj);
//!
//! const blob = new Blob([editor.current().bytes()], { type: editor.current().mime_type });
//! ```

use wasm_bindgen::prelude::*;

mod adjustments;
mod editor;
mod types;

// Re-export public types
pub use adjustments::ColorAdjustment;
pub use editor::{JsBackgroundJob, JsEditor};
pub use types::JsRaster;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // Future: Set up panic hook for better error messages in browser console
    // when console_error_panic_hook feature is added
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

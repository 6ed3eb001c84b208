//! Image decoding for Retouch.
//!
//! This module provides functionality for:
//! - Decoding JPEG, PNG, WebP and GIF bytes into RGBA pixel buffers
//! - Applying EXIF orientation so buffers match what a browser shows
//! - Resizing pixel buffers for overlay compositing
//!
//! All operations are synchronous and single-threaded.

mod reader;
mod resize;
mod types;

pub use reader::decode_image;
pub use resize::resize_exact;
pub use types::{DecodeError, Orientation};

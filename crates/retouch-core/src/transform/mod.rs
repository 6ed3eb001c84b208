//! Pixel-exact geometric operations: cropping, flipping and rotation.
//!
//! All operations take a source buffer and return a new one. They never
//! resample, so applying an operation and its inverse restores the original
//! pixels exactly.
//!
//! # Coordinate System
//!
//! - Crop rectangles are integer pixel coordinates in the source buffer
//! - Origin is top-left corner
//! - Rotation is clockwise in 90 degree steps

mod crop;
mod orientation;

pub use crop::{apply_crop, centered_ratio_rect, AspectRatio};
pub use orientation::{flip_horizontal, rotate90_cw};

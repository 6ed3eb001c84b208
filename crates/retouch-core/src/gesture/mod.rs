//! Viewport gestures
//!
//! Multi-pointer pan, pinch zoom and wheel zoom over the editor viewport.
//! The resulting transform is display-only: it never touches raster pixels,
//! and the editor resets it whenever the current raster changes.
//!
//! ## Input Model
//!
//! - **One pointer**: pans; the last displacement, normalized to a frame,
//!   becomes the fling velocity on release
//! - **Two or more pointers**: pinches using the two earliest pointers; the
//!   pinch midpoint stays over the same image point
//!
//! Pointer ids that are not being tracked are ignored.

mod engine;
mod pointer;
mod transform;

pub use engine::{AnimationState, FrameRequest, GestureTransformEngine};
pub use pointer::{PointerSample, PointerTable};
pub use transform::{Transform, Velocity};

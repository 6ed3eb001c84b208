//! Display transform values.
//!
//! A transform maps image-relative coordinates (origin at the image center,
//! in unscaled display pixels) onto the viewport:
//!
//! `screen = viewport_center + (tx, ty) + scale * image`

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Translation and uniform scale applied to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub tx: f64,
    pub ty: f64,
    pub scale: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        tx: 0.0,
        ty: 0.0,
        scale: 1.0,
    };

    pub fn new(tx: f64, ty: f64, scale: f64) -> Self {
        Self { tx, ty, scale }
    }

    /// Screen position of the image center.
    pub fn image_center(&self, viewport: Size) -> (f64, f64) {
        let (cx, cy) = viewport.center();
        (cx + self.tx, cy + self.ty)
    }

    /// Image-relative point shown at screen position (x, y).
    pub fn image_point_at(&self, viewport: Size, x: f64, y: f64) -> (f64, f64) {
        let (ox, oy) = self.image_center(viewport);
        ((x - ox) / self.scale, (y - oy) / self.scale)
    }

    /// Screen position of an image-relative point.
    pub fn screen_point_of(&self, viewport: Size, ix: f64, iy: f64) -> (f64, f64) {
        let (ox, oy) = self.image_center(viewport);
        (ox + ix * self.scale, oy + iy * self.scale)
    }

    /// True if both translations are within `translation` and the scales
    /// within `scale` of each other.
    pub fn is_close(&self, other: &Transform, translation: f64, scale: f64) -> bool {
        (self.tx - other.tx).abs() < translation
            && (self.ty - other.ty).abs() < translation
            && (self.scale - other.scale).abs() < scale
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Pan velocity in display pixels per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f64,
    pub vy: f64,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { vx: 0.0, vy: 0.0 };

    pub fn new(vx: f64, vy: f64) -> Self {
        Self { vx, vy }
    }

    pub fn is_zero(&self) -> bool {
        self.vx == 0.0 && self.vy == 0.0
    }

    /// True if both components are below `epsilon` in magnitude.
    pub fn is_below(&self, epsilon: f64) -> bool {
        self.vx.abs() < epsilon && self.vy.abs() < epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_maps_center_to_origin() {
        let viewport = Size::new(200.0, 100.0);
        let t = Transform::IDENTITY;
        assert_eq!(t.image_point_at(viewport, 100.0, 50.0), (0.0, 0.0));
        assert_eq!(t.screen_point_of(viewport, 10.0, -5.0), (110.0, 45.0));
    }

    #[test]
    fn test_round_trip_through_scaled_transform() {
        let viewport = Size::new(300.0, 300.0);
        let t = Transform::new(12.0, -7.0, 2.5);
        let (ix, iy) = t.image_point_at(viewport, 40.0, 220.0);
        let (x, y) = t.screen_point_of(viewport, ix, iy);
        assert!((x - 40.0).abs() < 1e-9);
        assert!((y - 220.0).abs() < 1e-9);
    }

    #[test]
    fn test_is_close() {
        let a = Transform::new(0.0, 0.0, 1.0);
        assert!(a.is_close(&Transform::new(0.29, -0.29, 1.0009), 0.3, 0.001));
        assert!(!a.is_close(&Transform::new(0.31, 0.0, 1.0), 0.3, 0.001));
        assert!(!a.is_close(&Transform::new(0.0, 0.0, 1.002), 0.3, 0.001));
    }

    #[test]
    fn test_velocity_threshold() {
        assert!(Velocity::new(0.04, -0.04).is_below(0.05));
        assert!(!Velocity::new(0.04, 0.06).is_below(0.05));
        assert!(Velocity::ZERO.is_zero());
    }
}

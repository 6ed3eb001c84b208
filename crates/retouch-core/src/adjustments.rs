//! Colour adjustment algorithms
//!
//! Applies brightness, contrast and saturation to RGBA pixel data at native
//! resolution. Values are percentages where 100 means "unchanged", matching
//! the CSS filter functions the browser preview uses.
//!
//! ## Adjustment Order
//! 1. Brightness
//! 2. Contrast
//! 3. Saturation
//!
//! Alpha is never modified.

use serde::{Deserialize, Serialize};

/// Upper bound accepted for any adjustment percentage.
pub const MAX_PERCENT: f32 = 400.0;

/// Brightness, contrast and saturation as percentages (100 = identity).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorAdjustment {
    /// Brightness (0 to 400, 100 = unchanged)
    pub brightness: f32,
    /// Contrast (0 to 400, 100 = unchanged)
    pub contrast: f32,
    /// Saturation (0 to 400, 100 = unchanged)
    pub saturation: f32,
}

impl Default for ColorAdjustment {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
        }
    }
}

impl ColorAdjustment {
    pub fn new(brightness: f32, contrast: f32, saturation: f32) -> Self {
        Self {
            brightness,
            contrast,
            saturation,
        }
    }

    /// Check if all values are at their defaults
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Clamp every value into 0..=400, replacing non-finite values with 100.
    pub fn sanitized(self) -> Self {
        let fix = |v: f32| if v.is_finite() { v.clamp(0.0, MAX_PERCENT) } else { 100.0 };
        Self {
            brightness: fix(self.brightness),
            contrast: fix(self.contrast),
            saturation: fix(self.saturation),
        }
    }
}

/// Apply a colour adjustment to RGBA pixel data in place.
///
/// # Example
/// ```
/// use retouch_core::adjustments::{apply_color_adjustment, ColorAdjustment};
///
/// let mut pixels = vec![100, 100, 100, 255];
/// apply_color_adjustment(&mut pixels, &ColorAdjustment::new(150.0, 100.0, 100.0));
/// assert_eq!(pixels, vec![150, 150, 150, 255]);
/// ```
pub fn apply_color_adjustment(pixels: &mut [u8], adjustment: &ColorAdjustment) {
    // Early exit if no adjustments
    if adjustment.is_identity() {
        return;
    }

    let brightness = adjustment.brightness / 100.0;
    let contrast = adjustment.contrast / 100.0;
    let saturation = adjustment.saturation / 100.0;

    for chunk in pixels.chunks_exact_mut(4) {
        let mut r = chunk[0] as f32 / 255.0;
        let mut g = chunk[1] as f32 / 255.0;
        let mut b = chunk[2] as f32 / 255.0;

        (r, g, b) = apply_brightness(r, g, b, brightness);
        (r, g, b) = apply_contrast(r, g, b, contrast);
        (r, g, b) = apply_saturation(r, g, b, saturation);

        chunk[0] = to_byte(r);
        chunk[1] = to_byte(g);
        chunk[2] = to_byte(b);
    }
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Formula: `output = input * factor`
#[inline]
fn apply_brightness(r: f32, g: f32, b: f32, factor: f32) -> (f32, f32, f32) {
    if factor == 1.0 {
        return (r, g, b);
    }
    (r * factor, g * factor, b * factor)
}

/// Formula: `output = (input - 0.5) * factor + 0.5`
#[inline]
fn apply_contrast(r: f32, g: f32, b: f32, factor: f32) -> (f32, f32, f32) {
    if factor == 1.0 {
        return (r, g, b);
    }
    let midpoint = 0.5;
    (
        (r - midpoint) * factor + midpoint,
        (g - midpoint) * factor + midpoint,
        (b - midpoint) * factor + midpoint,
    )
}

/// Calculate luminance using ITU-R BT.709 coefficients.
#[inline]
fn calculate_luminance(r: f32, g: f32, b: f32) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Luminance-preserving saturation. 0 is grayscale, 1 unchanged.
#[inline]
fn apply_saturation(r: f32, g: f32, b: f32, factor: f32) -> (f32, f32, f32) {
    if factor == 1.0 {
        return (r, g, b);
    }
    let gray = calculate_luminance(r, g, b);
    (
        gray + (r - gray) * factor,
        gray + (g - gray) * factor,
        gray + (b - gray) * factor,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(r: u8, g: u8, b: u8) -> Vec<u8> {
        vec![r, g, b, 255]
    }

    fn apply(pixels: &[u8], adj: &ColorAdjustment) -> Vec<u8> {
        let mut result = pixels.to_vec();
        apply_color_adjustment(&mut result, adj);
        result
    }

    #[test]
    fn test_identity_no_adjustments() {
        let pixels = pixel(128, 64, 192);
        assert_eq!(apply(&pixels, &ColorAdjustment::default()), pixels);
    }

    #[test]
    fn test_brightness_scales_channels() {
        let result = apply(&pixel(100, 50, 20), &ColorAdjustment::new(200.0, 100.0, 100.0));
        assert_eq!(result, pixel(200, 100, 40));
    }

    #[test]
    fn test_brightness_clips_at_white() {
        let result = apply(&pixel(200, 200, 200), &ColorAdjustment::new(300.0, 100.0, 100.0));
        assert_eq!(result, pixel(255, 255, 255));
    }

    #[test]
    fn test_brightness_zero_is_black() {
        let result = apply(&pixel(200, 100, 50), &ColorAdjustment::new(0.0, 100.0, 100.0));
        assert_eq!(result, pixel(0, 0, 0));
    }

    #[test]
    fn test_contrast_increase() {
        let result = apply(&pixel(64, 128, 192), &ColorAdjustment::new(100.0, 200.0, 100.0));
        assert!(result[0] < 64, "Dark pixel should get darker");
        assert!((result[1] as i32 - 128).abs() < 3, "Mid pixel should stay near middle");
        assert_eq!(result[2], 255, "Bright pixel should clip at white");
    }

    #[test]
    fn test_contrast_zero_is_flat_gray() {
        let result = apply(&pixel(0, 128, 255), &ColorAdjustment::new(100.0, 0.0, 100.0));
        assert!(result[..3].iter().all(|&v| v == 128));
    }

    #[test]
    fn test_saturation_zero_is_grayscale() {
        let result = apply(&pixel(200, 50, 50), &ColorAdjustment::new(100.0, 100.0, 0.0));
        assert_eq!(result[0], result[1]);
        assert_eq!(result[1], result[2]);
    }

    #[test]
    fn test_saturation_increase_spreads_channels() {
        let original = pixel(150, 100, 100);
        let result = apply(&original, &ColorAdjustment::new(100.0, 100.0, 150.0));
        assert!(result[0] > original[0]);
        assert!(result[1] < original[1]);
    }

    #[test]
    fn test_gray_unaffected_by_saturation() {
        let original = pixel(120, 120, 120);
        let result = apply(&original, &ColorAdjustment::new(100.0, 100.0, 300.0));
        assert_eq!(result, original);
    }

    #[test]
    fn test_order_is_brightness_then_contrast() {
        // brightness first: 0.4 * 2 = 0.8, contrast: (0.8 - 0.5) * 2 + 0.5 = 1.1 -> 255
        // contrast first would give: (0.4 - 0.5) * 2 + 0.5 = 0.3, * 2 = 0.6 -> 153
        let v = (0.4f32 * 255.0).round() as u8;
        let result = apply(&pixel(v, v, v), &ColorAdjustment::new(200.0, 200.0, 100.0));
        assert_eq!(result[0], 255);
    }

    #[test]
    fn test_alpha_untouched() {
        let mut pixels = vec![100, 100, 100, 42];
        apply_color_adjustment(&mut pixels, &ColorAdjustment::new(150.0, 120.0, 80.0));
        assert_eq!(pixels[3], 42);
    }

    #[test]
    fn test_incomplete_pixel_ignored() {
        let mut pixels = vec![100, 100, 100, 255, 7, 7];
        apply_color_adjustment(&mut pixels, &ColorAdjustment::new(200.0, 100.0, 100.0));
        assert_eq!(&pixels[4..], &[7, 7]);
    }

    #[test]
    fn test_sanitized() {
        let adj = ColorAdjustment::new(-5.0, f32::NAN, 1000.0).sanitized();
        assert_eq!(adj, ColorAdjustment::new(0.0, 100.0, MAX_PERCENT));
    }
}

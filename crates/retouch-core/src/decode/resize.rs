//! Pixel buffer resizing used when compositing overlays.
//!
//! Returns new `PixelBuffer` instances without modifying the input.

use super::DecodeError;
use crate::raster::PixelBuffer;

/// Resize a buffer to exact dimensions with bilinear interpolation.
///
/// Aspect ratio is not preserved: the overlay compositor scales each axis
/// independently.
///
/// # Errors
///
/// Returns `DecodeError::EmptyImage` for a zero target dimension and
/// `DecodeError::CorruptedFile` if the source buffer is malformed.
pub fn resize_exact(
    buffer: &PixelBuffer,
    width: u32,
    height: u32,
) -> Result<PixelBuffer, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage);
    }

    // Fast path: if dimensions match, just clone
    if buffer.width == width && buffer.height == height {
        return Ok(buffer.clone());
    }

    let rgba = buffer
        .to_rgba_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbaImage".to_string()))?;

    let resized = image::imageops::resize(&rgba, width, height, image::imageops::FilterType::Triangle);

    Ok(PixelBuffer::from_rgba_image(resized))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_buffer(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8);
                pixels.push(((y * 255) / height.max(1)) as u8);
                pixels.push(128);
                pixels.push(255);
            }
        }
        PixelBuffer::new(width, height, pixels)
    }

    #[test]
    fn test_resize_downscale() {
        let buf = create_test_buffer(100, 50);
        let resized = resize_exact(&buf, 50, 25).unwrap();

        assert_eq!(resized.width, 50);
        assert_eq!(resized.height, 25);
        assert_eq!(resized.pixels.len(), 50 * 25 * 4);
    }

    #[test]
    fn test_resize_non_uniform() {
        let buf = create_test_buffer(40, 40);
        let resized = resize_exact(&buf, 80, 20).unwrap();

        assert_eq!((resized.width, resized.height), (80, 20));
    }

    #[test]
    fn test_resize_same_dimensions() {
        let buf = create_test_buffer(10, 10);
        let resized = resize_exact(&buf, 10, 10).unwrap();
        assert_eq!(resized.pixels, buf.pixels);
    }

    #[test]
    fn test_resize_zero_dimensions_error() {
        let buf = create_test_buffer(10, 10);
        assert!(resize_exact(&buf, 0, 5).is_err());
        assert!(resize_exact(&buf, 5, 0).is_err());
    }

    #[test]
    fn test_resize_preserves_alpha_of_uniform_buffer() {
        let buf = PixelBuffer::new(4, 4, [10u8, 20, 30, 128].repeat(16));
        let resized = resize_exact(&buf, 9, 3).unwrap();
        assert!(resized.pixels.chunks_exact(4).all(|px| px == [10, 20, 30, 128]));
    }
}

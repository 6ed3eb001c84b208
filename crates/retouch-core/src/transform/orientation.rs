//! Mirror and quarter-turn rotation.

use crate::raster::{PixelBuffer, BYTES_PER_PIXEL};

/// Mirror an image about its vertical axis. Dimensions are unchanged.
pub fn flip_horizontal(image: &PixelBuffer) -> PixelBuffer {
    let row_len = image.width as usize * BYTES_PER_PIXEL;
    let mut output = Vec::with_capacity(image.pixels.len());

    for row in image.pixels.chunks_exact(row_len) {
        for px in row.chunks_exact(BYTES_PER_PIXEL).rev() {
            output.extend_from_slice(px);
        }
    }

    PixelBuffer::new(image.width, image.height, output)
}

/// Rotate an image 90 degrees clockwise. Width and height are swapped.
///
/// Source pixel (x, y) lands at (height - 1 - y, x) in the output.
pub fn rotate90_cw(image: &PixelBuffer) -> PixelBuffer {
    let (src_w, src_h) = (image.width, image.height);
    let (dst_w, dst_h) = (src_h, src_w);
    let mut output = vec![0u8; image.pixels.len()];

    for y in 0..src_h {
        for x in 0..src_w {
            let src_idx = image.offset(x, y);
            let dst_x = src_h - 1 - y;
            let dst_y = x;
            let dst_idx = (dst_y as usize * dst_w as usize + dst_x as usize) * BYTES_PER_PIXEL;
            output[dst_idx..dst_idx + BYTES_PER_PIXEL]
                .copy_from_slice(&image.pixels[src_idx..src_idx + BYTES_PER_PIXEL]);
        }
    }

    PixelBuffer::new(dst_w, dst_h, output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

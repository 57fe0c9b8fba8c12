//! This module provides the byte-level boundary of the library.
//!
//! An external image codec (e.g. a PNG decoder) hands over interleaved RGBA
//! bytes plus dimensions; these helpers validate and reinterpret them as a
//! `PixelBuffer` and back, using `bytemuck` so no per-channel copying code is
//! needed.

use crate::error::PixmoshError;
use crate::types::{PixelBuffer, Rgba8};

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = std::mem::size_of::<Rgba8>();

/// Builds a `PixelBuffer` from interleaved RGBA bytes.
///
/// # Errors
/// Returns `PixmoshError::BufferMismatch` if `bytes.len()` is not exactly
/// `width * height * 4`.
pub fn pixels_from_rgba_bytes(
    bytes: &[u8],
    width: usize,
    height: usize,
) -> Result<PixelBuffer, PixmoshError> {
    let expected = width * height * BYTES_PER_PIXEL;
    if bytes.len() != expected {
        return Err(PixmoshError::BufferMismatch {
            expected,
            actual: bytes.len(),
        });
    }
    // `Rgba8` has alignment 1, so the cast can only fail on length.
    let pixels: &[Rgba8] = bytemuck::try_cast_slice(bytes)?;
    Ok(PixelBuffer::from_pixels(pixels.to_vec(), width, height))
}

/// Flattens a `PixelBuffer` into interleaved RGBA bytes.
pub fn rgba_bytes(image: &PixelBuffer) -> Vec<u8> {
    bytemuck::cast_slice::<Rgba8, u8>(image.pixels()).to_vec()
}

//! The canonical in-memory image of the pixmosh pipeline.
//!
//! A `PixelBuffer` is a plain value: `width * height` [`Rgba8`] pixels stored in
//! row-major order. Every kernel takes a buffer by reference and returns a new
//! one, so no two buffers ever alias the same pixel storage.

use super::pixel::Rgba8;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<Rgba8>,
}

impl PixelBuffer {
    /// Allocates a `width x height` buffer filled with [`Rgba8::ZERO`].
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Rgba8::ZERO)
    }

    pub fn filled(width: usize, height: usize, px: Rgba8) -> Self {
        Self {
            width,
            height,
            data: vec![px; width * height],
        }
    }

    /// Wraps existing row-major pixel data.
    ///
    /// # Panics
    /// If `data.len() != width * height`. A mismatch here is a programming
    /// error, not a recoverable condition; external byte input is validated by
    /// [`crate::utils::pixels_from_rgba_bytes`] instead.
    pub fn from_pixels(data: Vec<Rgba8>, width: usize, height: usize) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "pixel data length does not match {}x{} dimensions",
            width,
            height
        );
        Self { width, height, data }
    }

    /// Builds a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> Rgba8,
    {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) is outside a {}x{} buffer",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgba8 {
        self.data[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, px: Rgba8) {
        let idx = self.index(x, y);
        self.data[idx] = px;
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_zeroed() {
        let buf = PixelBuffer::new(3, 2);
        assert_eq!(buf.len(), 6);
        assert!(buf.pixels().iter().all(|&p| p == Rgba8::ZERO));
    }

    #[test]
    fn test_row_major_addressing() {
        let buf = PixelBuffer::from_fn(4, 3, |x, y| Rgba8::new(x as u8, y as u8, 0, 255));
        assert_eq!(buf.index(1, 2), 9);
        assert_eq!(buf.pixels()[9], Rgba8::new(1, 2, 0, 255));
        assert_eq!(buf.get(3, 0), Rgba8::new(3, 0, 0, 255));
    }

    #[test]
    fn test_set_does_not_alias_clones() {
        let original = PixelBuffer::filled(2, 2, Rgba8::grey(10));
        let mut copy = original.clone();
        copy.set(0, 0, Rgba8::grey(99));
        assert_eq!(original.get(0, 0), Rgba8::grey(10));
        assert_eq!(copy.get(0, 0), Rgba8::grey(99));
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn test_dimension_mismatch_fails_fast() {
        let _ = PixelBuffer::from_pixels(vec![Rgba8::ZERO; 5], 2, 2);
    }

    #[test]
    #[should_panic(expected = "outside a 3x2 buffer")]
    fn test_column_past_width_does_not_wrap_to_next_row() {
        let buf = PixelBuffer::new(3, 2);
        let _ = buf.get(3, 0);
    }

    #[test]
    fn test_zero_sized_buffer_is_valid() {
        let buf = PixelBuffer::new(0, 7);
        assert!(buf.is_empty());
        assert_eq!(buf.height(), 7);
    }
}

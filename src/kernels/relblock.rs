//! Relative-block encoding.
//!
//! The image is cut into `k x k` blocks. Each whole block keeps one centre
//! pixel, and every pixel of the block is stored as a signed residual against
//! that centre. Decoding adds the centre back, which is exact. Pixels in the
//! partial strip on the right/bottom edge belong to no block: their residual
//! stays zero and they decode to transparent black.

use crate::error::PixmoshError;
use crate::types::{PixelBuffer, Rgba8, RgbaI32, CHANNEL_MAX};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeBlocks {
    width: usize,
    height: usize,
    block_width: usize,
    centres: Vec<Rgba8>,
    residuals: Vec<RgbaI32>,
}

impl RelativeBlocks {
    pub fn encode(image: &PixelBuffer, block_width: usize) -> Result<Self, PixmoshError> {
        if block_width == 0 {
            return Err(PixmoshError::InvalidBlockSize(block_width));
        }
        let (blocks_w, blocks_h) = (image.width() / block_width, image.height() / block_width);
        let half = block_width / 2;

        let mut centres = Vec::with_capacity(blocks_w * blocks_h);
        for by in 0..blocks_h {
            for bx in 0..blocks_w {
                centres.push(image.get(bx * block_width + half, by * block_width + half));
            }
        }

        let mut residuals = vec![RgbaI32::ZERO; image.len()];
        for by in 0..blocks_h {
            for bx in 0..blocks_w {
                let centre = centres[by * blocks_w + bx].to_i32();
                for_each_in_block(bx, by, block_width, |x, y| {
                    let idx = image.index(x, y);
                    residuals[idx] = image.get(x, y).to_i32().sub(centre);
                });
            }
        }

        log::debug!(
            "relblock encode: {}x{} into {} blocks of {}px",
            image.width(),
            image.height(),
            centres.len(),
            block_width
        );
        Ok(Self {
            width: image.width(),
            height: image.height(),
            block_width,
            centres,
            residuals,
        })
    }

    pub fn block_width(&self) -> usize {
        self.block_width
    }

    pub fn centres(&self) -> &[Rgba8] {
        &self.centres
    }

    pub fn residuals(&self) -> &[RgbaI32] {
        &self.residuals
    }

    fn blocks_wide(&self) -> usize {
        self.width / self.block_width
    }

    fn blocks_tall(&self) -> usize {
        self.height / self.block_width
    }

    /// Rebuilds the image by adding each block's centre back to its residuals.
    pub fn decode(&self) -> PixelBuffer {
        let mut out = PixelBuffer::new(self.width, self.height);
        let blocks_w = self.blocks_wide();
        for by in 0..self.blocks_tall() {
            for bx in 0..blocks_w {
                let centre = self.centres[by * blocks_w + bx].to_i32();
                for_each_in_block(bx, by, self.block_width, |x, y| {
                    let residual = self.residuals[y * self.width + x];
                    out.set(x, y, residual.add(centre).to_rgba8());
                });
            }
        }
        out
    }

    /// Visualises residual magnitudes: `|residual|` per colour channel, opaque.
    pub fn residual_image(&self) -> PixelBuffer {
        let pixels = self
            .residuals
            .iter()
            .map(|r| {
                let mut px = r.abs().to_rgba8();
                px.a = CHANNEL_MAX;
                px
            })
            .collect();
        PixelBuffer::from_pixels(pixels, self.width, self.height)
    }
}

fn for_each_in_block<F>(bx: usize, by: usize, block_width: usize, mut f: F)
where
    F: FnMut(usize, usize),
{
    for y in by * block_width..(by + 1) * block_width {
        for x in bx * block_width..(bx + 1) * block_width {
            f(x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(width: usize, height: usize) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| {
            Rgba8::new((x * 29) as u8, (y * 41) as u8, ((x + y) * 7) as u8, 200 + (x % 3) as u8)
        })
    }

    #[test]
    fn test_roundtrip_is_exact_for_whole_blocks() {
        let image = sample(8, 6);
        let blocks = RelativeBlocks::encode(&image, 2).unwrap();
        assert_eq!(blocks.centres().len(), 12);
        assert_eq!(blocks.decode(), image);
    }

    #[test]
    fn test_centre_is_block_middle() {
        let image = sample(6, 3);
        let blocks = RelativeBlocks::encode(&image, 3).unwrap();
        assert_eq!(blocks.centres(), &[image.get(1, 1), image.get(4, 1)]);
        assert_eq!(blocks.residuals()[image.index(1, 1)], RgbaI32::ZERO);
    }

    #[test]
    fn test_partial_edge_decodes_to_zero() {
        let image = sample(5, 5);
        let decoded = RelativeBlocks::encode(&image, 2).unwrap().decode();
        assert_eq!(decoded.get(1, 3), image.get(1, 3));
        assert_eq!(decoded.get(4, 0), Rgba8::ZERO);
        assert_eq!(decoded.get(0, 4), Rgba8::ZERO);
    }

    #[test]
    fn test_residual_image_is_absolute_and_opaque() {
        let image = PixelBuffer::from_pixels(
            vec![Rgba8::grey(10), Rgba8::grey(50), Rgba8::grey(90), Rgba8::grey(30)],
            2,
            2,
        );
        // centre of the single 2x2 block is (1, 1)
        let residuals = RelativeBlocks::encode(&image, 2).unwrap().residual_image();
        assert_eq!(residuals.get(0, 0), Rgba8::new(20, 20, 20, 255));
        assert_eq!(residuals.get(0, 1), Rgba8::new(60, 60, 60, 255));
        assert_eq!(residuals.get(1, 1), Rgba8::new(0, 0, 0, 255));
    }

    #[test]
    fn test_zero_block_width_is_rejected() {
        assert!(matches!(
            RelativeBlocks::encode(&sample(4, 4), 0),
            Err(PixmoshError::InvalidBlockSize(0))
        ));
    }
}

//! This module contains the block Discrete Cosine Transform kernel and its inverse.
//!
//! An image is cut into independent, non-overlapping `B x B` tiles and every tile
//! is transformed on its own; nothing crosses a tile boundary. The transform is
//! the naive direct sum (every coefficient sums over every spatial position of
//! its tile), so a tile costs O(B^4). Tiles are small, and the direct form keeps
//! the numeric behaviour easy to reason about.
//!
//! Edge policy: only whole tiles are encoded. The output is
//! `(w - w % B) x (h - h % B)` and any remainder column/row strip on the right
//! or bottom is dropped, never padded. An image smaller than one tile encodes to
//! an empty buffer.

use std::sync::Arc;

use crate::error::PixmoshError;
use crate::types::{PixelBuffer, RgbaF64, CHANNEL_MAX};

use super::basis::{alpha, BasisTable};

//==================================================================================
// 1. Coefficient Buffer
//==================================================================================

/// A frequency-domain image: same layout as a `PixelBuffer`, but each element
/// holds the four channel coefficients of its tile position.
#[derive(Debug, Clone)]
pub struct EncodedBlocks {
    width: usize,
    height: usize,
    basis: Arc<BasisTable>,
    coefficients: Vec<RgbaF64>,
}

impl EncodedBlocks {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn block_size(&self) -> usize {
        self.basis.block_size()
    }

    pub fn coefficients(&self) -> &[RgbaF64] {
        &self.coefficients
    }

    /// The coefficient at absolute position `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> RgbaF64 {
        self.coefficients[y * self.width + x]
    }

    /// Rebuilds a coefficient buffer from integer pixels without transforming.
    ///
    /// Dimensions are taken as-is; callers are expected to pass an image that
    /// was produced by [`EncodedBlocks::to_coefficient_image`].
    pub fn from_coefficient_image(
        image: &PixelBuffer,
        block_size: usize,
    ) -> Result<Self, PixmoshError> {
        let basis = BasisTable::shared(block_size)?;
        Ok(Self {
            width: image.width(),
            height: image.height(),
            basis,
            coefficients: image.pixels().iter().map(|px| px.to_f64()).collect(),
        })
    }

    /// Renders the raw coefficients as an image for inspection.
    ///
    /// Channels are truncated toward zero and clamped into `0..=255`; alpha is
    /// the sentinel maximum.
    pub fn to_coefficient_image(&self) -> PixelBuffer {
        let pixels = self
            .coefficients
            .iter()
            .map(|c| {
                let mut px = c.truncate_to_i32().to_rgba8();
                px.a = CHANNEL_MAX;
                px
            })
            .collect();
        PixelBuffer::from_pixels(pixels, self.width, self.height)
    }

    /// Applies the inverse transform tile by tile.
    pub fn decode(&self) -> PixelBuffer {
        let b = self.block_size();
        let mut out = PixelBuffer::new(self.width, self.height);
        for by in 0..self.height / b {
            for bx in 0..self.width / b {
                self.decode_block(&mut out, bx, by);
            }
        }
        log::debug!(
            "dct decode: {}x{} in {}px tiles",
            self.width,
            self.height,
            b
        );
        out
    }

    fn decode_block(&self, out: &mut PixelBuffer, bx: usize, by: usize) {
        let b = self.block_size();
        let norm = self.basis.norm();
        let (ox, oy) = (bx * b, by * b);
        for y in 0..b {
            for x in 0..b {
                let mut acc = RgbaF64::ZERO;
                for v in 0..b {
                    for u in 0..b {
                        let coeff = self.basis.inverse(u, x) * self.basis.inverse(v, y);
                        acc = acc.add(self.get(ox + u, oy + v).scale(coeff));
                    }
                }
                let px = acc
                    .scale(norm / (alpha(x) * alpha(y)))
                    .with_alpha(f64::from(CHANNEL_MAX));
                out.set(ox + x, oy + y, px.to_rgba8());
            }
        }
    }
}

//==================================================================================
// 2. Forward Codec
//==================================================================================

/// A reusable forward transform bound to one basis table.
#[derive(Debug, Clone)]
pub struct BlockCodec {
    basis: Arc<BasisTable>,
}

impl BlockCodec {
    pub fn new(block_size: usize) -> Result<Self, PixmoshError> {
        Ok(Self {
            basis: BasisTable::shared(block_size)?,
        })
    }

    pub fn block_size(&self) -> usize {
        self.basis.block_size()
    }

    /// Transforms every whole tile of `image` into coefficients.
    pub fn encode(&self, image: &PixelBuffer) -> EncodedBlocks {
        let b = self.block_size();
        let width = image.width() - image.width() % b;
        let height = image.height() - image.height() % b;
        if width != image.width() || height != image.height() {
            log::warn!(
                "dct encode: discarding edge pixels, {}x{} truncated to {}x{}",
                image.width(),
                image.height(),
                width,
                height
            );
        }

        // Lift the kept region into float once; tiles then read from it.
        let mut source = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                source.push(image.get(x, y).to_f64());
            }
        }

        let mut encoded = EncodedBlocks {
            width,
            height,
            basis: Arc::clone(&self.basis),
            coefficients: vec![RgbaF64::ZERO; width * height],
        };
        for by in 0..height / b {
            for bx in 0..width / b {
                self.encode_block(&source, &mut encoded, bx, by);
            }
        }
        log::debug!("dct encode: {}x{} in {}px tiles", width, height, b);
        encoded
    }

    fn encode_block(&self, source: &[RgbaF64], out: &mut EncodedBlocks, bx: usize, by: usize) {
        let b = self.block_size();
        let w = out.width;
        let norm = self.basis.norm();
        let (ox, oy) = (bx * b, by * b);
        for v in 0..b {
            for u in 0..b {
                let mut acc = RgbaF64::ZERO;
                for y in 0..b {
                    for x in 0..b {
                        let coeff = self.basis.forward(u, x) * self.basis.forward(v, y);
                        acc = acc.add(source[(oy + y) * w + ox + x].scale(coeff));
                    }
                }
                out.coefficients[(oy + v) * w + ox + u] = acc
                    .scale(alpha(u) * alpha(v) * norm)
                    .with_alpha(f64::from(CHANNEL_MAX));
            }
        }
    }
}

//==================================================================================
// 3. Public API (Stateless Wrappers)
//==================================================================================

/// Encodes `image` with a `block_size` tile edge.
pub fn encode(image: &PixelBuffer, block_size: usize) -> Result<EncodedBlocks, PixmoshError> {
    Ok(BlockCodec::new(block_size)?.encode(image))
}

/// Decodes a coefficient buffer back into pixels.
pub fn decode(encoded: &EncodedBlocks) -> PixelBuffer {
    encoded.decode()
}

/// Convenience: encode then decode, yielding the truncated, reconstructed image.
pub fn roundtrip(image: &PixelBuffer, block_size: usize) -> Result<PixelBuffer, PixmoshError> {
    Ok(encode(image, block_size)?.decode())
}

//==================================================================================
// 4. Unit Tests
//==================================================================================

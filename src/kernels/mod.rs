//! This module serves as the public API and dispatcher for the collection of all
//! pure pixel-buffer kernels.
//!
//! It declares all kernel sub-modules and provides a single `dispatch` function
//! which is the sole entry point for the `pipeline::executor`. It takes one
//! operation from the pipeline config and calls the matching kernel.

use rand::Rng;

use crate::config::{Operation, PixmoshConfig};
use crate::error::PixmoshError;
use crate::types::PixelBuffer;

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Frequency domain
pub mod basis;
pub mod dct;

/// Spatial redundancy
pub mod relblock;
pub mod rle;

/// Traversal effects
pub mod sort;

//==================================================================================
// 2. Public API (Unified Dispatcher)
//==================================================================================

/// Applies a single operation to `input` and returns the resulting buffer.
///
/// `config` supplies defaults that an operation may leave unset; `rng` is the
/// only source of randomness and is consumed only by noise-bearing operations.
pub fn dispatch<R: Rng + ?Sized>(
    op: &Operation,
    config: &PixmoshConfig,
    input: &PixelBuffer,
    rng: &mut R,
) -> Result<PixelBuffer, PixmoshError> {
    match op {
        Operation::Dct { .. } => dct::roundtrip(input, config.block_size_for(op)),
        Operation::DctCoefficients { .. } => {
            Ok(dct::encode(input, config.block_size_for(op))?.to_coefficient_image())
        }
        Operation::Rle { noise } => {
            if input.is_empty() {
                return Ok(input.clone());
            }
            let mut runs = rle::encode(input);
            match noise {
                Some(n) if n.per_row => runs.add_noise_rows(n.stddev, rng)?,
                Some(n) => runs.add_noise(n.stddev, rng)?,
                None => {}
            }
            Ok(runs.decode())
        }
        Operation::Relblock {
            block_width,
            residuals,
        } => {
            let blocks = relblock::RelativeBlocks::encode(input, *block_width)?;
            if *residuals {
                Ok(blocks.residual_image())
            } else {
                Ok(blocks.decode())
            }
        }
        Operation::Sort { start } => sort::sort_image(input, *start),
    }
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

// In: src/config.rs

//! The single source of truth for pixmosh pipeline configuration.
//!
//! A `PixmoshConfig` is created once at the application boundary (typically from
//! a JSON document) and handed to the pipeline executor, which runs its
//! `operations` in order with one random source seeded from `seed`.

use serde::{Deserialize, Serialize};

use crate::error::PixmoshError;
use crate::kernels::basis::{DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE};

//==================================================================================
// I. Operation Definitions
//==================================================================================

/// Run-length noise settings.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct NoiseSpec {
    /// Standard deviation of the per-run normal perturbation.
    pub stddev: f64,

    /// If true, noise is applied row by row and every row keeps its width.
    #[serde(default)]
    pub per_row: bool,
}

/// One step of a pipeline. Each operation maps a pixel buffer to a new one.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Block DCT encode followed by decode. Edge pixels outside whole blocks are dropped.
    Dct {
        #[serde(default)]
        block_size: Option<usize>,
    },

    /// Block DCT encode, rendered as a clamped coefficient image.
    DctCoefficients {
        #[serde(default)]
        block_size: Option<usize>,
    },

    /// Run-length encode, optionally perturb the runs, then decode.
    Rle {
        #[serde(default)]
        noise: Option<NoiseSpec>,
    },

    /// Relative-block encode; emits the reconstruction or the residual magnitudes.
    Relblock {
        block_width: usize,
        #[serde(default)]
        residuals: bool,
    },

    /// Luminance flood traversal from `start`, rendered as a visiting-order ramp.
    Sort {
        #[serde(default)]
        start: (usize, usize),
    },
}

impl Operation {
    /// A short, stable name used in logs and pipeline errors.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Dct { .. } => "dct",
            Operation::DctCoefficients { .. } => "dct_coefficients",
            Operation::Rle { .. } => "rle",
            Operation::Relblock { .. } => "relblock",
            Operation::Sort { .. } => "sort",
        }
    }
}

//==================================================================================
// II. The Unified PixmoshConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct PixmoshConfig {
    /// Seed for every random source in the pipeline.
    #[serde(default)]
    pub seed: u64,

    /// Block edge used by DCT operations that do not set their own.
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// The operations to run, in order.
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl Default for PixmoshConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            block_size: default_block_size(),
            operations: Vec::new(),
        }
    }
}

/// Helper for `serde` to provide a default for `block_size`.
fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

impl PixmoshConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, PixmoshError> {
        let config: PixmoshConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The DCT block edge for `op`, falling back to the config-wide default.
    pub fn block_size_for(&self, op: &Operation) -> usize {
        match op {
            Operation::Dct { block_size } | Operation::DctCoefficients { block_size } => {
                block_size.unwrap_or(self.block_size)
            }
            _ => self.block_size,
        }
    }

    pub fn validate(&self) -> Result<(), PixmoshError> {
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(PixmoshError::Config(format!(
                "block_size must be between 1 and {}, got {}",
                MAX_BLOCK_SIZE, self.block_size
            )));
        }
        for (i, op) in self.operations.iter().enumerate() {
            match op {
                Operation::Dct { .. } | Operation::DctCoefficients { .. } => {
                    let b = self.block_size_for(op);
                    if b == 0 || b > MAX_BLOCK_SIZE {
                        return Err(PixmoshError::Config(format!(
                            "operation {} ({}): block_size must be between 1 and {}, got {}",
                            i,
                            op.name(),
                            MAX_BLOCK_SIZE,
                            b
                        )));
                    }
                }
                Operation::Relblock { block_width, .. } if *block_width == 0 => {
                    return Err(PixmoshError::Config(format!(
                        "operation {} (relblock): block_width must be at least 1",
                        i
                    )));
                }
                Operation::Rle { noise: Some(noise) }
                    if !noise.stddev.is_finite() || noise.stddev < 0.0 =>
                {
                    return Err(PixmoshError::Config(format!(
                        "operation {} (rle): stddev must be finite and non-negative, got {}",
                        i, noise.stddev
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

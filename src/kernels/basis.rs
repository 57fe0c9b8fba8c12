//! Precomputed cosine basis for the block DCT.
//!
//! A `BasisTable` is a pure function of the block edge `B`. The forward table
//! holds `cos(pi * u * (2x + 1) / 2B)` indexed `[u, x]`; the inverse table holds
//! the same cosine pre-multiplied by `alpha(u) * alpha(x)`. The asymmetry is
//! deliberate: the forward transform applies `alpha(u) * alpha(v)` once per
//! coefficient, while the inverse folds it into the table and divides the
//! spatial `alpha(x) * alpha(y)` back out at the end.

use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::sync::{Arc, OnceLock};

use ndarray::Array2;

use crate::error::PixmoshError;

/// The block edge used when a caller does not choose one.
pub const DEFAULT_BLOCK_SIZE: usize = 8;

/// The largest accepted block edge. Each table holds `B * B` floats.
pub const MAX_BLOCK_SIZE: usize = 1024;

static DEFAULT_TABLE: OnceLock<Arc<BasisTable>> = OnceLock::new();

/// Per-index normalisation factor: `1/sqrt(2)` for index 0, `1` otherwise.
#[inline]
pub fn alpha(i: usize) -> f64 {
    if i == 0 {
        FRAC_1_SQRT_2
    } else {
        1.0
    }
}

#[derive(Debug, Clone)]
pub struct BasisTable {
    block_size: usize,
    forward: Array2<f64>,
    inverse: Array2<f64>,
}

impl BasisTable {
    pub fn new(block_size: usize) -> Result<Self, PixmoshError> {
        if block_size == 0 || block_size > MAX_BLOCK_SIZE {
            return Err(PixmoshError::InvalidBlockSize(block_size));
        }
        let step = PI / (2.0 * block_size as f64);
        let forward = Array2::from_shape_fn((block_size, block_size), |(u, x)| {
            (step * (u * (2 * x + 1)) as f64).cos()
        });
        let inverse = Array2::from_shape_fn((block_size, block_size), |(u, x)| {
            alpha(u) * alpha(x) * forward[[u, x]]
        });
        log::debug!("built {0}x{0} DCT basis table", block_size);
        Ok(Self {
            block_size,
            forward,
            inverse,
        })
    }

    /// Returns a shared, read-only table for `block_size`.
    ///
    /// The default size is built once per process and reused; other sizes are
    /// built on demand and owned by the returned handle.
    pub fn shared(block_size: usize) -> Result<Arc<BasisTable>, PixmoshError> {
        if block_size == DEFAULT_BLOCK_SIZE {
            if let Some(table) = DEFAULT_TABLE.get() {
                return Ok(Arc::clone(table));
            }
            let table = Arc::new(Self::new(block_size)?);
            return Ok(Arc::clone(DEFAULT_TABLE.get_or_init(|| table)));
        }
        Ok(Arc::new(Self::new(block_size)?))
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// `2 / B`, the scale shared by both transform directions.
    pub fn norm(&self) -> f64 {
        2.0 / self.block_size as f64
    }

    #[inline]
    pub fn forward(&self, u: usize, x: usize) -> f64 {
        self.forward[[u, x]]
    }

    #[inline]
    pub fn inverse(&self, u: usize, x: usize) -> f64 {
        self.inverse[[u, x]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_row_is_constant() {
        let table = BasisTable::new(8).unwrap();
        for x in 0..8 {
            assert!((table.forward(0, x) - 1.0).abs() < 1e-12);
            assert!((table.inverse(0, x) - alpha(x) * FRAC_1_SQRT_2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ac_rows_are_zero_mean() {
        let table = BasisTable::new(8).unwrap();
        for u in 1..8 {
            let sum: f64 = (0..8).map(|x| table.forward(u, x)).sum();
            assert!(sum.abs() < 1e-9, "row {} sums to {}", u, sum);
        }
    }

    #[test]
    fn test_rows_are_orthogonal() {
        let table = BasisTable::new(4).unwrap();
        for u in 0..4 {
            for v in (u + 1)..4 {
                let dot: f64 = (0..4).map(|x| table.forward(u, x) * table.forward(v, x)).sum();
                assert!(dot.abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_zero_block_size_is_rejected() {
        assert!(matches!(
            BasisTable::new(0),
            Err(PixmoshError::InvalidBlockSize(0))
        ));
    }

    #[test]
    fn test_oversized_block_is_rejected_before_allocating() {
        assert!(BasisTable::new(MAX_BLOCK_SIZE).is_ok());
        assert!(matches!(
            BasisTable::new(MAX_BLOCK_SIZE + 1),
            Err(PixmoshError::InvalidBlockSize(1025))
        ));
        assert!(matches!(
            BasisTable::shared(100_000),
            Err(PixmoshError::InvalidBlockSize(100_000))
        ));
    }

    #[test]
    fn test_default_table_is_shared() {
        let a = BasisTable::shared(DEFAULT_BLOCK_SIZE).unwrap();
        let b = BasisTable::shared(DEFAULT_BLOCK_SIZE).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.norm(), 0.25);
    }
}

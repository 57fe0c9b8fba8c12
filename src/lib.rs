//! This file is the root of the `pixmosh` Rust crate.
//!
//! pixmosh is a set of transforms over in-memory RGBA pixel buffers: a block
//! DCT codec, a run-length codec with seeded run noise, a relative-block codec,
//! and a luminance-ordered flood traversal. Its responsibilities here are
//! strictly limited to declaring the top-level modules and re-exporting the
//! stable public API.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod config;
pub mod error;
pub mod kernels;
pub mod observability;
pub mod pipeline;
pub mod types;
pub mod utils;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use config::{NoiseSpec, Operation, PixmoshConfig};
pub use error::PixmoshError;
pub use kernels::dct::{BlockCodec, EncodedBlocks};
pub use kernels::relblock::RelativeBlocks;
pub use kernels::rle::RunLengthBuffer;
pub use types::{PixelBuffer, Rgba8, RgbaF64, RgbaI32};

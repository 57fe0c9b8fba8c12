//! This module defines the core, strongly-typed data representations used
//! throughout the pixmosh kernels.
//!
//! It currently includes the three concrete pixel formats and the canonical
//! `PixelBuffer` image type consumed by every kernel.

pub mod pixel;
pub mod pixel_buffer;

// Re-export the main type(s) for easier access.
pub use pixel::{Rgba8, RgbaF64, RgbaI32, CHANNEL_MAX};
pub use pixel_buffer::PixelBuffer;

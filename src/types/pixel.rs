//! This module defines the three concrete pixel representations used across the
//! pixmosh kernels, and the named conversions between them.
//!
//! - [`Rgba8`]: the storage format. Everything that leaves the library is `Rgba8`.
//! - [`RgbaI32`]: signed intermediate, used where residuals can go negative.
//! - [`RgbaF64`]: transform math, used so that no rounding happens mid-sum.
//!
//! Conversions are lossy only where a float or wide integer is narrowed back
//! into `Rgba8`.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Rec. 709 luma weights. Alpha does not contribute.
const LUMA_R: f64 = 0.2126;
const LUMA_G: f64 = 0.7152;
const LUMA_B: f64 = 0.0722;

/// The maximum channel value, also used as the alpha sentinel for derived images.
pub const CHANNEL_MAX: u8 = 255;

//==================================================================================
// 1. Storage Pixel
//==================================================================================

/// An 8-bit-per-channel RGBA pixel, laid out exactly as an interleaved RGBA byte quad.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent black; the background of freshly allocated buffers.
    pub const ZERO: Rgba8 = Rgba8::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// An opaque grey with all colour channels set to `v`.
    pub const fn grey(v: u8) -> Self {
        Self::new(v, v, v, CHANNEL_MAX)
    }

    pub fn luminance(&self) -> f64 {
        LUMA_R * f64::from(self.r) + LUMA_G * f64::from(self.g) + LUMA_B * f64::from(self.b)
    }

    pub fn to_f64(self) -> RgbaF64 {
        RgbaF64 {
            r: f64::from(self.r),
            g: f64::from(self.g),
            b: f64::from(self.b),
            a: f64::from(self.a),
        }
    }

    pub fn to_i32(self) -> RgbaI32 {
        RgbaI32 {
            r: i32::from(self.r),
            g: i32::from(self.g),
            b: i32::from(self.b),
            a: i32::from(self.a),
        }
    }
}

//==================================================================================
// 2. Signed Intermediate Pixel
//==================================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RgbaI32 {
    pub r: i32,
    pub g: i32,
    pub b: i32,
    pub a: i32,
}

impl RgbaI32 {
    pub const ZERO: RgbaI32 = RgbaI32 { r: 0, g: 0, b: 0, a: 0 };

    pub fn add(self, other: RgbaI32) -> RgbaI32 {
        RgbaI32 {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
            a: self.a + other.a,
        }
    }

    pub fn sub(self, other: RgbaI32) -> RgbaI32 {
        RgbaI32 {
            r: self.r - other.r,
            g: self.g - other.g,
            b: self.b - other.b,
            a: self.a - other.a,
        }
    }

    pub fn abs(self) -> RgbaI32 {
        RgbaI32 {
            r: self.r.abs(),
            g: self.g.abs(),
            b: self.b.abs(),
            a: self.a.abs(),
        }
    }

    /// Narrows into storage, saturating each channel into `0..=255`.
    pub fn to_rgba8(self) -> Rgba8 {
        let clamp = |v: i32| v.clamp(0, i32::from(CHANNEL_MAX)) as u8;
        Rgba8::new(clamp(self.r), clamp(self.g), clamp(self.b), clamp(self.a))
    }
}

//==================================================================================
// 3. Floating-Point Pixel
//==================================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RgbaF64 {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl RgbaF64 {
    pub const ZERO: RgbaF64 = RgbaF64 { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    pub fn add(self, other: RgbaF64) -> RgbaF64 {
        RgbaF64 {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
            a: self.a + other.a,
        }
    }

    pub fn scale(self, c: f64) -> RgbaF64 {
        RgbaF64 {
            r: self.r * c,
            g: self.g * c,
            b: self.b * c,
            a: self.a * c,
        }
    }

    /// Returns a copy with the alpha channel replaced.
    pub fn with_alpha(self, a: f64) -> RgbaF64 {
        RgbaF64 { a, ..self }
    }

    /// Narrows into storage: rounds to nearest, then saturates into `0..=255`.
    pub fn to_rgba8(self) -> Rgba8 {
        let narrow = |v: f64| v.round().clamp(0.0, f64::from(CHANNEL_MAX)) as u8;
        Rgba8::new(narrow(self.r), narrow(self.g), narrow(self.b), narrow(self.a))
    }

    /// Truncates each channel toward zero without saturating.
    pub fn truncate_to_i32(self) -> RgbaI32 {
        RgbaI32 {
            r: self.r as i32,
            g: self.g as i32,
            b: self.b as i32,
            a: self.a as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminance_weights_ignore_alpha() {
        let white = Rgba8::new(255, 255, 255, 0);
        assert!((white.luminance() - 255.0).abs() < 1e-9);
        assert_eq!(Rgba8::new(0, 0, 0, 255).luminance(), 0.0);
        assert!(Rgba8::new(0, 255, 0, 0).luminance() > Rgba8::new(255, 0, 0, 0).luminance());
    }

    #[test]
    fn test_f64_narrowing_rounds_and_saturates() {
        let px = RgbaF64 { r: 127.6, g: -3.0, b: 300.0, a: 254.4 };
        assert_eq!(px.to_rgba8(), Rgba8::new(128, 0, 255, 254));
    }

    #[test]
    fn test_truncation_is_toward_zero() {
        let px = RgbaF64 { r: 1.9, g: -1.9, b: 0.2, a: 255.0 };
        assert_eq!(px.truncate_to_i32(), RgbaI32 { r: 1, g: -1, b: 0, a: 255 });
    }

    #[test]
    fn test_signed_residual_roundtrip() {
        let a = Rgba8::new(10, 200, 30, 255).to_i32();
        let b = Rgba8::new(50, 20, 30, 0).to_i32();
        let residual = a.sub(b);
        assert_eq!(residual, RgbaI32 { r: -40, g: 180, b: 0, a: 255 });
        assert_eq!(residual.add(b).to_rgba8(), Rgba8::new(10, 200, 30, 255));
        assert_eq!(residual.abs().to_rgba8(), Rgba8::new(40, 180, 0, 255));
    }
}

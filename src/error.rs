// In: src/error.rs

//! This module defines the single, unified error type for the entire pixmosh library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Note that a `PixelBuffer` whose data length disagrees with its dimensions is
//! NOT represented here: inside the crate that is a broken contract and fails
//! fast with a panic. Only input crossing the library boundary is validated
//! into a `BufferMismatch`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PixmoshError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to our library's logic)
    // =========================================================================
    #[error("Invalid block size: {0}")]
    InvalidBlockSize(usize),

    #[error("Invalid noise parameters: {0}")]
    InvalidNoise(String),

    #[error("Start coordinate ({x}, {y}) lies outside a {width}x{height} image")]
    StartOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem (e.g., an unreadable log file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while parsing a pipeline config.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error from a safe byte-casting operation failing.
    #[error("Byte slice casting error: {0}")]
    PodCast(String), // Manual `From` impl is needed as bytemuck::PodCastError doesn't impl Error

    // =========================================================================
    // === Low-Level Buffer/Pipeline Errors
    // =========================================================================
    #[error("Buffer length mismatch: expected {expected} bytes, got {actual}")]
    BufferMismatch { expected: usize, actual: usize },

    #[error("Pipeline execution failed at stage '{stage}': {source}")]
    PipelineError {
        stage: String,
        #[source]
        source: Box<PixmoshError>,
    },
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

impl From<bytemuck::PodCastError> for PixmoshError {
    fn from(err: bytemuck::PodCastError) -> Self {
        PixmoshError::PodCast(err.to_string())
    }
}

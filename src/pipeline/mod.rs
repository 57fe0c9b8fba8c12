//! This module serves as the public API for running a whole pixmosh pipeline.
//!
//! It composes the lower-level kernels according to a `PixmoshConfig`. It defines
//! the highest-level workflow within the pure Rust core.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// The "Foreman": Executes the configured operations in order.
pub mod executor;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================

pub use self::executor::{execute, execute_json, PipelineRun, StageReport};

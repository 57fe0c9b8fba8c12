//! This module contains the core execution logic for pixmosh pipelines.
//!
//! It is a non-strategic component that faithfully executes the linear sequence
//! of operations from a config, feeding each stage's output into the next.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::PixmoshConfig;
use crate::error::PixmoshError;
use crate::kernels;
use crate::types::PixelBuffer;

/// What one stage produced, for logging and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub name: &'static str,
    pub width: usize,
    pub height: usize,
    pub elapsed: Duration,
}

/// The final image plus a report for every executed stage.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub output: PixelBuffer,
    pub stages: Vec<StageReport>,
}

/// Executes every operation of `config` in order, starting from `input`.
///
/// A single `StdRng` seeded from `config.seed` is shared by all stages, so the
/// same config and input always produce the same output. A failing stage aborts
/// the run and is reported as a `PipelineError` naming that stage; no partial
/// output is returned.
pub fn execute(config: &PixmoshConfig, input: &PixelBuffer) -> Result<PipelineRun, PixmoshError> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let start_overall = Instant::now();

    log::info!(
        "--- pipeline: {} operation(s) on {}x{} (seed {}) ---",
        config.operations.len(),
        input.width(),
        input.height(),
        config.seed
    );

    let mut current = input.clone();
    let mut stages = Vec::with_capacity(config.operations.len());
    for (i, op) in config.operations.iter().enumerate() {
        let start_stage = Instant::now();
        current = kernels::dispatch(op, config, &current, &mut rng).map_err(|e| {
            PixmoshError::PipelineError {
                stage: format!("{}#{}", op.name(), i),
                source: Box::new(e),
            }
        })?;
        let report = StageReport {
            name: op.name(),
            width: current.width(),
            height: current.height(),
            elapsed: start_stage.elapsed(),
        };
        log::info!(
            "  {}. {:<18} | Output: {}x{} | Time: {:.2?}",
            i + 1,
            report.name,
            report.width,
            report.height,
            report.elapsed
        );
        stages.push(report);
    }

    log::info!("--- pipeline finished in {:.2?} ---", start_overall.elapsed());
    Ok(PipelineRun {
        output: current,
        stages,
    })
}

/// Parses a JSON config and executes it.
pub fn execute_json(json: &str, input: &PixelBuffer) -> Result<PipelineRun, PixmoshError> {
    let config = PixmoshConfig::from_json(json)?;
    execute(&config, input)
}

//! Sequential sweep over the utilization presets.
//!
//! Runs never overlap: each preset gets its own world and starts after the
//! previous one has finished.

use tandem_core::scenario::{NetworkParams, PRESETS};

use crate::error::ExperimentError;
use crate::runner::{run_experiment, RunReport};

/// Parameters for every preset, layered on `base` (rates, seed and precision kept).
pub fn preset_params(base: &NetworkParams) -> Vec<NetworkParams> {
    PRESETS
        .iter()
        .map(|preset| preset.apply(base.clone()))
        .collect()
}

pub fn run_sweep(
    parameter_sets: &[NetworkParams],
    show_progress: bool,
) -> Result<Vec<RunReport>, ExperimentError> {
    let mut reports = Vec::with_capacity(parameter_sets.len());
    for (i, params) in parameter_sets.iter().enumerate() {
        tracing::info!(
            run = i + 1,
            of = parameter_sets.len(),
            utilization = params.utilization,
            "sweep run"
        );
        reports.push(run_experiment(params, show_progress)?);
    }
    Ok(reports)
}

pub fn run_preset_sweep(
    base: &NetworkParams,
    show_progress: bool,
) -> Result<Vec<RunReport>, ExperimentError> {
    run_sweep(&preset_params(base), show_progress)
}

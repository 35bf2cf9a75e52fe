//! Errors raised while running, summarizing or exporting experiments.

use thiserror::Error;

use tandem_core::error::SimError;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("simulation failed: {0}")]
    Simulation(#[from] SimError),

    #[error("at least 2 measured rounds are needed for a confidence interval, got {0}")]
    NotEnoughRounds(usize),

    #[error("no results to export")]
    NothingToExport,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

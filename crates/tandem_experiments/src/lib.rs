//! Batch-means experiments on top of `tandem_core`.
//!
//! - [`batch`]: confidence intervals over the measured rounds
//! - [`runner`]: one timed run, summarized into a [`RunReport`]
//! - [`sweep`]: the utilization presets, run one after the other
//! - [`report`]: plain-text output
//! - [`export`]: CSV and JSON files

pub mod batch;
pub mod error;
pub mod export;
pub mod report;
pub mod runner;
pub mod sweep;

pub use batch::{summarize, BatchSummary, ConfidenceInterval, Metric, MetricSummary};
pub use error::ExperimentError;
pub use export::{export_report_json, export_rounds_csv, export_sweep_csv};
pub use runner::{run_experiment, RunReport};
pub use sweep::{preset_params, run_preset_sweep, run_sweep};

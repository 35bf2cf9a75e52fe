//! CSV and JSON export of run results.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use tandem_core::rounds::RoundEstimates;

use crate::error::ExperimentError;
use crate::runner::RunReport;

#[derive(Debug, Serialize)]
struct RoundRow {
    round: usize,
    wait_one: f64,
    sojourn_one: f64,
    queue_len_one: f64,
    population_one: f64,
    wait_two: f64,
    sojourn_two: f64,
    queue_len_two: f64,
    population_two: f64,
    wait_one_variance: f64,
    wait_two_variance: f64,
    duration: f64,
}

impl RoundRow {
    fn new(round: usize, e: &RoundEstimates) -> Self {
        Self {
            round,
            wait_one: e.wait_one,
            sojourn_one: e.sojourn_one,
            queue_len_one: e.queue_len_one,
            population_one: e.population_one,
            wait_two: e.wait_two,
            sojourn_two: e.sojourn_two,
            queue_len_two: e.queue_len_two,
            population_two: e.population_two,
            wait_one_variance: e.wait_one_variance,
            wait_two_variance: e.wait_two_variance,
            duration: e.duration,
        }
    }
}

#[derive(Debug, Serialize)]
struct SweepRow<'a> {
    utilization: f64,
    batch_size: usize,
    transient_batch_size: usize,
    rounds: usize,
    metric: &'a str,
    lower: f64,
    mean: f64,
    upper: f64,
    precision: f64,
    wall_time_secs: f64,
}

fn ensure_not_empty<T>(items: &[T]) -> Result<(), ExperimentError> {
    if items.is_empty() {
        return Err(ExperimentError::NothingToExport);
    }
    Ok(())
}

/// One row per measured round, numbered from 1.
pub fn export_rounds_csv(
    rounds: &[RoundEstimates],
    path: impl AsRef<Path>,
) -> Result<(), ExperimentError> {
    ensure_not_empty(rounds)?;
    let mut wtr = csv::Writer::from_writer(File::create(path)?);
    for (i, estimates) in rounds.iter().enumerate() {
        wtr.serialize(RoundRow::new(i + 1, estimates))?;
    }
    wtr.flush()?;
    Ok(())
}

/// The whole report (parameters, intervals, per-round estimates, telemetry) as pretty JSON.
pub fn export_report_json(report: &RunReport, path: impl AsRef<Path>) -> Result<(), ExperimentError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

/// One row per (run, metric) with the interval bounds and precision.
pub fn export_sweep_csv(
    reports: &[RunReport],
    path: impl AsRef<Path>,
) -> Result<(), ExperimentError> {
    ensure_not_empty(reports)?;
    let mut wtr = csv::Writer::from_writer(File::create(path)?);
    for report in reports {
        let params = &report.params;
        for summary in &report.summary.metrics {
            wtr.serialize(SweepRow {
                utilization: params.utilization,
                batch_size: params.batch_size,
                transient_batch_size: params.transient_batch_size,
                rounds: params.rounds,
                metric: summary.metric.label(),
                lower: summary.interval.lower,
                mean: summary.interval.mean,
                upper: summary.interval.upper,
                precision: summary.precision,
                wall_time_secs: report.wall_time_secs,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

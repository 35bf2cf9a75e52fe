//! Plain-text report of a run.

use std::fmt::Write;

use tandem_core::rounds::RoundEstimates;

use crate::batch::{BatchSummary, Metric, MetricSummary};
use crate::runner::RunReport;

/// `E[W1]: lower - mean - upper (p = x.xx%)`
pub fn format_metric(summary: &MetricSummary) -> String {
    format!(
        "{}: {:.6} - {:.6} - {:.6} (p = {:.2}%)",
        summary.metric.label(),
        summary.interval.lower,
        summary.interval.mean,
        summary.interval.upper,
        summary.precision * 100.0
    )
}

pub fn format_summary(summary: &BatchSummary) -> String {
    let mut out = String::new();
    for metric in &summary.metrics {
        let _ = writeln!(out, "{}", format_metric(metric));
    }
    out
}

/// The ten estimators of one closed round, one per line.
pub fn format_round(estimates: &RoundEstimates) -> String {
    let mut out = String::new();
    for metric in Metric::ALL {
        let _ = writeln!(out, "{}: {:.6}", metric.label(), metric.value(estimates));
    }
    out
}

pub fn format_report(report: &RunReport) -> String {
    let params = &report.params;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "ρ = {} (λ = {}, μ = {}), K = {}, K_t = {}, N = {}, seed = {}",
        params.utilization,
        params.arrival_rate(),
        params.service_rate,
        params.batch_size,
        params.transient_batch_size,
        params.rounds,
        params.seed
    );
    out.push_str(&format_summary(&report.summary));
    let _ = writeln!(
        out,
        "Simulated {:.1} time units in {:.2}s ({} events).",
        report.simulated_time,
        report.wall_time_secs,
        report.events
    );
    out
}

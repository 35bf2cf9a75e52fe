//! Single-run orchestration: build, run, time and summarize one network.

use std::time::Instant;

use bevy_ecs::prelude::World;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use tandem_core::clock::SimulationClock;
use tandem_core::profiling::EventMetrics;
use tandem_core::rounds::{RoundEstimates, RoundLog};
use tandem_core::runner::{run_until_rounds_closed_with_hook, simulation_schedule};
use tandem_core::scenario::{build_network, initialize_simulation, NetworkParams};
use tandem_core::telemetry::NetworkTelemetry;

use crate::batch::{summarize, BatchSummary};
use crate::error::ExperimentError;

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub params: NetworkParams,
    pub summary: BatchSummary,
    /// Estimates of the discarded transient round.
    pub transient: Option<RoundEstimates>,
    /// Estimates of the measured rounds, in order.
    pub rounds: Vec<RoundEstimates>,
    pub telemetry: NetworkTelemetry,
    pub events: u64,
    pub simulated_time: f64,
    pub wall_time_secs: f64,
}

fn round_progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rounds ({eta})")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}

/// Runs one network to completion and summarizes its measured rounds.
///
/// With `show_progress` a bar tracks closed rounds (transient included).
pub fn run_experiment(
    params: &NetworkParams,
    show_progress: bool,
) -> Result<RunReport, ExperimentError> {
    let started = Instant::now();
    let mut world = World::new();
    build_network(&mut world, params)?;
    initialize_simulation(&mut world);

    tracing::info!(
        utilization = params.utilization,
        batch_size = params.batch_size,
        transient_batch_size = params.transient_batch_size,
        rounds = params.rounds,
        seed = params.seed,
        "experiment started"
    );

    let progress = show_progress.then(|| round_progress_bar(params.rounds as u64 + 1));
    let mut schedule = simulation_schedule();
    let mut last_closed = 0;
    run_until_rounds_closed_with_hook(&mut world, &mut schedule, |world, _| {
        let Some(bar) = progress.as_ref() else {
            return;
        };
        let closed = world.resource::<RoundLog>().closed_count();
        if closed != last_closed {
            last_closed = closed;
            bar.set_position(closed as u64);
        }
    })?;
    if let Some(bar) = progress.as_ref() {
        bar.finish_with_message("Completed");
    }

    let report = collect_report(&world, params, started.elapsed().as_secs_f64())?;
    tracing::info!(
        wall_time_secs = report.wall_time_secs,
        simulated_time = report.simulated_time,
        events = report.events,
        "experiment finished"
    );
    Ok(report)
}

fn collect_report(
    world: &World,
    params: &NetworkParams,
    wall_time_secs: f64,
) -> Result<RunReport, ExperimentError> {
    let log = world.resource::<RoundLog>();
    let rounds: Vec<RoundEstimates> = log.measured().copied().collect();
    let summary = summarize(&rounds, params.variance_precision)?;

    Ok(RunReport {
        params: params.clone(),
        summary,
        transient: log.transient().estimates().copied(),
        rounds,
        telemetry: world.resource::<NetworkTelemetry>().clone(),
        events: world.resource::<EventMetrics>().events_processed,
        simulated_time: world.resource::<SimulationClock>().now(),
        wall_time_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Metric;

    fn quick_params() -> NetworkParams {
        NetworkParams::default()
            .with_utilization(0.4)
            .with_batch_sizes(20, 20)
            .with_rounds(8)
    }

    #[test]
    fn report_covers_every_measured_round() {
        let report = run_experiment(&quick_params(), false).expect("run");
        assert_eq!(report.rounds.len(), 8);
        assert_eq!(report.summary.rounds, 8);
        assert!(report.transient.is_some());
        assert!(report.events > 0);
        assert!(report.simulated_time > 0.0);
        assert!(report.telemetry.departures >= 20 + 8 * 20);

        let w1 = report.summary.get(Metric::WaitOne).expect("E[W1]");
        assert!(w1.interval.lower <= w1.interval.mean);
        assert!(w1.interval.mean <= w1.interval.upper);
    }

    #[test]
    fn invalid_params_surface_as_simulation_error() {
        let params = quick_params().with_utilization(1.5);
        let err = run_experiment(&params, false).unwrap_err();
        assert!(matches!(err, ExperimentError::Simulation(_)));
    }
}

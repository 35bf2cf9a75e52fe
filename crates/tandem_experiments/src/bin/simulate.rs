//! Command-line front end: one run (or the preset sweep) with the interval report.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use tandem_core::logging::init_logging_with_level;
use tandem_core::scenario::{NetworkParams, Preset, DEFAULT_SEED};
use tandem_experiments::report::{format_report, format_round};
use tandem_experiments::{
    export_report_json, export_rounds_csv, export_sweep_csv, run_experiment, run_preset_sweep,
    ExperimentError,
};

#[derive(Parser, Debug)]
#[command(
    name = "simulate",
    about = "Two-stage preemptive-priority queue simulator (batch means)"
)]
struct Cli {
    /// Target utilization ρ; arrivals come at λ = ρ·μ/2
    #[arg(long, env = "TANDEM_RHO", default_value_t = 0.6)]
    rho: f64,

    /// Service rate μ of the shared server
    #[arg(long, env = "TANDEM_SERVICE_RATE", default_value_t = 1.0)]
    service_rate: f64,

    /// Arrivals per measured round (K)
    #[arg(long, env = "TANDEM_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Arrivals in the discarded transient round (K_t)
    #[arg(long, env = "TANDEM_TRANSIENT_BATCH_SIZE")]
    transient_batch_size: Option<usize>,

    /// Measured rounds (N)
    #[arg(long, env = "TANDEM_ROUNDS")]
    rounds: Option<usize>,

    #[arg(long, env = "TANDEM_SEED", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Relative precision of the variance intervals
    #[arg(long, env = "TANDEM_PRECISION")]
    precision: Option<f64>,

    /// Take K, K_t and N from the preset matching --rho
    #[arg(long, env = "TANDEM_PRESET")]
    preset: bool,

    /// Print each measured round's estimators
    #[arg(long, env = "TANDEM_PRINT_ROUNDS")]
    print_rounds: bool,

    /// Write per-round estimates (or the sweep intervals with --sweep) to this CSV file
    #[arg(long, env = "TANDEM_CSV")]
    csv: Option<PathBuf>,

    /// Write the full report to this JSON file
    #[arg(long, env = "TANDEM_JSON")]
    json: Option<PathBuf>,

    /// Run every preset one after the other
    #[arg(long, env = "TANDEM_SWEEP")]
    sweep: bool,

    /// Hide the progress bar
    #[arg(long, env = "TANDEM_QUIET")]
    quiet: bool,

    #[arg(long, env = "TANDEM_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn params(&self) -> Result<NetworkParams, String> {
        let mut params = NetworkParams::default()
            .with_utilization(self.rho)
            .with_service_rate(self.service_rate)
            .with_seed(self.seed)
            .with_print_rounds(self.print_rounds);
        if self.preset {
            let preset = Preset::find(self.rho)
                .ok_or_else(|| format!("no preset for ρ = {}", self.rho))?;
            params = preset.apply(params);
        }
        if let Some(k) = self.batch_size {
            params.batch_size = k;
        }
        if let Some(kt) = self.transient_batch_size {
            params.transient_batch_size = kt;
        }
        if let Some(n) = self.rounds {
            params.rounds = n;
        }
        if let Some(precision) = self.precision {
            params.variance_precision = precision;
        }
        Ok(params)
    }
}

fn run(cli: &Cli) -> Result<(), ExperimentError> {
    let params = match cli.params() {
        Ok(params) => params,
        Err(message) => {
            return Err(tandem_core::error::SimError::InvalidConfiguration(message).into());
        }
    };
    let show_progress = !cli.quiet;

    if cli.sweep {
        let reports = run_preset_sweep(&params, show_progress)?;
        for report in &reports {
            println!("{}", format_report(report));
        }
        if let Some(path) = &cli.csv {
            export_sweep_csv(&reports, path)?;
        }
        return Ok(());
    }

    let report = run_experiment(&params, show_progress)?;
    if cli.print_rounds {
        for (i, estimates) in report.rounds.iter().enumerate() {
            println!("Round {}\n{}", i + 1, format_round(estimates));
        }
    }
    println!("{}", format_report(&report));

    if let Some(path) = &cli.csv {
        export_rounds_csv(&report.rounds, path)?;
    }
    if let Some(path) = &cli.json {
        export_report_json(&report, path)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging_with_level(&cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "simulate failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

//! Example: run every utilization preset one after the other and export the intervals.
//!
//! The presets use N = 4000 rounds, so this takes a while at ρ = 0.9.
//!
//! Run with: cargo run --release -p tandem_experiments --example preset_sweep

use tandem_core::logging::init_logging;
use tandem_core::scenario::NetworkParams;
use tandem_experiments::report::format_report;
use tandem_experiments::{export_sweep_csv, run_preset_sweep};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    println!("Running preset sweep...");
    let reports = run_preset_sweep(&NetworkParams::default(), true)?;

    for report in &reports {
        println!("\n{}", format_report(report));
    }

    let output = "preset_sweep.csv";
    export_sweep_csv(&reports, output)?;
    println!("Intervals written to {output}");
    Ok(())
}

//! Run the ρ = 0.6 network with short rounds and print each measured round.
//!
//! Run with: cargo run -p tandem_core --example scenario_run

use tandem_core::logging::init_logging_with_level;
use tandem_core::rounds::RoundLog;
use tandem_core::runner::run_network;
use tandem_core::scenario::NetworkParams;
use tandem_core::telemetry::NetworkTelemetry;

fn main() {
    const ROUNDS: usize = 20;

    init_logging_with_level("info");
    let params = NetworkParams::default()
        .with_seed(123)
        .with_batch_sizes(150, 300)
        .with_rounds(ROUNDS);

    let world = match run_network(&params) {
        Ok(world) => world,
        Err(err) => {
            eprintln!("simulation failed: {err}");
            std::process::exit(1);
        }
    };

    let rounds = world.resource::<RoundLog>();
    println!("--- Scenario run (ρ = {}, {} rounds, seed 123) ---", params.utilization, ROUNDS);
    println!(
        "{:>5} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "round", "E[W1]", "E[N1]", "E[W2]", "E[N2]", "V[W1]", "V[W2]"
    );
    for (i, estimates) in rounds.measured().enumerate() {
        println!(
            "{:>5} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4}",
            i + 1,
            estimates.wait_one,
            estimates.population_one,
            estimates.wait_two,
            estimates.population_two,
            estimates.wait_one_variance,
            estimates.wait_two_variance,
        );
    }

    let telemetry = world.resource::<NetworkTelemetry>();
    println!(
        "\nArrivals: {}  Departures: {}  Preemptions: {}  Peak stage 1: {}  Peak stage 2: {}",
        telemetry.arrivals,
        telemetry.departures,
        telemetry.preemptions,
        telemetry.peak_stage_one,
        telemetry.peak_stage_two
    );
}

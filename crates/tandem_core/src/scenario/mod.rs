//! Scenario setup: network parameters, the ρ presets, and world construction.

mod build;
mod params;

pub use build::{build_network, initialize_simulation, spawn_customer};
pub use params::{NetworkParams, Preset, PrintRounds, RunTarget, ServiceRates, DEFAULT_SEED, PRESETS};

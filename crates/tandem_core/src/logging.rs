//! Structured logging setup.
//!
//! Levels used by the engine:
//! - TRACE: service starts, preemptions, event dispatch
//! - DEBUG: round openings and closings, network construction
//! - INFO: run start and finish, per-round estimates when enabled
//! - ERROR: handler faults
//!
//! `RUST_LOG` overrides the level passed in, e.g.
//! `RUST_LOG=tandem_core::rounds=debug`.

use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging at `info`, unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    init_logging_with_level("info")
}

/// Installs the global subscriber. Later calls are no-ops, so tests and
/// binaries can both call it.
pub fn init_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let installed = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_level(true))
        .with(filter)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(level, "logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_does_not_panic() {
        init_logging_with_level("warn");
        init_logging();
    }
}

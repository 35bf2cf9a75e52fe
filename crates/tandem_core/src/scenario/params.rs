use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::rounds::RoundQuotas;

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 358_141_284;

/// Relative precision of the variance intervals at the default N = 4000 rounds.
const DEFAULT_VARIANCE_PRECISION: f64 = 0.044;

/// Arrival (λ) and service (μ) rates of the running network.
#[derive(Debug, Clone, Copy, PartialEq, Resource)]
pub struct ServiceRates {
    pub arrival: f64,
    pub service: f64,
}

/// Number of measured rounds to collect; the run also closes the transient round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Resource)]
pub struct RunTarget {
    pub rounds: usize,
}

impl RunTarget {
    /// Closed rounds needed before the run stops (transient + measured).
    pub fn closed_rounds(&self) -> usize {
        self.rounds + 1
    }
}

/// When set, every closed round's estimators are logged at `info`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Resource)]
pub struct PrintRounds(pub bool);

/// Parameters for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkParams {
    /// μ, the service rate of the shared server (reference unit).
    pub service_rate: f64,
    /// ρ, the target utilization; arrivals come at λ = ρ·μ/2.
    pub utilization: f64,
    /// K, arrivals per measured round. At least 2: the within-round wait
    /// variance divides by K − 1.
    pub batch_size: usize,
    /// K_t, arrivals in the discarded transient round.
    pub transient_batch_size: usize,
    /// N, measured rounds to collect.
    pub rounds: usize,
    pub seed: u64,
    /// Relative half-width used for the variance confidence intervals.
    pub variance_precision: f64,
    /// Log every round's estimators as it closes.
    pub print_rounds: bool,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            service_rate: 1.0,
            utilization: 0.6,
            batch_size: 150,
            transient_batch_size: 300,
            rounds: 4000,
            seed: DEFAULT_SEED,
            variance_precision: DEFAULT_VARIANCE_PRECISION,
            print_rounds: false,
        }
    }
}

impl NetworkParams {
    /// λ = ρ·μ/2: each customer needs two services from the same server.
    pub fn arrival_rate(&self) -> f64 {
        self.utilization * self.service_rate / 2.0
    }

    pub fn rates(&self) -> ServiceRates {
        ServiceRates {
            arrival: self.arrival_rate(),
            service: self.service_rate,
        }
    }

    pub fn quotas(&self) -> RoundQuotas {
        RoundQuotas {
            batch_size: self.batch_size,
            transient_batch_size: self.transient_batch_size,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_utilization(mut self, utilization: f64) -> Self {
        self.utilization = utilization;
        self
    }

    pub fn with_service_rate(mut self, service_rate: f64) -> Self {
        self.service_rate = service_rate;
        self
    }

    /// Set K and K_t.
    pub fn with_batch_sizes(mut self, batch_size: usize, transient_batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self.transient_batch_size = transient_batch_size;
        self
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_variance_precision(mut self, precision: f64) -> Self {
        self.variance_precision = precision;
        self
    }

    pub fn with_print_rounds(mut self, print_rounds: bool) -> Self {
        self.print_rounds = print_rounds;
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.utilization > 0.0 && self.utilization < 1.0) {
            return Err(SimError::InvalidConfiguration(format!(
                "utilization must lie in (0, 1), got {}",
                self.utilization
            )));
        }
        if !(self.service_rate > 0.0 && self.service_rate.is_finite()) {
            return Err(SimError::InvalidConfiguration(format!(
                "service rate must be positive, got {}",
                self.service_rate
            )));
        }
        if self.batch_size < 2 {
            return Err(SimError::InvalidConfiguration(format!(
                "batch size must be at least 2 to estimate a variance, got {}",
                self.batch_size
            )));
        }
        if self.transient_batch_size < 1 {
            return Err(SimError::InvalidConfiguration(
                "transient batch size must be at least 1".to_string(),
            ));
        }
        if self.rounds < 2 {
            return Err(SimError::InvalidConfiguration(format!(
                "at least 2 rounds are needed for confidence intervals, got {}",
                self.rounds
            )));
        }
        if !(self.variance_precision >= 0.0 && self.variance_precision < 1.0) {
            return Err(SimError::InvalidConfiguration(format!(
                "variance precision must lie in [0, 1), got {}",
                self.variance_precision
            )));
        }
        Ok(())
    }
}

/// Batch sizes tuned per utilization so each estimator reaches its target precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preset {
    pub utilization: f64,
    pub batch_size: usize,
    pub transient_batch_size: usize,
    pub rounds: usize,
}

pub const PRESETS: [Preset; 5] = [
    Preset {
        utilization: 0.2,
        batch_size: 40,
        transient_batch_size: 40,
        rounds: 4000,
    },
    Preset {
        utilization: 0.4,
        batch_size: 70,
        transient_batch_size: 120,
        rounds: 4000,
    },
    Preset {
        utilization: 0.6,
        batch_size: 150,
        transient_batch_size: 300,
        rounds: 4000,
    },
    Preset {
        utilization: 0.8,
        batch_size: 800,
        transient_batch_size: 900,
        rounds: 4000,
    },
    Preset {
        utilization: 0.9,
        batch_size: 7000,
        transient_batch_size: 9000,
        rounds: 4000,
    },
];

impl Preset {
    /// Preset whose utilization equals `utilization` to two decimals.
    pub fn find(utilization: f64) -> Option<Preset> {
        PRESETS
            .iter()
            .copied()
            .find(|p| (p.utilization - utilization).abs() < 0.005)
    }

    /// Parameters for this preset on top of `base` (rates, seed, precision kept).
    pub fn apply(&self, base: NetworkParams) -> NetworkParams {
        base.with_utilization(self.utilization)
            .with_batch_sizes(self.batch_size, self.transient_batch_size)
            .with_rounds(self.rounds)
    }
}

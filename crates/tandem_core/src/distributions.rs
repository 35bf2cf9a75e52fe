//! Interval sampling for arrivals and service completions.
//!
//! All draws come from one [`SimRng`] stream seeded once per run, so a run is
//! reproducible from its seed alone.

use bevy_ecs::prelude::Resource;
use rand::distributions::Open01;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Exponential distribution with the given rate (events per time unit).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exponential {
    pub rate: f64,
}

impl Exponential {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    /// Inverse-CDF sample `-ln(U) / rate` with `U` in the open interval (0, 1).
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.rate <= 0.0 {
            return f64::INFINITY;
        }
        let u: f64 = rng.sample(Open01);
        -u.ln() / self.rate
    }
}

/// The process-wide uniform stream.
#[derive(Debug, Resource)]
pub struct SimRng(StdRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn exponential(&mut self, rate: f64) -> f64 {
        Exponential::new(rate).sample(&mut self.0)
    }
}

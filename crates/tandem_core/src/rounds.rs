//! Batch-means rounds: running sums while a round is open, normalized
//! estimators once it closes.
//!
//! Rounds live in an append-only arena ([`RoundLog`]) and are addressed by
//! [`RoundId`]. Round 0 is the transient round; it uses its own quota and never
//! records per-customer wait samples.
//!
//! Occupancy integrals are always accumulated into the *current* round. The
//! arrival handler brings them up to date before it can switch rounds, so a
//! round's integrals cover exactly `[started_at, next.started_at]`, which is the
//! duration they are normalized by.

use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::queues::QueueLengths;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoundId(pub usize);

impl RoundId {
    pub const TRANSIENT: RoundId = RoundId(0);

    pub fn is_transient(self) -> bool {
        self == Self::TRANSIENT
    }

    fn next(self) -> RoundId {
        RoundId(self.0 + 1)
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Accumulates `value × elapsed` between updates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeIntegral {
    area: f64,
    last_update: f64,
}

impl TimeIntegral {
    pub fn starting_at(time: f64) -> Self {
        Self {
            area: 0.0,
            last_update: time,
        }
    }

    /// Adds `value` held constant since the last update, then moves the update mark to `now`.
    pub fn advance(&mut self, value: usize, now: f64) {
        self.area += value as f64 * (now - self.last_update);
        self.last_update = now;
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn last_update(&self) -> f64 {
        self.last_update
    }
}

/// Time-weighted queue-length integrals for one round.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OccupancyIntegrals {
    pub waiting_one: TimeIntegral,
    pub present_one: TimeIntegral,
    pub waiting_two: TimeIntegral,
    pub present_two: TimeIntegral,
}

impl OccupancyIntegrals {
    pub fn starting_at(time: f64) -> Self {
        Self {
            waiting_one: TimeIntegral::starting_at(time),
            present_one: TimeIntegral::starting_at(time),
            waiting_two: TimeIntegral::starting_at(time),
            present_two: TimeIntegral::starting_at(time),
        }
    }

    pub fn advance(&mut self, lengths: QueueLengths, now: f64) {
        self.waiting_one.advance(lengths.waiting_one, now);
        self.present_one.advance(lengths.present_one, now);
        self.waiting_two.advance(lengths.waiting_two, now);
        self.present_two.advance(lengths.present_two, now);
    }
}

/// Raw per-customer sums, divided by the arrival count on close.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObservationSums {
    pub wait_one: f64,
    pub wait_two: f64,
    pub sojourn_one: f64,
    pub sojourn_two: f64,
}

/// Final estimators of a closed round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundEstimates {
    /// E[W1]
    pub wait_one: f64,
    /// E[T1]
    pub sojourn_one: f64,
    /// E[Nq1]
    pub queue_len_one: f64,
    /// E[N1]
    pub population_one: f64,
    /// E[W2]
    pub wait_two: f64,
    /// E[T2]
    pub sojourn_two: f64,
    /// E[Nq2]
    pub queue_len_two: f64,
    /// E[N2]
    pub population_two: f64,
    /// V[W1]
    pub wait_one_variance: f64,
    /// V[W2]
    pub wait_two_variance: f64,
    pub duration: f64,
}

/// Unbiased sample variance around a known mean; zero below two samples.
pub fn sample_variance(samples: &[f64], mean: f64) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let squares: f64 = samples.iter().map(|x| (x - mean) * (x - mean)).sum();
    squares / (samples.len() - 1) as f64
}

#[derive(Debug, Clone)]
pub struct Round {
    id: RoundId,
    started_at: f64,
    quota: usize,
    arrivals: usize,
    departures: usize,
    sums: ObservationSums,
    occupancy: OccupancyIntegrals,
    wait_one_samples: Vec<f64>,
    wait_two_samples: Vec<f64>,
    estimates: Option<RoundEstimates>,
}

impl Round {
    fn open(id: RoundId, started_at: f64, quota: usize) -> Self {
        let sample_len = if id.is_transient() { 0 } else { quota };
        Self {
            id,
            started_at,
            quota,
            arrivals: 0,
            departures: 0,
            sums: ObservationSums::default(),
            occupancy: OccupancyIntegrals::starting_at(started_at),
            wait_one_samples: vec![0.0; sample_len],
            wait_two_samples: vec![0.0; sample_len],
            estimates: None,
        }
    }

    pub fn id(&self) -> RoundId {
        self.id
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    pub fn quota(&self) -> usize {
        self.quota
    }

    pub fn arrivals(&self) -> usize {
        self.arrivals
    }

    pub fn departures(&self) -> usize {
        self.departures
    }

    pub fn is_transient(&self) -> bool {
        self.id.is_transient()
    }

    pub fn is_closed(&self) -> bool {
        self.estimates.is_some()
    }

    pub fn sums(&self) -> &ObservationSums {
        &self.sums
    }

    pub fn occupancy(&self) -> &OccupancyIntegrals {
        &self.occupancy
    }

    pub fn wait_one_samples(&self) -> &[f64] {
        &self.wait_one_samples
    }

    pub fn wait_two_samples(&self) -> &[f64] {
        &self.wait_two_samples
    }

    pub fn estimates(&self) -> Option<&RoundEstimates> {
        self.estimates.as_ref()
    }

    /// Stage-1 wait ends once, so the sample slot is overwritten.
    pub(crate) fn record_wait_one(&mut self, index: usize, wait: f64) {
        debug_assert!(!self.is_closed(), "round {} already closed", self.id);
        self.sums.wait_one += wait;
        if let Some(slot) = self.wait_one_samples.get_mut(index) {
            *slot = wait;
        }
    }

    /// Stage-2 wait resumes after every preemption, so the slot accumulates.
    pub(crate) fn record_wait_two(&mut self, index: usize, wait: f64) {
        debug_assert!(!self.is_closed(), "round {} already closed", self.id);
        self.sums.wait_two += wait;
        if let Some(slot) = self.wait_two_samples.get_mut(index) {
            *slot += wait;
        }
    }

    pub(crate) fn record_sojourn_one(&mut self, sojourn: f64) {
        self.sums.sojourn_one += sojourn;
    }

    pub(crate) fn record_sojourn_two(&mut self, sojourn: f64) {
        self.sums.sojourn_two += sojourn;
    }

    fn close(&mut self, next_started_at: f64) -> Result<&RoundEstimates, SimError> {
        let duration = next_started_at - self.started_at;
        if duration <= 0.0 || !duration.is_finite() {
            return Err(SimError::DegenerateRound {
                round: self.id,
                duration,
            });
        }
        let n = self.arrivals as f64;
        let wait_one = self.sums.wait_one / n;
        let wait_two = self.sums.wait_two / n;

        let estimates = RoundEstimates {
            wait_one,
            sojourn_one: self.sums.sojourn_one / n,
            queue_len_one: self.occupancy.waiting_one.area() / duration,
            population_one: self.occupancy.present_one.area() / duration,
            wait_two,
            sojourn_two: self.sums.sojourn_two / n,
            queue_len_two: self.occupancy.waiting_two.area() / duration,
            population_two: self.occupancy.present_two.area() / duration,
            wait_one_variance: sample_variance(&self.wait_one_samples, wait_one),
            wait_two_variance: sample_variance(&self.wait_two_samples, wait_two),
            duration,
        };
        Ok(self.estimates.insert(estimates))
    }
}

/// Arrival/departure quotas: `K` for measured rounds, `K_t` for the transient round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundQuotas {
    pub batch_size: usize,
    pub transient_batch_size: usize,
}

impl RoundQuotas {
    pub fn for_round(&self, id: RoundId) -> usize {
        if id.is_transient() {
            self.transient_batch_size
        } else {
            self.batch_size
        }
    }
}

#[derive(Debug, Resource)]
pub struct RoundLog {
    quotas: RoundQuotas,
    rounds: Vec<Round>,
    closed: usize,
}

impl RoundLog {
    /// Opens the transient round at `start`.
    pub fn new(quotas: RoundQuotas, start: f64) -> Self {
        let transient = Round::open(
            RoundId::TRANSIENT,
            start,
            quotas.for_round(RoundId::TRANSIENT),
        );
        Self {
            quotas,
            rounds: vec![transient],
            closed: 0,
        }
    }

    pub fn quotas(&self) -> RoundQuotas {
        self.quotas
    }

    pub fn current_id(&self) -> RoundId {
        RoundId(self.rounds.len() - 1)
    }

    pub fn current(&self) -> &Round {
        &self.rounds[self.rounds.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Round {
        let last = self.rounds.len() - 1;
        &mut self.rounds[last]
    }

    pub fn get(&self, id: RoundId) -> Option<&Round> {
        self.rounds.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: RoundId) -> Option<&mut Round> {
        self.rounds.get_mut(id.0)
    }

    pub fn transient(&self) -> &Round {
        &self.rounds[0]
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn closed_count(&self) -> usize {
        self.closed
    }

    /// Estimates of the closed measured rounds, in round order.
    pub fn measured(&self) -> impl Iterator<Item = &RoundEstimates> {
        self.rounds
            .iter()
            .skip(1)
            .filter_map(|round| round.estimates())
    }

    /// Brings the current round's occupancy integrals up to `now`.
    pub fn sync_occupancy(&mut self, lengths: QueueLengths, now: f64) {
        self.current_mut().occupancy.advance(lengths, now);
    }

    /// Counts an exogenous arrival in the current round and opens the next round
    /// when the quota is reached. Returns the id of a newly opened round.
    pub fn record_arrival(&mut self, now: f64) -> Option<RoundId> {
        let current = self.current_mut();
        current.arrivals += 1;
        if current.arrivals != current.quota {
            return None;
        }
        debug_assert_eq!(
            current.occupancy.present_one.last_update(),
            now,
            "occupancy must be synced before the round switches"
        );
        let next = self.current_id().next();
        self.rounds
            .push(Round::open(next, now, self.quotas.for_round(next)));
        tracing::debug!(round = %next, at = now, "round opened");
        Some(next)
    }

    /// Counts a departure in `id` and closes that round when its quota is met.
    /// Returns `true` when the departure closed the round.
    pub fn record_departure(&mut self, id: RoundId) -> Result<bool, SimError> {
        let next_started_at = self.get(id.next()).map(Round::started_at);
        let round = self
            .rounds
            .get_mut(id.0)
            .ok_or(SimError::UnknownRound { round: id })?;
        if round.is_closed() || round.departures >= round.quota {
            return Err(SimError::QuotaExceeded {
                round: id,
                quota: round.quota,
            });
        }
        round.departures += 1;
        if round.departures < round.quota {
            return Ok(false);
        }

        let next_started_at = next_started_at.ok_or(SimError::NextRoundMissing { round: id })?;
        let estimates = round.close(next_started_at)?;
        tracing::debug!(
            round = %id,
            duration = estimates.duration,
            wait_one = estimates.wait_one,
            wait_two = estimates.wait_two,
            "round closed"
        );
        self.closed += 1;
        Ok(true)
    }
}

//! Event handlers of the two-stage network.
//!
//! One system per [`EventKind`](crate::clock::EventKind). They share the
//! service-start and preemption logic through [`NetworkState`].

pub mod arrival;
pub mod departure;
pub mod stage_two_arrival;

use bevy_ecs::prelude::{Entity, Query, Res, ResMut};
use bevy_ecs::system::SystemParam;

use crate::clock::{EventKind, SimulationClock};
use crate::distributions::SimRng;
use crate::ecs::Customer;
use crate::error::SimError;
use crate::queues::{ServiceQueues, Stage};
use crate::rounds::RoundLog;
use crate::scenario::ServiceRates;
use crate::telemetry::NetworkTelemetry;

/// Everything a handler touches: clock, queues, rounds, the random stream and customers.
#[derive(SystemParam)]
pub struct NetworkState<'w, 's> {
    pub clock: ResMut<'w, SimulationClock>,
    pub queues: ResMut<'w, ServiceQueues>,
    pub rounds: ResMut<'w, RoundLog>,
    pub rng: ResMut<'w, SimRng>,
    pub rates: Res<'w, ServiceRates>,
    pub customers: Query<'w, 's, &'static mut Customer>,
    pub telemetry: Option<ResMut<'w, NetworkTelemetry>>,
}

impl<'w, 's> NetworkState<'w, 's> {
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Brings the current round's occupancy integrals up to now. Must run before
    /// any queue changes in a step.
    pub fn sync_occupancy(&mut self) {
        let lengths = self.queues.lengths();
        let now = self.clock.now();
        self.rounds.sync_occupancy(lengths, now);
    }

    fn customer_mut(&mut self, entity: Entity) -> Result<&mut Customer, SimError> {
        self.customers
            .get_mut(entity)
            .map(|customer| customer.into_inner())
            .map_err(|_| SimError::MissingCustomer)
    }

    /// The stage-1 head leaves its wait: records W1, preempts stage 2 and
    /// schedules the end of its stage-1 service.
    pub fn start_stage_one_service(&mut self) -> Result<(), SimError> {
        let head = self
            .queues
            .head(Stage::One)
            .ok_or(SimError::EmptyStage { stage: Stage::One })?;
        let now = self.now();
        let customer = self.customer_mut(head)?;
        let wait = customer.restart_state(now);
        let (round, index) = (customer.round, customer.index);
        self.rounds
            .get_mut(round)
            .ok_or(SimError::UnknownRound { round })?
            .record_wait_one(index, wait);

        self.preempt_stage_two()?;

        let service = self.rng.exponential(self.rates.service);
        self.clock
            .schedule_in(service, EventKind::ArrivalStageTwo, head);
        tracing::trace!(customer = ?head, wait, service, "stage 1 service started");
        Ok(())
    }

    /// Interrupts the stage-2 service in progress, if any. The interrupted
    /// customer goes back to waiting from now on.
    pub fn preempt_stage_two(&mut self) -> Result<(), SimError> {
        let Some(head) = self.queues.head(Stage::Two) else {
            return Ok(());
        };
        let cancelled = self
            .clock
            .cancel(|event| event.kind == EventKind::Departure && event.subject == head);
        if cancelled.is_none() {
            return Ok(());
        }

        let now = self.now();
        self.customer_mut(head)?.restart_state(now);
        if let Some(telemetry) = self.telemetry.as_mut() {
            telemetry.preemptions += 1;
        }
        tracing::trace!(customer = ?head, at = now, "stage 2 service preempted");
        Ok(())
    }

    /// The stage-2 head leaves its wait: accumulates W2 and schedules its departure.
    pub fn start_stage_two_service(&mut self) -> Result<(), SimError> {
        let head = self
            .queues
            .head(Stage::Two)
            .ok_or(SimError::EmptyStage { stage: Stage::Two })?;
        let now = self.now();
        let customer = self.customer_mut(head)?;
        let wait = customer.restart_state(now);
        let (round, index) = (customer.round, customer.index);
        self.rounds
            .get_mut(round)
            .ok_or(SimError::UnknownRound { round })?
            .record_wait_two(index, wait);

        let service = self.rng.exponential(self.rates.service);
        self.clock.schedule_in(service, EventKind::Departure, head);
        tracing::trace!(customer = ?head, wait, service, "stage 2 service started");
        Ok(())
    }

    pub fn observe_peaks(&mut self) {
        if let Some(telemetry) = self.telemetry.as_mut() {
            telemetry.observe_peaks(&self.queues);
        }
    }
}

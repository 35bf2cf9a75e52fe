use bevy_ecs::prelude::Component;

use crate::rounds::RoundId;

/// One customer traversing the network.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Customer {
    /// Round the customer's exogenous arrival is counted in.
    pub round: RoundId,
    /// Position in that round's arrival sequence; addresses the wait samples.
    pub index: usize,
    /// Simulation time the customer entered its current wait or service.
    pub state_entered_at: f64,
    /// Simulation time the customer entered its current stage's queue.
    pub queue_entered_at: f64,
}

impl Customer {
    pub fn new(round: RoundId, index: usize) -> Self {
        Self {
            round,
            index,
            state_entered_at: 0.0,
            queue_entered_at: 0.0,
        }
    }

    /// Stamps both timestamps; used on entry to either stage.
    pub fn enter_queue(&mut self, now: f64) {
        self.state_entered_at = now;
        self.queue_entered_at = now;
    }

    /// Time spent in the current state, restarting the state clock at `now`.
    pub fn restart_state(&mut self, now: f64) -> f64 {
        let elapsed = now - self.state_entered_at;
        self.state_entered_at = now;
        elapsed
    }

    pub fn time_in_queue(&self, now: f64) -> f64 {
        now - self.queue_entered_at
    }
}

//! Error types for the queue-network engine.
//!
//! Every variant except [`SimError::InvalidConfiguration`] is a broken engine
//! invariant: the run stops at the step that raised it and is never retried.

use bevy_ecs::prelude::{In, ResMut, Resource};
use thiserror::Error;

use crate::queues::Stage;
use crate::rounds::RoundId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("event queue exhausted before {closed}/{target} rounds closed")]
    EventQueueExhausted { closed: usize, target: usize },

    #[error("round {round} reached its departure quota before the next round opened")]
    NextRoundMissing { round: RoundId },

    #[error("round {round} does not exist")]
    UnknownRound { round: RoundId },

    #[error("round {round} has non-positive duration {duration}")]
    DegenerateRound { round: RoundId, duration: f64 },

    #[error("round {round} counted a departure beyond its quota of {quota}")]
    QuotaExceeded { round: RoundId, quota: usize },

    #[error("{stage} queue head does not match the customer of the current event")]
    QueueMismatch { stage: Stage },

    #[error("{stage} queue is empty when a service start was requested")]
    EmptyStage { stage: Stage },

    #[error("event refers to a customer that no longer exists")]
    MissingCustomer,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Last fault raised by a handler system during the current step.
///
/// Handlers are piped into [`record_fault`]; the runner takes the fault after
/// the schedule finishes and turns it into an `Err`.
#[derive(Debug, Default, Resource)]
pub struct SimulationFault(pub Option<SimError>);

pub fn record_fault(
    In(result): In<Result<(), SimError>>,
    mut fault: ResMut<SimulationFault>,
) {
    if let Err(err) = result {
        tracing::error!(error = %err, "handler fault");
        if fault.0.is_none() {
            fault.0 = Some(err);
        }
    }
}

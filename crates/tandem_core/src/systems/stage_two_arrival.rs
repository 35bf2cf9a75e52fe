use bevy_ecs::prelude::Res;

use crate::clock::{CurrentEvent, EventKind};
use crate::error::SimError;
use crate::queues::Stage;

use super::NetworkState;

/// End of stage-1 service: the customer moves to the stage-2 tail and the
/// server picks stage-1 work first, stage-2 work otherwise.
pub fn stage_two_arrival_system(
    event: Res<CurrentEvent>,
    mut network: NetworkState,
) -> Result<(), SimError> {
    if event.0.kind != EventKind::ArrivalStageTwo {
        return Ok(());
    }
    let subject = event.0.subject;
    let now = network.now();

    let (round, sojourn) = {
        let mut customer = network
            .customers
            .get_mut(subject)
            .map_err(|_| SimError::MissingCustomer)?;
        let sojourn = customer.time_in_queue(now);
        customer.enter_queue(now);
        (customer.round, sojourn)
    };
    network
        .rounds
        .get_mut(round)
        .ok_or(SimError::UnknownRound { round })?
        .record_sojourn_one(sojourn);

    network.sync_occupancy();
    if network.queues.head(Stage::One) != Some(subject) {
        return Err(SimError::QueueMismatch { stage: Stage::One });
    }
    network.queues.pop(Stage::One);
    network.queues.push(Stage::Two, subject);
    if let Some(telemetry) = network.telemetry.as_mut() {
        telemetry.transfers += 1;
    }
    network.observe_peaks();

    if network.queues.is_empty(Stage::One) {
        network.start_stage_two_service()
    } else {
        network.start_stage_one_service()
    }
}

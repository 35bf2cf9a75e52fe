use bevy_ecs::prelude::{Commands, Res};

use crate::clock::{CurrentEvent, EventKind};
use crate::error::SimError;
use crate::queues::Stage;
use crate::scenario::spawn_customer;

use super::NetworkState;

/// Exogenous arrival into the stage-1 queue.
///
/// Counts the arrival in the current round (possibly opening the next one),
/// starts service if the customer is alone at stage 1, then creates the next
/// customer and schedules its arrival.
pub fn arrival_system(
    event: Res<CurrentEvent>,
    mut commands: Commands,
    mut network: NetworkState,
) -> Result<(), SimError> {
    if event.0.kind != EventKind::ArrivalStageOne {
        return Ok(());
    }
    let customer = event.0.subject;
    let now = network.now();

    network.sync_occupancy();
    network
        .customers
        .get_mut(customer)
        .map_err(|_| SimError::MissingCustomer)?
        .enter_queue(now);
    network.queues.push(Stage::One, customer);
    network.rounds.record_arrival(now);
    if let Some(telemetry) = network.telemetry.as_mut() {
        telemetry.arrivals += 1;
    }
    network.observe_peaks();

    if network.queues.len(Stage::One) == 1 {
        network.start_stage_one_service()?;
    }

    let current = network.rounds.current();
    let next = spawn_customer(&mut commands, current.id(), current.arrivals());
    let interarrival = network.rng.exponential(network.rates.arrival);
    network
        .clock
        .schedule_in(interarrival, EventKind::ArrivalStageOne, next);
    Ok(())
}

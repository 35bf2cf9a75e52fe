use bevy_ecs::prelude::{Commands, Res};

use crate::clock::{CurrentEvent, EventKind};
use crate::error::SimError;
use crate::queues::Stage;
use crate::rounds::RoundId;
use crate::scenario::PrintRounds;

use super::NetworkState;

/// End of stage-2 service: the customer leaves and its round may close.
pub fn departure_system(
    event: Res<CurrentEvent>,
    print_rounds: Option<Res<PrintRounds>>,
    mut commands: Commands,
    mut network: NetworkState,
) -> Result<(), SimError> {
    if event.0.kind != EventKind::Departure {
        return Ok(());
    }
    let subject = event.0.subject;
    let now = network.now();

    let (round, sojourn) = {
        let customer = network
            .customers
            .get(subject)
            .map_err(|_| SimError::MissingCustomer)?;
        (customer.round, customer.time_in_queue(now))
    };
    network
        .rounds
        .get_mut(round)
        .ok_or(SimError::UnknownRound { round })?
        .record_sojourn_two(sojourn);
    let closed = network.rounds.record_departure(round)?;
    if closed && print_rounds.is_some_and(|print| print.0) {
        log_round(&network, round);
    }

    network.sync_occupancy();
    debug_assert!(
        network.queues.is_empty(Stage::One),
        "departure while stage 1 has work"
    );
    if network.queues.head(Stage::Two) != Some(subject) {
        return Err(SimError::QueueMismatch { stage: Stage::Two });
    }
    network.queues.pop(Stage::Two);
    commands.entity(subject).despawn();
    if let Some(telemetry) = network.telemetry.as_mut() {
        telemetry.departures += 1;
    }

    if !network.queues.is_empty(Stage::Two) {
        network.start_stage_two_service()?;
    }
    Ok(())
}

fn log_round(network: &NetworkState, id: RoundId) {
    let Some(estimates) = network.rounds.get(id).and_then(|round| round.estimates()) else {
        return;
    };
    tracing::info!(
        round = %id,
        w1 = estimates.wait_one,
        t1 = estimates.sojourn_one,
        nq1 = estimates.queue_len_one,
        n1 = estimates.population_one,
        w2 = estimates.wait_two,
        t2 = estimates.sojourn_two,
        nq2 = estimates.queue_len_two,
        n2 = estimates.population_two,
        v_w1 = estimates.wait_one_variance,
        v_w2 = estimates.wait_two_variance,
        "round estimates"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::{Entity, IntoSystem, Schedule, World};

    use crate::clock::SimulationClock;
    use crate::error::{record_fault, SimulationFault};
    use crate::queues::ServiceQueues;
    use crate::rounds::RoundLog;
    use crate::scenario::NetworkParams;
    use crate::test_helpers::{create_test_world, enqueue_customer};

    fn setup() -> World {
        create_test_world(&NetworkParams::default())
    }

    fn enqueue_stage_two(world: &mut World, entered_at: f64) -> Entity {
        enqueue_customer(world, Stage::Two, entered_at)
    }

    fn depart(world: &mut World, at: f64, subject: Entity) {
        world
            .resource_mut::<SimulationClock>()
            .schedule_at(at, EventKind::Departure, subject);
        let event = world
            .resource_mut::<SimulationClock>()
            .pop_next()
            .expect("departure");
        world.insert_resource(CurrentEvent(event));
        let mut schedule = Schedule::default();
        schedule.add_systems(departure_system.pipe(record_fault));
        schedule.run(world);
    }

    #[test]
    fn departure_despawns_customer_and_serves_next() {
        let mut world = setup();
        let leaving = enqueue_stage_two(&mut world, 1.0);
        let next = enqueue_stage_two(&mut world, 2.0);

        depart(&mut world, 4.0, leaving);
        assert_eq!(world.resource::<SimulationFault>().0, None);

        assert!(world.get_entity(leaving).is_none());
        assert_eq!(world.resource::<ServiceQueues>().head(Stage::Two), Some(next));

        let transient = world.resource::<RoundLog>().transient();
        assert_eq!(transient.departures(), 1);
        assert_eq!(transient.sums().sojourn_two, 3.0);
        assert_eq!(transient.sums().wait_two, 2.0);

        let pending: Vec<_> = world.resource::<SimulationClock>().pending().copied().collect();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].kind, EventKind::Departure);
        assert_eq!(pending[0].subject, next);
    }

    #[test]
    fn last_departure_leaves_server_idle() {
        let mut world = setup();
        let leaving = enqueue_stage_two(&mut world, 0.0);
        depart(&mut world, 1.0, leaving);

        assert!(world.resource::<SimulationClock>().is_empty());
        assert_eq!(world.resource::<ServiceQueues>().total(), 0);
    }

    #[test]
    fn departure_of_a_non_head_customer_is_a_fault() {
        let mut world = setup();
        enqueue_stage_two(&mut world, 0.0);
        let behind = enqueue_stage_two(&mut world, 0.0);
        depart(&mut world, 1.0, behind);

        assert_eq!(
            world.resource::<SimulationFault>().0,
            Some(SimError::QueueMismatch { stage: Stage::Two })
        );
        assert!(world.get_entity(behind).is_some());
    }
}

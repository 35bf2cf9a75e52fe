use bevy_ecs::prelude::{Commands, Entity, World};

use crate::clock::{EventKind, SimulationClock};
use crate::distributions::SimRng;
use crate::ecs::Customer;
use crate::error::{SimError, SimulationFault};
use crate::profiling::EventMetrics;
use crate::queues::ServiceQueues;
use crate::rounds::{RoundId, RoundLog};
use crate::scenario::params::{NetworkParams, PrintRounds, RunTarget, ServiceRates};
use crate::telemetry::NetworkTelemetry;

/// Inserts every resource the handlers need, with the transient round open at time 0.
///
/// Nothing is scheduled yet; call [`initialize_simulation`] to seed the first arrival.
pub fn build_network(world: &mut World, params: &NetworkParams) -> Result<(), SimError> {
    params.validate()?;

    world.insert_resource(SimulationClock::default());
    world.insert_resource(ServiceQueues::default());
    world.insert_resource(RoundLog::new(params.quotas(), 0.0));
    world.insert_resource(SimRng::seeded(params.seed));
    world.insert_resource(params.rates());
    world.insert_resource(RunTarget {
        rounds: params.rounds,
    });
    world.insert_resource(PrintRounds(params.print_rounds));
    world.insert_resource(SimulationFault::default());
    world.insert_resource(NetworkTelemetry::default());
    world.insert_resource(EventMetrics::default());

    tracing::debug!(
        utilization = params.utilization,
        arrival_rate = params.arrival_rate(),
        service_rate = params.service_rate,
        batch_size = params.batch_size,
        transient_batch_size = params.transient_batch_size,
        rounds = params.rounds,
        seed = params.seed,
        "network built"
    );
    Ok(())
}

/// Spawns a customer whose arrival is about to be scheduled. `index` is its
/// position in `round`'s arrival sequence.
pub fn spawn_customer(commands: &mut Commands, round: RoundId, index: usize) -> Entity {
    commands.spawn(Customer::new(round, index)).id()
}

/// Creates the first customer and schedules its arrival one interarrival time after 0.
pub fn initialize_simulation(world: &mut World) -> Entity {
    let customer = world.spawn(Customer::new(RoundId::TRANSIENT, 0)).id();
    let arrival_rate = world.resource::<ServiceRates>().arrival;
    let first = world.resource_mut::<SimRng>().exponential(arrival_rate);
    world
        .resource_mut::<SimulationClock>()
        .schedule_at(first, EventKind::ArrivalStageOne, customer);
    customer
}

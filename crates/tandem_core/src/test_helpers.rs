//! Test helpers for common test setup and utilities.

use bevy_ecs::prelude::{Entity, World};

use crate::ecs::Customer;
use crate::queues::{ServiceQueues, Stage};
use crate::rounds::RoundId;
use crate::scenario::{build_network, NetworkParams};

/// Small batches so a full run takes a few hundred events.
pub fn small_params() -> NetworkParams {
    NetworkParams::default()
        .with_utilization(0.5)
        .with_batch_sizes(10, 10)
        .with_rounds(5)
}

/// A world with every network resource in place and nothing scheduled.
pub fn create_test_world(params: &NetworkParams) -> World {
    let mut world = World::new();
    build_network(&mut world, params).expect("test params must be valid");
    world
}

/// Spawns a transient-round customer and appends it to `stage` as if it had
/// entered that queue at `entered_at`.
pub fn enqueue_customer(world: &mut World, stage: Stage, entered_at: f64) -> Entity {
    let mut customer = Customer::new(RoundId::TRANSIENT, 0);
    customer.enter_queue(entered_at);
    let entity = world.spawn(customer).id();
    world.resource_mut::<ServiceQueues>().push(stage, entity);
    entity
}

#![allow(dead_code)]

use bevy_ecs::prelude::{Entity, World};
use tandem_core::clock::{EventKind, SimulationClock};
use tandem_core::ecs::Customer;
use tandem_core::scenario::{build_network, initialize_simulation, NetworkParams};

/// Builder configuration for reproducible test worlds.
#[derive(Clone, Debug)]
pub struct TestWorldConfig {
    pub seed: u64,
    pub utilization: f64,
    pub batch_size: usize,
    pub transient_batch_size: usize,
    pub rounds: usize,
}

impl Default for TestWorldConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            utilization: 0.6,
            batch_size: 20,
            transient_batch_size: 30,
            rounds: 10,
        }
    }
}

impl TestWorldConfig {
    pub fn params(&self) -> NetworkParams {
        NetworkParams::default()
            .with_seed(self.seed)
            .with_utilization(self.utilization)
            .with_batch_sizes(self.batch_size, self.transient_batch_size)
            .with_rounds(self.rounds)
    }

    /// A world with the first arrival already scheduled.
    pub fn build(&self) -> World {
        let mut world = World::new();
        build_network(&mut world, &self.params()).expect("test params must be valid");
        initialize_simulation(&mut world);
        world
    }
}

/// Removes the pending exogenous arrival so no further customers enter.
pub fn stop_arrivals(world: &mut World) -> Option<Entity> {
    world
        .resource_mut::<SimulationClock>()
        .cancel(|event| event.kind == EventKind::ArrivalStageOne)
        .map(|event| event.subject)
}

pub fn customer_count(world: &World) -> usize {
    world
        .iter_entities()
        .filter(|entity| entity.contains::<Customer>())
        .count()
}

#![allow(dead_code)]

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use tandem_core::clock::Event;
use tandem_core::error::SimError;
use tandem_core::runner::{
    run_next_event, run_until_rounds_closed, run_until_rounds_closed_with_hook,
    simulation_schedule,
};

/// Helper that owns a reusable `Schedule` so tests can step or drain the network.
pub struct ScheduleRunner {
    schedule: Schedule,
}

impl Default for ScheduleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRunner {
    /// Create a runner with the default simulation schedule.
    pub fn new() -> Self {
        Self {
            schedule: simulation_schedule(),
        }
    }

    /// Run a single event.
    pub fn run_one(&mut self, world: &mut World) -> Event {
        run_next_event(world, &mut self.schedule).expect("step should succeed")
    }

    /// Run a single event, returning the fault instead of panicking.
    pub fn try_run_one(&mut self, world: &mut World) -> Result<Event, SimError> {
        run_next_event(world, &mut self.schedule)
    }

    /// Drive the network until every round of the run target has closed.
    pub fn run_full(&mut self, world: &mut World) -> usize {
        run_until_rounds_closed(world, &mut self.schedule).expect("run should complete")
    }

    /// Same as [`Self::run_full`], calling `hook` after every step.
    pub fn run_full_with_hook<F>(&mut self, world: &mut World, hook: F) -> usize
    where
        F: FnMut(&World, &Event),
    {
        run_until_rounds_closed_with_hook(world, &mut self.schedule, hook)
            .expect("run should complete")
    }
}

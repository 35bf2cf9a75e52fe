//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each step
//! pops the next event from [SimulationClock], inserts it as [CurrentEvent],
//! then runs the schedule. Exactly one handler system runs per step.

use bevy_ecs::prelude::{IntoSystem, Res, Schedule, World};
use bevy_ecs::schedule::{apply_deferred, ExecutorKind, IntoSystemConfigs};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::error::{record_fault, SimError, SimulationFault};
use crate::profiling::EventMetrics;
use crate::rounds::RoundLog;
use crate::scenario::{build_network, initialize_simulation, NetworkParams, RunTarget};
use crate::systems::{
    arrival::arrival_system, departure::departure_system,
    stage_two_arrival::stage_two_arrival_system,
};

fn is_arrival_stage_one(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::ArrivalStageOne)
        .unwrap_or(false)
}

fn is_arrival_stage_two(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::ArrivalStageTwo)
        .unwrap_or(false)
}

fn is_departure(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::Departure)
        .unwrap_or(false)
}

/// Builds the simulation schedule: the three handlers, each gated on its event
/// kind, followed by [apply_deferred] so customers spawned or despawned in a
/// step exist (or are gone) before the next event is popped.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(
        (
            (
                arrival_system
                    .pipe(record_fault)
                    .run_if(is_arrival_stage_one),
                stage_two_arrival_system
                    .pipe(record_fault)
                    .run_if(is_arrival_stage_two),
                departure_system.pipe(record_fault).run_if(is_departure),
            ),
            apply_deferred,
        )
            .chain(),
    );
    schedule
}

fn closed_target(world: &World) -> Result<(usize, usize), SimError> {
    let closed = world.resource::<RoundLog>().closed_count();
    let target = world
        .get_resource::<RunTarget>()
        .map(RunTarget::closed_rounds)
        .ok_or_else(|| SimError::InvalidConfiguration("no run target in the world".into()))?;
    Ok((closed, target))
}

/// Runs one simulation step: pops the next event, inserts it as [CurrentEvent],
/// then runs the schedule. A fault raised by the handler ends the step with `Err`.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> Result<Event, SimError> {
    let Some(event) = world.resource_mut::<SimulationClock>().pop_next() else {
        let (closed, target) = closed_target(world)?;
        return Err(SimError::EventQueueExhausted { closed, target });
    };
    world.insert_resource(CurrentEvent(event));

    if let Some(mut metrics) = world.get_resource_mut::<EventMetrics>() {
        metrics.record_event(event.kind);
    }
    tracing::trace!(kind = ?event.kind, at = event.timestamp, customer = ?event.subject, "dispatch");

    schedule.run(world);

    if let Some(fault) = world
        .get_resource_mut::<SimulationFault>()
        .and_then(|mut fault| fault.0.take())
    {
        return Err(fault);
    }
    Ok(event)
}

/// Runs steps until the transient round and every measured round have closed.
/// Returns the number of steps executed.
pub fn run_until_rounds_closed(world: &mut World, schedule: &mut Schedule) -> Result<usize, SimError> {
    run_until_rounds_closed_with_hook(world, schedule, |_, _| {})
}

/// Same as [run_until_rounds_closed], invoking `hook` after each step.
pub fn run_until_rounds_closed_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    mut hook: F,
) -> Result<usize, SimError>
where
    F: FnMut(&World, &Event),
{
    let mut steps = 0;
    loop {
        let (closed, target) = closed_target(world)?;
        if closed >= target {
            return Ok(steps);
        }
        let event = run_next_event(world, schedule)?;
        hook(world, &event);
        steps += 1;
    }
}

/// Builds a world for `params`, runs it to completion and returns it for inspection.
pub fn run_network(params: &NetworkParams) -> Result<World, SimError> {
    let mut world = World::new();
    build_network(&mut world, params)?;
    initialize_simulation(&mut world);

    tracing::info!(
        utilization = params.utilization,
        rounds = params.rounds,
        seed = params.seed,
        "simulation started"
    );
    let mut schedule = simulation_schedule();
    let steps = run_until_rounds_closed(&mut world, &mut schedule)?;

    let now = world.resource::<SimulationClock>().now();
    tracing::info!(steps, simulated_time = now, "simulation finished");
    world.resource::<EventMetrics>().log_summary();
    Ok(world)
}

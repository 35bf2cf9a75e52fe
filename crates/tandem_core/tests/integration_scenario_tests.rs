mod support;

use support::schedule::ScheduleRunner;
use support::world::{customer_count, stop_arrivals, TestWorldConfig};
use tandem_core::clock::{EventKind, SimulationClock};
use tandem_core::error::SimError;
use tandem_core::queues::{ServiceQueues, Stage};
use tandem_core::rounds::{RoundEstimates, RoundLog};
use tandem_core::runner::run_network;
use tandem_core::telemetry::NetworkTelemetry;

fn estimate_bits(estimates: &RoundEstimates) -> [u64; 11] {
    [
        estimates.wait_one,
        estimates.sojourn_one,
        estimates.queue_len_one,
        estimates.population_one,
        estimates.wait_two,
        estimates.sojourn_two,
        estimates.queue_len_two,
        estimates.population_two,
        estimates.wait_one_variance,
        estimates.wait_two_variance,
        estimates.duration,
    ]
    .map(f64::to_bits)
}

fn run_bits(seed: u64) -> Vec<[u64; 11]> {
    let params = TestWorldConfig {
        seed,
        ..Default::default()
    }
    .params();
    let world = run_network(&params).expect("run");
    world
        .resource::<RoundLog>()
        .measured()
        .map(estimate_bits)
        .collect()
}

#[test]
fn same_seed_gives_bit_identical_estimates() {
    let first = run_bits(11);
    let second = run_bits(11);
    assert_eq!(first.len(), 10);
    assert_eq!(first, second);
    assert_ne!(first, run_bits(12));
}

#[test]
fn lone_customer_never_waits() {
    let mut world = TestWorldConfig::default().build();
    let mut runner = ScheduleRunner::new();

    let arrival = runner.run_one(&mut world);
    assert_eq!(arrival.kind, EventKind::ArrivalStageOne);
    let customer = arrival.subject;
    stop_arrivals(&mut world).expect("next arrival was scheduled");

    let transfer = runner.run_one(&mut world);
    assert_eq!(transfer.kind, EventKind::ArrivalStageTwo);
    assert_eq!(transfer.subject, customer);
    let departure = runner.run_one(&mut world);
    assert_eq!(departure.kind, EventKind::Departure);
    assert_eq!(departure.subject, customer);

    let transient = world.resource::<RoundLog>().transient();
    assert_eq!(transient.sums().wait_one, 0.0);
    assert_eq!(transient.sums().wait_two, 0.0);
    assert_eq!(
        transient.sums().sojourn_one,
        transfer.timestamp - arrival.timestamp
    );
    assert_eq!(
        transient.sums().sojourn_two,
        departure.timestamp - transfer.timestamp
    );

    assert!(world.resource::<SimulationClock>().is_empty());
    assert_eq!(world.resource::<ServiceQueues>().total(), 0);
    // Only the customer whose arrival was cancelled is left.
    assert_eq!(customer_count(&world), 1);

    let err = runner.try_run_one(&mut world).unwrap_err();
    assert!(matches!(err, SimError::EventQueueExhausted { closed: 0, .. }));
}

#[test]
fn stage_one_arrival_preempts_stage_two_service() {
    let mut world = TestWorldConfig::default().build();
    let mut runner = ScheduleRunner::new();

    let first = runner.run_one(&mut world).subject;
    let second = stop_arrivals(&mut world).expect("second customer");
    let transfer = runner.run_one(&mut world);
    assert_eq!(transfer.subject, first);

    let departure_at = world
        .resource::<SimulationClock>()
        .next_event_time()
        .expect("departure pending");
    let preempt_at = transfer.timestamp + (departure_at - transfer.timestamp) / 2.0;
    world
        .resource_mut::<SimulationClock>()
        .schedule_at(preempt_at, EventKind::ArrivalStageOne, second);

    let arrival = runner.run_one(&mut world);
    assert_eq!(arrival.subject, second);
    assert_eq!(world.resource::<NetworkTelemetry>().preemptions, 1);
    assert!(world
        .resource::<SimulationClock>()
        .pending()
        .all(|e| e.kind != EventKind::Departure));
    assert_eq!(world.resource::<ServiceQueues>().waiting_stage_two(), 1);
    stop_arrivals(&mut world).expect("third customer");

    let second_transfer = runner.run_one(&mut world);
    assert_eq!(second_transfer.subject, second);

    let queues = world.resource::<ServiceQueues>();
    assert_eq!(queues.head(Stage::Two), Some(first));
    assert_eq!(queues.len(Stage::Two), 2);

    // The first customer waited from the preemption until the stage-1 service ended.
    let transient = world.resource::<RoundLog>().transient();
    assert_eq!(
        transient.sums().wait_two,
        second_transfer.timestamp - preempt_at
    );
    let resumed = world
        .resource::<SimulationClock>()
        .pending()
        .find(|e| e.kind == EventKind::Departure)
        .map(|e| e.subject);
    assert_eq!(resumed, Some(first));
}

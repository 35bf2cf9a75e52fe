use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// Exogenous arrival into the stage-1 queue.
    ArrivalStageOne,
    /// End of stage-1 service; the customer enters the stage-2 queue.
    ArrivalStageTwo,
    /// End of stage-2 service; the customer leaves the network.
    Departure,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub timestamp: f64,
    /// Insertion order, used to break timestamp ties FIFO.
    pub seq: u64,
    pub kind: EventKind,
    pub subject: Entity,
}

impl Eq for Event {}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (timestamp, seq).
        other
            .timestamp
            .total_cmp(&self.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event being handled in the current step. Inserted by the runner.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: f64,
    next_seq: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn schedule_at(&mut self, timestamp: f64, kind: EventKind, subject: Entity) {
        debug_assert!(
            timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            timestamp,
            seq,
            kind,
            subject,
        });
    }

    pub fn schedule_in(&mut self, delay: f64, kind: EventKind, subject: Entity) {
        self.schedule_at(self.now + delay, kind, subject);
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    /// Removes the first pending event matching `predicate`, leaving the order
    /// of the remaining events untouched.
    pub fn cancel<F>(&mut self, mut predicate: F) -> Option<Event>
    where
        F: FnMut(&Event) -> bool,
    {
        let target = self.events.iter().copied().find(|e| predicate(e))?;
        self.events.retain(|e| e.seq != target.seq);
        Some(target)
    }

    pub fn next_event_time(&self) -> Option<f64> {
        self.events.peek().map(|e| e.timestamp)
    }

    /// Pending events in no particular order.
    pub fn pending(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(index: u32) -> Entity {
        Entity::from_raw(index)
    }

    #[test]
    fn clock_pops_events_in_time_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(10.0, EventKind::ArrivalStageOne, subject(0));
        clock.schedule_at(5.0, EventKind::ArrivalStageOne, subject(1));
        clock.schedule_at(20.0, EventKind::Departure, subject(2));

        let first = clock.pop_next().expect("first event");
        assert_eq!(first.timestamp, 5.0);
        assert_eq!(clock.now(), 5.0);

        let second = clock.pop_next().expect("second event");
        assert_eq!(second.timestamp, 10.0);
        assert_eq!(clock.now(), 10.0);

        let third = clock.pop_next().expect("third event");
        assert_eq!(third.timestamp, 20.0);
        assert_eq!(clock.now(), 20.0);

        assert!(clock.pop_next().is_none());
        assert!(clock.is_empty());
    }

    #[test]
    fn equal_timestamps_pop_in_insertion_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(3.0, EventKind::Departure, subject(7));
        clock.schedule_at(3.0, EventKind::ArrivalStageOne, subject(8));
        clock.schedule_at(3.0, EventKind::ArrivalStageTwo, subject(9));

        let kinds: Vec<EventKind> = std::iter::from_fn(|| clock.pop_next())
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Departure,
                EventKind::ArrivalStageOne,
                EventKind::ArrivalStageTwo
            ]
        );
    }

    #[test]
    fn schedule_in_is_relative_to_now() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(2.0, EventKind::ArrivalStageOne, subject(0));
        clock.pop_next().expect("event");
        clock.schedule_in(1.5, EventKind::Departure, subject(0));
        assert_eq!(clock.next_event_time(), Some(3.5));
    }

    #[test]
    fn cancel_removes_only_the_matching_event() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(1.0, EventKind::ArrivalStageOne, subject(0));
        clock.schedule_at(2.0, EventKind::Departure, subject(1));
        clock.schedule_at(3.0, EventKind::ArrivalStageTwo, subject(2));

        let cancelled = clock
            .cancel(|e| e.kind == EventKind::Departure && e.subject == subject(1))
            .expect("departure was pending");
        assert_eq!(cancelled.timestamp, 2.0);
        assert_eq!(clock.len(), 2);
        assert!(clock.cancel(|e| e.kind == EventKind::Departure).is_none());

        assert_eq!(clock.pop_next().map(|e| e.timestamp), Some(1.0));
        assert_eq!(clock.pop_next().map(|e| e.timestamp), Some(3.0));
    }
}

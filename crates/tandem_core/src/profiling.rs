//! Event rate tracking for the runner.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bevy_ecs::prelude::Resource;

use crate::clock::EventKind;

/// Event processing rate metrics.
#[derive(Debug, Default, Resource)]
pub struct EventMetrics {
    /// Total events processed.
    pub events_processed: u64,
    /// Wall-clock instant of the first recorded event.
    pub start_time: Option<Instant>,
    pub events_by_kind: HashMap<EventKind, u64>,
}

impl EventMetrics {
    pub fn record_event(&mut self, kind: EventKind) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
        self.events_processed += 1;
        *self.events_by_kind.entry(kind).or_insert(0) += 1;
    }

    pub fn count(&self, kind: EventKind) -> u64 {
        self.events_by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }

    /// Current event processing rate (events per second).
    pub fn events_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.events_processed as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!(
            events = self.events_processed,
            arrivals = self.count(EventKind::ArrivalStageOne),
            transfers = self.count(EventKind::ArrivalStageTwo),
            departures = self.count(EventKind::Departure),
            elapsed_secs = self.elapsed().as_secs_f64(),
            events_per_sec = self.events_per_second(),
            "event processing summary"
        );
    }
}

//! Telemetry: flow counters and peak queue sizes of the network.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::queues::ServiceQueues;

/// Insert as a resource to have the handlers count customer flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Resource, Serialize)]
pub struct NetworkTelemetry {
    /// Exogenous arrivals processed.
    pub arrivals: u64,
    /// Customers that finished stage-1 service.
    pub transfers: u64,
    /// Customers that left the network.
    pub departures: u64,
    /// Stage-2 services interrupted by stage-1 work.
    pub preemptions: u64,
    pub peak_stage_one: usize,
    pub peak_stage_two: usize,
}

impl NetworkTelemetry {
    /// Customers currently inside the network according to the flow counters.
    pub fn in_system(&self) -> u64 {
        self.arrivals - self.departures
    }

    pub fn observe_peaks(&mut self, queues: &ServiceQueues) {
        self.peak_stage_one = self.peak_stage_one.max(queues.present_stage_one());
        self.peak_stage_two = self.peak_stage_two.max(queues.present_stage_two());
    }
}

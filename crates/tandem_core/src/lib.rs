pub mod clock;
pub mod distributions;
pub mod ecs;
pub mod error;
pub mod logging;
pub mod profiling;
pub mod queues;
pub mod rounds;
pub mod runner;
pub mod scenario;
pub mod systems;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

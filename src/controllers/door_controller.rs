use std::sync::Arc;
use tracing::{debug, error, info};

use crate::errors::DoorSupervisorResult;
use crate::services::{InputSampler, MonotonicClock};
use crate::state_management::event_dispatcher::EventDispatcher;
use crate::state_management::DoorStateRepository;
use crate::models::SupervisorOutputs;

/// Drives every supervised door through one tick: sample, evaluate, drive, report
pub struct DoorController {
    /// The doors, in configuration order, with the sampler bound to their pins
    samplers: Vec<(String, InputSampler)>,
    /// The repository owning the supervisors
    door_repository: Arc<DoorStateRepository>,
    /// Source of the `now` passed to each tick
    clock: Arc<dyn MonotonicClock>,
    /// Where the recorded door events go
    event_dispatcher: Arc<EventDispatcher>,
}

impl DoorController {
    /// Creates a new `DoorController`
    ///
    /// # Arguments
    ///
    /// * `samplers`: Door name and input sampler for every door registered in `door_repository`
    /// * `door_repository`: The `DoorStateRepository` holding the supervisors
    /// * `clock`: The monotonic clock read once per cycle
    /// * `event_dispatcher`: The `EventDispatcher` feeding the event handler
    pub fn new(
        samplers: Vec<(String, InputSampler)>,
        door_repository: Arc<DoorStateRepository>,
        clock: Arc<dyn MonotonicClock>,
        event_dispatcher: Arc<EventDispatcher>,
    ) -> Self {
        info!("Initializing Door Controller for {} door(s)", samplers.len());
        Self {
            samplers,
            door_repository,
            clock,
            event_dispatcher,
        }
    }

    /// Executes a single tick cycle
    ///
    /// 1. Reads the clock once, so every door sees the same `now`
    /// 2. For each door, samples the inputs, ticks the supervisor and drives the indicators
    /// 3. Dispatches the events the supervisors recorded
    ///
    /// A door whose pins cannot be read or written is logged and skipped; the others still run.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the cycle completed
    /// * `Err(DoorSupervisorError)` if a door is missing from the repository or the event channel is closed
    pub async fn run_tick_cycle(&self) -> DoorSupervisorResult<()> {
        let now = self.clock.now_ms();
        let mut events = Vec::new();

        for (door_name, sampler) in &self.samplers {
            let inputs = match sampler.sample() {
                Ok(inputs) => inputs,
                Err(e) => {
                    error!("Skipping tick for {}: failed to sample inputs: {}", door_name, e);
                    continue;
                }
            };

            let report = self.door_repository.tick_door(door_name, inputs, now).await?;
            debug!("{} at {} ms: {:?} {:?}", door_name, now, report.state, report.outputs);

            if let Err(e) = sampler.drive(report.outputs) {
                error!("Failed to drive indicators for {}: {}", door_name, e);
            }
            events.extend(report.events);
        }

        self.event_dispatcher.dispatch_events(events).await
    }

    /// Turns every indicator off, used when the process stops
    pub fn shutdown_outputs(&self) {
        for (door_name, sampler) in &self.samplers {
            if let Err(e) = sampler.drive(SupervisorOutputs::default()) {
                error!("Failed to clear indicators for {}: {}", door_name, e);
            }
        }
        info!("All indicators cleared");
    }
}

use log::{debug, error, info, warn};
use crate::models::{
    local_now, CycleCompletedEvent, DoorEvent, DoorState, DoorStateChangedEvent, FaultClearedEvent,
    FaultRaisedEvent, ObstacleReversalEvent, SupervisorInputs, SupervisorOutputs, SupervisorTimings,
};

/// Supervisory state machine for one bidirectional door actuator.
///
/// The supervisor is a plain owned value: the caller samples the inputs, hands them to [`tick`](Self::tick)
/// together with a monotonic timestamp and drives the returned indicator levels. Nothing in here blocks;
/// the open dwell and the fault blink are deadlines checked on later ticks.
#[derive(Debug, Clone)]
pub struct DoorSupervisor {
    door_name: String,
    timings: SupervisorTimings,
    state: DoorState,
    /// Latched result of the most recent obstacle sample
    obstacle_present: bool,
    /// Set by the fault hook, cleared when the door leaves `Fault`
    fault_latched: bool,
    fault_reason: Option<String>,
    /// Some only while `Opening` or `Closing`
    motion_started_at: Option<u64>,
    /// Some only while `Open`
    dwell_until: Option<u64>,
    /// Some only while `Fault`
    fault_started_at: Option<u64>,
    /// Indicator levels hold until a state body rewrites them
    outputs: SupervisorOutputs,
    events: Vec<DoorEvent>,
}

impl DoorSupervisor {
    /// Creates a supervisor at rest in `Idle` with both indicators off
    pub fn new(door_name: impl Into<String>, timings: SupervisorTimings) -> Self {
        Self {
            door_name: door_name.into(),
            timings,
            state: DoorState::Idle,
            obstacle_present: false,
            fault_latched: false,
            fault_reason: None,
            motion_started_at: None,
            dwell_until: None,
            fault_started_at: None,
            outputs: SupervisorOutputs::default(),
            events: Vec::new(),
        }
    }

    /// Runs one evaluation of the state machine.
    ///
    /// The button overrides are applied first (open, then close, then stop), the obstacle sample is latched,
    /// and then the body of the resulting state runs. A fault reported since the previous tick is taken
    /// before the buttons are looked at.
    ///
    /// # Arguments
    ///
    /// * `inputs` - One consistent sample of the buttons and the obstacle sensor
    /// * `now` - Monotonic clock reading in milliseconds
    ///
    /// # Returns
    ///
    /// The indicator levels to drive after this tick.
    pub fn tick(&mut self, inputs: SupervisorInputs, now: u64) -> SupervisorOutputs {
        if self.fault_latched && self.state != DoorState::Fault {
            self.take_fault(now);
        } else {
            self.apply_button_overrides(&inputs, now);
        }

        if inputs.obstacle_detected != self.obstacle_present {
            debug!("{}: obstacle {}", self.door_name, if inputs.obstacle_detected { "detected" } else { "cleared" });
        }
        self.obstacle_present = inputs.obstacle_detected;

        self.evaluate_state(now);

        debug_assert_eq!(self.state.is_moving(), self.motion_started_at.is_some());
        self.outputs
    }

    /// Reports an unrecoverable hardware condition.
    ///
    /// This is the only way into `Fault`; no transition of the state table leads there. The fault is
    /// latched and taken on the next tick.
    pub fn raise_fault(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        if self.fault_latched {
            warn!("{}: fault already latched, ignoring '{}'", self.door_name, reason);
            return;
        }
        error!("{}: fault reported: {}", self.door_name, reason);
        self.fault_latched = true;
        self.fault_reason = Some(reason);
    }

    pub fn current_state(&self) -> DoorState {
        self.state
    }

    pub fn door_name(&self) -> &str {
        &self.door_name
    }

    pub fn obstacle_present(&self) -> bool {
        self.obstacle_present
    }

    pub fn fault_latched(&self) -> bool {
        self.fault_latched
    }

    pub fn fault_reason(&self) -> Option<&str> {
        self.fault_reason.as_deref()
    }

    pub fn motion_started_at(&self) -> Option<u64> {
        self.motion_started_at
    }

    /// Deadline of the open dwell, armed on entering `Open`
    pub fn dwell_until(&self) -> Option<u64> {
        self.dwell_until
    }

    /// Indicator levels as of the last tick
    pub fn outputs(&self) -> SupervisorOutputs {
        self.outputs
    }

    /// Hands over the events recorded since the previous call
    pub fn drain_events(&mut self) -> Vec<DoorEvent> {
        std::mem::take(&mut self.events)
    }

    fn apply_button_overrides(&mut self, inputs: &SupervisorInputs, now: u64) {
        if inputs.open_pressed {
            info!("{}: open requested", self.door_name);
            self.enter(DoorState::Opening, now);
        } else if inputs.close_pressed {
            info!("{}: close requested", self.door_name);
            self.enter(DoorState::Closing, now);
        } else if inputs.stop_pressed {
            info!("{}: stop requested", self.door_name);
            self.enter(DoorState::Stopped, now);
        }
    }

    fn evaluate_state(&mut self, now: u64) {
        match self.state {
            DoorState::Idle => {
                self.outputs.status_indicator = false;
            }
            DoorState::Opening => {
                self.outputs.status_indicator = true;
                if self.motion_elapsed(now) >= self.timings.movement_timeout_ms {
                    self.enter(DoorState::Open, now);
                }
            }
            DoorState::Open => {
                if self.dwell_until.is_some_and(|deadline| now >= deadline) {
                    self.enter(DoorState::Closing, now);
                }
            }
            DoorState::Closing => {
                self.outputs.status_indicator = false;
                if self.obstacle_present {
                    let closing_elapsed_ms = self.motion_elapsed(now);
                    warn!("{}: obstacle while closing after {} ms, reopening", self.door_name, closing_elapsed_ms);
                    self.events.push(DoorEvent::ObstacleReversal(ObstacleReversalEvent {
                        door_name: self.door_name.clone(),
                        closing_elapsed_ms,
                        at_ms: now,
                        timestamp: local_now(),
                    }));
                    self.enter(DoorState::Opening, now);
                } else if self.motion_elapsed(now) >= self.timings.movement_timeout_ms {
                    self.enter(DoorState::Closed, now);
                    self.events.push(DoorEvent::CycleCompleted(CycleCompletedEvent {
                        door_name: self.door_name.clone(),
                        at_ms: now,
                        timestamp: local_now(),
                    }));
                }
            }
            DoorState::Closed => {
                self.enter(DoorState::Idle, now);
            }
            DoorState::Stopped => {
                if !self.obstacle_present {
                    self.enter(DoorState::Idle, now);
                }
            }
            DoorState::Fault => {
                self.signal_fault(now);
            }
        }
    }

    fn take_fault(&mut self, now: u64) {
        let reason = self.fault_reason.clone().unwrap_or_default();
        self.events.push(DoorEvent::FaultRaised(FaultRaisedEvent {
            door_name: self.door_name.clone(),
            reason,
            interrupted_state: self.state,
            at_ms: now,
            timestamp: local_now(),
        }));
        self.enter(DoorState::Fault, now);
    }

    /// Blinks the fault indicator, `half_period` on then `half_period` off, until the configured
    /// number of cycles has elapsed, then recovers to `Idle`
    fn signal_fault(&mut self, now: u64) {
        let started = self.fault_started_at.unwrap_or(now);
        let elapsed = now.saturating_sub(started);

        if elapsed >= self.timings.fault_blink_duration_ms() {
            info!("{}: fault sequence finished, recovering", self.door_name);
            self.events.push(DoorEvent::FaultCleared(FaultClearedEvent {
                door_name: self.door_name.clone(),
                at_ms: now,
                timestamp: local_now(),
            }));
            self.enter(DoorState::Idle, now);
        } else {
            let phase = elapsed.checked_div(self.timings.fault_blink_half_period_ms).unwrap_or(0);
            self.outputs.fault_indicator = phase % 2 == 0;
        }
    }

    fn motion_elapsed(&self, now: u64) -> u64 {
        self.motion_started_at.map_or(0, |started| now.saturating_sub(started))
    }

    /// Moves to `next` and re-arms the per-state timestamps.
    ///
    /// Entering a moving state restarts its clock even when the door was already in it.
    fn enter(&mut self, next: DoorState, now: u64) {
        let previous = self.state;

        if previous == DoorState::Fault && next != DoorState::Fault {
            self.fault_latched = false;
            self.fault_reason = None;
            self.outputs.fault_indicator = false;
        }

        self.state = next;
        self.motion_started_at = next.is_moving().then_some(now);
        self.dwell_until = (next == DoorState::Open)
            .then(|| now.saturating_add(self.timings.hold_open_duration_ms));
        self.fault_started_at = (next == DoorState::Fault).then_some(now);

        if previous != next {
            info!("Door state changed for {}: {:?} -> {:?}", self.door_name, previous, next);
            self.events.push(DoorEvent::StateChanged(DoorStateChangedEvent {
                door_name: self.door_name.clone(),
                old_state: previous,
                new_state: next,
                at_ms: now,
                timestamp: local_now(),
            }));
        }
    }
}

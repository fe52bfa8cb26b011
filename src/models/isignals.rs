//! # Supervisor Signals

//! Values exchanged with the state machine on every tick: the sampled inputs, the driven outputs,
//! and the timing constants the transitions are measured against.

use serde::{Deserialize, Serialize};

/// One consistent sample of the door inputs, taken before transitions are evaluated.
/// Buttons are already debounced and converted from their pin polarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorInputs {
    pub open_pressed: bool,
    pub close_pressed: bool,
    pub stop_pressed: bool,
    /// True when the obstacle sensor reports the path as blocked
    pub obstacle_detected: bool,
}

impl SupervisorInputs {
    /// Inputs with nothing pressed and a clear path
    pub fn released() -> Self {
        Self::default()
    }

    pub fn open() -> Self {
        Self { open_pressed: true, ..Self::default() }
    }

    pub fn close() -> Self {
        Self { close_pressed: true, ..Self::default() }
    }

    pub fn stop() -> Self {
        Self { stop_pressed: true, ..Self::default() }
    }

    /// Same sample with the obstacle sensor set to `detected`
    pub fn with_obstacle(mut self, detected: bool) -> Self {
        self.obstacle_detected = detected;
        self
    }
}

/// Indicator levels after a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorOutputs {
    /// Lit while the door is opening
    pub status_indicator: bool,
    /// Blinks while a fault is being signalled
    pub fault_indicator: bool,
}

/// Timing constants of the state machine, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorTimings {
    /// Time budget for a full open or close traversal
    pub movement_timeout_ms: u64,
    /// Dwell in `Open` before auto-close begins
    pub hold_open_duration_ms: u64,
    /// On/off cycles of the fault indicator before recovery
    pub fault_blink_cycles: u32,
    /// Length of each on and each off phase of the fault blink
    pub fault_blink_half_period_ms: u64,
}

impl SupervisorTimings {
    /// Total length of the fault blink sequence
    pub fn fault_blink_duration_ms(&self) -> u64 {
        u64::from(self.fault_blink_cycles)
            .saturating_mul(2)
            .saturating_mul(self.fault_blink_half_period_ms)
    }
}

impl Default for SupervisorTimings {
    fn default() -> Self {
        Self {
            movement_timeout_ms: 30_000,
            hold_open_duration_ms: 2_000,
            fault_blink_cycles: 5,
            fault_blink_half_period_ms: 500,
        }
    }
}

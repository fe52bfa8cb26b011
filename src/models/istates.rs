//! # Door Supervisor State Enums

//! This module defines the phases a supervised door can be in.

use std::fmt;
use serde::{Deserialize, Serialize};
use derive_more::FromStr;

/// Represents the different states a supervised door can be in.
/// Exactly one is active at any sample.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Copy, Serialize, Deserialize, FromStr)]
pub enum DoorState {
    /// The door is at rest, waiting for a button.
    Idle,
    /// The actuator is driving the door open.
    Opening,
    /// The door is fully open and dwelling before it closes on its own.
    Open,
    /// The actuator is driving the door closed.
    Closing,
    /// The door finished closing; lasts a single evaluation.
    Closed,
    /// Motion was abandoned by the stop button.
    Stopped,
    /// A reported hardware fault is being signalled on the fault indicator.
    Fault,
}

impl DoorState {
    /// Whether the actuator is moving the door in this state
    pub fn is_moving(&self) -> bool {
        matches!(self, DoorState::Opening | DoorState::Closing)
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

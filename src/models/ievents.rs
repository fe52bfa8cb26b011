//! # Door Event Definitions

//! This module defines the `DoorEvent` enum and its associated structs, which represent what happened to a supervised door
//! during a tick. Supervisors buffer these events and the controller dispatches them to the event handler.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::models::istates::DoorState;

/// Represents the different types of events a door supervisor can record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DoorEvent {
    /// The door moved from one state to another
    StateChanged(DoorStateChangedEvent),
    /// An obstacle reversed a closing door
    ObstacleReversal(ObstacleReversalEvent),
    /// A hardware fault was reported through the fault hook
    FaultRaised(FaultRaisedEvent),
    /// The fault indicator sequence completed and the door recovered
    FaultCleared(FaultClearedEvent),
    /// A close traversal ran to completion
    CycleCompleted(CycleCompletedEvent),
}

impl DoorEvent {
    /// Retrieves the name of the door associated with the event
    pub fn get_door_name(&self) -> &str {
        match self {
            DoorEvent::StateChanged(e) => &e.door_name,
            DoorEvent::ObstacleReversal(e) => &e.door_name,
            DoorEvent::FaultRaised(e) => &e.door_name,
            DoorEvent::FaultCleared(e) => &e.door_name,
            DoorEvent::CycleCompleted(e) => &e.door_name,
        }
    }

    /// Monotonic time (ms) of the tick that produced the event
    pub fn at_ms(&self) -> u64 {
        match self {
            DoorEvent::StateChanged(e) => e.at_ms,
            DoorEvent::ObstacleReversal(e) => e.at_ms,
            DoorEvent::FaultRaised(e) => e.at_ms,
            DoorEvent::FaultCleared(e) => e.at_ms,
            DoorEvent::CycleCompleted(e) => e.at_ms,
        }
    }
}

/// Represents an event where the state of a door has changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorStateChangedEvent {
    /// The name of the door
    pub door_name: String,
    /// The state before the transition
    pub old_state: DoorState,
    /// The state after the transition
    pub new_state: DoorState,
    /// Monotonic time of the transition
    pub at_ms: u64,
    /// Wall-clock time the event was recorded
    pub timestamp: NaiveDateTime,
}

/// Represents the interlock reopening a door that was closing onto an obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleReversalEvent {
    pub door_name: String,
    /// Milliseconds the door had been closing before the reversal
    pub closing_elapsed_ms: u64,
    pub at_ms: u64,
    pub timestamp: NaiveDateTime,
}

/// Represents a fault reported through the hardware-fault hook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultRaisedEvent {
    pub door_name: String,
    /// What the reporter said went wrong
    pub reason: String,
    /// The state the door was in when the fault was taken
    pub interrupted_state: DoorState,
    pub at_ms: u64,
    pub timestamp: NaiveDateTime,
}

/// Represents the end of a fault sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultClearedEvent {
    pub door_name: String,
    pub at_ms: u64,
    pub timestamp: NaiveDateTime,
}

/// Represents a door reaching `Closed`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleCompletedEvent {
    pub door_name: String,
    pub at_ms: u64,
    pub timestamp: NaiveDateTime,
}

/// # Door Supervisor Errors
/// This module defines the `DoorSupervisorError` enum, which encapsulates the infrastructure failures that can occur around the door supervisor.
/// Door-domain anomalies (obstacles, stops, faults) are states of the supervisor, not errors; only configuration, pin I/O and plumbing failures end up here.


use thiserror::Error;
use std::io;
use tokio::sync::mpsc::error::SendError;

#[derive(Error, Debug)]
pub enum DoorSupervisorError {
    /// Represents errors arising from misconfigurations or invalid settings.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Represents failures reading or driving a digital pin.
    #[error("GPIO error: {0}")]
    GpioError(String),

    /// Represents an access to a pin the I/O backend does not know about.
    #[error("Pin not configured: {0}")]
    PinNotConfigured(u8),

    /// Represents an error when a requested door is not found.
    #[error("Door not found: {0}")]
    DoorNotFound(String),

    /// Represents an operator console line that could not be parsed.
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Represents errors when sending data over a channel.
    #[error("Channel send error: {0}")]
    ChannelSendError(String),

    /// Represents errors during the initialization of the logging system.
    #[error("Logging initialization error: {0}")]
    LoggingError(String),

    /// Represents errors that occur during serialization of events.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Represents errors when waiting for tasks to complete.
    #[error("Task join error: {0}")]
    TaskJoinError(String),
}

impl<T> From<SendError<T>> for DoorSupervisorError {
    fn from(err: SendError<T>) -> Self {
        DoorSupervisorError::ChannelSendError(err.to_string())
    }
}

impl From<config::ConfigError> for DoorSupervisorError {
    fn from(err: config::ConfigError) -> Self {
        DoorSupervisorError::ConfigError(err.to_string())
    }
}

pub type DoorSupervisorResult<T> = Result<T, DoorSupervisorError>;

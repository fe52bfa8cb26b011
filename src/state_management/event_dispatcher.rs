use tokio::sync::mpsc;
use crate::errors::{DoorSupervisorError, DoorSupervisorResult};
use crate::models::DoorEvent;
use tracing::{debug, error};

/// Dispatches door events to the event handler.
pub struct EventDispatcher {
    /// The sender end of a channel for dispatching events.
    event_sender: mpsc::Sender<DoorEvent>,
}

impl EventDispatcher {
    /// Creates a new `EventDispatcher`.
    ///
    /// # Arguments
    ///
    /// * `event_sender` - The sender end of a channel for dispatching events.
    pub fn new(event_sender: mpsc::Sender<DoorEvent>) -> Self {
        Self { event_sender }
    }

    /// Dispatches an event to the event handler.
    ///
    /// # Returns
    ///
    /// A `DoorSupervisorResult` indicating success or failure of the dispatch operation.
    pub async fn dispatch_event(&self, event: DoorEvent) -> DoorSupervisorResult<()> {
        debug!("Dispatching event: {:?}", event);
        self.event_sender.send(event).await
            .map_err(|e| {
                error!("Failed to dispatch event: {:?}", e);
                DoorSupervisorError::ChannelSendError(format!("Failed to dispatch event: {}", e))
            })
    }

    /// Dispatches events in order, stopping at the first failure.
    pub async fn dispatch_events(&self, events: Vec<DoorEvent>) -> DoorSupervisorResult<()> {
        if !events.is_empty() {
            debug!("Dispatching {} events", events.len());
        }
        for event in events {
            self.dispatch_event(event).await?;
        }
        Ok(())
    }
}

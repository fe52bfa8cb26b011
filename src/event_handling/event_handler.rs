use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::Mutex as SyncMutex;
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};
use crate::errors::DoorSupervisorResult;
use crate::models::{DoorEvent, DoorState};

/// Counters kept per door from the events it produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DoorActivity {
    /// Number of state transitions
    pub transitions: u64,
    /// Close traversals that reached `Closed`
    pub completed_cycles: u64,
    /// Closings reversed by the obstacle interlock
    pub obstacle_reversals: u64,
    /// Faults taken through the fault hook
    pub faults: u64,
    /// State after the most recent transition
    pub last_state: Option<DoorState>,
}

/// The EventHandler consumes the events dispatched by the controller, logs them and keeps per-door activity.
#[derive(Clone)]
pub struct EventHandler {
    /// A queue for receiving `DoorEvent`s.
    event_queue: Arc<Mutex<mpsc::Receiver<DoorEvent>>>,
    /// Activity counters keyed by door name.
    activity: Arc<SyncMutex<HashMap<String, DoorActivity>>>,
}

impl EventHandler {
    /// Creates a new `EventHandler`.
    ///
    /// # Arguments
    ///
    /// * `event_queue` - The receiver end of a channel to receive `DoorEvent`s.
    pub fn new(event_queue: mpsc::Receiver<DoorEvent>) -> Self {
        Self {
            event_queue: Arc::new(Mutex::new(event_queue)),
            activity: Arc::new(SyncMutex::new(HashMap::new())),
        }
    }

    /// Runs the event handler, continuously processing events from the queue
    /// until every sender is dropped.
    pub async fn run(&self) -> DoorSupervisorResult<()> {
        info!("EventHandler started");
        let mut queue = self.event_queue.lock().await;
        while let Some(event) = queue.recv().await {
            if let Err(e) = self.process_event(event) {
                error!("Error processing event: {:?}", e);
            }
        }
        info!("EventHandler stopped");
        Ok(())
    }

    /// Logs a single event as a JSON line and updates the counters of its door.
    ///
    /// # Returns
    ///
    /// * `Err(DoorSupervisorError::SerializationError)` if the event cannot be rendered
    pub fn process_event(&self, event: DoorEvent) -> DoorSupervisorResult<()> {
        let line = serde_json::to_string(&event)?;
        debug!("Processing event at {} ms: {}", event.at_ms(), line);

        let mut activity = self.activity.lock();
        let entry = activity.entry(event.get_door_name().to_string()).or_default();

        match &event {
            DoorEvent::StateChanged(e) => {
                info!("{}: {} -> {} at {} ms", e.door_name, e.old_state, e.new_state, e.at_ms);
                entry.transitions += 1;
                entry.last_state = Some(e.new_state);
            }
            DoorEvent::ObstacleReversal(e) => {
                warn!("{}: obstacle reversed the door after {} ms of closing", e.door_name, e.closing_elapsed_ms);
                entry.obstacle_reversals += 1;
            }
            DoorEvent::FaultRaised(e) => {
                error!("{}: fault '{}' taken while {}", e.door_name, e.reason, e.interrupted_state);
                entry.faults += 1;
            }
            DoorEvent::FaultCleared(e) => {
                info!("{}: fault sequence complete", e.door_name);
            }
            DoorEvent::CycleCompleted(e) => {
                info!("{}: door closed", e.door_name);
                entry.completed_cycles += 1;
            }
        }
        Ok(())
    }

    /// Activity recorded so far for one door
    pub fn activity(&self, door_name: &str) -> Option<DoorActivity> {
        self.activity.lock().get(door_name).cloned()
    }

    /// Activity of every door that produced an event, sorted by door name
    pub fn summary(&self) -> Vec<(String, DoorActivity)> {
        let mut summary: Vec<_> = self.activity.lock()
            .iter()
            .map(|(name, activity)| (name.clone(), activity.clone()))
            .collect();
        summary.sort_by(|a, b| a.0.cmp(&b.0));
        summary
    }

    pub fn log_summary(&self) {
        for (door_name, activity) in self.summary() {
            info!(
                "{}: {} transitions, {} cycles, {} reversals, {} faults",
                door_name, activity.transitions, activity.completed_cycles, activity.obstacle_reversals, activity.faults
            );
        }
    }
}

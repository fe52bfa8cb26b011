use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::models::{DoorEvent, DoorState, SupervisorInputs, SupervisorOutputs};
use crate::errors::{DoorSupervisorError, DoorSupervisorResult};
use crate::config::Settings;
use crate::state_management::supervisor::DoorSupervisor;
use tracing::info;

/// What one supervisor produced during a tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub state: DoorState,
    pub outputs: SupervisorOutputs,
    pub events: Vec<DoorEvent>,
}

/// Owns every door supervisor, keyed by door name
pub struct DoorStateRepository {
    doors: Arc<RwLock<HashMap<String, DoorSupervisor>>>,
}

impl DoorStateRepository {
    pub fn new() -> Self {
        Self {
            doors: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn initialize_from_settings(&self, settings: &Settings) -> DoorSupervisorResult<()> {
        let timings = settings.supervisor.timings();
        let mut doors = self.doors.write().await;
        for door in &settings.doors {
            info!("Registering door {} with {:?}", door.door_name, timings);
            doors.insert(door.door_name.clone(), DoorSupervisor::new(door.door_name.clone(), timings));
        }
        Ok(())
    }

    pub async fn insert_door(&self, supervisor: DoorSupervisor) {
        let mut doors = self.doors.write().await;
        doors.insert(supervisor.door_name().to_string(), supervisor);
    }

    pub async fn get_door_state(&self, door_name: &str) -> Option<DoorState> {
        let doors = self.doors.read().await;
        doors.get(door_name).map(DoorSupervisor::current_state)
    }

    /// Returns a copy of the supervisor for diagnostics
    pub async fn get_door(&self, door_name: &str) -> Option<DoorSupervisor> {
        let doors = self.doors.read().await;
        doors.get(door_name).cloned()
    }

    /// Runs one evaluation of the named door and collects the events it recorded
    pub async fn tick_door(&self, door_name: &str, inputs: SupervisorInputs, now: u64) -> DoorSupervisorResult<TickReport> {
        let mut doors = self.doors.write().await;
        let door = doors.get_mut(door_name)
            .ok_or_else(|| DoorSupervisorError::DoorNotFound(door_name.to_string()))?;

        let outputs = door.tick(inputs, now);
        Ok(TickReport {
            state: door.current_state(),
            outputs,
            events: door.drain_events(),
        })
    }

    pub async fn raise_fault(&self, door_name: &str, reason: &str) -> DoorSupervisorResult<()> {
        let mut doors = self.doors.write().await;
        let door = doors.get_mut(door_name)
            .ok_or_else(|| DoorSupervisorError::DoorNotFound(door_name.to_string()))?;
        door.raise_fault(reason);
        Ok(())
    }

    /// Current state of every door, sorted by door name
    pub async fn get_all_states(&self) -> Vec<(String, DoorState)> {
        let doors = self.doors.read().await;
        let mut states: Vec<_> = doors.iter()
            .map(|(name, door)| (name.clone(), door.current_state()))
            .collect();
        states.sort_by(|a, b| a.0.cmp(&b.0));
        states
    }
}

impl Default for DoorStateRepository {
    fn default() -> Self {
        Self::new()
    }
}

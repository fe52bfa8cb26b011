pub mod supervisor;
pub mod door_state_repository;
pub mod event_dispatcher;
pub mod state_manager_lifecycle;

pub use supervisor::DoorSupervisor;
pub use door_state_repository::{DoorStateRepository, TickReport};

pub mod door_controller;

pub use door_controller::DoorController;

//! # Configuration Management

//! This module handles the configuration loading and management for the door supervisor.
//! It leverages the `config` crate to provide a flexible and structured way to define and access configuration settings from various sources, including:

//! * YAML configuration files (default.yaml, development.yaml, production.yaml)
//! * Environment variables

//! The core of this module is the `Settings` struct, which encapsulates the timing constants, the door wiring and the logging setup.

use serde::{Deserialize, Serialize};
use config::{Config, Environment, File};
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use log::debug;
use crate::errors::DoorSupervisorError;
use crate::models::SupervisorTimings;

/// Represents the complete set of configuration settings for the door supervisor.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Timing constants shared by every supervised door
    pub supervisor: SupervisorSettings,
    /// Settings for application logging
    pub logging: LoggingSettings,
    /// Wiring of each supervised door
    pub doors: Vec<DoorSettings>,
    /// Settings for the stdin operator console
    pub console: ConsoleSettings,
}

/// Holds the tick cadence and the timing constants of the state machine
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SupervisorSettings {
    /// The interval (in milliseconds) between two evaluations of the state machine
    pub tick_interval_ms: u64,
    /// Time budget (in milliseconds) for a full open or close traversal
    pub movement_timeout_ms: u64,
    /// Dwell (in milliseconds) in `Open` before the door closes on its own
    pub hold_open_duration_ms: u64,
    /// Number of on/off cycles of the fault indicator before recovering
    pub fault_blink_cycles: u32,
    /// Length (in milliseconds) of each on and each off phase of the fault blink
    pub fault_blink_half_period_ms: u64,
}

impl SupervisorSettings {
    /// Converts the configured values into the timings consumed by `DoorSupervisor`
    pub fn timings(&self) -> SupervisorTimings {
        SupervisorTimings {
            movement_timeout_ms: self.movement_timeout_ms,
            hold_open_duration_ms: self.hold_open_duration_ms,
            fault_blink_cycles: self.fault_blink_cycles,
            fault_blink_half_period_ms: self.fault_blink_half_period_ms,
        }
    }
}

/// Holds the configuration settings for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    /// The logging level (e.g., "info", "debug", "error") used when `RUST_LOG` is unset
    pub level: String,
    /// The directory path where log files will be stored (optional)
    pub path: Option<PathBuf>,
}

/// Represents the configuration for a single supervised door
#[derive(Debug, Deserialize, Clone)]
pub struct DoorSettings {
    /// The name or identifier of the door
    pub door_name: String,
    /// Pin assignment of the buttons, the sensor and the indicators
    pub pins: DoorPins,
    /// Whether the buttons and the obstacle sensor pull the line low when active
    pub active_low_inputs: bool,
}

/// Pin numbers wired to one door
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct DoorPins {
    pub open_button: u8,
    pub close_button: u8,
    pub stop_button: u8,
    pub obstacle_sensor: u8,
    pub status_indicator: u8,
    pub fault_indicator: u8,
}

impl DoorPins {
    /// All pins of the door, inputs first
    pub fn all(&self) -> [u8; 6] {
        [
            self.open_button,
            self.close_button,
            self.stop_button,
            self.obstacle_sensor,
            self.status_indicator,
            self.fault_indicator,
        ]
    }
}

/// Holds the settings of the operator console
#[derive(Debug, Deserialize, Clone)]
pub struct ConsoleSettings {
    /// Whether commands are read from stdin to drive the simulated inputs
    pub enabled: bool,
}


/// # Settings Initialization
///
/// The `Settings` implementation provides a `new` function to load and construct the configuration settings.
impl Settings {
    /// Loads and constructs the application settings from various configuration sources.
    ///
    /// This function reads configuration settings from the following sources, in order of precedence:
    ///
    /// 1. `default.yaml`: Contains default settings for the application
    /// 2. Environment-specific YAML file (e.g., `development.yaml` or `production.yaml`) based on the `RUN_MODE` environment variable
    /// 3. Environment variables prefixed with `APP` (e.g., `APP__SUPERVISOR__TICK_INTERVAL_MS`)
    ///
    /// The `CONFIG_DIR` environment variable can be used to specify the directory where the YAML configuration files are located (defaults to "src/config").
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)`: If the settings were loaded, constructed and validated successfully
    /// * `Err(DoorSupervisorError)`: If there was an error during the loading or construction process
    pub fn new() -> Result<Self, DoorSupervisorError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "src/config".into());
        debug!("Run Mode: {:?}, Config Dir: {:?}", run_mode, config_dir);

        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/default", config_dir)))
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        debug!("{:#?}", s);
        let mut s = Self::from_config(s)?;

        if let Some(ref mut path) = s.logging.path {
            *path = env::current_dir()?.join(path.clone());
        }

        Ok(s)
    }

    /// Deserializes and validates settings from an already built `Config`
    pub fn from_config(config: Config) -> Result<Self, DoorSupervisorError> {
        let s: Self = config.try_deserialize::<Settings>()
            .map_err(DoorSupervisorError::from)?;
        s.validate()?;
        Ok(s)
    }

    /// Rejects settings the supervisor cannot run with
    ///
    /// # Returns
    ///
    /// * `Err(DoorSupervisorError::ConfigError)` on a zero tick or timing, an empty or duplicated door list,
    ///   or a pin wired twice on the same door
    pub fn validate(&self) -> Result<(), DoorSupervisorError> {
        let sup = &self.supervisor;
        if sup.tick_interval_ms == 0 {
            return Err(DoorSupervisorError::ConfigError("supervisor.tick_interval_ms must be greater than 0".into()));
        }
        if sup.movement_timeout_ms == 0 {
            return Err(DoorSupervisorError::ConfigError("supervisor.movement_timeout_ms must be greater than 0".into()));
        }
        if sup.fault_blink_cycles > 0 && sup.fault_blink_half_period_ms == 0 {
            return Err(DoorSupervisorError::ConfigError("supervisor.fault_blink_half_period_ms must be greater than 0".into()));
        }
        if self.doors.is_empty() {
            return Err(DoorSupervisorError::ConfigError("at least one door must be configured".into()));
        }

        let mut names = HashSet::new();
        for door in &self.doors {
            if !names.insert(door.door_name.to_lowercase()) {
                return Err(DoorSupervisorError::ConfigError(format!("duplicate door name: {}", door.door_name)));
            }
            let mut pins = HashSet::new();
            for pin in door.pins.all() {
                if !pins.insert(pin) {
                    return Err(DoorSupervisorError::ConfigError(
                        format!("pin {} is wired more than once on door {}", pin, door.door_name)
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn get_door(&self, door_name: &str) -> Option<&DoorSettings> {
        self.doors.iter().find(|door| door.door_name.eq_ignore_ascii_case(door_name))
    }
}

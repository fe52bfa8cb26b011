use config::{Config, File, FileFormat};

use door_supervisor::config::{ConsoleSettings, DoorPins, DoorSettings, LoggingSettings, Settings, SupervisorSettings};
use door_supervisor::errors::DoorSupervisorError;

const TWO_DOORS: &str = r#"
supervisor:
  tick_interval_ms: 100
  movement_timeout_ms: 8000
  hold_open_duration_ms: 1500
  fault_blink_cycles: 3
  fault_blink_half_period_ms: 250

logging:
  level: debug

doors:
  - door_name: loading-bay
    active_low_inputs: true
    pins: { open_button: 2, close_button: 3, stop_button: 4, obstacle_sensor: 5, status_indicator: 12, fault_indicator: 13 }
  - door_name: gate
    active_low_inputs: false
    pins: { open_button: 6, close_button: 7, stop_button: 8, obstacle_sensor: 9, status_indicator: 10, fault_indicator: 11 }

console:
  enabled: false
"#;

fn load(yaml: &str) -> Result<Settings, DoorSupervisorError> {
    let config = Config::builder()
        .add_source(File::from_str(yaml, FileFormat::Yaml))
        .build()?;
    Settings::from_config(config)
}

fn create_mock_settings() -> Settings {
    Settings {
        supervisor: SupervisorSettings {
            tick_interval_ms: 500,
            movement_timeout_ms: 30_000,
            hold_open_duration_ms: 2_000,
            fault_blink_cycles: 5,
            fault_blink_half_period_ms: 500,
        },
        logging: LoggingSettings {
            level: "info".to_string(),
            path: None,
        },
        doors: vec![DoorSettings {
            door_name: "garage".to_string(),
            pins: DoorPins {
                open_button: 2,
                close_button: 3,
                stop_button: 4,
                obstacle_sensor: 5,
                status_indicator: 12,
                fault_indicator: 13,
            },
            active_low_inputs: true,
        }],
        console: ConsoleSettings { enabled: true },
    }
}

#[test]
fn test_loads_two_doors_from_yaml() {
    let settings = load(TWO_DOORS).unwrap();

    assert_eq!(settings.supervisor.tick_interval_ms, 100);
    assert_eq!(settings.logging.level, "debug");
    assert!(settings.logging.path.is_none());
    assert!(!settings.console.enabled);
    assert_eq!(settings.doors.len(), 2);

    let gate = settings.get_door("GATE").expect("lookup ignores case");
    assert!(!gate.active_low_inputs);
    assert_eq!(gate.pins.obstacle_sensor, 9);

    let timings = settings.supervisor.timings();
    assert_eq!(timings.movement_timeout_ms, 8_000);
    assert_eq!(timings.hold_open_duration_ms, 1_500);
    assert_eq!(timings.fault_blink_duration_ms(), 1_500);
}

#[test]
fn test_shipped_defaults_match_reference_wiring() {
    let config = Config::builder()
        .add_source(File::with_name("src/config/default"))
        .build()
        .unwrap();
    let settings = Settings::from_config(config).unwrap();

    assert_eq!(settings.supervisor.tick_interval_ms, 500);
    assert_eq!(settings.supervisor.movement_timeout_ms, 30_000);
    assert_eq!(settings.supervisor.hold_open_duration_ms, 2_000);
    assert_eq!(settings.supervisor.timings().fault_blink_duration_ms(), 5_000);

    let garage = settings.get_door("garage").unwrap();
    assert_eq!(garage.pins.all(), [2, 3, 4, 5, 12, 13]);
    assert!(garage.active_low_inputs);
}

#[test]
fn test_missing_section_is_a_config_error() {
    let result = load("logging:\n  level: info\n");
    assert!(matches!(result, Err(DoorSupervisorError::ConfigError(_))));
}

#[test]
fn test_valid_settings_pass_validation() {
    assert!(create_mock_settings().validate().is_ok());
}

#[test]
fn test_zero_tick_interval_is_rejected() {
    let mut settings = create_mock_settings();
    settings.supervisor.tick_interval_ms = 0;
    assert!(matches!(settings.validate(), Err(DoorSupervisorError::ConfigError(msg)) if msg.contains("tick_interval_ms")));
}

#[test]
fn test_zero_movement_timeout_is_rejected() {
    let mut settings = create_mock_settings();
    settings.supervisor.movement_timeout_ms = 0;
    assert!(settings.validate().is_err());
}

#[test]
fn test_blink_without_half_period_is_rejected() {
    let mut settings = create_mock_settings();
    settings.supervisor.fault_blink_half_period_ms = 0;
    assert!(settings.validate().is_err());

    settings.supervisor.fault_blink_cycles = 0;
    assert!(settings.validate().is_ok(), "no blink, no period needed");
}

#[test]
fn test_empty_door_list_is_rejected() {
    let mut settings = create_mock_settings();
    settings.doors.clear();
    assert!(settings.validate().is_err());
}

#[test]
fn test_duplicate_door_names_are_rejected() {
    let mut settings = create_mock_settings();
    let mut twin = settings.doors[0].clone();
    twin.door_name = "Garage".to_string();
    twin.pins.open_button = 20;
    settings.doors.push(twin);
    assert!(matches!(settings.validate(), Err(DoorSupervisorError::ConfigError(msg)) if msg.contains("duplicate door name")));
}

#[test]
fn test_pin_wired_twice_is_rejected() {
    let mut settings = create_mock_settings();
    settings.doors[0].pins.fault_indicator = settings.doors[0].pins.status_indicator;
    assert!(matches!(settings.validate(), Err(DoorSupervisorError::ConfigError(msg)) if msg.contains("pin 12")));
}

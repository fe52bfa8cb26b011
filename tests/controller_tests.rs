use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use door_supervisor::config::DoorPins;
use door_supervisor::controllers::DoorController;
use door_supervisor::errors::{DoorSupervisorError, DoorSupervisorResult};
use door_supervisor::event_handling::EventHandler;
use door_supervisor::models::{DoorState, SupervisorTimings};
use door_supervisor::services::{DigitalIo, InputSampler, ManualClock, SimulatedDoorPanel, SimulatedGpio};
use door_supervisor::state_management::event_dispatcher::EventDispatcher;
use door_supervisor::state_management::{DoorStateRepository, DoorSupervisor};

const TICK: u64 = 500;

fn garage_pins() -> DoorPins {
    DoorPins {
        open_button: 2,
        close_button: 3,
        stop_button: 4,
        obstacle_sensor: 5,
        status_indicator: 12,
        fault_indicator: 13,
    }
}

fn short_timings() -> SupervisorTimings {
    SupervisorTimings {
        movement_timeout_ms: 2_000,
        hold_open_duration_ms: 1_000,
        fault_blink_cycles: 2,
        fault_blink_half_period_ms: 500,
    }
}

/// Pin backend whose every access fails
struct BrokenIo;

impl DigitalIo for BrokenIo {
    fn read_digital_input(&self, pin: u8) -> DoorSupervisorResult<bool> {
        Err(DoorSupervisorError::GpioError(format!("pin {} unreadable", pin)))
    }

    fn set_digital_output(&self, pin: u8, _level: bool) -> DoorSupervisorResult<()> {
        Err(DoorSupervisorError::GpioError(format!("pin {} unwritable", pin)))
    }
}

/// Simulated pins whose obstacle sensor can be made unreadable
struct FlakySensorIo {
    gpio: Arc<SimulatedGpio>,
    obstacle_pin: u8,
    sensor_broken: AtomicBool,
}

impl DigitalIo for FlakySensorIo {
    fn read_digital_input(&self, pin: u8) -> DoorSupervisorResult<bool> {
        if pin == self.obstacle_pin && self.sensor_broken.load(Ordering::SeqCst) {
            return Err(DoorSupervisorError::GpioError(format!("pin {} unreadable", pin)));
        }
        self.gpio.read_digital_input(pin)
    }

    fn set_digital_output(&self, pin: u8, level: bool) -> DoorSupervisorResult<()> {
        self.gpio.set_digital_output(pin, level)
    }
}

struct Harness {
    controller: DoorController,
    repository: Arc<DoorStateRepository>,
    clock: Arc<ManualClock>,
    panel: Arc<SimulatedDoorPanel>,
    handler: EventHandler,
}

async fn create_harness() -> Harness {
    let repository = Arc::new(DoorStateRepository::new());
    repository.insert_door(DoorSupervisor::new("garage", short_timings())).await;

    let panel = Arc::new(SimulatedDoorPanel::new(garage_pins(), true));
    let io: Arc<dyn DigitalIo> = panel.gpio();
    let sampler = InputSampler::new(garage_pins(), true, io);

    let clock = Arc::new(ManualClock::new(0));
    let (sender, receiver) = mpsc::channel(256);
    let controller = DoorController::new(
        vec![("garage".to_string(), sampler)],
        Arc::clone(&repository),
        clock.clone(),
        Arc::new(EventDispatcher::new(sender)),
    );

    Harness {
        controller,
        repository,
        clock,
        panel,
        handler: EventHandler::new(receiver),
    }
}

async fn tick(harness: &Harness) -> DoorState {
    harness.controller.run_tick_cycle().await.expect("tick cycle failed");
    harness.clock.advance(TICK);
    harness.repository.get_door_state("garage").await.expect("door registered")
}

#[tokio::test]
async fn test_button_press_is_consumed_by_one_tick() {
    let harness = create_harness().await;

    harness.panel.press_open().unwrap();
    assert_eq!(tick(&harness).await, DoorState::Opening);
    assert!(harness.panel.status_indicator());

    assert_eq!(tick(&harness).await, DoorState::Opening);
    let door = harness.repository.get_door("garage").await.unwrap();
    assert_eq!(door.motion_started_at(), Some(0), "a released button must not restart the motion");
}

#[tokio::test]
async fn test_cycle_with_obstacle_reversal_reaches_event_handler() {
    let harness = create_harness().await;

    harness.panel.press_open().unwrap();
    let mut states = Vec::new();
    for _ in 0..8 {
        states.push(tick(&harness).await);
    }
    // opening 0..1500, open at 2000, dwell ends at 3000, closing from 3000
    assert_eq!(states[3], DoorState::Opening);
    assert_eq!(states[4], DoorState::Open);
    assert_eq!(states[6], DoorState::Closing);
    assert!(!harness.panel.status_indicator(), "indicator is off while closing");

    harness.panel.set_obstacle(true).unwrap();
    assert_eq!(tick(&harness).await, DoorState::Opening);
    // the opening body lights the indicator from the next tick on
    assert!(!harness.panel.status_indicator());
    assert_eq!(tick(&harness).await, DoorState::Opening);
    assert!(harness.panel.status_indicator());

    let Harness { controller, handler, .. } = harness;
    drop(controller);
    handler.run().await.unwrap();

    let activity = handler.activity("garage").expect("events recorded");
    assert_eq!(activity.obstacle_reversals, 1);
    assert_eq!(activity.transitions, 4);
    assert_eq!(activity.last_state, Some(DoorState::Opening));
}

#[tokio::test]
async fn test_close_runs_to_completion() {
    let harness = create_harness().await;

    harness.panel.press_close().unwrap();
    assert_eq!(tick(&harness).await, DoorState::Closing);
    for _ in 0..3 {
        assert_eq!(tick(&harness).await, DoorState::Closing);
    }
    assert_eq!(tick(&harness).await, DoorState::Closed);
    assert_eq!(tick(&harness).await, DoorState::Idle);

    let Harness { controller, handler, .. } = harness;
    drop(controller);
    handler.run().await.unwrap();
    assert_eq!(handler.activity("garage").unwrap().completed_cycles, 1);
}

#[tokio::test]
async fn test_fault_blinks_the_fault_indicator() {
    let harness = create_harness().await;

    harness.repository.raise_fault("garage", "encoder lost").await.unwrap();
    let mut blink = Vec::new();
    loop {
        let state = tick(&harness).await;
        if state != DoorState::Fault {
            break;
        }
        blink.push(harness.panel.fault_indicator());
    }
    assert_eq!(blink, vec![true, false, true, false]);
    assert!(!harness.panel.fault_indicator());

    let Harness { controller, handler, .. } = harness;
    drop(controller);
    handler.run().await.unwrap();
    assert_eq!(handler.activity("garage").unwrap().faults, 1);
}

#[tokio::test]
async fn test_broken_door_is_skipped_and_others_keep_running() {
    let repository = Arc::new(DoorStateRepository::new());
    repository.insert_door(DoorSupervisor::new("garage", short_timings())).await;
    repository.insert_door(DoorSupervisor::new("shed", short_timings())).await;

    let panel = Arc::new(SimulatedDoorPanel::new(garage_pins(), true));
    let good: Arc<dyn DigitalIo> = panel.gpio();
    let broken: Arc<dyn DigitalIo> = Arc::new(BrokenIo);
    let (sender, _receiver) = mpsc::channel(16);

    let controller = DoorController::new(
        vec![
            ("shed".to_string(), InputSampler::new(garage_pins(), true, broken)),
            ("garage".to_string(), InputSampler::new(garage_pins(), true, good)),
        ],
        Arc::clone(&repository),
        Arc::new(ManualClock::new(0)),
        Arc::new(EventDispatcher::new(sender)),
    );

    panel.press_close().unwrap();
    controller.run_tick_cycle().await.unwrap();
    assert_eq!(repository.get_door_state("garage").await, Some(DoorState::Closing));
    assert_eq!(repository.get_door_state("shed").await, Some(DoorState::Idle));
}

#[tokio::test]
async fn test_unregistered_door_fails_the_cycle() {
    let repository = Arc::new(DoorStateRepository::new());
    let panel = SimulatedDoorPanel::new(garage_pins(), true);
    let io: Arc<dyn DigitalIo> = panel.gpio();
    let (sender, _receiver) = mpsc::channel(16);

    let controller = DoorController::new(
        vec![("ghost".to_string(), InputSampler::new(garage_pins(), true, io))],
        repository,
        Arc::new(ManualClock::new(0)),
        Arc::new(EventDispatcher::new(sender)),
    );

    let result = controller.run_tick_cycle().await;
    assert!(matches!(result, Err(DoorSupervisorError::DoorNotFound(name)) if name == "ghost"));
}

#[tokio::test]
async fn test_closed_event_channel_is_reported() {
    let harness = create_harness().await;
    let Harness { controller, handler, panel, .. } = harness;
    drop(handler);

    panel.press_open().unwrap();
    let result = controller.run_tick_cycle().await;
    assert!(matches!(result, Err(DoorSupervisorError::ChannelSendError(_))));
}

#[tokio::test]
async fn test_shutdown_clears_indicators() {
    let harness = create_harness().await;
    harness.panel.press_open().unwrap();
    tick(&harness).await;
    assert!(harness.panel.status_indicator());

    harness.controller.shutdown_outputs();
    assert!(!harness.panel.status_indicator());
    assert!(!harness.panel.fault_indicator());
}

#[test]
fn test_sampler_applies_active_low_polarity() {
    let panel = SimulatedDoorPanel::new(garage_pins(), true);
    let gpio = panel.gpio();
    let io: Arc<dyn DigitalIo> = gpio.clone();
    let sampler = InputSampler::new(garage_pins(), true, io);

    assert_eq!(gpio.read_digital_input(5).unwrap(), true, "pulled up at rest");
    let idle = sampler.sample().unwrap();
    assert!(!idle.open_pressed && !idle.close_pressed && !idle.stop_pressed && !idle.obstacle_detected);

    panel.set_obstacle(true).unwrap();
    panel.press_stop().unwrap();
    assert_eq!(gpio.read_digital_input(5).unwrap(), false, "blocked sensor pulls low");
    let sample = sampler.sample().unwrap();
    assert!(sample.stop_pressed);
    assert!(sample.obstacle_detected);
    assert!(!sampler.sample().unwrap().stop_pressed);
}

#[test]
fn test_unknown_pin_is_rejected() {
    let panel = SimulatedDoorPanel::new(garage_pins(), true);
    let gpio = panel.gpio();
    assert!(matches!(gpio.read_digital_input(40), Err(DoorSupervisorError::PinNotConfigured(40))));
    assert!(matches!(gpio.set_digital_output(2, true), Err(DoorSupervisorError::PinNotConfigured(2))));
}

#[test]
fn test_press_survives_a_failed_sample() {
    let panel = SimulatedDoorPanel::new(garage_pins(), true);
    let flaky = Arc::new(FlakySensorIo {
        gpio: panel.gpio(),
        obstacle_pin: garage_pins().obstacle_sensor,
        sensor_broken: AtomicBool::new(true),
    });
    let io: Arc<dyn DigitalIo> = flaky.clone();
    let sampler = InputSampler::new(garage_pins(), true, io);

    panel.press_open().unwrap();
    assert!(matches!(sampler.sample(), Err(DoorSupervisorError::GpioError(_))));
    panel.press_stop().unwrap();
    assert!(sampler.sample().is_err());

    flaky.sensor_broken.store(false, Ordering::SeqCst);
    let recovered = sampler.sample().unwrap();
    assert!(recovered.open_pressed, "press read during the failed sample is delivered");
    assert!(recovered.stop_pressed);
    assert!(!recovered.close_pressed);

    let next = sampler.sample().unwrap();
    assert!(!next.open_pressed && !next.stop_pressed, "carried presses are delivered once");
}

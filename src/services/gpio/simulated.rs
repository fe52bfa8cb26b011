use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::Mutex;
use tracing::debug;
use crate::config::DoorPins;
use crate::errors::{DoorSupervisorError, DoorSupervisorResult};
use crate::services::gpio::DigitalIo;

#[derive(Debug, Default)]
struct PinBank {
    /// Held input levels
    inputs: HashMap<u8, bool>,
    /// One-shot levels returned by the next read of the pin, then dropped
    pulses: HashMap<u8, bool>,
    outputs: HashMap<u8, bool>,
}

/// In-memory `DigitalIo` backend used when no hardware is attached
#[derive(Debug, Default)]
pub struct SimulatedGpio {
    bank: Mutex<PinBank>,
}

impl SimulatedGpio {
    /// Creates a backend knowing the given pins; inputs rest at `idle_level`, outputs start low
    pub fn new(input_pins: &[u8], output_pins: &[u8], idle_level: bool) -> Self {
        let bank = PinBank {
            inputs: input_pins.iter().map(|pin| (*pin, idle_level)).collect(),
            pulses: HashMap::new(),
            outputs: output_pins.iter().map(|pin| (*pin, false)).collect(),
        };
        Self { bank: Mutex::new(bank) }
    }

    /// Holds an input at `level` until changed again
    pub fn set_input_level(&self, pin: u8, level: bool) -> DoorSupervisorResult<()> {
        let mut bank = self.bank.lock();
        match bank.inputs.get_mut(&pin) {
            Some(held) => {
                *held = level;
                Ok(())
            }
            None => Err(DoorSupervisorError::PinNotConfigured(pin)),
        }
    }

    /// Makes the next read of `pin` return `level`, like a momentary button held for one sample
    pub fn pulse_input(&self, pin: u8, level: bool) -> DoorSupervisorResult<()> {
        let mut bank = self.bank.lock();
        if !bank.inputs.contains_key(&pin) {
            return Err(DoorSupervisorError::PinNotConfigured(pin));
        }
        bank.pulses.insert(pin, level);
        Ok(())
    }

    /// Last level written to an output pin
    pub fn output_level(&self, pin: u8) -> Option<bool> {
        self.bank.lock().outputs.get(&pin).copied()
    }
}

impl DigitalIo for SimulatedGpio {
    fn read_digital_input(&self, pin: u8) -> DoorSupervisorResult<bool> {
        let mut bank = self.bank.lock();
        if let Some(level) = bank.pulses.remove(&pin) {
            return Ok(level);
        }
        bank.inputs.get(&pin)
            .copied()
            .ok_or(DoorSupervisorError::PinNotConfigured(pin))
    }

    fn set_digital_output(&self, pin: u8, level: bool) -> DoorSupervisorResult<()> {
        let mut bank = self.bank.lock();
        match bank.outputs.get_mut(&pin) {
            Some(current) => {
                *current = level;
                Ok(())
            }
            None => Err(DoorSupervisorError::PinNotConfigured(pin)),
        }
    }
}

/// The buttons and sensor of one simulated door, expressed in logical terms
#[derive(Debug)]
pub struct SimulatedDoorPanel {
    gpio: Arc<SimulatedGpio>,
    pins: DoorPins,
    active_low: bool,
}

impl SimulatedDoorPanel {
    /// Creates the backend for a door wired as `pins`, with every input released
    pub fn new(pins: DoorPins, active_low: bool) -> Self {
        let gpio = SimulatedGpio::new(
            &[pins.open_button, pins.close_button, pins.stop_button, pins.obstacle_sensor],
            &[pins.status_indicator, pins.fault_indicator],
            active_low,
        );
        Self { gpio: Arc::new(gpio), pins, active_low }
    }

    /// The backend to hand to an `InputSampler`
    pub fn gpio(&self) -> Arc<SimulatedGpio> {
        Arc::clone(&self.gpio)
    }

    pub fn press_open(&self) -> DoorSupervisorResult<()> {
        self.press(self.pins.open_button)
    }

    pub fn press_close(&self) -> DoorSupervisorResult<()> {
        self.press(self.pins.close_button)
    }

    pub fn press_stop(&self) -> DoorSupervisorResult<()> {
        self.press(self.pins.stop_button)
    }

    /// Blocks or clears the obstacle sensor until called again
    pub fn set_obstacle(&self, present: bool) -> DoorSupervisorResult<()> {
        debug!("Simulated obstacle on pin {}: {}", self.pins.obstacle_sensor, present);
        self.gpio.set_input_level(self.pins.obstacle_sensor, self.active_level(present))
    }

    pub fn status_indicator(&self) -> bool {
        self.gpio.output_level(self.pins.status_indicator).unwrap_or(false)
    }

    pub fn fault_indicator(&self) -> bool {
        self.gpio.output_level(self.pins.fault_indicator).unwrap_or(false)
    }

    fn press(&self, pin: u8) -> DoorSupervisorResult<()> {
        debug!("Simulated press on pin {}", pin);
        self.gpio.pulse_input(pin, self.active_level(true))
    }

    fn active_level(&self, active: bool) -> bool {
        active != self.active_low
    }
}

use std::sync::Arc;
use parking_lot::Mutex;
use tracing::{debug, warn};
use crate::config::{DoorPins, DoorSettings};
use crate::errors::DoorSupervisorResult;
use crate::models::{SupervisorInputs, SupervisorOutputs};
use crate::services::gpio::DigitalIo;

/// # InputSampler
///
/// Binds one door's pin assignment to a `DigitalIo` backend. Every input pin is read exactly once per
/// sample, so the supervisor never sees values that changed in the middle of a decision.
///
/// Buttons and the obstacle sensor of the reference wiring use pull-ups and read low when active;
/// `active_low` selects that polarity. Indicators are driven active-high.
#[derive(Clone)]
pub struct InputSampler {
    pins: DoorPins,
    active_low: bool,
    io: Arc<dyn DigitalIo>,
    /// Open, close and stop presses seen during a sample that failed, handed out with the next good one
    carried_presses: Arc<Mutex<[bool; 3]>>,
}

impl InputSampler {
    pub fn new(pins: DoorPins, active_low: bool, io: Arc<dyn DigitalIo>) -> Self {
        Self {
            pins,
            active_low,
            io,
            carried_presses: Arc::new(Mutex::new([false; 3])),
        }
    }

    pub fn from_settings(door: &DoorSettings, io: Arc<dyn DigitalIo>) -> Self {
        Self::new(door.pins, door.active_low_inputs, io)
    }

    /// Reads the four inputs and converts them to their logical meaning
    ///
    /// Every pin is read even when an earlier read fails. Button presses read during a failed sample
    /// are kept and reported by the next sample that succeeds, so a momentary press is not lost to
    /// an unrelated pin error.
    ///
    /// # Errors
    ///
    /// Returns the first pin read failure; no partial sample is returned.
    pub fn sample(&self) -> DoorSupervisorResult<SupervisorInputs> {
        let buttons = [self.pins.open_button, self.pins.close_button, self.pins.stop_button]
            .map(|pin| self.read_active(pin));
        let obstacle = self.read_active(self.pins.obstacle_sensor);

        let mut carried = self.carried_presses.lock();
        for (held, level) in carried.iter_mut().zip(&buttons) {
            if matches!(level, Ok(true)) {
                *held = true;
            }
        }

        let [open, close, stop] = buttons;
        let (open, close, stop, obstacle) = match (open, close, stop, obstacle) {
            (Ok(_), Ok(_), Ok(_), Ok(obstacle)) => (carried[0], carried[1], carried[2], obstacle),
            (Err(e), ..) | (_, Err(e), ..) | (_, _, Err(e), _) | (.., Err(e)) => {
                if carried.iter().any(|held| *held) {
                    warn!("Sample failed, keeping button presses for the next tick: {:?}", *carried);
                }
                return Err(e);
            }
        };
        *carried = [false; 3];

        let inputs = SupervisorInputs {
            open_pressed: open,
            close_pressed: close,
            stop_pressed: stop,
            obstacle_detected: obstacle,
        };
        debug!("Sampled inputs: {:?}", inputs);
        Ok(inputs)
    }

    /// Writes both indicator levels
    pub fn drive(&self, outputs: SupervisorOutputs) -> DoorSupervisorResult<()> {
        self.io.set_digital_output(self.pins.status_indicator, outputs.status_indicator)?;
        self.io.set_digital_output(self.pins.fault_indicator, outputs.fault_indicator)?;
        Ok(())
    }

    fn read_active(&self, pin: u8) -> DoorSupervisorResult<bool> {
        let level = self.io.read_digital_input(pin)?;
        Ok(level != self.active_low)
    }
}

use crate::errors::DoorSupervisorResult;

/// # DigitalIo
///
/// The pin-level primitives the surrounding firmware provides. Levels are raw electrical levels
/// (`true` = high); polarity is applied by the [`InputSampler`](super::InputSampler).
///
/// Implementations use interior mutability so a backend can be shared between the tick loop and
/// whatever else observes it.
pub trait DigitalIo: Send + Sync {
    /// Reads the current level of an input pin
    fn read_digital_input(&self, pin: u8) -> DoorSupervisorResult<bool>;

    /// Drives an output pin to `level`
    fn set_digital_output(&self, pin: u8, level: bool) -> DoorSupervisorResult<()>;
}

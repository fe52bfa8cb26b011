pub mod clock;
pub mod console;
pub mod gpio;

pub use clock::{ManualClock, MonotonicClock, TokioClock};
pub use gpio::{DigitalIo, InputSampler, SimulatedDoorPanel, SimulatedGpio};

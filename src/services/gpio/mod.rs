pub mod digital_io;
pub mod input_sampler;
pub mod simulated;

pub use digital_io::DigitalIo;
pub use input_sampler::InputSampler;
pub use simulated::{SimulatedDoorPanel, SimulatedGpio};

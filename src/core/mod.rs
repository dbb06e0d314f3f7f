mod channels;
pub mod errors;
mod gates;
mod measurements;
mod state;
pub mod utils;

pub use channels::{InterceptResend, NoiseModel, QuantumChannel, SimulatedChannel};
pub use gates::Gate;
pub use measurements::MeasurementOperators;
pub use state::{Basis, QubitState};

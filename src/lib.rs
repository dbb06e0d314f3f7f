//! BB84 quantum key distribution over a simulated noisy qubit channel.
//!
//! ```
//! use bb84_qkd::{NoiseModel, RandomSource, run_protocol};
//!
//! let mut rng = RandomSource::seeded(7);
//! let result = run_protocol(2000, NoiseModel::DirectFlip(0.01), 0.11, 0.5, &mut rng).unwrap();
//! assert!(result.key_length > 0);
//! ```

mod core;
pub mod protocols;
mod random;
mod sampler;

pub use crate::core::{
    Basis, Gate, InterceptResend, MeasurementOperators, NoiseModel, QuantumChannel, QubitState,
    SimulatedChannel, errors, utils,
};
pub use crate::protocols::qkd::bb84::{Bb84Protocol, run_protocol};
pub use crate::protocols::qkd::config::ProtocolConfig;
pub use crate::protocols::qkd::events::{
    EventSink, MemorySink, ProtocolEvent, ProtocolStage, TracingSink,
};
pub use crate::protocols::qkd::result::QkdResult;
pub use crate::random::RandomSource;
pub use crate::sampler::{ChannelQuality, ChannelStatus, OutcomeCounts, Sampler};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Vector is not normalized. Norm squared: {0}")]
    NotNormalized(f64),

    #[error("Invalid dimensions: a qubit state has exactly 2 amplitudes, got {0}")]
    InvalidDimensions(usize),

    #[error("State collapsed to the zero vector and cannot be renormalized")]
    ZeroVector,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("Measurement operators do not sum to Identity (Completeness relation failed)")]
    NotComplete,

    #[error("Measurement operator {0} is not an idempotent projector")]
    NotProjector(usize),

    #[error("Invalid operator dimensions")]
    InvalidDimensions,

    #[error("Outcome probabilities vanish for this state")]
    ZeroProbability,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    #[error("Invalid probability: {0}. Must be between 0.0 and 1.0")]
    InvalidProbability(f64),

    #[error("State error: {0}")]
    StateError(#[from] StateError),

    #[error("Measurement error: {0}")]
    MeasurementError(#[from] MeasurementError),

    #[error("Channel backend failure: {0}")]
    Backend(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SamplingError {
    #[error("Sample size {sample_size} must be non-zero and smaller than population {population}")]
    InvalidSampleSize { sample_size: usize, population: usize },
}

/// Malformed caller input. These are bugs, not protocol outcomes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid basis value {0}: expected 0 (rectilinear) or 1 (diagonal)")]
    InvalidBasis(u8),

    #[error("Invalid bit value {0}: expected 0 or 1")]
    InvalidBit(u8),

    #[error("Sequence length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EstimateError {
    #[error(transparent)]
    Sampling(#[from] SamplingError),

    #[error(transparent)]
    Input(#[from] InputError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Number of raw qubits must be positive")]
    ZeroQubits,

    #[error("Error threshold {0} must be within [0.0, 1.0]")]
    InvalidThreshold(f64),

    #[error("Check sample ratio {0} must be within (0.0, 1.0)")]
    InvalidSampleRatio(f64),

    #[error("Compression factor {0} must be within (0.0, 1.0]")]
    InvalidCompression(f64),

    #[error("Noise parameter: {0}")]
    Noise(#[from] ChannelError),
}

/// Every way a protocol run can end without a key.
///
/// `EmptySift` and `SecurityAbort` are regular outcomes of a working protocol;
/// every other variant is a fault in the caller's input or configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolAbort {
    #[error("No matching bases among {raw_bits} raw qubits")]
    EmptySift { raw_bits: usize },

    #[error(
        "Error rate {error_rate:.4} exceeds threshold {threshold}: possible eavesdropping, no key produced"
    )]
    SecurityAbort { error_rate: f64, threshold: f64 },

    #[error("Invalid sample size: {0}")]
    InvalidSampleSize(#[from] SamplingError),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

impl From<EstimateError> for ProtocolAbort {
    fn from(err: EstimateError) -> Self {
        match err {
            EstimateError::Sampling(e) => ProtocolAbort::InvalidSampleSize(e),
            EstimateError::Input(e) => ProtocolAbort::InvalidInput(e),
        }
    }
}

impl ProtocolAbort {
    /// Estimated error rate, when the run got far enough to measure one.
    pub fn error_rate(&self) -> Option<f64> {
        match self {
            ProtocolAbort::SecurityAbort { error_rate, .. } => Some(*error_rate),
            _ => None,
        }
    }

    pub fn is_eavesdropping_suspected(&self) -> bool {
        matches!(self, ProtocolAbort::SecurityAbort { .. })
    }

    /// True for caller or implementation bugs, false for protocol outcomes.
    pub fn is_fault(&self) -> bool {
        !matches!(
            self,
            ProtocolAbort::EmptySift { .. } | ProtocolAbort::SecurityAbort { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcomes_are_not_faults() {
        let security = ProtocolAbort::SecurityAbort {
            error_rate: 0.3,
            threshold: 0.11,
        };
        assert!(!security.is_fault());
        assert!(security.is_eavesdropping_suspected());
        assert_eq!(security.error_rate(), Some(0.3));

        let empty = ProtocolAbort::EmptySift { raw_bits: 1 };
        assert!(!empty.is_fault());
        assert!(!empty.is_eavesdropping_suspected());
        assert_eq!(empty.error_rate(), None);
    }

    #[test]
    fn test_malformed_input_is_fault() {
        let abort: ProtocolAbort = InputError::InvalidBasis(7).into();
        assert!(abort.is_fault());

        let abort: ProtocolAbort = SamplingError::InvalidSampleSize {
            sample_size: 4,
            population: 4,
        }
        .into();
        assert!(abort.is_fault());
        assert!(abort.to_string().contains("population 4"));
    }
}

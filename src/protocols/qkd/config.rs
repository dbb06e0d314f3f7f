//! Protocol run configuration and validation.
//!
//! # Example
//!
//! ```
//! use bb84_qkd::{NoiseModel, ProtocolConfig};
//!
//! let config = ProtocolConfig::new(2000)
//!     .with_noise(NoiseModel::DirectFlip(0.01))
//!     .with_error_threshold(0.11);
//! assert!(config.validate().is_ok());
//! assert!(config.required_raw_qubits(256) > 1460);
//! ```

use crate::NoiseModel;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Highest QBER BB84 tolerates under intercept-resend attacks.
pub const DEFAULT_ERROR_THRESHOLD: f64 = 0.11;
pub const DEFAULT_CHECK_SAMPLE_RATIO: f64 = 0.5;
pub const DEFAULT_COMPRESSION_FACTOR: f64 = 0.7;
pub const DEFAULT_RAW_QUBITS: usize = 1000;

/// Probability that two independent random bases agree.
const SIFT_FRACTION: f64 = 0.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Raw qubits Alice sends.
    pub n_bits: usize,
    /// Noise applied by the simulated channel.
    pub noise: NoiseModel,
    /// Maximum accepted error rate (inclusive).
    pub error_threshold: f64,
    /// Fraction of the sifted key disclosed for error estimation.
    pub check_sample_ratio: f64,
    /// Output/input length ratio of privacy amplification.
    pub compression_factor: f64,
    /// Run the measurement phase on the rayon pool.
    pub parallel: bool,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            n_bits: DEFAULT_RAW_QUBITS,
            noise: NoiseModel::None,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            check_sample_ratio: DEFAULT_CHECK_SAMPLE_RATIO,
            compression_factor: DEFAULT_COMPRESSION_FACTOR,
            parallel: false,
        }
    }
}

impl ProtocolConfig {
    pub fn new(n_bits: usize) -> Self {
        Self {
            n_bits,
            ..Self::default()
        }
    }

    pub fn with_noise(mut self, noise: NoiseModel) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_error_threshold(mut self, threshold: f64) -> Self {
        self.error_threshold = threshold;
        self
    }

    pub fn with_check_sample_ratio(mut self, ratio: f64) -> Self {
        self.check_sample_ratio = ratio;
        self
    }

    pub fn with_compression_factor(mut self, factor: f64) -> Self {
        self.compression_factor = factor;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_bits == 0 {
            return Err(ConfigError::ZeroQubits);
        }
        if !(0.0..=1.0).contains(&self.error_threshold) {
            return Err(ConfigError::InvalidThreshold(self.error_threshold));
        }
        if !(self.check_sample_ratio > 0.0 && self.check_sample_ratio < 1.0) {
            return Err(ConfigError::InvalidSampleRatio(self.check_sample_ratio));
        }
        if !(self.compression_factor > 0.0 && self.compression_factor <= 1.0) {
            return Err(ConfigError::InvalidCompression(self.compression_factor));
        }
        self.noise.validate()?;
        Ok(())
    }

    /// Expected final key bits per raw qubit: sift × kept fraction × compression.
    ///
    /// 0.175 with default settings.
    pub fn expected_yield(&self) -> f64 {
        SIFT_FRACTION * (1.0 - self.check_sample_ratio) * self.compression_factor
    }

    /// Raw qubits needed to expect at least `target_bits` of final key.
    pub fn required_raw_qubits(&self, target_bits: usize) -> usize {
        (target_bits as f64 / self.expected_yield()).ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProtocolConfig::default();
        assert_eq!(config.error_threshold, 0.11);
        assert_eq!(config.check_sample_ratio, 0.5);
        assert_eq!(config.compression_factor, 0.7);
        assert!(config.validate().is_ok());
        assert!((config.expected_yield() - 0.175).abs() < 1e-12);
        assert_eq!(config.required_raw_qubits(256), 1463);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert_eq!(
            ProtocolConfig::new(0).validate(),
            Err(ConfigError::ZeroQubits)
        );
        assert_eq!(
            ProtocolConfig::default().with_error_threshold(1.5).validate(),
            Err(ConfigError::InvalidThreshold(1.5))
        );
        for ratio in [0.0, 1.0, f64::NAN] {
            assert!(matches!(
                ProtocolConfig::default().with_check_sample_ratio(ratio).validate(),
                Err(ConfigError::InvalidSampleRatio(_))
            ));
        }
        assert_eq!(
            ProtocolConfig::default().with_compression_factor(0.0).validate(),
            Err(ConfigError::InvalidCompression(0.0))
        );
        assert!(matches!(
            ProtocolConfig::default()
                .with_noise(NoiseModel::Depolarizing(-0.2))
                .validate(),
            Err(ConfigError::Noise(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ProtocolConfig = serde_json::from_str(
            r#"{"n_bits": 2000, "noise": {"kind": "direct_flip", "p": 0.01}}"#,
        )
        .unwrap();
        assert_eq!(config.n_bits, 2000);
        assert_eq!(config.noise, NoiseModel::DirectFlip(0.01));
        assert_eq!(config.error_threshold, DEFAULT_ERROR_THRESHOLD);
        assert!(!config.parallel);
    }
}

use crate::protocols::qkd::config::DEFAULT_ERROR_THRESHOLD;
use crate::random::RandomSource;
use crate::{Basis, QuantumChannel, SimulatedChannel, errors::ChannelError};
use serde::Serialize;

/// Outcome tallies from repeated measurements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub zeros: usize,
    pub ones: usize,
}

impl OutcomeCounts {
    pub fn total(&self) -> usize {
        self.zeros + self.ones
    }

    /// Observed frequency of outcome 1.
    pub fn frequency_of_one(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        self.ones as f64 / self.total() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    Good,
    Degraded,
}

/// Error statistics of a channel probed with matching bases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelQuality {
    pub error_rate: f64,
    pub fidelity: f64,
    pub test_qubits: usize,
    pub status: ChannelStatus,
}

/// A simulator for sampling a quantum channel.
///
/// The `Sampler` sends prepared qubits through a channel many times and
/// aggregates the outcomes.
#[derive(Debug, Clone, Default)]
pub struct Sampler<C = SimulatedChannel> {
    /// Channel every shot passes through.
    pub channel: C,
}

impl<C: QuantumChannel> Sampler<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Measures one prepared bit `num_shots` times.
    ///
    /// # Arguments
    ///
    /// * `bit` - The bit Alice encodes.
    /// * `encoding_basis` - Basis the bit is prepared in.
    /// * `measurement_basis` - Basis Bob measures in.
    /// * `num_shots` - The number of times to repeat the measurement.
    /// * `rng` - Randomness for the measurements.
    pub fn run(
        &self,
        bit: bool,
        encoding_basis: Basis,
        measurement_basis: Basis,
        num_shots: usize,
        rng: &mut RandomSource,
    ) -> Result<OutcomeCounts, ChannelError> {
        let mut counts = OutcomeCounts::default();

        for _ in 0..num_shots {
            if self
                .channel
                .measure(bit, encoding_basis, measurement_basis, rng)?
            {
                counts.ones += 1;
            } else {
                counts.zeros += 1;
            }
        }

        Ok(counts)
    }

    /// Estimates the channel error rate from `n_test_qubits` random qubits
    /// measured in the basis they were prepared in.
    pub fn channel_quality(
        &self,
        n_test_qubits: usize,
        rng: &mut RandomSource,
    ) -> Result<ChannelQuality, ChannelError> {
        let bits = rng.bits(n_test_qubits);
        let bases = rng.bases(n_test_qubits);

        let mut errors = 0usize;
        for (&bit, &basis) in bits.iter().zip(bases.iter()) {
            if self.channel.measure(bit, basis, basis, rng)? != bit {
                errors += 1;
            }
        }

        let error_rate = if n_test_qubits > 0 {
            errors as f64 / n_test_qubits as f64
        } else {
            0.0
        };

        let status = if error_rate < DEFAULT_ERROR_THRESHOLD {
            ChannelStatus::Good
        } else {
            ChannelStatus::Degraded
        };

        Ok(ChannelQuality {
            error_rate,
            fidelity: 1.0 - error_rate,
            test_qubits: n_test_qubits,
            status,
        })
    }
}

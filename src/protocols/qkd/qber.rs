//! Error-rate estimation and the security decision.
//!
//! A random subset of the sifted key is disclosed and compared; the disclosed
//! positions are dropped from the key because they are no longer secret.

use crate::errors::{EstimateError, InputError, SamplingError};
use crate::random::RandomSource;
use serde::Serialize;

/// Outcome of comparing a disclosed sample of the sifted key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QberEstimate {
    /// Fraction of sampled positions where the parties disagree.
    pub error_rate: f64,
    pub errors: usize,
    /// Disclosed positions, ascending.
    pub sampled_indices: Vec<usize>,
    /// Positions still secret, ascending.
    pub kept_indices: Vec<usize>,
    pub alice_remaining: Vec<bool>,
    pub bob_remaining: Vec<bool>,
}

impl QberEstimate {
    pub fn sample_size(&self) -> usize {
        self.sampled_indices.len()
    }
}

/// Discloses `sample_size` random positions and measures their disagreement.
///
/// Requires `0 < sample_size < alice_key.len()`.
pub fn estimate(
    alice_key: &[bool],
    bob_key: &[bool],
    sample_size: usize,
    rng: &mut RandomSource,
) -> Result<QberEstimate, EstimateError> {
    if alice_key.len() != bob_key.len() {
        return Err(InputError::LengthMismatch {
            expected: alice_key.len(),
            got: bob_key.len(),
        }
        .into());
    }

    let key_length = alice_key.len();
    if sample_size == 0 {
        return Err(SamplingError::InvalidSampleSize {
            sample_size,
            population: key_length,
        }
        .into());
    }

    let mut sampled_indices = rng.sample_without_replacement(key_length, sample_size)?;
    sampled_indices.sort_unstable();

    let mut disclosed = vec![false; key_length];
    for &i in &sampled_indices {
        disclosed[i] = true;
    }

    let errors = sampled_indices
        .iter()
        .filter(|&&i| alice_key[i] != bob_key[i])
        .count();
    let error_rate = errors as f64 / sample_size as f64;

    let kept_indices: Vec<usize> = (0..key_length).filter(|&i| !disclosed[i]).collect();
    let alice_remaining = kept_indices.iter().map(|&i| alice_key[i]).collect();
    let bob_remaining = kept_indices.iter().map(|&i| bob_key[i]).collect();

    Ok(QberEstimate {
        error_rate,
        errors,
        sampled_indices,
        kept_indices,
        alice_remaining,
        bob_remaining,
    })
}

/// Security gate: accept the channel only if `error_rate <= threshold`.
pub fn accept(error_rate: f64, threshold: f64) -> bool {
    error_rate <= threshold
}

use crate::utils::bits_to_bytes;
use serde::Serialize;

/// Key material and statistics of a successful BB84 run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QkdResult {
    /// The privacy-amplified key.
    pub final_key: Vec<bool>,
    /// `final_key.len()`.
    pub key_length: usize,
    /// Error rate measured on the disclosed sample.
    pub error_rate: f64,
    /// `raw_bits - key_length`, every raw qubit that did not end up as key.
    pub discarded_bits: usize,
    /// Alice's sifted key, before error estimation.
    pub sifted_key: Vec<bool>,
    /// Alice's raw bits.
    pub raw_key: Vec<bool>,
}

impl QkdResult {
    /// Final key bits per raw qubit.
    pub fn efficiency(&self) -> f64 {
        let total = self.key_length + self.discarded_bits;
        if total == 0 {
            return 0.0;
        }
        self.key_length as f64 / total as f64
    }

    /// Final key packed LSB-first, for key derivation.
    pub fn key_bytes(&self) -> Vec<u8> {
        bits_to_bytes(&self.final_key)
    }

    pub fn is_sufficient_for(&self, bits: usize) -> bool {
        self.key_length >= bits
    }
}

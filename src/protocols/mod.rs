//! Quantum Cryptography Protocols.
//!
//! Currently the BB84 quantum key distribution protocol and its
//! post-processing stages.

pub mod qkd;
pub use qkd::bb84;

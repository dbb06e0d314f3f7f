//! Quantum Key Distribution (QKD) Protocols.
//!
//! This module contains the BB84 engine and its classical post-processing:
//! - **sifting**: basis reconciliation.
//! - **qber**: error-rate estimation and the security gate.
//! - **privacy_amplification**: XOR-folding key compression.
//! - **bb84**: the orchestrator tying the stages into one run.

pub mod bb84;
pub mod config;
pub mod events;
pub mod privacy_amplification;
pub mod qber;
pub mod result;
pub mod sifting;

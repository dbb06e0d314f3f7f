//! Structured protocol events.
//!
//! The orchestrator never logs on its own; it reports to an optional
//! [`EventSink`]. [`TracingSink`] forwards to `tracing`, [`MemorySink`] keeps
//! events for inspection.

use serde::Serialize;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// States of one protocol run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolStage {
    Init,
    Prepared,
    Measured,
    Sifted,
    ErrorChecked,
    Aborted,
    Amplified,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProtocolEvent {
    Transition {
        from: ProtocolStage,
        to: ProtocolStage,
    },
    Sifted {
        raw_bits: usize,
        sifted_bits: usize,
    },
    ErrorEstimated {
        sample_size: usize,
        errors: usize,
        error_rate: f64,
    },
    Amplified {
        input_bits: usize,
        output_bits: usize,
    },
    Aborted {
        reason: String,
        error_rate: Option<f64>,
    },
    Completed {
        key_length: usize,
        error_rate: f64,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ProtocolEvent);
}

/// Forwards events to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &ProtocolEvent) {
        match event {
            ProtocolEvent::Transition { from, to } => {
                debug!(from = ?from, to = ?to, "BB84 stage transition");
            }
            ProtocolEvent::Sifted {
                raw_bits,
                sifted_bits,
            } => {
                info!(raw_bits, sifted_bits, "Sifted key");
            }
            ProtocolEvent::ErrorEstimated {
                sample_size,
                errors,
                error_rate,
            } => {
                info!(sample_size, errors, error_rate, "QBER estimated");
            }
            ProtocolEvent::Amplified {
                input_bits,
                output_bits,
            } => {
                info!(input_bits, output_bits, "Privacy amplification");
            }
            ProtocolEvent::Aborted { reason, error_rate } => {
                warn!(reason = %reason, error_rate = ?error_rate, "BB84 run aborted");
            }
            ProtocolEvent::Completed {
                key_length,
                error_rate,
            } => {
                info!(key_length, error_rate, "BB84 run completed");
            }
        }
    }
}

/// Collects every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ProtocolEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProtocolEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Stages entered, in order, starting from `Init`.
    pub fn stages(&self) -> Vec<ProtocolStage> {
        let mut stages = vec![ProtocolStage::Init];
        stages.extend(self.events().into_iter().filter_map(|e| match e {
            ProtocolEvent::Transition { to, .. } => Some(to),
            _ => None,
        }));
        stages
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &ProtocolEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

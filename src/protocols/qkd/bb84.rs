//! BB84 protocol orchestration.
//!
//! One run walks `Init → Prepared → Measured → Sifted → ErrorChecked` and then
//! either `Aborted` or `Amplified → Done`. There are no retries inside a run;
//! a caller that wants another attempt starts a new run with fresh randomness.

use super::config::ProtocolConfig;
use super::events::{EventSink, ProtocolEvent, ProtocolStage};
use super::privacy_amplification::amplify;
use super::qber::{accept, estimate};
use super::result::QkdResult;
use super::sifting::{PartyRecord, sift_records};
use crate::errors::{ChannelError, ProtocolAbort};
use crate::random::RandomSource;
use crate::{Basis, NoiseModel, QuantumChannel, SimulatedChannel};
use rayon::prelude::*;
use std::sync::Arc;

/// Runs BB84 over a simulated channel with the given noise.
///
/// # Arguments
///
/// * `n_bits` - Number of raw qubits Alice sends.
/// * `noise` - The channel noise model.
/// * `error_threshold` - Highest accepted QBER.
/// * `check_sample_ratio` - Fraction of the sifted key disclosed for the QBER check.
/// * `rng` - Source of every random choice in the run.
pub fn run_protocol(
    n_bits: usize,
    noise: NoiseModel,
    error_threshold: f64,
    check_sample_ratio: f64,
    rng: &mut RandomSource,
) -> Result<QkdResult, ProtocolAbort> {
    let config = ProtocolConfig::new(n_bits)
        .with_noise(noise)
        .with_error_threshold(error_threshold)
        .with_check_sample_ratio(check_sample_ratio);
    Bb84Protocol::new(config)?.run(rng)
}

/// A configured BB84 session: channel, parameters and an optional event sink.
pub struct Bb84Protocol {
    config: ProtocolConfig,
    channel: Box<dyn QuantumChannel>,
    sink: Option<Arc<dyn EventSink>>,
}

impl Bb84Protocol {
    /// Validates `config` and builds a simulated channel from its noise model.
    pub fn new(config: ProtocolConfig) -> Result<Self, ProtocolAbort> {
        config.validate()?;
        let channel = SimulatedChannel::new(config.noise)?;
        Ok(Self {
            config,
            channel: Box::new(channel),
            sink: None,
        })
    }

    /// Replaces the simulated channel, e.g. with an eavesdropper or a device backend.
    pub fn with_channel<C: QuantumChannel + 'static>(mut self, channel: C) -> Self {
        self.channel = Box::new(channel);
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Executes one complete run.
    ///
    /// Returns the key on success. `EmptySift` and `SecurityAbort` are normal
    /// outcomes; on a security abort no key material of any length is returned.
    pub fn run(&self, rng: &mut RandomSource) -> Result<QkdResult, ProtocolAbort> {
        let mut run = RunTracker::new(self.sink.as_deref());
        let outcome = self.execute(&mut run, rng);
        if let Err(abort) = &outcome {
            run.abort(abort);
        }
        outcome
    }

    fn execute(
        &self,
        run: &mut RunTracker<'_>,
        rng: &mut RandomSource,
    ) -> Result<QkdResult, ProtocolAbort> {
        let n_bits = self.config.n_bits;

        // Alice chooses bits and bases
        let alice = PartyRecord::generate(n_bits, rng);
        run.advance(ProtocolStage::Prepared);

        // Bob chooses bases and measures every qubit
        let bob_bases = rng.bases(n_bits);
        let bob_bits = self.measure_all(&alice, &bob_bases, rng)?;
        let bob = PartyRecord::new(bob_bits, bob_bases)?;
        run.advance(ProtocolStage::Measured);

        // Public basis comparison
        let (alice_sifted, bob_sifted) = sift_records(&alice, &bob)?;
        run.emit(ProtocolEvent::Sifted {
            raw_bits: n_bits,
            sifted_bits: alice_sifted.len(),
        });
        if alice_sifted.is_empty() {
            return Err(ProtocolAbort::EmptySift { raw_bits: n_bits });
        }
        run.advance(ProtocolStage::Sifted);

        // Disclose a sample and estimate the QBER
        let sample_size = (alice_sifted.len() as f64 * self.config.check_sample_ratio) as usize;
        let qber = estimate(&alice_sifted, &bob_sifted, sample_size, rng)?;
        run.emit(ProtocolEvent::ErrorEstimated {
            sample_size,
            errors: qber.errors,
            error_rate: qber.error_rate,
        });
        run.advance(ProtocolStage::ErrorChecked);

        if !accept(qber.error_rate, self.config.error_threshold) {
            return Err(ProtocolAbort::SecurityAbort {
                error_rate: qber.error_rate,
                threshold: self.config.error_threshold,
            });
        }

        let final_key = amplify(&qber.alice_remaining, self.config.compression_factor);
        run.emit(ProtocolEvent::Amplified {
            input_bits: qber.alice_remaining.len(),
            output_bits: final_key.len(),
        });
        run.advance(ProtocolStage::Amplified);

        let key_length = final_key.len();
        let result = QkdResult {
            final_key,
            key_length,
            error_rate: qber.error_rate,
            discarded_bits: n_bits - key_length,
            sifted_key: alice_sifted,
            raw_key: alice.bits().to_vec(),
        };
        run.advance(ProtocolStage::Done);
        run.emit(ProtocolEvent::Completed {
            key_length,
            error_rate: result.error_rate,
        });

        Ok(result)
    }

    /// Sends every qubit through the channel.
    ///
    /// Each qubit gets its own forked source before the phase starts, so the
    /// outcome does not depend on whether the phase runs in parallel.
    fn measure_all(
        &self,
        alice: &PartyRecord,
        bob_bases: &[Basis],
        rng: &mut RandomSource,
    ) -> Result<Vec<bool>, ChannelError> {
        let jobs: Vec<(bool, Basis, Basis, RandomSource)> = alice
            .iter()
            .zip(bob_bases.iter().copied())
            .map(|((bit, encoding), measurement)| (bit, encoding, measurement, rng.fork()))
            .collect();

        let channel = &self.channel;
        let measure = |(bit, encoding, measurement, mut qubit_rng): (
            bool,
            Basis,
            Basis,
            RandomSource,
        )| channel.measure(bit, encoding, measurement, &mut qubit_rng);

        if self.config.parallel {
            jobs.into_par_iter().map(measure).collect()
        } else {
            jobs.into_iter().map(measure).collect()
        }
    }
}

/// Tracks the current stage and reports transitions to the sink.
struct RunTracker<'a> {
    stage: ProtocolStage,
    sink: Option<&'a dyn EventSink>,
}

impl<'a> RunTracker<'a> {
    fn new(sink: Option<&'a dyn EventSink>) -> Self {
        Self {
            stage: ProtocolStage::Init,
            sink,
        }
    }

    fn emit(&self, event: ProtocolEvent) {
        if let Some(sink) = self.sink {
            sink.emit(&event);
        }
    }

    fn advance(&mut self, to: ProtocolStage) {
        self.emit(ProtocolEvent::Transition {
            from: self.stage,
            to,
        });
        self.stage = to;
    }

    fn abort(&mut self, abort: &ProtocolAbort) {
        self.advance(ProtocolStage::Aborted);
        self.emit(ProtocolEvent::Aborted {
            reason: abort.to_string(),
            error_rate: abort.error_rate(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InterceptResend;
    use crate::protocols::qkd::events::{MemorySink, TracingSink};

    #[test]
    fn test_noiseless_run_has_zero_error() {
        let mut rng = RandomSource::seeded(2024);
        let result = run_protocol(1000, NoiseModel::None, 0.11, 0.5, &mut rng).unwrap();
        assert_eq!(result.error_rate, 0.0);
        assert!(result.key_length > 0);
        assert_eq!(result.final_key.len(), result.key_length);
        assert_eq!(result.discarded_bits, 1000 - result.key_length);
        assert_eq!(result.raw_key.len(), 1000);
    }

    #[test]
    fn test_key_length_follows_bookkeeping() {
        let mut rng = RandomSource::seeded(77);
        let result = run_protocol(2000, NoiseModel::DirectFlip(0.01), 0.11, 0.5, &mut rng).unwrap();
        let sifted = result.sifted_key.len();
        let remaining = sifted - sifted / 2;
        assert_eq!(result.key_length, (remaining as f64 * 0.7) as usize);
    }

    #[test]
    fn test_success_walks_every_stage() {
        let sink = Arc::new(MemorySink::new());
        let protocol = Bb84Protocol::new(ProtocolConfig::new(500))
            .unwrap()
            .with_event_sink(sink.clone());
        protocol.run(&mut RandomSource::seeded(8)).unwrap();

        assert_eq!(
            sink.stages(),
            vec![
                ProtocolStage::Init,
                ProtocolStage::Prepared,
                ProtocolStage::Measured,
                ProtocolStage::Sifted,
                ProtocolStage::ErrorChecked,
                ProtocolStage::Amplified,
                ProtocolStage::Done,
            ]
        );
        assert!(matches!(
            sink.events().last(),
            Some(ProtocolEvent::Completed { .. })
        ));
    }

    #[test]
    fn test_security_abort_reports_error_rate() {
        let sink = Arc::new(MemorySink::new());
        let config = ProtocolConfig::new(1000).with_noise(NoiseModel::DirectFlip(0.3));
        let protocol = Bb84Protocol::new(config)
            .unwrap()
            .with_event_sink(sink.clone());
        let abort = protocol.run(&mut RandomSource::seeded(9)).unwrap_err();

        assert!(abort.is_eavesdropping_suspected());
        assert!(abort.error_rate().unwrap() > 0.11);
        assert_eq!(sink.stages().last(), Some(&ProtocolStage::Aborted));
        assert!(!sink.stages().contains(&ProtocolStage::Amplified));
        assert!(matches!(
            sink.events().last(),
            Some(ProtocolEvent::Aborted {
                error_rate: Some(_),
                ..
            })
        ));
    }

    #[test]
    fn test_tracing_sink_reports_success_and_abort() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let sink: Arc<dyn EventSink> = Arc::new(TracingSink);

            let clean = Bb84Protocol::new(ProtocolConfig::new(500))
                .unwrap()
                .with_event_sink(sink.clone());
            assert!(clean.run(&mut RandomSource::seeded(8)).is_ok());

            let noisy = Bb84Protocol::new(
                ProtocolConfig::new(1000).with_noise(NoiseModel::DirectFlip(0.3)),
            )
            .unwrap()
            .with_event_sink(sink);
            let abort = noisy.run(&mut RandomSource::seeded(9)).unwrap_err();
            assert!(abort.is_eavesdropping_suspected());
        });
    }

    #[test]
    fn test_full_amplitude_damping_run_completes() {
        let mut rng = RandomSource::seeded(1);
        let config = ProtocolConfig::new(1000).with_noise(NoiseModel::AmplitudeDamping(1.0));
        assert!(config.validate().is_ok());
        let result = run_protocol(1000, NoiseModel::AmplitudeDamping(1.0), 1.0, 0.5, &mut rng)
            .unwrap();
        assert!(result.key_length > 0);
    }

    #[test]
    fn test_single_qubit_run_never_yields_key() {
        // One qubit sifts to 0 or 1 bits; neither leaves a positive sample.
        for seed in 0..20 {
            let mut rng = RandomSource::seeded(seed);
            let abort = run_protocol(1, NoiseModel::None, 0.11, 0.5, &mut rng).unwrap_err();
            assert!(matches!(
                abort,
                ProtocolAbort::EmptySift { raw_bits: 1 } | ProtocolAbort::InvalidSampleSize(_)
            ));
        }
    }

    #[test]
    fn test_eavesdropper_is_detected() {
        let protocol = Bb84Protocol::new(ProtocolConfig::new(2000))
            .unwrap()
            .with_channel(InterceptResend::new(SimulatedChannel::noiseless(), 1.0).unwrap());
        let abort = protocol.run(&mut RandomSource::seeded(10)).unwrap_err();
        let rate = abort.error_rate().unwrap();
        assert!((rate - 0.25).abs() < 0.07, "error rate {rate}");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let config = ProtocolConfig::new(800).with_noise(NoiseModel::Depolarizing(0.05));
        let sequential = Bb84Protocol::new(config.clone())
            .unwrap()
            .run(&mut RandomSource::seeded(12));
        let parallel = Bb84Protocol::new(config.with_parallel(true))
            .unwrap()
            .run(&mut RandomSource::seeded(12));
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_invalid_config_is_fault() {
        let mut rng = RandomSource::seeded(1);
        let abort = run_protocol(100, NoiseModel::None, 0.11, 1.0, &mut rng).unwrap_err();
        assert!(abort.is_fault());
        assert!(matches!(abort, ProtocolAbort::InvalidConfig(_)));
    }
}

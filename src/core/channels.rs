use crate::core::errors::ChannelError;
use crate::core::measurements::MeasurementOperators;
use crate::core::state::{Basis, QubitState};
use crate::random::RandomSource;
use ndarray::array;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// How the channel perturbs a qubit in flight.
///
/// Every variant is exactly noiseless at `p = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "p", rename_all = "snake_case")]
pub enum NoiseModel {
    #[default]
    None,
    /// Flips the classical outcome with probability p after measurement.
    ///
    /// A fast-path approximation: the state itself is never touched.
    DirectFlip(f64),
    /// Mixes the amplitudes toward the uniform vector at weight p.
    Depolarizing(f64),
    /// Moves |1> amplitude into |0> at rate p.
    AmplitudeDamping(f64),
}

impl NoiseModel {
    pub fn probability(&self) -> f64 {
        match *self {
            NoiseModel::None => 0.0,
            NoiseModel::DirectFlip(p)
            | NoiseModel::Depolarizing(p)
            | NoiseModel::AmplitudeDamping(p) => p,
        }
    }

    pub fn validate(&self) -> Result<(), ChannelError> {
        validate_prob(self.probability())
    }

    /// Perturbs the state vector. `None` and `DirectFlip` leave it untouched.
    pub fn apply_noise(&self, state: &QubitState) -> Result<QubitState, ChannelError> {
        let p = self.probability();
        validate_prob(p)?;
        if p == 0.0 {
            return Ok(state.clone());
        }

        let psi = state.amplitudes();
        let noisy = match *self {
            NoiseModel::None | NoiseModel::DirectFlip(_) => return Ok(state.clone()),
            NoiseModel::Depolarizing(p) => {
                let mixed = array![Complex64::new(0.5, 0.0), Complex64::new(0.5, 0.0)];
                psi.mapv(|c| c * (1.0 - p)) + mixed.mapv(|c| c * p)
            }
            // Full damping leaves nothing of |1>, whatever the phase.
            NoiseModel::AmplitudeDamping(p) if p >= 1.0 => return Ok(QubitState::zero()),
            NoiseModel::AmplitudeDamping(p) => {
                array![psi[0] + psi[1] * p.sqrt(), psi[1] * (1.0 - p).sqrt()]
            }
        };

        Ok(QubitState::normalized(noisy)?)
    }

    /// Post-measurement classical flip probability.
    pub fn flip_probability(&self) -> f64 {
        match *self {
            NoiseModel::DirectFlip(p) => p,
            _ => 0.0,
        }
    }
}

/// The measurement contract every channel provider fulfils.
///
/// A simulated channel, a wrapped eavesdropper, or a hardware backend all take
/// the sender's bit and basis and return the receiver's outcome in its basis.
pub trait QuantumChannel: Send + Sync {
    fn measure(
        &self,
        prepared_bit: bool,
        encoding_basis: Basis,
        measurement_basis: Basis,
        rng: &mut RandomSource,
    ) -> Result<bool, ChannelError>;
}

impl<C: QuantumChannel + ?Sized> QuantumChannel for Box<C> {
    fn measure(
        &self,
        prepared_bit: bool,
        encoding_basis: Basis,
        measurement_basis: Basis,
        rng: &mut RandomSource,
    ) -> Result<bool, ChannelError> {
        (**self).measure(prepared_bit, encoding_basis, measurement_basis, rng)
    }
}

/// State-vector simulation: prepare, perturb, measure by the Born rule.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulatedChannel {
    noise: NoiseModel,
}

impl SimulatedChannel {
    pub fn new(noise: NoiseModel) -> Result<Self, ChannelError> {
        noise.validate()?;
        Ok(Self { noise })
    }

    pub fn noiseless() -> Self {
        Self::default()
    }

    pub fn noise(&self) -> NoiseModel {
        self.noise
    }
}

impl QuantumChannel for SimulatedChannel {
    fn measure(
        &self,
        prepared_bit: bool,
        encoding_basis: Basis,
        measurement_basis: Basis,
        rng: &mut RandomSource,
    ) -> Result<bool, ChannelError> {
        let state = QubitState::prepare(prepared_bit, encoding_basis);
        let noisy = self.noise.apply_noise(&state)?;
        let outcome =
            MeasurementOperators::for_basis(measurement_basis).measure(&noisy, rng)?;

        let flip = self.noise.flip_probability();
        if flip > 0.0 && rng.bernoulli(flip) {
            return Ok(!outcome);
        }
        Ok(outcome)
    }
}

/// Intercept-resend eavesdropper in front of another channel.
///
/// With probability `ratio` the qubit is measured in a random basis and the
/// outcome re-sent in that basis. Full interception yields about 25% QBER.
#[derive(Debug, Clone)]
pub struct InterceptResend<C> {
    inner: C,
    ratio: f64,
}

impl<C: QuantumChannel> InterceptResend<C> {
    pub fn new(inner: C, ratio: f64) -> Result<Self, ChannelError> {
        validate_prob(ratio)?;
        Ok(Self { inner, ratio })
    }
}

impl<C: QuantumChannel> QuantumChannel for InterceptResend<C> {
    fn measure(
        &self,
        prepared_bit: bool,
        encoding_basis: Basis,
        measurement_basis: Basis,
        rng: &mut RandomSource,
    ) -> Result<bool, ChannelError> {
        if self.ratio > 1e-12 && rng.bernoulli(self.ratio) {
            let eve_basis = rng.basis();
            let intercepted = QubitState::prepare(prepared_bit, encoding_basis);
            let eve_bit = intercepted.measure(eve_basis, rng)?;
            return self
                .inner
                .measure(eve_bit, eve_basis, measurement_basis, rng);
        }
        self.inner
            .measure(prepared_bit, encoding_basis, measurement_basis, rng)
    }
}

/// Validate probability parameter
pub(crate) fn validate_prob(p: f64) -> Result<(), ChannelError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ChannelError::InvalidProbability(p));
    }
    Ok(())
}

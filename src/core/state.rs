use crate::core::errors::{InputError, MeasurementError, StateError};
use crate::core::{Gate, MeasurementOperators};
use crate::random::RandomSource;
use ndarray::{Array1, array};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// The two conjugate BB84 encoding bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// Computational basis {|0>, |1>}.
    Rectilinear,
    /// Hadamard basis {|+>, |->}.
    Diagonal,
}

impl Basis {
    pub fn as_u8(self) -> u8 {
        match self {
            Basis::Rectilinear => 0,
            Basis::Diagonal => 1,
        }
    }
}

impl From<bool> for Basis {
    fn from(diagonal: bool) -> Self {
        if diagonal {
            Basis::Diagonal
        } else {
            Basis::Rectilinear
        }
    }
}

impl TryFrom<u8> for Basis {
    type Error = InputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Basis::Rectilinear),
            1 => Ok(Basis::Diagonal),
            other => Err(InputError::InvalidBasis(other)),
        }
    }
}

/// Pure state of a single qubit, $\alpha|0\rangle + \beta|1\rangle$ with unit norm.
#[derive(Clone, Debug, PartialEq)]
pub struct QubitState {
    amplitudes: Array1<Complex64>,
}

impl QubitState {
    /// Creates the state |0>.
    pub fn zero() -> Self {
        Self {
            amplitudes: array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
        }
    }

    /// Prepares the BB84 state encoding `bit` in `basis`.
    ///
    /// Rectilinear: 0 -> |0>, 1 -> |1>. Diagonal: 0 -> |+>, 1 -> |->.
    pub fn prepare(bit: bool, basis: Basis) -> Self {
        let mut amplitudes = Self::zero().amplitudes;
        if bit {
            amplitudes = Gate::x().apply(&amplitudes);
        }
        if basis == Basis::Diagonal {
            amplitudes = Gate::h().apply(&amplitudes);
        }
        Self { amplitudes }
    }

    /// Validates that the input vector is a valid qubit state.
    fn check_vector_state(vector: &Array1<Complex64>) -> Result<(), StateError> {
        if vector.len() != 2 {
            return Err(StateError::InvalidDimensions(vector.len()));
        }

        // Sum of squared amplitudes must be 1.
        let norm_sqr: f64 = vector.iter().map(|c| c.norm_sqr()).sum();

        if (norm_sqr - 1.0).abs() > 1e-12 {
            return Err(StateError::NotNormalized(norm_sqr));
        }

        Ok(())
    }

    /// Creates a QubitState from a normalized 2-component vector.
    pub fn from_state_vector(vector: Array1<Complex64>) -> Result<Self, StateError> {
        Self::check_vector_state(&vector)?;
        Ok(Self { amplitudes: vector })
    }

    /// Scales an arbitrary non-zero 2-component vector to unit norm.
    pub fn normalized(vector: Array1<Complex64>) -> Result<Self, StateError> {
        if vector.len() != 2 {
            return Err(StateError::InvalidDimensions(vector.len()));
        }
        let norm = vector.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
        if norm < 1e-12 {
            return Err(StateError::ZeroVector);
        }
        Ok(Self {
            amplitudes: vector.mapv(|c| c / norm),
        })
    }

    /// Measures in `basis`, sampling the outcome from the Born-rule probabilities.
    pub fn measure(&self, basis: Basis, rng: &mut RandomSource) -> Result<bool, MeasurementError> {
        MeasurementOperators::for_basis(basis).measure(self, rng)
    }

    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    pub fn into_amplitudes(self) -> Array1<Complex64> {
        self.amplitudes
    }
}

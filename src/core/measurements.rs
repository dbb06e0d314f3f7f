use crate::core::errors::MeasurementError;
use crate::core::state::{Basis, QubitState};
use crate::core::utils;
use crate::random::RandomSource;
use ndarray::{Array1, Array2, array};
use num_complex::Complex64;

/// Projective measurement (M0, M1) for one basis.
#[derive(Clone, Debug)]
pub struct MeasurementOperators {
    /// Projector selecting outcome 0
    pub m0: Array2<Complex64>,
    /// Projector selecting outcome 1
    pub m1: Array2<Complex64>,
}

impl MeasurementOperators {
    /// Builds a measurement from two projectors.
    ///
    /// Both must be 2x2 idempotent matrices summing to the identity.
    pub fn new(m0: Array2<Complex64>, m1: Array2<Complex64>) -> Result<Self, MeasurementError> {
        if m0.dim() != (2, 2) || m1.dim() != (2, 2) {
            return Err(MeasurementError::InvalidDimensions);
        }

        for (idx, op) in [&m0, &m1].into_iter().enumerate() {
            if !utils::is_idempotent(op, 1e-9) || !utils::is_hermitian(op, 1e-9) {
                return Err(MeasurementError::NotProjector(idx));
            }
        }

        if !utils::check_povm_completeness(&[m0.clone(), m1.clone()], 2) {
            return Err(MeasurementError::NotComplete);
        }

        Ok(Self { m0, m1 })
    }

    /// Projectors onto the two basis states of `basis`.
    pub fn for_basis(basis: Basis) -> Self {
        match basis {
            Basis::Rectilinear => Self::z_basis(),
            Basis::Diagonal => Self::x_basis(),
        }
    }

    /// Z basis (Computational) -> {|0>, |1>}.
    fn z_basis() -> Self {
        let v0: Array1<Complex64> = array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
        let v1: Array1<Complex64> = array![Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)];

        Self {
            m0: utils::outer_product(&v0, &v0),
            m1: utils::outer_product(&v1, &v1),
        }
    }

    /// X basis (Hadamard) -> {|+>, |->}.
    fn x_basis() -> Self {
        // Exact halves keep M|psi> exactly zero for the orthogonal prepared state.
        let half = Complex64::new(0.5, 0.0);

        Self {
            m0: array![[half, half], [half, half]],
            m1: array![[half, -half], [-half, half]],
        }
    }

    /// Born-rule outcome probabilities `(p0, p1)`, renormalized to sum to one.
    pub fn probabilities(&self, state: &QubitState) -> Result<(f64, f64), MeasurementError> {
        let psi = state.amplitudes();
        let p0 = utils::expectation(&self.m0, psi).norm();
        let p1 = utils::expectation(&self.m1, psi).norm();

        // Due to float, renormalization of probabilities to ensure completeness
        let total = p0 + p1;
        if total < 1e-12 {
            return Err(MeasurementError::ZeroProbability);
        }
        Ok((p0 / total, p1 / total))
    }

    /// Samples an outcome bit from the Born-rule distribution.
    pub fn measure(
        &self,
        state: &QubitState,
        rng: &mut RandomSource,
    ) -> Result<bool, MeasurementError> {
        let (p0, _) = self.probabilities(state)?;
        Ok(pick_outcome(p0, rng))
    }
}

/// Outcome 1 unless the roll lands inside the outcome-0 mass.
///
/// With `p0 == 0.0` or `p0 == 1.0` the result is deterministic.
fn pick_outcome(p0: f64, rng: &mut RandomSource) -> bool {
    let roll = rng.uniform();
    roll >= p0
}

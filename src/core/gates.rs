use ndarray::{Array1, Array2, arr2};
use num_complex::Complex64;

/// Represents a single-qubit quantum gate.
///
/// State preparation only needs X and H: bit 1 flips $|0\rangle$ to $|1\rangle$ and the
/// diagonal basis is reached by a Hadamard.
#[derive(Clone, Debug)]
pub struct Gate {
    /// The 2x2 unitary matrix of the gate.
    pub matrix: Array2<Complex64>,
}

impl Gate {
    /// Applies the gate to a state vector: $|\psi'\rangle = U|\psi\rangle$.
    pub fn apply(&self, amplitudes: &Array1<Complex64>) -> Array1<Complex64> {
        self.matrix.dot(amplitudes)
    }

    // --- Standard Gates ---

    /// Creates a Pauli-X gate (NOT gate).
    pub fn x() -> Gate {
        Gate {
            matrix: arr2(&[
                [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
                [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            ]),
        }
    }

    /// Creates a Hadamard gate.
    pub fn h() -> Gate {
        let factor = 1.0 / 2.0_f64.sqrt();
        Gate {
            matrix: arr2(&[
                [Complex64::new(factor, 0.0), Complex64::new(factor, 0.0)],
                [Complex64::new(factor, 0.0), Complex64::new(-factor, 0.0)],
            ]),
        }
    }
}

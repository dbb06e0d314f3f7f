//! Utility functions for qubit operations.
//!
//! This module contains helper functions for:
//! - Small matrix and vector operations (outer product, inner product).
//! - Completeness and projector checks for measurement operators.
//! - Conversion between bit sequences and bytes or 0/1 integers.

use crate::core::errors::InputError;
use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Computes the outer product of two vectors $|a\rangle\langle b|$.
pub fn outer_product(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Array2<Complex64> {
    let n = a.len();
    let m = b.len();
    let mut res = Array2::zeros((n, m));

    for i in 0..n {
        for j in 0..m {
            res[[i, j]] = a[i] * b[j].conj();
        }
    }
    res
}

/// Computes the inner product $\langle a|b\rangle$ (conjugating `a`).
pub fn inner_product(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Complex64 {
    a.iter().zip(b.iter()).map(|(x, y)| x.conj() * y).sum()
}

/// Computes the expectation value $\langle\psi|M|\psi\rangle$.
pub fn expectation(op: &Array2<Complex64>, psi: &Array1<Complex64>) -> Complex64 {
    inner_product(psi, &op.dot(psi))
}

/// Checks POVM completeness relation.
///
/// Verifies if $\sum E_k = I$.
pub fn check_povm_completeness(ops: &[Array2<Complex64>], dim: usize) -> bool {
    let mut sum = Array2::<Complex64>::zeros((dim, dim));
    for op in ops {
        sum += op;
    }
    let identity = Array2::<Complex64>::eye(dim);
    (sum - identity).iter().all(|x| x.norm() < 1e-9)
}

/// Checks if $M^2 = M$.
pub fn is_idempotent(mat: &Array2<Complex64>, tol: f64) -> bool {
    let squared = mat.dot(mat);
    squared
        .iter()
        .zip(mat.iter())
        .all(|(a, b)| (a - b).norm() < tol)
}

/// Checks if a matrix is Hermitian
pub fn is_hermitian(mat: &Array2<Complex64>, tol: f64) -> bool {
    mat.iter()
        .zip(mat.t().iter())
        .all(|(a, b)| (a - b.conj()).norm() < tol)
}

/// Packs bits into bytes, least significant bit first.
///
/// A trailing partial byte is zero-padded in its high bits.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | ((bit as u8) << i))
        })
        .collect()
}

/// Converts 0/1 integers into bits, rejecting any other value.
pub fn bits_from_u8(values: &[u8]) -> Result<Vec<bool>, InputError> {
    values
        .iter()
        .map(|&v| match v {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(InputError::InvalidBit(other)),
        })
        .collect()
}

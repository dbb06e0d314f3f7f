//! Basis reconciliation.
//!
//! After transmission Alice and Bob announce their bases over the classical
//! channel and keep only the positions where the bases agree.

use crate::Basis;
use crate::errors::InputError;
use crate::random::RandomSource;

/// One party's bits and bases for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyRecord {
    bits: Vec<bool>,
    bases: Vec<Basis>,
}

impl PartyRecord {
    pub fn new(bits: Vec<bool>, bases: Vec<Basis>) -> Result<Self, InputError> {
        check_len(bits.len(), bases.len())?;
        Ok(Self { bits, bases })
    }

    /// Uniform random bits and bases, as Alice draws them.
    pub fn generate(n: usize, rng: &mut RandomSource) -> Self {
        let bits = rng.bits(n);
        let bases = rng.bases(n);
        Self { bits, bases }
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn bases(&self) -> &[Basis] {
        &self.bases
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (bool, Basis)> + '_ {
        self.bits.iter().copied().zip(self.bases.iter().copied())
    }
}

/// Positions where both parties chose the same basis, in order.
pub fn matching_indices(
    alice_bases: &[Basis],
    bob_bases: &[Basis],
) -> Result<Vec<usize>, InputError> {
    check_len(alice_bases.len(), bob_bases.len())?;
    Ok(alice_bases
        .iter()
        .zip(bob_bases.iter())
        .enumerate()
        .filter_map(|(i, (a, b))| (a == b).then_some(i))
        .collect())
}

/// Keeps both parties' bits at basis-agreeing positions.
///
/// The two outputs have equal length and element `i` of each refers to the
/// same raw position. An empty result is valid; the caller decides whether
/// that aborts the run.
pub fn sift(
    alice_bits: &[bool],
    alice_bases: &[Basis],
    bob_bits: &[bool],
    bob_bases: &[Basis],
) -> Result<(Vec<bool>, Vec<bool>), InputError> {
    let n = alice_bits.len();
    check_len(n, alice_bases.len())?;
    check_len(n, bob_bits.len())?;
    check_len(n, bob_bases.len())?;

    let matches = matching_indices(alice_bases, bob_bases)?;
    let alice_sifted = matches.iter().map(|&i| alice_bits[i]).collect();
    let bob_sifted = matches.iter().map(|&i| bob_bits[i]).collect();

    Ok((alice_sifted, bob_sifted))
}

pub fn sift_records(
    alice: &PartyRecord,
    bob: &PartyRecord,
) -> Result<(Vec<bool>, Vec<bool>), InputError> {
    sift(alice.bits(), alice.bases(), bob.bits(), bob.bases())
}

fn check_len(expected: usize, got: usize) -> Result<(), InputError> {
    if expected != got {
        return Err(InputError::LengthMismatch { expected, got });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bases(v: &[u8]) -> Vec<Basis> {
        v.iter().map(|&b| Basis::try_from(b).unwrap()).collect()
    }

    fn bits(v: &[u8]) -> Vec<bool> {
        crate::utils::bits_from_u8(v).unwrap()
    }

    #[test]
    fn test_sift_keeps_matching_positions() {
        let alice_bits = bits(&[0, 1, 1, 0, 1, 0]);
        let alice_bases = bases(&[0, 0, 1, 1, 0, 1]);
        let bob_bits = bits(&[0, 1, 0, 0, 1, 1]);
        let bob_bases = bases(&[0, 0, 1, 0, 0, 1]);

        let (a, b) = sift(&alice_bits, &alice_bases, &bob_bits, &bob_bases).unwrap();
        assert_eq!(a, bits(&[0, 1, 1, 1, 0]));
        assert_eq!(b, bits(&[0, 1, 0, 1, 1]));
        assert_eq!(
            matching_indices(&alice_bases, &bob_bases).unwrap(),
            vec![0, 1, 2, 4, 5]
        );
    }

    #[test]
    fn test_sift_no_matches_is_empty() {
        let (a, b) = sift(
            &bits(&[0, 1]),
            &bases(&[0, 1]),
            &bits(&[1, 0]),
            &bases(&[1, 0]),
        )
        .unwrap();
        assert!(a.is_empty() && b.is_empty());
    }

    #[test]
    fn test_sift_rejects_ragged_input() {
        let err = sift(&bits(&[0, 1]), &bases(&[0]), &bits(&[0, 1]), &bases(&[0, 1]));
        assert_eq!(err, Err(InputError::LengthMismatch { expected: 2, got: 1 }));
        assert!(PartyRecord::new(bits(&[0]), bases(&[0, 1])).is_err());
    }

    #[test]
    fn test_expected_sift_length_is_half() {
        let mut rng = RandomSource::seeded(101);
        let n = 10_000;
        let alice = PartyRecord::generate(n, &mut rng);
        let bob = PartyRecord::generate(n, &mut rng);
        let (a, b) = sift_records(&alice, &bob).unwrap();
        assert_eq!(a.len(), b.len());
        // 4 standard deviations of Binomial(10_000, 0.5) is 200.
        assert!((a.len() as i64 - 5_000).abs() < 200, "sifted {}", a.len());
    }
}

//! Explicit, seedable randomness for every protocol stage.
//!
//! Nothing in the crate touches a thread-local or global generator: each stage
//! receives a `&mut RandomSource`, so a fixed seed reproduces a run exactly.

use crate::core::Basis;
use crate::core::errors::SamplingError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Deterministic source for reproducible runs and tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Source seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Derives an independent child source and advances this one.
    pub fn fork(&mut self) -> Self {
        Self::seeded(self.rng.random())
    }

    /// `n` independent uniform bits.
    pub fn bits(&mut self, n: usize) -> Vec<bool> {
        (0..n).map(|_| self.rng.random_bool(0.5)).collect()
    }

    /// `n` independent uniform bases.
    pub fn bases(&mut self, n: usize) -> Vec<Basis> {
        (0..n).map(|_| self.basis()).collect()
    }

    pub fn basis(&mut self) -> Basis {
        Basis::from(self.rng.random_bool(0.5))
    }

    /// `k` distinct indices in `[0, n)`, in random order.
    ///
    /// Fails with `InvalidSampleSize` when `k >= n`.
    pub fn sample_without_replacement(
        &mut self,
        n: usize,
        k: usize,
    ) -> Result<Vec<usize>, SamplingError> {
        if k >= n {
            return Err(SamplingError::InvalidSampleSize {
                sample_size: k,
                population: n,
            });
        }
        Ok(rand::seq::index::sample(&mut self.rng, n, k).into_vec())
    }

    /// Uniform draw from `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.random()
    }

    /// True with probability `p`. `p` must already lie in `[0, 1]`.
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.uniform() < p
    }
}

impl From<StdRng> for RandomSource {
    fn from(rng: StdRng) -> Self {
        Self { rng }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seeded_sources_agree() {
        let mut a = RandomSource::seeded(42);
        let mut b = RandomSource::seeded(42);
        assert_eq!(a.bits(64), b.bits(64));
        assert_eq!(a.bases(64), b.bases(64));
        assert_eq!(
            a.sample_without_replacement(100, 10).unwrap(),
            b.sample_without_replacement(100, 10).unwrap()
        );
    }

    #[test]
    fn test_bits_are_roughly_uniform() {
        let mut rng = RandomSource::seeded(7);
        let ones = rng.bits(10_000).into_iter().filter(|&b| b).count();
        assert!((4_700..=5_300).contains(&ones), "ones = {ones}");
    }

    #[test]
    fn test_sample_is_distinct_and_in_range() {
        let mut rng = RandomSource::seeded(1);
        let sample = rng.sample_without_replacement(50, 49).unwrap();
        assert_eq!(sample.len(), 49);
        let unique: HashSet<_> = sample.iter().copied().collect();
        assert_eq!(unique.len(), 49);
        assert!(sample.iter().all(|&i| i < 50));
    }

    #[test]
    fn test_sample_rejects_oversized_request() {
        let mut rng = RandomSource::seeded(1);
        assert_eq!(
            rng.sample_without_replacement(5, 5),
            Err(SamplingError::InvalidSampleSize {
                sample_size: 5,
                population: 5
            })
        );
        assert!(rng.sample_without_replacement(0, 0).is_err());
    }

    #[test]
    fn test_bernoulli_extremes() {
        let mut rng = RandomSource::seeded(3);
        assert!((0..1000).all(|_| !rng.bernoulli(0.0)));
        assert!((0..1000).all(|_| rng.bernoulli(1.0)));
    }

    #[test]
    fn test_forks_diverge_from_parent() {
        let mut parent = RandomSource::seeded(9);
        let mut child = parent.fork();
        assert_ne!(parent.bits(64), child.bits(64));
    }
}

//! Key compression by fixed XOR folding.
//!
//! This is a deterministic, non-cryptographic simplification of privacy
//! amplification, not universal hashing. Segment boundaries are fixed so the
//! output is reproducible from the input and the compression factor alone.

/// Folds `key` down to `floor(len * compression_factor)` bits.
///
/// Output bit `i` is the XOR of `key[i*step .. min(i*step + step, len)]` with
/// `step = len / new_length`. Bits past the last segment are not folded in.
pub fn amplify(key: &[bool], compression_factor: f64) -> Vec<bool> {
    let new_length = (key.len() as f64 * compression_factor).floor() as usize;
    if new_length == 0 {
        return Vec::new();
    }
    // Factors above 1.0 cannot grow the key.
    let new_length = new_length.min(key.len());

    let step = key.len() / new_length;
    (0..new_length)
        .map(|i| {
            let start = i * step;
            let end = (start + step).min(key.len());
            key[start..end].iter().fold(false, |acc, &bit| acc ^ bit)
        })
        .collect()
}

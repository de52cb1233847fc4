//! Random source shared by card generation, ball draws, and deck shuffles.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Uniform random integers and shuffles backed by a seedable generator.
///
/// Production code seeds from the OS; tests seed explicitly so card layouts and
/// shuffles are reproducible.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Build a generator seeded from operating-system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Build a deterministic generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform integer in `low..=high`.
    pub fn between(&mut self, low: u32, high: u32) -> u32 {
        self.rng.random_range(low..=high)
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }

    /// Pick `amount` distinct indices out of `0..len`, in random order.
    pub fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.rng, len, amount).into_vec()
    }

    /// Fisher–Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Random lowercase alphanumeric string of the given length.
    pub fn alphanumeric(&mut self, len: usize) -> String {
        const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        (0..len)
            .map(|_| ALPHABET[self.index(ALPHABET.len())] as char)
            .collect()
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_sources_repeat() {
        let mut a = RandomSource::seeded(7);
        let mut b = RandomSource::seeded(7);
        let left: Vec<u32> = (0..16).map(|_| a.between(1, 90)).collect();
        let right: Vec<u32> = (0..16).map(|_| b.between(1, 90)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn sample_indices_are_distinct_and_in_range() {
        let mut rng = RandomSource::seeded(11);
        for _ in 0..50 {
            let mut picked = rng.sample_indices(9, 5);
            assert_eq!(picked.len(), 5);
            assert!(picked.iter().all(|&i| i < 9));
            picked.sort_unstable();
            picked.dedup();
            assert_eq!(picked.len(), 5);
        }
    }

    #[test]
    fn alphanumeric_has_requested_length() {
        let mut rng = RandomSource::seeded(3);
        let value = rng.alphanumeric(9);
        assert_eq!(value.len(), 9);
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}

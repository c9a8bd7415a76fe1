//! Seeded, replayable randomness for generators.

use rand::distributions::uniform::SampleUniform;
use rand::{Rng, RngCore};
use std::fmt;

/// Deterministic random source threaded through every generator.
///
/// `Random` is a SplitMix64 stream. Cloning it takes an independent snapshot:
/// the clone and the original produce identical draws from that point on,
/// which is how a failing trial is rebuilt exactly for shrinking.
///
/// Bounded draws go through the `rand` distribution machinery, so every
/// closed interval (the full range of a type included) is sampled uniformly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Random {
    state: u64,
    gamma: u64,
}

impl Random {
    /// Create a random source from a seed.
    pub fn from_seed(seed: u64) -> Self {
        let state = splitmix64_mix(seed);
        let gamma = mix_gamma(state);
        Random { state, gamma }
    }

    /// Split off an independent random source, advancing this one.
    pub fn split(&mut self) -> Random {
        self.state = self.state.wrapping_add(self.gamma);
        let output = splitmix64_mix(self.state);
        Random {
            state: output,
            gamma: mix_gamma(output),
        }
    }

    /// Returns true with the given probability.
    ///
    /// Probabilities of exactly 0.0 or 1.0 are answered without consuming a
    /// draw.
    pub fn boolean(&mut self, probability: f64) -> bool {
        assert!(
            (0.0..=1.0).contains(&probability),
            "probability {probability} outside [0, 1]"
        );
        if probability >= 1.0 {
            true
        } else if probability <= 0.0 {
            false
        } else {
            self.gen_bool(probability)
        }
    }

    /// Uniform signed integer in `[min, max]`.
    pub fn integer(&mut self, min: i64, max: i64) -> i64 {
        self.interval(min, max)
    }

    /// Uniform unsigned integer in `[min, max]`.
    pub fn unsigned_integer(&mut self, min: u64, max: u64) -> u64 {
        self.interval(min, max)
    }

    /// Uniform size in `[low, high)`.
    pub fn size_in_range(&mut self, low: usize, high: usize) -> usize {
        assert!(low < high, "empty size range [{low}, {high})");
        self.gen_range(low..high)
    }

    /// Uniform value of any sampleable type in `[min, max]`.
    ///
    /// Panics when `min > max`: an inverted range is a programming error in
    /// the generator that asked for it.
    pub fn interval<T>(&mut self, min: T, max: T) -> T
    where
        T: SampleUniform + PartialOrd + fmt::Debug,
    {
        assert!(min <= max, "inverted range [{min:?}, {max:?}]");
        self.gen_range(min..=max)
    }
}

impl RngCore for Random {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(self.gamma);
        splitmix64_mix(self.state)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl fmt::Display for Random {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Random({}, {})", self.state, self.gamma)
    }
}

/// SplitMix64 mixing function for high-quality output.
fn splitmix64_mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Gamma must be odd for a full period.
fn mix_gamma(z: u64) -> u64 {
    (splitmix64_mix(z) | 1).wrapping_mul(0x9e3779b97f4a7c15)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const DRAWS: usize = 10_000;

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = Random::from_seed(7);
        let mut b = Random::from_seed(7);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_copy_replays_future_draws() {
        let mut original = Random::from_seed(42);
        for _ in 0..17 {
            original.next_u64();
        }
        let mut copy = original.clone();

        let from_original: Vec<i64> = (0..50).map(|_| original.integer(-9, 9)).collect();
        let from_copy: Vec<i64> = (0..50).map(|_| copy.integer(-9, 9)).collect();
        assert_eq!(from_original, from_copy);
    }

    #[test]
    fn test_split_is_independent() {
        let mut parent = Random::from_seed(3);
        let mut child = parent.split();
        assert_ne!(parent.next_u64(), child.next_u64());
    }

    #[test_case(0, 0; "single point")]
    #[test_case(-5, 5; "straddles zero")]
    #[test_case(-1000, -990; "negative only")]
    #[test_case(10, 20; "positive only")]
    fn test_integer_bounds_and_boundaries(min: i64, max: i64) {
        let mut random = Random::from_seed(1234);
        let draws: Vec<i64> = (0..DRAWS).map(|_| random.integer(min, max)).collect();
        assert!(draws.iter().all(|x| (min..=max).contains(x)));
        assert!(draws.contains(&min));
        assert!(draws.contains(&max));
    }

    #[test_case(0, 1)]
    #[test_case(5, 9)]
    #[test_case(u64::MAX - 3, u64::MAX)]
    fn test_unsigned_bounds_and_boundaries(min: u64, max: u64) {
        let mut random = Random::from_seed(99);
        let draws: Vec<u64> = (0..DRAWS)
            .map(|_| random.unsigned_integer(min, max))
            .collect();
        assert!(draws.iter().all(|x| (min..=max).contains(x)));
        assert!(draws.contains(&min));
        assert!(draws.contains(&max));
    }

    #[test]
    fn test_full_signed_range_reaches_both_signs() {
        let mut random = Random::from_seed(5);
        let draws: Vec<i64> = (0..DRAWS)
            .map(|_| random.integer(i64::MIN, i64::MAX))
            .collect();
        assert!(draws.iter().any(|&x| x < 0));
        assert!(draws.iter().any(|&x| x > 0));
    }

    #[test]
    fn test_full_unsigned_range_reaches_upper_half() {
        let mut random = Random::from_seed(6);
        assert!((0..DRAWS).any(|_| random.unsigned_integer(0, u64::MAX) > u64::MAX / 2));
    }

    #[test]
    fn test_certain_boolean_does_not_draw() {
        let mut random = Random::from_seed(11);
        let before = random.clone();
        assert!(random.boolean(1.0));
        assert!(!random.boolean(0.0));
        assert_eq!(random, before);
    }

    #[test]
    fn test_size_in_range_excludes_high() {
        let mut random = Random::from_seed(8);
        let draws: Vec<usize> = (0..DRAWS).map(|_| random.size_in_range(2, 5)).collect();
        assert!(draws.iter().all(|x| (2..5).contains(x)));
        assert!(draws.contains(&2));
        assert!(draws.contains(&4));
    }

    #[test]
    #[should_panic(expected = "inverted range")]
    fn test_inverted_range_panics() {
        Random::from_seed(0).integer(5, 4);
    }

    #[test]
    #[should_panic(expected = "empty size range")]
    fn test_empty_size_range_panics() {
        Random::from_seed(0).size_in_range(3, 3);
    }
}

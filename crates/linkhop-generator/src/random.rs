use crate::Generator;
use linkhop_core::shortcode::{ALPHABET, CODE_LENGTH};
use linkhop_core::ShortCode;
use parking_lot::Mutex;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Draws each symbol of a short code uniformly from the 62-symbol alphabet.
///
/// The RNG is seeded once, when the generator is built. It is not a
/// cryptographic source.
#[derive(Debug)]
pub struct RandomGenerator {
    rng: Mutex<StdRng>,
    symbols: Uniform<usize>,
}

impl RandomGenerator {
    /// Creates a generator seeded from OS entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Creates a generator with a fixed seed, producing a reproducible sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            symbols: Uniform::new(0, ALPHABET.len()),
        }
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let mut rng = self.rng.lock();
        let code: String = (0..CODE_LENGTH)
            .map(|_| ALPHABET[self.symbols.sample(&mut *rng)] as char)
            .collect();
        ShortCode::new_unchecked(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generates_valid_codes() {
        let generator = RandomGenerator::new();

        for _ in 0..1_000 {
            let code = generator.generate();
            assert_eq!(code.as_str().len(), CODE_LENGTH);
            assert!(
                ShortCode::parse(code.as_str()).is_ok(),
                "generated code '{}' is outside the alphabet",
                code
            );
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = RandomGenerator::with_seed(42);
        let b = RandomGenerator::with_seed(42);

        for _ in 0..10 {
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[test]
    fn covers_the_whole_alphabet() {
        let generator = RandomGenerator::with_seed(7);
        let mut seen = HashSet::new();

        for _ in 0..2_000 {
            seen.extend(generator.generate().as_str().bytes());
        }

        assert_eq!(seen.len(), ALPHABET.len());
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RandomGenerator>();
    }
}

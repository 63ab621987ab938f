//! Deterministic random number generation.
//!
//! Every source of randomness in a match (library shuffles, the starting
//! player) draws from one `GameRng` owned by the `GameState`. Replaying the
//! same intents against the same seed reproduces the match.
//!
//! ```
//! use duel_engine::core::GameRng;
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! assert_eq!(a.flip_coin(), b.flip_coin());
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed the match was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Flip a fair coin. `true` means heads.
    pub fn flip_coin(&mut self) -> bool {
        self.inner.gen_bool(0.5)
    }

    /// Shuffle a pile's cards in place.
    pub fn shuffle<T>(&mut self, cards: &mut [T]) {
        cards.shuffle(&mut self.inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_flips_are_reproducible() {
        let mut a = GameRng::new(42);
        let mut b = GameRng::new(42);
        let flips_a: Vec<bool> = (0..64).map(|_| a.flip_coin()).collect();
        let flips_b: Vec<bool> = (0..64).map(|_| b.flip_coin()).collect();
        assert_eq!(flips_a, flips_b);
        assert!(flips_a.contains(&true) && flips_a.contains(&false));
    }

    #[test]
    fn test_shuffle_is_deterministic() {
        let mut a: Vec<u32> = (0..40).collect();
        let mut b = a.clone();
        GameRng::new(7).shuffle(&mut a);
        GameRng::new(7).shuffle(&mut b);
        assert_eq!(a, b);
        assert_ne!(a, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn test_clone_continues_the_same_sequence() {
        let mut rng = GameRng::new(99);
        rng.flip_coin();
        let mut copy = rng.clone();
        assert_eq!(copy.seed(), 99);
        let ahead: Vec<bool> = (0..16).map(|_| rng.flip_coin()).collect();
        let copied: Vec<bool> = (0..16).map(|_| copy.flip_coin()).collect();
        assert_eq!(ahead, copied);
    }
}

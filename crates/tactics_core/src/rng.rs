//! Injectable random number generation.
//!
//! The simulation core never touches system randomness. Every roll flows
//! through a [`DiceRng`] supplied by the caller, so a seeded generator
//! reproduces a battle exactly and tests can substitute scripted rolls.

use serde::{Deserialize, Serialize};

/// Uniform random source feeding [`Dice::roll`](crate::dice::Dice::roll).
///
/// Implementations must be deterministic for a given starting state.
pub trait DiceRng {
    /// Generate the next random u32 value.
    fn next_u32(&mut self) -> u32;

    /// Roll a die with `sides` sides (1..=sides inclusive).
    ///
    /// A zero-sided die rolls 0.
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        (self.next_u32() % sides) + 1
    }

    /// Pick a uniform index into a collection of `len` elements.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero.
    fn pick_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot pick from an empty collection");
        (self.next_u32() as usize) % len
    }
}

/// Seeded deterministic generator (PCG-XSH-RR).
///
/// PCG is a small, fast generator with good statistical quality: a 64-bit
/// LCG state advanced per call, permuted into 32-bit output. Same seed,
/// same roll sequence - which is what makes battle replays and the
/// determinism test harness possible.
///
/// The state serializes with the rest of the battle, so a restored
/// snapshot continues the same roll sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    /// Create a generator from a 64-bit seed.
    #[must_use]
    pub fn seed_from_u64(seed: u64) -> Self {
        // One warm-up step decorrelates small seeds.
        let mut rng = Self { state: seed };
        rng.step();
        rng
    }

    #[inline]
    fn step(&mut self) {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
    }

    /// XSH-RR output permutation: xorshift high bits, then random rotate.
    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl DiceRng for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.step();
        Self::output(self.state)
    }
}

/// Test RNG doubles usable from this crate's own unit tests.
///
/// `tactics_test_utils` offers the same doubles, but it dev-depends on
/// `tactics_core`; referencing it from an in-crate `#[cfg(test)]` module
/// compiles `tactics_core` twice and the two `DiceRng` traits no longer
/// unify. Defining the double here keeps core's unit tests single-crate.
#[cfg(test)]
pub(crate) mod test_doubles {
    use super::DiceRng;

    /// Every die rolls its maximum; every pick takes the first candidate.
    #[derive(Debug, Clone, Copy, Default)]
    pub(crate) struct MaxRng;

    impl DiceRng for MaxRng {
        fn next_u32(&mut self) -> u32 {
            u32::MAX
        }

        fn roll_die(&mut self, sides: u32) -> u32 {
            sides
        }

        fn pick_index(&mut self, len: usize) -> usize {
            assert!(len > 0, "cannot pick from an empty collection");
            0
        }
    }
}

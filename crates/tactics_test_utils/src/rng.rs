//! RNG test doubles.
//!
//! The simulation only consumes randomness through
//! [`DiceRng`], so tests can pin every roll: [`MaxRng`] and [`MinRng`]
//! fix the extremes, [`ScriptedRng`] plays back an exact sequence.

use std::collections::VecDeque;

use tactics_core::rng::DiceRng;

/// Every die rolls its maximum; every pick takes the first candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxRng;

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

/// Every die rolls 1; every pick takes the first candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinRng;

impl DiceRng for MinRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn roll_die(&mut self, sides: u32) -> u32 {
        sides.min(1)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot pick from an empty collection");
        0
    }
}

/// Plays back a scripted sequence of die results.
///
/// `roll_die` pops the next scripted value, clamped into the die's
/// range; `pick_index` pops a value and reduces it modulo the candidate
/// count. An exhausted script rolls 1s.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    values: VecDeque<u32>,
}

impl ScriptedRng {
    /// Build from the exact roll sequence tests expect to consume.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    fn next_value(&mut self) -> u32 {
        self.values.pop_front().unwrap_or(1)
    }
}

impl DiceRng for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        self.next_value()
    }

    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        self.next_value().clamp(1, sides)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot pick from an empty collection");
        (self.next_value() as usize) % len
    }
}

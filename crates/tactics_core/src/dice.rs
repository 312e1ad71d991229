//! Dice pools: `count` dice of `sides` sides plus a flat modifier.
//!
//! A [`Dice`] value is the `NdS+M` of tabletop notation. `roll` is the
//! only consumer of randomness in the core; `average` is deterministic
//! and drives action selection.

use serde::{Deserialize, Serialize};

use crate::math::Fixed;
use crate::rng::DiceRng;

/// A pool of identically-sized dice with a flat modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dice {
    /// Number of dice rolled.
    pub count: u32,
    /// Sides per die.
    pub sides: u32,
    /// Flat modifier added to the sum.
    pub modifier: i32,
}

impl Dice {
    /// Create a dice pool.
    #[must_use]
    pub const fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// The empty pool: rolls and averages to 0.
    pub const NONE: Self = Self::new(0, 0, 0);

    /// A d20 with a flat modifier, the standard check/attack die.
    #[must_use]
    pub const fn d20(modifier: i32) -> Self {
        Self::new(1, 20, modifier)
    }

    /// Parse tabletop notation (`"3d6+2"`, `"1d8-1"`, `"2d10"`).
    ///
    /// Parsing is lenient: each field that fails to parse defaults to 0
    /// independently, so a malformed string degrades to a zero roll
    /// rather than failing.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (count_part, rest) = match text.split_once(['d', 'D']) {
            Some((c, r)) => (c, r),
            None => (text, ""),
        };

        let (sides_part, modifier_part) = if let Some((s, m)) = rest.split_once('+') {
            (s, Some((m, 1i32)))
        } else if let Some((s, m)) = rest.split_once('-') {
            (s, Some((m, -1i32)))
        } else {
            (rest, None)
        };

        let count = count_part.trim().parse::<u32>().unwrap_or(0);
        let sides = sides_part.trim().parse::<u32>().unwrap_or(0);
        let modifier = modifier_part
            .map(|(m, sign)| sign * m.trim().parse::<i32>().unwrap_or(0))
            .unwrap_or(0);

        Self::new(count, sides, modifier)
    }

    /// Roll the pool through the supplied random source.
    #[must_use]
    pub fn roll(&self, rng: &mut dyn DiceRng) -> i32 {
        let mut sum = 0i32;
        for _ in 0..self.count {
            sum += rng.roll_die(self.sides) as i32;
        }
        sum + self.modifier
    }

    /// Expected value of the pool: `count * (sides + 1) / 2 + modifier`.
    #[must_use]
    pub fn average(&self) -> Fixed {
        let per_die = Fixed::from_num(self.sides + 1) / Fixed::from_num(2);
        Fixed::from_num(self.count) * per_die + Fixed::from_num(self.modifier)
    }
}

impl std::fmt::Display for Dice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifier == 0 {
            write!(f, "{}d{}", self.count, self.sides)
        } else if self.modifier > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.modifier)
        } else {
            write!(f, "{}d{}{}", self.count, self.sides, self.modifier)
        }
    }
}

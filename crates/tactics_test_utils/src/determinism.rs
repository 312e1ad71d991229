//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation produces
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Seed-for-seed replays must be 100% deterministic. Sources of
//! non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different
//!   results. The core uses fixed-point arithmetic throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   The core always iterates rosters and tiles in sorted order when
//!   order matters.
//!
//! - **System randomness**: No unseeded `rand()` calls anywhere. All
//!   rolls flow through the battle's seeded generator.

use tactics_core::combatant::CombatantId;
use tactics_core::engine::Battle;
use tactics_core::events::SimEvent;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Final state hash from each run.
    pub hashes: Vec<u64>,
    /// Number of rounds simulated per run.
    pub rounds: u32,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error
    /// message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Rounds: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.rounds,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Build and run the same battle `runs` times for `rounds` rounds and
/// compare final state hashes and event logs.
///
/// The builder must return a freshly-constructed battle and its
/// initiative order; any shared state between invocations defeats the
/// test.
///
/// # Panics
///
/// Panics if a run fails mid-battle.
pub fn check_determinism<F>(runs: usize, rounds: u32, build: F) -> DeterminismResult
where
    F: Fn() -> (Battle, Vec<CombatantId>),
{
    let mut hashes = Vec::with_capacity(runs);
    let mut first_events: Option<Vec<SimEvent>> = None;
    let mut events_match = true;

    for _ in 0..runs {
        let (mut battle, initiative) = build();
        let mut events: Vec<SimEvent> = Vec::new();
        battle
            .run(&initiative, rounds, |_| false, &mut events)
            .expect("determinism run failed");
        hashes.push(battle.state_hash());

        match &first_events {
            None => first_events = Some(events),
            Some(first) => events_match &= first == &events,
        }
    }

    let all_equal = hashes.windows(2).all(|pair| pair[0] == pair[1]);
    DeterminismResult {
        is_deterministic: all_equal && events_match,
        hashes,
        rounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::duel;

    #[test]
    fn test_duel_is_deterministic() {
        let result = check_determinism(4, 10, || duel(123));
        result.assert_deterministic();
    }

    #[test]
    fn test_harness_reports_every_run() {
        let seed = std::cell::Cell::new(0u64);
        let result = check_determinism(2, 10, || {
            seed.set(seed.get() + 1);
            duel(seed.get())
        });
        // Different seeds per run: the harness must report both hashes
        // rather than silently collapsing them.
        assert_eq!(result.hashes.len(), 2);
    }
}

//! Batch battle runner for balance testing.
//!
//! Runs the same scenario under many seeds in parallel with rayon and
//! aggregates win rates. Parallelism is across battles, never within
//! one - each battle stays strictly sequential.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use tactics_core::combatant::TeamId;

use crate::runner::run_scenario;
use crate::scenario::{Scenario, ScenarioError};

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of battles to run.
    pub count: u32,
    /// Seed of the first battle; subsequent battles increment from it.
    pub seed_start: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            count: 100,
            seed_start: 0,
        }
    }
}

/// Aggregated results of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Battles run.
    pub games: u32,
    /// Wins per team.
    pub wins: BTreeMap<TeamId, u32>,
    /// Battles with no single surviving team (mutual wipe or turn-limit
    /// stalemate).
    pub draws: u32,
    /// Mean rounds per battle.
    pub average_rounds: f64,
}

/// Run a scenario under `config.count` consecutive seeds.
///
/// # Errors
///
/// Returns the first [`ScenarioError`] any battle produced.
pub fn run_batch(scenario: &Scenario, config: &BatchConfig) -> Result<BatchResults, ScenarioError> {
    let outcomes = (0..config.count)
        .into_par_iter()
        .map(|i| run_scenario(scenario, config.seed_start + u64::from(i)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut wins: BTreeMap<TeamId, u32> = BTreeMap::new();
    let mut draws = 0;
    let mut total_rounds: u64 = 0;

    for outcome in &outcomes {
        total_rounds += u64::from(outcome.rounds);
        match outcome.winner {
            Some(team) => *wins.entry(team).or_insert(0) += 1,
            None => draws += 1,
        }
    }

    let games = config.count;
    let average_rounds = if games == 0 {
        0.0
    } else {
        total_rounds as f64 / f64::from(games)
    };

    info!(games, draws, ?wins, average_rounds, "Batch finished");

    Ok(BatchResults {
        games,
        wins,
        draws,
        average_rounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_accounts_for_every_game() {
        let scenario = Scenario::default();
        let config = BatchConfig {
            count: 8,
            seed_start: 100,
        };
        let results = run_batch(&scenario, &config).unwrap();

        assert_eq!(results.games, 8);
        let decided: u32 = results.wins.values().sum();
        assert_eq!(decided + results.draws, 8);
        assert!(results.average_rounds >= 1.0);
    }

    #[test]
    fn test_batch_is_reproducible() {
        let scenario = Scenario::default();
        let config = BatchConfig {
            count: 4,
            seed_start: 9,
        };
        let one = run_batch(&scenario, &config).unwrap();
        let two = run_batch(&scenario, &config).unwrap();
        assert_eq!(one.wins, two.wins);
        assert_eq!(one.draws, two.draws);
    }
}

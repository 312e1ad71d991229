//! Single-battle runner: assemble, fight, summarize.

use serde::{Deserialize, Serialize};
use tracing::info;

use tactics_core::combatant::TeamId;
use tactics_core::engine::last_team_standing;
use tactics_core::events::SimEvent;

use crate::scenario::{Scenario, ScenarioError};

/// A surviving combatant in the outcome summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survivor {
    /// Display name.
    pub name: String,
    /// Team membership.
    pub team: TeamId,
    /// Remaining hit points.
    pub hp: i32,
}

/// Result of one scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// Seed the battle ran under.
    pub seed: u64,
    /// Rounds simulated before completion or the turn limit.
    pub rounds: u32,
    /// Winning team, if exactly one team has survivors.
    pub winner: Option<TeamId>,
    /// Living combatants at the end.
    pub survivors: Vec<Survivor>,
    /// Full event log, in emission order.
    pub events: Vec<SimEvent>,
}

/// Run a scenario to completion under one seed.
///
/// Initiative is rolled from the seeded RNG, and the battle runs until
/// one team stands alone or the scenario's turn limit elapses.
///
/// # Errors
///
/// Returns [`ScenarioError`] when the scenario cannot be assembled or
/// the battle fails mid-run.
pub fn run_scenario(scenario: &Scenario, seed: u64) -> Result<BattleOutcome, ScenarioError> {
    let (mut battle, _) = scenario.to_battle(seed)?;
    let initiative = battle.roll_initiative();

    let mut events: Vec<SimEvent> = Vec::new();
    let rounds = battle.run(
        &initiative,
        scenario.turn_limit,
        last_team_standing,
        &mut events,
    )?;

    let survivors: Vec<Survivor> = battle
        .roster()
        .sorted_ids()
        .into_iter()
        .filter_map(|id| battle.roster().get(id))
        .filter(|c| c.is_alive())
        .map(|c| Survivor {
            name: c.name.clone(),
            team: c.team,
            hp: c.hp,
        })
        .collect();

    let mut teams: Vec<TeamId> = survivors.iter().map(|s| s.team).collect();
    teams.sort_unstable();
    teams.dedup();
    let winner = match teams.as_slice() {
        [team] => Some(*team),
        _ => None,
    };

    info!(
        scenario = %scenario.name,
        seed,
        rounds,
        winner = ?winner,
        survivors = survivors.len(),
        "Battle finished"
    );

    Ok(BattleOutcome {
        seed,
        rounds,
        winner,
        survivors,
        events,
    })
}

//! Scenario loading and configuration.
//!
//! Scenarios define the initial state for headless battles: the grid,
//! wall layout, and stat blocks for every combatant. They are the
//! embedding application's side of the core's contract - raw stat
//! blocks get assembled here into pre-parsed [`Combatant`] values the
//! engine consumes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tactics_core::behavior::Strategy;
use tactics_core::combatant::{
    AbilityScores, Action, Combatant, CombatantId, DamageType, TeamId,
};
use tactics_core::dice::Dice;
use tactics_core::engine::{Battle, DEFAULT_TURN_LIMIT};
use tactics_core::error::SimError;
use tactics_core::grid::Grid;
use tactics_core::math::{Fixed, Position};

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Scenario content could not be assembled into a battle.
    #[error("Failed to assemble battle: {0}")]
    BuildError(#[from] SimError),
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Grid dimensions (width, height) in cells.
    pub grid_size: (u32, u32),
    /// Round cap for [`crate::runner::run_scenario`].
    #[serde(default = "default_turn_limit")]
    pub turn_limit: u32,
    /// Wall cells.
    #[serde(default)]
    pub walls: Vec<(i32, i32)>,
    /// Stat blocks for every combatant.
    pub combatants: Vec<CombatantSetup>,
}

fn default_turn_limit() -> u32 {
    DEFAULT_TURN_LIMIT
}

fn default_footprint() -> u32 {
    1
}

fn default_max_uses() -> u32 {
    1
}

fn default_strategy() -> Strategy {
    Strategy::Random
}

/// One combatant's stat block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantSetup {
    /// Display name.
    pub name: String,
    /// Team membership.
    pub team: TeamId,
    /// Starting anchor cell (x, y).
    pub position: (i32, i32),
    /// Maximum hit points.
    pub hp: i32,
    /// Armor class.
    pub armor_class: i32,
    /// Movement speed in grid units per round.
    pub speed: u32,
    /// Footprint side length in cells.
    #[serde(default = "default_footprint")]
    pub footprint: u32,
    /// Target-selection strategy.
    #[serde(default = "default_strategy")]
    pub behavior: Strategy,
    /// Raw ability scores.
    #[serde(default)]
    pub abilities: AbilityScoresSetup,
    /// Damage types this combatant halves.
    #[serde(default)]
    pub resistances: Vec<DamageType>,
    /// Damage types this combatant ignores.
    #[serde(default)]
    pub immunities: Vec<DamageType>,
    /// Attack templates.
    #[serde(default)]
    pub actions: Vec<ActionSetup>,
}

/// Ability scores with per-field defaults of 10.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityScoresSetup {
    /// Strength score.
    pub strength: i32,
    /// Dexterity score.
    pub dexterity: i32,
    /// Constitution score.
    pub constitution: i32,
    /// Intelligence score.
    pub intelligence: i32,
    /// Wisdom score.
    pub wisdom: i32,
    /// Charisma score.
    pub charisma: i32,
}

impl Default for AbilityScoresSetup {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

impl From<AbilityScoresSetup> for AbilityScores {
    fn from(setup: AbilityScoresSetup) -> Self {
        Self {
            strength: setup.strength,
            dexterity: setup.dexterity,
            constitution: setup.constitution,
            intelligence: setup.intelligence,
            wisdom: setup.wisdom,
            charisma: setup.charisma,
        }
    }
}

/// One attack template, with dice in `NdS+M` notation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSetup {
    /// Display name.
    pub name: String,
    /// Flat bonus to the attack roll.
    #[serde(default)]
    pub to_hit_bonus: i32,
    /// Primary damage dice, e.g. `"2d6+3"`.
    pub primary: String,
    /// Primary damage type.
    #[serde(default)]
    pub primary_type: Option<DamageType>,
    /// Secondary damage dice.
    #[serde(default)]
    pub secondary: Option<String>,
    /// Secondary damage type.
    #[serde(default)]
    pub secondary_type: Option<DamageType>,
    /// Per-encounter use limit.
    #[serde(default = "default_max_uses")]
    pub max_uses: u32,
    /// Whether the action is a spell.
    #[serde(default)]
    pub is_spell: bool,
}

impl ActionSetup {
    fn build(&self) -> Action {
        let mut action = Action::new(&self.name, self.to_hit_bonus, Dice::parse(&self.primary))
            .with_max_uses(self.max_uses);
        if let Some(damage_type) = self.primary_type {
            action = action.with_primary_type(damage_type);
        }
        if let (Some(dice), Some(damage_type)) = (&self.secondary, self.secondary_type) {
            action = action.with_secondary(Dice::parse(dice), damage_type);
        }
        if self.is_spell {
            action = action.as_spell();
        }
        action
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "Default Skirmish".to_string(),
            description: "A 2v2 melee skirmish on an open field".to_string(),
            grid_size: (20, 20),
            turn_limit: DEFAULT_TURN_LIMIT,
            walls: vec![(10, 8), (10, 9), (10, 10), (10, 11)],
            combatants: vec![
                CombatantSetup::soldier("red-1", 0, (2, 8)),
                CombatantSetup::soldier("red-2", 0, (2, 11)),
                CombatantSetup::soldier("blue-1", 1, (17, 8)),
                CombatantSetup::soldier("blue-2", 1, (17, 11)),
            ],
        }
    }
}

impl CombatantSetup {
    /// A standard sword-and-board soldier stat block.
    #[must_use]
    pub fn soldier(name: &str, team: TeamId, position: (i32, i32)) -> Self {
        Self {
            name: name.to_string(),
            team,
            position,
            hp: 11,
            armor_class: 12,
            speed: 30,
            footprint: 1,
            behavior: Strategy::AttackWeakest,
            abilities: AbilityScoresSetup {
                strength: 13,
                dexterity: 12,
                ..AbilityScoresSetup::default()
            },
            resistances: Vec::new(),
            immunities: Vec::new(),
            actions: vec![ActionSetup {
                name: "longsword".to_string(),
                to_hit_bonus: 3,
                primary: "1d8+1".to_string(),
                primary_type: Some(DamageType::Slashing),
                secondary: None,
                secondary_type: None,
                max_uses: 1,
                is_spell: false,
            }],
        }
    }

    fn build(&self) -> Combatant {
        let mut combatant = Combatant::new(&self.name, self.team)
            .with_hp(self.hp)
            .with_armor_class(self.armor_class)
            .with_speed(self.speed)
            .with_footprint(self.footprint)
            .with_position(Position::new(self.position.0, self.position.1))
            .with_strategy(self.behavior)
            .with_abilities(self.abilities.into())
            .with_actions(self.actions.iter().map(ActionSetup::build).collect());
        for &damage_type in &self.resistances {
            combatant = combatant.with_resistance(damage_type);
        }
        for &damage_type in &self.immunities {
            combatant = combatant.with_immunity(damage_type);
        }
        combatant
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] when the file is missing, unreadable,
    /// or malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::ParseError`] for malformed RON.
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Assemble a seeded [`Battle`] from this scenario.
    ///
    /// Returns the battle and the combatant ids in stat-block order;
    /// callers wanting rolled turn order use
    /// [`Battle::roll_initiative`].
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::BuildError`] when a wall or combatant
    /// does not fit the grid.
    pub fn to_battle(&self, seed: u64) -> Result<(Battle, Vec<CombatantId>), ScenarioError> {
        let (width, height) = self.grid_size;
        let mut battle = Battle::new(Grid::new(width, height, Fixed::from_num(5)), seed);

        for &(x, y) in &self.walls {
            battle.add_wall(Position::new(x, y))?;
        }

        let mut ids = Vec::with_capacity(self.combatants.len());
        for setup in &self.combatants {
            ids.push(battle.spawn(setup.build())?);
        }

        Ok((battle, ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario_builds() {
        let scenario = Scenario::default();
        let (battle, ids) = scenario.to_battle(1).unwrap();
        assert_eq!(ids.len(), 4);
        assert_eq!(battle.roster().len(), 4);
        // Walls are down
        assert!(!battle.grid().is_passable(Position::new(10, 9)));
    }

    #[test]
    fn test_ron_round_trip() {
        let scenario = Scenario::default();
        let text = ron::to_string(&scenario).unwrap();
        let parsed = Scenario::from_ron_str(&text).unwrap();
        assert_eq!(parsed.name, scenario.name);
        assert_eq!(parsed.combatants.len(), scenario.combatants.len());
    }

    #[test]
    fn test_minimal_ron_uses_defaults() {
        let text = r#"(
            name: "duel",
            description: "one on one",
            grid_size: (10, 10),
            combatants: [
                (
                    name: "a",
                    team: 0,
                    position: (1, 1),
                    hp: 10,
                    armor_class: 10,
                    speed: 30,
                    actions: [(name: "club", primary: "1d4+1", primary_type: Some(Bludgeoning))],
                ),
                (
                    name: "b",
                    team: 1,
                    position: (8, 8),
                    hp: 10,
                    armor_class: 10,
                    speed: 30,
                ),
            ],
        )"#;
        let scenario = Scenario::from_ron_str(text).unwrap();
        assert_eq!(scenario.turn_limit, DEFAULT_TURN_LIMIT);
        assert!(scenario.walls.is_empty());
        assert_eq!(scenario.combatants[0].footprint, 1);
        assert_eq!(scenario.combatants[0].behavior, Strategy::Random);
        assert_eq!(scenario.combatants[0].abilities.strength, 10);

        let (_, ids) = scenario.to_battle(0).unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_out_of_bounds_combatant_is_rejected() {
        let mut scenario = Scenario::default();
        scenario.combatants[0].position = (99, 99);
        let result = scenario.to_battle(0);
        assert!(matches!(result, Err(ScenarioError::BuildError(_))));
    }
}

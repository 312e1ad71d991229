//! Combatant data model: stat-bearing entities, their actions, and the
//! roster that owns them.
//!
//! Combatants are pure data. Behavior lives in [`crate::behavior`], dice
//! resolution in [`crate::resolver`], and position bookkeeping in
//! [`crate::grid`]; this module only defines the records they operate on.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::behavior::{BehaviorState, Strategy};
use crate::dice::Dice;
use crate::math::{Fixed, Position};

/// Unique identifier for combatants.
pub type CombatantId = u64;

/// Team identifier. Combatants with equal teams never target each other
/// through the stock strategies' candidate filters; the engine itself is
/// team-agnostic.
pub type TeamId = u32;

/// Damage type classification for actions and defenses.
///
/// Membership in a combatant's resistance set halves incoming damage of
/// that type (floored); membership in the immunity set zeroes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    /// Crushing impacts (clubs, slams, falls).
    Bludgeoning,
    /// Puncturing strikes (bites, spears, arrows).
    Piercing,
    /// Cutting strikes (claws, blades).
    Slashing,
    /// Fire and heat.
    Fire,
    /// Cold and frost.
    Cold,
    /// Electrical damage.
    Lightning,
    /// Toxins and venom.
    Poison,
    /// Corrosive damage.
    Acid,
    /// Life-draining energy.
    Necrotic,
    /// Searing light.
    Radiant,
    /// Concussive sound.
    Thunder,
    /// Mental assault.
    Psychic,
    /// Pure magical force.
    Force,
}

/// Ability and derived check kinds a combatant can roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    /// Strength checks and saves.
    Strength,
    /// Dexterity checks and saves.
    Dexterity,
    /// Constitution checks and saves.
    Constitution,
    /// Intelligence checks and saves.
    Intelligence,
    /// Wisdom checks and saves.
    Wisdom,
    /// Charisma checks and saves.
    Charisma,
    /// Turn-order rolls (dexterity-derived).
    Initiative,
}

/// Raw ability scores, from which check dice are derived.
///
/// The modifier for a score is `score / 2 - 5` (10 is average, +0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
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

impl Default for AbilityScores {
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

impl AbilityScores {
    /// Derive the d20 modifier for a raw score.
    #[must_use]
    pub const fn modifier(score: i32) -> i32 {
        score.div_euclid(2) - 5
    }
}

/// An attack template: to-hit bonus plus primary and secondary damage.
///
/// Actions are templates shared by a combatant's action list. They are
/// not consumed during combat; only the usage counter advances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Display name of the action.
    pub name: String,
    /// Flat bonus added to the attack's d20 roll.
    pub to_hit_bonus: i32,
    /// Primary damage pool.
    pub primary: Dice,
    /// Damage type of the primary pool.
    pub primary_type: Option<DamageType>,
    /// Secondary damage pool (rider damage, e.g. a flaming blade).
    pub secondary: Dice,
    /// Damage type of the secondary pool.
    pub secondary_type: Option<DamageType>,
    /// Maximum number of uses per encounter.
    pub max_uses: u32,
    /// Times this action has been used.
    pub uses: u32,
    /// Whether the action is a spell.
    pub is_spell: bool,
}

impl Action {
    /// Create a plain weapon action with a single damage pool.
    #[must_use]
    pub fn new(name: impl Into<String>, to_hit_bonus: i32, primary: Dice) -> Self {
        Self {
            name: name.into(),
            to_hit_bonus,
            primary,
            primary_type: None,
            secondary: Dice::NONE,
            secondary_type: None,
            max_uses: 1,
            uses: 0,
            is_spell: false,
        }
    }

    /// Builder method to set the primary damage type.
    #[must_use]
    pub fn with_primary_type(mut self, damage_type: DamageType) -> Self {
        self.primary_type = Some(damage_type);
        self
    }

    /// Builder method to add a secondary damage pool.
    #[must_use]
    pub fn with_secondary(mut self, dice: Dice, damage_type: DamageType) -> Self {
        self.secondary = dice;
        self.secondary_type = Some(damage_type);
        self
    }

    /// Builder method to set the per-encounter use limit.
    #[must_use]
    pub fn with_max_uses(mut self, max_uses: u32) -> Self {
        self.max_uses = max_uses;
        self
    }

    /// Builder method to mark the action as a spell.
    #[must_use]
    pub fn as_spell(mut self) -> Self {
        self.is_spell = true;
        self
    }

    /// Record one use of the action.
    pub fn use_once(&mut self) {
        self.uses += 1;
    }

    /// Expected total damage: primary average plus secondary average.
    #[must_use]
    pub fn average_damage(&self) -> Fixed {
        self.primary.average() + self.secondary.average()
    }
}

/// A combat participant.
///
/// Owned by the [`Roster`]; the grid references combatants by id only.
/// Hit points are mutated by the resolver, position by the turn engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    /// Unique identifier, assigned by the roster.
    pub id: CombatantId,
    /// Display name.
    pub name: String,
    /// Team membership.
    pub team: TeamId,
    /// Current hit points (0..=max_hp).
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Defense threshold an attack roll must meet or exceed.
    pub armor_class: i32,
    /// Movement allowance in grid units per round.
    pub speed: u32,
    /// Cells per side of the occupied square (>= 1).
    pub footprint: u32,
    /// Anchor cell of the footprint; kept in sync with the grid by the
    /// turn engine.
    pub position: Position,
    /// Attack templates available to the behavior policy.
    pub actions: Vec<Action>,
    /// Target-selection strategy tag.
    pub strategy: Strategy,
    /// Per-round action and movement budgets.
    pub behavior: BehaviorState,
    /// Damage types this combatant halves.
    pub resistances: HashSet<DamageType>,
    /// Damage types this combatant ignores.
    pub immunities: HashSet<DamageType>,
    /// Check dice per stat, derived from ability scores.
    stats: HashMap<Stat, Dice>,
}

impl Combatant {
    /// Create a combatant with default stats (10s across the board,
    /// 1 hp, AC 0, speed 0, footprint 1, no strategy assigned).
    #[must_use]
    pub fn new(name: impl Into<String>, team: TeamId) -> Self {
        let mut combatant = Self {
            id: 0,
            name: name.into(),
            team,
            hp: 1,
            max_hp: 1,
            armor_class: 0,
            speed: 0,
            footprint: 1,
            position: Position::default(),
            actions: Vec::new(),
            strategy: Strategy::Unassigned,
            behavior: BehaviorState::default(),
            resistances: HashSet::new(),
            immunities: HashSet::new(),
            stats: HashMap::new(),
        };
        combatant.set_abilities(AbilityScores::default());
        combatant
    }

    /// Builder method to set maximum (and current) hit points.
    #[must_use]
    pub fn with_hp(mut self, max_hp: i32) -> Self {
        self.max_hp = max_hp;
        self.hp = max_hp;
        self
    }

    /// Builder method to set armor class.
    #[must_use]
    pub fn with_armor_class(mut self, armor_class: i32) -> Self {
        self.armor_class = armor_class;
        self
    }

    /// Builder method to set movement speed in grid units per round.
    ///
    /// Also arms the first round's movement budget.
    #[must_use]
    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self.behavior.movement_remaining = speed;
        self
    }

    /// Builder method to set the footprint side length in cells.
    #[must_use]
    pub fn with_footprint(mut self, footprint: u32) -> Self {
        self.footprint = footprint.max(1);
        self
    }

    /// Builder method to set the starting anchor position.
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Builder method to set the action list.
    #[must_use]
    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    /// Builder method to set the target-selection strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Builder method to add a damage resistance.
    #[must_use]
    pub fn with_resistance(mut self, damage_type: DamageType) -> Self {
        self.resistances.insert(damage_type);
        self
    }

    /// Builder method to add a damage immunity.
    #[must_use]
    pub fn with_immunity(mut self, damage_type: DamageType) -> Self {
        self.immunities.insert(damage_type);
        self
    }

    /// Builder method to derive check dice from ability scores.
    #[must_use]
    pub fn with_abilities(mut self, abilities: AbilityScores) -> Self {
        self.set_abilities(abilities);
        self
    }

    /// Rebuild the stat dice map from raw ability scores.
    ///
    /// Each stat rolls d20 plus the derived modifier; initiative is
    /// dexterity-based.
    pub fn set_abilities(&mut self, abilities: AbilityScores) {
        let m = AbilityScores::modifier;
        self.stats = HashMap::from([
            (Stat::Strength, Dice::d20(m(abilities.strength))),
            (Stat::Dexterity, Dice::d20(m(abilities.dexterity))),
            (Stat::Constitution, Dice::d20(m(abilities.constitution))),
            (Stat::Intelligence, Dice::d20(m(abilities.intelligence))),
            (Stat::Wisdom, Dice::d20(m(abilities.wisdom))),
            (Stat::Charisma, Dice::d20(m(abilities.charisma))),
            (Stat::Initiative, Dice::d20(m(abilities.dexterity))),
        ]);
    }

    /// The check dice for a stat, if defined.
    #[must_use]
    pub fn stat_dice(&self, stat: Stat) -> Option<Dice> {
        self.stats.get(&stat).copied()
    }

    /// Roll a stat check. Rolls 0 if the stat has no dice defined.
    #[must_use]
    pub fn roll_stat(&self, stat: Stat, rng: &mut dyn crate::rng::DiceRng) -> i32 {
        match self.stats.get(&stat) {
            Some(dice) => dice.roll(rng),
            None => 0,
        }
    }

    /// A combatant is alive while it has hit points remaining.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

/// Storage for all combatants in a battle.
///
/// Uses a `HashMap` for O(1) lookup by id, with deterministic iteration
/// via sorted ids when order matters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    combatants: HashMap<CombatantId, Combatant>,
    next_id: CombatantId,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self {
            combatants: HashMap::new(),
            next_id: 1,
        }
    }

    /// Insert a combatant, assigning and returning its id.
    pub fn insert(&mut self, mut combatant: Combatant) -> CombatantId {
        let id = self.next_id;
        self.next_id += 1;
        combatant.id = id;
        self.combatants.insert(id, combatant);
        id
    }

    /// Remove a combatant by id.
    pub fn remove(&mut self, id: CombatantId) -> Option<Combatant> {
        self.combatants.remove(&id)
    }

    /// Get a combatant by id.
    #[must_use]
    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    /// Get a mutable reference to a combatant by id.
    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    /// Check whether a combatant exists.
    #[must_use]
    pub fn contains(&self, id: CombatantId) -> bool {
        self.combatants.contains_key(&id)
    }

    /// Number of combatants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Sorted combatant ids for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<CombatantId> {
        let mut ids: Vec<_> = self.combatants.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all combatants (not in deterministic order).
    pub fn iter(&self) -> impl Iterator<Item = (&CombatantId, &Combatant)> {
        self.combatants.iter()
    }
}

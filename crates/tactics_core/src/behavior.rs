//! Per-combatant combat AI: budget tracking, target selection, and the
//! round decision procedure.
//!
//! Each round a combatant holds one action unit and a movement budget
//! equal to its speed. [`act`] spends those budgets: it attacks an
//! adjacent enemy if it can, otherwise nominates a destination for the
//! turn engine to path toward. Target selection is a tagged [`Strategy`]
//! dispatched through a plain function - one of N candidates picked by
//! policy, no inheritance.
//!
//! Two behaviors are deliberate, not bugs: an attack leaves the turn
//! unfinished (`done = false`), so a combatant with movement left may
//! attack and then reposition in the same round; and any move decision
//! spends the whole movement budget regardless of distance traveled.

use serde::{Deserialize, Serialize};

use crate::combatant::{Action, CombatantId, Roster};
use crate::error::{Result, SimError};
use crate::events::{EventSink, SimEvent};
use crate::math::Position;
use crate::resolver;
use crate::rng::DiceRng;

/// Target-selection policy tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strategy {
    /// No strategy configured. Selecting a target with this tag is a
    /// configuration error and fails fast.
    #[default]
    Unassigned,
    /// Uniform random choice among candidates.
    Random,
    /// Prefer the candidate with the highest current hp.
    AttackStrongest,
    /// Prefer the candidate with the lowest current hp.
    AttackWeakest,
}

/// Per-round action and movement budgets.
///
/// Re-armed every round via [`BehaviorState::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorState {
    /// Whether the single action unit is still unspent.
    pub action_available: bool,
    /// Remaining movement allowance in grid units.
    pub movement_remaining: u32,
}

impl Default for BehaviorState {
    fn default() -> Self {
        Self {
            action_available: true,
            movement_remaining: 0,
        }
    }
}

impl BehaviorState {
    /// Reset both budgets for a new round.
    pub fn start(&mut self, speed: u32) {
        self.action_available = true;
        self.movement_remaining = speed;
    }

    /// Whether both budgets are spent.
    #[must_use]
    pub const fn exhausted(&self) -> bool {
        !self.action_available && self.movement_remaining == 0
    }
}

/// Pick the index of the action with the strictly greatest expected
/// damage (primary average + secondary average). The first action wins
/// ties. Returns `None` for an empty list.
#[must_use]
pub fn most_damaging_action(actions: &[Action]) -> Option<usize> {
    let first = actions.first()?;
    let mut best = 0;
    let mut best_average = first.average_damage();

    for (index, action) in actions.iter().enumerate().skip(1) {
        let average = action.average_damage();
        if average > best_average {
            best = index;
            best_average = average;
        }
    }

    Some(best)
}

/// Select one candidate by policy.
///
/// Returns `Ok(None)` for an empty candidate list. Ties on hp break
/// toward the earliest candidate, keeping selection deterministic for a
/// pinned candidate order.
///
/// # Errors
///
/// Returns [`SimError::UnimplementedStrategy`] for
/// [`Strategy::Unassigned`].
pub fn choose_target(
    strategy: Strategy,
    candidates: &[CombatantId],
    roster: &Roster,
    rng: &mut dyn DiceRng,
) -> Result<Option<CombatantId>> {
    if strategy == Strategy::Unassigned {
        return Err(SimError::UnimplementedStrategy);
    }
    if candidates.is_empty() {
        return Ok(None);
    }

    let picked = match strategy {
        Strategy::Random => candidates[rng.pick_index(candidates.len())],
        Strategy::AttackStrongest => select_by_hp(candidates, roster, |hp, best| hp > best),
        Strategy::AttackWeakest => select_by_hp(candidates, roster, |hp, best| hp < best),
        Strategy::Unassigned => unreachable!(),
    };

    Ok(Some(picked))
}

/// First candidate whose hp strictly beats the running best.
fn select_by_hp(
    candidates: &[CombatantId],
    roster: &Roster,
    better: impl Fn(i32, i32) -> bool,
) -> CombatantId {
    let mut best = candidates[0];
    let mut best_hp = roster.get(best).map_or(0, |c| c.hp);

    for &id in &candidates[1..] {
        let hp = roster.get(id).map_or(0, |c| c.hp);
        if better(hp, best_hp) {
            best = id;
            best_hp = hp;
        }
    }

    best
}

/// Select a living candidate, re-selecting past any that have dropped.
fn select_living(
    strategy: Strategy,
    mut candidates: Vec<CombatantId>,
    roster: &Roster,
    rng: &mut dyn DiceRng,
) -> Result<Option<CombatantId>> {
    loop {
        let Some(picked) = choose_target(strategy, &candidates, roster, rng)? else {
            return Ok(None);
        };
        if roster.get(picked).is_some_and(|c| c.is_alive()) {
            return Ok(Some(picked));
        }
        candidates.retain(|&id| id != picked);
    }
}

/// Spend one decision of the combatant's round.
///
/// Writes a nominated destination into `proposed_destination` when the
/// decision is to move; the turn engine converts that into an actual
/// path. Returns `done = true` when the combatant's round is over.
///
/// # Errors
///
/// Returns [`SimError::CombatantNotFound`] for ids missing from the
/// roster and [`SimError::UnimplementedStrategy`] when target selection
/// is required but no strategy is assigned.
pub fn act(
    actor_id: CombatantId,
    proposed_destination: &mut Position,
    initiative: &[CombatantId],
    roster: &mut Roster,
    rng: &mut dyn DiceRng,
    sink: &mut dyn EventSink,
) -> Result<bool> {
    let (actor_pos, speed, strategy, budgets, alive, chosen) = {
        let actor = roster
            .get(actor_id)
            .ok_or(SimError::CombatantNotFound(actor_id))?;
        let chosen =
            most_damaging_action(&actor.actions).map(|index| (index, actor.actions[index].clone()));
        (
            actor.position,
            actor.speed,
            actor.strategy,
            actor.behavior,
            actor.is_alive(),
            chosen,
        )
    };

    // Dead combatants never act.
    if !alive {
        sink.emit(SimEvent::TurnSkipped {
            combatant: actor_id,
        });
        return Ok(true);
    }

    let living: Vec<CombatantId> = initiative
        .iter()
        .copied()
        .filter(|&id| id != actor_id)
        .filter(|&id| roster.get(id).is_some_and(|c| c.is_alive()))
        .collect();

    // Nothing left to fight, or nothing left to spend: round over,
    // budgets re-arm for the next one.
    if living.is_empty() || budgets.exhausted() {
        rearm(actor_id, speed, roster)?;
        return Ok(true);
    }

    // Melee range: anyone within one cell (Chebyshev).
    let adjacent: Vec<CombatantId> = living
        .iter()
        .copied()
        .filter(|&id| {
            roster
                .get(id)
                .is_some_and(|c| actor_pos.chebyshev_distance(c.position) <= 1)
        })
        .collect();

    if !adjacent.is_empty() && budgets.action_available {
        if let Some((action_index, action)) = chosen {
            if let Some(target_id) = select_living(strategy, adjacent, roster, rng)? {
                attack(actor_id, target_id, action_index, &action, roster, rng, sink)?;
                // The action is spent, but the round is not: movement may
                // still follow.
                return Ok(false);
            }
        }
    }

    if budgets.movement_remaining == 0 {
        rearm(actor_id, speed, roster)?;
        return Ok(true);
    }

    // Move decision: chase a target within speed/5 grid units, or anyone
    // living when none is near.
    let range = speed / 5;
    let mut candidates: Vec<CombatantId> = living
        .iter()
        .copied()
        .filter(|&id| {
            roster
                .get(id)
                .is_some_and(|c| actor_pos.chebyshev_distance(c.position) <= range)
        })
        .collect();
    if candidates.is_empty() {
        candidates = living;
    }

    let Some(target_id) = select_living(strategy, candidates, roster, rng)? else {
        rearm(actor_id, speed, roster)?;
        return Ok(true);
    };

    *proposed_destination = roster
        .get(target_id)
        .ok_or(SimError::CombatantNotFound(target_id))?
        .position;

    // The whole movement budget goes on any move decision, regardless of
    // distance actually traveled.
    roster
        .get_mut(actor_id)
        .ok_or(SimError::CombatantNotFound(actor_id))?
        .behavior
        .movement_remaining = 0;

    Ok(!budgets.action_available)
}

/// Roll and resolve one attack against the target.
fn attack(
    actor_id: CombatantId,
    target_id: CombatantId,
    action_index: usize,
    action: &Action,
    roster: &mut Roster,
    rng: &mut dyn DiceRng,
    sink: &mut dyn EventSink,
) -> Result<()> {
    let attack_roll = rng.roll_die(20) as i32 + action.to_hit_bonus;
    let primary_amount = action.primary.roll(rng);
    let secondary_amount = action.secondary.roll(rng);

    sink.emit(SimEvent::Attacked {
        attacker: actor_id,
        target: target_id,
        action: action.name.clone(),
        attack_roll,
    });

    let target = roster
        .get_mut(target_id)
        .ok_or(SimError::CombatantNotFound(target_id))?;
    resolver::attack_to_hit(
        target,
        attack_roll,
        action.primary_type,
        primary_amount,
        action.secondary_type,
        secondary_amount,
        sink,
    );

    let actor = roster
        .get_mut(actor_id)
        .ok_or(SimError::CombatantNotFound(actor_id))?;
    actor.actions[action_index].use_once();
    actor.behavior.action_available = false;
    Ok(())
}

/// Reset a combatant's budgets for its next round.
fn rearm(actor_id: CombatantId, speed: u32, roster: &mut Roster) -> Result<()> {
    roster
        .get_mut(actor_id)
        .ok_or(SimError::CombatantNotFound(actor_id))?
        .behavior
        .start(speed);
    Ok(())
}

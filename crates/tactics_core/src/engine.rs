//! The turn engine: initiative order, round loops, and movement commit.
//!
//! [`Battle`] owns the shared mutable state of one combat - grid
//! occupancy, the roster, and the seeded RNG - and is the explicit
//! context every subsystem works through: no globals, no output. The
//! embedder supplies an [`EventSink`] per call and a completion
//! predicate for [`Battle::run`].
//!
//! # Determinism
//!
//! Execution is single-threaded and strictly sequential: combatants act
//! one at a time in initiative order, and each grid/hp mutation commits
//! synchronously before the corresponding event is emitted. Running a
//! battle with a no-op sink therefore produces the same final state as
//! running it with any animating sink, and the same seed always replays
//! the same battle.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::behavior;
use crate::combatant::{Combatant, CombatantId, Roster, Stat};
use crate::error::{Result, SimError};
use crate::events::{EventSink, SimEvent};
use crate::grid::{Grid, Occupant, Tile};
use crate::math::Position;
use crate::pathfinding;
use crate::rng::{DiceRng, SeededRng};

/// Rounds simulated by [`Battle::run`] callers that accept the default.
pub const DEFAULT_TURN_LIMIT: u32 = 30;

/// One combat encounter: grid, roster, RNG, and round counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battle {
    grid: Grid,
    roster: Roster,
    rng: SeededRng,
    round: u32,
}

impl Battle {
    /// Create a battle on the given grid, seeding the RNG.
    #[must_use]
    pub fn new(grid: Grid, seed: u64) -> Self {
        Self {
            grid,
            roster: Roster::new(),
            rng: SeededRng::seed_from_u64(seed),
            round: 0,
        }
    }

    /// The battle grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The combatant roster.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Completed round count.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Look up a combatant.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::CombatantNotFound`] for unknown ids.
    pub fn combatant(&self, id: CombatantId) -> Result<&Combatant> {
        self.roster.get(id).ok_or(SimError::CombatantNotFound(id))
    }

    /// Add a combatant to the roster and place it on the grid at its
    /// position. Returns the assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] if the combatant's footprint
    /// does not fit the grid; the roster is left unchanged.
    pub fn spawn(&mut self, combatant: Combatant) -> Result<CombatantId> {
        let position = combatant.position;
        let footprint = combatant.footprint;
        let id = self.roster.insert(combatant);

        if let Err(err) = self.grid.place(position, Occupant::Combatant(id), footprint) {
            self.roster.remove(id);
            return Err(err);
        }

        Ok(id)
    }

    /// Place a wall obstacle.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] for positions outside the grid.
    pub fn add_wall(&mut self, position: Position) -> Result<()> {
        self.grid.place_wall(position)
    }

    /// Remove a combatant from the battle: unplaced from the grid,
    /// dropped from the roster, and returned to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::CombatantNotFound`] if the combatant doesn't
    /// exist.
    pub fn despawn(&mut self, id: CombatantId) -> Result<Combatant> {
        let combatant = self
            .roster
            .remove(id)
            .ok_or(SimError::CombatantNotFound(id))?;
        if let Some(anchor) = self.grid.position_of(id) {
            self.grid.remove(anchor, Some(Occupant::Combatant(id)));
        }
        Ok(combatant)
    }

    /// Roll initiative for the whole roster.
    ///
    /// Each combatant rolls its initiative dice; the returned order is
    /// descending by roll, ties broken by id, so a pinned seed pins the
    /// order.
    pub fn roll_initiative(&mut self) -> Vec<CombatantId> {
        let mut rolls: Vec<(CombatantId, i32)> = Vec::new();
        for id in self.roster.sorted_ids() {
            let roll = match self.roster.get(id) {
                Some(c) => c.roll_stat(Stat::Initiative, &mut self.rng),
                None => 0,
            };
            rolls.push((id, roll));
        }

        rolls.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        rolls.into_iter().map(|(id, _)| id).collect()
    }

    /// Run one full round with the battle's own seeded RNG.
    ///
    /// # Errors
    ///
    /// See [`Battle::forward_with_rng`].
    pub fn forward(&mut self, initiative: &[CombatantId], sink: &mut dyn EventSink) -> Result<()> {
        let mut rng = self.rng;
        let result = self.forward_with_rng(initiative, &mut rng, sink);
        self.rng = rng;
        result
    }

    /// Run one full round: every combatant in initiative order acts
    /// until its behavior reports the round done.
    ///
    /// Each behavior decision may nominate a destination; the engine
    /// paths toward it and commits up to `min(path length, speed)` hops
    /// through the grid, emitting a [`SimEvent::Moved`] per hop for
    /// animation.
    ///
    /// The RNG parameter is the seam for scripted rolls in tests;
    /// production callers use [`Battle::forward`], which threads the
    /// battle's own seeded generator through.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::CombatantNotFound`] if the initiative list
    /// names a combatant missing from the roster, and propagates
    /// behavior errors such as [`SimError::UnimplementedStrategy`].
    pub fn forward_with_rng(
        &mut self,
        initiative: &[CombatantId],
        rng: &mut dyn DiceRng,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        self.round += 1;
        sink.emit(SimEvent::RoundStarted { round: self.round });

        for &id in initiative {
            if !self.roster.contains(id) {
                return Err(SimError::CombatantNotFound(id));
            }

            loop {
                let current = self
                    .roster
                    .get(id)
                    .ok_or(SimError::CombatantNotFound(id))?
                    .position;
                let mut destination = current;

                let done =
                    behavior::act(id, &mut destination, initiative, &mut self.roster, rng, sink)?;

                if !done || destination != current {
                    self.step_along_path(id, current, destination, sink)?;
                }

                if done {
                    break;
                }
            }
        }

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(round = self.round, state_hash = hash, "Round complete");
        }

        Ok(())
    }

    /// Path toward the destination and commit up to `speed` hops.
    fn step_along_path(
        &mut self,
        id: CombatantId,
        current: Position,
        destination: Position,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let path = pathfinding::find(&self.grid, current, destination);
        let speed = self
            .roster
            .get(id)
            .ok_or(SimError::CombatantNotFound(id))?
            .speed as usize;
        let steps = path.len().min(speed);

        let mut from = current;
        for &to in path.iter().take(steps) {
            if !self.grid.relocate(id, to, from)? {
                tracing::warn!(combatant = id, %from, "grid relocation failed; halting movement");
                break;
            }
            self.roster
                .get_mut(id)
                .ok_or(SimError::CombatantNotFound(id))?
                .position = to;
            sink.emit(SimEvent::Moved {
                combatant: id,
                from,
                to,
            });
            from = to;
        }

        Ok(())
    }

    /// Run rounds until the completion predicate fires or `turn_limit`
    /// rounds have elapsed. Returns the number of rounds simulated.
    ///
    /// The predicate is injected - the engine never assumes a win rule -
    /// and is checked once per round, which is also the only
    /// cancellation point: a battle cannot stop mid-attack or mid-path.
    ///
    /// # Errors
    ///
    /// Propagates [`Battle::forward`] errors.
    pub fn run<F>(
        &mut self,
        initiative: &[CombatantId],
        turn_limit: u32,
        mut is_complete: F,
        sink: &mut dyn EventSink,
    ) -> Result<u32>
    where
        F: FnMut(&Battle) -> bool,
    {
        let mut rounds = 0;
        for _ in 0..turn_limit {
            if is_complete(self) {
                break;
            }
            self.forward(initiative, sink)?;
            rounds += 1;
        }
        Ok(rounds)
    }

    /// Calculate a hash of the current battle state.
    ///
    /// Two battles with identical state produce identical hashes; the
    /// determinism harness compares these across runs.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.round.hash(&mut hasher);
        self.rng.hash(&mut hasher);

        let ids = self.roster.sorted_ids();
        ids.len().hash(&mut hasher);
        for id in ids {
            if let Some(c) = self.roster.get(id) {
                id.hash(&mut hasher);
                c.hp.hash(&mut hasher);
                c.max_hp.hash(&mut hasher);
                c.team.hash(&mut hasher);
                c.position.hash(&mut hasher);
                c.behavior.action_available.hash(&mut hasher);
                c.behavior.movement_remaining.hash(&mut hasher);
            }
        }

        let mut cells: Vec<(&Position, &Tile)> = self.grid.tiles().collect();
        cells.sort_by_key(|(position, _)| **position);
        cells.len().hash(&mut hasher);
        for (position, tile) in cells {
            position.hash(&mut hasher);
            tile.occupants().hash(&mut hasher);
        }

        hasher.finish()
    }

    /// Serialize the battle state for snapshots and replay.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidState`] if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| SimError::InvalidState(format!("Failed to serialize battle: {e}")))
    }

    /// Restore a battle from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidState`] if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| SimError::InvalidState(format!("Failed to deserialize battle: {e}")))
    }
}

/// Completion helper: true when at most one team still has a living
/// combatant. Opt-in - pass it to [`Battle::run`] when a simple
/// last-team-standing rule fits.
#[must_use]
pub fn last_team_standing(battle: &Battle) -> bool {
    let mut teams = battle
        .roster()
        .iter()
        .filter(|(_, c)| c.is_alive())
        .map(|(_, c)| c.team);
    match teams.next() {
        None => true,
        Some(first) => teams.all(|team| team == first),
    }
}

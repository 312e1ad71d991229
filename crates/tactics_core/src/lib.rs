//! # Tactics Core
//!
//! Deterministic turn-based combat simulation core.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No system randomness (all rolls flow through an injected seeded RNG)
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Headless batch runs and CI verification
//! - Seed-for-seed battle replays
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`grid`] - Sparse occupancy grid with multi-cell footprints
//! - [`pathfinding`] - A* search over the grid
//! - [`dice`] / [`rng`] - Dice pools and the injectable random source
//! - [`combatant`] - Combatant, action, and roster data model
//! - [`resolver`] - To-hit/save resolution and damage application
//! - [`behavior`] - Per-round combat AI and target selection
//! - [`engine`] - Initiative, round loop, and movement commit
//! - [`events`] - Structured event stream for embedders
//! - [`math`] - Fixed-point math and grid geometry

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod behavior;
pub mod combatant;
pub mod dice;
pub mod engine;
pub mod error;
pub mod events;
pub mod grid;
pub mod math;
pub mod pathfinding;
pub mod resolver;
pub mod rng;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::behavior::{BehaviorState, Strategy};
    pub use crate::combatant::{
        AbilityScores, Action, Combatant, CombatantId, DamageType, Roster, Stat, TeamId,
    };
    pub use crate::dice::Dice;
    pub use crate::engine::{last_team_standing, Battle, DEFAULT_TURN_LIMIT};
    pub use crate::error::{Result, SimError};
    pub use crate::events::{EventSink, NullSink, SimEvent};
    pub use crate::grid::{Grid, Occupant, Tile};
    pub use crate::math::{Fixed, Position};
    pub use crate::rng::{DiceRng, SeededRng};
}

//! Error types for the combat simulation.

use thiserror::Error;

use crate::combatant::CombatantId;
use crate::math::Position;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Top-level error type for all simulation errors.
///
/// Only caller contract violations and configuration errors surface as
/// errors. Expected negative outcomes are plain values: an unreachable
/// goal yields an empty path, and a failed grid remove returns `false`.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid combatant reference.
    #[error("Combatant not found: {0}")]
    CombatantNotFound(CombatantId),

    /// A position (or part of a footprint) falls outside the grid bounds.
    #[error("Position {0} is outside the grid bounds")]
    OutOfBounds(Position),

    /// Target selection was invoked without an assigned strategy.
    ///
    /// This is a configuration error, distinct from ordinary failures:
    /// every combatant entering a simulation must carry a concrete
    /// target-selection strategy.
    #[error("Target selection invoked without an assigned strategy")]
    UnimplementedStrategy,

    /// Invalid simulation state.
    #[error("Invalid simulation state: {0}")]
    InvalidState(String),
}

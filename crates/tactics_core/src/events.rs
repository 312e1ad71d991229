//! Structured simulation events.
//!
//! The core performs no direct output. Everything an embedder needs to
//! render a battle - movement hops for animation, attack outcomes, hp
//! deltas, deaths - is emitted as [`SimEvent`] values through a
//! caller-supplied [`EventSink`]. State mutations commit synchronously
//! before the corresponding event is observed, so a sink that does
//! nothing yields the exact same final state as one that animates every
//! hop.

use serde::{Deserialize, Serialize};

use crate::combatant::{CombatantId, DamageType};
use crate::math::Position;

/// An observable state transition in the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A new round began.
    RoundStarted {
        /// Round number, starting at 1.
        round: u32,
    },
    /// A combatant moved one cell along its committed path.
    Moved {
        /// The combatant that moved.
        combatant: CombatantId,
        /// Cell it left.
        from: Position,
        /// Cell it entered.
        to: Position,
    },
    /// A combatant attempted an attack.
    Attacked {
        /// The attacker.
        attacker: CombatantId,
        /// The target.
        target: CombatantId,
        /// Name of the action used.
        action: String,
        /// The total attack roll (d20 + to-hit bonus).
        attack_roll: i32,
    },
    /// An attack roll failed to meet the target's armor class.
    Missed {
        /// The target that was missed.
        target: CombatantId,
        /// The attack roll that fell short.
        attack_roll: i32,
    },
    /// A combatant took damage.
    Damaged {
        /// The combatant damaged.
        target: CombatantId,
        /// Damage type, if any.
        damage_type: Option<DamageType>,
        /// Amount applied after resistance/immunity adjustment.
        amount: i32,
    },
    /// A combatant was healed.
    Healed {
        /// The combatant healed.
        target: CombatantId,
        /// Amount restored (capped at max hp).
        amount: i32,
    },
    /// A combatant's hit points reached zero.
    Died {
        /// The combatant that died.
        combatant: CombatantId,
    },
    /// A dead combatant's turn was skipped.
    TurnSkipped {
        /// The combatant whose turn was skipped.
        combatant: CombatantId,
    },
}

/// Receiver for simulation events.
///
/// Supplied by the embedder; the core never renders or prints.
pub trait EventSink {
    /// Observe one event.
    fn emit(&mut self, event: SimEvent);
}

/// Collecting sink: records every event in order.
impl EventSink for Vec<SimEvent> {
    fn emit(&mut self, event: SimEvent) {
        self.push(event);
    }
}

/// Discarding sink for callers that only want final state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: SimEvent) {}
}

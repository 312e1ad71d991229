//! Test fixtures and helpers.
//!
//! Pre-built combatants, grids, and battles for consistent testing.

use fixed::types::I32F32;

use tactics_core::behavior::Strategy;
use tactics_core::combatant::{Action, Combatant, CombatantId, DamageType, TeamId};
use tactics_core::dice::Dice;
use tactics_core::engine::Battle;
use tactics_core::grid::Grid;
use tactics_core::math::Position;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// An open square grid of 5-unit cells.
#[must_use]
pub fn open_grid(side: u32) -> Grid {
    Grid::new(side, side, fixed(5))
}

/// A sword swing: +4 to hit, 1d8+2 slashing.
#[must_use]
pub fn sword() -> Action {
    Action::new("sword", 4, Dice::new(1, 8, 2)).with_primary_type(DamageType::Slashing)
}

/// A standard line soldier: 10 hp, AC 10, speed 30, sword,
/// attack-weakest targeting.
#[must_use]
pub fn soldier(team: TeamId, position: Position) -> Combatant {
    Combatant::new("soldier", team)
        .with_hp(10)
        .with_armor_class(10)
        .with_speed(30)
        .with_position(position)
        .with_strategy(Strategy::AttackWeakest)
        .with_actions(vec![sword()])
}

/// A two-soldier duel on a 20x20 grid: team 0 at (2,2), team 1 at
/// (8,8). Returns the battle and both ids in spawn order.
#[must_use]
pub fn duel(seed: u64) -> (Battle, Vec<CombatantId>) {
    let mut battle = Battle::new(open_grid(20), seed);
    let a = battle
        .spawn(soldier(0, Position::new(2, 2)))
        .expect("fixture spawn");
    let b = battle
        .spawn(soldier(1, Position::new(8, 8)))
        .expect("fixture spawn");
    (battle, vec![a, b])
}

//! Dice-based action resolution: to-hit attacks, saving throws, damage
//! application, and healing.
//!
//! Resolution functions take already-rolled values - the behavior layer
//! rolls through the injected RNG - and apply the resulting hp deltas to
//! the target, emitting events through the sink. Resistance and immunity
//! checks are value-equality membership tests against the target's
//! damage-type sets.

use crate::combatant::{Combatant, DamageType};
use crate::events::{EventSink, SimEvent};

/// Resolve an attack roll against the target's armor class.
///
/// Hits when `attack_roll >= target.armor_class`; a hit applies the
/// primary then the secondary damage, a miss applies nothing and emits a
/// [`SimEvent::Missed`]. Returns whether the attack hit.
pub fn attack_to_hit(
    target: &mut Combatant,
    attack_roll: i32,
    primary_type: Option<DamageType>,
    primary_amount: i32,
    secondary_type: Option<DamageType>,
    secondary_amount: i32,
    sink: &mut dyn EventSink,
) -> bool {
    if attack_roll < target.armor_class {
        sink.emit(SimEvent::Missed {
            target: target.id,
            attack_roll,
        });
        return false;
    }

    deal_damage(target, primary_type, primary_amount, sink);
    deal_damage(target, secondary_type, secondary_amount, sink);
    true
}

/// Resolve a saving throw against a difficulty class.
///
/// A successful save (`save_roll >= dc`) negates all damage when
/// `negates_on_success` is set, and otherwise halves both amounts
/// (floored) before application. Returns whether any damage was applied
/// (not accounting for immunities).
pub fn attack_to_save(
    target: &mut Combatant,
    save_roll: i32,
    dc: i32,
    negates_on_success: bool,
    primary_type: Option<DamageType>,
    mut primary_amount: i32,
    secondary_type: Option<DamageType>,
    mut secondary_amount: i32,
    sink: &mut dyn EventSink,
) -> bool {
    let saved = save_roll >= dc;
    if saved && negates_on_success {
        return false;
    }
    if saved {
        primary_amount /= 2;
        secondary_amount /= 2;
    }

    deal_damage(target, primary_type, primary_amount, sink);
    deal_damage(target, secondary_type, secondary_amount, sink);
    true
}

/// Apply typed damage to a combatant.
///
/// No-op for a missing type or zero amount, and for types in the
/// target's immunity set. Types in the resistance set deal half damage
/// (floored). Hit points floor at 0; crossing to 0 emits a
/// [`SimEvent::Died`] after the [`SimEvent::Damaged`].
pub fn deal_damage(
    target: &mut Combatant,
    damage_type: Option<DamageType>,
    amount: i32,
    sink: &mut dyn EventSink,
) {
    let Some(damage_type) = damage_type else {
        return;
    };
    if amount == 0 {
        return;
    }
    if target.immunities.contains(&damage_type) {
        return;
    }

    let amount = if target.resistances.contains(&damage_type) {
        amount / 2
    } else {
        amount
    };

    let was_alive = target.is_alive();
    target.hp = (target.hp - amount).max(0);

    sink.emit(SimEvent::Damaged {
        target: target.id,
        damage_type: Some(damage_type),
        amount,
    });

    if was_alive && !target.is_alive() {
        sink.emit(SimEvent::Died {
            combatant: target.id,
        });
    }
}

/// Restore hit points, capped at the target's maximum.
pub fn heal(target: &mut Combatant, amount: i32, sink: &mut dyn EventSink) {
    target.hp = (target.hp + amount).min(target.max_hp);
    sink.emit(SimEvent::Healed {
        target: target.id,
        amount,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;

    fn target() -> Combatant {
        let mut c = Combatant::new("dummy", 1)
            .with_hp(20)
            .with_armor_class(12);
        c.id = 1;
        c
    }

    #[test]
    fn test_attack_hits_at_or_above_ac() {
        let mut t = target();
        let hit = attack_to_hit(
            &mut t,
            15,
            Some(DamageType::Slashing),
            6,
            None,
            0,
            &mut NullSink,
        );
        assert!(hit);
        assert_eq!(t.hp, 14);

        let mut t = target();
        let hit = attack_to_hit(
            &mut t,
            12,
            Some(DamageType::Slashing),
            6,
            None,
            0,
            &mut NullSink,
        );
        assert!(hit, "meeting AC exactly is a hit");
    }

    #[test]
    fn test_attack_misses_below_ac() {
        let mut t = target();
        let mut events: Vec<SimEvent> = Vec::new();
        let hit = attack_to_hit(
            &mut t,
            10,
            Some(DamageType::Slashing),
            6,
            None,
            0,
            &mut events,
        );
        assert!(!hit);
        assert_eq!(t.hp, 20);
        assert_eq!(
            events,
            vec![SimEvent::Missed {
                target: 1,
                attack_roll: 10
            }]
        );
    }

    #[test]
    fn test_hit_applies_primary_then_secondary() {
        let mut t = target();
        let mut events: Vec<SimEvent> = Vec::new();
        attack_to_hit(
            &mut t,
            18,
            Some(DamageType::Piercing),
            5,
            Some(DamageType::Fire),
            3,
            &mut events,
        );
        assert_eq!(t.hp, 12);
        assert_eq!(
            events,
            vec![
                SimEvent::Damaged {
                    target: 1,
                    damage_type: Some(DamageType::Piercing),
                    amount: 5
                },
                SimEvent::Damaged {
                    target: 1,
                    damage_type: Some(DamageType::Fire),
                    amount: 3
                },
            ]
        );
    }

    #[test]
    fn test_save_negates() {
        let mut t = target();
        let applied = attack_to_save(
            &mut t,
            15,
            14,
            true,
            Some(DamageType::Fire),
            10,
            None,
            0,
            &mut NullSink,
        );
        assert!(!applied);
        assert_eq!(t.hp, 20);
    }

    #[test]
    fn test_save_halves_floored() {
        let mut t = target();
        let applied = attack_to_save(
            &mut t,
            15,
            14,
            false,
            Some(DamageType::Fire),
            10,
            None,
            0,
            &mut NullSink,
        );
        assert!(applied);
        // 10 halved to 5
        assert_eq!(t.hp, 15);

        let mut t = target();
        attack_to_save(
            &mut t,
            15,
            14,
            false,
            Some(DamageType::Fire),
            7,
            None,
            0,
            &mut NullSink,
        );
        // 7 halves to 3, floored
        assert_eq!(t.hp, 17);
    }

    #[test]
    fn test_failed_save_takes_full_damage() {
        let mut t = target();
        let applied = attack_to_save(
            &mut t,
            10,
            14,
            true,
            Some(DamageType::Lightning),
            10,
            None,
            0,
            &mut NullSink,
        );
        assert!(applied);
        assert_eq!(t.hp, 10);
    }

    #[test]
    fn test_immunity_ignores_damage() {
        let mut t = target();
        t.immunities.insert(DamageType::Poison);
        deal_damage(&mut t, Some(DamageType::Poison), 100, &mut NullSink);
        assert_eq!(t.hp, 20);
    }

    #[test]
    fn test_resistance_halves_damage() {
        let mut t = target();
        t.resistances.insert(DamageType::Cold);
        deal_damage(&mut t, Some(DamageType::Cold), 9, &mut NullSink);
        // 9 halves to 4, floored
        assert_eq!(t.hp, 16);
    }

    #[test]
    fn test_untyped_or_zero_damage_is_noop() {
        let mut t = target();
        deal_damage(&mut t, None, 10, &mut NullSink);
        deal_damage(&mut t, Some(DamageType::Fire), 0, &mut NullSink);
        assert_eq!(t.hp, 20);
    }

    #[test]
    fn test_hp_floors_at_zero_and_death_event() {
        let mut t = target();
        let mut events: Vec<SimEvent> = Vec::new();
        deal_damage(&mut t, Some(DamageType::Force), 50, &mut events);
        assert_eq!(t.hp, 0);
        assert_eq!(
            events,
            vec![
                SimEvent::Damaged {
                    target: 1,
                    damage_type: Some(DamageType::Force),
                    amount: 50
                },
                SimEvent::Died { combatant: 1 },
            ]
        );

        // A second hit on a corpse emits no second death
        let mut events: Vec<SimEvent> = Vec::new();
        deal_damage(&mut t, Some(DamageType::Force), 5, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut t = target();
        t.hp = 5;
        heal(&mut t, 100, &mut NullSink);
        assert_eq!(t.hp, 20);

        t.hp = 5;
        heal(&mut t, 3, &mut NullSink);
        assert_eq!(t.hp, 8);
    }
}

//! Scenario file loading and end-to-end battle tests.

use std::io::Write;

use tactics_headless::runner::run_scenario;
use tactics_headless::scenario::{Scenario, ScenarioError};
use tactics_test_utils::determinism::check_determinism;

const DUEL_RON: &str = r#"(
    name: "pit duel",
    description: "two brawlers in a walled pit",
    grid_size: (12, 12),
    turn_limit: 20,
    walls: [(6, 4), (6, 5), (6, 6)],
    combatants: [
        (
            name: "grok",
            team: 0,
            position: (2, 5),
            hp: 16,
            armor_class: 12,
            speed: 30,
            behavior: AttackWeakest,
            abilities: (strength: 16, dexterity: 12),
            actions: [
                (name: "maul", to_hit_bonus: 5, primary: "2d6+3", primary_type: Some(Bludgeoning)),
            ],
        ),
        (
            name: "vex",
            team: 1,
            position: (9, 5),
            hp: 13,
            armor_class: 14,
            speed: 30,
            behavior: AttackStrongest,
            abilities: (dexterity: 16),
            resistances: [Bludgeoning],
            actions: [
                (name: "rapier", to_hit_bonus: 6, primary: "1d8+3", primary_type: Some(Piercing)),
            ],
        ),
    ],
)"#;

#[test]
fn test_load_scenario_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DUEL_RON.as_bytes()).unwrap();

    let scenario = Scenario::load(file.path()).unwrap();
    assert_eq!(scenario.name, "pit duel");
    assert_eq!(scenario.combatants.len(), 2);
    assert_eq!(scenario.turn_limit, 20);
}

#[test]
fn test_missing_file_is_reported() {
    let result = Scenario::load("does/not/exist.ron");
    assert!(matches!(result, Err(ScenarioError::FileNotFound(_))));
}

#[test]
fn test_malformed_ron_is_reported() {
    let result = Scenario::from_ron_str("(name: \"broken\"");
    assert!(matches!(result, Err(ScenarioError::ParseError(_))));
}

#[test]
fn test_duel_runs_and_replays() {
    let scenario = Scenario::from_ron_str(DUEL_RON).unwrap();

    let one = run_scenario(&scenario, 5).unwrap();
    let two = run_scenario(&scenario, 5).unwrap();
    assert_eq!(one, two, "same seed must replay the same battle");
    assert!(one.rounds <= 20);
}

#[test]
fn test_scenario_battles_are_deterministic() {
    let scenario = Scenario::from_ron_str(DUEL_RON).unwrap();
    let result = check_determinism(3, 10, || {
        let (mut battle, _) = scenario.to_battle(77).unwrap();
        let initiative = battle.roll_initiative();
        (battle, initiative)
    });
    result.assert_deterministic();
}

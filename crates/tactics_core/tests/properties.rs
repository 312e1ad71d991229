//! Property-based tests over the grid and pathfinder.

use tactics_test_utils::fixtures::{fixed, open_grid};
use tactics_test_utils::proptest::prelude::*;

use tactics_core::grid::{Grid, Occupant};
use tactics_core::math::Position;
use tactics_core::pathfinding;

proptest! {
    /// Placing then removing a unit-footprint occupant leaves the grid
    /// exactly as it was: no tile, no anchor.
    #[test]
    fn place_remove_round_trip(x in 0i32..20, y in 0i32..20, id in 1u64..100) {
        let mut grid = open_grid(20);
        let p = Position::new(x, y);
        grid.place(p, Occupant::Combatant(id), 1).unwrap();
        prop_assert!(grid.get(p).unwrap().contains(Occupant::Combatant(id)));

        prop_assert!(grid.remove(p, Some(Occupant::Combatant(id))));
        prop_assert!(grid.get(p).is_none());
        prop_assert_eq!(grid.position_of(id), None);
        prop_assert_eq!(grid.occupied_tiles(), 0);
    }

    /// On an unobstructed grid, the path reaches the goal in exactly
    /// the Chebyshev distance, stepping only through adjacent cells.
    #[test]
    fn open_grid_paths_are_chebyshev_optimal(
        sx in 0i32..16, sy in 0i32..16,
        gx in 0i32..16, gy in 0i32..16,
    ) {
        let grid = open_grid(16);
        let start = Position::new(sx, sy);
        let goal = Position::new(gx, gy);

        let path = pathfinding::find(&grid, start, goal);
        if start == goal {
            prop_assert!(path.is_empty());
        } else {
            prop_assert_eq!(path.last(), Some(&goal));
            prop_assert_eq!(path.len() as u32, start.chebyshev_distance(goal));

            let mut previous = start;
            for &step in &path {
                prop_assert_eq!(previous.chebyshev_distance(step), 1);
                previous = step;
            }
        }
    }

    /// Paths never enter wall cells, whatever the wall layout.
    #[test]
    fn paths_avoid_walls(walls in prop::collection::hash_set((1i32..15, 0i32..16), 0..40)) {
        let mut grid = Grid::new(16, 16, fixed(5));
        let start = Position::new(0, 8);
        let goal = Position::new(15, 8);
        for &(x, y) in &walls {
            let p = Position::new(x, y);
            if p != start && p != goal {
                grid.place_wall(p).unwrap();
            }
        }

        let path = pathfinding::find(&grid, start, goal);
        for step in &path {
            prop_assert!(grid.is_passable(*step), "path enters wall at {step}");
        }
        if let Some(last) = path.last() {
            prop_assert_eq!(*last, goal);
        }
    }
}

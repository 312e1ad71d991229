//! Grid-based pathfinding using the A* algorithm.
//!
//! All costs use fixed-point math for deterministic results across
//! platforms: the heuristic is Euclidean distance to the goal, and a
//! step costs its Euclidean length (1 cardinal, √2 diagonal), which
//! keeps the heuristic admissible and consistent.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::grid::Grid;
use crate::math::{fixed_sqrt, Fixed, Position};

/// A search node. Nodes live in a per-search arena and link to their
/// parent by index; indices only ever point at earlier entries, so the
/// chain is acyclic by construction and dropped wholesale when the
/// search returns.
#[derive(Debug, Clone, Copy)]
struct Node {
    position: Position,
    g: Fixed,
    parent: Option<usize>,
}

/// An entry in the open-set priority queue, pointing into the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    /// f = g + h (negated ordering below makes the heap a min-heap).
    f: Fixed,
    /// Insertion sequence number. Ties on `f` break toward the earliest
    /// inserted node, keeping expansion order deterministic.
    seq: u64,
    /// Arena index of the node.
    index: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse for min-heap behavior.
        match other.f.cmp(&self.f) {
            Ordering::Equal => other.seq.cmp(&self.seq),
            ord => ord,
        }
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Direction offsets for 8-directional movement.
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),   // East
    (1, 1),   // Southeast
    (0, 1),   // South
    (-1, 1),  // Southwest
    (-1, 0),  // West
    (-1, -1), // Northwest
    (0, -1),  // North
    (1, -1),  // Northeast
];

/// Find a path from `start` to `goal`.
///
/// Returns the sequence of cells to step through, start-exclusive and
/// goal-inclusive (callers already know where they are). Returns an
/// empty path when the goal is unreachable or `start == goal` - both
/// are normal outcomes, not errors.
#[must_use]
pub fn find(grid: &Grid, start: Position, goal: Position) -> Vec<Position> {
    if start == goal {
        return Vec::new();
    }

    let diagonal = fixed_sqrt(Fixed::from_num(2));

    let mut arena: Vec<Node> = Vec::new();
    let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();
    // Best g seen per position, across both open and closed nodes: a
    // neighbor is only admitted when it strictly improves on this.
    let mut best_g: HashMap<Position, Fixed> = HashMap::new();
    let mut seq: u64 = 0;

    arena.push(Node {
        position: start,
        g: Fixed::ZERO,
        parent: None,
    });
    best_g.insert(start, Fixed::ZERO);
    open.push(OpenEntry {
        f: start.euclidean_distance(goal),
        seq,
        index: 0,
    });

    while let Some(entry) = open.pop() {
        let current = arena[entry.index];

        // A better route to this cell was admitted after this entry was
        // queued; the entry is stale.
        if let Some(&g) = best_g.get(&current.position) {
            if current.g > g {
                continue;
            }
        }

        if current.position == goal {
            return reconstruct_path(&arena, entry.index);
        }

        for &(dx, dy) in &DIRECTIONS {
            let neighbor = Position::new(current.position.x + dx, current.position.y + dy);
            if !grid.is_passable(neighbor) {
                continue;
            }

            let step = if dx != 0 && dy != 0 {
                diagonal
            } else {
                Fixed::ONE
            };
            let tentative_g = current.g + step;

            // Skip when an equal-or-better route already exists.
            if best_g
                .get(&neighbor)
                .is_some_and(|&g| g <= tentative_g)
            {
                continue;
            }

            best_g.insert(neighbor, tentative_g);
            arena.push(Node {
                position: neighbor,
                g: tentative_g,
                parent: Some(entry.index),
            });
            seq += 1;
            open.push(OpenEntry {
                f: tentative_g + neighbor.euclidean_distance(goal),
                seq,
                index: arena.len() - 1,
            });
        }
    }

    // Open set exhausted without reaching the goal: no path.
    Vec::new()
}

/// Walk parent links back to the start, then flip and drop the start
/// cell.
fn reconstruct_path(arena: &[Node], goal_index: usize) -> Vec<Position> {
    let mut path = Vec::new();
    let mut current = Some(goal_index);

    while let Some(index) = current {
        path.push(arena[index].position);
        current = arena[index].parent;
    }

    path.reverse();
    path.remove(0);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid() -> Grid {
        Grid::new(20, 20, Fixed::from_num(5))
    }

    #[test]
    fn test_same_cell_is_empty_path() {
        let g = open_grid();
        let p = Position::new(5, 5);
        assert!(find(&g, p, p).is_empty());
    }

    #[test]
    fn test_open_grid_path_length_is_chebyshev() {
        let g = open_grid();
        let start = Position::new(0, 0);

        for goal in [
            Position::new(5, 5),
            Position::new(7, 2),
            Position::new(0, 9),
            Position::new(12, 3),
        ] {
            let path = find(&g, start, goal);
            assert_eq!(path.last(), Some(&goal));
            assert_eq!(
                path.len() as u32,
                start.chebyshev_distance(goal),
                "path to {goal} should take {} steps",
                start.chebyshev_distance(goal)
            );
        }
    }

    #[test]
    fn test_path_excludes_start() {
        let g = open_grid();
        let start = Position::new(3, 3);
        let path = find(&g, start, Position::new(6, 3));
        assert!(!path.contains(&start));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_path_around_wall() {
        let mut g = open_grid();
        for y in 2..18 {
            g.place_wall(Position::new(10, y)).unwrap();
        }

        let start = Position::new(5, 10);
        let goal = Position::new(15, 10);
        let path = find(&g, start, goal);

        assert_eq!(path.last(), Some(&goal));
        for p in &path {
            assert!(g.is_passable(*p), "path crosses wall at {p}");
        }
    }

    #[test]
    fn test_enclosed_goal_is_unreachable() {
        let mut g = open_grid();
        let goal = Position::new(10, 10);
        for (dx, dy) in DIRECTIONS {
            g.place_wall(Position::new(goal.x + dx, goal.y + dy)).unwrap();
        }

        let path = find(&g, Position::new(0, 0), goal);
        assert!(path.is_empty());
    }

    #[test]
    fn test_combatants_do_not_block() {
        let mut g = open_grid();
        use crate::grid::Occupant;
        for y in 0..20 {
            g.place(Position::new(10, y), Occupant::Combatant(y as u64 + 1), 1)
                .unwrap();
        }

        let path = find(&g, Position::new(5, 10), Position::new(15, 10));
        assert_eq!(path.last(), Some(&Position::new(15, 10)));
    }

    #[test]
    fn test_determinism() {
        let mut g = open_grid();
        for y in 5..15 {
            g.place_wall(Position::new(9, y)).unwrap();
        }
        let start = Position::new(2, 10);
        let goal = Position::new(17, 10);

        let first = find(&g, start, goal);
        for _ in 0..5 {
            assert_eq!(find(&g, start, goal), first);
        }
    }
}

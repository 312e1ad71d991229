//! Sparse occupancy grid with multi-cell footprints.
//!
//! The grid maps [`Position`]s to [`Tile`]s and only stores cells that
//! currently hold something: a tile whose occupant list empties is
//! removed. Combatants are referenced by id (the roster owns them); a
//! combatant with footprint `n` occupies the `n x n` block of cells
//! anchored at its position, and the grid tracks that anchor so the
//! placement invariant - every footprint cell holds the occupant, and
//! the recorded anchor matches the cell used to place it - survives
//! `place`/`remove`/`relocate`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::combatant::CombatantId;
use crate::error::{Result, SimError};
use crate::math::{fixed_serde, Fixed, Position};

/// Something standing on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    /// A roster combatant. Passable for pathfinding: movement conflicts
    /// between combatants are a gameplay rule, not a pathing constraint.
    Combatant(CombatantId),
    /// A static obstacle. Impassable.
    Wall,
}

impl Occupant {
    /// Whether this occupant blocks pathfinding through its cell.
    #[must_use]
    pub const fn blocks_movement(self) -> bool {
        matches!(self, Self::Wall)
    }
}

/// Contents of one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Movement cost multiplier through this cell. Carried for
    /// presentation and terrain rules; the pathfinder prices steps by
    /// geometry alone.
    #[serde(with = "fixed_serde")]
    pub difficulty: Fixed,
    /// Occupants in insertion order.
    occupants: Vec<Occupant>,
}

impl Tile {
    fn new() -> Self {
        Self {
            difficulty: Fixed::ONE,
            occupants: Vec::new(),
        }
    }

    /// The occupants of this tile, in insertion order.
    #[must_use]
    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    /// Whether the tile holds the given occupant.
    #[must_use]
    pub fn contains(&self, occupant: Occupant) -> bool {
        self.occupants.contains(&occupant)
    }
}

/// Sparse occupancy map over a bounded grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Grid width in cells.
    width: u32,
    /// Grid height in cells.
    height: u32,
    /// Size of each cell in world units; presentation only, the
    /// algorithms never read it.
    #[serde(with = "fixed_serde")]
    cell_size: Fixed,
    /// Occupied cells only.
    tiles: HashMap<Position, Tile>,
    /// Anchor cell and footprint of every placed combatant.
    anchors: HashMap<CombatantId, (Position, u32)>,
}

impl Grid {
    /// Create an empty grid.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero, or if `cell_size` is not
    /// positive.
    #[must_use]
    pub fn new(width: u32, height: u32, cell_size: Fixed) -> Self {
        assert!(width > 0, "Grid width must be positive");
        assert!(height > 0, "Grid height must be positive");
        assert!(cell_size > Fixed::ZERO, "Grid cell_size must be positive");

        Self {
            width,
            height,
            cell_size,
            tiles: HashMap::new(),
            anchors: HashMap::new(),
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cell size in world units.
    #[must_use]
    pub const fn cell_size(&self) -> Fixed {
        self.cell_size
    }

    /// Check whether a position lies within the grid bounds.
    #[must_use]
    pub fn in_bounds(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    /// Get the tile at a position, if any cell content exists there.
    #[must_use]
    pub fn get(&self, position: Position) -> Option<&Tile> {
        self.tiles.get(&position)
    }

    /// The recorded anchor position of a placed combatant.
    #[must_use]
    pub fn position_of(&self, id: CombatantId) -> Option<Position> {
        self.anchors.get(&id).map(|&(position, _)| position)
    }

    /// The cells covered by a footprint anchored at `anchor`.
    fn footprint_cells(anchor: Position, footprint: u32) -> impl Iterator<Item = Position> {
        let side = footprint.max(1) as i32;
        (0..side).flat_map(move |dy| {
            (0..side).map(move |dx| Position::new(anchor.x + dx, anchor.y + dy))
        })
    }

    /// Place an occupant, filling every cell of its footprint.
    ///
    /// Creates tiles as needed and records the combatant's anchor. No
    /// dedup: placing the same occupant twice without removing it first
    /// is a caller error.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] (without mutating) if any
    /// footprint cell falls outside the grid.
    pub fn place(&mut self, position: Position, occupant: Occupant, footprint: u32) -> Result<()> {
        for cell in Self::footprint_cells(position, footprint) {
            if !self.in_bounds(cell) {
                return Err(SimError::OutOfBounds(cell));
            }
        }

        for cell in Self::footprint_cells(position, footprint) {
            self.tiles
                .entry(cell)
                .or_insert_with(Tile::new)
                .occupants
                .push(occupant);
        }

        if let Occupant::Combatant(id) = occupant {
            self.anchors.insert(id, (position, footprint.max(1)));
        }

        Ok(())
    }

    /// Place a single-cell wall obstacle.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] if the position is outside the
    /// grid.
    pub fn place_wall(&mut self, position: Position) -> Result<()> {
        self.place(position, Occupant::Wall, 1)
    }

    /// Remove occupants from a tile.
    ///
    /// With `Some(occupant)`, removes just that occupant from every cell
    /// it occupies (the full footprint for combatants). With `None`,
    /// clears all occupants rooted in the tile at `position`. Tiles whose
    /// occupant list empties are deleted.
    ///
    /// Returns `false` if no tile existed at the anchor position, or if
    /// the named combatant's recorded anchor disagrees with `position` -
    /// caller/state inconsistencies the caller must check. Returns
    /// `true` otherwise.
    pub fn remove(&mut self, position: Position, occupant: Option<Occupant>) -> bool {
        if !self.tiles.contains_key(&position) {
            return false;
        }

        if let Some(Occupant::Combatant(id)) = occupant {
            if let Some(&(anchor, _)) = self.anchors.get(&id) {
                if anchor != position {
                    return false;
                }
            }
        }

        match occupant {
            Some(occ) => self.remove_one(position, occ),
            None => {
                let occupants: Vec<Occupant> = self.tiles[&position].occupants.clone();
                for occ in occupants {
                    self.remove_one(position, occ);
                }
            }
        }

        true
    }

    /// Remove a single occupant from every cell it covers.
    fn remove_one(&mut self, position: Position, occupant: Occupant) {
        let cells: Vec<Position> = match occupant {
            Occupant::Combatant(id) => match self.anchors.remove(&id) {
                Some((anchor, footprint)) => Self::footprint_cells(anchor, footprint).collect(),
                // No anchor recorded: fall back to the stated cell.
                None => vec![position],
            },
            Occupant::Wall => vec![position],
        };

        for cell in cells {
            if let Some(tile) = self.tiles.get_mut(&cell) {
                if let Some(index) = tile.occupants.iter().position(|&o| o == occupant) {
                    tile.occupants.remove(index);
                }
                if tile.occupants.is_empty() {
                    self.tiles.remove(&cell);
                }
            }
        }
    }

    /// Relocate a combatant from one anchor to another.
    ///
    /// Removes it at `from`, then re-places it at `to` and updates the
    /// recorded anchor. Returns `Ok(false)` without further mutation if
    /// the initial remove failed (the combatant was not where the caller
    /// claimed).
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] (before any mutation) if the
    /// destination footprint leaves the grid.
    pub fn relocate(&mut self, id: CombatantId, to: Position, from: Position) -> Result<bool> {
        let Some(&(_, footprint)) = self.anchors.get(&id) else {
            return Ok(false);
        };

        for cell in Self::footprint_cells(to, footprint) {
            if !self.in_bounds(cell) {
                return Err(SimError::OutOfBounds(cell));
            }
        }

        if !self.remove(from, Some(Occupant::Combatant(id))) {
            return Ok(false);
        }

        self.place(to, Occupant::Combatant(id), footprint)?;
        Ok(true)
    }

    /// Passability query for pathfinding.
    ///
    /// A cell outside the bounds is impassable; a cell with no tile is
    /// passable; a cell whose tile holds a blocking occupant is
    /// impassable; cells occupied only by combatants stay passable.
    #[must_use]
    pub fn is_passable(&self, position: Position) -> bool {
        if !self.in_bounds(position) {
            return false;
        }
        match self.tiles.get(&position) {
            None => true,
            Some(tile) => !tile.occupants.iter().any(|o| o.blocks_movement()),
        }
    }

    /// Set the movement-cost multiplier of an occupied tile.
    ///
    /// Returns `false` when no tile exists at the position: difficulty
    /// lives on tile contents, and the grid never stores empty tiles.
    pub fn set_difficulty(&mut self, position: Position, difficulty: Fixed) -> bool {
        match self.tiles.get_mut(&position) {
            Some(tile) => {
                tile.difficulty = difficulty;
                true
            }
            None => false,
        }
    }

    /// Number of occupied tiles.
    #[must_use]
    pub fn occupied_tiles(&self) -> usize {
        self.tiles.len()
    }

    /// Iterate over occupied tiles (not in deterministic order).
    pub fn tiles(&self) -> impl Iterator<Item = (&Position, &Tile)> {
        self.tiles.iter()
    }
}

impl Default for Grid {
    /// A 64x64 grid of 5-unit cells.
    fn default() -> Self {
        Self::new(64, 64, Fixed::from_num(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(10, 10, Fixed::from_num(5))
    }

    #[test]
    fn test_place_then_get() {
        let mut g = grid();
        let p = Position::new(3, 4);
        g.place(p, Occupant::Combatant(1), 1).unwrap();
        assert!(g.get(p).unwrap().contains(Occupant::Combatant(1)));
        assert_eq!(g.position_of(1), Some(p));
    }

    #[test]
    fn test_place_remove_round_trip() {
        let mut g = grid();
        let p = Position::new(2, 2);
        g.place(p, Occupant::Combatant(7), 1).unwrap();
        assert!(g.remove(p, Some(Occupant::Combatant(7))));
        assert!(g.get(p).is_none());
        assert_eq!(g.position_of(7), None);
    }

    #[test]
    fn test_remove_missing_tile_fails() {
        let mut g = grid();
        assert!(!g.remove(Position::new(5, 5), Some(Occupant::Combatant(1))));
    }

    #[test]
    fn test_empty_tiles_are_evicted() {
        let mut g = grid();
        let p = Position::new(1, 1);
        g.place(p, Occupant::Combatant(1), 1).unwrap();
        g.place(p, Occupant::Combatant(2), 1).unwrap();
        g.remove(p, Some(Occupant::Combatant(1)));
        // Tile survives while an occupant remains
        assert!(g.get(p).is_some());
        g.remove(p, Some(Occupant::Combatant(2)));
        assert!(g.get(p).is_none());
        assert_eq!(g.occupied_tiles(), 0);
    }

    #[test]
    fn test_footprint_fills_block() {
        let mut g = grid();
        let anchor = Position::new(4, 4);
        g.place(anchor, Occupant::Combatant(9), 2).unwrap();
        for dy in 0..2 {
            for dx in 0..2 {
                let cell = Position::new(4 + dx, 4 + dy);
                assert!(g.get(cell).unwrap().contains(Occupant::Combatant(9)));
            }
        }
        assert_eq!(g.position_of(9), Some(anchor));

        assert!(g.remove(anchor, Some(Occupant::Combatant(9))));
        assert_eq!(g.occupied_tiles(), 0);
    }

    #[test]
    fn test_place_out_of_bounds() {
        let mut g = grid();
        let err = g.place(Position::new(9, 9), Occupant::Combatant(1), 2);
        assert!(matches!(err, Err(SimError::OutOfBounds(_))));
        // No partial placement
        assert_eq!(g.occupied_tiles(), 0);
    }

    #[test]
    fn test_remove_all_clears_footprints() {
        let mut g = grid();
        let anchor = Position::new(0, 0);
        g.place(anchor, Occupant::Combatant(1), 2).unwrap();
        g.place(anchor, Occupant::Wall, 1).unwrap();
        assert!(g.remove(anchor, None));
        assert_eq!(g.occupied_tiles(), 0);
        assert_eq!(g.position_of(1), None);
    }

    #[test]
    fn test_relocate() {
        let mut g = grid();
        let from = Position::new(1, 1);
        let to = Position::new(2, 3);
        g.place(from, Occupant::Combatant(5), 1).unwrap();

        assert!(g.relocate(5, to, from).unwrap());
        assert!(g.get(from).is_none());
        assert!(g.get(to).unwrap().contains(Occupant::Combatant(5)));
        assert_eq!(g.position_of(5), Some(to));
    }

    #[test]
    fn test_relocate_from_wrong_cell_is_rejected() {
        let mut g = grid();
        g.place(Position::new(1, 1), Occupant::Combatant(5), 1).unwrap();

        // Claimed position has no tile: nothing moves
        let moved = g.relocate(5, Position::new(4, 4), Position::new(8, 8)).unwrap();
        assert!(!moved);
        assert!(g.get(Position::new(1, 1)).is_some());

        // Claimed position is occupied, but not by this combatant
        g.place(Position::new(8, 8), Occupant::Combatant(6), 1).unwrap();
        let moved = g.relocate(5, Position::new(4, 4), Position::new(8, 8)).unwrap();
        assert!(!moved);
        assert_eq!(g.position_of(5), Some(Position::new(1, 1)));
    }

    #[test]
    fn test_set_difficulty_needs_a_tile() {
        let mut g = grid();
        let p = Position::new(2, 2);
        assert!(!g.set_difficulty(p, Fixed::from_num(2)));

        g.place_wall(p).unwrap();
        assert!(g.set_difficulty(p, Fixed::from_num(2)));
        assert_eq!(g.get(p).unwrap().difficulty, Fixed::from_num(2));
    }

    #[test]
    fn test_passability() {
        let mut g = grid();
        assert!(g.is_passable(Position::new(0, 0)));
        assert!(!g.is_passable(Position::new(-1, 0)));
        assert!(!g.is_passable(Position::new(10, 0)));

        g.place_wall(Position::new(3, 3)).unwrap();
        assert!(!g.is_passable(Position::new(3, 3)));

        g.place(Position::new(4, 4), Occupant::Combatant(2), 1).unwrap();
        // Combatants do not block pathing
        assert!(g.is_passable(Position::new(4, 4)));
    }
}

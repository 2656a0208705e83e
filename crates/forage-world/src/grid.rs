//! Bounded 2D occupancy grid for the world.

use forage_core::{EntityId, Error, Position, Result, WorldConfig};
use serde::{Deserialize, Serialize};

/// A bounded grid holding at most one entity per cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: Vec<Option<EntityId>>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        let size = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width,
            height,
            cells: vec![None; size],
        }
    }

    /// Create a grid from world configuration
    pub fn from_config(config: &WorldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.width, config.height))
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.in_bounds(self.width, self.height)
    }

    /// Occupant of a cell; `None` for empty or out-of-bounds cells
    pub fn get(&self, pos: Position) -> Option<EntityId> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells[self.pos_to_index(pos)]
    }

    /// False for occupied and out-of-bounds cells
    pub fn is_empty(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.cells[self.pos_to_index(pos)].is_none()
    }

    /// Place an entity; the cell must be inside the grid and empty.
    pub fn place(&mut self, pos: Position, id: EntityId) -> Result<()> {
        if !self.in_bounds(pos) {
            return Err(Error::OutOfBounds(pos));
        }
        let index = self.pos_to_index(pos);
        if self.cells[index].is_some() {
            return Err(Error::OccupiedCell(pos));
        }
        self.cells[index] = Some(id);
        Ok(())
    }

    /// Empty a cell, returning its previous occupant
    pub fn clear(&mut self, pos: Position) -> Option<EntityId> {
        if !self.in_bounds(pos) {
            return None;
        }
        let index = self.pos_to_index(pos);
        self.cells[index].take()
    }

    /// Relocate the occupant of `from` onto the empty cell `to`.
    pub fn relocate(&mut self, from: Position, to: Position) -> Result<EntityId> {
        if !self.is_empty(to) {
            return Err(Error::InvalidMove { from, to });
        }
        let id = self.clear(from).ok_or(Error::InvalidMove { from, to })?;
        let index = self.pos_to_index(to);
        self.cells[index] = Some(id);
        Ok(id)
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let width = self.width.max(1) as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }

    /// Iterator over all cells with positions, row by row
    pub fn iter(&self) -> impl Iterator<Item = (Position, Option<EntityId>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_to_pos(i), *cell))
    }

    /// Occupants in row-major order
    pub fn occupants(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.cells.iter().filter_map(|cell| *cell)
    }

    /// Empty cells in row-major order
    pub fn empty_positions(&self) -> Vec<Position> {
        self.iter()
            .filter(|(_, cell)| cell.is_none())
            .map(|(pos, _)| pos)
            .collect()
    }
}

/// Cells at exactly Chebyshev distance `radius` from `center`.
///
/// This is the outline of the `(2r+1)` square around the center. Offsets are
/// generated with `dx` in the outer loop and `dy` in the inner loop, each from
/// `-radius` to `radius`; callers that pick the first match rely on that order.
/// No bounds filtering happens here. A radius of 0 yields only the center.
pub fn square_coords_at_radius(center: Position, radius: i32) -> Vec<Position> {
    if radius <= 0 {
        return vec![center];
    }

    let mut ring = Vec::with_capacity(8 * radius as usize);
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            if dx.abs().max(dy.abs()) == radius {
                ring.push(center.add(dx, dy));
            }
        }
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn sorted(mut coords: Vec<Position>) -> Vec<(i32, i32)> {
        coords.sort_by_key(|p| (p.x, p.y));
        coords.into_iter().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10, 10);
        assert_eq!(grid.width, 10);
        assert_eq!(grid.height, 10);
        assert_eq!(grid.cells.len(), 100);
        assert_eq!(grid.empty_positions().len(), 100);
    }

    #[test]
    fn test_index_round_trip_on_wide_grid() {
        let mut grid = Grid::new(40_000, 3);
        let pos = Position::new(39_999, 2);
        grid.place(pos, EntityId(5)).unwrap();

        assert_eq!(grid.get(pos), Some(EntityId(5)));
        assert_eq!(grid.occupants().count(), 1);
        let (found, _) = grid.iter().find(|(_, cell)| cell.is_some()).unwrap();
        assert_eq!(found, pos);
    }

    #[test]
    fn test_from_config_rejects_empty() {
        let config = WorldConfig {
            width: 0,
            height: 10,
        };
        assert!(Grid::from_config(&config).is_err());
    }

    #[test]
    fn test_out_of_bounds_is_not_empty() {
        let grid = Grid::new(10, 10);
        assert!(!grid.is_empty(Position::new(-1, 0)));
        assert!(!grid.is_empty(Position::new(0, 10)));
        assert!(grid.is_empty(Position::new(9, 9)));
        assert_eq!(grid.get(Position::new(-1, -1)), None);
    }

    #[test]
    fn test_place_and_clear() {
        let mut grid = Grid::new(5, 5);
        let pos = Position::new(2, 3);

        grid.place(pos, EntityId(1)).unwrap();
        assert!(!grid.is_empty(pos));
        assert_eq!(grid.get(pos), Some(EntityId(1)));

        let err = grid.place(pos, EntityId(2)).unwrap_err();
        assert!(matches!(err, Error::OccupiedCell(p) if p == pos));
        assert_eq!(grid.get(pos), Some(EntityId(1)));

        assert_eq!(grid.clear(pos), Some(EntityId(1)));
        assert!(grid.is_empty(pos));
        assert_eq!(grid.clear(pos), None);
    }

    #[test]
    fn test_place_out_of_bounds() {
        let mut grid = Grid::new(5, 5);
        let err = grid.place(Position::new(5, 0), EntityId(1)).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds(_)));
    }

    #[test]
    fn test_relocate() {
        let mut grid = Grid::new(5, 5);
        grid.place(Position::new(0, 0), EntityId(1)).unwrap();
        grid.place(Position::new(1, 0), EntityId(2)).unwrap();

        assert!(matches!(
            grid.relocate(Position::new(0, 0), Position::new(1, 0)),
            Err(Error::InvalidMove { .. })
        ));
        assert!(matches!(
            grid.relocate(Position::new(0, 0), Position::new(-1, 0)),
            Err(Error::InvalidMove { .. })
        ));

        assert_eq!(
            grid.relocate(Position::new(0, 0), Position::new(0, 1)).unwrap(),
            EntityId(1)
        );
        assert!(grid.is_empty(Position::new(0, 0)));
        assert_eq!(grid.get(Position::new(0, 1)), Some(EntityId(1)));
    }

    #[test]
    fn test_occupants_row_major() {
        let mut grid = Grid::new(3, 3);
        grid.place(Position::new(2, 0), EntityId(7)).unwrap();
        grid.place(Position::new(0, 1), EntityId(3)).unwrap();
        grid.place(Position::new(1, 0), EntityId(9)).unwrap();

        let order: Vec<_> = grid.occupants().collect();
        assert_eq!(order, vec![EntityId(9), EntityId(7), EntityId(3)]);
    }

    #[test]
    fn test_square_coords_radius_zero() {
        let center = Position::new(4, 4);
        assert_eq!(square_coords_at_radius(center, 0), vec![center]);
    }

    #[test]
    fn test_square_coords_radius_one() {
        let ring = square_coords_at_radius(Position::new(0, 0), 1);
        assert_eq!(
            sorted(ring),
            vec![
                (-1, -1),
                (-1, 0),
                (-1, 1),
                (0, -1),
                (0, 1),
                (1, -1),
                (1, 0),
                (1, 1),
            ]
        );
    }

    #[test]
    fn test_square_coords_radius_two() {
        let ring = square_coords_at_radius(Position::new(0, 0), 2);
        let mut expected = vec![
            (-2, -2),
            (-1, -2),
            (0, -2),
            (1, -2),
            (2, -2),
            (-2, -1),
            (-2, 0),
            (-2, 1),
            (-2, 2),
            (2, -1),
            (2, 0),
            (2, 1),
            (2, 2),
            (-1, 2),
            (0, 2),
            (1, 2),
        ];
        expected.sort();
        assert_eq!(sorted(ring), expected);
    }

    #[test]
    fn test_square_coords_generation_order() {
        let ring = square_coords_at_radius(Position::new(0, 0), 1);
        let order: Vec<_> = ring.into_iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(
            order,
            vec![
                (-1, -1),
                (-1, 0),
                (-1, 1),
                (0, -1),
                (0, 1),
                (1, -1),
                (1, 0),
                (1, 1),
            ]
        );
    }

    #[test]
    fn test_square_coords_not_bounds_filtered() {
        let ring = square_coords_at_radius(Position::new(0, 0), 1);
        assert!(ring.contains(&Position::new(-1, -1)));
    }

    proptest! {
        #[test]
        fn prop_ring_shape(x in -50i32..50, y in -50i32..50, radius in 1i32..8) {
            let center = Position::new(x, y);
            let ring = square_coords_at_radius(center, radius);

            prop_assert_eq!(ring.len(), 8 * radius as usize);
            let unique: HashSet<_> = ring.iter().copied().collect();
            prop_assert_eq!(unique.len(), ring.len());
            for pos in &ring {
                prop_assert_eq!(pos.chebyshev_distance(&center), radius);
            }
        }

        #[test]
        fn prop_place_then_clear(x in 0i32..12, y in 0i32..9) {
            let mut grid = Grid::new(12, 9);
            let pos = Position::new(x, y);

            prop_assert!(grid.is_empty(pos));
            grid.place(pos, EntityId(1)).unwrap();
            prop_assert!(!grid.is_empty(pos));
            prop_assert!(grid.place(pos, EntityId(2)).is_err());
            prop_assert_eq!(grid.get(pos), Some(EntityId(1)));
            grid.clear(pos);
            prop_assert!(grid.is_empty(pos));
        }
    }
}

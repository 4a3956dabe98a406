/// Grid: the static layout of one level, derived from its map at load time.
///
/// ## Invariants
///
///   - Every map cell that is not a wall is in the floor set (target and
///     advance tile included). A cell is never in both sets.
///   - Cells in neither set are `Tile::Void`. Short map rows leave void
///     cells behind them; void is impassable exactly like a wall.
///   - `target` and `advance` are members of the floor set.
///
/// Movement rules only ask `is_passable()`, so "impassable" never depends
/// on row length or on missing-key behaviour.

use std::collections::HashSet;

use super::entity::Position;
use super::tile::Tile;

#[derive(Clone, Debug)]
pub struct Grid {
    walls: HashSet<Position>,
    floor: HashSet<Position>,
    target: Position,
    advance: Position,
    width: usize,
    height: usize,
}

impl Grid {
    pub fn new(
        walls: HashSet<Position>,
        floor: HashSet<Position>,
        target: Position,
        advance: Position,
        width: usize,
        height: usize,
    ) -> Self {
        debug_assert!(floor.contains(&target));
        debug_assert!(floor.contains(&advance));
        debug_assert!(walls.is_disjoint(&floor));
        Grid { walls, floor, target, advance, width, height }
    }

    /// Tile kind at `pos`. Anything outside both sets is `Void`.
    pub fn tile_at(&self, pos: Position) -> Tile {
        if self.walls.contains(&pos) {
            Tile::Wall
        } else if pos == self.target {
            Tile::Target
        } else if pos == self.advance {
            Tile::AdvanceTile
        } else if self.floor.contains(&pos) {
            Tile::Floor
        } else {
            Tile::Void
        }
    }

    #[inline]
    pub fn is_passable(&self, pos: Position) -> bool {
        self.tile_at(pos).is_passable()
    }

    pub fn target(&self) -> Position {
        self.target
    }

    pub fn advance(&self) -> Position {
        self.advance
    }

    /// Width of the widest map row.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> Grid {
        // "#####"
        // "# .W#"
        // "###"   (short row: (3,2) and (4,2) are void)
        let mut walls = HashSet::new();
        let mut floor = HashSet::new();
        for x in 0..5 { walls.insert(Position::new(x, 0)); }
        walls.insert(Position::new(0, 1));
        walls.insert(Position::new(4, 1));
        for x in 0..3 { walls.insert(Position::new(x, 2)); }
        for x in 1..4 { floor.insert(Position::new(x, 1)); }
        Grid::new(walls, floor, Position::new(2, 1), Position::new(3, 1), 5, 3)
    }

    #[test]
    fn tile_kinds() {
        let g = tiny();
        assert_eq!(g.tile_at(Position::new(0, 0)), Tile::Wall);
        assert_eq!(g.tile_at(Position::new(1, 1)), Tile::Floor);
        assert_eq!(g.tile_at(Position::new(2, 1)), Tile::Target);
        assert_eq!(g.tile_at(Position::new(3, 1)), Tile::AdvanceTile);
        assert_eq!(g.tile_at(Position::new(4, 2)), Tile::Void);
        assert_eq!(g.tile_at(Position::new(-1, 0)), Tile::Void);
    }

    #[test]
    fn only_floor_is_passable() {
        let g = tiny();
        assert!(g.is_passable(Position::new(1, 1)));
        assert!(g.is_passable(g.target()));
        assert!(g.is_passable(g.advance()));
        assert!(!g.is_passable(Position::new(0, 1)));
        assert!(!g.is_passable(Position::new(3, 2))); // void behind a short row
        assert!(!g.is_passable(Position::new(9, 9)));
    }
}

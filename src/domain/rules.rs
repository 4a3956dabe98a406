/// Movement and push rules, driven by a truth table.
///
/// Pure functions: given a grid and the two movable positions, decide what
/// a move in some direction would do. Nothing is mutated here; the puzzle
/// state machine applies the result.
///
/// ## Move Truth Table
///
/// ┌───────────────────────────────────────┬──────────┬───────────────────┐
/// │ Condition (priority order)            │ Result   │ Notes             │
/// ├───────────────────────────────────────┼──────────┼───────────────────┤
/// │ dest == box, box dest passable        │ Push     │ box and player    │
/// │ dest == box, box dest wall/void       │ Blocked  │ player stays too  │
/// │ dest passable                         │ Step     │                   │
/// │ dest wall/void                        │ Blocked  │                   │
/// └───────────────────────────────────────┴──────────┴───────────────────┘
///
/// ## Win Table (checked after every accepted move)
///
/// ┌───────────────────────┬──────────────────────────┬──────────────┐
/// │ box == target         │ player == advance tile   │ Complete?    │
/// ├───────────────────────┼──────────────────────────┼──────────────┤
/// │ yes                   │ yes                      │ YES          │
/// │ yes                   │ no                       │ no (waiting) │
/// │ no                    │ any                      │ no           │
/// └───────────────────────┴──────────────────────────┴──────────────┘

use super::entity::{Direction, Position};
use super::grid::Grid;

/// What a move attempt resolves to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Resolution {
    /// Player walks into `player`.
    Step { player: Position },
    /// Player walks into the box's cell, box slides to `box_to`.
    Push { player: Position, box_to: Position },
    Blocked,
}

pub fn resolve_move(grid: &Grid, player: Position, box_pos: Position, dir: Direction) -> Resolution {
    let dest = player.step(dir);

    if dest == box_pos {
        let box_to = box_pos.step(dir);
        return if grid.is_passable(box_to) {
            Resolution::Push { player: dest, box_to }
        } else {
            Resolution::Blocked
        };
    }

    if grid.is_passable(dest) {
        Resolution::Step { player: dest }
    } else {
        Resolution::Blocked
    }
}

#[inline]
pub fn box_on_target(grid: &Grid, box_pos: Position) -> bool {
    box_pos == grid.target()
}

#[inline]
pub fn is_level_complete(grid: &Grid, player: Position, box_pos: Position) -> bool {
    box_on_target(grid, box_pos) && player == grid.advance()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Helper: build a grid from a string diagram.
    /// Legend:  '#'=Wall  ' '=Floor  '.'=Target  'W'=Advance
    ///          'P'=player (floor)  '$'=box (floor)
    fn grid_from(rows: &[&str]) -> (Grid, Position, Position) {
        let mut walls = HashSet::new();
        let mut floor = HashSet::new();
        let (mut player, mut box_pos) = (Position::default(), Position::default());
        let (mut target, mut advance) = (Position::default(), Position::default());
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                match ch {
                    '#' => { walls.insert(pos); continue; }
                    'P' => player = pos,
                    '$' => box_pos = pos,
                    '.' => target = pos,
                    'W' => advance = pos,
                    _ => {}
                }
                floor.insert(pos);
            }
        }
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        (Grid::new(walls, floor, target, advance, width, rows.len()), player, box_pos)
    }

    // ── Steps ──

    #[test]
    fn step_onto_floor() {
        let (g, p, b) = grid_from(&[
            "#######",
            "#P  $.W",
            "#######",
        ]);
        assert_eq!(
            resolve_move(&g, p, b, Direction::Right),
            Resolution::Step { player: Position::new(2, 1) },
        );
    }

    #[test]
    fn step_into_wall_blocked() {
        let (g, p, b) = grid_from(&[
            "#######",
            "#P  $.W",
            "#######",
        ]);
        assert_eq!(resolve_move(&g, p, b, Direction::Left), Resolution::Blocked);
        assert_eq!(resolve_move(&g, p, b, Direction::Up), Resolution::Blocked);
    }

    #[test]
    fn step_into_void_blocked() {
        // (5,2) lies behind the short bottom row: void
        let (g, _, b) = grid_from(&[
            "#######",
            "#$ .W  ",
            "#    ",
        ]);
        let p = Position::new(4, 2);
        assert_eq!(resolve_move(&g, p, b, Direction::Right), Resolution::Blocked);
    }

    // ── Pushes ──

    #[test]
    fn push_onto_floor() {
        let (g, p, b) = grid_from(&[
            "#######",
            "#P$ .W#",
            "#######",
        ]);
        assert_eq!(
            resolve_move(&g, p, b, Direction::Right),
            Resolution::Push { player: Position::new(2, 1), box_to: Position::new(3, 1) },
        );
    }

    #[test]
    fn push_into_wall_blocks_player_too() {
        let (g, p, b) = grid_from(&[
            "#####",
            "#.WP$#",
            "######",
        ]);
        assert_eq!(resolve_move(&g, p, b, Direction::Right), Resolution::Blocked);
    }

    #[test]
    fn push_into_void_blocked() {
        let (g, p, b) = grid_from(&[
            "#####",
            "#.W P$",
            "#####",
        ]);
        // (6,1) is beyond the row: not floor
        assert_eq!(resolve_move(&g, p, b, Direction::Right), Resolution::Blocked);
    }

    #[test]
    fn push_onto_target_and_advance_tile() {
        let (g, p, b) = grid_from(&[
            "#######",
            "# P$.W#",
            "#######",
        ]);
        assert_eq!(
            resolve_move(&g, p, b, Direction::Right),
            Resolution::Push { player: Position::new(3, 1), box_to: Position::new(4, 1) },
        );
        let (g, p, b) = grid_from(&[
            "#######",
            "#. P$W#",
            "#######",
        ]);
        assert_eq!(
            resolve_move(&g, p, b, Direction::Right),
            Resolution::Push { player: Position::new(4, 1), box_to: Position::new(5, 1) },
        );
    }

    // ── Win ──

    #[test]
    fn win_needs_box_on_target_and_player_on_advance() {
        let (g, _, _) = grid_from(&[
            "######",
            "# .W #",
            "######",
        ]);
        let t = g.target();
        let a = g.advance();
        let elsewhere = Position::new(1, 1);
        assert!(is_level_complete(&g, a, t));
        assert!(!is_level_complete(&g, elsewhere, t));
        assert!(!is_level_complete(&g, a, elsewhere));
        assert!(box_on_target(&g, t));
        assert!(!box_on_target(&g, elsewhere));
    }
}

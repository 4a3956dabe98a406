/// Puzzle state machine: one instance per active level.
///
/// Owns the static grid, the mutable puzzle state, the initial state used
/// by reset, and the undo history. Every operation is a pure state
/// transition that reports what happened through its return value and the
/// event list; rejected input is a defined no-op, never an error.
///
/// ## Gating
///
/// Once `level_complete` is set the puzzle is frozen: moves, undo and reset
/// are all ignored until the sequencer loads the next level. The other
/// input windows (move animation, level transition) are gated by `World`,
/// which owns those timers.

use tracing::debug;

use crate::domain::entity::{Direction, Position};
use crate::domain::grid::Grid;
use crate::domain::rules::{self, Resolution};
use super::event::GameEvent;
use super::history::{History, HistoryEntry};
use super::level::ParsedLevel;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PuzzleState {
    pub player: Position,
    pub box_pos: Position,
    pub moves: u32,
    pub pushes: u32,
    pub box_on_target: bool,
    pub level_complete: bool,
}

impl PuzzleState {
    fn initial(player: Position, box_pos: Position) -> Self {
        PuzzleState {
            player,
            box_pos,
            moves: 0,
            pushes: 0,
            box_on_target: false,
            level_complete: false,
        }
    }

    fn snapshot(&self) -> HistoryEntry {
        HistoryEntry {
            player: self.player,
            box_pos: self.box_pos,
            moves: self.moves,
            pushes: self.pushes,
            box_on_target: self.box_on_target,
        }
    }
}

/// Result of `attempt_move`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    Stepped,
    Pushed,
    /// Illegal step or push: nothing changed.
    Blocked,
    /// Input not accepted right now (level finished, animating, transitioning).
    Ignored,
}

impl MoveOutcome {
    pub fn accepted(self) -> bool {
        matches!(self, MoveOutcome::Stepped | MoveOutcome::Pushed)
    }
}

pub struct Puzzle {
    grid: Grid,
    initial: PuzzleState,
    state: PuzzleState,
    history: History,
}

impl Puzzle {
    pub fn new(level: ParsedLevel) -> Self {
        let initial = PuzzleState::initial(level.player_start, level.box_start);
        Puzzle {
            grid: level.grid,
            initial,
            state: initial,
            history: History::new(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> &PuzzleState {
        &self.state
    }

    #[cfg(test)]
    pub fn undo_depth(&self) -> usize {
        self.history.depth()
    }

    pub fn is_complete(&self) -> bool {
        self.state.level_complete
    }

    pub fn attempt_move(&mut self, dir: Direction, events: &mut Vec<GameEvent>) -> MoveOutcome {
        if self.state.level_complete {
            return MoveOutcome::Ignored;
        }

        let before = self.state.snapshot();
        let s = &mut self.state;

        let outcome = match rules::resolve_move(&self.grid, s.player, s.box_pos, dir) {
            Resolution::Blocked => return MoveOutcome::Blocked,
            Resolution::Step { player } => {
                s.player = player;
                s.moves += 1;
                events.push(GameEvent::Stepped);
                MoveOutcome::Stepped
            }
            Resolution::Push { player, box_to } => {
                s.box_pos = box_to;
                s.player = player;
                s.pushes += 1;
                s.moves += 1;
                events.push(GameEvent::Pushed);
                MoveOutcome::Pushed
            }
        };
        self.history.push(before);

        let was_on_target = s.box_on_target;
        s.box_on_target = rules::box_on_target(&self.grid, s.box_pos);
        match (was_on_target, s.box_on_target) {
            (false, true) => events.push(GameEvent::BoxReachedTarget),
            (true, false) => events.push(GameEvent::BoxLeftTarget),
            _ => {}
        }

        // Any ordering completes the level: box placed first and the player
        // walks over later, or both land in the same push.
        if rules::is_level_complete(&self.grid, s.player, s.box_pos) {
            s.level_complete = true;
            events.push(GameEvent::LevelCompleted);
        }

        debug!(
            ?dir, ?outcome,
            player = ?s.player, box_pos = ?s.box_pos,
            moves = s.moves, pushes = s.pushes,
            "move accepted"
        );
        outcome
    }

    /// Restore the most recent snapshot. Returns false when nothing was undone.
    pub fn undo(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if self.state.level_complete {
            return false;
        }
        let entry = match self.history.pop() {
            Some(e) => e,
            None => return false,
        };

        self.state.player = entry.player;
        self.state.box_pos = entry.box_pos;
        self.state.moves = entry.moves;
        self.state.pushes = entry.pushes;
        self.state.box_on_target = entry.box_on_target;
        events.push(GameEvent::Undone);

        debug!(moves = entry.moves, remaining = self.history.depth(), "undo");
        true
    }

    /// Back to the starting layout with an empty history.
    pub fn reset(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if self.state.level_complete {
            return false;
        }
        self.state = self.initial;
        self.history.clear();
        events.push(GameEvent::LevelReset);
        debug!("level reset");
        true
    }
}

/// Keyboard input: drains crossterm events and buffers discrete actions.
///
/// Every Press (and terminal auto-Repeat) of a bound key becomes one
/// `Action`. Actions pile up between ticks and are taken by the game loop
/// at the next tick boundary, so input never mutates state mid-frame.
///
/// Bindings (fixed):
///   Arrows / WASD      →  Move
///   U / Z              →  Undo
///   R                  →  Reset level
///   Enter              →  Restart (all-complete screen)
///   Esc / Q / Ctrl+C   →  Quit

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::{Command, Direction};

/// Anything the shell can do in response to input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Game(Command),
    Restart,
    Quit,
}

pub struct InputState {
    pending: Vec<Action>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { pending: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this every loop iteration; actions accumulate until taken.
    pub fn drain_events(&mut self) {
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                if let Some(action) = map_key(&key) {
                    self.pending.push(action);
                }
            }
        }
    }

    /// Queue an action from another device (gamepad).
    pub fn push(&mut self, action: Action) {
        self.pending.push(action);
    }

    pub fn quit_requested(&self) -> bool {
        self.pending.contains(&Action::Quit)
    }

    /// Everything buffered since the last call, in arrival order.
    pub fn take(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.pending)
    }
}

/// Fixed key binding table.
pub fn map_key(key: &KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Quit),
            _ => None,
        };
    }

    let action = match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Action::Game(Command::Move(Direction::Up)),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Action::Game(Command::Move(Direction::Down)),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Action::Game(Command::Move(Direction::Left)),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Action::Game(Command::Move(Direction::Right)),
        KeyCode::Char('u') | KeyCode::Char('U') | KeyCode::Char('z') | KeyCode::Char('Z') => Action::Game(Command::Undo),
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Game(Command::Reset),
        KeyCode::Enter => Action::Restart,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        _ => return None,
    };
    Some(action)
}

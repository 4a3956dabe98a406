/// Gamepad input tracker using gilrs.
///
/// Fixed mapping, edge-triggered (one action per press):
///   D-pad / Left Stick    →  Move
///   B (East)              →  Undo
///   Start                 →  Reset level / Restart on the all-complete screen
///   Select                →  Quit
///
/// Without the `gamepad` feature this compiles to an inert tracker.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::domain::entity::{Command, Direction};
use super::input::Action;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // D-pad
    dpad_up: BtnState,
    dpad_down: BtnState,
    dpad_left: BtnState,
    dpad_right: BtnState,

    // Stick (digitised)
    stick_up: BtnState,
    stick_down: BtnState,
    stick_left: BtnState,
    stick_right: BtnState,
    stick_x: f32,
    stick_y: f32,

    // Face / menu buttons
    undo: BtnState,
    start: BtnState,
    select: BtnState,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(_) => (None, false),
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            dpad_up: BtnState::default(),
            dpad_down: BtnState::default(),
            dpad_left: BtnState::default(),
            dpad_right: BtnState::default(),
            stick_up: BtnState::default(),
            stick_down: BtnState::default(),
            stick_left: BtnState::default(),
            stick_right: BtnState::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            undo: BtnState::default(),
            start: BtnState::default(),
            select: BtnState::default(),
            connected,
        }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    self.update_axis(axis, value);
                }
                EventType::Connected => { self.connected = true; }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        self.digitise_stick();
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, held: bool) {
        let slot = match btn {
            Button::DPadUp => &mut self.dpad_up,
            Button::DPadDown => &mut self.dpad_down,
            Button::DPadLeft => &mut self.dpad_left,
            Button::DPadRight => &mut self.dpad_right,
            Button::East => &mut self.undo,
            Button::Start => &mut self.start,
            Button::Select => &mut self.select,
            _ => return,
        };
        slot.set(held);
    }

    #[cfg(feature = "gamepad")]
    fn update_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::LeftStickX => self.stick_x = value,
            Axis::LeftStickY => self.stick_y = value,
            _ => {}
        }
    }

    /// Stick past the deadzone counts as a held direction; gilrs Y is up-positive.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn digitise_stick(&mut self) {
        self.stick_left.set(self.stick_x < -STICK_DEADZONE);
        self.stick_right.set(self.stick_x > STICK_DEADZONE);
        self.stick_up.set(self.stick_y > STICK_DEADZONE);
        self.stick_down.set(self.stick_y < -STICK_DEADZONE);
    }

    /// Fresh presses since the last `update`, as shell actions.
    pub fn actions(&self) -> Vec<Action> {
        let mut out = vec![];
        let moves = [
            (Direction::Up, self.dpad_up.just_pressed || self.stick_up.just_pressed),
            (Direction::Down, self.dpad_down.just_pressed || self.stick_down.just_pressed),
            (Direction::Left, self.dpad_left.just_pressed || self.stick_left.just_pressed),
            (Direction::Right, self.dpad_right.just_pressed || self.stick_right.just_pressed),
        ];
        for (dir, pressed) in moves {
            if pressed {
                out.push(Action::Game(Command::Move(dir)));
            }
        }
        if self.undo.just_pressed {
            out.push(Action::Game(Command::Undo));
        }
        if self.start.just_pressed {
            // The shell only honours Restart on the all-complete screen,
            // and the world ignores Reset there.
            out.push(Action::Game(Command::Reset));
            out.push(Action::Restart);
        }
        if self.select.just_pressed {
            out.push(Action::Quit);
        }
        out
    }

    // ── Internal ──

    fn all_mut(&mut self) -> [&mut BtnState; 11] {
        [
            &mut self.dpad_up, &mut self.dpad_down, &mut self.dpad_left, &mut self.dpad_right,
            &mut self.stick_up, &mut self.stick_down, &mut self.stick_left, &mut self.stick_right,
            &mut self.undo, &mut self.start, &mut self.select,
        ]
    }

    fn clear_just_pressed(&mut self) {
        for b in self.all_mut() {
            b.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in self.all_mut() {
            *b = BtnState::default();
        }
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_triggered_press() {
        let mut b = BtnState::default();
        b.set(true);
        assert!(b.just_pressed);
        b.just_pressed = false;
        b.set(true);
        assert!(!b.just_pressed);
        b.set(false);
        b.set(true);
        assert!(b.just_pressed);
    }

    #[test]
    fn stick_maps_to_single_moves() {
        let mut gp = GamepadState::new();
        gp.stick_x = 0.9;
        gp.digitise_stick();
        assert_eq!(gp.actions(), vec![Action::Game(Command::Move(Direction::Right))]);

        // Still held: no repeat
        gp.clear_just_pressed();
        gp.digitise_stick();
        assert!(gp.actions().is_empty());

        gp.stick_x = 0.0;
        gp.stick_y = 0.8;
        gp.clear_just_pressed();
        gp.digitise_stick();
        assert_eq!(gp.actions(), vec![Action::Game(Command::Move(Direction::Up))]);
    }

    #[test]
    fn buttons_map_to_actions() {
        let mut gp = GamepadState::new();
        gp.undo.set(true);
        gp.start.set(true);
        gp.select.set(true);
        assert_eq!(
            gp.actions(),
            vec![
                Action::Game(Command::Undo),
                Action::Game(Command::Reset),
                Action::Restart,
                Action::Quit,
            ],
        );
        gp.release_all();
        assert!(gp.actions().is_empty());
    }
}

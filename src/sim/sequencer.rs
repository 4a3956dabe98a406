/// Level sequencer: which catalog entry is active and whether we are
/// between levels.
///
/// ## Phase Table (evaluated once per tick, after input and timers)
///
/// ┌────────────────┬──────────────────────────┬────────────────────────────┐
/// │ Phase          │ Condition                │ Result                     │
/// ├────────────────┼──────────────────────────┼────────────────────────────┤
/// │ Playing        │ level complete           │ → Transitioning, progress 0│
/// │ Playing        │ otherwise                │ stay                       │
/// │ Transitioning  │ progress + speed < 1     │ stay, progress advances    │
/// │ Transitioning  │ reaches 1, next exists   │ → Playing, load next       │
/// │ Transitioning  │ reaches 1, last level    │ → AllComplete              │
/// │ AllComplete    │ any                      │ stay (restart() only)      │
/// └────────────────┴──────────────────────────┴────────────────────────────┘
///
/// The tick that enters Transitioning does not advance progress, so the
/// overlay always starts from zero.

use tracing::info;

use super::event::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SeqPhase {
    Playing,
    Transitioning,
    AllComplete,
}

/// What the owner must do after `advance`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SeqAction {
    None,
    LoadLevel(usize),
}

#[derive(Clone, Debug)]
pub struct Sequencer {
    index: usize,
    count: usize,
    phase: SeqPhase,
    progress: f32,
    speed: f32,
}

impl Sequencer {
    pub fn new(count: usize, speed: f32) -> Self {
        Sequencer {
            index: 0,
            count,
            phase: SeqPhase::Playing,
            progress: 0.0,
            speed,
        }
    }

    pub fn index(&self) -> usize { self.index }
    pub fn count(&self) -> usize { self.count }
    pub fn phase(&self) -> SeqPhase { self.phase }
    pub fn progress(&self) -> f32 { self.progress }

    pub fn is_last_level(&self) -> bool {
        self.index + 1 >= self.count
    }

    /// One sequencer tick. `level_complete` is the active puzzle's flag.
    pub fn advance(&mut self, level_complete: bool, events: &mut Vec<GameEvent>) -> SeqAction {
        match self.phase {
            SeqPhase::Playing => {
                if level_complete {
                    self.phase = SeqPhase::Transitioning;
                    self.progress = 0.0;
                    info!(level = self.index + 1, "level complete, transitioning");
                }
                SeqAction::None
            }
            SeqPhase::Transitioning => {
                self.progress = (self.progress + self.speed).min(1.0);
                if self.progress < 1.0 {
                    return SeqAction::None;
                }
                if self.is_last_level() {
                    self.phase = SeqPhase::AllComplete;
                    events.push(GameEvent::AllLevelsComplete);
                    info!(levels = self.count, "all levels complete");
                    SeqAction::None
                } else {
                    self.index += 1;
                    self.phase = SeqPhase::Playing;
                    self.progress = 0.0;
                    SeqAction::LoadLevel(self.index)
                }
            }
            SeqPhase::AllComplete => SeqAction::None,
        }
    }

    /// Back to the first level from any phase.
    pub fn restart(&mut self) -> SeqAction {
        self.index = 0;
        self.phase = SeqPhase::Playing;
        self.progress = 0.0;
        info!("sequence restarted");
        SeqAction::LoadLevel(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks_until_action(seq: &mut Sequencer, limit: usize) -> (usize, SeqAction) {
        let mut events = vec![];
        for n in 1..=limit {
            let action = seq.advance(true, &mut events);
            if action != SeqAction::None || seq.phase() == SeqPhase::AllComplete {
                return (n, action);
            }
        }
        (limit, SeqAction::None)
    }

    #[test]
    fn stays_playing_until_complete() {
        let mut seq = Sequencer::new(3, 0.25);
        let mut events = vec![];
        for _ in 0..10 {
            assert_eq!(seq.advance(false, &mut events), SeqAction::None);
        }
        assert_eq!(seq.phase(), SeqPhase::Playing);
        assert_eq!(seq.progress(), 0.0);
    }

    #[test]
    fn entering_transition_does_not_advance_progress() {
        let mut seq = Sequencer::new(3, 0.25);
        let mut events = vec![];
        seq.advance(true, &mut events);
        assert_eq!(seq.phase(), SeqPhase::Transitioning);
        assert_eq!(seq.progress(), 0.0);
        seq.advance(true, &mut events);
        assert_eq!(seq.progress(), 0.25);
    }

    #[test]
    fn transition_loads_next_level_once() {
        let mut seq = Sequencer::new(3, 0.25);
        // 1 tick to enter, 4 ticks of 0.25 to reach 1
        let (n, action) = ticks_until_action(&mut seq, 100);
        assert_eq!(n, 5);
        assert_eq!(action, SeqAction::LoadLevel(1));
        assert_eq!(seq.index(), 1);
        assert_eq!(seq.phase(), SeqPhase::Playing);
        assert_eq!(seq.progress(), 0.0);

        let mut events = vec![];
        assert_eq!(seq.advance(false, &mut events), SeqAction::None);
        assert_eq!(seq.index(), 1);
    }

    #[test]
    fn progress_is_monotonic_and_bounded() {
        let mut seq = Sequencer::new(2, 0.3);
        let mut events = vec![];
        seq.advance(true, &mut events);
        let mut last = seq.progress();
        while seq.phase() == SeqPhase::Transitioning {
            seq.advance(true, &mut events);
            if seq.phase() == SeqPhase::Transitioning {
                assert!(seq.progress() > last);
                assert!(seq.progress() <= 1.0);
                last = seq.progress();
            }
        }
        assert_eq!(seq.index(), 1);
    }

    #[test]
    fn last_level_ends_in_all_complete() {
        let mut seq = Sequencer::new(1, 0.5);
        let mut events = vec![];
        seq.advance(true, &mut events);
        seq.advance(true, &mut events);
        assert_eq!(seq.phase(), SeqPhase::Transitioning);
        assert_eq!(seq.advance(true, &mut events), SeqAction::None);
        assert_eq!(seq.phase(), SeqPhase::AllComplete);
        assert_eq!(events, vec![GameEvent::AllLevelsComplete]);

        // terminal
        for _ in 0..5 {
            assert_eq!(seq.advance(true, &mut events), SeqAction::None);
        }
        assert_eq!(events.len(), 1);
        assert_eq!(seq.index(), 0);
    }

    #[test]
    fn restart_returns_to_first_level() {
        let mut seq = Sequencer::new(2, 1.0);
        let mut events = vec![];
        for _ in 0..4 {
            seq.advance(true, &mut events);
        }
        assert_eq!(seq.phase(), SeqPhase::AllComplete);
        assert_eq!(seq.restart(), SeqAction::LoadLevel(0));
        assert_eq!(seq.index(), 0);
        assert_eq!(seq.phase(), SeqPhase::Playing);
    }
}

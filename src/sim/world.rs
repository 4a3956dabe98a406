/// WorldState: everything a running game owns.
///
/// ## Ownership
///
///   - `catalog`   : level definitions, read once at startup. Never mutated.
///   - `sequencer` : active level index and transition progress.
///   - `puzzle`    : the active level's state machine. Replaced on load.
///   - `anim` / `particles` : visual timers, read by the renderer.
///
/// ## Input gating
///
/// The three mutators (`attempt_move`, `undo`, `reset`) are the only entry
/// points for player input. They are no-ops outside `SeqPhase::Playing`.
/// Moves are additionally ignored while the slide animation is running;
/// undo and reset are allowed and cancel it.

use tracing::info;

use crate::config::{EffectsConfig, GameConfig};
use crate::domain::entity::Direction;
use super::anim::{BurstKind, MoveAnimation, ParticleSystem};
use super::event::GameEvent;
use super::level::{self, LevelDef, LoadError};
use super::puzzle::{MoveOutcome, Puzzle};
use super::sequencer::{SeqAction, SeqPhase, Sequencer};

pub struct WorldState {
    // ── Levels ──
    pub catalog: Vec<LevelDef>,
    pub sequencer: Sequencer,
    pub puzzle: Puzzle,

    // ── Visual timers ──
    pub anim: MoveAnimation,
    pub particles: ParticleSystem,
    pub effects: EffectsConfig,

    // ── Meta ──
    pub tick: u64,
}

// ── Construction / level loading ──

impl WorldState {
    /// Start at the first catalog entry.
    pub fn new(catalog: Vec<LevelDef>, config: &GameConfig) -> Result<Self, LoadError> {
        let first = catalog.first().ok_or(LoadError::NoSuchLevel { level: 0 })?;
        let puzzle = Puzzle::new(level::parse_level(first, 0)?);
        info!(level = 1, name = %first.name, "level loaded");

        Ok(WorldState {
            sequencer: Sequencer::new(catalog.len(), config.speed.transition_speed),
            catalog,
            puzzle,
            anim: MoveAnimation::new(config.speed.move_anim_speed),
            particles: ParticleSystem::new(),
            effects: config.effects.clone(),
            tick: 0,
        })
    }

    /// Replace the active puzzle with a fresh parse of catalog entry `index`.
    pub fn load_level(&mut self, index: usize, events: &mut Vec<GameEvent>) -> Result<(), LoadError> {
        let def = self.catalog.get(index).ok_or(LoadError::NoSuchLevel { level: index })?;
        self.puzzle = Puzzle::new(level::parse_level(def, index)?);
        self.anim.cancel();
        self.particles.clear();
        events.push(GameEvent::LevelLoaded { index });
        info!(level = index + 1, name = %def.name, "level loaded");
        Ok(())
    }

    /// Start the whole sequence over from the first level.
    pub fn restart(&mut self, events: &mut Vec<GameEvent>) -> Result<(), LoadError> {
        match self.sequencer.restart() {
            SeqAction::LoadLevel(index) => self.load_level(index, events),
            SeqAction::None => Ok(()),
        }
    }

    /// The catalog entry the sequencer points at. The sequencer is sized
    /// from the catalog, so its index is always in range.
    pub fn level_def(&self) -> &LevelDef {
        &self.catalog[self.sequencer.index()]
    }

    pub fn phase(&self) -> SeqPhase {
        self.sequencer.phase()
    }
}

// ── Gated input ──

impl WorldState {
    pub fn attempt_move(&mut self, dir: Direction, events: &mut Vec<GameEvent>) -> MoveOutcome {
        if self.phase() != SeqPhase::Playing || self.anim.is_active() {
            return MoveOutcome::Ignored;
        }
        let outcome = self.puzzle.attempt_move(dir, events);
        if outcome.accepted() {
            self.anim.start(dir, outcome == MoveOutcome::Pushed);
        }
        outcome
    }

    pub fn undo(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if self.phase() != SeqPhase::Playing {
            return false;
        }
        let undone = self.puzzle.undo(events);
        if undone {
            self.anim.cancel();
        }
        undone
    }

    pub fn reset(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if self.phase() != SeqPhase::Playing {
            return false;
        }
        let reset = self.puzzle.reset(events);
        if reset {
            self.anim.cancel();
        }
        reset
    }
}

// ── Effects ──

impl WorldState {
    /// Spawn particle bursts for this tick's puzzle events.
    pub fn spawn_effects(&mut self, events: &[GameEvent]) {
        if !self.effects.particles {
            return;
        }
        for ev in events {
            match ev {
                GameEvent::BoxReachedTarget => self.particles.spawn_burst(
                    self.puzzle.grid().target(),
                    BurstKind::Success,
                    self.effects.success_particles,
                    self.effects.success_life,
                ),
                GameEvent::LevelCompleted => self.particles.spawn_burst(
                    self.puzzle.grid().advance(),
                    BurstKind::Transition,
                    self.effects.transition_particles,
                    self.effects.transition_life,
                ),
                _ => {}
            }
        }
    }
}

/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Buffered commands (move / undo / reset), in arrival order
///   2. Effect spawning for this tick's puzzle events
///   3. Timer updates (slide animation, particles)
///   4. Level sequencer (transition start / progress / next level)
///
/// The renderer reads the world after `step` returns, so a move that
/// completes a level shows up in the same frame as the transition start.
///
/// A next level that fails to parse is returned as an error; the world is
/// left mid-sequence and the shell must stop.

use tracing::error;

use crate::domain::entity::Command;
use super::event::GameEvent;
use super::level::LoadError;
use super::sequencer::SeqAction;
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, commands: &[Command]) -> Result<Vec<GameEvent>, LoadError> {
    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    resolve_commands(world, commands, &mut events);
    world.spawn_effects(&events);
    resolve_timers(world);
    resolve_sequencer(world, &mut events)?;

    Ok(events)
}

// ══════════════════════════════════════════════════════════════
// Phases
// ══════════════════════════════════════════════════════════════

fn resolve_commands(world: &mut WorldState, commands: &[Command], events: &mut Vec<GameEvent>) {
    for &cmd in commands {
        match cmd {
            Command::Move(dir) => { world.attempt_move(dir, events); }
            Command::Undo => { world.undo(events); }
            Command::Reset => { world.reset(events); }
        }
    }
}

fn resolve_timers(world: &mut WorldState) {
    world.anim.tick();
    world.particles.update();
}

fn resolve_sequencer(world: &mut WorldState, events: &mut Vec<GameEvent>) -> Result<(), LoadError> {
    let complete = world.puzzle.is_complete();
    if let SeqAction::LoadLevel(index) = world.sequencer.advance(complete, events) {
        world.load_level(index, events).map_err(|e| {
            error!(%e, "level load failed");
            e
        })?;
    }
    Ok(())
}

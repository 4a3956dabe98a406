/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use sim::event::GameEvent;
use sim::level::load_catalog;
use sim::sequencer::SeqPhase;
use sim::step;
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::{Action, InputState};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    init_tracing(&config.log_file);
    for warning in &config.warnings {
        warn!(%warning, "config fallback");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "=== Sokoban Journey startup ===");

    let catalog = match load_catalog(&config) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "level catalog rejected");
            eprintln!("Level catalog error: {e}");
            std::process::exit(1);
        }
    };

    let mut world = match WorldState::new(catalog, &config) {
        Ok(w) => w,
        Err(e) => {
            error!(error = %e, "first level failed to load");
            eprintln!("Level error: {e}");
            std::process::exit(1);
        }
    };

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!(error = %e, "game loop aborted");
        eprintln!("Game error: {e}");
    }

    info!(level = world.sequencer.index() + 1, "shutdown");
    println!();
    println!("Thanks for playing Sokoban Journey!");
    if world.phase() == SeqPhase::AllComplete {
        println!("All {} levels complete.", world.sequencer.count());
    } else {
        println!("Reached level {}/{}.", world.sequencer.index() + 1, world.sequencer.count());
    }
}

/// Log to a file: the terminal belongs to the renderer.
/// If the file can't be opened, logging stays off.
fn init_tracing(path: &Path) {
    let file = match File::create(path) {
        Ok(f) => f,
        Err(_) => return,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    if gp.connected {
        info!("gamepad connected");
    }
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    loop {
        // Poll every iteration; actions wait in the buffer for the next tick
        kb.drain_events();
        gp.update();
        for action in gp.actions() {
            kb.push(action);
        }

        if kb.quit_requested() {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            let mut commands = vec![];
            let mut shell_events = vec![];
            for action in kb.take() {
                match action {
                    Action::Game(cmd) => commands.push(cmd),
                    Action::Restart if world.phase() == SeqPhase::AllComplete => {
                        commands.clear();
                        world.restart(&mut shell_events)?;
                    }
                    Action::Restart | Action::Quit => {}
                }
            }

            let events = step::step(world, &commands)?;
            process_sound_events(sound, &shell_events);
            process_sound_events(sound, &events);

            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::Stepped => sfx.play_step(),
            GameEvent::Pushed => sfx.play_push(),
            GameEvent::BoxReachedTarget => sfx.play_target(),
            GameEvent::Undone | GameEvent::LevelReset => sfx.play_undo(),
            GameEvent::LevelCompleted => sfx.play_clear(),
            GameEvent::AllLevelsComplete => sfx.play_all_complete(),
            GameEvent::BoxLeftTarget | GameEvent::LevelLoaded { .. } => {}
        }
    }
}

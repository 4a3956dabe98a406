/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Problems are collected in `warnings` and logged once tracing is up,
/// since the log file itself is configured here.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub effects: EffectsConfig,
    /// Level pack replacing the built-in catalog.
    pub levels_file: Option<PathBuf>,
    pub log_file: PathBuf,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub move_anim_speed: f32,    // progress per tick, (0, 1]
    pub transition_speed: f32,   // progress per tick, (0, 1]
}

#[derive(Clone, Debug)]
pub struct EffectsConfig {
    pub particles: bool,
    pub success_particles: u32,
    pub success_life: u32,
    pub transition_particles: u32,
    pub transition_life: u32,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    effects: TomlEffects,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_move_anim_speed")]
    move_anim_speed: f32,
    #[serde(default = "default_transition_speed")]
    transition_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlEffects {
    #[serde(default = "default_particles")]
    particles: bool,
    #[serde(default = "default_success_particles")]
    success_particles: u32,
    #[serde(default = "default_success_life")]
    success_life: u32,
    #[serde(default = "default_transition_particles")]
    transition_particles: u32,
    #[serde(default = "default_transition_life")]
    transition_life: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    levels_file: String,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }            // ~60 ticks per second
fn default_move_anim_speed() -> f32 { 0.25 }    // 4 ticks per slide
fn default_transition_speed() -> f32 { 0.02 }   // 50 ticks per transition
fn default_particles() -> bool { true }
fn default_success_particles() -> u32 { 30 }
fn default_success_life() -> u32 { 60 }
fn default_transition_particles() -> u32 { 50 }
fn default_transition_life() -> u32 { 80 }
fn default_log_file() -> String { "sokojourney.log".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            move_anim_speed: default_move_anim_speed(),
            transition_speed: default_transition_speed(),
        }
    }
}

impl Default for TomlEffects {
    fn default() -> Self {
        TomlEffects {
            particles: default_particles(),
            success_particles: default_success_particles(),
            success_life: default_success_life(),
            transition_particles: default_transition_particles(),
            transition_life: default_transition_life(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_file: String::new(),
            log_file: default_log_file(),
        }
    }
}

#[cfg(test)]
impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = vec![];
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        let mut cfg = GameConfig::from_toml(toml_cfg, &search_dirs);
        warnings.append(&mut cfg.warnings);
        cfg.warnings = warnings;
        cfg
    }

    /// Parse config text directly (no file search, relative paths kept as-is).
    #[cfg(test)]
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(toml_cfg, &[]))
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let mut warnings = vec![];

        let move_anim_speed = clamp_speed(
            "move_anim_speed", toml_cfg.speed.move_anim_speed, default_move_anim_speed(), &mut warnings,
        );
        let transition_speed = clamp_speed(
            "transition_speed", toml_cfg.speed.transition_speed, default_transition_speed(), &mut warnings,
        );
        let tick_rate_ms = if toml_cfg.speed.tick_rate_ms == 0 {
            warnings.push("tick_rate_ms = 0, using default".into());
            default_tick_rate()
        } else {
            toml_cfg.speed.tick_rate_ms
        };

        // Resolve the level pack: absolute, or the first candidate dir that has it
        let levels_str = toml_cfg.general.levels_file.trim();
        let levels_file = if levels_str.is_empty() {
            None
        } else if PathBuf::from(levels_str).is_absolute() {
            Some(PathBuf::from(levels_str))
        } else {
            Some(
                search_dirs.iter()
                    .map(|d| d.join(levels_str))
                    .find(|p| p.is_file())
                    .unwrap_or_else(|| PathBuf::from(levels_str)),
            )
        };

        GameConfig {
            speed: SpeedConfig { tick_rate_ms, move_anim_speed, transition_speed },
            effects: EffectsConfig {
                particles: toml_cfg.effects.particles,
                success_particles: toml_cfg.effects.success_particles,
                success_life: toml_cfg.effects.success_life,
                transition_particles: toml_cfg.effects.transition_particles,
                transition_life: toml_cfg.effects.transition_life,
            },
            levels_file,
            log_file: PathBuf::from(toml_cfg.general.log_file),
            warnings,
        }
    }
}

/// Speeds must lie in (0, 1]; anything <= 0 (or NaN) would stall a timer forever.
fn clamp_speed(key: &str, value: f32, default: f32, warnings: &mut Vec<String>) -> f32 {
    if value.is_nan() || value <= 0.0 {
        warnings.push(format!("{key} = {value} is not positive, using {default}"));
        default
    } else if value > 1.0 {
        warnings.push(format!("{key} = {value} exceeds 1, clamped"));
        1.0
    } else {
        value
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/sokojourney");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/sokojourney");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warnings.push(format!("{} parse error, using defaults: {e}", path.display()));
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warnings.push(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.speed.tick_rate_ms, 16);
        assert_eq!(cfg.speed.move_anim_speed, 0.25);
        assert_eq!(cfg.speed.transition_speed, 0.02);
        assert!(cfg.effects.particles);
        assert_eq!(cfg.effects.success_particles, 30);
        assert_eq!(cfg.effects.success_life, 60);
        assert_eq!(cfg.effects.transition_particles, 50);
        assert_eq!(cfg.effects.transition_life, 80);
        assert_eq!(cfg.levels_file, None);
        assert_eq!(cfg.log_file, PathBuf::from("sokojourney.log"));
        assert!(cfg.warnings.is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[speed]\ntransition_speed = 0.05\n\n[effects]\nparticles = false\n",
        ).unwrap();
        assert_eq!(cfg.speed.transition_speed, 0.05);
        assert_eq!(cfg.speed.move_anim_speed, 0.25);
        assert!(!cfg.effects.particles);
        assert_eq!(cfg.effects.success_particles, 30);
    }

    #[test]
    fn general_section_paths() {
        let cfg = GameConfig::from_toml_str(
            "[general]\nlevels_file = \"/opt/packs/hard.txt\"\nlog_file = \"/tmp/soko.log\"\n",
        ).unwrap();
        assert_eq!(cfg.levels_file, Some(PathBuf::from("/opt/packs/hard.txt")));
        assert_eq!(cfg.log_file, PathBuf::from("/tmp/soko.log"));

        let cfg = GameConfig::from_toml_str("[general]\nlevels_file = \"  \"\n").unwrap();
        assert_eq!(cfg.levels_file, None);
    }

    #[test]
    fn speeds_are_clamped() {
        let cfg = GameConfig::from_toml_str(
            "[speed]\nmove_anim_speed = 0.0\ntransition_speed = 3.0\ntick_rate_ms = 0\n",
        ).unwrap();
        assert_eq!(cfg.speed.move_anim_speed, 0.25);
        assert_eq!(cfg.speed.transition_speed, 1.0);
        assert_eq!(cfg.speed.tick_rate_ms, 16);
        assert_eq!(cfg.warnings.len(), 3);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(GameConfig::from_toml_str("[speed\ntick_rate_ms = ").is_err());
        assert!(GameConfig::from_toml_str("[speed]\ntick_rate_ms = \"fast\"\n").is_err());
    }
}

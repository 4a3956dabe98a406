/// Level catalog and parser.
///
/// ## Sources (priority order):
///   1. Level pack file named by `levels_file` in config.toml
///   2. Built-in embedded levels
///
/// The catalog is read once at startup and never mutated afterwards.
///
/// ## Pack format:
///   ```text
///   ## Pack Name
///   ---
///   # Level Name
///   > Description
///   <map rows>
///   ---
///   # Next Level
///   <map rows>
///   ```
///
/// Levels are separated by a line containing only `---`.
/// Lines before the first `---` are pack metadata and are skipped.
///
/// ## Tile legend:
///   '#' = Wall            ' ' = Floor
///   'P' = Player start    '$' = Box start
///   '.' = Target          'W' = Advance tile
///
/// Rows may be shorter than the widest row. The missing cells are void,
/// so rows are never padded.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::domain::entity::Position;
use crate::domain::grid::Grid;

/// Every character a map row may contain.
const MAP_SYMBOLS: &str = "#P$.W ";

/// One level as authored. Immutable once loaded.
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub description: String,
    pub rows: Vec<String>,
}

/// Parser output: the static grid plus the starting positions.
#[derive(Clone, Debug)]
pub struct ParsedLevel {
    pub grid: Grid,
    pub player_start: Position,
    pub box_start: Position,
}

/// A malformed level definition. These are authoring mistakes in the
/// catalog and abort startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("level {level}: map has no rows")]
    EmptyMap { level: usize },
    #[error("level {level}: missing required symbol '{symbol}'")]
    MissingSymbol { level: usize, symbol: char },
    #[error("level {level}: symbol '{symbol}' appears more than once (again at column {x}, row {y})")]
    DuplicateSymbol { level: usize, symbol: char, x: i32, y: i32 },
    #[error("level {level}: unknown symbol '{symbol}' at column {x}, row {y}")]
    UnknownSymbol { level: usize, symbol: char, x: i32, y: i32 },
    #[error("level {level} is not in the catalog")]
    NoSuchLevel { level: usize },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read level pack {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("level pack {path} contains no levels")]
    EmptyPack { path: PathBuf },
    #[error(transparent)]
    Level(#[from] LoadError),
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load the catalog and check every level once.
/// Any malformed level is reported with its index.
pub fn load_catalog(config: &GameConfig) -> Result<Vec<LevelDef>, CatalogError> {
    let levels = match &config.levels_file {
        Some(path) => load_pack_file(path)?,
        None => embedded_levels(),
    };

    for (index, def) in levels.iter().enumerate() {
        parse_level(def, index)?;
    }

    info!(count = levels.len(), "level catalog loaded");
    Ok(levels)
}

/// Convert one map into a grid plus the starting positions.
pub fn parse_level(def: &LevelDef, level: usize) -> Result<ParsedLevel, LoadError> {
    if def.rows.is_empty() {
        return Err(LoadError::EmptyMap { level });
    }

    let mut walls = HashSet::new();
    let mut floor = HashSet::new();
    let mut player = None;
    let mut box_pos = None;
    let mut target = None;
    let mut advance = None;

    for (y, row) in def.rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            let pos = Position::new(x as i32, y as i32);
            let slot = match ch {
                '#' => {
                    walls.insert(pos);
                    continue;
                }
                ' ' => None,
                'P' => Some(&mut player),
                '$' => Some(&mut box_pos),
                '.' => Some(&mut target),
                'W' => Some(&mut advance),
                other => {
                    return Err(LoadError::UnknownSymbol { level, symbol: other, x: pos.x, y: pos.y });
                }
            };
            if let Some(slot) = slot {
                if slot.is_some() {
                    return Err(LoadError::DuplicateSymbol { level, symbol: ch, x: pos.x, y: pos.y });
                }
                *slot = Some(pos);
            }
            floor.insert(pos);
        }
    }

    let require = |found: Option<Position>, symbol: char| {
        found.ok_or(LoadError::MissingSymbol { level, symbol })
    };
    let player_start = require(player, 'P')?;
    let box_start = require(box_pos, '$')?;
    let target = require(target, '.')?;
    let advance = require(advance, 'W')?;

    let width = def.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    let height = def.rows.len();

    debug!(level, width, height, "level parsed");

    Ok(ParsedLevel {
        grid: Grid::new(walls, floor, target, advance, width, height),
        player_start,
        box_start,
    })
}

// ══════════════════════════════════════════════════════════════
// Pack parsing
// ══════════════════════════════════════════════════════════════

fn load_pack_file(path: &Path) -> Result<Vec<LevelDef>, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let levels = parse_pack_levels(&content);
    if levels.is_empty() {
        return Err(CatalogError::EmptyPack { path: path.to_path_buf() });
    }
    info!(path = %path.display(), count = levels.len(), "level pack read");
    Ok(levels)
}

/// Parse all levels from a pack file.
fn parse_pack_levels(content: &str) -> Vec<LevelDef> {
    let mut levels = vec![];
    let mut current_section = String::new();
    let mut in_levels = false;

    for line in content.lines() {
        if line.trim() == "---" {
            // Flush previous section as a level
            if in_levels && !current_section.is_empty() {
                if let Some(def) = parse_level_section(&current_section) {
                    levels.push(def);
                }
            }
            current_section.clear();
            in_levels = true;
            continue;
        }

        if !in_levels {
            // Skip pack metadata lines before first ---
            continue;
        }

        current_section.push_str(line);
        current_section.push('\n');
    }

    // Flush last section
    if !current_section.is_empty() {
        if let Some(def) = parse_level_section(&current_section) {
            levels.push(def);
        }
    }

    levels
}

/// Parse a single level section. Returns None when it has no map rows.
fn parse_level_section(content: &str) -> Option<LevelDef> {
    let mut name = String::new();
    let mut description = String::new();
    let mut rows: Vec<String> = vec![];

    for line in content.lines() {
        if rows.is_empty() && name.is_empty() && is_name_line(line) {
            name = line[2..].trim().to_string();
        } else if rows.is_empty() && line.starts_with('>') {
            description = line[1..].trim().to_string();
        } else if rows.is_empty() && line.trim().is_empty() {
            // blank lines before the map
        } else {
            rows.push(line.trim_end_matches('\r').to_string());
        }
    }

    while rows.last().is_some_and(|r| r.trim().is_empty()) {
        rows.pop();
    }

    if rows.is_empty() {
        return None;
    }

    if name.is_empty() {
        name = "Unnamed Level".to_string();
    }

    Some(LevelDef { name, description, rows })
}

/// Distinguish `# Level Name` from map data such as `#P$.W#` or `# P$.W`.
/// A name is `# ` followed by text that is not made of map symbols only.
/// Only checked before the first map row.
fn is_name_line(line: &str) -> bool {
    let text = match line.strip_prefix("# ") {
        Some(rest) => rest.trim(),
        None => return false,
    };
    !text.is_empty() && !text.chars().all(|c| MAP_SYMBOLS.contains(c))
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("First Push", "Learn to push the box", &[
            "##############",
            "##           #",
            "# P$         #",
            "#            #",
            "#   ######   #",
            "#            #",
            "#   ######   #",
            "#            #",
            "#          .W#",
            "##############",
        ]),
        make_embedded("Detour", "Find another way", &[
            "###############",
            "##            #",
            "# P$          #",
            "#       ##### #",
            "#       #     #",
            "#  ######  ####",
            "#             #",
            "#  #########  #",
            "#           .W#",
            "###############",
        ]),
        make_embedded("Dead End", "Avoid the corners!", &[
            "################",
            "##             #",
            "# P$    ####   #",
            "#       #      #",
            "#  ######   ####",
            "#           #  #",
            "#  ######   #  #",
            "#       #      #",
            "#  #####    # .#",
            "#           # W#",
            "################",
        ]),
        make_embedded("U-Turn", "Master the turns", &[
            "#################",
            "##              #",
            "# P$            #",
            "#  ############ #",
            "#            #  #",
            "############ #  #",
            "#               #",
            "#  ###########  #",
            "#             # #",
            "#  #########  #.#",
            "#          #  #W#",
            "#################",
        ]),
        make_embedded("Labyrinth", "Navigate carefully", &[
            "##################",
            "##               #",
            "# P$       ##### #",
            "#   ####       # #",
            "# #    # ##### # #",
            "# # ##       # # #",
            "# # #  ##### #   #",
            "# #       #  # # #",
            "#   ##### # ## # #",
            "# #     # #    #.#",
            "# ##### # #### #W#",
            "##################",
        ]),
        make_embedded("The Gauntlet", "Think 10 steps ahead", &[
            "#####################",
            "##                  #",
            "# P$   #####   #### #",
            "#   # #    #      # #",
            "# # # # ## # #### # #",
            "# # #   #  #    # # #",
            "# # ##### ## ## # # #",
            "# #       #  #  #   #",
            "# ####### # ## #### #",
            "#         #       #.#",
            "#  ############## #W#",
            "#####################",
        ]),
        make_embedded("NIGHTMARE", "Only for masters!", &[
            "########################",
            "##                     #",
            "# P$    ####   ####    #",
            "#    # #   # #    #    #",
            "# ## # # # # # ## # ####",
            "# #  #   # # #  # #    #",
            "# # ##### # #### # ##  #",
            "# #     # #    #     # #",
            "# ##### # #### ##### # #",
            "#     # #    #     # # #",
            "# ### # #### # ### # # #",
            "#   #        #   # #  .#",
            "# # ############ # # #W#",
            "########################",
        ]),
    ]
}

fn make_embedded(name: &str, description: &str, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        description: description.to_string(),
        rows: map.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(rows: &[&str]) -> LevelDef {
        make_embedded("Test", "", rows)
    }

    #[test]
    fn embedded_catalog_is_well_formed() {
        let levels = embedded_levels();
        assert_eq!(levels.len(), 7);
        for (i, level) in levels.iter().enumerate() {
            assert!(parse_level(level, i).is_ok(), "level {} ({}) failed", i, level.name);
        }
    }

    #[test]
    fn first_push_positions() {
        let levels = embedded_levels();
        assert_eq!(levels[0].name, "First Push");
        let parsed = parse_level(&levels[0], 0).unwrap();
        assert_eq!(parsed.player_start, Position::new(2, 2));
        assert_eq!(parsed.box_start, Position::new(3, 2));
        assert_eq!(parsed.grid.target(), Position::new(11, 8));
        assert_eq!(parsed.grid.advance(), Position::new(12, 8));
        assert_eq!(parsed.grid.width(), 14);
        assert_eq!(parsed.grid.height(), 10);
    }

    #[test]
    fn markers_are_floor() {
        let parsed = parse_level(&def(&["#P$.W#"]), 0).unwrap();
        for x in 1..5 {
            assert!(parsed.grid.is_passable(Position::new(x, 0)));
        }
        assert!(!parsed.grid.is_passable(Position::new(0, 0)));
        assert!(!parsed.grid.is_passable(Position::new(5, 0)));
    }

    #[test]
    fn short_rows_leave_void() {
        let parsed = parse_level(&def(&[
            "#######",
            "#P$.W #",
            "# #",
        ]), 0).unwrap();
        assert!(parsed.grid.is_passable(Position::new(1, 2)));
        assert!(!parsed.grid.is_passable(Position::new(3, 2)));
        assert!(!parsed.grid.is_passable(Position::new(5, 2)));
        assert_eq!(parsed.grid.width(), 7);
    }

    #[test]
    fn missing_symbols_reported_with_level_index() {
        assert_eq!(
            parse_level(&def(&["# $.W#"]), 3).unwrap_err(),
            LoadError::MissingSymbol { level: 3, symbol: 'P' },
        );
        assert_eq!(
            parse_level(&def(&["#P .W#"]), 1).unwrap_err(),
            LoadError::MissingSymbol { level: 1, symbol: '$' },
        );
        assert_eq!(
            parse_level(&def(&["#P$ W#"]), 0).unwrap_err(),
            LoadError::MissingSymbol { level: 0, symbol: '.' },
        );
        assert_eq!(
            parse_level(&def(&["#P$. #"]), 0).unwrap_err(),
            LoadError::MissingSymbol { level: 0, symbol: 'W' },
        );
    }

    #[test]
    fn duplicate_and_unknown_symbols_rejected() {
        assert_eq!(
            parse_level(&def(&["#P$.W$#"]), 2).unwrap_err(),
            LoadError::DuplicateSymbol { level: 2, symbol: '$', x: 5, y: 0 },
        );
        assert_eq!(
            parse_level(&def(&["#P$.W#", "#  X #"]), 4).unwrap_err(),
            LoadError::UnknownSymbol { level: 4, symbol: 'X', x: 3, y: 1 },
        );
        assert_eq!(parse_level(&def(&[]), 5).unwrap_err(), LoadError::EmptyMap { level: 5 });
    }

    #[test]
    fn pack_sections_parse() {
        let pack = "## My Pack\n\
                    ---\n\
                    # Warmup\n\
                    > Just push\n\
                    #######\n\
                    #P$.W #\n\
                    #######\n\
                    \n\
                    ---\n\
                    #####\n\
                    #P$.W\n";
        let levels = parse_pack_levels(pack);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].name, "Warmup");
        assert_eq!(levels[0].description, "Just push");
        assert_eq!(levels[0].rows.len(), 3);
        assert_eq!(levels[1].name, "Unnamed Level");
        assert_eq!(levels[1].rows, vec!["#####", "#P$.W"]);
        assert!(parse_level(&levels[0], 0).is_ok());
        assert!(parse_level(&levels[1], 1).is_ok());
    }

    #[test]
    fn map_row_with_letters_is_not_a_name() {
        let levels = parse_pack_levels("---\n#####\n#P$.W\n");
        assert_eq!(levels[0].name, "Unnamed Level");
        assert_eq!(levels[0].rows[1], "#P$.W");
    }

    #[test]
    fn nameless_section_keeps_first_row_with_markers() {
        let levels = parse_pack_levels("---\n#P$.W#\n");
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].name, "Unnamed Level");
        assert_eq!(levels[0].rows, vec!["#P$.W#"]);
        assert!(parse_level(&levels[0], 0).is_ok());

        let levels = parse_pack_levels("---\n# P$.W#\n#    #\n");
        assert_eq!(levels[0].name, "Unnamed Level");
        assert_eq!(levels[0].rows, vec!["# P$.W#", "#    #"]);
        assert!(parse_level(&levels[0], 0).is_ok());
    }

    #[test]
    fn names_without_letters_are_names() {
        let levels = parse_pack_levels("---\n# 1\n#P$.W#\n");
        assert_eq!(levels[0].name, "1");
        assert_eq!(levels[0].rows, vec!["#P$.W#"]);
        assert!(!is_name_line("#Warmup"));
        assert!(!is_name_line("# "));
        assert!(is_name_line("# Push It"));
    }

    #[test]
    fn pack_without_levels_is_empty() {
        assert!(parse_pack_levels("## Only metadata\n").is_empty());
    }
}

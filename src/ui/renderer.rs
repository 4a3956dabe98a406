/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only reads the world. Glows, slides and particles are
/// derived from the tick counter and the visual timers.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::Position;
use crate::domain::tile::Tile;
use crate::sim::anim::BurstKind;
use crate::sim::sequencer::SeqPhase;
use crate::sim::world::WorldState;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit background for every "empty" terminal cell, so the gap
    /// between rows never shows the terminal's own default colour.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 4],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel used to invalidate the back buffer (forces a full repaint).
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn from_char_wide(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::from_char(c, fg, bg);
        cell.wide = true;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }

    /// Write a string horizontally centred on row `y`.
    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        let x = self.width.saturating_sub(len) / 2;
        self.put_str(x, y, s, fg, bg);
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }
}

// ── Layout / palette ──

/// Each game cell = 2 terminal columns.
const CELL_W: usize = 2;

const TITLE_ROW: usize = 0;
const LEVEL_ROW: usize = 1;
const DESC_ROW: usize = 2;
const MAP_ROW: usize = 4;
/// Rows below the map: gap, objective, gap, help.
const FOOTER_ROWS: usize = 4;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const WALL_FG: Color = Color::Rgb { r: 90, g: 95, b: 130 };
const FLOOR_BG: Color = Color::Rgb { r: 34, g: 34, b: 50 };
const TARGET_DIM: (u8, u8, u8) = (120, 90, 20);
const TARGET_BRIGHT: (u8, u8, u8) = (255, 210, 60);
const ADVANCE_DIM: (u8, u8, u8) = (20, 90, 110);
const ADVANCE_BRIGHT: (u8, u8, u8) = (80, 230, 255);
const BOX_FG: Color = Color::Rgb { r: 200, g: 140, b: 70 };
const BOX_DONE_FG: Color = Color::Rgb { r: 90, g: 240, b: 120 };
const BASE_RGB: (u8, u8, u8) = (22, 22, 35);

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<(SeqPhase, usize)>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // New level or new screen: clean repaint
        let screen = (world.phase(), world.sequencer.index());
        if self.last_screen != Some(screen) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_screen = Some(screen);
        }

        self.front.clear();

        match world.phase() {
            SeqPhase::Playing => self.compose_game(world),
            SeqPhase::Transitioning => {
                self.compose_game(world);
                self.compose_transition_overlay(world);
            }
            SeqPhase::AllComplete => self.compose_all_complete(world),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colours; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: playing screen ──

    /// Top-left terminal cell of the map, centred in the space between HUD and footer.
    fn map_origin(&self, w: &WorldState) -> (usize, usize) {
        let grid = w.puzzle.grid();
        let x = self.term_w.saturating_sub(grid.width() * CELL_W) / 2;
        let avail = self.term_h.saturating_sub(MAP_ROW + FOOTER_ROWS);
        let y = MAP_ROW + avail.saturating_sub(grid.height()) / 2;
        (x, y)
    }

    fn compose_game(&mut self, w: &WorldState) {
        let (ox, oy) = self.map_origin(w);
        self.compose_hud(w);
        self.compose_map(w, ox, oy);
        self.compose_movables(w, ox, oy);
        self.compose_particles(w, ox, oy);

        // ── Objective + help ──
        let below = oy + w.puzzle.grid().height() + 1;
        let state = w.puzzle.state();
        let objective = objective_text(state.box_on_target);
        let color = if state.box_on_target { BOX_DONE_FG } else { Color::Rgb { r: 200, g: 200, b: 220 } };
        self.front.put_centered(below, objective, color, Color::Reset);

        let help = " Arrows/WASD: Move   U/Z: Undo   R: Reset   Esc/Q: Quit  │  Pad: B Undo  Start Reset ";
        let help_row = self.term_h.saturating_sub(1).max(below + 2);
        self.front.put_centered(help_row, help, Color::DarkGrey, Color::Reset);
    }

    fn compose_hud(&mut self, w: &WorldState) {
        let def = w.level_def();
        let state = w.puzzle.state();

        self.front.fill_row(TITLE_ROW, HUD_BG);
        self.front.put_str(1, TITLE_ROW, "SOKOBAN JOURNEY", Color::Rgb { r: 255, g: 220, b: 80 }, HUD_BG);
        let counters = format!("Moves: {:<5} Pushes: {:<5}", state.moves, state.pushes);
        let cx = self.term_w.saturating_sub(counters.chars().count() + 1);
        self.front.put_str(cx, TITLE_ROW, &counters, Color::White, HUD_BG);

        let level = format!(
            "Level {}/{}: {}",
            w.sequencer.index() + 1, w.sequencer.count(), def.name,
        );
        self.front.put_centered(LEVEL_ROW, &level, Color::White, Color::Reset);
        if !def.description.is_empty() {
            self.front.put_centered(DESC_ROW, &def.description, Color::Grey, Color::Reset);
        }
    }

    fn compose_map(&mut self, w: &WorldState, ox: usize, oy: usize) {
        let grid = w.puzzle.grid();
        let glow = pulse(w.tick);
        let box_on_target = w.puzzle.state().box_on_target;

        for gy in 0..grid.height() {
            for gx in 0..grid.width() {
                let col = ox + gx * CELL_W;
                let row = oy + gy;
                let (c0, c1, fg, bg) = match grid.tile_at(Position::new(gx as i32, gy as i32)) {
                    Tile::Void => continue,
                    Tile::Wall => ('█', '█', WALL_FG, Color::Reset),
                    Tile::Floor => (' ', ' ', Color::White, FLOOR_BG),
                    Tile::Target => ('[', ']', lerp_rgb(TARGET_DIM, TARGET_BRIGHT, glow), FLOOR_BG),
                    Tile::AdvanceTile => {
                        // Brighter once the box is in place
                        let t = if box_on_target { glow } else { glow * 0.3 };
                        ('<', '>', lerp_rgb(ADVANCE_DIM, ADVANCE_BRIGHT, t), FLOOR_BG)
                    }
                };
                self.front.set(col, row, Cell::from_char(c0, fg, bg));
                self.front.set(col + 1, row, Cell::from_char(c1, fg, bg));
            }
        }
    }

    /// Box and player, each offset along the slide while the animation runs.
    fn compose_movables(&mut self, w: &WorldState, ox: usize, oy: usize) {
        let state = w.puzzle.state();
        let (lag_x, lag_y) = w.anim.lag();
        let slide = sprite_offset(lag_x, lag_y);

        let box_slide = if w.anim.box_moved() { slide } else { (0, 0) };
        let box_fg = if state.box_on_target { BOX_DONE_FG } else { BOX_FG };
        if let Some((col, row)) = screen_pos(state.box_pos, box_slide, ox, oy) {
            self.front.set(col, row, Cell::from_char('▐', box_fg, FLOOR_BG));
            self.front.set(col + 1, row, Cell::from_char('▌', box_fg, FLOOR_BG));
        }

        if let Some((col, row)) = screen_pos(state.player, slide, ox, oy) {
            self.front.set(col, row, Cell::from_char_wide('🧍', Color::Reset, FLOOR_BG));
            self.front.set(col + 1, row, Cell::WIDE_CONT);
        }
    }

    fn compose_particles(&mut self, w: &WorldState, ox: usize, oy: usize) {
        for p in w.particles.iter() {
            let col = ox as f32 + p.x * CELL_W as f32;
            let row = oy as f32 + p.y;
            if col < 0.0 || row < 0.0 {
                continue;
            }
            let (col, row) = (col as usize, row as usize);
            let under = self.front.get(col, row);
            if col >= self.term_w || row >= self.term_h || under.cont || under.wide {
                continue;
            }
            let (ch, rgb) = match p.kind {
                BurstKind::Success => ('✦', TARGET_BRIGHT),
                BurstKind::Transition => ('✧', ADVANCE_BRIGHT),
            };
            self.front.set(col, row, Cell::from_char(ch, lerp_rgb(BASE_RGB, rgb, p.fade()), under.bg));
        }
    }

    // ── Compose: overlays / end screen ──

    fn compose_transition_overlay(&mut self, w: &WorldState) {
        let progress = w.sequencer.progress();
        if progress < 0.3 {
            return;
        }
        let t = ((progress - 0.3) / 0.7).min(1.0);
        let text = overlay_text(w.sequencer.is_last_level());
        let pad = " ".repeat(text.chars().count() + 6);
        let mid = self.term_h / 2;
        let bg = lerp_rgb(BASE_RGB, (30, 60, 40), t);
        let fg = lerp_rgb(BASE_RGB, (255, 255, 255), t);
        self.front.put_centered(mid.saturating_sub(1), &pad, fg, bg);
        self.front.put_centered(mid, &format!("   {text}   "), fg, bg);
        self.front.put_centered(mid + 1, &pad, fg, bg);
    }

    fn compose_all_complete(&mut self, w: &WorldState) {
        let art = [
            "╔══════════════════════════════════════╗",
            "║      ★  ALL LEVELS COMPLETE!  ★      ║",
            "╚══════════════════════════════════════╝",
        ];
        let top = (self.term_h / 2).saturating_sub(4);
        for (i, line) in art.iter().enumerate() {
            self.front.put_centered(top + i, line, Color::Rgb { r: 255, g: 220, b: 50 }, Color::Reset);
        }
        let levels = format!("You pushed through all {} levels.", w.sequencer.count());
        self.front.put_centered(top + 4, &levels, BOX_DONE_FG, Color::Reset);
        self.front.put_centered(top + 6, "▸ ENTER / Start: Play again    ESC / Q: Quit", Color::White, Color::Reset);
    }
}

// ── Pure helpers ──

/// 0..1 glow wave, one cycle every ~60 ticks.
fn pulse(tick: u64) -> f32 {
    let phase = (tick % 60) as f32 / 60.0 * std::f32::consts::TAU;
    (phase.sin() + 1.0) / 2.0
}

fn lerp_rgb(from: (u8, u8, u8), to: (u8, u8, u8), t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Color::Rgb { r: mix(from.0, to.0), g: mix(from.1, to.1), b: mix(from.2, to.2) }
}

/// Slide lag in cells → terminal (columns, rows).
fn sprite_offset(lag_x: f32, lag_y: f32) -> (i32, i32) {
    ((lag_x * CELL_W as f32).round() as i32, lag_y.round() as i32)
}

fn screen_pos(pos: Position, offset: (i32, i32), ox: usize, oy: usize) -> Option<(usize, usize)> {
    let col = ox as i32 + pos.x * CELL_W as i32 + offset.0;
    let row = oy as i32 + pos.y + offset.1;
    if col < 0 || row < 0 { None } else { Some((col as usize, row as usize)) }
}

fn objective_text(box_on_target: bool) -> &'static str {
    if box_on_target {
        "Box placed! Now step on the advance tile"
    } else {
        "Push the box onto the target"
    }
}

fn overlay_text(last_level: bool) -> &'static str {
    if last_level { "All Levels Complete!" } else { "Level Complete!" }
}

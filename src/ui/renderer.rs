/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into the `front` buffer
///   2. Compare each screen cell with the `back` buffer (previous frame)
///   3. Only emit terminal commands for screen cells that changed
///   4. Batch everything with `queue!` and flush once at the end
///   5. Swap front/back
///
/// The Coordinator calls `draw` after every applied proposal, so a frame is
/// only ever composed from a fully consistent World.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::cell::Cell;
use crate::sim::coordinator::View;
use crate::sim::world::{Phase, World, COINS_TO_WIN};

// ── ScreenCell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct ScreenCell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl ScreenCell {
    /// Explicit background for every terminal cell, so row gaps match.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: ScreenCell = ScreenCell { ch: ' ', fg: Color::White, bg: ScreenCell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: ScreenCell = ScreenCell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        ScreenCell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of ScreenCells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<ScreenCell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![ScreenCell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![ScreenCell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(ScreenCell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: ScreenCell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> ScreenCell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            ScreenCell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, ScreenCell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, ScreenCell::new(' ', Color::White, bg));
        }
    }
}

// ── Layout ──

/// Each game cell takes 2 terminal columns (glyph + padding) so the map
/// keeps a roughly square aspect.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const STATUS_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

fn palette(cell: Cell) -> (Color, Color) {
    match cell {
        Cell::Character => (Color::Rgb { r: 255, g: 230, b: 80 }, Color::Reset),
        Cell::Wall => (Color::Rgb { r: 150, g: 150, b: 150 }, Color::Rgb { r: 70, g: 70, b: 70 }),
        Cell::Vegetation => (Color::Rgb { r: 60, g: 200, b: 90 }, Color::Reset),
        Cell::Empty => (Color::White, Color::Reset),
        Cell::Enemy => (Color::Rgb { r: 255, g: 70, b: 70 }, Color::Reset),
        Cell::Coin => (Color::Rgb { r: 255, g: 200, b: 0 }, Color::Reset),
        Cell::ButtonEngaged => (Color::Rgb { r: 100, g: 200, b: 255 }, Color::Reset),
        Cell::ButtonDisengaged => (Color::DarkGrey, Color::Reset),
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(ScreenCell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.front.resize(tw as usize, th as usize);
        self.back.resize(tw as usize, th as usize);
        // Force a full repaint on the first frame.
        self.back.cells.fill(ScreenCell::INVALID);
        Ok(())
    }

    pub fn render(&mut self, world: &World) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.front.width || th as usize != self.front.height {
            self.front.resize(tw as usize, th as usize);
            self.back.resize(tw as usize, th as usize);
            self.back.cells.fill(ScreenCell::INVALID);
            queue!(self.writer, SetBackgroundColor(ScreenCell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change: clean repaint for the overlay.
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(ScreenCell::INVALID);
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        compose(&mut self.front, world);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = ScreenCell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl View for Renderer {
    fn draw(&mut self, world: &World) -> io::Result<()> {
        self.render(world)
    }
}

/// Restore the terminal. Safe to call whether or not `init` succeeded.
pub fn cleanup() -> io::Result<()> {
    let mut out = io::stdout();
    execute!(out, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()
}

// ── Compose: build front buffer content ──

fn compose(buf: &mut FrameBuffer, w: &World) {
    // HUD
    let phase = match w.phase {
        Phase::Playing => "",
        Phase::Won => "WON",
        Phase::Lost => "LOST",
    };
    let hud = format!(" $ Coins: {}/{COINS_TO_WIN}   {phase}", w.coins_collected);
    buf.fill_row(HUD_ROW, HUD_BG);
    buf.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

    // Map
    for (gy, row) in w.grid.rows().iter().enumerate() {
        let y = MAP_ROW + gy;
        if y >= buf.height {
            break;
        }
        for (gx, &cell) in row.iter().enumerate() {
            let (fg, bg) = palette(cell);
            buf.set(gx * CELL_W, y, ScreenCell::new(cell.glyph(), fg, bg));
            buf.set(gx * CELL_W + 1, y, ScreenCell::new(' ', fg, bg));
        }
    }

    // Status
    let status_row = MAP_ROW + w.grid.height() + 1;
    if !w.status.is_empty() {
        buf.fill_row(status_row, STATUS_BG);
        buf.put_str(0, status_row, &format!(" {} ", w.status), Color::Black, STATUS_BG);
    }

    // Help
    let help = " Arrows/WASD: Move   Esc/Q: Quit";
    buf.put_str(0, status_row + 2, help, Color::DarkGrey, Color::Reset);

    if w.phase.is_over() {
        compose_game_over(buf, w);
    }
}

fn compose_game_over(buf: &mut FrameBuffer, w: &World) {
    let (title, color) = match w.phase {
        Phase::Won => ("★  YOU WIN!  ★", Color::Rgb { r: 255, g: 220, b: 50 }),
        _ => ("✕  GAME OVER  ✕", Color::Rgb { r: 255, g: 60, b: 60 }),
    };
    let lines = [
        "╔════════════════════════╗".to_string(),
        format!("║{:^24}║", title),
        format!("║{:^24}║", format!("Coins: {}/{COINS_TO_WIN}", w.coins_collected)),
        format!("║{:^24}║", "Press Esc to exit"),
        "╚════════════════════════╝".to_string(),
    ];

    let map_cols = w.grid.width() * CELL_W;
    let x = map_cols.saturating_sub(26) / 2;
    let y = MAP_ROW + w.grid.height().saturating_sub(lines.len()) / 2;
    for (i, line) in lines.iter().enumerate() {
        buf.put_str(x, y + i, line, color, Color::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::parse_map;

    fn row_text(buf: &FrameBuffer, y: usize) -> String {
        (0..buf.width).map(|x| buf.get(x, y).ch).collect::<String>().trim_end().to_string()
    }

    #[test]
    fn map_glyphs_land_on_even_columns() {
        let w = parse_map(&["☺▤$", "☠♣○"]).expect("spawn");
        let mut buf = FrameBuffer::new(40, 12);
        compose(&mut buf, &w);
        assert_eq!(row_text(&buf, MAP_ROW), "☺ ▤ $");
        assert_eq!(row_text(&buf, MAP_ROW + 1), "☠ ♣ ○");
        assert!(row_text(&buf, HUD_ROW).contains("Coins: 0/5"));
    }

    #[test]
    fn status_line_sits_below_the_map() {
        let mut w = parse_map(&["☺ "]).expect("spawn");
        w.set_status("hello");
        let mut buf = FrameBuffer::new(40, 12);
        compose(&mut buf, &w);
        assert_eq!(row_text(&buf, MAP_ROW + 2), " hello");
    }

    #[test]
    fn terminal_phase_shows_exit_hint() {
        let mut w = parse_map(&["☺               ", "                ", "                ", "                ", "                "]).expect("spawn");
        w.lose(&mut vec![]);
        let mut buf = FrameBuffer::new(60, 16);
        compose(&mut buf, &w);
        let all: String = (0..buf.height).map(|y| row_text(&buf, y)).collect::<Vec<_>>().join("\n");
        assert!(all.contains("GAME OVER"), "{all}");
        assert!(all.contains("Press Esc to exit"), "{all}");
    }

    #[test]
    fn clipped_when_terminal_is_small() {
        let w = parse_map(&["☺      ", "       ", "       "]).expect("spawn");
        let mut buf = FrameBuffer::new(4, 3);
        compose(&mut buf, &w);
        assert_eq!(row_text(&buf, MAP_ROW), "☺");
    }
}

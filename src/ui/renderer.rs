/// Console screen: HUD strip, scrollback tail and ending banner.
///
/// Each frame is composed into a cell grid and compared against the grid
/// shown last time. The slow writer changes a handful of characters per
/// frame, so only those cells, the ticking clock and the blinking alert are
/// sent to the terminal, batched with `queue!` and flushed once.
///
/// The hardware cursor is placed on the terminal view's cursor while the
/// console accepts input, and hidden otherwise.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo, SetCursorStyle},
    queue,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::countdown::format_clock;
use crate::domain::terminal::TerminalView;
use crate::sim::clock::Clock;
use crate::sim::game::{Game, GameEnding, GameState};
use super::intro::IntroPlayer;

// ── Cell ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 4, g: 10, b: 6 };
    const TEXT_FG: Color = Color::Rgb { r: 60, g: 255, b: 110 };

    const BLANK: Cell = Cell { ch: ' ', fg: Cell::TEXT_FG, bg: Cell::BASE_BG };

    /// Never drawn; forces a full repaint after a resize or screen change.
    const INVALID: Cell = Cell { ch: '\u{0}', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── Screen grid ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
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

    fn invalidate(&mut self) {
        self.cells.fill(Cell::INVALID);
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

    /// Console text is single-width; anything past the right edge is clipped.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Cell::TEXT_FG, bg));
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.put_str(x, y, s, fg, bg);
    }
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const CONSOLE_ROW: usize = 2;
const CONSOLE_COL: usize = 1;

const HUD_BG: Color = Color::Rgb { r: 10, g: 50, b: 20 };
const ALERT_FG: Color = Color::Rgb { r: 255, g: 70, b: 70 };
const DIM_FG: Color = Color::Rgb { r: 30, g: 120, b: 60 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_state: Option<GameState>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_state: None,
        }
    }

    /// Prepare the (already acquired) screen for the first frame.
    pub fn init(&mut self) -> io::Result<()> {
        queue!(
            self.writer,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All),
            SetCursorStyle::BlinkingBlock
        )?;
        self.writer.flush()?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.invalidate();
        Ok(())
    }

    pub fn render<C: Clock>(&mut self, game: &Game<C>, intro: &IntroPlayer, now: u64) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.invalidate();
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // State change → full repaint
        if self.last_state != Some(game.state()) {
            self.back.invalidate();
            self.last_state = Some(game.state());
        }

        self.front.clear();
        let cursor = match game.state() {
            GameState::Intro => {
                self.compose_intro(intro, now);
                None
            }
            GameState::Console | GameState::ConsoleLocked => self.compose_console(game, now),
        };

        self.flush_diff()?;

        match cursor {
            Some((x, y)) => queue!(self.writer, MoveTo(x, y), cursor::Show)?,
            None => queue!(self.writer, cursor::Hide)?,
        }
        self.writer.flush()?;

        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Flush ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let (mut fg, mut bg) = (Cell::TEXT_FG, Cell::BASE_BG);
        // Where the terminal cursor sits after the last Print, if known.
        let mut at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(fg), SetBackgroundColor(bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != fg {
                    fg = cell.fg;
                    queue!(self.writer, SetForegroundColor(fg))?;
                }
                if cell.bg != bg {
                    bg = cell.bg;
                    queue!(self.writer, SetBackgroundColor(bg))?;
                }
                queue!(self.writer, Print(cell.ch))?;
                at = Some((x + 1, y));
            }
        }
        Ok(())
    }

    // ── Compose ──

    fn compose_intro(&mut self, intro: &IntroPlayer, now: u64) {
        let lines = intro.lines();
        let visible = intro.visible_lines(now);
        let top = self.front.height.saturating_sub(lines.len()) / 2;

        for (i, line) in lines.iter().take(visible).enumerate() {
            // First line is the title
            let fg = if i == 0 { Color::White } else { Cell::TEXT_FG };
            self.front.put_centered(top + i, line, fg, Cell::BASE_BG);
        }

        if intro.is_skippable() && self.front.height > 0 {
            let hint = " Press ENTER to skip ";
            self.front.put_str(0, self.front.height - 1, hint, DIM_FG, Cell::BASE_BG);
        }
    }

    /// Returns where the hardware cursor should go, if anywhere.
    fn compose_console<C: Clock>(&mut self, game: &Game<C>, now: u64) -> Option<(u16, u16)> {
        self.compose_hud(game, now);

        let view = game.view()?;
        let area_h = self.front.height.saturating_sub(CONSOLE_ROW);
        let first = view.row_count().saturating_sub(area_h);
        self.compose_rows(view, first);

        if game.ending() != GameEnding::None && game.is_output_idle() {
            self.compose_ending(game.ending(), now);
        }

        if game.is_locked() {
            return None;
        }
        let (row, col) = view.cursor();
        let y = CONSOLE_ROW + row.checked_sub(first)?;
        let x = CONSOLE_COL + col;
        if x >= self.front.width || y >= self.front.height {
            return None;
        }
        Some((x as u16, y as u16))
    }

    fn compose_hud<C: Clock>(&mut self, game: &Game<C>, now: u64) {
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(1, HUD_ROW, "MAINFRAME ACCESS TERMINAL", Color::White, HUD_BG);

        let remaining = game.countdown().remaining();
        let blink = (now / 500) % 2 == 0;
        let clock = format_clock(remaining);
        let clock_fg = match remaining {
            0..=9 if !game.is_locked() && blink => HUD_BG,
            0..=29 => ALERT_FG,
            _ => Color::White,
        };
        let attempts = format!("ATTEMPTS {}", game.attempts());

        let clock_x = self.front.width.saturating_sub(clock.len() + 1);
        let attempts_x = clock_x.saturating_sub(attempts.len() + 4);
        self.front.put_str(attempts_x, HUD_ROW, &attempts, Color::White, HUD_BG);
        self.front.put_str(clock_x, HUD_ROW, &clock, clock_fg, HUD_BG);
    }

    fn compose_rows(&mut self, view: &TerminalView, first: usize) {
        for (i, row) in view.rows().skip(first).enumerate() {
            let y = CONSOLE_ROW + i;
            if y >= self.front.height {
                break;
            }
            for (j, &ch) in row.iter().enumerate() {
                self.front.set(CONSOLE_COL + j, y, Cell::new(ch, Cell::TEXT_FG, Cell::BASE_BG));
            }
        }
    }

    fn compose_ending(&mut self, ending: GameEnding, now: u64) {
        let (title, fg, bg) = match ending {
            GameEnding::Success => (
                "ACCESS GRANTED",
                Color::Rgb { r: 10, g: 20, b: 10 },
                Color::Rgb { r: 60, g: 255, b: 110 },
            ),
            GameEnding::Fail => (
                "SYSTEM LOCKED",
                Color::White,
                Color::Rgb { r: 170, g: 20, b: 20 },
            ),
            GameEnding::None => return,
        };

        let inner = format!("   {title}   ");
        let pad = " ".repeat(inner.chars().count());
        let mid = self.front.height / 2;
        let shown = (now / 700) % 2 == 0;
        let label = if shown { inner.as_str() } else { pad.as_str() };
        self.front.put_centered(mid.saturating_sub(1), &pad, fg, bg);
        self.front.put_centered(mid, label, fg, bg);
        self.front.put_centered(mid + 1, &pad, fg, bg);
    }
}

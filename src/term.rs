use crate::TermInt;
use crate::game::{Screen, Terminal};
use std::{io::{self, Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, KeyEventKind, read, poll};

/// Owns stdout while the game runs. The playing field is drawn inside a
/// border anchored at the top-left corner, messages go on the row below it.
pub struct TermManager {
    stdout: Stdout,
    viewport: (TermInt, TermInt),
    frame_rows: TermInt,
    // Set from the first setup command until a successful restore
    active: bool,
}

impl TermManager {
    /// `viewport` is the size of the field including its border.
    pub fn new(viewport: (TermInt, TermInt)) -> Self {
        TermManager {
            stdout: stdout(),
            viewport,
            frame_rows: 0,
            active: false,
        }
    }

    pub fn get_terminal_size(&self) -> io::Result<(TermInt, TermInt)> {
        terminal::size()
    }

    /// Waits up to `timeout` for a key press. Releases, repeats and
    /// non-key events are swallowed and reported as `None`.
    pub fn poll_key(&self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if !poll(timeout)? {
            return Ok(None);
        }

        match read()? {
            Event::Key(ev) if ev.kind == KeyEventKind::Press => Ok(Some(ev)),
            _ => Ok(None),
        }
    }

    pub fn draw_borders(&mut self) -> io::Result<()> {
        let (width, height) = self.viewport;
        let end_x = width - 1;
        let end_y = height - 1;

        for x in 0..width {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.print_at((x, 0), ch)?;
            self.print_at((x, end_y), ch)?;
        }

        for y in 1..end_y {
            self.print_at((0, y), '|')?;
            self.print_at((end_x, y), '|')?;
        }

        self.flush()
    }

    pub fn print_at(&mut self, pos: (TermInt, TermInt), ch: char) -> io::Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))
    }

    pub fn print_line_at(&mut self, pos: (TermInt, TermInt), line: &str) -> io::Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(line))
    }

    pub fn clear(&mut self) -> io::Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

impl Terminal for TermManager {
    fn setup(&mut self) -> io::Result<()> {
        log::debug!("entering alternate screen");
        self.active = true;
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        self.clear()
    }

    fn restore(&mut self) -> io::Result<()> {
        log::debug!("leaving alternate screen");
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)?;
        self.active = false;
        Ok(())
    }
}

// Covers panics and early returns that skipped `restore`
impl Drop for TermManager {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = self.restore() {
                log::error!("could not restore the terminal: {}", e);
            }
        }
    }
}

impl Screen for TermManager {
    fn draw_frame(&mut self, frame: &str) -> io::Result<()> {
        let mut rows: TermInt = 0;

        for line in frame.lines() {
            rows += 1;
            self.print_line_at((1, rows), line)?;
        }
        self.frame_rows = rows;

        self.flush()
    }

    fn show_game_over(&mut self, message: &str) -> io::Result<()> {
        // Row right below the bottom border
        let y = self.viewport.1.max(self.frame_rows + 2);
        self.print_line_at((0, y), message)?;
        self.flush()
    }
}

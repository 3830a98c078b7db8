// src/display/terminal.rs
//! Crossterm-backed terminal regions
//!
//! Presentation glue only: fixed layout, no scheduling logic. Each region is
//! handed to exactly one task, which owns all writes into it.

use crate::display::{DisplaySink, Style};
use crate::error::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

const CLOCK_ROW: u16 = 3;
const SPEED_ROW: u16 = 6;
const POSITION_ROW: u16 = 9;
const VALUE_COL: u16 = 4;

/// Terminal setup guard. Raw mode and the alternate screen are restored in
/// `Drop`, so teardown happens on every exit path.
pub struct TerminalUi {
    _private: (),
}

impl TerminalUi {
    /// Enter raw mode, switch to the alternate screen and draw the static
    /// chrome.
    pub fn init() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide, DisableLineWrap)?;

        let ui = Self { _private: () };
        ui.draw_chrome()?;
        Ok(ui)
    }

    fn draw_chrome(&self) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Clear(ClearType::All),
            MoveTo(0, 0),
            SetForegroundColor(Color::Green),
            Print("INSTRUMENT CLUSTER"),
            MoveTo(0, 1),
            Print("press q to quit"),
            SetForegroundColor(Color::DarkGrey),
            MoveTo(2, CLOCK_ROW - 1),
            Print("Clock"),
            MoveTo(2, SPEED_ROW - 1),
            Print("Speed [kn]"),
            MoveTo(2, POSITION_ROW - 1),
            Print("Position"),
            ResetColor
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn clock_region(&self) -> Region {
        Region::new(CLOCK_ROW, VALUE_COL, 1)
    }

    pub fn speed_region(&self) -> Region {
        Region::new(SPEED_ROW, VALUE_COL, 1)
    }

    pub fn position_region(&self) -> Region {
        Region::new(POSITION_ROW, VALUE_COL, 3)
    }
}

impl Drop for TerminalUi {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, Show, EnableLineWrap, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// A fixed slice of terminal rows acting as one [`DisplaySink`].
///
/// Every write renders into a local buffer first and hits stdout as a single
/// syscall, so concurrently ticking tasks cannot interleave escape
/// sequences.
pub struct Region {
    row: u16,
    col: u16,
    rows: u16,
}

impl Region {
    fn new(row: u16, col: u16, rows: u16) -> Self {
        Self { row, col, rows }
    }

    fn clear_rows(&self, buf: &mut Vec<u8>) -> Result<()> {
        for i in 0..self.rows {
            queue!(buf, MoveTo(self.col, self.row + i), Clear(ClearType::UntilNewLine))?;
        }
        Ok(())
    }
}

impl DisplaySink for Region {
    fn reset(&mut self) {
        let mut buf = Vec::new();
        if self.clear_rows(&mut buf).is_ok() {
            let mut stdout = io::stdout();
            let _ = stdout.write_all(&buf);
            let _ = stdout.flush();
        }
    }

    fn write(&mut self, content: &str, style: Style) -> Result<()> {
        let mut buf = Vec::new();
        self.clear_rows(&mut buf)?;

        if let Some(fg) = style.fg {
            queue!(buf, SetForegroundColor(fg))?;
        }
        if let Some(bg) = style.bg {
            queue!(buf, SetBackgroundColor(bg))?;
        }

        // Extra lines beyond the region's extent are dropped, not wrapped.
        for (i, line) in content.lines().take(self.rows as usize).enumerate() {
            queue!(buf, MoveTo(self.col, self.row + i as u16), Print(line))?;
        }
        queue!(buf, ResetColor)?;

        let mut stdout = io::stdout();
        stdout.write_all(&buf)?;
        stdout.flush()?;
        Ok(())
    }
}

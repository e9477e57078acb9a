//! Raw-mode terminal backed by crossterm.

use super::Terminal;
use crate::error::{Result, ShellError};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::{cursor, execute, queue, terminal};
use std::io::{self, Stdout, Write};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Interactive terminal on stdout.
///
/// Raw mode is enabled on construction and restored on drop.
pub struct CrosstermTerminal {
    out: Stdout,
    /// Timeout for polling events; bounds how long a stop request waits.
    tick_rate: Duration,
    cursor_visible: bool,
}

impl CrosstermTerminal {
    /// Enters raw mode with the default tick rate.
    pub fn new() -> Result<Self> {
        Self::with_tick_rate(Duration::from_millis(100))
    }

    /// Enters raw mode with a custom tick rate.
    pub fn with_tick_rate(tick_rate: Duration) -> Result<Self> {
        terminal::enable_raw_mode()
            .map_err(|e| ShellError::terminal(format!("Failed to enable raw mode: {e}")))?;
        Ok(Self {
            out: io::stdout(),
            tick_rate,
            cursor_visible: true,
        })
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show, ResetColor);
        let _ = terminal::disable_raw_mode();
    }
}

impl Terminal for CrosstermTerminal {
    fn cursor_position(&mut self) -> Result<(u16, u16)> {
        cursor::position()
            .map_err(|e| ShellError::terminal(format!("Failed to query cursor position: {e}")))
    }

    fn set_cursor_position(&mut self, col: u16, row: u16) -> Result<()> {
        execute!(self.out, cursor::MoveTo(col, row))
            .map_err(|e| ShellError::terminal(format!("Failed to move cursor: {e}")))
    }

    fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
            .map_err(|e| ShellError::terminal(format!("Failed to query terminal size: {e}")))
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        if visible {
            execute!(self.out, cursor::Show)?;
        } else {
            execute!(self.out, cursor::Hide)?;
        }
        self.cursor_visible = visible;
        Ok(())
    }

    fn is_cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    fn write(&mut self, text: &str) -> Result<()> {
        // Raw mode does not translate line feeds
        let text = text.replace('\n', "\r\n");
        queue!(self.out, Print(text))?;
        self.out.flush()?;
        Ok(())
    }

    fn write_styled(&mut self, text: &str, color: Option<Color>) -> Result<()> {
        match color {
            Some(color) => {
                let text = text.replace('\n', "\r\n");
                queue!(self.out, SetForegroundColor(color), Print(text), ResetColor)?;
                self.out.flush()?;
                Ok(())
            }
            None => self.write(text),
        }
    }

    fn read_key(&mut self, cancel: &CancellationToken) -> Result<Option<KeyEvent>> {
        loop {
            if cancel.is_cancelled() {
                return Ok(None);
            }

            if !event::poll(self.tick_rate)
                .map_err(|e| ShellError::terminal(format!("Failed to poll events: {e}")))?
            {
                continue;
            }

            let event = event::read()
                .map_err(|e| ShellError::terminal(format!("Failed to read event: {e}")))?;

            if let Event::Key(key) = event {
                // Windows reports releases as well
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(key));
                }
            }
        }
    }

    fn bell(&mut self) -> Result<()> {
        self.write("\x07")
    }
}

//! Terminal I/O port.
//!
//! The line editor and the session loop talk to the screen only through the
//! [`Terminal`] trait. Two implementations ship with the crate: a raw-mode
//! crossterm backend for interactive use, and an in-memory virtual screen for
//! headless runs and tests.

mod raw;
mod memory;
pub mod script;

pub use self::raw::CrosstermTerminal;
pub use self::memory::MemoryTerminal;
pub use crossterm::event::KeyEvent;
pub use crossterm::style::Color;

use crate::error::Result;
use tokio_util::sync::CancellationToken;

/// Capabilities the shell needs from a terminal.
///
/// Positions are `(column, row)` in cells, zero-based.
pub trait Terminal: Send {
    /// Returns the current cursor position.
    fn cursor_position(&mut self) -> Result<(u16, u16)>;

    /// Moves the cursor to an absolute position.
    fn set_cursor_position(&mut self, col: u16, row: u16) -> Result<()>;

    /// Returns the buffer size as `(width, height)`.
    fn size(&self) -> Result<(u16, u16)>;

    /// Shows or hides the cursor.
    fn set_cursor_visible(&mut self, visible: bool) -> Result<()>;

    /// Returns whether the cursor is shown.
    fn is_cursor_visible(&self) -> bool;

    /// Writes raw text at the cursor.
    fn write(&mut self, text: &str) -> Result<()>;

    /// Writes text in the given foreground color.
    fn write_styled(&mut self, text: &str, color: Option<Color>) -> Result<()> {
        let _ = color;
        self.write(text)
    }

    /// Writes text followed by a line break.
    fn write_line(&mut self, text: &str) -> Result<()> {
        self.write(text)?;
        self.write("\n")
    }

    /// Blocks until a key is pressed.
    ///
    /// Returns `None` once `cancel` fires or the input source is exhausted.
    fn read_key(&mut self, cancel: &CancellationToken) -> Result<Option<KeyEvent>>;

    /// Sounds the audible bell.
    fn bell(&mut self) -> Result<()>;
}

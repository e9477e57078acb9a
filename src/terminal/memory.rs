//! In-memory virtual terminal.
//!
//! A fixed-size cell grid fed by a queue of scripted key presses. Writing past
//! the right edge wraps to the next row immediately and writing past the
//! bottom row scrolls. Wide glyphs (same UTF-8 heuristic as the editor) take
//! two cells.

use super::{script, Color, KeyEvent, Terminal};
use crate::editor::text::char_width;
use crate::error::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// Marks the second cell of a wide glyph.
const CONTINUATION: char = '\0';

#[derive(Debug)]
struct ScreenState {
    width: u16,
    height: u16,
    rows: Vec<Vec<char>>,
    col: u16,
    row: u16,
    cursor_visible: bool,
    keys: VecDeque<KeyEvent>,
    bells: usize,
    transcript: String,
}

impl ScreenState {
    fn new(width: u16, height: u16) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            rows: vec![vec![' '; width as usize]; height as usize],
            col: 0,
            row: 0,
            cursor_visible: true,
            keys: VecDeque::new(),
            bells: 0,
            transcript: String::new(),
        }
    }

    fn newline(&mut self) {
        self.col = 0;
        if self.row + 1 >= self.height {
            self.rows.remove(0);
            self.rows.push(vec![' '; self.width as usize]);
        } else {
            self.row += 1;
        }
    }

    /// Blanks the other half of any wide glyph that overlaps `col`.
    fn clear_cell(&mut self, col: usize) {
        let width = self.width as usize;
        let row = &mut self.rows[self.row as usize];
        if row[col] == CONTINUATION && col > 0 {
            row[col - 1] = ' ';
        } else if col + 1 < width && row[col + 1] == CONTINUATION {
            row[col + 1] = ' ';
        }
        row[col] = ' ';
    }

    fn put(&mut self, c: char) {
        match c {
            '\n' => return self.newline(),
            '\r' => {
                self.col = 0;
                return;
            }
            '\x07' => {
                self.bells += 1;
                return;
            }
            c if c.is_control() => return,
            _ => {}
        }

        let w = char_width(c) as u16;
        if self.col + w > self.width {
            // A wide glyph never straddles the edge
            self.newline();
        }

        let col = self.col as usize;
        self.clear_cell(col);
        if w == 2 {
            self.clear_cell(col + 1);
            self.rows[self.row as usize][col + 1] = CONTINUATION;
        }
        self.rows[self.row as usize][col] = c;

        self.col += w;
        if self.col >= self.width {
            self.newline();
        }
    }

    fn line(&self, row: usize) -> String {
        self.rows
            .get(row)
            .map(|cells| {
                cells
                    .iter()
                    .filter(|&&c| c != CONTINUATION)
                    .collect::<String>()
                    .trim_end_matches(' ')
                    .to_string()
            })
            .unwrap_or_default()
    }
}

/// Virtual screen with a scripted keyboard.
///
/// Clones share the same screen, so a test can keep a handle while the shell
/// owns another.
#[derive(Debug, Clone)]
pub struct MemoryTerminal {
    state: Arc<Mutex<ScreenState>>,
}

impl MemoryTerminal {
    /// Creates a blank screen of the given size.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScreenState::new(width, height))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScreenState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queues key presses.
    pub fn push_keys(&self, keys: impl IntoIterator<Item = KeyEvent>) {
        self.lock().keys.extend(keys);
    }

    /// Queues one key press without modifiers.
    pub fn push_key(&self, code: KeyCode) {
        self.push_keys([KeyEvent::new(code, KeyModifiers::NONE)]);
    }

    /// Queues one key press per character of `text`.
    pub fn type_text(&self, text: &str) {
        self.push_keys(
            text.chars()
                .map(|c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)),
        );
    }

    /// Queues the key presses described by a script ("type:..", "key:..").
    pub fn push_script(&self, script: &str) -> Result<()> {
        let keys = script::parse_keys(script)?;
        self.push_keys(keys);
        Ok(())
    }

    /// Returns the number of queued key presses not yet read.
    pub fn pending_keys(&self) -> usize {
        self.lock().keys.len()
    }

    /// Returns the cursor position as `(column, row)`.
    pub fn cursor(&self) -> (u16, u16) {
        let state = self.lock();
        (state.col, state.row)
    }

    /// Returns how many times the bell sounded.
    pub fn bell_count(&self) -> usize {
        self.lock().bells
    }

    /// Returns everything written so far, including scrolled-off text.
    pub fn transcript(&self) -> String {
        self.lock().transcript.clone()
    }

    /// Returns one visible row with trailing blanks removed.
    pub fn line(&self, row: u16) -> String {
        self.lock().line(row as usize)
    }

    /// Returns the visible rows, trimmed, without trailing empty rows.
    pub fn screen_lines(&self) -> Vec<String> {
        let state = self.lock();
        let mut lines: Vec<String> = (0..state.height as usize).map(|r| state.line(r)).collect();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines
    }

    /// Renders the visible screen as text.
    pub fn screen(&self) -> String {
        format!("{}\n", self.screen_lines().join("\n"))
    }
}

impl Terminal for MemoryTerminal {
    fn cursor_position(&mut self) -> Result<(u16, u16)> {
        Ok(self.cursor())
    }

    fn set_cursor_position(&mut self, col: u16, row: u16) -> Result<()> {
        let mut state = self.lock();
        state.col = col.min(state.width - 1);
        state.row = row.min(state.height - 1);
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16)> {
        let state = self.lock();
        Ok((state.width, state.height))
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        self.lock().cursor_visible = visible;
        Ok(())
    }

    fn is_cursor_visible(&self) -> bool {
        self.lock().cursor_visible
    }

    fn write(&mut self, text: &str) -> Result<()> {
        let mut state = self.lock();
        state.transcript.push_str(text);
        for c in text.chars() {
            state.put(c);
        }
        Ok(())
    }

    fn write_styled(&mut self, text: &str, _color: Option<Color>) -> Result<()> {
        self.write(text)
    }

    fn read_key(&mut self, cancel: &CancellationToken) -> Result<Option<KeyEvent>> {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        Ok(self.lock().keys.pop_front())
    }

    fn bell(&mut self) -> Result<()> {
        self.write("\x07")
    }
}

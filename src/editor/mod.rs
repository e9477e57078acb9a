//! Single-line terminal editor.
//!
//! [`LineEditor`] owns the text of one read. It keeps the character buffer,
//! its logical cursor index and the real terminal cursor in step. Screen
//! cells are found by walking the buffer from the column the text starts at,
//! wrapping like the terminal does (wide glyphs take two cells and never
//! straddle the right edge). Row moves are relative to where the terminal
//! cursor currently is, so scrolling does not desync it.

pub mod history;
pub mod reader;
pub mod text;

pub use history::{HistoryPool, DEFAULT_POOL};
pub use reader::{ReadOutcome, Reader};

use crate::commands::help::render_grid;
use crate::error::Result;
use crate::terminal::Terminal;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use text::{char_width, chars_width, token_start};
use tokio_util::sync::CancellationToken;

/// Completion source: `(buffer text, token start index) -> candidates`.
pub type Completer<'a> = dyn Fn(&str, usize) -> Vec<String> + 'a;

/// Editing actions reachable from a key binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditAction {
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    ClearLine,
    KillToStart,
    KillToEnd,
    KillWord,
    Transpose,
    PreviousHistory,
    NextHistory,
    Complete,
    CompletePrevious,
}

/// Key identity to action table.
const KEY_BINDINGS: &[(&str, EditAction)] = &[
    ("Escape", EditAction::ClearLine),
    ("Backspace", EditAction::Backspace),
    ("Delete", EditAction::Delete),
    ("LeftArrow", EditAction::Left),
    ("RightArrow", EditAction::Right),
    ("Home", EditAction::Home),
    ("End", EditAction::End),
    ("UpArrow", EditAction::PreviousHistory),
    ("DownArrow", EditAction::NextHistory),
    ("ControlA", EditAction::Home),
    ("ControlB", EditAction::Left),
    ("ControlD", EditAction::Delete),
    ("ControlE", EditAction::End),
    ("ControlF", EditAction::Right),
    ("ControlH", EditAction::Backspace),
    ("ControlK", EditAction::KillToEnd),
    ("ControlL", EditAction::ClearLine),
    ("ControlN", EditAction::NextHistory),
    ("ControlP", EditAction::PreviousHistory),
    ("ControlT", EditAction::Transpose),
    ("ControlU", EditAction::KillToStart),
    ("ControlW", EditAction::KillWord),
    ("Tab", EditAction::Complete),
    ("ShiftTab", EditAction::CompletePrevious),
];

/// Normalizes a key press to its binding name, e.g. `LeftArrow`, `ControlW`, `ShiftTab`.
///
/// Plain and shifted characters have no identity; they are text.
pub fn key_identity(key: &KeyEvent) -> Option<String> {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    let base = match key.code {
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Left => "LeftArrow".to_string(),
        KeyCode::Right => "RightArrow".to_string(),
        KeyCode::Up => "UpArrow".to_string(),
        KeyCode::Down => "DownArrow".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::BackTab => return Some("ShiftTab".to_string()),
        KeyCode::Char(c) if control => c.to_ascii_uppercase().to_string(),
        _ => return None,
    };

    if control {
        Some(format!("Control{base}"))
    } else if key.modifiers.contains(KeyModifiers::SHIFT) {
        Some(format!("Shift{base}"))
    } else {
        Some(base)
    }
}

fn lookup(identity: &str) -> Option<EditAction> {
    KEY_BINDINGS
        .iter()
        .find(|(name, _)| *name == identity)
        .map(|(_, action)| *action)
}

/// Advances a layout cell over `chars` the way a terminal wraps them: a glyph
/// that does not fit starts the next row, and filling the last cell moves to
/// the next row.
fn advance(mut cell: (usize, usize), chars: &[char], width: usize) -> (usize, usize) {
    for &c in chars {
        let w = char_width(c);
        if cell.0 > 0 && cell.0 + w > width {
            cell = (0, cell.1 + 1);
        }
        cell.0 += w;
        if cell.0 >= width {
            cell = (0, cell.1 + 1);
        }
    }
    cell
}

/// What the caller should do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Keep reading keys.
    Continue,
    /// Enter was pressed.
    Submit,
    /// The help key was typed at the end of the line.
    Help,
    /// A candidate grid was printed; the line must be re-prompted.
    Redisplay,
}

/// Editor state for one read.
pub struct LineEditor<'a> {
    term: &'a mut dyn Terminal,
    buffer: Vec<char>,
    /// Logical cursor (0..=buffer.len()).
    char_pos: usize,
    /// Terminal column where the text starts.
    origin: Option<usize>,
    /// Layout cell of the terminal cursor, see [`LineEditor::position`].
    at: Option<(usize, usize)>,
    history: &'a [String],
    /// `history.len()` means a fresh line.
    history_index: usize,
    completer: Option<&'a Completer<'a>>,
    completions: Option<Vec<String>>,
    completion_start: usize,
    completion_index: usize,
    password: bool,
    mask: Option<char>,
}

impl<'a> LineEditor<'a> {
    /// Creates an empty editor writing to `term` at its current cursor.
    pub fn new(term: &'a mut dyn Terminal) -> Self {
        Self {
            term,
            buffer: Vec::new(),
            char_pos: 0,
            origin: None,
            at: None,
            history: &[],
            history_index: 0,
            completer: None,
            completions: None,
            completion_start: 0,
            completion_index: 0,
            password: false,
            mask: None,
        }
    }

    /// Sets the entries Up/Down navigate (oldest first).
    pub fn with_history(mut self, history: &'a [String]) -> Self {
        self.history = history;
        self.history_index = history.len();
        self
    }

    /// Sets the Tab completion source.
    pub fn with_completer(mut self, completer: &'a Completer<'a>) -> Self {
        self.completer = Some(completer);
        self
    }

    /// Switches to password mode: text is masked with `mask` (or not echoed)
    /// and the terminal cursor is never repositioned.
    pub fn password(mut self, mask: Option<char>) -> Self {
        self.password = true;
        self.mask = mask;
        self
    }

    /// Returns the buffer as a string.
    pub fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    /// Returns the logical cursor index.
    pub fn cursor_index(&self) -> usize {
        self.char_pos
    }

    /// Returns the display column of the cursor within the text.
    pub fn cursor_column(&self) -> usize {
        chars_width(&self.buffer[..self.char_pos])
    }

    /// Returns the pending completion candidates, if any.
    pub fn completions(&self) -> Option<&[String]> {
        self.completions.as_deref()
    }

    /// Column where the text starts, captured on first use while the buffer
    /// is still empty and the terminal cursor sits at the start of the text.
    fn origin(&mut self) -> Result<usize> {
        if let Some(origin) = self.origin {
            return Ok(origin);
        }
        let (col, _) = self.term.cursor_position()?;
        let origin = col as usize;
        self.origin = Some(origin);
        self.at = Some((origin, 0));
        Ok(origin)
    }

    /// Returns the text origin column and the terminal width.
    fn geometry(&mut self) -> Result<(usize, usize)> {
        let origin = self.origin()?;
        let (width, _) = self.term.size()?;
        Ok((origin, (width as usize).max(1)))
    }

    /// Layout cell of the terminal cursor: `(column, rows below the first text row)`.
    fn position(&mut self) -> Result<(usize, usize)> {
        let origin = self.origin()?;
        Ok(self.at.unwrap_or((origin, 0)))
    }

    /// Layout cell where the glyph at `index` is drawn, or the end of the
    /// text for `index == buffer.len()`.
    fn cell_of(&mut self, index: usize) -> Result<(usize, usize)> {
        let (origin, width) = self.geometry()?;
        let mut cell = advance((origin, 0), &self.buffer[..index], width);
        if let Some(&c) = self.buffer.get(index) {
            if cell.0 > 0 && cell.0 + char_width(c) > width {
                cell = (0, cell.1 + 1);
            }
        }
        Ok(cell)
    }

    fn text_end(&mut self) -> Result<(usize, usize)> {
        let (origin, width) = self.geometry()?;
        Ok(advance((origin, 0), &self.buffer, width))
    }

    /// Moves the terminal cursor to a layout cell.
    ///
    /// Only the row delta from the current cursor is used, so scrolling and
    /// output printed above the line do not matter.
    fn goto(&mut self, target: (usize, usize)) -> Result<()> {
        if self.password {
            return Ok(());
        }
        let at = self.position()?;
        if at == target {
            return Ok(());
        }
        let (_, row) = self.term.cursor_position()?;
        let row = (row as isize + target.1 as isize - at.1 as isize).max(0);
        self.term.set_cursor_position(target.0 as u16, row as u16)?;
        self.at = Some(target);
        Ok(())
    }

    /// Puts the terminal cursor on the logical cursor.
    fn place_cursor(&mut self) -> Result<()> {
        if self.password {
            return Ok(());
        }
        let cell = self.cell_of(self.char_pos)?;
        self.goto(cell)
    }

    /// Writes glyphs at the terminal cursor. A wide glyph that would straddle
    /// the right edge is preceded by blanks up to the edge.
    fn put(&mut self, chars: &[char]) -> Result<()> {
        let (_, width) = self.geometry()?;
        let mut at = self.position()?;
        let mut out = String::new();
        for &c in chars {
            if at.0 > 0 && at.0 + char_width(c) > width {
                out.extend(std::iter::repeat(' ').take(width - at.0));
                at = (0, at.1 + 1);
            }
            out.push(c);
            at = advance(at, &[c], width);
        }
        self.term.write(&out)?;
        self.at = Some(at);
        Ok(())
    }

    /// Rewrites the text from `from` to the end, then blanks whatever the
    /// previous rendering left between the new end and `old_end`.
    fn redraw_from(&mut self, from: usize, old_end: (usize, usize)) -> Result<()> {
        if self.password {
            return Ok(());
        }
        let (origin, width) = self.geometry()?;
        let start = advance((origin, 0), &self.buffer[..from], width);
        self.goto(start)?;
        let tail = self.buffer[from..].to_vec();
        self.put(&tail)?;

        let end = self.position()?;
        let linear = |(col, row): (usize, usize)| row * width + col;
        let blanks = linear(old_end).saturating_sub(linear(end));
        if blanks > 0 {
            self.put(&vec![' '; blanks])?;
        }
        Ok(())
    }

    /// Echoes typed text in password mode.
    fn echo_masked(&mut self, count: usize) -> Result<()> {
        match self.mask {
            Some(mask) => self.term.write(&mask.to_string().repeat(count)),
            None => Ok(()),
        }
    }

    fn hide_cursor(&mut self) -> Result<()> {
        if self.password {
            return Ok(());
        }
        self.term.set_cursor_visible(false)
    }

    fn show_cursor(&mut self) -> Result<()> {
        if self.password {
            return Ok(());
        }
        self.term.set_cursor_visible(true)
    }

    /// Inserts a character at the cursor.
    pub fn write_char(&mut self, c: char) -> Result<()> {
        if self.password {
            self.buffer.insert(self.char_pos, c);
            self.char_pos += 1;
            return self.echo_masked(1);
        }

        if self.char_pos == self.buffer.len() {
            self.origin()?;
            self.buffer.push(c);
            self.char_pos += 1;
            return self.put(&[c]);
        }

        self.hide_cursor()?;
        let old_end = self.text_end()?;
        self.buffer.insert(self.char_pos, c);
        self.redraw_from(self.char_pos, old_end)?;
        self.char_pos += 1;
        self.place_cursor()?;
        self.show_cursor()
    }

    /// Inserts every character of `text` at the cursor.
    pub fn write_str(&mut self, text: &str) -> Result<()> {
        for c in text.chars() {
            self.write_char(c)?;
        }
        Ok(())
    }

    /// Removes the glyph at `index` and redraws from there.
    fn remove_at(&mut self, index: usize) -> Result<()> {
        if self.password {
            self.buffer.remove(index);
            return Ok(());
        }
        self.hide_cursor()?;
        let old_end = self.text_end()?;
        self.buffer.remove(index);
        self.redraw_from(index, old_end)?;
        self.place_cursor()?;
        self.show_cursor()
    }

    fn backspace(&mut self) -> Result<()> {
        if self.char_pos == 0 || self.buffer.is_empty() {
            return Ok(());
        }
        self.char_pos -= 1;
        self.remove_at(self.char_pos)
    }

    fn delete(&mut self) -> Result<()> {
        if self.char_pos == self.buffer.len() || self.buffer.is_empty() {
            return Ok(());
        }
        self.remove_at(self.char_pos)
    }

    fn move_left(&mut self) -> Result<()> {
        if self.char_pos == 0 {
            return Ok(());
        }
        self.char_pos -= 1;
        self.place_cursor()
    }

    fn move_right(&mut self) -> Result<()> {
        if self.char_pos == self.buffer.len() {
            return Ok(());
        }
        self.char_pos += 1;
        self.place_cursor()
    }

    fn move_home(&mut self) -> Result<()> {
        self.char_pos = 0;
        self.place_cursor()
    }

    fn move_end(&mut self) -> Result<()> {
        self.char_pos = self.buffer.len();
        self.place_cursor()
    }

    fn clear_line(&mut self) -> Result<()> {
        if self.password {
            self.buffer.clear();
            self.char_pos = 0;
            return Ok(());
        }
        self.hide_cursor()?;
        let old_end = self.text_end()?;
        self.buffer.clear();
        self.char_pos = 0;
        self.redraw_from(0, old_end)?;
        self.place_cursor()?;
        self.show_cursor()
    }

    fn kill_to_start(&mut self) -> Result<()> {
        while self.char_pos > 0 {
            self.backspace()?;
        }
        Ok(())
    }

    fn kill_to_end(&mut self) -> Result<()> {
        let pos = self.char_pos;
        self.move_end()?;
        while self.char_pos > pos {
            self.backspace()?;
        }
        Ok(())
    }

    fn kill_word(&mut self) -> Result<()> {
        while self.char_pos > 0 && self.buffer[self.char_pos - 1] != ' ' {
            self.backspace()?;
        }
        Ok(())
    }

    /// Swaps the characters around the cursor (the last two at end of line)
    /// and leaves the cursor after the pair.
    fn transpose(&mut self) -> Result<()> {
        if self.char_pos == 0 || self.buffer.len() < 2 {
            return Ok(());
        }

        let at_end = self.char_pos == self.buffer.len();
        let second = if at_end { self.char_pos - 1 } else { self.char_pos };

        self.hide_cursor()?;
        let old_end = self.text_end()?;
        self.buffer.swap(second - 1, second);
        self.redraw_from(0, old_end)?;
        self.char_pos = (second + 1).min(self.buffer.len());
        self.place_cursor()?;
        self.show_cursor()
    }

    fn replace_line(&mut self, text: &str) -> Result<()> {
        self.clear_line()?;
        self.write_str(text)
    }

    fn previous_history(&mut self) -> Result<()> {
        if self.history_index == 0 {
            return Ok(());
        }
        self.history_index -= 1;
        let entry = self.history[self.history_index].clone();
        self.replace_line(&entry)
    }

    fn next_history(&mut self) -> Result<()> {
        if self.history_index >= self.history.len() {
            return Ok(());
        }
        self.history_index += 1;
        if self.history_index == self.history.len() {
            self.clear_line()
        } else {
            let entry = self.history[self.history_index].clone();
            self.replace_line(&entry)
        }
    }

    fn reset_completion(&mut self) {
        self.completions = None;
        self.completion_index = 0;
    }

    fn erase_to_completion_start(&mut self) -> Result<()> {
        while self.char_pos > self.completion_start {
            self.backspace()?;
        }
        Ok(())
    }

    fn complete(&mut self) -> Result<KeyResult> {
        let Some(completer) = self.completer else {
            return Ok(KeyResult::Continue);
        };
        if self.char_pos != self.buffer.len() || self.buffer.is_empty() {
            return Ok(KeyResult::Continue);
        }
        let text = self.text();
        if text.ends_with(' ') {
            return Ok(KeyResult::Continue);
        }

        let start = token_start(&self.buffer);
        let results = completer(&text, start);
        if results.is_empty() {
            return Ok(KeyResult::Continue);
        }
        self.completion_start = start;
        self.completion_index = 0;

        if let [only] = results.as_slice() {
            let fill = format!("{only} ");
            self.erase_to_completion_start()?;
            self.write_str(&fill)?;
            self.completions = Some(results);
            return Ok(KeyResult::Continue);
        }

        self.term.bell()?;
        self.term.write("\n")?;
        let (width, _) = self.term.size()?;
        for line in render_grid(&results, width) {
            self.term.write_line(&line)?;
        }
        self.completions = Some(results);
        Ok(KeyResult::Redisplay)
    }

    /// Replaces the token under completion with the next (or previous) candidate.
    fn cycle_completion(&mut self, forward: bool) -> Result<()> {
        let Some(count) = self.completions.as_ref().map(Vec::len).filter(|n| *n > 0) else {
            return Ok(());
        };
        self.completion_index = if forward {
            (self.completion_index + 1) % count
        } else {
            (self.completion_index + count - 1) % count
        };
        let candidate = self
            .completions
            .as_ref()
            .and_then(|c| c.get(self.completion_index))
            .cloned()
            .unwrap_or_default();
        self.erase_to_completion_start()?;
        self.write_str(&candidate)
    }

    /// Applies one key press.
    pub fn handle_key(&mut self, key: KeyEvent, help_key: bool) -> Result<KeyResult> {
        if key.code == KeyCode::Enter {
            return Ok(KeyResult::Submit);
        }

        let action = key_identity(&key).as_deref().and_then(lookup);
        match action {
            Some(EditAction::Complete) if self.completions.is_some() => {
                self.cycle_completion(true)?;
                return Ok(KeyResult::Continue);
            }
            Some(EditAction::CompletePrevious) if self.completions.is_some() => {
                self.cycle_completion(false)?;
                return Ok(KeyResult::Continue);
            }
            _ => self.reset_completion(),
        }

        let Some(action) = action else {
            return self.insert_key(key, help_key);
        };

        match action {
            EditAction::Backspace => self.backspace()?,
            EditAction::Delete => self.delete()?,
            EditAction::Left => self.move_left()?,
            EditAction::Right => self.move_right()?,
            EditAction::Home => self.move_home()?,
            EditAction::End => self.move_end()?,
            EditAction::ClearLine => self.clear_line()?,
            EditAction::KillToStart => self.kill_to_start()?,
            EditAction::KillToEnd => self.kill_to_end()?,
            EditAction::KillWord => self.kill_word()?,
            EditAction::Transpose => self.transpose()?,
            EditAction::PreviousHistory => self.previous_history()?,
            EditAction::NextHistory => self.next_history()?,
            EditAction::Complete => return self.complete(),
            EditAction::CompletePrevious => {}
        }
        Ok(KeyResult::Continue)
    }

    fn insert_key(&mut self, key: KeyEvent, help_key: bool) -> Result<KeyResult> {
        let KeyCode::Char(c) = key.code else {
            return Ok(KeyResult::Continue);
        };
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return Ok(KeyResult::Continue);
        }

        self.write_char(c)?;
        if c == '?' && help_key && !self.password && self.char_pos == self.buffer.len() {
            return Ok(KeyResult::Help);
        }
        Ok(KeyResult::Continue)
    }

    /// Moves past the text and ends the terminal line.
    fn finish_line(&mut self) -> Result<()> {
        self.move_end()?;
        self.term.write("\n")?;
        self.term.set_cursor_visible(true)
    }

    /// Reads keys until the line is submitted, needs redisplay, or input stops.
    pub fn run(&mut self, cancel: &CancellationToken, help_key: bool) -> Result<ReadOutcome> {
        loop {
            let Some(key) = self.term.read_key(cancel)? else {
                return Ok(ReadOutcome::Aborted);
            };

            match self.handle_key(key, help_key)? {
                KeyResult::Continue => {}
                KeyResult::Submit => {
                    self.finish_line()?;
                    return Ok(ReadOutcome::Completed(self.text()));
                }
                KeyResult::Help => {
                    self.finish_line()?;
                    return Ok(ReadOutcome::Help(self.text()));
                }
                KeyResult::Redisplay => return Ok(ReadOutcome::NeedsRedisplay(self.text())),
            }
        }
    }
}

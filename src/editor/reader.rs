//! Prompted line reads on top of [`LineEditor`].
//!
//! The reader owns the history pools and re-issues a read after a completion
//! grid was printed, so callers only ever see a finished line, a help request,
//! or an aborted read.

use super::history::HistoryPool;
use super::{Completer, LineEditor};
use crate::error::Result;
use crate::terminal::{Color, Terminal};
use tokio_util::sync::CancellationToken;

/// How a single editor run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Enter was pressed.
    Completed(String),
    /// A completion grid was printed; the line must be prompted again with this text.
    NeedsRedisplay(String),
    /// The help key was typed at the end of this text (the text ends in `?`).
    Help(String),
    /// Input ended or the read was cancelled.
    Aborted,
}

/// Prompted reader with history.
#[derive(Debug)]
pub struct Reader {
    history: HistoryPool,
    password_char: Option<char>,
    help_key: bool,
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader {
    pub fn new() -> Self {
        Self {
            history: HistoryPool::new(),
            password_char: Some('*'),
            help_key: true,
        }
    }

    pub fn history(&self) -> &HistoryPool {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryPool {
        &mut self.history
    }

    /// Mask used by [`Reader::read_password`]; `None` echoes nothing.
    pub fn set_password_char(&mut self, mask: Option<char>) {
        self.password_char = mask;
    }

    pub fn password_char(&self) -> Option<char> {
        self.password_char
    }

    /// Enables `?` as an immediate help request.
    pub fn set_help_key(&mut self, enabled: bool) {
        self.help_key = enabled;
    }

    pub fn help_key(&self) -> bool {
        self.help_key
    }

    /// Reads one line, writing `prompt` first and pre-filling `default`.
    ///
    /// Completed non-blank lines are added to the active history pool.
    pub fn read(
        &mut self,
        term: &mut dyn Terminal,
        prompt: &str,
        color: Option<Color>,
        default: &str,
        completer: Option<&Completer<'_>>,
        cancel: &CancellationToken,
    ) -> Result<ReadOutcome> {
        let mut seed = default.to_string();

        loop {
            if !prompt.is_empty() {
                term.write_styled(prompt, color)?;
            }

            let outcome = {
                let mut editor = LineEditor::new(term).with_history(self.history.entries());
                if let Some(completer) = completer {
                    editor = editor.with_completer(completer);
                }
                editor.write_str(&seed)?;
                editor.run(cancel, self.help_key)?
            };

            match outcome {
                ReadOutcome::NeedsRedisplay(text) => seed = text,
                ReadOutcome::Completed(text) => {
                    if self.history.push(&text) {
                        tracing::trace!(pool = self.history.active_name(), "history entry added");
                    }
                    return Ok(ReadOutcome::Completed(text));
                }
                other => return Ok(other),
            }
        }
    }

    /// Reads one line without history, completion, or help.
    pub fn read_line(
        &mut self,
        term: &mut dyn Terminal,
        prompt: &str,
        color: Option<Color>,
        cancel: &CancellationToken,
    ) -> Result<ReadOutcome> {
        if !prompt.is_empty() {
            term.write_styled(prompt, color)?;
        }
        LineEditor::new(term).run(cancel, false)
    }

    /// Reads a secret. The text is masked with the password character and
    /// never enters history.
    pub fn read_password(
        &mut self,
        term: &mut dyn Terminal,
        prompt: &str,
        color: Option<Color>,
        cancel: &CancellationToken,
    ) -> Result<ReadOutcome> {
        if !prompt.is_empty() {
            term.write_styled(prompt, color)?;
        }
        LineEditor::new(term)
            .password(self.password_char)
            .run(cancel, false)
    }
}

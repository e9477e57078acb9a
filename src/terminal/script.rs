//! Key-event script DSL for headless runs.
//!
//! Parses event strings like "type:show version", "key:enter", "key:ctrl+w"
//! into crossterm key events that can be queued on a virtual terminal.

use crate::error::{Result, ShellError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;

/// A parsed script event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEvent {
    /// A single key press.
    Key(KeyEvent),
    /// Type text (expands to one key event per character).
    Type(String),
}

impl ScriptEvent {
    /// Expands the event into the key presses it stands for.
    pub fn into_keys(self) -> Vec<KeyEvent> {
        match self {
            Self::Key(key) => vec![key],
            Self::Type(text) => text
                .chars()
                .map(|c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
                .collect(),
        }
    }
}

impl fmt::Display for ScriptEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => {
                let mut parts = Vec::new();
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    parts.push("ctrl".to_string());
                }
                if key.modifiers.contains(KeyModifiers::ALT) {
                    parts.push("alt".to_string());
                }
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    parts.push("shift".to_string());
                }
                parts.push(key_code_to_string(&key.code));
                write!(f, "key:{}", parts.join("+"))
            }
            Self::Type(text) => write!(f, "type:{}", text),
        }
    }
}

fn key_code_to_string(code: &KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::BackTab => "backtab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        _ => "unknown".to_string(),
    }
}

/// Parses all events from a script.
///
/// Events are separated by newlines or commas; blank lines and lines starting
/// with `#` are skipped.
pub fn parse_script(input: &str) -> Result<Vec<ScriptEvent>> {
    let mut events = Vec::new();

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        for part in line.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            events.push(parse_event(part)?);
        }
    }

    Ok(events)
}

/// Parses a script straight into the key presses it produces.
pub fn parse_keys(input: &str) -> Result<Vec<KeyEvent>> {
    Ok(parse_script(input)?
        .into_iter()
        .flat_map(ScriptEvent::into_keys)
        .collect())
}

/// Parses a single event string.
pub fn parse_event(input: &str) -> Result<ScriptEvent> {
    let input = input.trim();

    let (event_type, value) = match input.split_once(':') {
        Some((t, v)) => (t.trim().to_lowercase(), v),
        None => {
            return Err(ShellError::config(format!(
                "Invalid event syntax: '{}'. Expected format: type:value",
                input
            )));
        }
    };

    match event_type.as_str() {
        "key" => parse_key(value.trim()),
        "type" => Ok(ScriptEvent::Type(value.to_string())),
        _ => Err(ShellError::config(format!(
            "Unknown event type: '{}'. Valid types: key, type",
            event_type
        ))),
    }
}

/// Parses a key event like "enter", "ctrl+w", "shift+tab".
fn parse_key(value: &str) -> Result<ScriptEvent> {
    // "key:+" names the plus key itself
    let parts: Vec<&str> = if value == "+" {
        vec!["+"]
    } else {
        value.split('+').collect()
    };
    let mut modifiers = KeyModifiers::empty();
    let mut key_str = "";

    for (i, part) in parts.iter().enumerate() {
        if i == parts.len() - 1 {
            key_str = part;
        } else {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => {
                    return Err(ShellError::config(format!(
                        "Unknown modifier: '{}'. Valid modifiers: ctrl, alt, shift",
                        part
                    )));
                }
            }
        }
    }

    let code = parse_key_code(key_str)?;

    Ok(ScriptEvent::Key(KeyEvent::new(code, modifiers)))
}

/// Parses a key code string into a KeyCode.
fn parse_key_code(s: &str) -> Result<KeyCode> {
    let code = match s.to_lowercase().as_str() {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" | "bs" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "space" => KeyCode::Char(' '),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => {
                    return Err(ShellError::config(format!(
                        "Unknown key: '{}'. Use single characters or named keys like enter, esc, tab, etc.",
                        s
                    )));
                }
            }
        }
    };

    Ok(code)
}

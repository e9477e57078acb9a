//! Error types for ishell.
//!
//! Registration and infrastructure failures are reported through [`ShellError`] and
//! raised to the caller immediately. Failures to resolve typed input are reported
//! through [`ResolveError`]; the session loop prints them and keeps running.

use thiserror::Error;

/// Main error type for ishell operations.
#[derive(Error, Debug)]
pub enum ShellError {
    /// A node with the same identity key is already registered.
    #[error("Duplicate command: {0}")]
    DuplicateCommand(String),

    /// A regular-expression node was registered without its help label.
    #[error("Regular expression help missing: {0}")]
    RegularHelpMissing(String),

    /// The pattern contains whitespace or the parent path ends in a space.
    #[error("Malformed command definition: {0}")]
    MalformedDefinition(String),

    /// A regular-expression pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Terminal I/O errors (raw mode, cursor queries, key reads, etc.)
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Configuration errors (invalid config file, bad color name, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShellError {
    /// Creates a duplicate command error with the given message.
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::DuplicateCommand(msg.into())
    }

    /// Creates a missing regex help error with the given message.
    pub fn regular_help_missing(msg: impl Into<String>) -> Self {
        Self::RegularHelpMissing(msg.into())
    }

    /// Creates a malformed definition error with the given message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDefinition(msg.into())
    }

    /// Creates an invalid pattern error with the given message.
    pub fn invalid_pattern(msg: impl Into<String>) -> Self {
        Self::InvalidPattern(msg.into())
    }

    /// Creates a terminal error with the given message.
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::DuplicateCommand(_) => "Duplicate Command",
            Self::RegularHelpMissing(_) => "Regular Help Missing",
            Self::MalformedDefinition(_) => "Malformed Definition",
            Self::InvalidPattern(_) => "Invalid Pattern",
            Self::Terminal(_) => "Terminal Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self {
        Self::Terminal(err.to_string())
    }
}

/// Result type alias using ShellError.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Why a line of input could not be turned into a single executable command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The first token matches no visible root command.
    #[error("Unknown command")]
    UnknownCommand {
        /// Caret column past the prompt (always 0).
        caret: usize,
    },

    /// The input matches more than one command and no tie-break applies.
    #[error("Ambiguous command: \"{input}\"")]
    AmbiguousCommand {
        /// The line as typed.
        input: String,
        /// Patterns of the competing nodes.
        candidates: Vec<String>,
    },

    /// A token after the first matched nothing under the resolved parent.
    #[error("Invalid input detected at '^' marker.")]
    InvalidInputAtPosition {
        /// Caret column past the prompt, just after the last resolved token.
        caret: usize,
    },
}

impl ResolveError {
    /// Returns the caret offset for errors that point at a position in the line.
    pub fn caret(&self) -> Option<usize> {
        match self {
            Self::UnknownCommand { caret } | Self::InvalidInputAtPosition { caret } => Some(*caret),
            Self::AmbiguousCommand { .. } => None,
        }
    }
}

//! Configuration management for ishell.
//!
//! Settings are loaded from a TOML file; a missing file yields the defaults.
//! Command-line flags are applied on top by the binary.

use crate::editor::history::{DEFAULT_HISTORY_LIMIT, DEFAULT_POOL};
use crate::error::{Result, ShellError};
use crossterm::style::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Shell configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt text written before every read.
    pub prompt: String,

    /// Prompt color name (e.g. "green", "dark_cyan"). Unset keeps the terminal default.
    pub prompt_color: Option<String>,

    /// History pool active at startup.
    pub history_pool: String,

    /// Whether completed lines are recorded.
    pub history_enabled: bool,

    /// Maximum entries per pool; 0 keeps everything.
    pub history_limit: usize,

    /// Mask echoed for each password character. Empty echoes nothing.
    pub password_char: String,

    /// Tag filter for tagged root commands.
    pub tag: Option<String>,

    /// Typing `?` shows help immediately without Enter.
    pub help_key: bool,

    /// Raises the log level to debug.
    pub debug: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            prompt_color: None,
            history_pool: DEFAULT_POOL.to_string(),
            history_enabled: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
            password_char: "*".to_string(),
            tag: None,
            help_key: true,
            debug: false,
        }
    }
}

impl ShellConfig {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ishell")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ShellError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            ShellError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })?;
        // Fail on a bad color at load time, not at first prompt
        config.prompt_color()?;
        Ok(config)
    }

    /// Parses the configured prompt color.
    pub fn prompt_color(&self) -> Result<Option<Color>> {
        self.prompt_color.as_deref().map(parse_color).transpose()
    }

    /// Returns the password mask character, if any.
    pub fn password_mask(&self) -> Option<char> {
        self.password_char.chars().next()
    }
}

/// Parses a color name such as `red`, `dark_green` or `grey`.
pub fn parse_color(name: &str) -> Result<Color> {
    let color = match name.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "dark_red" => Color::DarkRed,
        "green" => Color::Green,
        "dark_green" => Color::DarkGreen,
        "yellow" => Color::Yellow,
        "dark_yellow" => Color::DarkYellow,
        "blue" => Color::Blue,
        "dark_blue" => Color::DarkBlue,
        "magenta" => Color::Magenta,
        "dark_magenta" => Color::DarkMagenta,
        "cyan" => Color::Cyan,
        "dark_cyan" => Color::DarkCyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        "dark_grey" | "dark_gray" => Color::DarkGrey,
        "reset" => Color::Reset,
        _ => return Err(ShellError::config(format!("unknown color '{name}'"))),
    };
    Ok(color)
}

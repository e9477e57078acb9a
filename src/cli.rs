//! Command-line argument parsing for the ishell demo binary.

use crate::config::ShellConfig;
use crate::error::{Result, ShellError};
use clap::Parser;
use std::path::PathBuf;

/// Output format for headless mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text of the final screen.
    #[default]
    Text,
    /// JSON with screen, cursor, and session state.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// An abbreviation-tolerant interactive command shell.
#[derive(Parser, Debug)]
#[command(name = "ishell")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Prompt text (overrides config)
    #[arg(long, value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Tag filter for tagged commands (overrides config)
    #[arg(long, value_name = "TAG")]
    pub tag: Option<String>,

    /// History pool to start in (overrides config)
    #[arg(long, value_name = "NAME")]
    pub pool: Option<String>,

    /// Log at debug level
    #[arg(long)]
    pub debug: bool,

    // === Headless mode options ===
    /// Run against a virtual screen with scripted keys instead of the terminal
    #[arg(long)]
    pub headless: bool,

    /// Comma-separated key events for headless mode (e.g., "type:show version,key:enter")
    #[arg(long, value_name = "EVENTS")]
    pub events: Option<String>,

    /// Path to script file with events (use "-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub script: Option<String>,

    /// Screen size for headless mode (WIDTHxHEIGHT, e.g., "80x24")
    #[arg(long, value_name = "SIZE", default_value = "80x24")]
    pub size: String,

    /// Output format for headless mode
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub output: String,

    /// Write output to file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(ShellConfig::default_path)
    }

    /// Loads the config file and applies flag overrides.
    pub fn load_config(&self) -> Result<ShellConfig> {
        let mut config = ShellConfig::load_from_file(&self.config_path())?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Applies flag values on top of file values.
    pub fn apply_overrides(&self, config: &mut ShellConfig) {
        if let Some(prompt) = &self.prompt {
            config.prompt = prompt.clone();
        }
        if let Some(tag) = &self.tag {
            config.tag = Some(tag.clone());
        }
        if let Some(pool) = &self.pool {
            config.history_pool = pool.clone();
        }
        if self.debug {
            config.debug = true;
        }
    }

    /// Returns true if headless mode is enabled.
    pub fn is_headless(&self) -> bool {
        self.headless
    }

    /// Parses the screen size from the --size argument.
    pub fn parse_screen_size(&self) -> std::result::Result<(u16, u16), String> {
        let Some((width, height)) = self.size.split_once('x') else {
            return Err(format!(
                "Invalid size format: '{}'. Expected WIDTHxHEIGHT (e.g., 80x24)",
                self.size
            ));
        };
        let width = width
            .parse::<u16>()
            .map_err(|_| format!("Invalid width: '{width}'"))?;
        let height = height
            .parse::<u16>()
            .map_err(|_| format!("Invalid height: '{height}'"))?;
        if width == 0 || height == 0 {
            return Err(format!("Screen size must be non-zero: '{}'", self.size));
        }
        Ok((width, height))
    }

    /// Parses the output format from the --output argument.
    pub fn parse_output_format(&self) -> std::result::Result<OutputFormat, String> {
        self.output.parse()
    }

    /// Validates headless mode arguments.
    pub fn validate_headless(&self) -> Result<()> {
        if !self.headless {
            return Ok(());
        }

        if self.events.is_none() && self.script.is_none() {
            return Err(ShellError::config("--headless requires --events or --script"));
        }
        self.parse_screen_size().map_err(ShellError::config)?;
        self.parse_output_format().map_err(ShellError::config)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_parse_config_path() {
        let cli = parse_args(&["ishell", "--config", "/path/to/config.toml"]);
        assert_eq!(cli.config_path(), PathBuf::from("/path/to/config.toml"));
    }

    #[test]
    fn test_default_config_path() {
        let cli = parse_args(&["ishell"]);
        assert_eq!(cli.config_path(), ShellConfig::default_path());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let cli = parse_args(&[
            "ishell", "--prompt", "R1# ", "--tag", "admin", "--pool", "lab", "--debug",
        ]);
        let mut config = ShellConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.prompt, "R1# ");
        assert_eq!(config.tag.as_deref(), Some("admin"));
        assert_eq!(config.history_pool, "lab");
        assert!(config.debug);
    }

    #[test]
    fn test_no_flags_keep_file_values() {
        let cli = parse_args(&["ishell"]);
        let mut config = ShellConfig {
            prompt: "file> ".to_string(),
            ..ShellConfig::default()
        };
        cli.apply_overrides(&mut config);
        assert_eq!(config.prompt, "file> ");
        assert!(!config.debug);
    }

    #[test]
    fn test_parse_headless_flags() {
        let cli = parse_args(&["ishell", "--headless", "--events", "type:show,key:enter"]);
        assert!(cli.is_headless());
        assert_eq!(cli.events.as_deref(), Some("type:show,key:enter"));
        assert!(cli.validate_headless().is_ok());
    }

    #[test]
    fn test_parse_screen_size() {
        let cli = parse_args(&["ishell", "--size", "120x40"]);
        assert_eq!(cli.parse_screen_size().unwrap(), (120, 40));

        let cli = parse_args(&["ishell", "--size", "invalid"]);
        assert!(cli.parse_screen_size().is_err());

        let cli = parse_args(&["ishell", "--size", "0x10"]);
        assert!(cli.parse_screen_size().is_err());
    }

    #[test]
    fn test_parse_output_format() {
        let cli = parse_args(&["ishell", "--output", "json"]);
        assert_eq!(cli.parse_output_format().unwrap(), OutputFormat::Json);

        let cli = parse_args(&["ishell", "--output", "TEXT"]);
        assert_eq!(cli.parse_output_format().unwrap(), OutputFormat::Text);

        let cli = parse_args(&["ishell", "--output", "frames"]);
        assert!(cli.parse_output_format().is_err());
    }

    #[test]
    fn test_validate_headless_requires_events_or_script() {
        let cli = parse_args(&["ishell", "--headless"]);
        let err = cli.validate_headless().unwrap_err();
        assert!(err.to_string().contains("requires --events or --script"));
    }

    #[test]
    fn test_validate_headless_with_script() {
        let cli = parse_args(&["ishell", "--headless", "--script", "-"]);
        assert!(cli.validate_headless().is_ok());
    }

    #[test]
    fn test_headless_output_file() {
        let cli = parse_args(&[
            "ishell",
            "--headless",
            "--events",
            "key:enter",
            "--output-file",
            "result.json",
        ]);
        assert_eq!(cli.output_file, Some(PathBuf::from("result.json")));
    }
}

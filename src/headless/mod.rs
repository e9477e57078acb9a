//! Headless mode for scripted runs and automation.
//!
//! Runs a [`Shell`] against a [`MemoryTerminal`] fed from a key-event script
//! and reports the final screen.

mod output;

pub use output::HeadlessOutput;

use crate::cli::{Cli, OutputFormat};
use crate::config::ShellConfig;
use crate::error::{Result, ShellError};
use crate::shell::Shell;
use crate::terminal::script::{parse_script, ScriptEvent};
use crate::terminal::MemoryTerminal;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// Configuration for headless mode execution.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Screen width in columns.
    pub width: u16,
    /// Screen height in rows.
    pub height: u16,
    pub output_format: OutputFormat,
    /// Path to write output (None = stdout).
    pub output_file: Option<PathBuf>,
}

impl HeadlessConfig {
    /// Creates a HeadlessConfig from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (width, height) = cli.parse_screen_size().map_err(ShellError::config)?;
        let output_format = cli.parse_output_format().map_err(ShellError::config)?;

        Ok(Self {
            width,
            height,
            output_format,
            output_file: cli.output_file.clone(),
        })
    }
}

/// Result of headless execution.
#[derive(Debug)]
pub struct HeadlessResult {
    /// Final screen content as text.
    pub screen: String,
    pub screen_lines: Vec<String>,
    /// Cursor as (column, row).
    pub cursor: (u16, u16),
    /// Number of script events loaded.
    pub events_executed: usize,
    /// Key presses left unread when the shell stopped.
    pub pending_keys: usize,
    pub bells: usize,
    pub duration: Duration,
    pub state: HeadlessState,
}

/// Snapshot of shell state for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct HeadlessState {
    pub prompt: String,
    pub tag: Option<String>,
    pub history_pool: String,
    pub history: Vec<String>,
    pub stopped: bool,
}

impl HeadlessState {
    fn from_shell(shell: &Shell) -> Self {
        Self {
            prompt: shell.prompt().to_string(),
            tag: shell.tag().map(str::to_string),
            history_pool: shell.history_pool().to_string(),
            history: shell.history().to_vec(),
            stopped: shell.is_stopped(),
        }
    }
}

/// Drives a shell from scripted events.
pub struct HeadlessRunner {
    term: MemoryTerminal,
    events: Vec<ScriptEvent>,
}

impl HeadlessRunner {
    pub fn new(config: &HeadlessConfig) -> Self {
        Self {
            term: MemoryTerminal::new(config.width, config.height),
            events: Vec::new(),
        }
    }

    /// Handle to the virtual screen; give it to the shell under test.
    pub fn terminal(&self) -> MemoryTerminal {
        self.term.clone()
    }

    /// Loads events from a string (comma-separated or newline-separated).
    pub fn load_events(&mut self, input: &str) -> Result<()> {
        self.events = parse_script(input)?;
        Ok(())
    }

    /// Loads events from a script file, or stdin for `-`.
    pub fn load_script(&mut self, path: &str) -> Result<()> {
        let content = if path == "-" {
            use std::io::Read;
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| ShellError::internal(format!("Failed to read stdin: {e}")))?;
            buffer
        } else {
            std::fs::read_to_string(path)
                .map_err(|e| ShellError::internal(format!("Failed to read script file: {e}")))?
        };

        self.load_events(&content)
    }

    /// Feeds every loaded event to the screen and runs the shell until input ends.
    pub fn run(self, shell: &mut Shell) -> Result<HeadlessResult> {
        let start_time = Instant::now();
        let events_executed = self.events.len();
        for event in self.events {
            self.term.push_keys(event.into_keys());
        }

        shell.start()?;

        let result = HeadlessResult {
            screen: self.term.screen(),
            screen_lines: self.term.screen_lines(),
            cursor: self.term.cursor(),
            events_executed,
            pending_keys: self.term.pending_keys(),
            bells: self.term.bell_count(),
            duration: start_time.elapsed(),
            state: HeadlessState::from_shell(shell),
        };
        info!(
            events = result.events_executed,
            pending = result.pending_keys,
            "Headless run finished"
        );
        Ok(result)
    }
}

/// Runs headless mode from CLI arguments.
///
/// `install` registers the command tree on the freshly built shell.
pub fn run_headless<F>(cli: &Cli, config: &ShellConfig, install: F) -> Result<()>
where
    F: FnOnce(&mut Shell) -> Result<()>,
{
    cli.validate_headless()?;

    let headless = HeadlessConfig::from_cli(cli)?;
    let mut runner = HeadlessRunner::new(&headless);

    if let Some(events) = &cli.events {
        runner.load_events(events)?;
    } else if let Some(path) = &cli.script {
        runner.load_script(path)?;
    }

    let mut shell = Shell::from_config(config, Box::new(runner.terminal()))?;
    install(&mut shell)?;

    let result = runner.run(&mut shell)?;
    let output = HeadlessOutput::new(headless.output_format).format(&result);

    if let Some(path) = &headless.output_file {
        std::fs::write(path, &output)
            .map_err(|e| ShellError::internal(format!("Failed to write output file: {e}")))?;
    } else {
        print!("{output}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::NodeSpec;
    use pretty_assertions::assert_eq;

    fn config() -> HeadlessConfig {
        HeadlessConfig {
            width: 40,
            height: 10,
            output_format: OutputFormat::Text,
            output_file: None,
        }
    }

    #[test]
    fn test_runner_drives_shell() {
        let mut runner = HeadlessRunner::new(&config());
        runner
            .load_events("type:hello,key:enter\n# comment\ntype:nope,key:enter")
            .unwrap();
        let mut shell = Shell::new(Box::new(runner.terminal()));
        shell
            .register(NodeSpec::literal("hello", "Greets").handler(|ctx| {
                ctx.println("hi")?;
                Ok(())
            }))
            .unwrap();
        shell.rebind();

        let result = runner.run(&mut shell).unwrap();
        assert_eq!(result.events_executed, 4);
        assert_eq!(result.pending_keys, 0);
        assert_eq!(
            result.screen_lines,
            vec!["> hello", "hi", "> nope", "  ^", "% Invalid input detected at '^' marker.", ">"]
        );
        assert_eq!(result.state.history, vec!["hello", "nope"]);
    }

    #[test]
    fn test_runner_stops_with_pending_input() {
        let mut runner = HeadlessRunner::new(&config());
        runner.load_events("type:quit,key:enter,type:left over").unwrap();
        let mut shell = Shell::new(Box::new(runner.terminal()));
        shell
            .register(NodeSpec::literal("quit", "Stops").handler(|ctx| {
                ctx.shell.stop();
                Ok(())
            }))
            .unwrap();
        shell.rebind();

        let result = runner.run(&mut shell).unwrap();
        assert!(result.state.stopped);
        assert_eq!(result.pending_keys, "left over".len());
    }

    #[test]
    fn test_load_events_rejects_bad_syntax() {
        let mut runner = HeadlessRunner::new(&config());
        assert!(runner.load_events("bogus").is_err());
    }
}

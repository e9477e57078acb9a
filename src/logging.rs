//! Tracing subscriber setup.
//!
//! An interactive session owns the terminal in raw mode, so its log goes to a
//! file under the user state directory. Headless runs print their report on
//! stdout and log to stderr.

use crate::error::{Result, ShellError};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    /// Truncated at startup.
    File(PathBuf),
    Stderr,
}

impl LogSink {
    /// Picks the sink for a run: stderr when headless, the log file otherwise.
    pub fn for_run(headless: bool) -> Self {
        if headless {
            Self::Stderr
        } else {
            Self::File(log_path())
        }
    }
}

/// Level used when `RUST_LOG` is unset.
pub fn default_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

/// Installs the global subscriber.
///
/// Fails if the log file cannot be created or a subscriber is already set.
pub fn init(sink: &LogSink, debug: bool) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(debug).into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match sink {
        LogSink::File(path) => builder
            .with_writer(open_log_file(path)?)
            .with_ansi(false)
            .try_init(),
        LogSink::Stderr => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|e| ShellError::config(format!("logging: {e}")))
}

/// Creates the log file and its parent directories, truncating an old log.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ShellError::config(format!("log directory {}: {e}", parent.display()))
        })?;
    }
    File::create(path)
        .map_err(|e| ShellError::config(format!("log file {}: {e}", path.display())))
}

/// `ishell/ishell.log` under the state directory, then the config directory,
/// then the temp directory.
pub fn log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::config_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("ishell")
        .join("ishell.log")
}

//! ishell - an embeddable, abbreviation-tolerant hierarchical command shell.
//!
//! Commands are declared as a tree of keyword and regular-expression nodes,
//! typed with IOS-style abbreviations, and read through a single-line
//! terminal editor with history, Tab completion, and `?` help.

pub mod cli;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod headless;
pub mod logging;
pub mod shell;
pub mod terminal;

pub use commands::{patterns, CommandContext, CommandNode, Invocation, NodeSpec, Registry};
pub use config::ShellConfig;
pub use error::{ResolveError, Result, ShellError};
pub use shell::Shell;

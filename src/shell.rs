//! Interactive session loop.
//!
//! [`Shell`] ties the pieces together: it reads one line through the
//! [`Reader`], resolves it against the [`Registry`], and either prints a
//! diagnostic, prints contextual help, or dispatches the bound handler with
//! the before/after hook chains around it.

use crate::commands::{help, CommandContext, CommandNode, Invocation, NodeId, NodeSpec, Registry};
use crate::config::ShellConfig;
use crate::editor::text::{display_width, token_start};
use crate::editor::{ReadOutcome, Reader};
use crate::error::{ResolveError, Result, ShellError};
use crate::terminal::{Color, Terminal};
use regex::Regex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Custom suggestion source: `(text, token start) -> candidates`.
pub type SuggestFn = Arc<dyn Fn(&str, usize) -> Vec<String> + Send + Sync>;

/// Observer fired with every non-blank line before it is resolved.
pub type EnteredHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Observer consulted before a handler runs; any `false` vetoes the dispatch.
pub type BeforeHook = Arc<dyn Fn(&CommandNode, &Invocation) -> bool + Send + Sync>;

/// Observer fired after a handler ran, whether or not it failed.
pub type AfterHook = Arc<dyn Fn(&CommandNode, &Invocation) + Send + Sync>;

const INVALID_INPUT: &str = "% Invalid input detected at '^' marker.";
const UNRECOGNIZED: &str = "% Unrecognized command";

/// An interactive command shell bound to one terminal.
pub struct Shell {
    registry: Registry,
    reader: Reader,
    term: Box<dyn Terminal>,
    prompt: String,
    prompt_color: Option<Color>,
    suggest: Option<SuggestFn>,
    on_entered: Vec<EnteredHook>,
    before_execute: Vec<BeforeHook>,
    after_execute: Vec<AfterHook>,
    executing: Option<NodeId>,
    cancel: CancellationToken,
}

impl Shell {
    /// Creates a shell with an empty registry and a `"> "` prompt.
    pub fn new(term: Box<dyn Terminal>) -> Self {
        Self {
            registry: Registry::new(),
            reader: Reader::new(),
            term,
            prompt: "> ".to_string(),
            prompt_color: None,
            suggest: None,
            on_entered: Vec::new(),
            before_execute: Vec::new(),
            after_execute: Vec::new(),
            executing: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a shell configured from `config`.
    pub fn from_config(config: &ShellConfig, term: Box<dyn Terminal>) -> Result<Self> {
        let mut shell = Self::new(term);
        shell.prompt = config.prompt.clone();
        shell.prompt_color = config.prompt_color()?;
        shell.set_tag(config.tag.as_deref());

        let history = shell.reader.history_mut();
        history.set_pool(&config.history_pool);
        history.set_enabled(config.history_enabled);
        history.set_limit(config.history_limit);

        shell.reader.set_password_char(config.password_mask());
        shell.reader.set_help_key(config.help_key);
        Ok(shell)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access to the command tree. Call [`Registry::rebind`] after changes.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Registers a node. Call [`Shell::rebind`] once all nodes are in.
    pub fn register(&mut self, spec: NodeSpec) -> Result<NodeId> {
        self.registry.register(spec)
    }

    /// Rebuilds the command tree links.
    pub fn rebind(&mut self) {
        self.registry.rebind();
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn prompt_color(&self) -> Option<Color> {
        self.prompt_color
    }

    pub fn set_prompt_color(&mut self, color: Option<Color>) {
        self.prompt_color = color;
    }

    /// Sets the active tag filter. `None` or an empty tag shows untagged roots only.
    pub fn set_tag(&mut self, tag: Option<&str>) {
        self.registry.set_tag(tag.map(str::to_string));
    }

    pub fn tag(&self) -> Option<&str> {
        self.registry.tag()
    }

    /// Switches the active history pool, creating it if unseen.
    pub fn set_history_pool(&mut self, name: &str) {
        self.reader.history_mut().set_pool(name);
    }

    pub fn history_pool(&self) -> &str {
        self.reader.history().active_name()
    }

    /// Entries of the active pool, oldest first.
    pub fn history(&self) -> &[String] {
        self.reader.history().entries()
    }

    pub fn clear_history(&mut self) {
        self.reader.history_mut().clear();
    }

    pub fn remove_last_history(&mut self) -> Option<String> {
        self.reader.history_mut().remove_last()
    }

    pub fn set_history_enabled(&mut self, enabled: bool) {
        self.reader.history_mut().set_enabled(enabled);
    }

    pub fn set_password_char(&mut self, mask: Option<char>) {
        self.reader.set_password_char(mask);
    }

    /// Enables or disables `?` as an immediate help request.
    pub fn set_help_key(&mut self, enabled: bool) {
        self.reader.set_help_key(enabled);
    }

    /// Replaces the default registry-based suggestion source.
    pub fn set_suggestions<F>(&mut self, suggest: F)
    where
        F: Fn(&str, usize) -> Vec<String> + Send + Sync + 'static,
    {
        self.suggest = Some(Arc::new(suggest));
    }

    /// Restores the default suggestion source.
    pub fn reset_suggestions(&mut self) {
        self.suggest = None;
    }

    /// Returns the completion candidates for `text`.
    pub fn suggestions(&self, text: &str, token_start: usize) -> Vec<String> {
        match &self.suggest {
            Some(suggest) => suggest(text, token_start),
            None => self.registry.get_suggestions(text, token_start),
        }
    }

    pub fn on_command_entered<F>(&mut self, hook: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_entered.push(Arc::new(hook));
    }

    pub fn before_execute<F>(&mut self, hook: F)
    where
        F: Fn(&CommandNode, &Invocation) -> bool + Send + Sync + 'static,
    {
        self.before_execute.push(Arc::new(hook));
    }

    pub fn after_execute<F>(&mut self, hook: F)
    where
        F: Fn(&CommandNode, &Invocation) + Send + Sync + 'static,
    {
        self.after_execute.push(Arc::new(hook));
    }

    /// The node whose handler is currently running.
    pub fn executing(&self) -> Option<&CommandNode> {
        self.executing.and_then(|id| self.registry.get(id))
    }

    /// Full paths of every registered command.
    pub fn command_names(&self) -> Vec<String> {
        self.registry.command_paths()
    }

    pub fn write(&mut self, text: &str) -> Result<()> {
        self.term.write(text)
    }

    pub fn write_line(&mut self, text: &str) -> Result<()> {
        self.term.write_line(text)
    }

    /// Prompts for a line outside the command loop. The line never enters history.
    ///
    /// Returns `None` if the read was stopped.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let outcome =
            self.reader
                .read_line(self.term.as_mut(), prompt, self.prompt_color, &self.cancel)?;
        Ok(completed(outcome))
    }

    /// Prompts for a secret, masked with the configured password character.
    pub fn read_password(&mut self, prompt: &str) -> Result<Option<String>> {
        let outcome = self.reader.read_password(
            self.term.as_mut(),
            prompt,
            self.prompt_color,
            &self.cancel,
        )?;
        Ok(completed(outcome))
    }

    /// Requests the loop to stop; a pending key wait returns immediately.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Token that stops this shell when cancelled.
    pub fn stop_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Runs the session loop until stopped or input ends.
    pub fn start(&mut self) -> Result<()> {
        info!(commands = self.registry.len(), "Shell started");
        let mut seed = String::new();

        while !self.cancel.is_cancelled() {
            let line = match self.read_command(&seed)? {
                ReadOutcome::Completed(text)
                | ReadOutcome::Help(text)
                | ReadOutcome::NeedsRedisplay(text) => text,
                ReadOutcome::Aborted => break,
            };
            seed.clear();

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            self.process_line(line)?;

            if let Some(rest) = line.strip_suffix('?') {
                seed = rest.to_string();
            }
        }

        info!("Shell stopped");
        Ok(())
    }

    /// Runs the session loop on a blocking worker thread.
    ///
    /// Must be called from within a Tokio runtime. The shell is handed back
    /// when the loop ends. Stop it through [`Shell::stop_handle`], taken
    /// before calling this.
    pub fn start_async(mut self) -> JoinHandle<Result<Self>> {
        tokio::task::spawn_blocking(move || {
            self.start()?;
            Ok(self)
        })
    }

    fn read_command(&mut self, seed: &str) -> Result<ReadOutcome> {
        let registry = &self.registry;
        let suggest = self.suggest.as_ref();
        let completer = |text: &str, start: usize| match suggest {
            Some(suggest) => suggest(text, start),
            None => registry.get_suggestions(text, start),
        };
        self.reader.read(
            self.term.as_mut(),
            &self.prompt,
            self.prompt_color,
            seed,
            Some(&completer),
            &self.cancel,
        )
    }

    /// Handles one entered line: help, diagnostics, or dispatch.
    pub fn process_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        for hook in &self.on_entered {
            hook(line);
        }

        if line.ends_with('?') {
            return self.show_help(line);
        }

        match self.registry.resolve(line) {
            Ok(invocation) => self.dispatch(invocation),
            Err(err) => self.report(&err),
        }
    }

    fn report(&mut self, err: &ResolveError) -> Result<()> {
        debug!(error = %err, "Resolution failed");
        match err.caret() {
            Some(caret) => {
                let indent = visible_width(&self.prompt) + caret;
                self.write_line(&format!("{}^", " ".repeat(indent)))?;
                self.write_line(INVALID_INPUT)
            }
            None => self.write_line(&format!("% {err}")),
        }
    }

    /// Prints contextual help for a line ending in `?`.
    ///
    /// `?` alone lists the roots. A partial word lists the keywords it could
    /// complete to. After a space, the children of the typed command are
    /// listed with their help text.
    fn show_help(&mut self, line: &str) -> Result<()> {
        if self
            .history()
            .last()
            .is_some_and(|last| last.trim() == line)
        {
            self.remove_last_history();
        }

        let text = line.strip_suffix('?').unwrap_or(line);
        let lines = if text.trim().is_empty() {
            self.registry.help("", "")
        } else {
            match text.rfind(' ') {
                Some(idx) if text[idx + 1..].is_empty() => self.registry.help(&text[..idx], ""),
                Some(idx) => self.registry.help(&text[..idx], &text[idx + 1..]),
                None => {
                    let chars: Vec<char> = text.chars().collect();
                    let suggestions = self.suggestions(text, token_start(&chars));
                    if suggestions.is_empty() {
                        vec![UNRECOGNIZED.to_string()]
                    } else {
                        let (width, _) = self.term.size()?;
                        help::render_grid(&suggestions, width)
                    }
                }
            }
        };

        for line in lines {
            self.write_line(&line)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, invocation: Invocation) -> Result<()> {
        let node = self
            .registry
            .get(invocation.node)
            .cloned()
            .ok_or_else(|| ShellError::internal("resolved node no longer registered"))?;
        let handler = node
            .handler()
            .cloned()
            .ok_or_else(|| ShellError::internal(format!("no handler bound to {}", node.full_path)))?;

        let approved = self
            .before_execute
            .iter()
            .map(|hook| hook(&node, &invocation))
            .fold(true, |acc, ok| acc && ok);
        if !approved {
            debug!(command = %invocation.full_command, "Dispatch vetoed");
            return Ok(());
        }

        debug!(command = %invocation.full_command, args = ?invocation.args, "Executing");
        self.executing = Some(invocation.node);
        let outcome = {
            let mut ctx = CommandContext {
                shell: self,
                node: &node,
                invocation: &invocation,
            };
            panic::catch_unwind(AssertUnwindSafe(|| handler(&mut ctx)))
        };
        self.executing = None;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(command = %invocation.full_command, error = %err, "Command failed");
                self.write_line(&format!("% Command \"{}\" failed: {err:#}", invocation.full_command))?;
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(command = %invocation.full_command, panic = %message, "Command panicked");
                self.write_line(&format!("% Command \"{}\" failed: {message}", invocation.full_command))?;
            }
        }

        for hook in &self.after_execute {
            hook(&node, &invocation);
        }
        Ok(())
    }
}

fn completed(outcome: ReadOutcome) -> Option<String> {
    match outcome {
        ReadOutcome::Completed(text) => Some(text),
        _ => None,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

/// Display width of `text` with ANSI escape sequences removed.
fn visible_width(text: &str) -> usize {
    static ANSI: OnceLock<Option<Regex>> = OnceLock::new();
    match ANSI.get_or_init(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").ok()) {
        Some(re) => display_width(&re.replace_all(text, "")),
        None => display_width(text),
    }
}

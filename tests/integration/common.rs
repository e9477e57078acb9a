//! Shared fixtures for integration tests.

use ishell::commands::{patterns, CommandContext, NodeSpec};
use ishell::shell::Shell;
use ishell::terminal::MemoryTerminal;
use std::sync::{Arc, Mutex};

/// Handler invocations recorded as `"<name> <args...>"`.
pub type Calls = Arc<Mutex<Vec<String>>>;

pub fn recorder(
    name: &'static str,
    calls: &Calls,
) -> impl Fn(&mut CommandContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static {
    let calls = calls.clone();
    move |ctx| {
        let mut entry = name.to_string();
        for arg in ctx.args() {
            entry.push(' ');
            entry.push_str(arg);
        }
        calls.lock().unwrap().push(entry);
        Ok(())
    }
}

/// Router-style tree: `show version`, `show interface <0-63>`, `set name <name>`.
pub fn router_shell(width: u16, height: u16) -> (Shell, MemoryTerminal, Calls) {
    let calls = Calls::default();
    let term = MemoryTerminal::new(width, height);
    let mut shell = Shell::new(Box::new(term.clone()));
    shell.set_prompt("R1> ");

    shell
        .register(NodeSpec::literal("show", "Show information"))
        .unwrap();
    shell
        .register(
            NodeSpec::literal("version", "Software version")
                .parent("show")
                .handler(recorder("version", &calls)),
        )
        .unwrap();
    shell
        .register(NodeSpec::literal("interface", "Interface status").parent("show"))
        .unwrap();
    shell
        .register(
            NodeSpec::regex(r"\d+", "Interface number", "<0-63>")
                .parent("show interface")
                .handler(recorder("interface", &calls)),
        )
        .unwrap();
    shell
        .register(NodeSpec::literal("set", "Set a value"))
        .unwrap();
    shell
        .register(NodeSpec::literal("name", "Host name").parent("set"))
        .unwrap();
    shell
        .register(
            NodeSpec::regex(patterns::STRING, "New name", "<name>")
                .parent("set name")
                .handler(recorder("name", &calls)),
        )
        .unwrap();
    shell.rebind();

    (shell, term, calls)
}

pub fn recorded(calls: &Calls) -> Vec<String> {
    calls.lock().unwrap().clone()
}

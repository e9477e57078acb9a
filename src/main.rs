//! ishell demo host: a small router-style command tree.

use ishell::cli::Cli;
use ishell::commands::{patterns, NodeSpec};
use ishell::config::ShellConfig;
use ishell::error::Result;
use ishell::headless::run_headless;
use ishell::logging::{self, LogSink};
use ishell::shell::Shell;
use ishell::terminal::CrosstermTerminal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", e.category(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init(&LogSink::for_run(cli.is_headless()), config.debug) {
        eprintln!("Warning: logging disabled: {e}");
    }
    info!("Loaded config from: {}", cli.config_path().display());

    let result = if cli.is_headless() {
        run_headless(&cli, &config, install_commands)
    } else {
        run_interactive(&config).await
    };

    if let Err(e) = result {
        error!("{}: {}", e.category(), e);
        eprintln!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run_interactive(config: &ShellConfig) -> Result<()> {
    let term = CrosstermTerminal::new()?;
    let mut shell = Shell::from_config(config, Box::new(term))?;
    install_commands(&mut shell)?;
    shell.write_line("ishell demo. Type ? for help, Tab to complete, \"exit\" to leave.")?;

    let stop = shell.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.cancel();
        }
    });

    let shell = shell
        .start_async()
        .await
        .map_err(|e| ishell::ShellError::internal(format!("Shell task failed: {e}")))??;
    info!(history = shell.history().len(), "Session ended");
    Ok(())
}

/// Registers the demo command tree.
fn install_commands(shell: &mut Shell) -> Result<()> {
    shell.register(NodeSpec::literal("show", "Show running system information"))?;
    shell.register(
        NodeSpec::literal("version", "System hardware and software status")
            .parent("show")
            .handler(|ctx| {
                ctx.println(&format!("ishell {}", env!("CARGO_PKG_VERSION")))?;
                Ok(())
            }),
    )?;
    shell.register(NodeSpec::literal("interface", "Interface status and configuration").parent("show"))?;
    shell.register(
        NodeSpec::regex(patterns::UINT, "Interface number", "<0-63>")
            .parent("show interface")
            .handler(|ctx| {
                let number: u32 = ctx.args()[0].parse()?;
                if number > 63 {
                    anyhow::bail!("interface {number} out of range");
                }
                ctx.println(&format!("Interface {number} is up, line protocol is up"))?;
                Ok(())
            }),
    )?;
    shell.register(
        NodeSpec::literal("history", "Display the session command history")
            .parent("show")
            .handler(|ctx| {
                let entries = ctx.shell.history().to_vec();
                let pool = ctx.shell.history_pool().to_string();
                ctx.println(&format!("History pool \"{pool}\":"))?;
                for (i, entry) in entries.iter().enumerate() {
                    ctx.println(&format!("  {:>3}  {entry}", i + 1))?;
                }
                Ok(())
            }),
    )?;
    shell.register(
        NodeSpec::literal("commands", "List every registered command")
            .parent("show")
            .handler(|ctx| {
                let paths: Vec<String> = ctx
                    .shell
                    .registry()
                    .sorted()
                    .into_iter()
                    .filter(|node| node.is_executable())
                    .map(|node| node.full_path.clone())
                    .collect();
                for path in paths {
                    ctx.println(&format!("  {path}"))?;
                }
                Ok(())
            }),
    )?;

    shell.register(NodeSpec::literal("set", "Set session parameters"))?;
    shell.register(NodeSpec::literal("name", "Host name shown in the prompt").parent("set"))?;
    shell.register(
        NodeSpec::regex(patterns::STRING, "New host name", "<name>")
            .parent("set name")
            .handler(|ctx| {
                let name = ctx.args()[0].clone();
                ctx.shell.set_prompt(format!("{name}> "));
                Ok(())
            }),
    )?;
    shell.register(NodeSpec::literal("pool", "Switch the history pool").parent("set"))?;
    shell.register(
        NodeSpec::regex(patterns::WORD, "Pool name", "<pool>")
            .parent("set pool")
            .handler(|ctx| {
                let pool = ctx.args()[0].clone();
                ctx.shell.set_history_pool(&pool);
                ctx.println(&format!("History pool is now \"{pool}\""))?;
                Ok(())
            }),
    )?;

    shell.register(NodeSpec::literal("password", "Prompt for a password").handler(|ctx| {
        match ctx.shell.read_password("Password: ")? {
            Some(secret) => ctx.println(&format!("Accepted {} characters", secret.chars().count()))?,
            None => ctx.println("Cancelled")?,
        }
        Ok(())
    }))?;
    shell.register(NodeSpec::literal("exit", "Leave the shell").handler(|ctx| {
        ctx.shell.stop();
        Ok(())
    }))?;

    shell.register(NodeSpec::literal("admin", "Administrative commands").tag("admin"))?;
    shell.register(
        NodeSpec::literal("reload", "Reload the command tree")
            .parent("admin")
            .tag("admin")
            .handler(|ctx| {
                ctx.shell.rebind();
                ctx.println("Command tree reloaded")?;
                Ok(())
            }),
    )?;

    shell.rebind();
    Ok(())
}

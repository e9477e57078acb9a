//! Headless mode, both as a library runner and through the binary.

use super::common::{recorded, recorder, Calls};
use ishell::cli::OutputFormat;
use ishell::commands::NodeSpec;
use ishell::headless::{HeadlessConfig, HeadlessOutput, HeadlessRunner};
use ishell::shell::Shell;
use std::process::Command;

fn run_binary(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_ishell"))
        .args(["--config", "/nonexistent/ishell/config.toml"])
        .args(args)
        .output()
        .expect("Failed to execute ishell");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}

#[test]
fn test_runner_reports_final_screen() {
    let config = HeadlessConfig {
        width: 40,
        height: 8,
        output_format: OutputFormat::Json,
        output_file: None,
    };
    let mut runner = HeadlessRunner::new(&config);
    runner
        .load_events("type:ping,key:enter\ntype:pong,key:enter")
        .unwrap();

    let calls = Calls::default();
    let mut shell = Shell::new(Box::new(runner.terminal()));
    shell
        .register(NodeSpec::literal("ping", "Ping").handler(recorder("ping", &calls)))
        .unwrap();
    shell.rebind();

    let result = runner.run(&mut shell).unwrap();
    assert_eq!(recorded(&calls), vec!["ping"]);
    assert_eq!(result.events_executed, 4);
    assert_eq!(result.pending_keys, 0);
    assert_eq!(result.state.history, vec!["ping", "pong"]);
    assert_eq!(result.screen_lines[0], "> ping");
    assert_eq!(result.screen_lines[1], "> pong");

    let json: serde_json::Value =
        serde_json::from_str(&HeadlessOutput::new(OutputFormat::Json).format(&result)).unwrap();
    assert_eq!(json["state"]["prompt"], "> ");
    assert_eq!(json["cursor"]["row"], 4);
}

#[test]
fn test_binary_headless_text_output() {
    let (code, stdout, _) = run_binary(&[
        "--headless",
        "--events",
        "type:sh ver,key:enter",
    ]);

    assert_eq!(code, 0, "Expected exit code 0");
    assert!(stdout.contains("> sh ver"));
    assert!(stdout.contains(&format!("ishell {}", env!("CARGO_PKG_VERSION"))));
    assert!(stdout.contains("Events: 2 executed"));
}

#[test]
fn test_binary_headless_json_output() {
    let (code, stdout, _) = run_binary(&[
        "--headless",
        "--prompt",
        "R1# ",
        "--events",
        "type:set name lab,key:enter,type:show history,key:enter",
        "--output",
        "json",
    ]);

    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["state"]["prompt"], "lab> ");
    assert_eq!(json["state"]["history"][0], "set name lab");
    assert!(stdout.contains("show history"));
}

#[test]
fn test_binary_exit_command_leaves_keys_unread() {
    let (code, stdout, _) = run_binary(&[
        "--headless",
        "--events",
        "type:exit,key:enter,type:show version,key:enter",
    ]);

    assert_eq!(code, 0);
    assert!(stdout.contains("keys unread"));
    assert!(!stdout.contains("ishell 0"));
}

#[test]
fn test_binary_headless_requires_events() {
    let (code, _, stderr) = run_binary(&["--headless"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("requires --events or --script"));
}

#[test]
fn test_binary_rejects_bad_event() {
    let (code, _, stderr) = run_binary(&["--headless", "--events", "click:here"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown event type"));
}

//! End-to-end sessions: scripted keys in, screen and handler calls out.

use super::common::{recorded, recorder, router_shell};
use ishell::commands::NodeSpec;
use pretty_assertions::assert_eq;

#[test]
fn test_abbreviated_commands_dispatch() {
    let (mut shell, term, calls) = router_shell(60, 20);
    term.push_script("type:sho ver,key:enter,type:show int 3,key:enter")
        .unwrap();
    shell.start().unwrap();

    assert_eq!(recorded(&calls), vec!["version", "interface 3"]);
    assert_eq!(term.line(0), "R1> sho ver");
    assert_eq!(term.line(1), "R1> show int 3");
}

#[test]
fn test_quoted_argument_reaches_handler_unquoted() {
    let (mut shell, _, calls) = router_shell(60, 20);
    shell.process_line(r#"set name "core router""#).unwrap();
    shell.process_line("set name edge").unwrap();
    assert_eq!(recorded(&calls), vec!["name core router", "name edge"]);
}

#[test]
fn test_resolution_diagnostics() {
    let (mut shell, term, calls) = router_shell(60, 20);
    term.push_script("type:sho,key:enter,type:shx,key:enter,type:show verz,key:enter")
        .unwrap();
    shell.start().unwrap();

    assert!(recorded(&calls).is_empty());
    assert_eq!(
        term.screen_lines(),
        vec![
            "R1> sho",
            "% Ambiguous command: \"sho\"",
            "R1> shx",
            "    ^",
            "% Invalid input detected at '^' marker.",
            "R1> show verz",
            "         ^",
            "% Invalid input detected at '^' marker.",
            "R1>",
        ]
    );
}

#[test]
fn test_tab_completes_unique_keyword() {
    let (mut shell, term, calls) = router_shell(60, 20);
    term.push_script("type:sh,key:tab,type:ver,key:tab,key:enter")
        .unwrap();
    shell.start().unwrap();

    assert_eq!(recorded(&calls), vec!["version"]);
    assert_eq!(term.line(0), "R1> show version");
    assert_eq!(shell.history(), ["show version "]);
    assert_eq!(term.bell_count(), 0);
}

#[test]
fn test_tab_with_several_candidates_prints_grid() {
    let (mut shell, term, calls) = router_shell(60, 20);
    term.push_script("type:s,key:tab,type:how ver,key:enter")
        .unwrap();
    shell.start().unwrap();

    assert_eq!(recorded(&calls), vec!["version"]);
    assert_eq!(term.bell_count(), 1);
    let screen = term.screen_lines();
    assert_eq!(screen[0], "R1> s");
    assert_eq!(screen[1], "show     set");
    assert_eq!(screen[3], "R1> show ver");
}

#[test]
fn test_question_mark_lists_children_and_reprompts() {
    let (mut shell, term, calls) = router_shell(60, 20);
    term.push_script("type:show ?,type:int 12,key:enter").unwrap();
    shell.start().unwrap();

    assert_eq!(recorded(&calls), vec!["interface 12"]);
    let screen = term.screen_lines();
    assert_eq!(screen[0], "R1> show ?");
    assert_eq!(screen[1], "  interface     Interface status");
    assert_eq!(screen[2], "  version       Software version");
    assert_eq!(screen[4], "R1> show int 12");
    assert_eq!(shell.history(), ["show int 12"]);
}

#[test]
fn test_history_recall_runs_previous_command() {
    let (mut shell, term, calls) = router_shell(60, 20);
    term.push_script("type:sh ver,key:enter,key:up,key:enter").unwrap();
    shell.start().unwrap();

    assert_eq!(recorded(&calls), vec!["version", "version"]);
    assert_eq!(shell.history(), ["sh ver"]);
}

#[test]
fn test_tagged_commands_appear_after_tag_switch() {
    let (mut shell, term, calls) = router_shell(60, 20);
    shell
        .register(
            NodeSpec::literal("reload", "Reload the device")
                .tag("admin")
                .handler(recorder("reload", &calls)),
        )
        .unwrap();
    shell.rebind();

    shell.process_line("reload").unwrap();
    assert_eq!(term.line(1), "% Invalid input detected at '^' marker.");

    shell.set_tag(Some("admin"));
    shell.process_line("rel").unwrap();
    assert_eq!(recorded(&calls), vec!["reload"]);
}

#[test]
fn test_handler_stops_session() {
    let (mut shell, term, calls) = router_shell(60, 20);
    shell
        .register(NodeSpec::literal("exit", "Leave").handler(|ctx| {
            ctx.shell.stop();
            Ok(())
        }))
        .unwrap();
    shell.rebind();

    term.push_script("type:exit,key:enter,type:sh ver,key:enter").unwrap();
    shell.start().unwrap();

    assert!(shell.is_stopped());
    assert!(recorded(&calls).is_empty());
    assert_eq!(term.pending_keys(), 7);
}

#[test]
fn test_handler_changes_prompt() {
    let (mut shell, term, _) = router_shell(60, 20);
    shell
        .register(
            NodeSpec::literal("hostname", "Rename").handler(|ctx| {
                ctx.shell.set_prompt("core> ");
                Ok(())
            }),
        )
        .unwrap();
    shell.rebind();

    term.push_script("type:hostname,key:enter,type:sh ver,key:enter").unwrap();
    shell.start().unwrap();
    assert_eq!(term.line(1), "core> sh ver");
}

#[tokio::test]
async fn test_start_async_hands_shell_back() {
    let (shell, term, calls) = router_shell(60, 20);
    term.push_script("type:sh ver,key:enter").unwrap();

    let shell = shell.start_async().await.unwrap().unwrap();
    assert_eq!(recorded(&calls), vec!["version"]);
    assert_eq!(shell.history(), ["sh ver"]);
}

#[tokio::test]
async fn test_stop_handle_cancels_async_session() {
    let (shell, term, calls) = router_shell(60, 20);
    term.push_script("type:sh ver,key:enter").unwrap();

    let stop = shell.stop_handle();
    stop.cancel();
    let shell = shell.start_async().await.unwrap().unwrap();
    assert!(shell.is_stopped());
    assert!(recorded(&calls).is_empty());
}

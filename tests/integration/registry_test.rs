//! Registry tests through the public API: registration rules, abbreviation
//! and resolution diagnostics.

use ishell::commands::{tokenize, NodeSpec, Registry};
use ishell::{ResolveError, ShellError};
use pretty_assertions::assert_eq;

fn noop(_: &mut ishell::CommandContext<'_>) -> anyhow::Result<()> {
    Ok(())
}

fn router() -> Registry {
    let mut registry = Registry::new();
    registry.register(NodeSpec::literal("show", "Show information")).unwrap();
    registry
        .register(NodeSpec::literal("version", "Software version").parent("show").handler(noop))
        .unwrap();
    registry
        .register(NodeSpec::literal("interface", "Interface status").parent("show"))
        .unwrap();
    registry
        .register(
            NodeSpec::regex(r"\d+", "Interface number", "<0-63>")
                .parent("show interface")
                .handler(noop),
        )
        .unwrap();
    registry.register(NodeSpec::literal("set", "Set a value").handler(noop)).unwrap();
    registry.rebind();
    registry
}

#[test]
fn test_tokenize_keeps_quoted_runs_together() {
    assert_eq!(
        tokenize(r#"set name "core router" now"#, false),
        vec!["set", "name", "\"core router\"", "now"]
    );
    assert_eq!(
        tokenize(r#"set name "core router" now"#, true),
        vec!["set", "name", "core router", "now"]
    );
}

#[test]
fn test_unique_prefix_resolves() {
    let registry = router();
    let invocation = registry.resolve("sh ver").unwrap();
    assert_eq!(invocation.full_command, "show version");
    assert_eq!(registry.resolve_full("sh int 7").as_deref(), Some("show interface 7"));
}

#[test]
fn test_shared_prefix_is_ambiguous() {
    let registry = router();
    let err = registry.resolve("s").unwrap_err();
    assert!(matches!(err, ResolveError::AmbiguousCommand { .. }));
    assert_eq!(err.to_string(), "Ambiguous command: \"s\"");
}

#[test]
fn test_keyword_wins_over_matching_regex() {
    let mut registry = Registry::new();
    registry
        .register(NodeSpec::regex("sh.*", "Anything starting with sh", "<sh*>").handler(noop))
        .unwrap();
    registry
        .register(NodeSpec::literal("show", "Show information").handler(noop))
        .unwrap();
    registry.rebind();

    let invocation = registry.resolve("show").unwrap();
    assert!(invocation.args.is_empty());
    assert_eq!(registry.get(invocation.node).unwrap().pattern, "show");

    let invocation = registry.resolve("shell").unwrap();
    assert_eq!(invocation.args, vec!["shell"]);
}

#[test]
fn test_duplicate_registration() {
    let mut registry = router();
    let err = registry
        .register(NodeSpec::literal("version", "Software version").parent("show"))
        .unwrap_err();
    assert!(matches!(err, ShellError::DuplicateCommand(_)));

    // Same path with different help text is a distinct identity
    assert!(registry
        .register(NodeSpec::literal("version", "Firmware version").parent("show"))
        .is_ok());
}

#[test]
fn test_regex_node_needs_help_label() {
    let mut registry = Registry::new();
    let err = registry
        .register(NodeSpec::regex(r"\d+", "Number", ""))
        .unwrap_err();
    assert_eq!(err.category(), "Regular Help Missing");
}

#[test]
fn test_diagnostic_carets() {
    let registry = router();
    assert_eq!(
        registry.resolve("shx").unwrap_err(),
        ResolveError::UnknownCommand { caret: 0 }
    );
    assert_eq!(
        registry.resolve("show interface x").unwrap_err(),
        ResolveError::InvalidInputAtPosition { caret: 15 }
    );
}

#[test]
fn test_tagged_roots_follow_filter() {
    let mut registry = router();
    registry
        .register(NodeSpec::literal("reload", "Reload").tag("admin").handler(noop))
        .unwrap();
    registry.rebind();

    assert!(registry.resolve("reload").is_err());
    registry.set_tag(Some("admin".to_string()));
    assert!(registry.resolve("reload").is_ok());
    assert!(registry.resolve("show version").is_ok());
}

#[test]
fn test_help_for_command_lists_children() {
    let registry = router();
    assert_eq!(
        registry.help("sh int", ""),
        vec!["  <0-63>     Interface number", ""]
    );
}

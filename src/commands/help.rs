//! Help rendering.
//!
//! Produces plain text lines; the session loop writes them to the terminal.

use super::node::CommandNode;
use crate::editor::text::{display_width, pad_right};

/// Label column width used when there is nothing to list.
const DEFAULT_LABEL_WIDTH: usize = 15;

/// Gap between the label column and the help text, and between grid cells.
const COLUMN_GAP: usize = 5;

/// Label of the synthetic entry marking an already executable command.
pub const CR_LABEL: &str = "<cr>";

/// Renders a help listing for `nodes`.
///
/// Hidden nodes are skipped. Entries are sorted by label (the regex help for
/// regex nodes, the keyword otherwise) and indented by two spaces, with the
/// label column padded to the widest label plus a gap. With `show_cr` a
/// trailing `<cr>` entry is added. The listing ends with a blank line.
pub fn render_listing(nodes: &[&CommandNode], show_cr: bool) -> Vec<String> {
    let mut visible: Vec<&CommandNode> = nodes.iter().copied().filter(|n| !n.hidden).collect();
    visible.sort_by(|a, b| a.label().cmp(b.label()));

    let label_width = visible
        .iter()
        .map(|n| display_width(n.label()))
        .max()
        .unwrap_or(DEFAULT_LABEL_WIDTH)
        + COLUMN_GAP;

    let mut lines: Vec<String> = visible
        .iter()
        .map(|n| format!("  {}{}", pad_right(n.label(), label_width), n.help_text))
        .collect();

    if show_cr {
        lines.push(format!("  {}{}", pad_right(CR_LABEL, label_width), CR_LABEL));
    }
    lines.push(String::new());
    lines
}

/// Lays out `items` in a column grid that fits `width` columns.
///
/// Every cell is as wide as the widest item plus a gap. The grid is followed
/// by a blank line.
pub fn render_grid(items: &[String], width: u16) -> Vec<String> {
    let mut lines = Vec::new();
    if items.is_empty() {
        lines.push(String::new());
        return lines;
    }

    let cell = items.iter().map(|s| display_width(s)).max().unwrap_or(0) + COLUMN_GAP;
    let cols = ((width as usize).saturating_sub(4) / cell).max(1);

    for row in items.chunks(cols) {
        let line: String = row.iter().map(|s| pad_right(s, cell)).collect();
        lines.push(line);
    }
    lines.push(String::new());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{NodeSpec, Registry};
    use pretty_assertions::assert_eq;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(NodeSpec::literal("show", "Show information")).unwrap();
        registry
            .register(NodeSpec::literal("version", "Software version").parent("show"))
            .unwrap();
        registry
            .register(NodeSpec::regex(r"\d+", "Interface number", "<0-63>").parent("show"))
            .unwrap();
        registry
            .register(NodeSpec::literal("debug", "Internal").parent("show").hidden(true))
            .unwrap();
        registry.rebind();
        registry
    }

    #[test]
    fn test_listing_sorted_and_padded() {
        let registry = registry();
        let show = registry.find("show").unwrap();
        let nodes = registry.children_of(show);
        let lines = render_listing(&nodes, false);
        assert_eq!(
            lines,
            vec![
                "  <0-63>      Interface number".to_string(),
                "  version     Software version".to_string(),
                String::new(),
            ]
        );
    }

    #[test]
    fn test_listing_with_cr() {
        let registry = registry();
        let show = registry.find("show").unwrap();
        let nodes = registry.children_of(show);
        let lines = render_listing(&nodes, true);
        assert_eq!(lines[2], "  <cr>        <cr>");
    }

    #[test]
    fn test_empty_listing_uses_default_width() {
        let lines = render_listing(&[], true);
        assert_eq!(lines[0], format!("  {}<cr>", pad_right("<cr>", 20)));
    }

    #[test]
    fn test_grid_wraps_columns() {
        let items: Vec<String> = ["alpha", "beta", "gamma"].iter().map(|s| s.to_string()).collect();
        // cell = 5 + 5 = 10, cols = (24 - 4) / 10 = 2
        let lines = render_grid(&items, 24);
        assert_eq!(
            lines,
            vec![
                "alpha     beta      ".to_string(),
                "gamma     ".to_string(),
                String::new(),
            ]
        );
    }

    #[test]
    fn test_grid_narrow_terminal_keeps_one_column() {
        let items = vec!["interface".to_string(), "version".to_string()];
        let lines = render_grid(&items, 8);
        assert_eq!(lines.len(), 3);
    }
}

//! Command registry and resolution engine.
//!
//! Nodes live in a flat arena in registration order. [`Registry::rebind`]
//! links them into a tree by parent path; everything else walks that tree.
//! Removing a node leaves a tombstone so ids stay stable; links are only
//! recomputed by the next rebind.

use super::help;
use super::node::{CommandNode, Handler, NodeId, NodeSpec};
use super::tokenizer::{strip_quotes, tokenize};
use crate::editor::text::display_width;
use crate::error::{ResolveError, Result, ShellError};
use regex::Regex;
use tracing::debug;

/// A line resolved to exactly one executable node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The resolved node.
    pub node: NodeId,
    /// Canonical command: keywords spelled out, regex tokens as typed.
    pub full_command: String,
    /// Tokens of `full_command`, quotes stripped.
    pub tokens: Vec<String>,
    /// Tokens matched by regex nodes, quotes stripped.
    pub args: Vec<String>,
}

/// Result of walking typed tokens down the tree.
#[derive(Debug, Default)]
struct Walk {
    /// One resolved node per consumed token.
    path: Vec<NodeId>,
    /// Nodes matching the token where the walk ended (the failing token, or the last one).
    matches: Vec<NodeId>,
}

impl Walk {
    fn is_complete(&self, token_count: usize) -> bool {
        token_count > 0 && self.path.len() == token_count
    }
}

/// Arena of command nodes.
#[derive(Debug, Default)]
pub struct Registry {
    slots: Vec<Option<CommandNode>>,
    /// Active tag filter for root visibility.
    tag_filter: Option<String>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node.
    ///
    /// Fails on a malformed definition, a duplicate identity, a regex node
    /// without help label, or a regex that does not compile. The tree is not
    /// relinked until [`rebind`](Self::rebind) is called.
    pub fn register(&mut self, spec: NodeSpec) -> Result<NodeId> {
        if spec.pattern.is_empty() {
            return Err(ShellError::malformed(format!(
                "empty pattern under \"{}\"",
                spec.parent
            )));
        }
        if spec.pattern.chars().any(char::is_whitespace) {
            return Err(ShellError::malformed(format!(
                "pattern \"{}\" contains whitespace",
                spec.pattern
            )));
        }
        if spec.parent.ends_with(char::is_whitespace) {
            return Err(ShellError::malformed(format!(
                "parent \"{}\" ends with whitespace",
                spec.parent
            )));
        }

        let key = spec.key();
        if self.nodes().any(|(_, node)| node.key() == key) {
            return Err(ShellError::duplicate(format!(
                "\"{}\" is already registered",
                key.full_path
            )));
        }
        let full_path = key.full_path;

        let matcher = if spec.is_regex {
            if spec.regex_help.is_empty() {
                return Err(ShellError::regular_help_missing(full_path));
            }
            let compiled = Regex::new(&format!("^(?:{})$", spec.pattern)).map_err(|e| {
                ShellError::invalid_pattern(format!("\"{}\": {e}", spec.pattern))
            })?;
            Some(compiled)
        } else {
            None
        };

        let id = NodeId(self.slots.len());
        debug!(path = %full_path, regex = spec.is_regex, "Registered command");
        self.slots.push(Some(CommandNode::from_spec(spec, matcher)));
        Ok(id)
    }

    /// Recomputes every node's children and level from the parent paths.
    pub fn rebind(&mut self) {
        for node in self.slots.iter_mut().flatten() {
            node.children.clear();
            node.level = 0;
        }

        let roots: Vec<NodeId> = self
            .nodes()
            .filter(|(_, node)| node.is_root())
            .map(|(id, _)| id)
            .collect();

        let mut stack = Vec::new();
        for root in roots {
            self.link(root, 1, &mut stack);
        }
        debug!(nodes = self.len(), "Rebound command tree");
    }

    fn link(&mut self, id: NodeId, level: usize, stack: &mut Vec<NodeId>) {
        let Some(node) = self.slot_mut(id) else {
            return;
        };
        node.level = level;
        node.children.clear();

        let (built, tag) = (node.full_path.clone(), node.tag.clone());
        stack.push(id);

        let children: Vec<NodeId> = self
            .nodes()
            .filter(|(cid, child)| {
                *cid != id
                    && !stack.contains(cid)
                    && child.tag == tag
                    && child.accepts_parent(&built)
            })
            .map(|(cid, _)| cid)
            .collect();

        if let Some(node) = self.slot_mut(id) {
            node.children = children.clone();
        }
        for child in children {
            self.link(child, level + 1, stack);
        }

        stack.pop();
    }

    /// Removes the node that `path` resolves to. Returns false if nothing matched.
    ///
    /// Links are left as they are until the next rebind.
    pub fn remove(&mut self, path: &str) -> bool {
        match self.find(path) {
            Some(id) => {
                debug!(path, "Removed command");
                self.slots[id.0] = None;
                true
            }
            None => false,
        }
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Sets the tag filter. `None` shows untagged roots only.
    pub fn set_tag(&mut self, tag: Option<String>) {
        self.tag_filter = tag.filter(|t| !t.is_empty());
    }

    /// Returns the active tag filter.
    pub fn tag(&self) -> Option<&str> {
        self.tag_filter.as_deref()
    }

    /// Returns the number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns true if no nodes are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a node by id.
    pub fn get(&self, id: NodeId) -> Option<&CommandNode> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut CommandNode> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Iterates live nodes in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &CommandNode)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|node| (NodeId(i), node)))
    }

    /// Returns the live children of a node.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id)
            .map(|node| {
                node.children
                    .iter()
                    .copied()
                    .filter(|child| self.get(*child).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the live children of a node as references.
    pub fn children_of(&self, id: NodeId) -> Vec<&CommandNode> {
        self.children(id)
            .into_iter()
            .filter_map(|child| self.get(child))
            .collect()
    }

    /// Returns the roots visible under the current tag filter, in registration order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, node)| node.is_root() && self.tag_visible(node))
            .map(|(id, _)| id)
            .collect()
    }

    fn tag_visible(&self, node: &CommandNode) -> bool {
        match (&node.tag, &self.tag_filter) {
            (None, _) => true,
            (Some(tag), Some(filter)) => tag == filter,
            (Some(_), None) => false,
        }
    }

    /// Returns the node whose full path equals this node's parent path.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        if node.is_root() {
            return None;
        }
        self.nodes()
            .find(|(_, candidate)| candidate.full_path == node.parent_path)
            .map(|(pid, _)| pid)
    }

    /// Returns the full path of every live node, in registration order.
    pub fn command_paths(&self) -> Vec<String> {
        self.nodes().map(|(_, node)| node.full_path.clone()).collect()
    }

    /// Returns live nodes ordered untagged first, then by tag, then by full path.
    pub fn sorted(&self) -> Vec<&CommandNode> {
        let mut nodes: Vec<&CommandNode> = self.nodes().map(|(_, node)| node).collect();
        nodes.sort_by(|a, b| {
            (a.tag.is_some(), &a.tag, &a.full_path).cmp(&(b.tag.is_some(), &b.tag, &b.full_path))
        });
        nodes
    }

    /// Finds a node by full path, exact spelling first, then by abbreviation.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        if let Some((id, _)) = self
            .nodes()
            .find(|(_, node)| node.full_path == path && self.root_of_visible(node))
        {
            return Some(id);
        }

        let tokens = tokenize(path, false);
        let walk = self.walk(&tokens, false);
        if walk.is_complete(tokens.len()) {
            walk.path.last().copied()
        } else {
            None
        }
    }

    fn root_of_visible(&self, node: &CommandNode) -> bool {
        !node.is_root() || self.tag_visible(node)
    }

    /// Returns the handler bound to the node `path` resolves to.
    pub fn handler_of(&self, path: &str) -> Option<Handler> {
        self.find(path)
            .and_then(|id| self.get(id))
            .and_then(|node| node.handler.clone())
    }

    /// Picks the single node a token selects among its matches.
    ///
    /// One match wins outright. Otherwise exactly one keyword match wins, or,
    /// with no keyword matches, exactly one regex match.
    fn select(&self, matches: &[NodeId]) -> Option<NodeId> {
        if let [only] = matches {
            return Some(*only);
        }
        let (literals, regexes): (Vec<NodeId>, Vec<NodeId>) = matches
            .iter()
            .copied()
            .partition(|id| self.get(*id).is_some_and(|n| !n.is_regex));
        match (literals.as_slice(), regexes.as_slice()) {
            ([only], _) => Some(*only),
            ([], [only]) => Some(*only),
            _ => None,
        }
    }

    fn walk(&self, tokens: &[String], ignore_regex_final: bool) -> Walk {
        let mut walk = Walk::default();
        let mut level = self.roots();
        let last = tokens.len().saturating_sub(1);

        for (i, token) in tokens.iter().enumerate() {
            let skip_regex = ignore_regex_final && i == last;
            walk.matches = level
                .iter()
                .copied()
                .filter(|id| {
                    self.get(*id)
                        .is_some_and(|n| !(skip_regex && n.is_regex) && n.matches(token))
                })
                .collect();

            match self.select(&walk.matches) {
                Some(id) => {
                    walk.path.push(id);
                    level = self.children(id);
                }
                None => break,
            }
        }

        walk
    }

    /// Resolves a line to its canonical full command, if every token maps to one node.
    pub fn resolve_full(&self, line: &str) -> Option<String> {
        let tokens = tokenize(line, false);
        let walk = self.walk(&tokens, false);
        if !walk.is_complete(tokens.len()) {
            return None;
        }
        Some(self.canonical(&walk.path, &tokens).join(" "))
    }

    fn canonical(&self, path: &[NodeId], tokens: &[String]) -> Vec<String> {
        path.iter()
            .zip(tokens)
            .filter_map(|(id, token)| {
                self.get(*id).map(|node| {
                    if node.is_regex {
                        token.clone()
                    } else {
                        node.pattern.clone()
                    }
                })
            })
            .collect()
    }

    /// Returns the nodes the last token of `line` could stand for.
    ///
    /// An empty line or one ending in whitespace asks for every child of the
    /// resolved prefix. Regex nodes are left out for the last token when
    /// `ignore_regex_final` is set. A prefix that does not resolve yields nothing.
    pub fn candidates(&self, line: &str, ignore_regex_final: bool) -> Vec<NodeId> {
        let mut tokens = tokenize(line, false);
        if line.is_empty() || line.ends_with(char::is_whitespace) {
            tokens.push(String::new());
        }

        let walk = self.walk(&tokens, ignore_regex_final);
        if walk.path.len() + 1 >= tokens.len() {
            walk.matches
        } else {
            Vec::new()
        }
    }

    /// Default suggestion source: keywords the last token may complete to.
    pub fn get_suggestions(&self, text: &str, _token_index: usize) -> Vec<String> {
        let mut suggestions: Vec<String> = Vec::new();
        for id in self.candidates(text, true) {
            if let Some(node) = self.get(id) {
                if !suggestions.contains(&node.pattern) {
                    suggestions.push(node.pattern.clone());
                }
            }
        }
        suggestions
    }

    /// Resolves a line to a single executable command.
    pub fn resolve(&self, line: &str) -> std::result::Result<Invocation, ResolveError> {
        let tokens = tokenize(line, false);
        if tokens.is_empty() {
            return Err(ResolveError::UnknownCommand { caret: 0 });
        }

        let walk = self.walk(&tokens, false);
        debug!(line, resolved = walk.path.len(), tokens = tokens.len(), "Resolving");

        if !walk.is_complete(tokens.len()) {
            let failed_at = walk.path.len();
            if walk.matches.len() > 1 {
                return Err(self.ambiguous(line, &walk.matches));
            }
            if failed_at == 0 {
                return Err(ResolveError::UnknownCommand { caret: 0 });
            }
            let caret = display_width(&tokens[..failed_at].join(" ")) + 1;
            return Err(ResolveError::InvalidInputAtPosition { caret });
        }

        let Some(&id) = walk.path.last() else {
            return Err(ResolveError::UnknownCommand { caret: 0 });
        };
        let executable = self.get(id).is_some_and(CommandNode::is_executable);
        if !executable {
            // Incomplete command: the keyword alone does nothing
            return Err(self.ambiguous(line, &self.children(id)));
        }

        let canonical = self.canonical(&walk.path, &tokens);
        let args = walk
            .path
            .iter()
            .zip(&tokens)
            .filter(|(node, _)| self.get(**node).is_some_and(|n| n.is_regex))
            .map(|(_, token)| strip_quotes(token).to_string())
            .collect();
        let full_command = canonical.join(" ");

        Ok(Invocation {
            node: id,
            tokens: tokenize(&full_command, true),
            full_command,
            args,
        })
    }

    fn ambiguous(&self, line: &str, ids: &[NodeId]) -> ResolveError {
        ResolveError::AmbiguousCommand {
            input: line.to_string(),
            candidates: ids
                .iter()
                .filter_map(|id| self.get(*id))
                .map(|node| node.label().to_string())
                .collect(),
        }
    }

    /// Renders contextual help for `command`.
    ///
    /// An empty command lists the visible roots. Otherwise the children of the
    /// node `command` resolves to are listed, filtered by the `sub` prefix when
    /// given, with `<cr>` appended if none of the children is required.
    pub fn help(&self, command: &str, sub: &str) -> Vec<String> {
        let command = command.trim();
        if command.is_empty() {
            let roots: Vec<&CommandNode> =
                self.roots().into_iter().filter_map(|id| self.get(id)).collect();
            return help::render_listing(&roots, false);
        }

        let Some(id) = self.find(command) else {
            let typed = if sub.is_empty() {
                command.to_string()
            } else {
                format!("{command} {sub}")
            };
            let tokens = tokenize(command, false);
            let message = if self.walk(&tokens, false).matches.len() > 1 {
                format!("% Ambiguous command: \"{typed}\"")
            } else {
                format!("% Unknown command: \"{typed}\"")
            };
            return vec![message, String::new()];
        };

        let children = self.children_of(id);
        let show_cr = !children.iter().any(|child| child.required);
        let listed: Vec<&CommandNode> = if sub.is_empty() {
            children
        } else {
            children.into_iter().filter(|c| c.matches(sub)).collect()
        };
        help::render_listing(&listed, show_cr)
    }
}

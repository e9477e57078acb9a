//! Command tree nodes.
//!
//! A node is one word of a command: either a literal keyword that may be
//! abbreviated to any prefix, or a regular expression that matches a typed
//! argument. Nodes are declared with [`NodeSpec`] and stored in the
//! [`Registry`](super::Registry) arena, which links them into a tree by
//! matching each node's parent path against the paths of other nodes.

use crate::commands::registry::Invocation;
use crate::shell::Shell;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Stable index of a node inside the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Context provided to command handlers.
pub struct CommandContext<'a> {
    /// The running shell (prompt, history, registry, stop control).
    pub shell: &'a mut Shell,
    /// The node that was resolved.
    pub node: &'a CommandNode,
    /// The resolved command and its arguments.
    pub invocation: &'a Invocation,
}

impl CommandContext<'_> {
    /// Returns the tokens matched by regular-expression nodes, quotes stripped.
    pub fn args(&self) -> &[String] {
        &self.invocation.args
    }

    /// Returns every token of the canonical command, quotes stripped.
    pub fn tokens(&self) -> &[String] {
        &self.invocation.tokens
    }

    /// Writes a line to the shell's terminal.
    pub fn println(&mut self, text: &str) -> crate::error::Result<()> {
        self.shell.write_line(text)
    }
}

/// Callback bound to an executable node.
pub type Handler = Arc<dyn Fn(&mut CommandContext<'_>) -> anyhow::Result<()> + Send + Sync>;

/// Identity of a node for duplicate detection.
///
/// Help text is part of the identity, so the same path registered twice with
/// different help text yields two distinct nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub full_path: String,
    pub tag: Option<String>,
    pub hidden: bool,
    pub required: bool,
    pub help_text: String,
}

/// A registered command node.
#[derive(Clone)]
pub struct CommandNode {
    /// Literal keyword or regular expression.
    pub pattern: String,
    /// True if `pattern` is a regular expression.
    pub is_regex: bool,
    /// Description shown in help listings.
    pub help_text: String,
    /// Label shown in place of the pattern for regex nodes (e.g. `<1-4094>`).
    pub regex_help: String,
    /// Full path of the parent (empty for roots). May itself be a regex.
    pub parent_path: String,
    /// Category label; roots with a tag are only visible under that tag filter.
    pub tag: Option<String>,
    /// If any child is required, the node is not executable on its own in help output.
    pub required: bool,
    /// Hidden nodes resolve normally but never appear in help.
    pub hidden: bool,
    /// Depth in the tree (roots are 1); recomputed by rebind.
    pub level: usize,
    /// `parent_path + " " + pattern`, or just `pattern` for roots.
    pub full_path: String,
    pub(crate) children: Vec<NodeId>,
    pub(crate) handler: Option<Handler>,
    matcher: Option<Regex>,
    parent_matcher: Option<Regex>,
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("full_path", &self.full_path)
            .field("is_regex", &self.is_regex)
            .field("tag", &self.tag)
            .field("required", &self.required)
            .field("hidden", &self.hidden)
            .field("level", &self.level)
            .field("children", &self.children)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl CommandNode {
    /// Builds a node from its declaration.
    ///
    /// Pattern validity is checked by the registry before this is called.
    pub(crate) fn from_spec(spec: NodeSpec, matcher: Option<Regex>) -> Self {
        let full_path = if spec.parent.is_empty() {
            spec.pattern.clone()
        } else {
            format!("{} {}", spec.parent, spec.pattern)
        };
        // Parents that are not valid regexes still link by exact path
        let parent_matcher = if spec.parent.is_empty() {
            None
        } else {
            Regex::new(&format!("^(?:{})$", spec.parent)).ok()
        };

        Self {
            pattern: spec.pattern,
            is_regex: spec.is_regex,
            help_text: spec.help_text,
            regex_help: spec.regex_help,
            parent_path: spec.parent,
            tag: spec.tag,
            required: spec.required,
            hidden: spec.hidden,
            level: 0,
            full_path,
            children: Vec::new(),
            handler: spec.handler,
            matcher,
            parent_matcher,
        }
    }

    /// Returns true if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_path.is_empty()
    }

    /// Returns the child ids as linked by the last rebind.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns true if a handler is bound.
    pub fn is_executable(&self) -> bool {
        self.handler.is_some()
    }

    /// Returns the bound handler, if any.
    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// Returns the label used in help listings.
    pub fn label(&self) -> &str {
        if self.is_regex {
            &self.regex_help
        } else {
            &self.pattern
        }
    }

    /// Returns the duplicate-detection key.
    pub fn key(&self) -> NodeKey {
        NodeKey {
            full_path: self.full_path.clone(),
            tag: self.tag.clone(),
            hidden: self.hidden,
            required: self.required,
            help_text: self.help_text.clone(),
        }
    }

    /// Tests a typed token against this node.
    ///
    /// Literal nodes accept any prefix of their keyword, including the empty
    /// token. Regex nodes require a full match.
    pub fn matches(&self, token: &str) -> bool {
        if self.is_regex {
            self.matcher.as_ref().is_some_and(|re| re.is_match(token))
        } else {
            self.pattern.starts_with(token)
        }
    }

    /// Tests whether this node hangs under a parent whose built path is `path`.
    pub(crate) fn accepts_parent(&self, path: &str) -> bool {
        if self.parent_path.is_empty() {
            return false;
        }
        self.parent_path == path
            || self
                .parent_matcher
                .as_ref()
                .is_some_and(|re| re.is_match(path))
    }
}

/// Declaration of a node, passed to [`Registry::register`](super::Registry::register).
///
/// ```ignore
/// registry.register(
///     NodeSpec::regex(patterns::UINT, "Interface number", "<0-63>")
///         .parent("show interface")
///         .handler(|ctx| ctx.println(&format!("interface {}", ctx.args()[0])).map_err(Into::into)),
/// )?;
/// ```
#[derive(Clone)]
pub struct NodeSpec {
    pub(crate) pattern: String,
    pub(crate) is_regex: bool,
    pub(crate) help_text: String,
    pub(crate) regex_help: String,
    pub(crate) parent: String,
    pub(crate) tag: Option<String>,
    pub(crate) required: bool,
    pub(crate) hidden: bool,
    pub(crate) handler: Option<Handler>,
}

impl NodeSpec {
    /// Declares a literal keyword node.
    pub fn literal(pattern: impl Into<String>, help_text: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            is_regex: false,
            help_text: help_text.into(),
            regex_help: String::new(),
            parent: String::new(),
            tag: None,
            required: true,
            hidden: false,
            handler: None,
        }
    }

    /// Declares a regular-expression node. `regex_help` is the label shown in help.
    pub fn regex(
        pattern: impl Into<String>,
        help_text: impl Into<String>,
        regex_help: impl Into<String>,
    ) -> Self {
        Self {
            is_regex: true,
            regex_help: regex_help.into(),
            ..Self::literal(pattern, help_text)
        }
    }

    /// Sets the full path of the parent node.
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = parent.into();
        self
    }

    /// Sets the category tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Marks whether the node is a required child (default `true`).
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Hides the node from help listings.
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Binds the handler invoked when this node is the resolved command.
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut CommandContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Binds an already shared handler.
    pub fn shared_handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Returns the path the node will have once registered.
    pub fn full_path(&self) -> String {
        if self.parent.is_empty() {
            self.pattern.clone()
        } else {
            format!("{} {}", self.parent, self.pattern)
        }
    }

    /// Returns the duplicate-detection key the node will have once registered.
    pub fn key(&self) -> NodeKey {
        NodeKey {
            full_path: self.full_path(),
            tag: self.tag.clone(),
            hidden: self.hidden,
            required: self.required,
            help_text: self.help_text.clone(),
        }
    }
}

//! Command tree, tokenizer, and resolution for ishell.
//!
//! Commands are declared as [`NodeSpec`]s, registered into a [`Registry`], and
//! linked into a tree by [`Registry::rebind`]. The registry resolves typed
//! (possibly abbreviated) lines to an [`Invocation`] of one node, and feeds
//! completion and `?` help.

pub mod help;
pub mod node;
pub mod patterns;
pub mod registry;
pub mod tokenizer;

pub use node::{CommandContext, CommandNode, Handler, NodeId, NodeKey, NodeSpec};
pub use registry::{Invocation, Registry};
pub use tokenizer::tokenize;

//! Topology editing of [Tree]s.
//!
//! All operations are methods on [Tree], grouped by submodule:
//! * [`Tree::prune`] - cut a subtree off, splicing out a unary parent
//! * [`Tree::regraft`] - move a subtree onto another edge
//! * [`Tree::reroot`] - place the root on an edge
//! * [`Tree::multifurcate`] - contract an internal edge
//! * [`Tree::ladderize`] - sort children by the rank of their tips
//!
//! Arguments are validated before anything is changed, so a failed edit
//! leaves the tree untouched. Successful edits leave the flattened sequence
//! stale; call [`Tree::flatten`] and [`Tree::count_tips`] afterwards, or use
//! a [`Session`](crate::session::Session), which does so itself.

mod ladderize;
mod multifurcate;
mod prune;
mod regraft;
mod reroot;

use crate::model::{NodeIndex, Tree};
use thiserror::Error;

/// Reasons a topology edit was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The operation cannot be applied to the root.
    #[error("Cannot {operation} the root")]
    RootNotAllowed { operation: &'static str },

    /// The operation cannot be applied to a leaf.
    #[error("Cannot {operation} a leaf")]
    LeafNotAllowed { operation: &'static str },

    /// Moving `node` onto `target` would put it below itself.
    #[error("Cannot move node {node} below itself (target {target})")]
    WouldCreateCycle { node: NodeIndex, target: NodeIndex },

    /// The index is outside of the tree's arena.
    #[error("Node {0} does not exist")]
    NodeNotFound(NodeIndex),

    /// The node exists but is no longer reachable from the root.
    #[error("Node {0} is not attached to the tree")]
    Detached(NodeIndex),
}

/// Checks that `index` exists and is reachable from the current root.
pub(crate) fn ensure_attached(tree: &Tree, index: NodeIndex) -> Result<(), EditError> {
    if tree.get(index).is_none() {
        return Err(EditError::NodeNotFound(index));
    }
    if !tree.is_attached(index) {
        return Err(EditError::Detached(index));
    }
    Ok(())
}

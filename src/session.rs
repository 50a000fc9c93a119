//! An editing session over a single [Tree] with undo history.

use crate::edit::EditError;
use crate::model::{NodeIndex, Tree};
use crate::newick;
use crate::search::SearchError;
use std::collections::VecDeque;
use tracing::debug;

/// Default number of undo steps kept.
const DEFAULT_HISTORY_LIMIT: usize = 32;

// =#========================================================================#=
// SESSION
// =#========================================================================$=
/// Owns a [Tree] and keeps it ready for queries between edits.
///
/// Every edit first snapshots the tree, so that it can be undone; the
/// snapshot is discarded if the edit is rejected. After every successful
/// edit the tree is re-flattened and its tips recounted.
///
/// # Configuration
/// * [`with_history_limit(limit)`](Self::with_history_limit) - Number of
///   snapshots kept; the oldest are dropped first. `0` disables undo.
///
/// # Example
/// ```
/// use treewick::session::Session;
///
/// let mut session = Session::from_newick("((A:1,B:2):1,C:3);");
/// let b = session.tree().find("B").unwrap();
/// session.prune(b).unwrap();
/// assert_eq!(session.tree().tip_count(), 2);
/// assert_eq!(session.to_newick(), "(A:2,C:3);");
///
/// assert!(session.undo());
/// assert_eq!(session.to_newick(), "((A:1,B:2):1,C:3);");
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    tree: Tree,
    history: VecDeque<Tree>,
    history_limit: usize,
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl Session {
    /// Creates a session editing `tree`.
    pub fn new(mut tree: Tree) -> Self {
        if !tree.is_flattened() {
            tree.flatten();
        }
        tree.count_tips();
        Self {
            tree,
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Creates a session on the tree parsed from `newick` with default
    /// parser settings.
    pub fn from_newick(newick: &str) -> Self {
        Self::new(newick::parse_str(newick))
    }

    /// Sets the number of undo steps kept.
    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self.trim_history();
        self
    }

    /// Returns the current tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Consumes the session and returns the current tree.
    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// Returns the number of steps that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// Returns the Newick representation of the current tree.
    pub fn to_newick(&self) -> String {
        self.tree.to_newick()
    }
}

// ============================================================================
// Editing (pub)
// ============================================================================
impl Session {
    /// See [`Tree::prune`].
    pub fn prune(&mut self, index: NodeIndex) -> Result<NodeIndex, EditError> {
        self.apply(|tree| tree.prune(index))
    }

    /// See [`Tree::regraft`].
    pub fn regraft(&mut self, node: NodeIndex, target: NodeIndex) -> Result<NodeIndex, EditError> {
        self.apply(|tree| tree.regraft(node, target))
    }

    /// See [`Tree::reroot`].
    pub fn reroot(&mut self, index: NodeIndex, distance: f64) -> Result<NodeIndex, EditError> {
        self.apply(|tree| tree.reroot(index, distance))
    }

    /// See [`Tree::multifurcate`].
    pub fn multifurcate(&mut self, index: NodeIndex) -> Result<(), EditError> {
        self.apply(|tree| tree.multifurcate(index))
    }

    /// Ladderizes the whole tree, see [`Tree::ladderize`].
    pub fn ladderize(&mut self) -> Result<(), EditError> {
        self.apply(|tree| tree.ladderize(tree.root_index()))
    }

    /// Collapses or expands `index`, returning the new state.
    pub fn toggle_collapsed(&mut self, index: NodeIndex) -> Result<bool, EditError> {
        self.apply(|tree| {
            crate::edit::ensure_attached(tree, index)?;
            Ok(tree.toggle_collapsed(index))
        })
    }

    /// Sets or clears the highlight color of `index`.
    pub fn set_highlight_color(&mut self, index: NodeIndex, color: Option<String>) -> Result<(), EditError> {
        self.apply(|tree| {
            crate::edit::ensure_attached(tree, index)?;
            tree[index].set_highlight_color(color);
            Ok(())
        })
    }

    /// Highlights matching leaves, see [`Tree::search`].
    ///
    /// Highlighting is not recorded in the undo history.
    pub fn search(&mut self, pattern: Option<&str>) -> Result<usize, SearchError> {
        self.tree.search(pattern)
    }

    /// Restores the tree as it was before the last edit.
    ///
    /// # Returns
    /// `false` if there was nothing to undo
    pub fn undo(&mut self) -> bool {
        match self.history.pop_back() {
            Some(previous) => {
                self.tree = previous;
                debug!(remaining = self.history.len(), "Undid edit");
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// History (private)
// ============================================================================
impl Session {
    /// Runs `edit` on the tree, keeping a snapshot to undo it if it
    /// succeeds and refreshing the flattened sequence afterwards.
    fn apply<T>(&mut self, edit: impl FnOnce(&mut Tree) -> Result<T, EditError>) -> Result<T, EditError> {
        let snapshot = self.tree.clone();
        let result = edit(&mut self.tree)?;

        if self.history_limit > 0 {
            self.history.push_back(snapshot);
            self.trim_history();
        }
        self.tree.flatten();
        self.tree.count_tips();
        Ok(result)
    }

    fn trim_history(&mut self) {
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }
}

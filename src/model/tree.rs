//! Provides the mutable rooted tree representation.
//!
//! Provides core data structures for representing phylogenetic trees:
//! * [Tree] - Main tree structure using the arena pattern, owning all
//!   [Node]s, the flattened postorder sequence and parse diagnostics.
//! * [NodeIndex] as type used to index nodes in a tree
//! * [Traversal] to choose whether collapsed subtrees are entered

use crate::model::node::{Aggregates, Node};
use crate::newick;
use crate::parser::parsing_error::ParseErrors;
use tracing::trace;

/// Index of a node in a tree (arena).
pub type NodeIndex = usize;

// =$========================================================================$=
// TREE
// =$========================================================================$=
/// A rooted phylogenetic tree of arbitrary degree represented using the
/// arena pattern on [Node].
///
/// Nodes are stored in a contiguous vector and referenced by [NodeIndex].
/// Indices are stable: edits never move nodes, they only relink them, and
/// nodes removed from the tree (pruned) stay in the arena detached.
///
/// # Structure
/// - The root has no parent; every other attached node has exactly one
///   parent, which lists it among its children.
/// - `nodes` holds the postorder ("finishing order") of the visible tree as
///   of the last [`flatten`](Self::flatten) call. Structural edits and
///   collapse toggles are *not* reflected there until the next flatten;
///   [`is_flattened`](Self::is_flattened) tells whether it is current.
/// - `tip_count` is only recomputed by [`count_tips`](Self::count_tips).
/// - Parse diagnostics are kept as [ParseErrors]; a tree with errors is
///   still a valid, usable tree.
#[derive(Debug, Clone)]
pub struct Tree {
    /// Nodes of this tree, attached or detached (arena pattern)
    arena: Vec<Node>,

    /// Index of the current root
    root: NodeIndex,

    /// Visible postorder as of the last flatten
    nodes: Vec<NodeIndex>,

    /// Problems found while parsing the source text
    errors: ParseErrors,

    /// Visible tips as of the last count
    tip_count: usize,

    /// Bumped by every structural change and collapse toggle
    revision: u64,

    /// Revision `nodes` was computed at
    flattened_revision: u64,
}

/// Which nodes a traversal visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Collapsed nodes are visited, their descendants are not.
    Visible,
    /// All descendants are visited regardless of collapse state.
    Full,
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl Tree {
    /// Creates a tree consisting of a single unnamed root.
    pub fn new() -> Self {
        Self::with_root(String::new(), None)
    }

    /// Creates a tree consisting of a single root with the given name and
    /// branch length.
    pub fn with_root(name: impl Into<String>, branch_length: Option<f64>) -> Self {
        let mut tree = Self::with_capacity(1);
        let root = tree.push_node(name.into(), branch_length);
        tree.root = root;
        tree.flatten();
        tree.count_tips();
        tree
    }

    /// Adds a new node as last child of `parent`, returning its index.
    ///
    /// Intended for building trees programmatically; remember to
    /// [`flatten`](Self::flatten) afterwards.
    ///
    /// # Panics
    /// Panics if `parent` is out of bounds.
    pub fn add_child(
        &mut self,
        parent: NodeIndex,
        name: impl Into<String>,
        branch_length: Option<f64>,
    ) -> NodeIndex {
        assert!(parent < self.arena.len(), "Parent index {parent} out of bounds");
        let child = self.push_node(name.into(), branch_length);
        self.attach(parent, child);
        self.touch();
        child
    }

    /// Returns a reference to the root node.
    pub fn root(&self) -> &Node {
        &self.arena[self.root]
    }

    /// Returns the index of the root.
    pub fn root_index(&self) -> NodeIndex {
        self.root
    }

    /// Returns a reference to the node at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.arena[index]
    }

    /// Returns a mutable reference to the node at the given index.
    ///
    /// Only non-structural fields (name, branch length, metadata,
    /// highlighting) can be changed through it.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.arena[index]
    }

    /// Returns the node at the given index, or `None` if out of bounds.
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.arena.get(index)
    }

    /// Returns the number of nodes in the arena, including detached ones.
    pub fn arena_len(&self) -> usize {
        self.arena.len()
    }

    /// Returns the flattened postorder sequence as of the last flatten.
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    /// Returns the parse diagnostics of this tree.
    pub fn errors(&self) -> ParseErrors {
        self.errors
    }

    /// Returns whether parsing reported any problem.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns the tip count as of the last [`count_tips`](Self::count_tips).
    pub fn tip_count(&self) -> usize {
        self.tip_count
    }

    /// Recounts and stores the visible tips (leaves or collapsed nodes) in
    /// the flattened sequence.
    pub fn count_tips(&mut self) -> usize {
        self.tip_count = self
            .nodes
            .iter()
            .filter(|&&index| self.arena[index].is_tip())
            .count();
        self.tip_count
    }

    /// Returns the current revision, bumped by every structural change
    /// and collapse toggle.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns whether the flattened sequence reflects the current revision.
    pub fn is_flattened(&self) -> bool {
        self.flattened_revision == self.revision
    }

    /// Recomputes the flattened sequence from the current root,
    /// leaving out descendants of collapsed nodes.
    pub fn flatten(&mut self) -> &[NodeIndex] {
        self.nodes = self.postorder(self.root, Traversal::Visible);
        self.flattened_revision = self.revision;
        trace!(nodes = self.nodes.len(), revision = self.revision, "Flattened tree");
        &self.nodes
    }

    /// Returns the postorder of the subtree rooted at `root`.
    ///
    /// Uses an explicit stack of `(node, next child)` frames, so the depth of
    /// the tree is not bounded by the call stack.
    ///
    /// # Example
    /// ```
    /// use treewick::model::tree::Traversal;
    ///
    /// let tree = treewick::parse_newick_str("((A,B)X,C)R;");
    /// let names: Vec<_> = tree
    ///     .postorder(tree.root_index(), Traversal::Full)
    ///     .into_iter()
    ///     .map(|i| tree[i].name().to_string())
    ///     .collect();
    /// assert_eq!(names, ["A", "B", "X", "C", "R"]);
    /// ```
    pub fn postorder(&self, root: NodeIndex, traversal: Traversal) -> Vec<NodeIndex> {
        let mut order = Vec::new();
        let mut stack: Vec<(NodeIndex, usize)> = vec![(root, 0)];

        while let Some(&(index, next_child)) = stack.last() {
            let node = &self.arena[index];
            let enter = traversal == Traversal::Full || !node.is_collapsed();

            if enter && next_child < node.num_children() {
                if let Some(frame) = stack.last_mut() {
                    frame.1 += 1;
                }
                stack.push((node.children()[next_child], 0));
            } else {
                order.push(index);
                stack.pop();
            }
        }

        order
    }

    /// Returns all leaves of the tree (collapsed or not) from left to right.
    pub fn leaves(&self) -> Vec<NodeIndex> {
        self.postorder(self.root, Traversal::Full)
            .into_iter()
            .filter(|&index| self.arena[index].is_leaf())
            .collect()
    }

    /// Returns the first attached node (in postorder) with the given name.
    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.postorder(self.root, Traversal::Full)
            .into_iter()
            .find(|&index| self.arena[index].name() == name)
    }

    /// Returns an iterator over the proper ancestors of `index`,
    /// from its parent up to the top of its component.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn ancestors(&self, index: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.arena[index].parent(),
        }
    }

    /// Returns `true` if `ancestor` is a proper ancestor of `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds; use
    /// [`is_attached`](Self::is_attached) to check an index first.
    pub fn is_ancestor_of(&self, ancestor: NodeIndex, index: NodeIndex) -> bool {
        self.ancestors(index).any(|a| a == ancestor)
    }

    /// Returns `true` if `index` is reachable from the current root.
    pub fn is_attached(&self, index: NodeIndex) -> bool {
        index < self.arena.len()
            && (index == self.root || self.ancestors(index).last() == Some(self.root))
    }

    /// Collapses or expands the subtree below `index`.
    ///
    /// The children stay linked, only the flattened sequence changes,
    /// once [`flatten`](Self::flatten) is called again.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn set_collapsed(&mut self, index: NodeIndex, collapsed: bool) {
        if self.arena[index].is_collapsed() != collapsed {
            self.arena[index].set_collapsed(collapsed);
            self.touch();
        }
    }

    /// Flips the collapse state of `index`, returning the new state.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn toggle_collapsed(&mut self, index: NodeIndex) -> bool {
        let collapsed = !self.arena[index].is_collapsed();
        self.set_collapsed(index, collapsed);
        collapsed
    }

    /// Returns the layout aggregates of `index` if they were computed by
    /// a ladderize run and nothing changed the tree since.
    pub fn aggregates(&self, index: NodeIndex) -> Option<Aggregates> {
        self.arena.get(index)?.aggregates_at(self.revision)
    }

    /// Copies the subtree rooted at `index` (attached or detached) into a
    /// new stand-alone tree.
    ///
    /// Useful to keep a pruned subtree: the copy no longer depends on the
    /// arena it was cut from.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn subtree(&self, index: NodeIndex) -> Tree {
        let order = self.postorder(index, Traversal::Full);
        let mut remap = vec![usize::MAX; self.arena.len()];
        let mut copy = Tree::with_capacity(order.len());

        for &old in &order {
            let new = copy.arena.len();
            remap[old] = new;
            let mut node = self.arena[old].clone();
            node.set_index(new);
            node.set_parent(None);
            node.clear_aggregates();
            let children: Vec<NodeIndex> = node.children().iter().map(|&c| remap[c]).collect();
            for &child in &children {
                copy.arena[child].set_parent(Some(new));
            }
            *node.children_mut() = children;
            copy.arena.push(node);
        }

        copy.root = remap[index];
        copy.flatten();
        copy.count_tips();
        copy
    }

    /// Convenience method to convert this tree to a Newick string
    /// with default writer settings.
    pub fn to_newick(&self) -> String {
        newick::to_newick(self)
    }

    /// Validates the tree structure and all index references.
    ///
    /// Checks:
    /// - Root index is valid and the root has no parent
    /// - Every node reachable from the root is reached exactly once
    ///   (no cycles, no shared children)
    /// - All node indices match their position in the arena
    /// - All child indices are valid and point back to correct parent
    ///
    /// # Returns
    /// `true` if tree is valid, `false` otherwise
    pub fn is_valid(&self) -> bool {
        if self.root >= self.arena.len() || self.arena[self.root].has_parent() {
            return false;
        }

        let mut visited = vec![false; self.arena.len()];
        let mut stack = vec![self.root];

        while let Some(index) = stack.pop() {
            if visited[index] {
                return false;
            }
            visited[index] = true;

            let node = &self.arena[index];
            if node.index() != index {
                return false;
            }

            for &child in node.children() {
                if child >= self.arena.len() || self.arena[child].parent() != Some(index) {
                    return false;
                }
                stack.push(child);
            }
        }

        true
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<NodeIndex> for Tree {
    type Output = Node;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.arena[index]
    }
}

impl std::ops::IndexMut<NodeIndex> for Tree {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.arena[index]
    }
}

// ============================================================================
// Construction & relinking (crate)
// ============================================================================
impl Tree {
    /// Creates an empty arena; a root must be pushed before use.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Tree {
            arena: Vec::with_capacity(capacity),
            root: 0,
            nodes: Vec::new(),
            errors: ParseErrors::empty(),
            tip_count: 0,
            revision: 0,
            flattened_revision: 0,
        }
    }

    /// Appends a detached node to the arena.
    pub(crate) fn push_node(&mut self, name: String, branch_length: Option<f64>) -> NodeIndex {
        let index = self.arena.len();
        self.arena.push(Node::new(index, name, branch_length));
        index
    }

    /// Appends `child` to the children of `parent` and points it back.
    pub(crate) fn attach(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.arena[parent].children_mut().push(child);
        self.arena[child].set_parent(Some(parent));
    }

    /// Detaches `index` from its parent, returning the parent and the
    /// position `index` had among its children.
    pub(crate) fn detach(&mut self, index: NodeIndex) -> Option<(NodeIndex, usize)> {
        let parent = self.arena[index].parent()?;
        let children = self.arena[parent].children_mut();
        let position = children.iter().position(|&c| c == index)?;
        children.remove(position);
        self.arena[index].set_parent(None);
        Some((parent, position))
    }

    /// Puts `new` in place of `old` among the children of `old`'s parent,
    /// or makes `new` the root if `old` was the root.
    pub(crate) fn replace(&mut self, old: NodeIndex, new: NodeIndex) {
        match self.arena[old].parent() {
            Some(parent) => {
                if let Some(slot) = self.arena[parent]
                    .children_mut()
                    .iter_mut()
                    .find(|c| **c == old)
                {
                    *slot = new;
                }
                self.arena[new].set_parent(Some(parent));
            }
            None => {
                self.arena[new].set_parent(None);
                if self.root == old {
                    self.root = new;
                }
            }
        }
        self.arena[old].set_parent(None);
    }

    pub(crate) fn set_root(&mut self, root: NodeIndex) {
        self.root = root;
    }

    pub(crate) fn set_errors(&mut self, errors: ParseErrors) {
        self.errors = errors;
    }

    /// Marks the tree as changed; aggregates and `nodes` become stale.
    pub(crate) fn touch(&mut self) {
        self.revision += 1;
    }

    /// Depth of every node of `sequence` relative to its last element,
    /// indexed by arena position.
    ///
    /// `sequence` must be a postorder, so parents come after their children.
    pub(crate) fn depths(&self, sequence: &[NodeIndex]) -> Vec<usize> {
        let mut depths = vec![0; self.arena.len()];
        let Some(&top) = sequence.last() else {
            return depths;
        };

        for &index in sequence.iter().rev() {
            if index == top {
                continue;
            }
            if let Some(parent) = self.arena[index].parent() {
                depths[index] = depths[parent] + 1;
            }
        }

        depths
    }
}

// =$========================================================================$=
// ITERATORS
// =$========================================================================$=
/// Iterator over the ancestors of a node, nearest first.
///
/// Created by [`Tree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeIndex>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.arena[current].parent();
        Some(current)
    }
}

//! Node module for phylogenetic tree representation.

use crate::model::metadata;
use crate::model::tree::NodeIndex;

// =#========================================================================#=
// NODE
// =#========================================================================#=
/// Represents a node (vertex) in a phylogenetic tree.
///
/// Nodes live in the arena of a [Tree](crate::model::Tree) and refer to each
/// other only by [NodeIndex]. A node without children is a leaf (tip).
///
/// # Invariants
/// - `index` is the position of this node in the arena
/// - `parent` is `None` only for the root and for detached (pruned) nodes;
///   it never owns anything, it only points back
/// - `children` is ordered; the order is the drawing order
/// - `branch_length` of `None` means no value was given, which is not the
///   same as a length of `0.0`
///
/// Structural fields (`parent`, `children`, `collapsed`) can only be changed
/// through [Tree](crate::model::Tree) methods, which keep the arena
/// consistent and track revisions.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Index of this node in the tree arena
    index: NodeIndex,
    /// Index of the parent node
    parent: Option<NodeIndex>,
    /// Indices of the child nodes, in drawing order
    children: Vec<NodeIndex>,
    /// Display label, possibly empty
    name: String,
    /// Distance to parent node
    branch_length: Option<f64>,
    /// Verbatim bracketed annotation including `[` and `]`, or empty
    metadata: String,
    /// Set by search, read by rendering
    highlighted: bool,
    /// Descendants hidden from the flattened sequence
    collapsed: bool,
    /// Rendering-only annotation
    highlight_color: Option<String>,
    /// Scratch values of the last ladderize run
    aggregates: Aggregates,
    /// Tree revision at which `aggregates` were computed
    aggregates_revision: Option<u64>,
}

impl Node {
    /// Creates a new detached node without children.
    ///
    /// # Arguments
    /// * `index` - The unique index of this node in the tree (arena)
    /// * `name` - Display label, may be empty
    /// * `branch_length` - Distance to parent node, `None` if unspecified
    pub(crate) fn new(index: NodeIndex, name: String, branch_length: Option<f64>) -> Self {
        Node {
            index,
            parent: None,
            children: Vec::new(),
            name,
            branch_length,
            metadata: String::new(),
            highlighted: false,
            collapsed: false,
            highlight_color: None,
            aggregates: Aggregates::default(),
            aggregates_revision: None,
        }
    }

    /// Returns the index of this node.
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    /// Returns the index of the parent, or `None` for a root or detached node.
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Returns `true` if this node has a parent.
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Returns the children of this node in drawing order.
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    /// Returns the number of children.
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns `true` if this node counts as a tip in the visible tree,
    /// that is, it is a leaf or it is collapsed.
    pub fn is_tip(&self) -> bool {
        self.is_leaf() || self.collapsed
    }

    /// Returns the display label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the display label.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the branch length, `None` if unspecified.
    pub fn branch_length(&self) -> Option<f64> {
        self.branch_length
    }

    /// Returns whether this node has a branch length.
    pub fn has_branch_length(&self) -> bool {
        self.branch_length.is_some()
    }

    /// Sets the branch length; `None` marks it unspecified.
    pub fn set_branch_length(&mut self, branch_length: Option<f64>) {
        self.branch_length = branch_length;
    }

    /// Returns the verbatim metadata blob (e.g. `[&&NHX:S=human]`), possibly empty.
    pub fn metadata(&self) -> &str {
        &self.metadata
    }

    /// Replaces the verbatim metadata blob.
    pub fn set_metadata(&mut self, metadata: impl Into<String>) {
        self.metadata = metadata.into();
    }

    /// Looks up a `key=value` field in the metadata blob.
    ///
    /// See [metadata::field] for the accepted layouts.
    pub fn metadata_field(&self, key: &str) -> Option<&str> {
        metadata::field(&self.metadata, key)
    }

    /// Returns whether the last search matched this node.
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Sets the search highlight flag.
    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    /// Returns whether the descendants of this node are hidden.
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Returns the rendering highlight color, if any.
    pub fn highlight_color(&self) -> Option<&str> {
        self.highlight_color.as_deref()
    }

    /// Sets or clears the rendering highlight color.
    pub fn set_highlight_color(&mut self, color: Option<String>) {
        self.highlight_color = color;
    }
}

// ============================================================================
// Structural mutation (crate only)
// ============================================================================
impl Node {
    pub(crate) fn set_parent(&mut self, parent: Option<NodeIndex>) {
        self.parent = parent;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeIndex> {
        &mut self.children
    }

    pub(crate) fn take_children(&mut self) -> Vec<NodeIndex> {
        std::mem::take(&mut self.children)
    }

    pub(crate) fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
    }

    pub(crate) fn push_metadata(&mut self, blob: &str) {
        self.metadata.push_str(blob);
    }

    pub(crate) fn set_index(&mut self, index: NodeIndex) {
        self.index = index;
    }

    pub(crate) fn set_aggregates(&mut self, aggregates: Aggregates, revision: u64) {
        self.aggregates = aggregates;
        self.aggregates_revision = Some(revision);
    }

    pub(crate) fn clear_aggregates(&mut self) {
        self.aggregates_revision = None;
    }

    /// Returns the aggregates if they were computed at `revision`.
    pub(crate) fn aggregates_at(&self, revision: u64) -> Option<Aggregates> {
        if self.aggregates_revision == Some(revision) {
            Some(self.aggregates)
        } else {
            None
        }
    }
}

// =#========================================================================#=
// AGGREGATES
// =#========================================================================#=
/// Transient layout values computed by
/// [`Tree::ladderize`](crate::model::Tree::ladderize).
///
/// Only valid for the tree revision that produced them; see
/// [`Tree::aggregates`](crate::model::Tree::aggregates).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aggregates {
    /// Number of edges from the ladderized root
    pub depth: usize,
    /// Sum of the ranks of all tips below (rank itself for a tip)
    pub weight: f64,
    /// Number of visible tips below (1 for a tip)
    pub tip_count: usize,
}

impl Aggregates {
    /// Mean tip rank, the key children are sorted by.
    pub fn mean_rank(&self) -> f64 {
        if self.tip_count == 0 {
            0.0
        } else {
            self.weight / self.tip_count as f64
        }
    }
}

// =#========================================================================#=
// BRANCH LENGTH HELPERS
// =#========================================================================#=
/// Sum of two branch lengths; unspecified if either one is unspecified.
///
/// Used when an edge is contracted away and two edges become one.
pub(crate) fn joined_length(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        _ => None,
    }
}

/// Extends `child` by `extra` if both are specified, otherwise keeps `child`.
pub(crate) fn extended_length(child: Option<f64>, extra: Option<f64>) -> Option<f64> {
    match (child, extra) {
        (Some(c), Some(e)) => Some(c + e),
        (child, _) => child,
    }
}

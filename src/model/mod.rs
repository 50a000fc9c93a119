//! Tree model: [Tree] over an arena of [Node]s.
//!
//! * [Tree] owns all nodes, the root index, the flattened postorder of
//!   the visible tree and the diagnostics of the text it was parsed from.
//! * [Node] holds links (parent index, ordered child indices), name,
//!   optional branch length, verbatim metadata and display state
//!   (highlighted, collapsed, highlight color).
//! * [metadata] extracts values from NHX and BEAST-style metadata blocks.
//!
//! Nodes never hold references to each other, only [NodeIndex]es into the
//! arena of their tree.

pub mod metadata;
pub mod node;
pub mod tree;

pub use node::{Aggregates, Node};
pub use tree::{Ancestors, NodeIndex, Traversal, Tree};

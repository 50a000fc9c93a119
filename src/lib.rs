//! Treewick is a library to parse, edit and write phylogenetic trees in
//! Newick and NHX format.
//!
//! Core functionality provided:
//! - Newick/NHX parsing: Tolerant parser for trees of arbitrary degree with
//!   quoted labels, branch lengths and verbatim metadata blocks. Malformed
//!   text still yields the best tree possible, with the problems recorded as
//!   [ParseErrors](crate::parser::ParseErrors).
//! - Tree model: Arena-based [Tree] of [Node](crate::model::Node)s with a
//!   flattened postorder of the visible (not collapsed) tree.
//!   See [crate::model] for more details.
//! - Topology editing: prune, regraft, reroot, multifurcate and ladderize,
//!   all rejecting invalid requests without changing the tree.
//!   See [crate::edit].
//! - Writing: Newick/NHX output without recursion, so deep trees are fine.
//! - Search: case-insensitive regular expressions highlighting leaves.
//! - [Session](crate::session::Session): Editing with undo history and
//!   automatic re-flattening.
//!
//! # Usage patterns
//! 1. Several functions provide quick access with default settings,
//!    see below and the [crate::newick] documentation.
//! 2. Configure a [NewickParser](crate::newick::NewickParser) or a
//!    [NewickWriter](crate::newick::NewickWriter) for full control.
//!
//! ## Example Default Configuration
//!
//! ```
//! use treewick::parse_newick_str;
//!
//! let mut tree = parse_newick_str("((A:0.1,B:0.2):0.3,C:0.4);");
//! assert_eq!(tree.tip_count(), 3);
//!
//! let c = tree.find("C").unwrap();
//! tree.reroot(c, 0.2).unwrap();
//! tree.flatten();
//! assert_eq!(tree.to_newick(), "(C:0.2,(A:0.1,B:0.2):0.5);");
//! ```
//!
//! ## Example Parser Configuration
//!
//! ```no_run
//! use treewick::newick::NewickParser;
//! use treewick::parser::ByteParser;
//!
//! let bytes = std::fs::read("posterior.nwk")?;
//! let parser = NewickParser::new().with_num_leaves(120).with_strict();
//! for tree in parser.into_iter(ByteParser::from_vec(bytes)) {
//!     let tree = tree?;
//!     println!("{}", tree.tip_count());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod edit;
pub mod model;
pub mod newick;
pub mod parser;
pub mod search;
pub mod session;

use crate::model::Tree;
use crate::parser::parsing_error::ParsingError;
use std::path::Path;

// ============================================================================
// Quick Newick API
// ============================================================================
/// Parse a Newick string using default settings, returning a [Tree].
///
/// See [`newick::parse_str`] for full documentation of this convenience function.
pub fn parse_newick_str<S: AsRef<str>>(newick: S) -> Tree {
    newick::parse_str(newick.as_ref())
}

/// Parse a file containing a semicolon-separated list of Newick strings
/// using default settings, returning all its trees.
///
/// See [`newick::parse_file`] for full documentation of this convenience function.
pub fn parse_newick_file<P: AsRef<Path>>(path: P) -> Result<Vec<Tree>, ParsingError> {
    newick::parse_file(path)
}

/// Returns the Newick representation of `tree` with default settings.
///
/// See [`newick::to_newick`].
pub fn to_newick(tree: &Tree) -> String {
    newick::to_newick(tree)
}

//! Newick/NHX format parser and writer for phylogenetic trees.
//!
//! This module provides [`NewickParser`] to parse Newick format strings
//! into [`Tree`]s and [`NewickWriter`] to write them back.
//!
//! # Quick API
//! For simple use cases with default settings:
//! * [`parse_file`] - parses a file, returns all its [`Tree`]s
//! * [`parse_str`] - parses a single string, returns a [`Tree`]
//! * [`to_newick`] - writes a [`Tree`] with default settings
//! * [`write_newick_file`] - writes [`Tree`]s to a file, one per line
//!
//! # Full API
//! For more control, configure a [`NewickParser`] and provide a [`ByteParser`]:
//! * [`NewickParser::parse_str`] - parse a single tree
//! * [`NewickParser::parse_all`] - parse all trees until EOF
//! * [`NewickParser::into_iter`] - obtain an iterator over trees
//!
//! # Format
//! * `tree ::= node ';'`
//! * `node ::= token | '(' node (',' node)* ')' [token]`
//! * `token ::= [label] [':' number] ['[' metadata ']']`
//!
//! Furthermore:
//! * Whitespace and control characters can occur anywhere outside of
//!   quoted labels and brackets; in unquoted labels they are dropped
//! * Labels can be single-quoted, `''` escapes a quote
//! * Brackets hold metadata such as NHX `[&&NHX:S=human:B=90]` or
//!   BEAST-style `[&rate=0.5]`; they are kept verbatim on the node and
//!   may come before or after the branch length

mod defs;
mod parser;
pub mod writer;

pub use self::parser::{NewickIterator, NewickParser};
pub use self::writer::{NewickStyle, NewickWriter, write_newick, write_newick_file};

use crate::model::Tree;
use crate::parser::ParsingError;
use crate::parser::byte_parser::ByteParser;
use std::path::Path;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses a Newick file eagerly and returns all its trees.
///
/// Convenience function for a file containing a semicolon-separated list
/// of Newick strings, using default (lenient) parser settings: malformed
/// trees are returned with their [`ParseErrors`](crate::parser::ParseErrors).
///
/// # Arguments
/// * `path` - Path to the file (accepting `&str`, `String`, `Path`, or `PathBuf`)
///
/// # Returns
/// * `Vec<Tree>` - All parsed trees
/// * [`ParsingError`] - If reading the file fails
///
/// # Example
/// ```no_run
/// use treewick::newick;
///
/// let trees = newick::parse_file("trees.nwk")?;
/// println!("Parsed {} trees", trees.len());
/// # Ok::<(), treewick::parser::ParsingError>(())
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<Tree>, ParsingError> {
    let bytes = std::fs::read(path)?;
    NewickParser::new().parse_all(ByteParser::from_vec(bytes))
}

/// Parses a single Newick string with default settings.
///
/// Never fails: check [`Tree::errors`] for problems found in the text.
///
/// # Example
/// ```
/// use treewick::newick;
///
/// let tree = newick::parse_str("(A:1,B:2);");
/// assert_eq!(tree.tip_count(), 2);
/// assert_eq!(tree.root().num_children(), 2);
/// ```
pub fn parse_str(newick: &str) -> Tree {
    NewickParser::new().parse_tree(&mut ByteParser::for_str(newick))
}

/// Returns the Newick representation of `tree` with default writer
/// settings: full tree, branch lengths and metadata.
pub fn to_newick(tree: &Tree) -> String {
    NewickWriter::new().write(tree)
}

//! Structs and logic to parse Newick/NHX strings.
//!
//! This module provides the [NewickParser] struct, which offers methods
//! to parse files or single strings, as well as lazy parsing via a
//! [NewickIterator].

use crate::model::{NodeIndex, Tree};
use crate::newick::defs::{
    DEFAULT_NUM_LEAVES_GUESS, NEWICK_LABEL_DELIMITERS, is_branch_length_byte,
};
use crate::parser::byte_parser::ByteParser;
use crate::parser::parsing_error::{ParseErrors, ParsingError};
use tracing::{debug, warn};

/// Length of input shown in diagnostics
const CONTEXT_LENGTH: usize = 30;

/// Entry of the parser stack.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Frame {
    /// An opened `(` whose group is not closed yet
    Boundary,
    /// A finished node waiting for its parent
    Node(NodeIndex),
}

// =#========================================================================#=
// NEWICK PARSER
// =#========================================================================$=
/// Parser (configuration) for single/multiple Newick/NHX trees of
/// arbitrary degree.
///
/// The parser never fails on malformed text: it builds the best tree it can
/// from the consumed input and records what went wrong as [ParseErrors] on
/// the tree. Only I/O errors, or malformed text in strict mode, are
/// reported as [ParsingError].
///
/// # Configuration
/// * [`with_num_leaves(num_leaves)`](Self::with_num_leaves)
///     - Capacity hint for the number of leaves per tree, otherwise it is
///       taken from the first parsed tree.
/// * [`with_strict()`](Self::with_strict)
///     - Trees with parse errors are rejected with
///       [ParsingError::Malformed] instead of being returned.
///
/// # Parsing
/// * [`parse_tree`](Self::parse_tree) — Parse single tree, never fails
/// * [`parse_str`](Self::parse_str) — Parse single tree, honoring strictness
/// * [`parse_all`](Self::parse_all) — Parse all trees eagerly
/// * [`into_iter`](Self::into_iter) — Parse trees lazily
///
/// # Format
/// * `tree ::= node ';'`
/// * `node ::= token | '(' node (',' node)* ')' [token]`
/// * `token ::= [label] [':' number] ['[' metadata ']']`
///
/// Whitespace and control characters outside of quotes and brackets are
/// insignificant. Metadata (e.g. `[&&NHX:S=human]`) is kept verbatim.
///
/// # Example
/// ```
/// use treewick::newick::NewickParser;
///
/// let mut parser = NewickParser::new();
/// let tree = parser.parse_str("((A:1,B:2)[&&NHX:B=90]:0.5,C:3);").unwrap();
/// assert_eq!(tree.tip_count(), 3);
/// assert!(!tree.has_errors());
/// ```
#[derive(Debug, Clone)]
pub struct NewickParser {
    know_num_leaves: bool,
    num_leaves: usize,
    strict: bool,
    trees_parsed: usize,
}

// ============================================================================
// Construction & Configuration (pub)
// ============================================================================
impl NewickParser {
    /// Creates a new [NewickParser] with default settings:
    /// - Number of leaves is unknown (learned from the first tree)
    /// - Lenient: malformed trees are returned with their [ParseErrors]
    pub fn new() -> Self {
        Self {
            know_num_leaves: false,
            num_leaves: DEFAULT_NUM_LEAVES_GUESS,
            strict: false,
            trees_parsed: 0,
        }
    }

    /// Sets the expected number of leaves in each parsed tree.
    ///
    /// Only used to pre-allocate the node arena.
    pub fn with_num_leaves(mut self, num_leaves: usize) -> Self {
        self.num_leaves = num_leaves;
        self.know_num_leaves = true;
        self
    }

    /// Configures the parser to reject trees with parse errors.
    pub fn with_strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Returns the number of trees parsed so far.
    pub fn trees_parsed(&self) -> usize {
        self.trees_parsed
    }
}

impl Default for NewickParser {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// API Parsing (pub)
// ============================================================================
impl NewickParser {
    /// Consumes the parser and returns an iterator over trees from the byte source.
    ///
    /// # Arguments
    /// * `byte_parser` - A byte parser containing `;`-separated Newick strings
    pub fn into_iter(self, byte_parser: ByteParser) -> NewickIterator {
        NewickIterator {
            byte_parser,
            parser: self,
            done: false,
        }
    }

    /// Parses all Newick trees from the byte source until EOF.
    ///
    /// Empty statements (`;;`) are skipped.
    ///
    /// # Returns
    /// * `Ok(Vec<Tree>)` - All parsed trees
    /// * `Err(ParsingError)` - In strict mode, if any tree is malformed
    pub fn parse_all(&mut self, mut byte_parser: ByteParser) -> Result<Vec<Tree>, ParsingError> {
        let mut trees = Vec::new();
        while let Some(tree) = self.next_statement(&mut byte_parser) {
            trees.push(tree?);
        }
        Ok(trees)
    }

    /// Parses a single Newick string.
    ///
    /// # Returns
    /// * `Ok(Tree)` - The parsed tree, possibly carrying [ParseErrors]
    /// * `Err(ParsingError)` - In strict mode, if the text is malformed
    pub fn parse_str(&mut self, newick: &str) -> Result<Tree, ParsingError> {
        let mut byte_parser = ByteParser::for_str(newick);
        let tree = self.parse_tree(&mut byte_parser);
        self.check(tree, byte_parser.position())
    }

    /// Parses one tree statement from the given [ByteParser], up to and
    /// including its terminating `;` (or EOF).
    ///
    /// Never fails: problems are recorded in [`Tree::errors`].
    pub fn parse_tree(&mut self, parser: &mut ByteParser) -> Tree {
        let capacity = 2 * self.num_leaves.max(1);
        let mut tree = Tree::with_capacity(capacity);
        let mut stack: Vec<Frame> = Vec::with_capacity(capacity);
        let mut errors = ParseErrors::empty();

        loop {
            parser.skip_insignificant();
            let Some(b) = parser.peek() else {
                break;
            };

            match b {
                b'(' => {
                    parser.next_byte();
                    stack.push(Frame::Boundary);
                }
                b',' => {
                    parser.next_byte();
                }
                b';' => {
                    parser.next_byte();
                    break;
                }
                b']' => {
                    // Stray closing bracket outside of any metadata block
                    parser.next_byte();
                }
                b')' => {
                    parser.next_byte();
                    if !self.close_group(parser, &mut tree, &mut stack, &mut errors, true) {
                        errors |= ParseErrors::MISSING_OPEN;
                        warn!(
                            position = parser.position(),
                            context = %parser.get_context_as_string(CONTEXT_LENGTH),
                            "Unmatched ')', parsing stopped"
                        );
                        skip_statement(parser);
                        break;
                    }
                }
                _ => {
                    let index = self.parse_token(parser, &mut tree, &mut errors);
                    stack.push(Frame::Node(index));
                }
            }

            if errors.contains(ParseErrors::UNCLOSED_BRACKET) {
                break; // bracket ran to EOF
            }
        }

        self.finish_tree(parser, tree, stack, errors)
    }
}

// ============================================================================
// Parsing
// ============================================================================
impl NewickParser {
    /// Parses the next non-empty statement, or returns `None` at EOF.
    fn next_statement(&mut self, parser: &mut ByteParser) -> Option<Result<Tree, ParsingError>> {
        loop {
            parser.skip_insignificant();
            if parser.is_eof() {
                return None;
            }
            if !parser.consume_if(b';') {
                break;
            }
        }

        let tree = self.parse_tree(parser);
        Some(self.check(tree, parser.position()))
    }

    /// Closes the innermost open group: the nodes above the nearest
    /// boundary become children of a new internal node, whose own token
    /// is parsed if `with_token` is set.
    ///
    /// # Returns
    /// `false` if there is no open group, leaving everything untouched
    fn close_group(
        &mut self,
        parser: &mut ByteParser,
        tree: &mut Tree,
        stack: &mut Vec<Frame>,
        errors: &mut ParseErrors,
        with_token: bool,
    ) -> bool {
        let Some(boundary) = stack.iter().rposition(|f| *f == Frame::Boundary) else {
            return false;
        };

        let children: Vec<NodeIndex> = stack
            .drain(boundary..)
            .filter_map(|f| match f {
                Frame::Node(index) => Some(index),
                Frame::Boundary => None,
            })
            .collect();

        let index = if with_token {
            self.parse_token(parser, tree, errors)
        } else {
            tree.push_node(String::new(), None)
        };
        for child in children {
            tree.attach(index, child);
        }

        stack.push(Frame::Node(index));
        true
    }

    /// Parses a node token `[label] [':' number] ['[' metadata ']']`,
    /// adds the node to the tree and returns its index.
    ///
    /// Branch length and metadata may come in either order; several
    /// metadata blocks are concatenated.
    fn parse_token(
        &mut self,
        parser: &mut ByteParser,
        tree: &mut Tree,
        errors: &mut ParseErrors,
    ) -> NodeIndex {
        parser.skip_insignificant();
        let name = parser.parse_label(NEWICK_LABEL_DELIMITERS);
        let index = tree.push_node(name, None);

        loop {
            parser.skip_insignificant();
            match parser.peek() {
                Some(b':') => {
                    parser.next_byte();
                    let branch_length = self.parse_branch_length(parser);
                    tree.node_mut(index).set_branch_length(branch_length);
                }
                Some(b'[') => match parser.capture_bracket() {
                    Ok(blob) => tree.node_mut(index).push_metadata(&blob),
                    Err(partial) => {
                        warn!(node = index, "Unclosed '[' metadata block");
                        tree.node_mut(index).push_metadata(&partial);
                        *errors |= ParseErrors::UNCLOSED_BRACKET;
                        break;
                    }
                },
                _ => break,
            }
        }

        index
    }

    /// Parses a branch length after its `:`.
    ///
    /// Supports scientific notation (e.g., `1.5e-10`).
    ///
    /// # Returns
    /// - `Some(branch_length)` if a finite number could be parsed
    /// - `None` otherwise, leaving the branch length unspecified
    fn parse_branch_length(&mut self, parser: &mut ByteParser) -> Option<f64> {
        let position = parser.position();
        let branch_length_str = parser.take_while(is_branch_length_byte);

        match branch_length_str.parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                warn!(
                    position,
                    value = %branch_length_str,
                    "Invalid branch length, left unspecified"
                );
                None
            }
        }
    }

    /// Closes groups left open, joins leftover top-level nodes under a
    /// common root, and finalizes the tree.
    fn finish_tree(
        &mut self,
        parser: &mut ByteParser,
        mut tree: Tree,
        mut stack: Vec<Frame>,
        mut errors: ParseErrors,
    ) -> Tree {
        if stack.contains(&Frame::Boundary) {
            errors |= ParseErrors::MISSING_CLOSE;
            while self.close_group(parser, &mut tree, &mut stack, &mut errors, false) {}
        }

        let mut roots: Vec<NodeIndex> = stack
            .into_iter()
            .filter_map(|f| match f {
                Frame::Node(index) => Some(index),
                Frame::Boundary => None,
            })
            .collect();

        let root = match roots.len() {
            0 => tree.push_node(String::new(), None),
            1 => roots[0],
            _ => {
                errors |= ParseErrors::MISSING_CLOSE;
                let root = tree.push_node(String::new(), None);
                for child in roots.drain(..) {
                    tree.attach(root, child);
                }
                root
            }
        };

        tree.set_root(root);
        tree.set_errors(errors);
        tree.flatten();
        tree.count_tips();

        self.trees_parsed += 1;
        if !self.know_num_leaves {
            self.num_leaves = tree.tip_count();
            self.know_num_leaves = true;
        }

        if errors.is_empty() {
            debug!(
                tree = self.trees_parsed,
                nodes = tree.nodes().len(),
                tips = tree.tip_count(),
                "Parsed tree"
            );
        } else {
            warn!(
                tree = self.trees_parsed,
                tips = tree.tip_count(),
                errors = %errors,
                "Parsed malformed tree"
            );
        }

        tree
    }

    /// Applies strictness to a parsed tree.
    fn check(&self, tree: Tree, position: usize) -> Result<Tree, ParsingError> {
        if self.strict && tree.has_errors() {
            return Err(ParsingError::Malformed {
                errors: tree.errors(),
                tree_number: self.trees_parsed,
                position,
            });
        }
        Ok(tree)
    }
}

/// Skips the rest of a broken statement, including its `;`.
fn skip_statement(parser: &mut ByteParser) {
    while let Some(b) = parser.next_byte() {
        if b == b';' {
            break;
        }
    }
}

// =#========================================================================#=
// NEWICK ITERATOR (lazy parser)
// =#========================================================================$=
/// Iterator to parse Newick trees.
///
/// Created by [NewickParser::into_iter()].
/// Yields `Result<Tree, ParsingError>` for each tree; in strict mode,
/// iteration stops after the first malformed tree.
pub struct NewickIterator {
    parser: NewickParser,
    byte_parser: ByteParser,
    done: bool,
}

impl NewickIterator {
    /// Consumes the iterator and returns the underlying [NewickParser].
    pub fn into_parser(self) -> NewickParser {
        self.parser
    }
}

impl Iterator for NewickIterator {
    type Item = Result<Tree, ParsingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.parser.next_statement(&mut self.byte_parser);
        match &result {
            None | Some(Err(_)) => self.done = true,
            Some(Ok(_)) => {}
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(newick: &str) -> Tree {
        NewickParser::new().parse_tree(&mut ByteParser::for_str(newick))
    }

    #[test]
    fn leaf_token_with_length_and_metadata() {
        let tree = parse("A:0.5[&&NHX:S=human];");
        let root = tree.root();
        assert_eq!(root.name(), "A");
        assert_eq!(root.branch_length(), Some(0.5));
        assert_eq!(root.metadata(), "[&&NHX:S=human]");
    }

    #[test]
    fn metadata_before_branch_length() {
        let tree = parse("(A[&rate=1]:2,B);");
        let a = tree.find("A").unwrap();
        assert_eq!(tree[a].branch_length(), Some(2.0));
        assert_eq!(tree[a].metadata(), "[&rate=1]");
    }

    #[test]
    fn invalid_branch_length_is_unspecified() {
        let tree = parse("(A:,B:x);");
        assert!(!tree.has_errors());
        let a = tree.find("A").unwrap();
        assert_eq!(tree[a].branch_length(), None);
    }

    #[test]
    fn unclosed_bracket_keeps_partial_metadata() {
        let tree = parse("(A,B[&&NHX:S=x");
        assert!(tree.errors().contains(ParseErrors::UNCLOSED_BRACKET));
        assert!(tree.errors().contains(ParseErrors::MISSING_CLOSE));
        let b = tree.find("B").unwrap();
        assert_eq!(tree[b].metadata(), "[&&NHX:S=x");
        assert!(tree.is_valid());
    }

    #[test]
    fn empty_input_gives_single_root() {
        let tree = parse("   ");
        assert_eq!(tree.nodes().len(), 1);
        assert!(!tree.has_errors());
    }

    #[test]
    fn top_level_siblings_are_joined() {
        let tree = parse("A,B;");
        assert!(tree.errors().contains(ParseErrors::MISSING_CLOSE));
        assert_eq!(tree.root().num_children(), 2);
    }

    #[test]
    fn learns_num_leaves_from_first_tree() {
        let mut parser = NewickParser::new();
        parser.parse_str("(A,B,C);").unwrap();
        assert_eq!(parser.num_leaves, 3);
        assert_eq!(parser.trees_parsed(), 1);
    }
}

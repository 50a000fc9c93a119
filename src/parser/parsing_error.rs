//! Error types for the Newick/NHX parser.
//!
//! This module provides [ParseErrors], the non-fatal diagnostics attached to
//! every parsed tree, and [ParsingError] for reporting failures that do stop
//! a parse: I/O problems and, in strict mode, malformed text.

use bitflags::bitflags;
use std::fmt;
use thiserror::Error;

// =#========================================================================#=
// PARSE ERRORS (flags)
// =#========================================================================€=
bitflags! {
    /// Problems found in Newick text that did not stop the parser.
    ///
    /// Several flags may be set at once. A tree carrying flags is still a
    /// connected, valid tree built from the text that could be consumed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ParseErrors: u8 {
        /// A `)` without a matching `(`; parsing stopped there.
        const MISSING_OPEN = 0b0001;
        /// A `(` never closed before the end of the tree.
        const MISSING_CLOSE = 0b0010;
        /// A `[` metadata block never closed.
        const UNCLOSED_BRACKET = 0b0100;
    }
}

impl ParseErrors {
    /// Human-readable description of each set flag.
    pub fn messages(&self) -> Vec<&'static str> {
        self.iter()
            .map(|flag| match flag {
                ParseErrors::MISSING_OPEN => "unmatched ')' without corresponding '('",
                ParseErrors::MISSING_CLOSE => "unclosed '(' at end of tree",
                ParseErrors::UNCLOSED_BRACKET => "unclosed '[' metadata block",
                _ => "unknown parse error",
            })
            .collect()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no errors");
        }
        write!(f, "{}", self.messages().join("; "))
    }
}

// =#========================================================================#=
// PARSING ERROR
// =#========================================================================$=
/// Failure of a parse call.
#[derive(Debug, Error)]
pub enum ParsingError {
    /// Reading the input failed.
    #[error("IO error - {0}")]
    Io(#[from] std::io::Error),

    /// The text was malformed and the parser was configured to be strict.
    #[error("Invalid newick string: {errors} (tree {tree_number}, near position {position})")]
    Malformed {
        /// Diagnostics collected for the offending tree
        errors: ParseErrors,
        /// 1-based number of the tree statement in the input
        tree_number: usize,
        /// Byte offset where parsing of that tree stopped
        position: usize,
    },
}

impl ParsingError {
    /// Returns the diagnostics if this is a [ParsingError::Malformed].
    pub fn parse_errors(&self) -> Option<ParseErrors> {
        match self {
            ParsingError::Malformed { errors, .. } => Some(*errors),
            ParsingError::Io(_) => None,
        }
    }
}

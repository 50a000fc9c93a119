//! Basic low-level byte parser functionality.
//!
//! This module provides the byte scanner the Newick parser is built on,
//! the parse diagnostics and error types, and label escaping helpers.

pub mod byte_parser;
pub mod parsing_error;
pub mod utils;

pub use byte_parser::ByteParser;
pub use parsing_error::{ParseErrors, ParsingError};

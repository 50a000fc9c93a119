//! Constants and definitions for Newick parsing and writing.

/// Newick label delimiters: parentheses, comma, colon, semicolon, brackets
pub(crate) const NEWICK_LABEL_DELIMITERS: &[u8] = b"(),:;[]";

/// Default guess for number of leaves, when unknown
pub(crate) const DEFAULT_NUM_LEAVES_GUESS: usize = 10;

/// Extra buffer in Newick string length/capacity estimate
pub(crate) const BUFFER_CHARS: usize = 10;

/// Bytes that may occur in a branch length: digits, '.', '-', '+', 'e', 'E'
#[inline]
pub(crate) fn is_branch_length_byte(b: u8) -> bool {
    b.is_ascii_digit() || b == b'.' || b == b'-' || b == b'+' || b == b'e' || b == b'E'
}

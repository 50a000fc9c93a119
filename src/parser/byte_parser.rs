//! Low-level byte-by-byte parser for Newick text.
//!
//! This module provides [ByteParser] for scanning text-based tree formats with
//! support for peeking, consuming, skipping insignificant bytes, quote-aware
//! label parsing and verbatim bracket capture. Used as the foundation of the
//! Newick parser.

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte parser over owned text with support for peeking, consuming,
/// and scanning tokens.
///
/// Operates on bytes; multi-byte UTF-8 sequences inside labels and brackets
/// are carried through untouched and decoded when a token is finished.
///
/// # Features
/// - Skipping of whitespace and non-printable control bytes
/// - Quote-aware label parsing (single quotes with `''` escaping)
/// - Verbatim capture of bracketed blocks, including nested brackets
/// - Context extraction for error reporting
///
/// # Example
/// ```
/// use treewick::parser::ByteParser;
///
/// let mut parser = ByteParser::for_str("  (A:1.0,B:1.0);");
/// parser.skip_insignificant();
/// assert!(parser.consume_if(b'('));
/// assert_eq!(parser.parse_label(b"(),:;[]"), "A");
/// assert_eq!(parser.peek(), Some(b':'));
/// ```
pub struct ByteParser {
    /// The owned byte data being parsed
    input: Vec<u8>,
    /// Current position in the input
    pos: usize,
}

impl ByteParser {
    /// Creates a new `ByteParser` from a String by copying it into a Vec.
    ///
    /// # Arguments
    /// * `input` - The string to parse
    pub fn for_str(input: &str) -> Self {
        Self::from_vec(input.as_bytes().to_vec())
    }

    /// Creates a new `ByteParser` owning the given bytes.
    ///
    /// # Arguments
    /// * `input` - The bytes to parse
    pub fn from_vec(input: Vec<u8>) -> Self {
        Self { input, pos: 0 }
    }

    /// Peeks at the current byte without consuming it.
    ///
    /// # Returns
    /// * `Some(u8)` - The current byte if available
    /// * `None` - If at end of data (EOF)
    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Gets the current byte and advances the position (consumes it).
    ///
    /// # Returns
    /// * `Some(u8)` - The current byte if available
    /// * `None` - If at end of data (EOF)
    #[inline(always)]
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Consumes the current byte if it equals `ch`.
    ///
    /// # Returns
    /// `true` if the byte was matched and consumed, `false` otherwise
    pub fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skips (consumes) whitespace and non-printable ASCII control bytes.
    pub fn skip_insignificant(&mut self) {
        while let Some(b) = self.peek() {
            if is_insignificant(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Returns whether the end of data (EOF) has been reached.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Returns the current parser position in the input.
    ///
    /// Useful for error messages and tracking parser state.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns a string from up to `k` bytes from the current position for error context.
    ///
    /// Invalid UTF-8 sequences are replaced with the Unicode replacement character.
    pub fn get_context_as_string(&self, k: usize) -> String {
        let end = (self.pos + k).min(self.input.len());
        String::from_utf8_lossy(&self.input[self.pos.min(end)..end]).into_owned()
    }

    /// Parses a label (quoted or unquoted) ending at any of the given delimiters.
    ///
    /// Quoted labels are enclosed in single quotes; an unquoted label drops
    /// any whitespace or control byte it contains.
    pub fn parse_label(&mut self, delimiters: &[u8]) -> String {
        if self.peek() == Some(b'\'') {
            self.parse_quoted_label()
        } else {
            self.parse_unquoted_label(delimiters)
        }
    }

    /// Parses a quoted label enclosed in single quotes with escape support.
    ///
    /// Assumes the opening quote has not been consumed yet. Single quotes within
    /// the label are escaped by doubling them (e.g., `'Wilson''s'` becomes `Wilson's`).
    /// A missing closing quote ends the label at EOF.
    pub fn parse_quoted_label(&mut self) -> String {
        self.next_byte(); // consume opening '

        let mut label = Vec::new();
        while let Some(b) = self.next_byte() {
            if b == b'\'' {
                if self.peek() == Some(b'\'') {
                    label.push(b'\'');
                    self.next_byte(); // consume second quote
                } else {
                    break;
                }
            } else {
                label.push(b);
            }
        }

        String::from_utf8_lossy(&label).into_owned()
    }

    /// Parses an unquoted label until any of the given delimiters is encountered,
    /// skipping whitespace and control bytes.
    pub fn parse_unquoted_label(&mut self, delimiters: &[u8]) -> String {
        let mut label = Vec::new();

        while let Some(b) = self.peek() {
            if delimiters.contains(&b) {
                break;
            }
            if !is_insignificant(b) {
                label.push(b);
            }
            self.pos += 1;
        }

        String::from_utf8_lossy(&label).into_owned()
    }

    /// Consumes bytes while `accept` holds, skipping insignificant bytes,
    /// and returns the accepted ones as string.
    pub fn take_while(&mut self, accept: impl Fn(u8) -> bool) -> String {
        let mut taken = String::new();
        while let Some(b) = self.peek() {
            if accept(b) {
                taken.push(b as char);
            } else if !is_insignificant(b) {
                break;
            }
            self.pos += 1;
        }
        taken
    }

    /// Captures a bracketed block verbatim, including its delimiters.
    ///
    /// Assumes the parser is at the opening `[`. Nested brackets are kept
    /// and must be balanced before the block ends.
    ///
    /// # Returns
    /// * `Ok(String)` - The complete block, e.g. `[&&NHX:S=human]`
    /// * `Err(String)` - Everything up to EOF if the block was never closed
    pub fn capture_bracket(&mut self) -> Result<String, String> {
        let start = self.pos;
        let mut depth = 0usize;

        while let Some(b) = self.next_byte() {
            match b {
                b'[' => depth += 1,
                b']' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(self.slice_from(start));
                    }
                }
                _ => {}
            }
        }

        Err(self.slice_from(start))
    }

    fn slice_from(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }
}

/// Whitespace or a non-printable ASCII control byte.
#[inline]
fn is_insignificant(b: u8) -> bool {
    b <= b' ' || b == 0x7f
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquoted_label_drops_whitespace() {
        let mut parser = ByteParser::for_str("Homo\tsapiens :0.1");
        assert_eq!(parser.parse_label(b"(),:;[]"), "Homosapiens");
        assert_eq!(parser.peek(), Some(b':'));
    }

    #[test]
    fn quoted_label_keeps_spaces_and_escapes() {
        let mut parser = ByteParser::for_str("'Baillon''s Crake',");
        assert_eq!(parser.parse_label(b"(),:;[]"), "Baillon's Crake");
        assert_eq!(parser.peek(), Some(b','));
    }

    #[test]
    fn labels_keep_utf8() {
        let mut parser = ByteParser::for_str("Kākāpō:1");
        assert_eq!(parser.parse_label(b"(),:;[]"), "Kākāpō");
    }

    #[test]
    fn capture_nested_bracket() {
        let mut parser = ByteParser::for_str("[&a=[1,2]]x");
        assert_eq!(parser.capture_bracket(), Ok("[&a=[1,2]]".to_string()));
        assert_eq!(parser.peek(), Some(b'x'));
    }

    #[test]
    fn capture_unclosed_bracket_runs_to_eof() {
        let mut parser = ByteParser::for_str("[&&NHX:S=human");
        assert_eq!(parser.capture_bracket(), Err("[&&NHX:S=human".to_string()));
        assert!(parser.is_eof());
    }

    #[test]
    fn take_while_skips_inner_whitespace() {
        let mut parser = ByteParser::for_str("1.5e -3,");
        let number = parser.take_while(|b| b.is_ascii_digit() || b"eE+-.".contains(&b));
        assert_eq!(number, "1.5e-3");
        assert_eq!(parser.peek(), Some(b','));
    }

    #[test]
    fn context_is_clamped_to_input() {
        let parser = ByteParser::for_str("(A,B)");
        assert_eq!(parser.get_context_as_string(50), "(A,B)");
    }
}

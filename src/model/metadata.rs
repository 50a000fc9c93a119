//! Field extraction from opaque node metadata.
//!
//! The tree model keeps each node's bracketed annotation verbatim, e.g.
//! `[&&NHX:S=human:D=N]` or `[&rate=0.5,pop_size=1.2]`. Nothing is parsed
//! eagerly since the key set is open-ended. The helpers here let a consumer
//! (typically rendering) pull single values out on demand.

use regex::Regex;

/// Prefix of NHX annotation blocks (after the opening bracket).
const NHX_PREFIX: &str = "&&NHX";

/// Returns the value of `key` in a metadata blob, if present.
///
/// Accepts NHX blocks (`[&&NHX:key=value:...]`, fields separated by `:`)
/// and BEAST-style blocks (`[&key=value,...]`, fields separated by `,`).
/// Several concatenated blocks are searched in order. Keys are matched
/// exactly.
///
/// # Examples
/// ```
/// # use treewick::model::metadata::field;
/// assert_eq!(field("[&&NHX:S=human:D=N]", "S"), Some("human"));
/// assert_eq!(field("[&rate=0.5,pop_size=1.2]", "pop_size"), Some("1.2"));
/// assert_eq!(field("[&&NHX:S=human]", "D"), None);
/// assert_eq!(field("", "S"), None);
/// ```
pub fn field<'a>(metadata: &'a str, key: &str) -> Option<&'a str> {
    blocks(metadata).find_map(|block| {
        let (body, separator) = match block.strip_prefix(NHX_PREFIX) {
            Some(rest) => (rest, ':'),
            None => (block.trim_start_matches('&'), ','),
        };
        body.split(separator)
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| k.trim() == key)
            .map(|(_, v)| v.trim())
    })
}

/// Returns the first capture group of `pattern` in a metadata blob, or the
/// whole match if the pattern has no groups.
///
/// # Examples
/// ```
/// # use treewick::model::metadata::capture;
/// let pattern = regex::Regex::new(r"B=(\d+)").unwrap();
/// assert_eq!(capture("[&&NHX:B=95:S=human]", &pattern), Some("95"));
/// assert_eq!(capture("[&&NHX:S=human]", &pattern), None);
/// ```
pub fn capture<'a>(metadata: &'a str, pattern: &Regex) -> Option<&'a str> {
    let captures = pattern.captures(metadata)?;
    captures
        .get(1)
        .or_else(|| captures.get(0))
        .map(|m| m.as_str())
}

/// Returns `true` if the blob contains an NHX block.
pub fn is_nhx(metadata: &str) -> bool {
    blocks(metadata).any(|block| block.starts_with(NHX_PREFIX))
}

/// Iterates over the contents of the bracketed blocks of a blob,
/// without the brackets. An unterminated trailing block is included.
fn blocks(metadata: &str) -> impl Iterator<Item = &str> {
    metadata
        .split('[')
        .skip(1)
        .map(|block| block.split(']').next().unwrap_or(block))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_field_in_second_block() {
        let blob = "[comment][&&NHX:B=100]";
        assert_eq!(field(blob, "B"), Some("100"));
        assert!(is_nhx(blob));
    }

    #[test]
    fn tolerates_unterminated_block() {
        assert_eq!(field("[&&NHX:S=mouse", "S"), Some("mouse"));
    }

    #[test]
    fn plain_comment_is_not_nhx() {
        assert!(!is_nhx("[just a comment]"));
        assert_eq!(field("[just a comment]", "just"), None);
    }

    #[test]
    fn capture_without_group_returns_whole_match() {
        let pattern = Regex::new(r"S=\w+").unwrap();
        assert_eq!(capture("[&&NHX:S=human]", &pattern), Some("S=human"));
    }
}

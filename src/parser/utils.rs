//! Utility functions for label escaping in Newick text.
//!
//! Unquoted Newick labels cannot contain delimiters, and the parser drops
//! whitespace from them. These helpers decide when a label has to be
//! single-quoted on output so that it reads back unchanged.

/// Characters that end an unquoted label or change its meaning.
const SPECIAL_CHARS: &[char] = &['(', ')', '[', ']', ',', ':', ';', '\''];

/// Checks whether a label can be written without quotes and read back
/// unchanged.
///
/// # Examples
/// ```
/// # use treewick::parser::utils::needs_quotes;
/// assert!(!needs_quotes("Pukeko"));
/// assert!(!needs_quotes("Australasian_Swamphen"));
/// assert!(needs_quotes("Australasian Swamphen"));
/// assert!(needs_quotes("Pu[ke]ko"));
/// assert!(needs_quotes("Baillon's_Crake"));
/// ```
pub fn needs_quotes(label: &str) -> bool {
    label
        .chars()
        .any(|c| SPECIAL_CHARS.contains(&c) || c.is_whitespace() || c.is_control())
}

/// Escapes a label for safe use in Newick text.
///
/// Labels containing special characters (punctuation, delimiters, whitespace)
/// are wrapped in single quotes, with internal single quotes doubled. All
/// other labels are returned as they are.
///
/// # Examples
/// ```
/// # use treewick::parser::utils::escape_label;
/// assert_eq!(escape_label("Pukeko"), "Pukeko");
/// assert_eq!(escape_label("Pu[ke]ko"), "'Pu[ke]ko'");
/// assert_eq!(escape_label("Australasian Swamphen"), "'Australasian Swamphen'");
/// assert_eq!(escape_label("Baillon's Crake"), "'Baillon''s Crake'");
/// assert_eq!(escape_label(""), "");
/// ```
pub fn escape_label(label: &str) -> String {
    if needs_quotes(label) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

//! Pattern-based highlighting of leaves.

use crate::model::{Traversal, Tree};
use regex::RegexBuilder;
use thiserror::Error;
use tracing::debug;

/// Error for search patterns that are not valid regular expressions.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid search pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl Tree {
    /// Highlights every leaf whose name matches `pattern`, a case-insensitive
    /// regular expression, and clears the highlight of all other leaves.
    ///
    /// Leaves below collapsed nodes are searched too; inner nodes are left
    /// as they are. `None` or an empty pattern clears all leaf highlights.
    ///
    /// # Returns
    /// * `Ok(count)` - Number of highlighted leaves
    /// * `Err(SearchError)` - If the pattern does not compile; nothing changes
    ///
    /// # Example
    /// ```
    /// let mut tree = treewick::parse_newick_str("((Kiwi,Kea),(Kaka,Tui));");
    /// assert_eq!(tree.search(Some("^ke|^ka")).unwrap(), 2);
    /// let kea = tree.find("Kea").unwrap();
    /// assert!(tree[kea].is_highlighted());
    /// assert!(tree.search(Some("(")).is_err());
    /// ```
    pub fn search(&mut self, pattern: Option<&str>) -> Result<usize, SearchError> {
        let regex = match pattern {
            Some(pattern) if !pattern.is_empty() => Some(
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| SearchError::InvalidPattern {
                        pattern: pattern.to_string(),
                        source,
                    })?,
            ),
            _ => None,
        };

        let mut count = 0;
        for index in self.postorder(self.root_index(), Traversal::Full) {
            let node = &mut self[index];
            if !node.is_leaf() {
                continue;
            }
            let matched = regex.as_ref().is_some_and(|regex| regex.is_match(node.name()));
            node.set_highlighted(matched);
            count += usize::from(matched);
        }

        debug!(pattern = ?pattern, matches = count, "Searched leaves");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::newick::parse_str;

    #[test]
    fn empty_pattern_clears_highlights() {
        let mut tree = parse_str("((A,B),C);");
        assert_eq!(tree.search(Some("a|b")).unwrap(), 2);
        assert_eq!(tree.search(Some("")).unwrap(), 0);
        assert!(tree.leaves().iter().all(|&leaf| !tree[leaf].is_highlighted()));
        tree.search(Some("c")).unwrap();
        assert_eq!(tree.search(None).unwrap(), 0);
    }

    #[test]
    fn inner_nodes_are_untouched() {
        let mut tree = parse_str("((A,B)AB,C);");
        let ab = tree.find("AB").unwrap();
        tree[ab].set_highlighted(true);
        tree.search(Some("x")).unwrap();
        assert!(tree[ab].is_highlighted());
    }

    #[test]
    fn collapsed_leaves_are_searched() {
        let mut tree = parse_str("((A,B)X,C);");
        let x = tree.find("X").unwrap();
        tree.set_collapsed(x, true);
        assert_eq!(tree.search(Some("^[ab]$")).unwrap(), 2);
    }

    #[test]
    fn invalid_pattern_changes_nothing() {
        let mut tree = parse_str("(A,B);");
        tree.search(Some("A")).unwrap();
        let err = tree.search(Some("[")).unwrap_err();
        assert!(err.to_string().starts_with("Invalid search pattern '['"));
        let a = tree.find("A").unwrap();
        assert!(tree[a].is_highlighted());
    }
}

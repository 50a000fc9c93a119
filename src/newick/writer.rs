//! Newick/NHX writing of [Tree]s.
//!
//! The writer does not recurse: it walks the postorder of the tree and
//! reconstructs the parentheses from the depth of consecutive nodes.

use crate::model::{NodeIndex, Traversal, Tree};
use crate::newick::defs::BUFFER_CHARS;
use crate::parser::utils::escape_label;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Style for serializing a tree to Newick format,
/// controlling which parts of a node token are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewickStyle {
    /// Labels, branch lengths and metadata blocks
    #[default]
    Full,
    /// Labels and branch lengths
    NoMetadata,
    /// Labels only
    Topology,
}

// =#========================================================================#=
// NEWICK WRITER
// =#========================================================================$=
/// Writer (configuration) for Newick/NHX strings.
///
/// # Configuration
/// * [`with_style(style)`](Self::with_style) - see [NewickStyle]
/// * [`with_collapsed_hidden()`](Self::with_collapsed_hidden)
///     - Writes collapsed nodes as tips, leaving out their descendants.
///       By default, the full tree is written.
///
/// # Traversal
/// The default writer walks a fresh full postorder from the root, so it
/// includes the descendants of collapsed nodes and does not follow the
/// flattened [`Tree::nodes`] sequence. That sequence is the visible tree,
/// where collapsed nodes are tips. Use
/// [`with_collapsed_hidden()`](Self::with_collapsed_hidden) to write exactly
/// what [`Tree::flatten`] sees.
///
/// # Example
/// ```
/// use treewick::newick::{NewickStyle, NewickWriter};
///
/// let tree = treewick::parse_newick_str("((A:1,B:2)[&&NHX:B=90]:0.5,C:3);");
/// assert_eq!(
///     NewickWriter::new().write(&tree),
///     "((A:1,B:2):0.5[&&NHX:B=90],C:3);"
/// );
/// assert_eq!(
///     NewickWriter::new().with_style(NewickStyle::Topology).write(&tree),
///     "((A,B),C);"
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NewickWriter {
    style: NewickStyle,
    hide_collapsed: bool,
}

impl NewickWriter {
    /// Creates a writer producing full NHX output of the whole tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the [NewickStyle].
    pub fn with_style(mut self, style: NewickStyle) -> Self {
        self.style = style;
        self
    }

    /// Configures the writer to leave out descendants of collapsed nodes.
    pub fn with_collapsed_hidden(mut self) -> Self {
        self.hide_collapsed = true;
        self
    }

    /// Returns the Newick representation of `tree` with closing semicolon.
    pub fn write(&self, tree: &Tree) -> String {
        let estimated_capacity = self.estimate_newick_len(tree);
        self.write_with_capacity(tree, estimated_capacity)
    }

    /// Returns the Newick representation with pre-allocated capacity.
    ///
    /// Useful for writing multiple trees with similar structure, where the
    /// capacity can be estimated once and reused.
    pub(crate) fn write_with_capacity(&self, tree: &Tree, estimated_capacity: usize) -> String {
        let traversal = if self.hide_collapsed {
            Traversal::Visible
        } else {
            Traversal::Full
        };
        let sequence = tree.postorder(tree.root_index(), traversal);
        let depths = tree.depths(&sequence);

        let mut newick = String::with_capacity(estimated_capacity);
        let mut previous_depth = 0;

        for (position, &index) in sequence.iter().enumerate() {
            let depth = depths[index];

            if depth > previous_depth {
                if position > 0 {
                    newick.push(',');
                }
                for _ in previous_depth..depth {
                    newick.push('(');
                }
            } else if depth == previous_depth {
                if position > 0 {
                    newick.push(',');
                }
            } else {
                // A parent follows its last child in postorder
                debug_assert_eq!(previous_depth - depth, 1, "Not a postorder");
                for _ in depth..previous_depth {
                    newick.push(')');
                }
            }

            self.write_token(tree, index, &mut newick);
            previous_depth = depth;
        }

        newick.push(';');
        newick
    }

    fn write_token(&self, tree: &Tree, index: NodeIndex, newick: &mut String) {
        let node = &tree[index];
        newick.push_str(&escape_label(node.name()));

        if self.style != NewickStyle::Topology {
            if let Some(branch_length) = node.branch_length() {
                newick.push(':');
                newick.push_str(&branch_length.to_string());
            }
        }
        if self.style == NewickStyle::Full {
            newick.push_str(node.metadata());
        }
    }

    /// Estimates the length of the Newick string for a given tree.
    ///
    /// Accounts for structure, labels and, depending on the style,
    /// branch lengths and metadata.
    pub(crate) fn estimate_newick_len(&self, tree: &Tree) -> usize {
        // Branch lengths: ~20 chars each (e.g., ":0.009529961339106089")
        const BRANCH_LENGTH_CHARS: usize = 20;
        // Parentheses and comma per node
        const STRUCTURE_CHARS: usize = 2;

        let mut capacity = BUFFER_CHARS;
        for index in tree.postorder(tree.root_index(), Traversal::Full) {
            let node = &tree[index];
            capacity += STRUCTURE_CHARS + node.name().len();
            if self.style != NewickStyle::Topology && node.has_branch_length() {
                capacity += BRANCH_LENGTH_CHARS;
            }
            if self.style == NewickStyle::Full {
                capacity += node.metadata().len();
            }
        }
        capacity
    }
}

/// Writes given list of trees to a file in Newick format, one tree per line.
///
/// # Arguments
/// * `file` - The file to write to
/// * `trees` - Trees to write
/// * `writer` - Writer configuration used for every tree
///
/// # Errors
/// Returns an I/O error if writing fails.
pub fn write_newick(file: File, trees: &[Tree], writer: &NewickWriter) -> io::Result<()> {
    let Some(first) = trees.first() else {
        return Ok(());
    };

    let mut out = BufWriter::new(file);
    let estimated_capacity = writer.estimate_newick_len(first);
    for tree in trees {
        let newick = writer.write_with_capacity(tree, estimated_capacity);
        out.write_all(newick.as_bytes())?;
        out.write_all(b"\n")?;
    }

    out.flush()?;
    Ok(())
}

/// Creates (or truncates) the file at `path` and writes the trees to it
/// with default writer settings, one per line.
///
/// # Example
/// ```no_run
/// use treewick::newick::write_newick_file;
///
/// let tree = treewick::parse_newick_str("(A,B);");
/// write_newick_file("trees.nwk", &[tree])?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn write_newick_file<P: AsRef<Path>>(path: P, trees: &[Tree]) -> io::Result<()> {
    let file = File::create(path)?;
    write_newick(file, trees, &NewickWriter::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newick::parse_str;

    #[test]
    fn single_node_tree() {
        let tree = Tree::with_root("A", Some(1.5));
        assert_eq!(NewickWriter::new().write(&tree), "A:1.5;");
    }

    #[test]
    fn deeper_second_child() {
        let tree = parse_str("(A,(B,C)D)R;");
        assert_eq!(NewickWriter::new().write(&tree), "(A,(B,C)D)R;");
    }

    #[test]
    fn collapsed_hidden_only_on_request() {
        let mut tree = parse_str("((A,B)X,C);");
        let x = tree.find("X").unwrap();
        tree.set_collapsed(x, true);
        assert_eq!(NewickWriter::new().write(&tree), "((A,B)X,C);");
        assert_eq!(
            NewickWriter::new().with_collapsed_hidden().write(&tree),
            "(X,C);"
        );
    }

    #[test]
    fn default_writer_ignores_flattened_sequence() {
        let mut tree = parse_str("((A,B)X,(C,D)Y);");
        let y = tree.find("Y").unwrap();
        tree.set_collapsed(y, true);
        tree.flatten();
        // A, B, X, Y, root
        assert_eq!(tree.nodes().len(), 5);

        assert_eq!(NewickWriter::new().write(&tree), "((A,B)X,(C,D)Y);");
        assert_eq!(
            NewickWriter::new().with_collapsed_hidden().write(&tree),
            "((A,B)X,Y);"
        );
    }

    #[test]
    fn labels_are_escaped() {
        let mut tree = Tree::new();
        let root = tree.root_index();
        tree.add_child(root, "Baillon's Crake", None);
        tree.add_child(root, "Pukeko", None);
        tree.flatten();
        assert_eq!(NewickWriter::new().write(&tree), "('Baillon''s Crake',Pukeko);");
    }

    #[test]
    fn no_metadata_style() {
        let tree = parse_str("(A:1[&&NHX:S=x],B:2);");
        let writer = NewickWriter::new().with_style(NewickStyle::NoMetadata);
        assert_eq!(writer.write(&tree), "(A:1,B:2);");
    }
}

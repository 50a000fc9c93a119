use crate::edit::{EditError, ensure_attached};
use crate::model::node::joined_length;
use crate::model::{NodeIndex, Tree};
use tracing::debug;

impl Tree {
    /// Cuts the subtree rooted at `index` off the tree.
    ///
    /// Ancestors left without children are cut off as well, up to the first
    /// one that still has children (or the root). If that one is left with
    /// a single child, it is spliced out: the surviving child takes its
    /// place (possibly becoming the root) and its branch length becomes the
    /// sum of both lengths, unspecified if either one is unspecified.
    /// Otherwise `index` is just removed from the parent's children, keeping
    /// the order of the rest.
    ///
    /// The pruned subtree stays in the arena, detached; see
    /// [`subtree`](Self::subtree) to copy it out.
    ///
    /// # Returns
    /// * `Ok(root)` - Index of the (possibly new) root
    /// * `Err(EditError)` - If `index` is the root or not attached
    ///
    /// # Example
    /// ```
    /// let mut tree = treewick::parse_newick_str("((A:1,B:2):1,C:3);");
    /// let b = tree.find("B").unwrap();
    /// tree.prune(b).unwrap();
    /// tree.flatten();
    /// assert_eq!(tree.to_newick(), "(A:2,C:3);");
    /// ```
    pub fn prune(&mut self, index: NodeIndex) -> Result<NodeIndex, EditError> {
        ensure_attached(self, index)?;
        if index == self.root_index() {
            return Err(EditError::RootNotAllowed { operation: "prune" });
        }

        let cut = self.cut(index);
        self.touch();
        debug!(
            node = index,
            emptied = cut.as_ref().map_or(0, |c| c.emptied.len()),
            spliced = ?cut.as_ref().and_then(|c| c.survivor.map(|_| c.stop)),
            root = self.root_index(),
            "Pruned subtree"
        );
        Ok(self.root_index())
    }

    /// Detaches `index` (not the root) together with the chain of ancestors
    /// left without children, and splices out the first remaining ancestor
    /// if it is left unary.
    pub(crate) fn cut(&mut self, index: NodeIndex) -> Option<Cut> {
        let (mut parent, _) = self.detach(index)?;

        let mut emptied = Vec::new();
        while self[parent].is_leaf() && parent != self.root_index() {
            let Some((grandparent, _)) = self.detach(parent) else {
                break;
            };
            emptied.push(parent);
            parent = grandparent;
        }

        let survivor = if self[parent].num_children() == 1 {
            let sibling = self[parent].children()[0];
            let branch_length = joined_length(self[parent].branch_length(), self[sibling].branch_length());
            self[sibling].set_branch_length(branch_length);
            self[parent].take_children();
            self.replace(parent, sibling);
            Some(sibling)
        } else {
            None
        };

        Some(Cut {
            emptied,
            stop: parent,
            survivor,
        })
    }
}

/// What [`Tree::cut`] removed besides the cut subtree.
#[derive(Debug)]
pub(crate) struct Cut {
    /// Ancestors left without children, now detached, nearest first
    pub(crate) emptied: Vec<NodeIndex>,
    /// First ancestor that kept children, or the root
    pub(crate) stop: NodeIndex,
    /// Child that took the place of `stop` if `stop` was spliced out
    pub(crate) survivor: Option<NodeIndex>,
}

#[cfg(test)]
mod tests {
    use crate::edit::EditError;
    use crate::newick::parse_str;

    #[test]
    fn prune_keeps_order_of_remaining_children() {
        let mut tree = parse_str("(A,B,C,D);");
        let b = tree.find("B").unwrap();
        tree.prune(b).unwrap();
        tree.flatten();
        assert_eq!(tree.to_newick(), "(A,C,D);");
        assert!(tree.is_valid());
    }

    #[test]
    fn prune_child_of_root_promotes_sibling() {
        let mut tree = parse_str("((A:1,B:1)X:2,C:3);");
        let c = tree.find("C").unwrap();
        let x = tree.find("X").unwrap();
        let root = tree.prune(c).unwrap();
        assert_eq!(root, x);
        assert!(!tree[x].has_parent());
        // The old root had no length
        assert_eq!(tree[x].branch_length(), None);
        assert!(tree.is_valid());
    }

    #[test]
    fn prune_only_child_removes_emptied_parent() {
        let mut tree = parse_str("((A)X,B);");
        let a = tree.find("A").unwrap();
        let x = tree.find("X").unwrap();
        let b = tree.find("B").unwrap();
        assert_eq!(tree.tip_count(), 2);

        let root = tree.prune(a).unwrap();
        tree.flatten();
        assert_eq!(root, b);
        assert_eq!(tree.count_tips(), 1);
        assert_eq!(tree.to_newick(), "B;");
        assert!(!tree.is_attached(x));
        assert!(tree.is_valid());
    }

    #[test]
    fn prune_through_unary_chain_keeps_multifurcation() {
        let mut tree = parse_str("(((A)X)Y,B,C);");
        let a = tree.find("A").unwrap();
        tree.prune(a).unwrap();
        tree.flatten();
        assert_eq!(tree.count_tips(), 2);
        assert_eq!(tree.to_newick(), "(B,C);");
    }

    #[test]
    fn prune_root_is_rejected() {
        let mut tree = parse_str("(A,B);");
        let root = tree.root_index();
        let revision = tree.revision();
        assert_eq!(
            tree.prune(root),
            Err(EditError::RootNotAllowed { operation: "prune" })
        );
        assert_eq!(tree.revision(), revision);
    }

    #[test]
    fn pruned_subtree_can_be_copied_out() {
        let mut tree = parse_str("((A,B)X,(C,D)Y);");
        let y = tree.find("Y").unwrap();
        tree.prune(y).unwrap();
        let copy = tree.subtree(y);
        assert_eq!(copy.to_newick(), "(C,D)Y;");
        assert_eq!(copy.tip_count(), 2);
    }
}

use crate::edit::{EditError, ensure_attached};
use crate::model::{NodeIndex, Tree};
use tracing::debug;

impl Tree {
    /// Moves the subtree rooted at `node` onto the edge above `target`.
    ///
    /// `node` is pruned (see [`prune`](Self::prune)), then a new unnamed
    /// node is inserted on the edge above `target` with children
    /// `[target, node]`. A specified branch length of `target` is split
    /// in half between the new node and `target`; `node` keeps its length.
    /// If pruning removes `target` itself, the nearest node that survives in
    /// its place is used instead: the sibling that took the place of a
    /// spliced-out node, or the first ancestor that kept its children.
    ///
    /// # Returns
    /// * `Ok(root)` - Index of the (possibly new) root
    /// * `Err(EditError)` - If `node` is the root, `target` lies in the
    ///   subtree of `node`, or either one is not attached
    ///
    /// # Example
    /// ```
    /// let mut tree = treewick::parse_newick_str("((A,B),(C,D));");
    /// let a = tree.find("A").unwrap();
    /// let d = tree.find("D").unwrap();
    /// tree.regraft(a, d).unwrap();
    /// tree.flatten();
    /// assert_eq!(tree.to_newick(), "(B,(C,(D,A)));");
    /// ```
    pub fn regraft(&mut self, node: NodeIndex, target: NodeIndex) -> Result<NodeIndex, EditError> {
        ensure_attached(self, node)?;
        ensure_attached(self, target)?;
        if node == self.root_index() {
            return Err(EditError::RootNotAllowed { operation: "regraft" });
        }
        if node == target || self.is_ancestor_of(node, target) {
            return Err(EditError::WouldCreateCycle { node, target });
        }

        let target = match self.cut(node) {
            Some(cut) => {
                let target = if cut.emptied.contains(&target) { cut.stop } else { target };
                match cut.survivor {
                    Some(survivor) if cut.stop == target => survivor,
                    _ => target,
                }
            }
            None => target,
        };

        let half = self[target].branch_length().map(|length| length / 2.0);
        let splice = self.push_node(String::new(), half);
        self[target].set_branch_length(half);
        self.replace(target, splice);
        self.attach(splice, target);
        self.attach(splice, node);

        self.touch();
        debug!(node, target, splice, root = self.root_index(), "Regrafted subtree");
        Ok(self.root_index())
    }
}

#[cfg(test)]
mod tests {
    use crate::edit::EditError;
    use crate::newick::parse_str;

    #[test]
    fn regraft_halves_target_length() {
        let mut tree = parse_str("((A:1,B:1):1,(C:2,D:4):1);");
        let a = tree.find("A").unwrap();
        let d = tree.find("D").unwrap();
        tree.regraft(a, d).unwrap();
        tree.flatten();
        assert_eq!(tree.to_newick(), "(B:2,(C:2,(D:2,A:1):2):1);");
        assert!(tree.is_valid());
    }

    #[test]
    fn regraft_onto_spliced_parent_uses_survivor() {
        let mut tree = parse_str("((A,B)X,C);");
        let a = tree.find("A").unwrap();
        let x = tree.find("X").unwrap();
        tree.regraft(a, x).unwrap();
        tree.flatten();
        // X is spliced out by the prune, so A goes next to B
        assert_eq!(tree.to_newick(), "((B,A),C);");
        assert!(tree.is_valid());
    }

    #[test]
    fn regraft_onto_emptied_ancestor_uses_survivor() {
        let mut tree = parse_str("(((A)X,B)Y,C);");
        let a = tree.find("A").unwrap();
        let x = tree.find("X").unwrap();
        tree.regraft(a, x).unwrap();
        tree.flatten();
        // X is emptied and Y spliced out, B stands in for both
        assert_eq!(tree.to_newick(), "((B,A),C);");
        assert_eq!(tree.count_tips(), 3);
        assert!(tree.is_valid());
    }

    #[test]
    fn regraft_into_own_subtree_is_rejected() {
        let mut tree = parse_str("((A,B)X,C);");
        let x = tree.find("X").unwrap();
        let a = tree.find("A").unwrap();
        let expected = tree.to_newick();
        assert_eq!(
            tree.regraft(x, a),
            Err(EditError::WouldCreateCycle { node: x, target: a })
        );
        assert_eq!(
            tree.regraft(x, x),
            Err(EditError::WouldCreateCycle { node: x, target: x })
        );
        assert_eq!(tree.to_newick(), expected);
    }

    #[test]
    fn regraft_above_root() {
        let mut tree = parse_str("((A,B)X,(C,D)Y)R;");
        let a = tree.find("A").unwrap();
        let r = tree.root_index();
        let root = tree.regraft(a, r).unwrap();
        assert_ne!(root, r);
        tree.flatten();
        assert_eq!(tree.to_newick(), "((B,(C,D)Y)R,A);");
    }
}

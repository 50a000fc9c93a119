use crate::edit::{EditError, ensure_attached};
use crate::model::node::joined_length;
use crate::model::{NodeIndex, Tree};
use tracing::debug;

impl Tree {
    /// Places a new root on the edge above `index`, `distance` away from
    /// `index`.
    ///
    /// The new root gets the children `[index, old parent]` with branch
    /// lengths `distance` and `length - distance`. All edges on the path up
    /// to the old root are reversed, each taking the branch length of the
    /// edge it replaces. An old root left with a single child is spliced out
    /// (lengths summed, unspecified if either one is), one left without
    /// children is dropped, otherwise it stays as an ordinary inner node.
    ///
    /// A `distance` outside `[0, length]` or not finite falls back to the
    /// midpoint of the edge. If the edge has no length, both new edges
    /// have none either.
    ///
    /// # Returns
    /// * `Ok(root)` - Index of the new root; the current root if `index`
    ///   already is the root (nothing changes then)
    /// * `Err(EditError)` - If `index` is not attached
    ///
    /// # Example
    /// ```
    /// let mut tree = treewick::parse_newick_str("((A:1,B:1):2,C:4);");
    /// let c = tree.find("C").unwrap();
    /// tree.reroot(c, 1.0).unwrap();
    /// tree.flatten();
    /// assert_eq!(tree.to_newick(), "(C:1,(A:1,B:1):5);");
    /// ```
    pub fn reroot(&mut self, index: NodeIndex, distance: f64) -> Result<NodeIndex, EditError> {
        ensure_attached(self, index)?;
        let old_root = self.root_index();
        if index == old_root {
            return Ok(old_root);
        }

        let length = self[index].branch_length();
        let distance = length.map(|length| {
            if distance.is_finite() && (0.0..=length).contains(&distance) {
                distance
            } else {
                length / 2.0
            }
        });

        let Some((mut current, _)) = self.detach(index) else {
            return Ok(old_root);
        };
        let root = self.push_node(String::new(), None);
        self.attach(root, index);
        self[index].set_branch_length(distance);

        // Reverse the path up to the old root
        let mut carried = length.zip(distance).map(|(length, distance)| length - distance);
        let mut previous = root;
        loop {
            let next = self[current].parent();
            let own_length = self[current].branch_length();
            if next.is_some() {
                self.detach(current);
            }
            self.attach(previous, current);
            self[current].set_branch_length(carried);

            match next {
                Some(next) => {
                    carried = own_length;
                    previous = current;
                    current = next;
                }
                None => break,
            }
        }

        match self[old_root].num_children() {
            0 => {
                self.detach(old_root);
            }
            1 => {
                let child = self[old_root].children()[0];
                let length = joined_length(self[old_root].branch_length(), self[child].branch_length());
                self[child].set_branch_length(length);
                self[old_root].take_children();
                self.replace(old_root, child);
            }
            _ => {}
        }

        self.set_root(root);
        self.touch();
        debug!(node = index, distance = ?distance, root, "Rerooted tree");
        Ok(root)
    }
}

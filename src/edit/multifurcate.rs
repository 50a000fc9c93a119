use crate::edit::{EditError, ensure_attached};
use crate::model::node::extended_length;
use crate::model::{NodeIndex, Tree};
use tracing::debug;

impl Tree {
    /// Contracts the edge above the inner node `index`: its children take
    /// its place among the children of its parent, in order, and each
    /// child's branch length is extended by the one of `index` (if both are
    /// specified).
    ///
    /// # Errors
    /// [`EditError::LeafNotAllowed`] for leaves, [`EditError::RootNotAllowed`]
    /// for the root, and an error if `index` is not attached.
    ///
    /// # Example
    /// ```
    /// let mut tree = treewick::parse_newick_str("(A:1,(B:1,C:2)X:0.5,D:1);");
    /// let x = tree.find("X").unwrap();
    /// tree.multifurcate(x).unwrap();
    /// tree.flatten();
    /// assert_eq!(tree.to_newick(), "(A:1,B:1.5,C:2.5,D:1);");
    /// ```
    pub fn multifurcate(&mut self, index: NodeIndex) -> Result<(), EditError> {
        ensure_attached(self, index)?;
        if self[index].is_leaf() {
            return Err(EditError::LeafNotAllowed { operation: "multifurcate" });
        }
        let Some((parent, position)) = self.detach(index) else {
            return Err(EditError::RootNotAllowed { operation: "multifurcate" });
        };

        let extra = self[index].branch_length();
        let children = self[index].take_children();
        for &child in &children {
            let length = extended_length(self[child].branch_length(), extra);
            self[child].set_branch_length(length);
            self[child].set_parent(Some(parent));
        }
        let count = children.len();
        self[parent]
            .children_mut()
            .splice(position..position, children);

        self.touch();
        debug!(node = index, parent, children = count, "Contracted edge");
        Ok(())
    }
}

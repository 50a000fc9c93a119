use crate::edit::{EditError, ensure_attached};
use crate::model::node::Aggregates;
use crate::model::{NodeIndex, Traversal, Tree};
use tracing::debug;

impl Tree {
    /// Reorders the children in the visible subtree of `index` so that
    /// deep tips come first. Topology and branch lengths do not change.
    ///
    /// Tips (leaves and collapsed nodes) are ranked by depth below `index`,
    /// deepest first, ties broken by name. Every node gets the sum of the
    /// ranks of its tips as weight, and children are sorted stably by mean
    /// rank. Children of collapsed nodes keep their order.
    ///
    /// Depth, weight and tip count of every visited node are kept as
    /// [`Aggregates`](crate::model::Aggregates) until the next change of
    /// the tree.
    ///
    /// # Example
    /// ```
    /// let mut tree = treewick::parse_newick_str("(A,(B,(C,D)));");
    /// let root = tree.root_index();
    /// tree.ladderize(root).unwrap();
    /// tree.flatten();
    /// assert_eq!(tree.to_newick(), "(((C,D),B),A);");
    /// ```
    pub fn ladderize(&mut self, index: NodeIndex) -> Result<(), EditError> {
        ensure_attached(self, index)?;

        let order = self.postorder(index, Traversal::Visible);
        let depths = self.depths(&order);

        // Rank tips
        let mut tips: Vec<NodeIndex> = order.iter().copied().filter(|&i| self[i].is_tip()).collect();
        tips.sort_by(|&a, &b| {
            depths[b]
                .cmp(&depths[a])
                .then_with(|| self[a].name().cmp(self[b].name()))
        });

        let mut aggregates = vec![Aggregates::default(); self.arena_len()];
        for (rank, &tip) in tips.iter().enumerate() {
            aggregates[tip] = Aggregates {
                depth: depths[tip],
                weight: rank as f64,
                tip_count: 1,
            };
        }

        // Sum bottom-up and sort children
        for &node in &order {
            if self[node].is_tip() {
                continue;
            }
            let mut children = self[node].take_children();
            children.sort_by(|&a, &b| {
                aggregates[a]
                    .mean_rank()
                    .total_cmp(&aggregates[b].mean_rank())
            });

            let mut sum = Aggregates {
                depth: depths[node],
                ..Aggregates::default()
            };
            for &child in &children {
                sum.weight += aggregates[child].weight;
                sum.tip_count += aggregates[child].tip_count;
            }
            aggregates[node] = sum;
            *self[node].children_mut() = children;
        }

        self.touch();
        let revision = self.revision();
        for &node in &order {
            self[node].set_aggregates(aggregates[node], revision);
        }

        debug!(root = index, tips = tips.len(), "Ladderized subtree");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::newick::parse_str;

    #[test]
    fn ties_are_broken_by_name() {
        let mut tree = parse_str("((D,C),(B,A));");
        let root = tree.root_index();
        tree.ladderize(root).unwrap();
        tree.flatten();
        assert_eq!(tree.to_newick(), "((A,B),(C,D));");
    }

    #[test]
    fn collapsed_node_is_ranked_as_tip() {
        let mut tree = parse_str("(A,((B,C)X,D));");
        let x = tree.find("X").unwrap();
        tree.set_collapsed(x, true);
        let root = tree.root_index();
        tree.ladderize(root).unwrap();
        tree.flatten();
        // X and D are tips at depth 2, A at depth 1
        assert_eq!(tree.to_newick(), "((D,(B,C)X),A);");
        assert_eq!(tree.aggregates(x).map(|a| a.tip_count), Some(1));
    }

    #[test]
    fn aggregates_go_stale_after_change() {
        let mut tree = parse_str("((A,B),C);");
        let root = tree.root_index();
        tree.ladderize(root).unwrap();
        let aggregates = tree.aggregates(root).unwrap();
        assert_eq!(aggregates.tip_count, 3);
        assert_eq!(aggregates.weight, 3.0);
        assert_eq!(aggregates.depth, 0);

        let a = tree.find("A").unwrap();
        tree.toggle_collapsed(a);
        assert_eq!(tree.aggregates(root), None);
    }
}

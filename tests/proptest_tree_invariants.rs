//! Property-based invariant tests for trees under random edits.
//!
//! 1. Any sequence of edits keeps the tree structurally valid.
//! 2. Rejected edits leave the tree unchanged.
//! 3. Prune removes exactly the leaves below the pruned node, also through
//!    chains of single-child nodes; all other edits keep the set of leaves.
//! 4. Writing and re-parsing reproduces the same Newick string.
//! 5. After ladderize, children are ordered by mean tip rank.

use proptest::prelude::*;
use treewick::model::{NodeIndex, Traversal, Tree};
use treewick::newick::parse_str;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Grows a tree: a picked leaf gets one or two children, a picked inner
/// node one more.
fn build(steps: &[(usize, bool, Option<f64>)]) -> Tree {
    let mut tree = Tree::with_root("N0", None);
    let root = tree.root_index();
    tree.add_child(root, "N1", Some(1.0));
    tree.add_child(root, "N2", None);
    let mut next = 3;

    for &(selector, unary, length) in steps {
        tree.flatten();
        let node = tree.nodes()[selector % tree.nodes().len()];
        let new_children = if tree[node].is_leaf() && !unary { 2 } else { 1 };
        for _ in 0..new_children {
            tree.add_child(node, format!("N{next}"), length);
            next += 1;
        }
    }

    tree.flatten();
    tree.count_tips();
    tree
}

fn steps(max_len: usize) -> impl Strategy<Value = Vec<(usize, bool, Option<f64>)>> {
    proptest::collection::vec(
        (any::<usize>(), proptest::bool::weighted(0.2), proptest::option::of(0.0f64..10.0)),
        0..=max_len,
    )
}

fn leaf_names(tree: &Tree, below: NodeIndex) -> Vec<String> {
    let mut names: Vec<String> = tree
        .postorder(below, Traversal::Full)
        .into_iter()
        .filter(|&i| tree[i].is_leaf())
        .map(|i| tree[i].name().to_string())
        .collect();
    names.sort();
    names
}

#[derive(Debug, Clone)]
enum Edit {
    Prune(usize),
    Regraft(usize, usize),
    Reroot(usize, f64),
    Multifurcate(usize),
    Ladderize,
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        any::<usize>().prop_map(Edit::Prune),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Edit::Regraft(a, b)),
        (any::<usize>(), -1.0f64..5.0).prop_map(|(a, d)| Edit::Reroot(a, d)),
        any::<usize>().prop_map(Edit::Multifurcate),
        Just(Edit::Ladderize),
    ]
}

fn pick(tree: &Tree, selector: usize) -> NodeIndex {
    tree.nodes()[selector % tree.nodes().len()]
}

// ═════════════════════════════════════════════════════════════════════════
// 1.-3. Random edit sequences
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn random_edits_keep_tree_valid(growth in steps(30), edits in proptest::collection::vec(edit(), 1..20)) {
        let mut tree = build(&growth);

        for edit in edits {
            let before = tree.to_newick();
            let root = tree.root_index();
            let mut expected_leaves = leaf_names(&tree, root);
            let mut check_leaves = true;

            let result = match edit {
                Edit::Prune(s) => {
                    let node = pick(&tree, s);
                    let removed = leaf_names(&tree, node);
                    let result = tree.prune(node).map(|_| ());
                    if result.is_ok() {
                        expected_leaves.retain(|name| !removed.contains(name));
                        if expected_leaves.is_empty() {
                            // Only a unary chain was left, its root stays as a leaf
                            expected_leaves.push(tree.root().name().to_string());
                        }
                    }
                    result
                }
                Edit::Regraft(s, t) => {
                    let (node, target) = (pick(&tree, s), pick(&tree, t));
                    // Moving every leaf empties the rest of the tree down to its root
                    check_leaves = leaf_names(&tree, node).len() < expected_leaves.len();
                    tree.regraft(node, target).map(|_| ())
                }
                Edit::Reroot(s, distance) => tree.reroot(pick(&tree, s), distance).map(|_| ()),
                Edit::Multifurcate(s) => tree.multifurcate(pick(&tree, s)),
                Edit::Ladderize => tree.ladderize(root),
            };

            if result.is_err() {
                prop_assert_eq!(tree.to_newick(), before, "Rejected {:?} changed the tree", edit);
                continue;
            }

            tree.flatten();
            tree.count_tips();
            prop_assert!(tree.is_valid(), "Invalid after {:?}", edit);
            if check_leaves {
                prop_assert_eq!(leaf_names(&tree, tree.root_index()), expected_leaves, "Leaves after {:?}", edit);
            }
            prop_assert_eq!(tree.tip_count(), tree.leaves().len());
            prop_assert_eq!(*tree.nodes().last().unwrap(), tree.root_index());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Write/parse round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn newick_round_trip(growth in steps(40)) {
        let tree = build(&growth);
        let newick = tree.to_newick();
        let parsed = parse_str(&newick);

        prop_assert!(!parsed.has_errors(), "Errors {} for {}", parsed.errors(), newick);
        prop_assert_eq!(parsed.tip_count(), tree.tip_count());
        prop_assert_eq!(parsed.to_newick(), newick);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Ladderize ordering
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ladderize_sorts_children_by_mean_rank(growth in steps(40)) {
        let mut tree = build(&growth);
        let root = tree.root_index();
        tree.ladderize(root).unwrap();

        for node in tree.postorder(root, Traversal::Visible) {
            let means: Vec<f64> = tree[node]
                .children()
                .iter()
                .map(|&c| tree.aggregates(c).unwrap().mean_rank())
                .collect();
            prop_assert!(means.windows(2).all(|w| w[0] <= w[1]), "Unsorted children {:?}", means);
        }
        let aggregates = tree.aggregates(root).unwrap();
        prop_assert_eq!(aggregates.tip_count, tree.tip_count());
    }
}

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use treewick::newick::{NewickParser, parse_str};
use treewick::parser::ByteParser;

const SIZES: &[usize] = &[1_000, 10_000, 100_000];

/// Balanced binary tree on `leaves` leaves with branch lengths and NHX
/// metadata on every node.
fn balanced_newick(leaves: usize) -> String {
    fn build(newick: &mut String, first: usize, count: usize) {
        if count == 1 {
            newick.push_str(&format!("T{first}:0.{first}[&&NHX:S=s{first}]"));
        } else {
            let half = count / 2;
            newick.push('(');
            build(newick, first, half);
            newick.push(',');
            build(newick, first + half, count - half);
            newick.push_str(&format!("):1.5[&&NHX:B={}]", count % 100));
        }
    }

    let mut newick = String::with_capacity(leaves * 32);
    build(&mut newick, 0, leaves);
    newick.push(';');
    newick
}

/// Caterpillar of the given depth.
fn caterpillar_newick(depth: usize) -> String {
    let mut newick = "(".repeat(depth);
    newick.push_str("L0");
    for i in 1..=depth {
        newick.push_str(&format!(",L{i}:1)"));
    }
    newick.push(';');
    newick
}

fn newick_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for &size in SIZES {
        let balanced = balanced_newick(size);
        group.bench_with_input(BenchmarkId::new("balanced", size), &balanced, |b, newick| {
            b.iter(|| {
                let mut parser = NewickParser::new().with_num_leaves(size);
                parser.parse_tree(&mut ByteParser::for_str(black_box(newick)))
            });
        });

        let caterpillar = caterpillar_newick(size);
        group.bench_with_input(BenchmarkId::new("caterpillar", size), &caterpillar, |b, newick| {
            b.iter(|| parse_str(black_box(newick)));
        });
    }
    group.finish();
}

fn tree_editing(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit");
    for &size in SIZES {
        let tree = parse_str(&balanced_newick(size));

        group.bench_with_input(BenchmarkId::new("ladderize", size), &tree, |b, tree| {
            b.iter(|| {
                let mut tree = tree.clone();
                let root = tree.root_index();
                tree.ladderize(root).unwrap();
                tree.flatten().len()
            });
        });

        let leaf = tree.find(&format!("T{}", size / 3)).unwrap();
        group.bench_with_input(BenchmarkId::new("reroot", size), &tree, |b, tree| {
            b.iter(|| {
                let mut tree = tree.clone();
                tree.reroot(leaf, 0.0).unwrap();
                tree.flatten().len()
            });
        });
    }
    group.finish();
}

fn newick_writing(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    for &size in SIZES {
        let tree = parse_str(&balanced_newick(size));
        group.bench_with_input(BenchmarkId::new("balanced", size), &tree, |b, tree| {
            b.iter(|| black_box(tree).to_newick());
        });
    }
    group.finish();
}

criterion_group!(regression, newick_parsing, newick_writing);
criterion_group! {
    name = editing;
    config = Criterion::default().sample_size(20);
    targets = tree_editing
}
criterion_main!(regression, editing);

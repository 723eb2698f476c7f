//! Benchmarks for AlgoViz step generators
//!
//! Measures how fast each generator drains to completion:
//! - Sorting at increasing bar counts
//! - Graph traversals on the sample graph
//! - BST insert chains

use algoviz_steps::{
    sort, traverse, treeops, Algorithm, AlgorithmInput, ArrayState, BinarySearchTree, GraphState,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Drain every sorting generator over random arrays of growing size
fn bench_sorts(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");

    for &len in &[10usize, 100, 500] {
        let values = ArrayState::random(len, 7).values().to_vec();
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("quick", len), &values, |b, v| {
            b.iter(|| sort::quick_sort(black_box(v.clone())).map(Iterator::count))
        });
        group.bench_with_input(BenchmarkId::new("merge", len), &values, |b, v| {
            b.iter(|| sort::merge_sort(black_box(v.clone())).map(Iterator::count))
        });
        group.bench_with_input(BenchmarkId::new("heap", len), &values, |b, v| {
            b.iter(|| sort::heap_sort(black_box(v.clone())).map(Iterator::count))
        });
        if len <= 100 {
            group.bench_with_input(BenchmarkId::new("bubble", len), &values, |b, v| {
                b.iter(|| sort::bubble_sort(black_box(v.clone())).map(Iterator::count))
            });
        }
    }
    group.finish();
}

/// Traversals on the six-node sample graph
fn bench_traversals(c: &mut Criterion) {
    let mut group = c.benchmark_group("traverse");
    let graph = GraphState::sample();

    group.bench_function("bfs", |b| {
        b.iter(|| traverse::bfs(black_box(graph.clone()), 0).map(Iterator::count))
    });
    group.bench_function("dijkstra", |b| {
        b.iter(|| traverse::dijkstra(black_box(graph.clone()), 0).map(Iterator::count))
    });
    group.bench_function("a_star", |b| {
        b.iter(|| traverse::a_star(black_box(graph.clone()), 0, 5).map(Iterator::count))
    });
    group.bench_function("bellman_ford", |b| {
        b.iter(|| traverse::bellman_ford(black_box(graph.clone()), 0).map(Iterator::count))
    });
    group.finish();
}

/// Insert into trees grown from a fixed pseudo-random sequence
fn bench_tree_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_insert");

    for &size in &[7usize, 63, 255] {
        let values: Vec<i64> = (0..size as i64).map(|i| (i * 37) % 1009).collect();
        let tree = BinarySearchTree::from_values(&values);
        group.bench_with_input(BenchmarkId::from_parameter(size), &tree, |b, t| {
            b.iter(|| treeops::insert(black_box(t.clone()), 500).count())
        });
    }
    group.finish();
}

/// Every catalog entry with default inputs
fn bench_catalog(c: &mut Criterion) {
    let input = AlgorithmInput::default();
    c.bench_function("catalog_all", |b| {
        b.iter(|| {
            Algorithm::all()
                .filter_map(|algorithm| algorithm.generator(black_box(&input)).ok())
                .map(Iterator::count)
                .sum::<usize>()
        })
    });
}

criterion_group!(
    benches,
    bench_sorts,
    bench_traversals,
    bench_tree_insert,
    bench_catalog,
);

criterion_main!(benches);

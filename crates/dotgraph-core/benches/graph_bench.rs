//! # Graph Benchmarks
//!
//! Performance benchmarks for dotgraph-core building, serialization and
//! exploration.
//!
//! Run with: `cargo bench -p dotgraph-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dotgraph_core::{Explorer, Graph, Heap, NodeSpec, ObjectId, Relation, Value};
use std::hint::black_box;

/// Create a graph with N number nodes chained by one path.
fn create_linear_graph(size: usize) -> Graph {
    let mut graph = Graph::new();
    let _ = graph.add_path((0..size).map(|i| Value::Number(i as f64)));
    graph
}

/// Create a graph with N nodes spread over ten ranks, hub-and-spoke edges.
fn create_ranked_star(size: usize) -> Graph {
    let mut graph = Graph::new();
    graph.node("hub", NodeSpec::new().rank(0));
    for i in 1..size {
        let spoke = Value::Number(i as f64);
        graph.node(spoke.clone(), NodeSpec::new().rank(i % 10));
        let _ = graph.add_path([Value::from("hub"), spoke]);
    }
    graph
}

/// Heap with N objects linked in a single `.next` chain.
fn create_chain_heap(size: usize) -> (Heap, ObjectId) {
    let mut heap = Heap::new();
    let head = heap.object();
    let mut current = head;
    for _ in 1..size {
        let next = heap.object();
        heap.set(current, "next", Value::Object(next));
        current = next;
    }
    (heap, head)
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_add_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_path");

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| black_box(create_linear_graph(size)));
        });
    }

    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");

    for size in [100, 1000, 10000].iter() {
        let linear = create_linear_graph(*size);
        group.bench_with_input(BenchmarkId::new("linear", size), &linear, |b, graph| {
            b.iter(|| black_box(graph.serialize()));
        });

        let mut star = create_ranked_star(*size);
        star.node_if(
            |heap, v| heap.type_of(v) == "number",
            NodeSpec::new().attr("shape", "circle"),
        );
        group.bench_with_input(BenchmarkId::new("ranked_star", size), &star, |b, graph| {
            b.iter(|| black_box(graph.serialize()));
        });
    }

    group.finish();
}

fn bench_explore(c: &mut Criterion) {
    let mut group = c.benchmark_group("explore");

    for size in [100, 1000, 10000].iter() {
        let (heap, head) = create_chain_heap(*size);
        let mut relations = Relation::defaults();
        relations.push(Relation::own_property("next"));
        let explorer = Explorer::new(relations);
        group.bench_with_input(BenchmarkId::from_parameter(size), &heap, |b, heap| {
            b.iter(|| black_box(explorer.explore(heap, &Value::Object(head))));
        });
    }

    group.finish();
}

fn bench_add_exploration(c: &mut Criterion) {
    let (heap, head) = create_chain_heap(1000);
    let mut relations = Relation::defaults();
    relations.push(Relation::own_property("next"));
    let exploration = Explorer::new(relations).explore(&heap, &Value::Object(head));

    c.bench_function("add_exploration_1000", |b| {
        b.iter(|| {
            let mut graph = Graph::with_heap(heap.clone());
            graph.add_exploration(&exploration);
            black_box(graph.serialize())
        });
    });
}

criterion_group!(
    benches,
    bench_add_path,
    bench_serialize,
    bench_explore,
    bench_add_exploration
);
criterion_main!(benches);

//! # Property-Based Tests
//!
//! Registry, rank, serializer and explorer invariants checked with proptest.

use dotgraph_core::{DotGraphError, Explorer, Graph, NodeSpec, Relation, Value};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeSet;

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Distinct values get distinct ids; re-adding any of them fails.
    #[test]
    fn distinct_values_get_distinct_ids(values in vec(0i32..1000, 1..50)) {
        let mut graph = Graph::new();
        let unique: BTreeSet<i32> = values.iter().copied().collect();

        let mut ids = BTreeSet::new();
        for v in &unique {
            let node = graph.add_node(NodeSpec::representing(*v)).expect("fresh value");
            ids.insert(node.id().to_string());
        }
        prop_assert_eq!(ids.len(), unique.len());

        for v in &unique {
            let again = graph.add_node(NodeSpec::representing(*v)).map(|n| n.id().to_string());
            prop_assert!(matches!(again, Err(DotGraphError::DuplicateNode(_))));
        }
        prop_assert_eq!(graph.node_count(), unique.len());
    }

    /// Objects are distinct identities even when structurally equal.
    #[test]
    fn objects_never_collide(count in 1usize..40) {
        let mut graph = Graph::new();
        for _ in 0..count {
            let id = graph.heap_mut().object();
            graph.add_node(NodeSpec::representing(id)).expect("fresh object");
        }
        prop_assert_eq!(graph.node_count(), count);
    }

    /// rank(i) leaves more than i ranks and never shrinks or duplicates.
    #[test]
    fn rank_is_idempotent(indices in vec(0usize..30, 1..20)) {
        let mut graph = Graph::new();
        let mut max = 0;
        for i in &indices {
            prop_assert_eq!(graph.rank(*i).index(), *i);
            max = max.max(*i);
            prop_assert_eq!(graph.ranks().len(), max + 1);
        }
        for (position, rank) in graph.ranks().iter().enumerate() {
            prop_assert_eq!(rank.index(), position);
        }
    }

    /// Serializing twice yields identical text, templates included.
    #[test]
    fn serialize_is_deterministic(
        path in vec(0i32..20, 0..30),
        ranked in vec((0i32..20, 0usize..5), 0..10)
    ) {
        let mut graph = Graph::new();
        graph.node_if(|_, v| *v == Value::from(0), NodeSpec::new().attr("color", "red"));
        graph.edge_if(|_, a, b| a == b, [("style", "dotted")].into_iter().collect());
        for (value, rank) in &ranked {
            graph.node(*value, NodeSpec::new().rank(*rank));
        }
        let _ = graph.add_path(path.iter().copied());

        let first = graph.serialize();
        let second = graph.serialize();
        prop_assert_eq!(first, second);
    }

    /// A path of n values adds n-1 edges.
    #[test]
    fn path_adds_consecutive_edges(path in vec(0i32..50, 0..40)) {
        let mut graph = Graph::new();
        let added = graph.add_path(path.iter().copied()).len();
        prop_assert_eq!(added, path.len().saturating_sub(1));
        prop_assert_eq!(graph.edge_count(), added);
    }

    /// Exploration yields exactly one entry per reachable identity, even
    /// when the links form cycles.
    #[test]
    fn exploration_deduplicates(links in vec((0usize..12, 0usize..12), 0..40)) {
        let mut heap = dotgraph_core::Heap::new();
        let objects: Vec<_> = (0..12).map(|_| heap.object_with_prototype(None)).collect();
        for (from, to) in &links {
            heap.set(objects[*from], &format!("k{}", to), Value::Object(objects[*to]));
        }
        let relations = (0..12).map(|k| Relation::own_property(&format!("k{}", k))).collect();
        let result = Explorer::new(relations).explore(&heap, &Value::Object(objects[0]));

        let identities: BTreeSet<_> = result.nodes().map(|(_, v)| v.identity()).collect();
        prop_assert_eq!(identities.len(), result.node_count());
        prop_assert!(result.node_count() <= objects.len());
    }
}

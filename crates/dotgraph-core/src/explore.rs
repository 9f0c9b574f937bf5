//! # Explorer
//!
//! Identity-keyed crawl of a value graph.
//!
//! The explorer follows a list of named accessor relations from a root
//! value. Every value reached gets one id (`n0`, `n1`, ... in discovery
//! order); a value that already has an id is not expanded again, so cycles
//! and shared substructure terminate. A relation that does not apply to a
//! value fails for that value only: no edge is recorded and the walk goes
//! on with the next relation.
//!
//! The walk is depth-first with an explicit stack, so deep chains do not
//! exhaust the call stack.

use crate::types::DotGraphError;
use crate::value::{Heap, Identity, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Name of the prototype relation.
pub const PROTOTYPE_OF: &str = "[[Prototype]]";

/// Fallible accessor of a relation.
pub type Accessor = Box<dyn Fn(&Heap, &Value) -> Result<Value, DotGraphError>>;

// =============================================================================
// RELATIONS
// =============================================================================

/// A named partial function from value to value.
pub struct Relation {
    name: String,
    access: Accessor,
}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation").field("name", &self.name).finish()
    }
}

impl Relation {
    pub fn new<F>(name: impl Into<String>, access: F) -> Self
    where
        F: Fn(&Heap, &Value) -> Result<Value, DotGraphError> + 'static,
    {
        Self {
            name: name.into(),
            access: Box::new(access),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate the relation on `value`.
    pub fn access(&self, heap: &Heap, value: &Value) -> Result<Value, DotGraphError> {
        (self.access)(heap, value)
    }

    /// The prototype of a value. Strings, numbers and booleans reach the
    /// prototype of their wrapper; fails for `null`, `undefined`, symbols and
    /// objects without a prototype.
    #[must_use]
    pub fn prototype_of() -> Self {
        Self::new(PROTOTYPE_OF, |heap, value| {
            heap.prototype_of_value(value)
                .map(Value::Object)
                .ok_or_else(|| DotGraphError::accessor(PROTOTYPE_OF, "no prototype"))
        })
    }

    /// The own property `key`, named `.key`.
    #[must_use]
    pub fn own_property(key: &str) -> Self {
        let name = format!(".{}", key);
        let key = key.to_string();
        let relation = name.clone();
        Self::new(name, move |heap, value| {
            value
                .as_object()
                .and_then(|id| heap.get_own(id, &key))
                .cloned()
                .ok_or_else(|| DotGraphError::accessor(&relation, "no own property"))
        })
    }

    /// `valueOf()` for objects that carry their own `valueOf` method.
    #[must_use]
    pub fn value_of() -> Self {
        const NAME: &str = ".valueOf()";
        Self::new(NAME, |heap, value| {
            let method = value.as_object().and_then(|id| heap.get_own(id, "valueOf"));
            match method {
                Some(m) if heap.is_function(m) => Ok(heap.value_of(value)),
                Some(_) => Err(DotGraphError::accessor(NAME, "valueOf is not a function")),
                None => Err(DotGraphError::accessor(NAME, "no own valueOf")),
            }
        })
    }

    /// The built-in relation set: prototype, `.prototype`, `.constructor`,
    /// `.valueOf()` and `.name`.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::prototype_of(),
            Self::own_property("prototype"),
            Self::own_property("constructor"),
            Self::value_of(),
            Self::own_property("name"),
        ]
    }
}

// =============================================================================
// EXPLORATION
// =============================================================================

/// Id of an explored value, rendered as `n<index>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExploreId(pub usize);

impl fmt::Display for ExploreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Edges discovered through one relation.
#[derive(Debug, Clone)]
pub struct RelationEdges {
    name: String,
    edges: BTreeMap<ExploreId, ExploreId>,
}

impl RelationEdges {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source id → target id.
    pub fn edges(&self) -> impl Iterator<Item = (&ExploreId, &ExploreId)> {
        self.edges.iter()
    }

    /// Target reached from `source`, if the relation applied to it.
    pub fn target(&self, source: ExploreId) -> Option<ExploreId> {
        self.edges.get(&source).copied()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Result of an exploration: values by id and edges by relation.
#[derive(Debug, Clone, Default)]
pub struct Exploration {
    nodes: Vec<Value>,
    index: BTreeMap<Identity, ExploreId>,
    relations: Vec<RelationEdges>,
}

impl Exploration {
    fn register(&mut self, value: Value) -> ExploreId {
        let id = ExploreId(self.nodes.len());
        self.index.insert(value.identity(), id);
        self.nodes.push(value);
        id
    }

    /// Explored values in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (ExploreId, &Value)> {
        self.nodes.iter().enumerate().map(|(i, v)| (ExploreId(i), v))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn value(&self, id: ExploreId) -> Option<&Value> {
        self.nodes.get(id.0)
    }

    /// Id assigned to a value, by identity.
    pub fn id_of(&self, value: &Value) -> Option<ExploreId> {
        self.index.get(&value.identity()).copied()
    }

    /// Per-relation edges, in relation order.
    pub fn relations(&self) -> &[RelationEdges] {
        &self.relations
    }

    /// Edges of the relation called `name`.
    pub fn edges(&self, name: &str) -> Option<&RelationEdges> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Total number of recorded edges.
    pub fn edge_count(&self) -> usize {
        self.relations.iter().map(RelationEdges::len).sum()
    }
}

// =============================================================================
// EXPLORER
// =============================================================================

struct Frame {
    id: ExploreId,
    next_relation: usize,
}

/// Walks values along a fixed relation list.
#[derive(Debug)]
pub struct Explorer {
    relations: Vec<Relation>,
}

impl Default for Explorer {
    fn default() -> Self {
        Self::new(Relation::defaults())
    }
}

impl Explorer {
    #[must_use]
    pub fn new(relations: Vec<Relation>) -> Self {
        Self { relations }
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Explore everything reachable from `root`.
    #[must_use]
    pub fn explore(&self, heap: &Heap, root: &Value) -> Exploration {
        let mut result = Exploration {
            relations: self
                .relations
                .iter()
                .map(|r| RelationEdges {
                    name: r.name.clone(),
                    edges: BTreeMap::new(),
                })
                .collect(),
            ..Exploration::default()
        };

        let root_id = result.register(root.clone());
        let mut stack = vec![Frame {
            id: root_id,
            next_relation: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let r = frame.next_relation;
            let Some(relation) = self.relations.get(r) else {
                stack.pop();
                continue;
            };
            frame.next_relation += 1;
            let this = frame.id;

            let Some(value) = result.value(this).cloned() else {
                continue;
            };
            match relation.access(heap, &value) {
                Ok(other) => {
                    let other_id = match result.id_of(&other) {
                        Some(id) => id,
                        None => {
                            let id = result.register(other);
                            stack.push(Frame {
                                id,
                                next_relation: 0,
                            });
                            id
                        }
                    };
                    if let Some(edges) = result.relations.get_mut(r) {
                        edges.edges.insert(this, other_id);
                    }
                }
                Err(e) => {
                    tracing::trace!(node = %this, error = %e, "relation skipped");
                }
            }
        }

        tracing::debug!(
            nodes = result.node_count(),
            edges = result.edge_count(),
            "exploration finished"
        );
        result
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_reaches_object_prototype() {
        let mut heap = Heap::new();
        let root = Value::Object(heap.object());
        let result = Explorer::default().explore(&heap, &root);

        assert_eq!(result.node_count(), 2);
        assert_eq!(result.value(ExploreId(0)), Some(&root));
        assert_eq!(
            result.value(ExploreId(1)),
            Some(&Value::Object(heap.intrinsics().object_prototype))
        );
        assert_eq!(result.edge_count(), 1);
        let proto = result.edges(PROTOTYPE_OF).expect("relation");
        assert_eq!(proto.target(ExploreId(0)), Some(ExploreId(1)));
    }

    #[test]
    fn self_reference_terminates() {
        let mut heap = Heap::new();
        let id = heap.object_with_prototype(None);
        heap.set(id, "name", Value::Object(id));
        let root = Value::Object(id);

        let result = Explorer::default().explore(&heap, &root);
        assert_eq!(result.node_count(), 1);
        let names = result.edges(".name").expect("relation");
        assert_eq!(names.target(ExploreId(0)), Some(ExploreId(0)));
    }

    #[test]
    fn class_cycle_is_explored_once() {
        let mut heap = Heap::new();
        let (ctor, proto) = heap.define_class("Point");
        let result = Explorer::default().explore(&heap, &Value::Object(ctor));

        // ctor, Function.prototype, Object.prototype, Point.prototype, "Point",
        // then String.prototype, String, "String" and "" through the name.
        assert_eq!(result.node_count(), 9);
        let ctor_id = result.id_of(&Value::Object(ctor)).expect("ctor");
        let proto_id = result.id_of(&Value::Object(proto)).expect("proto");
        assert_eq!(
            result.edges(".prototype").and_then(|r| r.target(ctor_id)),
            Some(proto_id)
        );
        assert_eq!(
            result.edges(".constructor").and_then(|r| r.target(proto_id)),
            Some(ctor_id)
        );
        assert_eq!(
            result.value(result.edges(".name").and_then(|r| r.target(ctor_id)).expect("name")),
            Some(&Value::from("Point"))
        );
    }

    #[test]
    fn ids_follow_depth_first_discovery() {
        let mut heap = Heap::new();
        let (ctor, _) = heap.define_class("A");
        let result = Explorer::default().explore(&heap, &Value::Object(ctor));
        let order: Vec<String> = result.nodes().map(|(id, _)| id.to_string()).collect();
        assert_eq!(
            order,
            vec!["n0", "n1", "n2", "n3", "n4", "n5", "n6", "n7", "n8"]
        );
        // The prototype chain of the constructor is discovered first.
        assert_eq!(
            result.value(ExploreId(1)),
            Some(&Value::Object(heap.intrinsics().function_prototype))
        );
        assert_eq!(
            result.value(ExploreId(2)),
            Some(&Value::Object(heap.intrinsics().object_prototype))
        );
        assert_eq!(result.value(ExploreId(4)), Some(&Value::from("A")));
        assert_eq!(
            result.value(ExploreId(5)),
            Some(&Value::Object(heap.intrinsics().string_prototype))
        );
        assert_eq!(result.value(ExploreId(8)), Some(&Value::from("")));
    }

    #[test]
    fn boxed_value_of_is_followed() {
        let mut heap = Heap::new();
        let boxed = Value::Object(heap.boxed(Value::from(7)));
        let result = Explorer::default().explore(&heap, &boxed);
        let number_proto = result
            .id_of(&Value::Object(heap.intrinsics().number_prototype))
            .expect("reached");
        // Number.prototype owns valueOf and wraps 0.
        let zero = result
            .edges(".valueOf()")
            .and_then(|r| r.target(number_proto))
            .expect("valueOf edge");
        assert_eq!(result.value(zero), Some(&Value::Number(0.0)));
        // The boxed value itself has no own valueOf.
        let root = result.id_of(&boxed).expect("root");
        assert!(result.edges(".valueOf()").and_then(|r| r.target(root)).is_none());
    }

    #[test]
    fn nullish_and_symbols_have_no_relations() {
        let mut heap = Heap::new();
        let symbol = heap.symbol("tag");
        for root in [Value::Null, Value::Undefined, symbol] {
            let result = Explorer::default().explore(&heap, &root);
            assert_eq!(result.node_count(), 1);
            assert_eq!(result.edge_count(), 0);
            assert_eq!(result.relations().len(), 5);
        }
    }

    #[test]
    fn string_reaches_string_prototype() {
        let heap = Heap::new();
        let string_proto = Value::Object(heap.intrinsics().string_prototype);
        let result = Explorer::new(vec![Relation::prototype_of()])
            .explore(&heap, &Value::from("leaf"));

        assert_eq!(result.value(ExploreId(1)), Some(&string_proto));
        assert_eq!(
            result.value(ExploreId(2)),
            Some(&Value::Object(heap.intrinsics().object_prototype))
        );
        assert_eq!(result.node_count(), 3);
    }

    #[test]
    fn number_and_bool_reach_their_prototypes() {
        let heap = Heap::new();
        let relation = Relation::prototype_of();
        assert_eq!(
            relation.access(&heap, &Value::Number(1.5)).ok(),
            Some(Value::Object(heap.intrinsics().number_prototype))
        );
        assert_eq!(
            relation.access(&heap, &Value::Bool(true)).ok(),
            Some(Value::Object(heap.intrinsics().boolean_prototype))
        );
        assert!(relation.access(&heap, &Value::Null).is_err());
    }

    #[test]
    fn value_of_requires_a_method() {
        let mut heap = Heap::new();
        let root = heap.load_json(&serde_json::json!({"valueOf": 1}));
        let id = root.as_object().expect("object");
        assert!(Relation::value_of().access(&heap, &root).is_err());

        let result = Explorer::default().explore(&heap, &root);
        let root_id = result.id_of(&root).expect("root");
        assert!(result.edges(".valueOf()").and_then(|r| r.target(root_id)).is_none());

        let method = heap.method("valueOf");
        heap.set(id, "valueOf", Value::Object(method));
        assert_eq!(Relation::value_of().access(&heap, &root).ok(), Some(root));
    }

    #[test]
    fn custom_relations() {
        let mut heap = Heap::new();
        let json = serde_json::json!({"next": {"next": {"value": 3}}});
        let root = heap.load_json(&json);
        let explorer = Explorer::new(vec![Relation::own_property("next")]);
        let result = explorer.explore(&heap, &root);
        assert_eq!(result.node_count(), 3);
        assert_eq!(result.edges(".next").map(RelationEdges::len), Some(2));
    }

    #[test]
    fn failing_relation_does_not_stop_others() {
        let mut heap = Heap::new();
        let root = Value::Object(heap.object());
        let explorer = Explorer::new(vec![
            Relation::new("always fails", |_, _| {
                Err(DotGraphError::accessor("always fails", "by test"))
            }),
            Relation::prototype_of(),
        ]);
        let result = explorer.explore(&heap, &root);
        assert_eq!(result.node_count(), 2);
        assert_eq!(result.edges("always fails").map(RelationEdges::len), Some(0));
    }

    #[test]
    fn long_chain_does_not_recurse() {
        let mut heap = Heap::new();
        let mut current = heap.object_with_prototype(None);
        for _ in 0..100_000 {
            current = heap.object_with_prototype(Some(current));
        }
        let result = Explorer::new(vec![Relation::prototype_of()])
            .explore(&heap, &Value::Object(current));
        assert_eq!(result.node_count(), 100_001);
    }
}

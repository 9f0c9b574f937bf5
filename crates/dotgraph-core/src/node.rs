//! # Nodes
//!
//! A `Node` is an identified vertex: id, optional rank, the value it stands
//! for, and its attributes. A `NodeSpec` is the configuration merged into a
//! node by `Node::apply_spec`, both at creation and by node templates.

use crate::attributes::Attributes;
use crate::label::autolabel;
use crate::value::{Heap, Value};
use serde_json::Value as JsonValue;
use std::fmt;

/// Style value that hides an element.
pub const INVISIBLE: &str = "invis";

// =============================================================================
// NODE SPEC
// =============================================================================

/// Configuration for a node.
///
/// `id`, `rank` and `represents` are first-class fields, `invis` is a
/// shorthand for `style="invis"`, and every other entry is an attribute.
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    pub id: Option<String>,
    pub rank: Option<usize>,
    pub represents: Option<Value>,
    pub invis: bool,
    pub attributes: Attributes,
}

impl NodeSpec {
    /// Create an empty spec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spec for a node representing `value`.
    #[must_use]
    pub fn representing(value: impl Into<Value>) -> Self {
        Self::new().represents(value)
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn rank(mut self, rank: usize) -> Self {
        self.rank = Some(rank);
        self
    }

    #[must_use]
    pub fn represents(mut self, value: impl Into<Value>) -> Self {
        self.represents = Some(value.into());
        self
    }

    #[must_use]
    pub fn invis(mut self) -> Self {
        self.invis = true;
        self
    }

    /// Add an attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.attributes.set(key, value);
        self
    }

    /// Set an explicit label.
    #[must_use]
    pub fn label(self, label: impl Into<JsonValue>) -> Self {
        self.attr("label", label)
    }
}

// =============================================================================
// NODE
// =============================================================================

/// A graph vertex.
#[derive(Debug, Clone)]
pub struct Node {
    id: String,
    rank: Option<usize>,
    represents: Option<Value>,
    attributes: Attributes,
}

impl Node {
    /// Build a node from a spec.
    #[must_use]
    pub fn from_spec(spec: &NodeSpec, heap: &Heap) -> Self {
        let mut node = Self {
            id: String::new(),
            rank: None,
            represents: None,
            attributes: Attributes::new(),
        };
        node.apply_spec(spec, heap);
        node
    }

    /// Merge `spec` into this node.
    ///
    /// The represented value is fixed once set; a spec cannot re-point a
    /// node at another value. When no label is set afterwards, one is
    /// derived from the represented value.
    pub fn apply_spec(&mut self, spec: &NodeSpec, heap: &Heap) {
        if let Some(id) = &spec.id {
            self.id.clone_from(id);
        }
        if let Some(rank) = spec.rank {
            self.rank = Some(rank);
        }
        if self.represents.is_none() {
            self.represents.clone_from(&spec.represents);
        }
        self.attributes.merge(&spec.attributes);
        if spec.invis {
            self.attributes.set("style", INVISIBLE);
        }
        if !self.attributes.is_set("label") {
            let label = autolabel(heap, self.represents.as_ref().unwrap_or(&Value::Undefined));
            self.attributes.set("label", label);
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rank(&self) -> Option<usize> {
        self.rank
    }

    pub fn represents(&self) -> Option<&Value> {
        self.represents.as_ref()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// DOT definition: `id[attr=val,...];`
    #[must_use]
    pub fn def(&self) -> String {
        format!("{}[{}];", self.id, self.attributes.render())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_derived_when_missing() {
        let heap = Heap::new();
        let node = Node::from_spec(&NodeSpec::representing(42).id("n0"), &heap);
        assert_eq!(node.def(), "n0[label=\"number\\n42\"];");
    }

    #[test]
    fn explicit_label_wins() {
        let heap = Heap::new();
        let node = Node::from_spec(
            &NodeSpec::representing(42).id("n0").label("answer"),
            &heap,
        );
        assert_eq!(node.def(), "n0[label=\"answer\"];");
    }

    #[test]
    fn invis_sets_style() {
        let heap = Heap::new();
        let spec = NodeSpec::new()
            .id("_dummy0")
            .label(0)
            .attr("shape", "box")
            .invis();
        let node = Node::from_spec(&spec, &heap);
        assert_eq!(
            node.def(),
            "_dummy0[label=\"0\",shape=\"box\",style=\"invis\"];"
        );
    }

    #[test]
    fn apply_spec_keeps_represented_value() {
        let heap = Heap::new();
        let mut node = Node::from_spec(&NodeSpec::representing("a").id("s0"), &heap);
        node.apply_spec(&NodeSpec::representing("b").rank(2), &heap);
        assert_eq!(node.represents(), Some(&Value::from("a")));
        assert_eq!(node.rank(), Some(2));
    }

    #[test]
    fn display_is_id() {
        let heap = Heap::new();
        let node = Node::from_spec(&NodeSpec::representing(Value::Null).id("o3"), &heap);
        assert_eq!(node.to_string(), "o3");
    }
}

//! # Ranks
//!
//! A rank pins a set of nodes to one layer of the layout. Each rank owns a
//! hidden anchor node; the serializer chains the anchors with an invisible
//! edge so that the layers come out in index order.

use crate::node::{Node, NodeSpec};
use crate::value::Heap;

const INDENT: &str = "    ";

/// A layer of the layout.
#[derive(Debug, Clone)]
pub struct Rank {
    index: usize,
    anchor: Node,
    nodes: Vec<Node>,
}

impl Rank {
    /// Create rank `index` with its anchor node.
    #[must_use]
    pub fn new(index: usize, heap: &Heap) -> Self {
        let spec = NodeSpec::new()
            .id(format!("_dummy{}", index))
            .rank(index)
            .label(index)
            .attr("shape", "box")
            .invis();
        Self {
            index,
            anchor: Node::from_spec(&spec, heap),
            nodes: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The hidden anchor node.
    pub fn anchor(&self) -> &Node {
        &self.anchor
    }

    /// Member nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Append a member node.
    pub fn add_node(&mut self, node: Node) -> &Node {
        self.nodes.push(node);
        &self.nodes[self.nodes.len() - 1]
    }

    /// The `rank=` keyword for this rank among `count` ranks.
    #[must_use]
    pub fn keyword(&self, count: usize) -> &'static str {
        if self.index == 0 {
            "min"
        } else if self.index + 1 == count {
            "max"
        } else {
            "same"
        }
    }

    /// DOT block for this rank among `count` ranks.
    #[must_use]
    pub fn render(&self, count: usize) -> String {
        let mut out = format!(
            "{}{{ rank={}; {}\n",
            INDENT,
            self.keyword(count),
            self.anchor.def()
        );
        for node in &self.nodes {
            out.push_str(&format!("{}{}{}\n", INDENT, INDENT, node.def()));
        }
        out.push_str(&format!("{}}}\n", INDENT));
        out
    }
}

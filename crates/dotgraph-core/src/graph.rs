//! # Graph
//!
//! The graph model and its DOT serializer.
//!
//! A `Graph` owns the heap its values live in, the node registry (one node
//! per value identity, kept in creation order), the ranks, the edges, the
//! node/edge templates and the global attributes.
//!
//! Templates are rules applied at serialization time. `serialize` works on
//! copies of the stored nodes and edges, so rendering never changes the
//! graph and two renders of the same graph are byte-identical.

use crate::attributes::{Attributes, format_attribute};
use crate::explore::Exploration;
use crate::node::{INVISIBLE, Node, NodeSpec};
use crate::options::GraphAttributes;
use crate::rank::Rank;
use crate::types::{DotGraphError, EdgeIndex, NodeIndex};
use crate::value::{Heap, Identity, Value};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

const INDENT: &str = "    ";

/// Font size of the default node style.
pub const DEFAULT_NODE_FONTSIZE: u32 = 12;

/// Edge colors used for explored relations, cycled in relation order.
pub const RELATION_PALETTE: [&str; 5] = ["black", "green", "blue", "red", "pink"];

/// Relation left out when an exploration is drawn.
const CONSTRUCTOR_RELATION: &str = ".constructor";

/// Node template predicate over the represented value.
pub type NodePredicate = Box<dyn Fn(&Heap, &Value) -> bool>;

/// Edge template predicate over the values of both endpoints.
pub type EdgePredicate = Box<dyn Fn(&Heap, &Value, &Value) -> bool>;

/// Listener notified with the represented value of every new node.
pub type NodeListener = Box<dyn FnMut(&Value)>;

struct NodeTemplate {
    predicate: NodePredicate,
    patch: NodeSpec,
}

struct EdgeTemplate {
    predicate: EdgePredicate,
    patch: Attributes,
}

// =============================================================================
// EDGE
// =============================================================================

/// A directed edge between two registered nodes.
#[derive(Debug, Clone)]
pub struct Edge {
    from: NodeIndex,
    to: NodeIndex,
    attributes: Attributes,
}

impl Edge {
    pub fn from(&self) -> NodeIndex {
        self.from
    }

    pub fn to(&self) -> NodeIndex {
        self.to
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

// =============================================================================
// GRAPH
// =============================================================================

/// A ranked directed graph.
pub struct Graph {
    heap: Heap,
    nodes: Vec<Node>,
    registry: BTreeMap<Identity, NodeIndex>,
    ranks: Vec<Rank>,
    edges: Vec<Edge>,
    node_templates: Vec<NodeTemplate>,
    edge_templates: Vec<EdgeTemplate>,
    attributes: GraphAttributes,
    listeners: Vec<NodeListener>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes)
            .field("ranks", &self.ranks.len())
            .field("edges", &self.edges)
            .field("node_templates", &self.node_templates.len())
            .field("edge_templates", &self.edge_templates.len())
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl Graph {
    /// Create an empty graph with a fresh heap and default attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_heap(Heap::new())
    }

    /// Create an empty graph over an existing heap.
    #[must_use]
    pub fn with_heap(heap: Heap) -> Self {
        Self {
            heap,
            nodes: Vec::new(),
            registry: BTreeMap::new(),
            ranks: Vec::new(),
            edges: Vec::new(),
            node_templates: Vec::new(),
            edge_templates: Vec::new(),
            attributes: GraphAttributes::default(),
            listeners: Vec::new(),
        }
    }

    /// Create a graph configured by `(name, value)` options.
    ///
    /// Fails with `InvalidGraphOption` on the first unknown name.
    pub fn from_options<'a, I>(options: I) -> Result<Self, DotGraphError>
    where
        I: IntoIterator<Item = (&'a str, JsonValue)>,
    {
        Ok(Self::new().with_attributes(GraphAttributes::from_options(options)?))
    }

    /// Create a labelled graph.
    #[must_use]
    pub fn digraph(label: impl Into<String>) -> Self {
        let mut graph = Self::new();
        graph.attributes.set_label(label);
        graph
    }

    /// Replace the global attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: GraphAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Mutable heap access, for allocating values to graph.
    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn attributes(&self) -> &GraphAttributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut GraphAttributes {
        &mut self.attributes
    }

    // -------------------------------------------------------------------------
    // Ranks
    // -------------------------------------------------------------------------

    /// Rank `i`, creating it and every missing rank before it.
    pub fn rank(&mut self, i: usize) -> &Rank {
        while self.ranks.len() <= i {
            let rank = Rank::new(self.ranks.len(), &self.heap);
            tracing::debug!(index = rank.index(), "created rank");
            self.ranks.push(rank);
        }
        &self.ranks[i]
    }

    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    // -------------------------------------------------------------------------
    // Templates & listeners
    // -------------------------------------------------------------------------

    /// Register a node template.
    pub fn node_if<P>(&mut self, predicate: P, patch: NodeSpec) -> &mut Self
    where
        P: Fn(&Heap, &Value) -> bool + 'static,
    {
        self.node_templates.push(NodeTemplate {
            predicate: Box::new(predicate),
            patch,
        });
        self
    }

    /// Register an edge template.
    pub fn edge_if<P>(&mut self, predicate: P, patch: Attributes) -> &mut Self
    where
        P: Fn(&Heap, &Value, &Value) -> bool + 'static,
    {
        self.edge_templates.push(EdgeTemplate {
            predicate: Box::new(predicate),
            patch,
        });
        self
    }

    /// Register a listener for newly created nodes.
    pub fn on_node<L>(&mut self, listener: L) -> &mut Self
    where
        L: FnMut(&Value) + 'static,
    {
        self.listeners.push(Box::new(listener));
        self
    }

    // -------------------------------------------------------------------------
    // Nodes
    // -------------------------------------------------------------------------

    /// Register a node for `spec.represents` (`undefined` when absent).
    ///
    /// Fails with `DuplicateNode` when that identity already has a node;
    /// the registry is left unchanged.
    pub fn add_node(&mut self, spec: NodeSpec) -> Result<&Node, DotGraphError> {
        let repr = spec.represents.clone().unwrap_or(Value::Undefined);
        if self.registry.contains_key(&repr.identity()) {
            return Err(DotGraphError::DuplicateNode(self.heap.describe(&repr)));
        }
        let index = self.insert_node(repr, spec);
        Ok(&self.nodes[index.0])
    }

    /// Upsert: apply `spec` to the node for `repr`, creating it if needed.
    pub fn node(&mut self, repr: impl Into<Value>, spec: NodeSpec) -> &Node {
        let repr = repr.into();
        let index = match self.registry.get(&repr.identity()) {
            Some(&index) => {
                if let Some(node) = self.nodes.get_mut(index.0) {
                    node.apply_spec(&spec, &self.heap);
                }
                index
            }
            None => self.insert_node(repr, spec),
        };
        &self.nodes[index.0]
    }

    fn ensure_node(&mut self, repr: Value) -> NodeIndex {
        match self.registry.get(&repr.identity()) {
            Some(&index) => index,
            None => self.insert_node(repr, NodeSpec::new()),
        }
    }

    /// Caller guarantees `repr` is not registered yet.
    fn insert_node(&mut self, repr: Value, spec: NodeSpec) -> NodeIndex {
        let tag = match repr {
            Value::Symbol(_) => "x",
            _ => self.heap.type_of(&repr).get(..1).unwrap_or("x"),
        };
        let index = NodeIndex(self.nodes.len());
        let spec = NodeSpec {
            id: Some(format!("{}{}", tag, index.0)),
            represents: Some(repr.clone()),
            ..spec
        };
        let node = Node::from_spec(&spec, &self.heap);
        tracing::debug!(id = node.id(), "registered node");

        self.nodes.push(node);
        self.registry.insert(repr.identity(), index);
        for listener in &mut self.listeners {
            listener(&repr);
        }
        index
    }

    /// The node registered for `repr`.
    #[must_use]
    pub fn get_node(&self, repr: &Value) -> Option<&Node> {
        let index = self.registry.get(&repr.identity())?;
        self.nodes.get(index.0)
    }

    /// Handle of the node registered for `repr`.
    #[must_use]
    pub fn node_index(&self, repr: &Value) -> Option<NodeIndex> {
        self.registry.get(&repr.identity()).copied()
    }

    #[must_use]
    pub fn node_at(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.0)
    }

    /// Registered nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // -------------------------------------------------------------------------
    // Edges
    // -------------------------------------------------------------------------

    /// Add an edge between every consecutive pair of `values`, creating
    /// nodes on demand.
    ///
    /// The returned handle merges attributes into exactly the edges this
    /// call created.
    pub fn add_path<I, V>(&mut self, values: I) -> PathEdges<'_>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let start = self.edges.len();
        let mut previous: Option<NodeIndex> = None;
        for value in values {
            let current = self.ensure_node(value.into());
            if let Some(from) = previous {
                self.edges.push(Edge {
                    from,
                    to: current,
                    attributes: Attributes::new(),
                });
            }
            previous = Some(current);
        }
        let end = self.edges.len();
        PathEdges {
            graph: self,
            range: start..end,
        }
    }

    #[must_use]
    pub fn edge(&self, index: EdgeIndex) -> Option<&Edge> {
        self.edges.get(index.0)
    }

    /// Edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // -------------------------------------------------------------------------
    // Explorations
    // -------------------------------------------------------------------------

    /// Load an exploration: one node per explored value, one edge per
    /// relation entry.
    ///
    /// `.constructor` edges are left out; they only mirror `.prototype`
    /// back. The other relations take colors from `RELATION_PALETTE` in
    /// order, and only the first edge of each relation carries its name
    /// as a label. Prototype edges are drawn bold with a heavier layout
    /// weight. The exploration's values must live in this graph's heap.
    pub fn add_exploration(&mut self, exploration: &Exploration) -> &mut Self {
        for (_, value) in exploration.nodes() {
            self.node(value.clone(), NodeSpec::new());
        }
        let drawn = exploration
            .relations()
            .iter()
            .filter(|relation| relation.name() != CONSTRUCTOR_RELATION);
        for (i, relation) in drawn.enumerate() {
            let color = RELATION_PALETTE[i % RELATION_PALETTE.len()];
            let (weight, style) = if relation.name() == crate::explore::PROTOTYPE_OF {
                (10, "bold")
            } else {
                (1, "solid")
            };
            let style: Attributes = [
                ("color", JsonValue::from(color)),
                ("fontcolor", JsonValue::from(color)),
                ("weight", JsonValue::from(weight)),
                ("style", JsonValue::from(style)),
            ]
            .into_iter()
            .collect();
            let mut labelled: Attributes = [("label", JsonValue::from(relation.name()))]
                .into_iter()
                .collect();
            labelled.merge(&style);

            for (n, (from, to)) in relation.edges().enumerate() {
                if let (Some(from), Some(to)) = (exploration.value(*from), exploration.value(*to))
                {
                    let attrs = if n == 0 { &labelled } else { &style };
                    let _ = self.add_path([from.clone(), to.clone()]).with(attrs);
                }
            }
        }
        self
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    fn apply_node_templates(&self, node: &mut Node) {
        let Some(repr) = node.represents().cloned() else {
            return;
        };
        for template in &self.node_templates {
            if (template.predicate)(&self.heap, &repr) {
                node.apply_spec(&template.patch, &self.heap);
            }
        }
    }

    fn apply_edge_templates(&self, edge: &Edge, attributes: &mut Attributes) {
        let from = self.nodes.get(edge.from.0).and_then(Node::represents);
        let to = self.nodes.get(edge.to.0).and_then(Node::represents);
        let (Some(from), Some(to)) = (from, to) else {
            return;
        };
        for template in &self.edge_templates {
            if (template.predicate)(&self.heap, from, to) {
                attributes.merge(&template.patch);
            }
        }
    }

    /// Render the graph as DOT text.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::new();

        match self.attributes.label() {
            Some(label) => out.push_str(&format!("digraph {} {{\n", JsonValue::from(label))),
            None => out.push_str("digraph {\n"),
        }
        for (name, value) in self.attributes.entries() {
            out.push_str(&format!("{}{};\n", INDENT, format_attribute(name, &value)));
        }
        out.push('\n');

        let node_style: Attributes = [
            ("fontname", JsonValue::from(self.attributes.fontname().as_str())),
            ("fontsize", JsonValue::from(DEFAULT_NODE_FONTSIZE)),
        ]
        .into_iter()
        .collect();
        out.push_str(&format!("{}node[{}];\n\n", INDENT, node_style.render()));

        // Template application happens on copies.
        let mut ranks = self.ranks.clone();
        let mut unranked = Vec::new();
        let mut ids = Vec::with_capacity(self.nodes.len());
        for stored in &self.nodes {
            let mut node = stored.clone();
            self.apply_node_templates(&mut node);
            ids.push(node.id().to_string());
            match node.rank() {
                Some(r) => {
                    while ranks.len() <= r {
                        ranks.push(Rank::new(ranks.len(), &self.heap));
                    }
                    if let Some(rank) = ranks.get_mut(r) {
                        rank.add_node(node);
                    }
                }
                None => unranked.push(node),
            }
        }

        if !ranks.is_empty() {
            out.push_str(&format!("{}/* {} ranks */\n", INDENT, ranks.len()));
            for rank in &ranks {
                out.push_str(&rank.render(ranks.len()));
            }
            if ranks.len() > 1 {
                let chain: Vec<&str> = ranks.iter().map(|r| r.anchor().id()).collect();
                out.push_str(&format!(
                    "{}{}[style={}];\n",
                    INDENT,
                    chain.join("->"),
                    JsonValue::from(INVISIBLE)
                ));
            }
        }

        if !unranked.is_empty() {
            out.push('\n');
            for node in &unranked {
                out.push_str(&format!("{}{}\n", INDENT, node.def()));
            }
        }

        out.push_str(&format!("\n{}/* {} edges */\n", INDENT, self.edges.len()));
        for edge in &self.edges {
            let mut attributes = edge.attributes.clone();
            self.apply_edge_templates(edge, &mut attributes);
            let from = ids.get(edge.from.0).map(String::as_str).unwrap_or_default();
            let to = ids.get(edge.to.0).map(String::as_str).unwrap_or_default();
            out.push_str(&format!(
                "{}{}->{}[{}];\n",
                INDENT,
                from,
                to,
                attributes.render()
            ));
        }

        out.push_str(&format!(
            "\n{}/* {} ranks, {} + {} nodes, {} + {} edges */\n",
            INDENT,
            ranks.len(),
            self.nodes.len(),
            ranks.len(),
            self.edges.len(),
            ranks.len().saturating_sub(1)
        ));
        out.push_str("}\n");
        out
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

// =============================================================================
// PATH HANDLE
// =============================================================================

/// The edges created by one `add_path` call.
pub struct PathEdges<'g> {
    graph: &'g mut Graph,
    range: Range<usize>,
}

impl PathEdges<'_> {
    /// Merge `attrs` into every edge of this path. Repeatable.
    #[must_use = "chain further calls or drop the handle"]
    pub fn with(self, attrs: &Attributes) -> Self {
        for edge in &mut self.graph.edges[self.range.clone()] {
            edge.attributes.merge(attrs);
        }
        self
    }

    /// Set one attribute on every edge of this path.
    #[must_use = "chain further calls or drop the handle"]
    pub fn attr(self, key: &str, value: impl Into<JsonValue>) -> Self {
        let patch: Attributes = [(key, value.into())].into_iter().collect();
        self.with(&patch)
    }

    /// Handles of the edges in this path.
    pub fn indices(&self) -> impl Iterator<Item = EdgeIndex> + use<> {
        self.range.clone().map(EdgeIndex)
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! # dotgraph-core
//!
//! The graph engine for dotgraph - THE LOGIC.
//!
//! This crate builds an in-memory ranked directed graph and serializes it to
//! Graphviz DOT, and it crawls value graphs into the same node/edge form.
//!
//! ## Pieces
//!
//! - `value`: the heap of objects and the `Value`/`Identity` model
//! - `attributes`, `label`: attribute formatting and default labels
//! - `node`, `rank`, `graph`: the graph model and its serializer
//! - `options`: global graph attributes
//! - `explore`: identity-keyed traversal under named relations
//!
//! ## Architectural Constraints
//!
//! - Single-threaded and synchronous; a graph belongs to one caller
//! - `Graph::serialize` depends only on stored state and never mutates it
//! - No process spawning and no file I/O (see the `dotgraph` app)
//!
//! ## Example
//!
//! ```
//! use dotgraph_core::Graph;
//!
//! let mut graph = Graph::new();
//! let _ = graph.add_path(["a", "b", "c"]);
//! let dot = graph.serialize();
//! assert!(dot.contains("s0->s1[];"));
//! assert!(dot.contains("s1->s2[];"));
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod attributes;
pub mod explore;
pub mod graph;
pub mod label;
pub mod node;
pub mod options;
pub mod rank;
pub mod types;
pub mod value;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{DotGraphError, EdgeIndex, NodeIndex};
pub use value::{Heap, Identity, ObjectId, ObjectKind, SymbolId, Value};

// =============================================================================
// RE-EXPORTS: Graph Model
// =============================================================================

pub use attributes::Attributes;
pub use graph::{Edge, Graph, PathEdges};
pub use label::autolabel;
pub use node::{Node, NodeSpec};
pub use options::{GraphAttribute, GraphAttributes, RankDir};
pub use rank::Rank;

// =============================================================================
// RE-EXPORTS: Explorer
// =============================================================================

pub use explore::{Exploration, ExploreId, Explorer, Relation, RelationEdges};

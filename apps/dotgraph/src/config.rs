//! # Graph Descriptions
//!
//! TOML documents describing a graph to build.
//!
//! ```toml
//! [graph]
//! label = "layers"
//! rankdir = "LR"
//!
//! [[node]]
//! value = "db"
//! rank = 2
//! attrs = { shape = "cylinder" }
//!
//! [[path]]
//! values = ["web", "api", "db"]
//! attrs = { color = "blue" }
//!
//! [[node_template]]
//! typeof = "number"
//! attrs = { shape = "circle" }
//!
//! [[edge_template]]
//! from = "api"
//! attrs = { style = "dashed" }
//! ```
//!
//! Values are TOML scalars (strings, numbers, booleans). Unknown `[graph]`
//! keys fail with `InvalidGraphOption`; any other unknown key fails with
//! `ConfigError`.

use dotgraph_core::{Attributes, DotGraphError, Graph, Heap, NodeSpec, Value};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use std::path::Path;

// =============================================================================
// DOCUMENT
// =============================================================================

/// A parsed graph description.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphDescription {
    /// Global attributes, validated when the graph is built.
    pub graph: Map<String, JsonValue>,

    #[serde(rename = "node")]
    pub nodes: Vec<NodeEntry>,

    #[serde(rename = "path")]
    pub paths: Vec<PathEntry>,

    #[serde(rename = "node_template")]
    pub node_templates: Vec<NodeTemplateEntry>,

    #[serde(rename = "edge_template")]
    pub edge_templates: Vec<EdgeTemplateEntry>,
}

/// One explicitly declared node.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeEntry {
    pub value: JsonValue,
    #[serde(default)]
    pub rank: Option<usize>,
    #[serde(default)]
    pub invis: bool,
    #[serde(default)]
    pub attrs: Map<String, JsonValue>,
}

/// One path of consecutive edges.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathEntry {
    pub values: Vec<JsonValue>,
    #[serde(default)]
    pub attrs: Map<String, JsonValue>,
}

/// Node template; every given matcher must hold.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeTemplateEntry {
    #[serde(rename = "typeof")]
    pub type_of: Option<String>,
    pub value: Option<JsonValue>,
    pub rank: Option<usize>,
    pub invis: bool,
    pub attrs: Map<String, JsonValue>,
}

/// Edge template matched on either endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EdgeTemplateEntry {
    pub from_typeof: Option<String>,
    pub to_typeof: Option<String>,
    pub from: Option<JsonValue>,
    pub to: Option<JsonValue>,
    pub attrs: Map<String, JsonValue>,
}

// =============================================================================
// MATCHING
// =============================================================================

/// Conjunction of an optional `typeof` tag and an optional exact value.
#[derive(Debug, Clone, Default)]
struct Matcher {
    type_of: Option<String>,
    value: Option<Value>,
}

impl Matcher {
    fn new(type_of: Option<&String>, value: Option<&JsonValue>) -> Result<Self, DotGraphError> {
        Ok(Self {
            type_of: type_of.cloned(),
            value: value.map(scalar).transpose()?,
        })
    }

    fn matches(&self, heap: &Heap, value: &Value) -> bool {
        let type_ok = self
            .type_of
            .as_deref()
            .is_none_or(|tag| heap.type_of(value) == tag);
        let value_ok = self
            .value
            .as_ref()
            .is_none_or(|expected| expected.identity() == value.identity());
        type_ok && value_ok
    }
}

/// Convert a description value into a primitive.
fn scalar(json: &JsonValue) -> Result<Value, DotGraphError> {
    match json {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(b) => Ok(Value::Bool(*b)),
        JsonValue::Number(n) => n
            .as_f64()
            .map(Value::Number)
            .ok_or_else(|| DotGraphError::ConfigError(format!("unrepresentable number {}", n))),
        JsonValue::String(s) => Ok(Value::String(s.clone())),
        other => Err(DotGraphError::ConfigError(format!(
            "node values must be scalars, got {}",
            other
        ))),
    }
}

// =============================================================================
// LOADING & BUILDING
// =============================================================================

impl GraphDescription {
    /// Parse a description from TOML text.
    pub fn parse(text: &str) -> Result<Self, DotGraphError> {
        toml::from_str(text).map_err(|e| DotGraphError::ConfigError(e.to_string()))
    }

    /// Read and parse a description file.
    pub fn load(path: &Path) -> Result<Self, DotGraphError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DotGraphError::IoError(format!("cannot read '{}': {}", path.display(), e))
        })?;
        let description = Self::parse(&text)?;
        tracing::debug!(
            path = %path.display(),
            nodes = description.nodes.len(),
            paths = description.paths.len(),
            "loaded graph description"
        );
        Ok(description)
    }

    /// Build the described graph.
    ///
    /// Order: global attributes, templates, declared nodes, then paths.
    pub fn build(&self) -> Result<Graph, DotGraphError> {
        let options = self.graph.iter().map(|(k, v)| (k.as_str(), v.clone()));
        let mut graph = Graph::from_options(options)?;

        for entry in &self.node_templates {
            let matcher = Matcher::new(entry.type_of.as_ref(), entry.value.as_ref())?;
            let mut patch = NodeSpec::new();
            if let Some(rank) = entry.rank {
                patch = patch.rank(rank);
            }
            if entry.invis {
                patch = patch.invis();
            }
            for (key, value) in &entry.attrs {
                patch = patch.attr(key.clone(), value.clone());
            }
            graph.node_if(move |heap, v| matcher.matches(heap, v), patch);
        }

        for entry in &self.edge_templates {
            let from = Matcher::new(entry.from_typeof.as_ref(), entry.from.as_ref())?;
            let to = Matcher::new(entry.to_typeof.as_ref(), entry.to.as_ref())?;
            let patch = Attributes::from(entry.attrs.clone());
            graph.edge_if(
                move |heap, a, b| from.matches(heap, a) && to.matches(heap, b),
                patch,
            );
        }

        for entry in &self.nodes {
            let mut spec = NodeSpec::new();
            if let Some(rank) = entry.rank {
                spec = spec.rank(rank);
            }
            if entry.invis {
                spec = spec.invis();
            }
            for (key, value) in &entry.attrs {
                spec = spec.attr(key.clone(), value.clone());
            }
            graph.node(scalar(&entry.value)?, spec);
        }

        for entry in &self.paths {
            let values = entry
                .values
                .iter()
                .map(scalar)
                .collect::<Result<Vec<_>, _>>()?;
            let attrs = Attributes::from(entry.attrs.clone());
            let _ = graph.add_path(values).with(&attrs);
        }

        Ok(graph)
    }
}

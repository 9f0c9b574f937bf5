//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::OutputArgs;
use crate::config::GraphDescription;
use crate::render::{RenderOptions, render};
use dotgraph_core::{DotGraphError, Explorer, Graph, Relation};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE LIMITS
// =============================================================================

/// Maximum input file size (100 MB).
const MAX_INPUT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Resolve `path` to an existing regular file no larger than
/// `MAX_INPUT_FILE_SIZE`.
fn validate_input_file(path: &Path) -> Result<PathBuf, DotGraphError> {
    let canonical = path.canonicalize().map_err(|e| {
        DotGraphError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(DotGraphError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| DotGraphError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > MAX_INPUT_FILE_SIZE {
        return Err(DotGraphError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_INPUT_FILE_SIZE
        )));
    }

    Ok(canonical)
}

// =============================================================================
// BUILD COMMAND
// =============================================================================

/// Build the graph described by a TOML file.
pub fn cmd_build(file: &Path, output: &OutputArgs) -> Result<(), DotGraphError> {
    let path = validate_input_file(file)?;
    let mut graph = GraphDescription::load(&path)?.build()?;
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built graph"
    );
    emit(&mut graph, output)
}

// =============================================================================
// EXPLORE COMMAND
// =============================================================================

/// Explore a JSON document and graph the result.
pub fn cmd_explore(
    file: &Path,
    properties: &[String],
    all_keys: bool,
    output: &OutputArgs,
) -> Result<(), DotGraphError> {
    let path = validate_input_file(file)?;
    let text = std::fs::read_to_string(&path)
        .map_err(|e| DotGraphError::IoError(format!("Cannot read '{}': {}", path.display(), e)))?;
    let document: JsonValue = serde_json::from_str(&text)
        .map_err(|e| DotGraphError::SerializationError(format!("Invalid JSON: {}", e)))?;

    let mut keys = properties.to_vec();
    if all_keys {
        keys.extend(document_keys(&document));
    }

    let mut graph = Graph::new();
    let root = graph.heap_mut().load_json(&document);
    let explorer = Explorer::new(relations_for(&keys));
    let exploration = explorer.explore(graph.heap(), &root);
    tracing::info!(
        nodes = exploration.node_count(),
        edges = exploration.edge_count(),
        relations = explorer.relations().len(),
        "explored document"
    );

    graph.add_exploration(&exploration);
    emit(&mut graph, output)
}

/// The built-in relations followed by one own-property relation per key.
/// Duplicate keys and keys the built-ins already cover are skipped.
fn relations_for(keys: &[String]) -> Vec<Relation> {
    let mut relations = Relation::defaults();
    for key in keys {
        let name = format!(".{}", key);
        if relations.iter().all(|r| r.name() != name) {
            relations.push(Relation::own_property(key));
        }
    }
    relations
}

/// Every object key and array index in `document`, first occurrence order.
fn document_keys(document: &JsonValue) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    let mut stack = vec![document];
    while let Some(value) = stack.pop() {
        match value {
            JsonValue::Object(map) => {
                for (key, item) in map {
                    if !keys.contains(key) {
                        keys.push(key.clone());
                    }
                    stack.push(item);
                }
            }
            JsonValue::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    let key = i.to_string();
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                    stack.push(item);
                }
            }
            _ => {}
        }
    }
    keys
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Split a `KEY=VALUE` override.
fn parse_attr_override(raw: &str) -> Result<(&str, &str), DotGraphError> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim(), value))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| {
            DotGraphError::InvalidGraphOption(format!("{} (expected KEY=VALUE)", raw))
        })
}

/// Apply attribute overrides, then print DOT or render it.
fn emit(graph: &mut Graph, args: &OutputArgs) -> Result<(), DotGraphError> {
    for raw in &args.attrs {
        let (key, value) = parse_attr_override(raw)?;
        graph.attributes_mut().set_str(key, value)?;
    }

    let Some(stem) = &args.output else {
        print!("{}", graph.serialize());
        return Ok(());
    };

    let mut options = RenderOptions::new(stem);
    options.format = args.format.clone();
    options.show = args.show;
    if let Some(program) = &args.dot {
        options.program = program.clone();
    }
    let written = render(graph, &options)?;
    println!("{}", written.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attr_overrides_split_on_first_equals() {
        assert_eq!(parse_attr_override("label=a=b").expect("valid"), ("label", "a=b"));
        assert_eq!(parse_attr_override(" rankdir =LR").expect("valid"), ("rankdir", "LR"));
        assert!(parse_attr_override("rankdir").is_err());
        assert!(parse_attr_override("=LR").is_err());
    }

    #[test]
    fn overrides_reach_the_graph() {
        let mut graph = Graph::new();
        let args = OutputArgs {
            attrs: vec!["rankdir=LR".to_string(), "fontsize=24".to_string()],
            ..OutputArgs::default()
        };
        for raw in &args.attrs {
            let (key, value) = parse_attr_override(raw).expect("valid");
            graph.attributes_mut().set_str(key, value).expect("known");
        }
        let dot = graph.serialize();
        assert!(dot.contains("rankdir=\"LR\";"));
        assert!(dot.contains("fontsize=24;"));
    }

    #[test]
    fn text_overrides_are_taken_verbatim() {
        let mut graph = Graph::new();
        let args = OutputArgs {
            attrs: vec!["label=2024".to_string(), "fontname=123".to_string()],
            ..OutputArgs::default()
        };
        emit(&mut graph, &args).expect("overrides apply");
        assert_eq!(graph.attributes().label(), Some("2024"));
        assert_eq!(graph.attributes().fontname(), "123");
        assert!(graph.serialize().contains("label=\"2024\";"));
    }

    #[test]
    fn unknown_override_is_invalid_option() {
        let mut graph = Graph::new();
        let args = OutputArgs {
            attrs: vec!["shape=box".to_string()],
            ..OutputArgs::default()
        };
        assert!(matches!(
            emit(&mut graph, &args),
            Err(DotGraphError::InvalidGraphOption(_))
        ));
    }

    #[test]
    fn document_keys_cover_nested_values() {
        let doc = json!({"a": {"b": [1, {"c": true}]}, "d": null});
        let keys = document_keys(&doc);
        for key in ["a", "b", "c", "d", "0", "1"] {
            assert!(keys.iter().any(|k| k == key), "missing {}", key);
        }
        assert_eq!(keys.len(), 6);
    }

    #[test]
    fn relations_skip_duplicates_and_builtins() {
        let keys = vec!["next".to_string(), "name".to_string(), "next".to_string()];
        let names: Vec<String> = relations_for(&keys)
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["[[Prototype]]", ".prototype", ".constructor", ".valueOf()", ".name", ".next"]
        );
    }
}

//! # Attribute Formatting
//!
//! Attribute maps for nodes, edges and the graph, and their DOT rendering.
//!
//! Values are JSON values and are written as JSON literals, which DOT reads
//! as quoted IDs, numerals or bare keywords. `label` is the exception: DOT
//! reserves the two-character escape `\N` inside labels, so the label text
//! is split on `\N`, every piece is JSON-escaped on its own, and the pieces
//! are joined back with `\N` inside a single pair of quotes.

use crate::value::format_number;
use serde_json::{Map, Value as JsonValue};

/// The format-reserved marker that must survive label escaping.
pub const LABEL_MARKER: &str = "\\N";

/// Insertion-ordered attribute map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(Map<String, JsonValue>);

impl Attributes {
    /// Create an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, keeping its original position when it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get an attribute value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Whether the attribute is present with a non-null value.
    #[must_use]
    pub fn is_set(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|v| !v.is_null())
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy every attribute of `other` into `self`; `other` wins on collision.
    pub fn merge(&mut self, other: &Attributes) -> &mut Self {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
        self
    }

    /// Render as `k=v,k=v` (no brackets).
    #[must_use]
    pub fn render(&self) -> String {
        self.iter()
            .map(|(k, v)| format_attribute(k, v))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}

impl From<Map<String, JsonValue>> for Attributes {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Render one `name=value` pair.
#[must_use]
pub fn format_attribute(name: &str, value: &JsonValue) -> String {
    if name == "label" {
        format!("{}={}", name, escape_label(value))
    } else {
        format!("{}={}", name, json_literal(value))
    }
}

/// JSON literal of a value.
#[must_use]
pub fn json_literal(value: &JsonValue) -> String {
    value.to_string()
}

/// Quote a label, escaping each `\N`-separated piece independently.
#[must_use]
pub fn escape_label(value: &JsonValue) -> String {
    let text = display_string(value);
    let pieces: Vec<String> = text
        .split(LABEL_MARKER)
        .map(|piece| {
            let quoted = JsonValue::from(piece).to_string();
            quoted[1..quoted.len() - 1].to_string()
        })
        .collect();
    format!("\"{}\"", pieces.join(LABEL_MARKER))
}

/// String conversion of an attribute value, as used for label text.
#[must_use]
pub fn display_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(u)) => u.to_string(),
            _ => format_number(n.as_f64().unwrap_or(f64::NAN)),
        },
        other => other.to_string(),
    }
}

// =============================================================================
// TESTS
// =============================================================================

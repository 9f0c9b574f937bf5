//! # Core Type Definitions
//!
//! Small shared types for the dotgraph engine:
//! - Handles into a graph (`NodeIndex`, `EdgeIndex`)
//! - Error types (`DotGraphError`)

use thiserror::Error;

// =============================================================================
// GRAPH HANDLES
// =============================================================================

/// Handle to a node registered in a `Graph`.
///
/// Handles are dense and assigned in creation order, so iterating the
/// registry by handle is iterating it in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(pub usize);

impl NodeIndex {
    /// Get the raw index value.
    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }
}

/// Handle to an edge, i.e. its position in the graph's edge list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeIndex(pub usize);

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the dotgraph system.
///
/// - No silent failures, except `AccessorFailure` which the explorer
///   recovers locally
/// - Use `Result<T, DotGraphError>` for fallible operations
/// - A failed mutation leaves the graph unchanged
#[derive(Debug, Error, PartialEq)]
pub enum DotGraphError {
    /// A node for this identity is already registered.
    #[error("duplicate node for {0}")]
    DuplicateNode(String),

    /// A graph option name is not a known global attribute, or its value
    /// has the wrong type.
    #[error("invalid graph attribute {0}")]
    InvalidGraphOption(String),

    /// An explorer relation does not apply to the given value.
    #[error("accessor {relation} failed: {reason}")]
    AccessorFailure { relation: String, reason: String },

    /// A graph description could not be parsed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The external renderer could not produce an output file.
    #[error("Render failed: {0}")]
    RenderFailed(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl DotGraphError {
    /// Shorthand for an accessor failure on `relation`.
    pub fn accessor(relation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AccessorFailure {
            relation: relation.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! Error types for the type-test engine.
//!
//! The algorithms themselves never fail: "no simplification" and "unknown"
//! are ordinary results. The variants here describe inconsistent IR handed
//! to the engine, which is a bug in the caller.

use std::path::PathBuf;

use thiserror::Error;

use crate::graph::NodeId;

/// Invariant violation detected while building or rewriting a type test
#[derive(Debug, Error)]
pub enum TypeTestError {
    /// A profile was supplied without an anchor to validate it against
    #[error("type profile for operand {operand} has no anchor")]
    UnanchoredProfile { operand: NodeId },

    /// The checked stamp does not name a type
    #[error("checked stamp `{stamp}` does not name a type")]
    UnresolvedType { stamp: String },

    /// Null degeneration reached with equal nullability on both sides
    #[error("checked stamp `{checked}` and input stamp `{input}` agree on nullability")]
    NullabilityInvariant { checked: String, input: String },

    /// The tested value is not a reference
    #[error("operand {0} does not have an object stamp")]
    NonObjectOperand(NodeId),

    #[error("node {0} is not a type test")]
    NotATypeTest(NodeId),

    #[error("node {0} is not an anchor")]
    NotAnAnchor(NodeId),

    /// The node was already removed from the graph
    #[error("node {0} is dead")]
    DeadNode(NodeId),
}

/// Result type for engine operations
pub type TypeTestResult<T> = Result<T, TypeTestError>;

/// Simplifier configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid simplifier configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The pipeline must run at least once
    #[error("max_iterations must be at least 1")]
    ZeroIterations,
}

//! Error types for the call-trace core.

use thiserror::Error;

/// Conditions surfaced by graph construction and visibility operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceViewError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Missing className or methodName. Classification recovers from this
    /// locally, so it is only reported, never returned by the classifier.
    #[error("Malformed node: {0} (missing className or methodName)")]
    MalformedNode(String),

    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, TraceViewError>;

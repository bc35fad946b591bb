//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Structural errors raised by tree mutation and decoding.
///
/// These are contract violations reported to the immediate caller; no
/// mutation has been performed when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("cycle detected: a node cannot be attached beneath itself or a descendant")]
    CycleDetected,

    #[error("node is already attached to a parent")]
    AlreadyAttached,

    #[error("node is not a direct child of the receiver")]
    NotAChild,

    #[error("malformed encoding: {0}")]
    Decode(#[from] DecodeError),
}

/// Failures while reading an encoded `[payload, marker]` sequence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty input")]
    Empty,

    #[error("expected a payload at position {position}, found a marker")]
    ExpectedPayload { position: usize },

    #[error("expected a child-count marker at position {position}")]
    ExpectedMarker { position: usize },

    #[error("invalid payload at position {position}: {reason}")]
    InvalidPayload { position: usize, reason: String },

    #[error("invalid marker at position {position}: {token:?}")]
    InvalidMarker { position: usize, token: String },

    #[error("truncated input: {missing} more node(s) announced than available")]
    Truncated { missing: usize },

    #[error("{count} trailing token(s) after the root subtree")]
    TrailingTokens { count: usize },

    #[error("nesting depth exceeds limit of {limit}")]
    DepthExceeded { limit: usize },
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

//! Identifier types and the crate-wide error type.

use thiserror::Error;

mod id;

pub use id::{Directionality, EdgeDirection, EdgeId, VertexId, SYSTEM_ID_BIT};

/// Errors surfaced by the graph store and its storage adapters.
#[derive(Error, Debug)]
pub enum GraphError {
    /// An id does not resolve to a stored element.
    #[error("not found: {0}")]
    NotFound(String),
    /// Malformed key/value pairs, unsupported value types or id-space violations.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Explicitly rejected operation (removal, edge properties, multi-properties).
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
    /// Optimistic commit failed validation; the store is unchanged.
    #[error("transaction conflict")]
    TransactionConflict,
    /// Adapter-level infrastructure failure.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    /// Persisted bytes could not be decoded.
    #[error("corruption: {0}")]
    Corruption(&'static str),
    /// Configuration could not be parsed or failed validation.
    #[error("config: {0}")]
    Config(String),
    /// IO while loading configuration.
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

impl GraphError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GraphError::InvalidArgument(msg.into())
    }

    pub(crate) fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        GraphError::NotFound(format!("{what} {id}"))
    }

    /// Returns `true` for a failed optimistic commit.
    pub fn is_conflict(&self) -> bool {
        matches!(self, GraphError::TransactionConflict)
    }

    /// Returns `true` if re-running the whole transaction may succeed.
    pub fn is_retryable(&self) -> bool {
        self.is_conflict()
    }
}

#[cfg(test)]
mod tests {
    use super::GraphError;

    #[test]
    fn only_conflicts_are_retryable() {
        assert!(GraphError::TransactionConflict.is_retryable());
        assert!(!GraphError::NotFound("vertex 0x1".into()).is_retryable());
        assert!(!GraphError::StorageUnavailable("down".into()).is_retryable());
        assert!(!GraphError::Unsupported("remove vertex").is_retryable());
    }

    #[test]
    fn display_includes_context() {
        let err = GraphError::not_found("vertex", "0x2A");
        assert_eq!(err.to_string(), "not found: vertex 0x2A");
    }
}

//! Error types for the biblio library.

use thiserror::Error;

/// A specialized `Result` type for biblio operations.
pub type Result<T> = std::result::Result<T, BiblioError>;

/// The error type for all fallible biblio operations.
///
/// Missing libraries, documents, and chunks are a normal outcome of store
/// operations and are reported as `Ok(None)` / `Ok(false)`, never through
/// this type. `NotFound` exists for callers that need to surface an absent
/// id as an error at their own boundary.
#[derive(Error, Debug)]
pub enum BiblioError {
    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A caller-supplied input is invalid (missing query, dimension mismatch).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The library is misconfigured (e.g. no embedder available).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The external embedding provider failed.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// A stored library subtree could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal invariant was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BiblioError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        BiblioError::NotFound(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        BiblioError::InvalidArgument(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        BiblioError::InvalidConfig(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        BiblioError::Embedding(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        BiblioError::Internal(msg.into())
    }
}

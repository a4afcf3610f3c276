//! Error types for the vector store client.

use thiserror::Error;

/// Result type alias for vector store operations.
pub type Result<T> = std::result::Result<T, VectorDbError>;

/// Errors surfaced by [`VectorStore`](crate::VectorStore) operations.
///
/// Each variant names the operation that failed; the provider's own error is
/// kept as the source and never retried or swallowed.
#[derive(Debug, Error)]
pub enum VectorDbError {
    /// A required credential or setting is missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The named index could not be resolved on the provider.
    #[error("Failed to connect to index '{index}': {source}")]
    Connection {
        index: String,
        #[source]
        source: ProviderError,
    },

    /// An operation was issued before `initialize()` resolved the index.
    #[error("Index '{index}' is not initialized; call initialize() first")]
    NotInitialized { index: String },

    /// The provider rejected an upsert.
    #[error("Failed to store embedding for document '{id}': {source}")]
    Store {
        id: String,
        #[source]
        source: ProviderError,
    },

    /// The provider rejected a similarity query.
    #[error("Failed to perform similarity search: {0}")]
    Query(#[source] ProviderError),

    /// The provider rejected a delete.
    #[error("Failed to delete document '{id}': {source}")]
    Delete {
        id: String,
        #[source]
        source: ProviderError,
    },

    /// The provider failed to report index statistics.
    #[error("Failed to get index stats: {0}")]
    Stats(#[source] ProviderError),
}

/// Errors reported by a vector database provider.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// Credentials were rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The requested index does not exist.
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// The provider answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP/network error.
    #[error("Network error: {0}")]
    Network(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::Serialization(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Serialization(e.to_string())
    }
}

//! colpali-store: ColPali embeddings backed by a managed vector database
//!
//! This crate provides:
//! - A pluggable embedding seam with a random stand-in for the ColPali model
//! - A provider abstraction over managed vector databases, with an in-memory mock
//! - A Pinecone REST provider
//! - A document-oriented `VectorStore` client and the demonstration flow

pub mod demo;
pub mod embedding;
pub mod error;
pub mod pinecone;
pub mod provider;
pub mod store;
pub mod types;

// Testing utilities - available in test builds
#[cfg(test)]
pub mod testing;

pub use demo::{DEMO_QUERY, DEMO_TOP_K, DemoOptions, DemoReport, run_demo, sample_documents};
pub use embedding::{
    EMBEDDING_DIMENSION, Embedder, RandomEmbedder, SharedEmbedder, generate_embedding,
};
pub use error::{ProviderError, Result, VectorDbError};
pub use pinecone::{API_KEY_ENV, PineconeConfig, PineconeIndex, PineconeProvider};
pub use provider::{
    MockIndex, MockOperation, MockProvider, ProviderResult, SharedIndex, SharedProvider,
    VectorIndex, VectorProvider,
};
pub use store::{DEFAULT_INDEX_NAME, DEFAULT_TOP_K, VectorStore};
pub use types::{
    Document, Embedding, IndexStats, Metadata, MetadataValue, NamespaceStats, QueryMatch,
    QueryRequest, QueryResponse, SearchResult, UpsertResponse, VectorRecord,
};

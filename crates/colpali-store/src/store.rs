//! Document-oriented vector store client.
//!
//! [`VectorStore`] is a write-through wrapper around one provider index. Each
//! operation is a single provider round-trip; failures are logged where they
//! happen and returned to the caller without retries or fallbacks.

use chrono::{SecondsFormat, Utc};

use crate::embedding::{RandomEmbedder, SharedEmbedder};
use crate::error::{Result, VectorDbError};
use crate::provider::{SharedIndex, SharedProvider};
use crate::types::{
    Document, Embedding, IndexStats, Metadata, MetadataValue, QueryRequest, SearchResult,
    VectorRecord,
};

/// Index used when none is configured.
pub const DEFAULT_INDEX_NAME: &str = "colpali-index";

/// Number of results returned by searches that do not specify one.
pub const DEFAULT_TOP_K: usize = 5;

/// Metadata key holding the upsert time.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Metadata key holding the original document text.
pub const TEXT_KEY: &str = "text";

/// A vector store bound to one named index.
///
/// Construct with [`new`](VectorStore::new), then call
/// [`initialize`](VectorStore::initialize) to resolve the index. After that
/// every operation takes `&self`, so the store can be shared behind an `Arc`
/// and used from concurrent tasks.
pub struct VectorStore {
    provider: SharedProvider,
    embedder: SharedEmbedder,
    index_name: String,
    index: Option<SharedIndex>,
}

impl VectorStore {
    /// Create a store for the named index using the random stand-in embedder.
    ///
    /// `None` selects [`DEFAULT_INDEX_NAME`].
    pub fn new(provider: SharedProvider, index_name: Option<&str>) -> Self {
        Self {
            provider,
            embedder: RandomEmbedder::shared(),
            index_name: index_name.unwrap_or(DEFAULT_INDEX_NAME).to_string(),
            index: None,
        }
    }

    /// Swap in a different embedder.
    pub fn with_embedder(mut self, embedder: SharedEmbedder) -> Self {
        self.embedder = embedder;
        self
    }

    /// Name of the target index.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Whether [`initialize`](VectorStore::initialize) has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.index.is_some()
    }

    /// Resolve the named index on the provider.
    pub async fn initialize(&mut self) -> Result<()> {
        match self.provider.index(&self.index_name).await {
            Ok(index) => {
                tracing::info!(
                    provider = self.provider.name(),
                    index = %self.index_name,
                    "Connected to index"
                );
                self.index = Some(index);
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    provider = self.provider.name(),
                    index = %self.index_name,
                    error = %e,
                    "Failed to connect to index"
                );
                Err(VectorDbError::Connection {
                    index: self.index_name.clone(),
                    source: e,
                })
            }
        }
    }

    fn index(&self) -> Result<&SharedIndex> {
        self.index.as_ref().ok_or_else(|| VectorDbError::NotInitialized {
            index: self.index_name.clone(),
        })
    }

    /// Upsert one embedding, adding a `timestamp` to its metadata.
    ///
    /// An existing record with the same id is overwritten.
    pub async fn store_embedding(
        &self,
        document_id: &str,
        embedding: Embedding,
        metadata: Option<Metadata>,
    ) -> Result<()> {
        let index = self.index()?;

        let mut metadata = metadata.unwrap_or_default();
        metadata.insert(
            TIMESTAMP_KEY.to_string(),
            MetadataValue::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );

        let record = VectorRecord {
            id: document_id.to_string(),
            values: embedding,
            metadata: Some(metadata),
        };

        match index.upsert(vec![record]).await {
            Ok(_) => {
                tracing::info!(document_id, "Stored embedding for document");
                Ok(())
            }
            Err(e) => {
                tracing::error!(document_id, error = %e, "Failed to store embedding");
                Err(VectorDbError::Store {
                    id: document_id.to_string(),
                    source: e,
                })
            }
        }
    }

    /// Nearest-neighbor search, returning at most `top_k` results.
    ///
    /// `None` selects [`DEFAULT_TOP_K`]. Results keep the provider's order.
    pub async fn similarity_search(
        &self,
        query_embedding: Embedding,
        top_k: Option<usize>,
    ) -> Result<Vec<SearchResult>> {
        let index = self.index()?;
        let top_k = top_k.unwrap_or(DEFAULT_TOP_K);

        let response = index
            .query(QueryRequest::new(query_embedding, top_k))
            .await
            .map_err(|e| {
                tracing::error!(top_k, error = %e, "Failed to perform similarity search");
                VectorDbError::Query(e)
            })?;

        let results: Vec<SearchResult> = response
            .matches
            .unwrap_or_default()
            .into_iter()
            .take(top_k)
            .map(SearchResult::from)
            .collect();

        tracing::info!(count = results.len(), top_k, "Found similar documents");
        Ok(results)
    }

    /// Embed a document's text and store it with the text in its metadata.
    ///
    /// The document's own metadata wins over the default `text` field.
    pub async fn store_document(&self, document: &Document) -> Result<()> {
        let embedding = self.embedder.embed(&document.text);

        let mut metadata = Metadata::new();
        metadata.insert(
            TEXT_KEY.to_string(),
            MetadataValue::String(document.text.clone()),
        );
        if let Some(ref extra) = document.metadata {
            metadata.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        self.store_embedding(&document.id, embedding, Some(metadata))
            .await
    }

    /// Embed a query text and run a similarity search with it.
    pub async fn search_documents(
        &self,
        query_text: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<SearchResult>> {
        let embedding = self.embedder.embed(query_text);
        self.similarity_search(embedding, top_k).await
    }

    /// Delete one record by id.
    ///
    /// Whether an unknown id is an error is up to the provider.
    pub async fn delete_document(&self, document_id: &str) -> Result<()> {
        let index = self.index()?;

        match index.delete_one(document_id).await {
            Ok(()) => {
                tracing::info!(document_id, "Deleted document");
                Ok(())
            }
            Err(e) => {
                tracing::error!(document_id, error = %e, "Failed to delete document");
                Err(VectorDbError::Delete {
                    id: document_id.to_string(),
                    source: e,
                })
            }
        }
    }

    /// Provider-reported statistics for the index.
    pub async fn get_index_stats(&self) -> Result<IndexStats> {
        let index = self.index()?;

        let stats = index.describe_index_stats().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to get index stats");
            VectorDbError::Stats(e)
        })?;

        tracing::info!(
            total_vector_count = stats.total_vector_count,
            dimension = ?stats.dimension,
            "Index statistics"
        );
        Ok(stats)
    }
}

//! End-to-end demonstration flow.
//!
//! Stores three sample documents, waits for the provider to index them, runs
//! one search, and collects index statistics. The flow returns a
//! [`DemoReport`] and leaves printing and exit codes to the caller.

use std::time::Duration;

use crate::error::Result;
use crate::store::VectorStore;
use crate::types::{Document, IndexStats, SearchResult};

/// Query issued by the demonstration.
pub const DEMO_QUERY: &str = "What is ColPali and how does it work?";

/// Number of results requested by the demonstration.
pub const DEMO_TOP_K: usize = 3;

/// Pause between storing and searching.
pub const DEFAULT_INDEXING_DELAY: Duration = Duration::from_millis(2000);

/// Tunables for [`run_demo`].
#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub query: String,
    pub top_k: usize,
    /// How long to wait for the provider to index the writes.
    pub indexing_delay: Duration,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            query: DEMO_QUERY.to_string(),
            top_k: DEMO_TOP_K,
            indexing_delay: DEFAULT_INDEXING_DELAY,
        }
    }
}

/// Everything the demonstration produced.
#[derive(Debug, Clone)]
pub struct DemoReport {
    pub stored_ids: Vec<String>,
    pub query: String,
    pub results: Vec<SearchResult>,
    pub stats: IndexStats,
}

/// The fixed documents stored by the demonstration.
pub fn sample_documents() -> Vec<Document> {
    vec![
        Document::new(
            "doc1",
            "ColPali is a powerful document embedding model that can process visual and textual information.",
        )
        .with_field("category", "technical")
        .with_field("source", "documentation"),
        Document::new(
            "doc2",
            "Pinecone provides fast vector similarity search for machine learning applications.",
        )
        .with_field("category", "technical")
        .with_field("source", "product_info"),
        Document::new(
            "doc3",
            "Vector databases enable semantic search and recommendation systems in AI applications.",
        )
        .with_field("category", "overview")
        .with_field("source", "guide"),
    ]
}

/// Run the demonstration against an initialized store.
///
/// Stops at the first failing step and returns its error.
pub async fn run_demo(store: &VectorStore, options: &DemoOptions) -> Result<DemoReport> {
    let documents = sample_documents();

    tracing::info!(count = documents.len(), "Storing sample documents");
    for doc in &documents {
        store.store_document(doc).await?;
    }

    if !options.indexing_delay.is_zero() {
        tracing::info!(
            delay_ms = options.indexing_delay.as_millis() as u64,
            "Waiting for indexing"
        );
        tokio::time::sleep(options.indexing_delay).await;
    }

    tracing::info!(query = %options.query, top_k = options.top_k, "Performing similarity search");
    let results = store
        .search_documents(&options.query, Some(options.top_k))
        .await?;

    let stats = store.get_index_stats().await?;

    Ok(DemoReport {
        stored_ids: documents.into_iter().map(|d| d.id).collect(),
        query: options.query.clone(),
        results,
        stats,
    })
}

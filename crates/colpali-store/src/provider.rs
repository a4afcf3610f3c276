//! Vector database provider traits and an in-memory mock.
//!
//! A provider resolves an index name to a [`VectorIndex`] handle; the handle
//! carries the four data-plane calls the store needs. The concrete Pinecone
//! implementation lives in [`crate::pinecone`]; [`MockProvider`] keeps records
//! in memory and captures every call for assertions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{
    IndexStats, NamespaceStats, QueryMatch, QueryRequest, QueryResponse, UpsertResponse,
    VectorRecord,
};

/// Result type for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// A managed vector database service.
#[async_trait]
pub trait VectorProvider: Send + Sync {
    /// Resolve a named index into a handle for data-plane calls.
    async fn index(&self, name: &str) -> ProviderResult<SharedIndex>;

    /// Get the name of this provider.
    fn name(&self) -> &str;
}

/// A handle to one remote index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite records keyed by id.
    async fn upsert(&self, records: Vec<VectorRecord>) -> ProviderResult<UpsertResponse>;

    /// Nearest-neighbor query.
    async fn query(&self, request: QueryRequest) -> ProviderResult<QueryResponse>;

    /// Delete a single record by id.
    async fn delete_one(&self, id: &str) -> ProviderResult<()>;

    /// Describe the index's statistics.
    async fn describe_index_stats(&self) -> ProviderResult<IndexStats>;
}

/// A provider that can be shared across threads.
pub type SharedProvider = Arc<dyn VectorProvider>;

/// An index handle that can be shared across threads.
pub type SharedIndex = Arc<dyn VectorIndex>;

// ─────────────────────────────────────────────────────────────────────────────
// Mock provider
// ─────────────────────────────────────────────────────────────────────────────

/// Data-plane operations on a [`MockIndex`], used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    Upsert,
    Query,
    Delete,
    Stats,
}

/// A mock provider serving a single in-memory index.
///
/// Resolving any other index name fails with [`ProviderError::IndexNotFound`].
#[derive(Debug)]
pub struct MockProvider {
    index_name: String,
    index: Arc<MockIndex>,
    connect_error: Option<ProviderError>,
}

impl MockProvider {
    /// Create a provider that knows one index with the given name.
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            index: Arc::new(MockIndex::new()),
            connect_error: None,
        }
    }

    /// Make every `index()` call fail with the given error.
    pub fn with_connect_error(mut self, error: ProviderError) -> Self {
        self.connect_error = Some(error);
        self
    }

    /// Replace the backing index, e.g. to configure its dimension.
    pub fn with_index(mut self, index: MockIndex) -> Self {
        self.index = Arc::new(index);
        self
    }

    /// Get the backing index for assertions.
    pub fn mock_index(&self) -> Arc<MockIndex> {
        Arc::clone(&self.index)
    }
}

#[async_trait]
impl VectorProvider for MockProvider {
    async fn index(&self, name: &str) -> ProviderResult<SharedIndex> {
        if let Some(ref error) = self.connect_error {
            return Err(error.clone());
        }
        if name != self.index_name {
            return Err(ProviderError::IndexNotFound(name.to_string()));
        }
        Ok(Arc::clone(&self.index) as SharedIndex)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// An in-memory index that records every call made to it.
///
/// Queries return canned matches when configured; otherwise stored records
/// are ranked by cosine similarity to the query vector and cut to `top_k`.
#[derive(Debug)]
pub struct MockIndex {
    dimension: usize,
    strict_deletes: bool,
    records: RwLock<HashMap<String, VectorRecord>>,
    canned_matches: Mutex<Option<Vec<QueryMatch>>>,
    failures: Mutex<HashMap<MockOperation, ProviderError>>,
    upserts: Mutex<Vec<VectorRecord>>,
    queries: Mutex<Vec<QueryRequest>>,
    deletes: Mutex<Vec<String>>,
}

impl MockIndex {
    /// Create an empty index with the ColPali dimension.
    pub fn new() -> Self {
        Self::with_dimension(crate::embedding::EMBEDDING_DIMENSION)
    }

    /// Create an empty index that rejects vectors of any other length.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            strict_deletes: false,
            records: RwLock::new(HashMap::new()),
            canned_matches: Mutex::new(None),
            failures: Mutex::new(HashMap::new()),
            upserts: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
        }
    }

    /// Report deletes of unknown ids as a 404 instead of a no-op.
    pub fn with_strict_deletes(mut self, strict: bool) -> Self {
        self.strict_deletes = strict;
        self
    }

    /// Return these matches from every query, ignoring `top_k`.
    pub fn set_matches(&self, matches: Vec<QueryMatch>) {
        *lock(&self.canned_matches) = Some(matches);
    }

    /// Make an operation fail with the given error until cleared.
    pub fn fail_on(&self, operation: MockOperation, error: ProviderError) {
        lock(&self.failures).insert(operation, error);
    }

    /// Clear all injected failures.
    pub fn clear_failures(&self) {
        lock(&self.failures).clear();
    }

    /// Get a stored record by id.
    pub fn record(&self, id: &str) -> Option<VectorRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Get the number of stored records.
    pub fn record_count(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Get every record received through `upsert`, in call order.
    pub fn captured_upserts(&self) -> Vec<VectorRecord> {
        lock(&self.upserts).clone()
    }

    /// Get every query received, in call order.
    pub fn captured_queries(&self) -> Vec<QueryRequest> {
        lock(&self.queries).clone()
    }

    /// Get every id passed to `delete_one`, in call order.
    pub fn captured_deletes(&self) -> Vec<String> {
        lock(&self.deletes).clone()
    }

    fn check_failure(&self, operation: MockOperation) -> ProviderResult<()> {
        match lock(&self.failures).get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Default for MockIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for MockIndex {
    async fn upsert(&self, records: Vec<VectorRecord>) -> ProviderResult<UpsertResponse> {
        lock(&self.upserts).extend(records.iter().cloned());
        self.check_failure(MockOperation::Upsert)?;

        if let Some(bad) = records.iter().find(|r| r.values.len() != self.dimension) {
            return Err(ProviderError::Api {
                status: 400,
                message: format!(
                    "Vector dimension {} does not match the dimension of the index {}",
                    bad.values.len(),
                    self.dimension
                ),
            });
        }

        let mut stored = self.records.write().map_err(|e| ProviderError::Api {
            status: 500,
            message: format!("Failed to acquire write lock: {}", e),
        })?;
        let upserted_count = records.len() as u64;
        for record in records {
            stored.insert(record.id.clone(), record);
        }

        Ok(UpsertResponse { upserted_count })
    }

    async fn query(&self, request: QueryRequest) -> ProviderResult<QueryResponse> {
        lock(&self.queries).push(request.clone());
        self.check_failure(MockOperation::Query)?;

        if let Some(matches) = lock(&self.canned_matches).clone() {
            return Ok(QueryResponse {
                matches: Some(matches),
            });
        }

        let stored = self.records.read().map_err(|e| ProviderError::Api {
            status: 500,
            message: format!("Failed to acquire read lock: {}", e),
        })?;

        let mut matches: Vec<QueryMatch> = stored
            .values()
            .map(|r| QueryMatch {
                id: r.id.clone(),
                score: cosine_similarity(&request.vector, &r.values),
                metadata: if request.include_metadata {
                    r.metadata.clone()
                } else {
                    None
                },
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(request.top_k);

        Ok(QueryResponse {
            matches: if matches.is_empty() {
                None
            } else {
                Some(matches)
            },
        })
    }

    async fn delete_one(&self, id: &str) -> ProviderResult<()> {
        lock(&self.deletes).push(id.to_string());
        self.check_failure(MockOperation::Delete)?;

        let removed = self
            .records
            .write()
            .map_err(|e| ProviderError::Api {
                status: 500,
                message: format!("Failed to acquire write lock: {}", e),
            })?
            .remove(id);

        if removed.is_none() && self.strict_deletes {
            return Err(ProviderError::Api {
                status: 404,
                message: format!("Vector '{}' not found", id),
            });
        }
        Ok(())
    }

    async fn describe_index_stats(&self) -> ProviderResult<IndexStats> {
        self.check_failure(MockOperation::Stats)?;

        let count = self.record_count() as u64;
        let mut stats = IndexStats {
            dimension: Some(self.dimension as u32),
            total_vector_count: count,
            index_fullness: Some(0.0),
            ..Default::default()
        };
        stats.namespaces.insert(
            String::new(),
            NamespaceStats {
                vector_count: count,
            },
        );
        Ok(stats)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cosine similarity, 0.0 when either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

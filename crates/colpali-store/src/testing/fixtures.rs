//! Test fixtures and builders for common test scenarios.

use crate::embedding::EMBEDDING_DIMENSION;
use crate::types::{Document, Embedding, Metadata, QueryMatch, VectorRecord};

/// API key accepted by [`MockPineconeServer`](super::MockPineconeServer).
pub const TEST_API_KEY: &str = "test-api-key";

/// Index name used throughout the tests.
pub const TEST_INDEX: &str = "test-index";

/// A full-dimension vector with a single 1.0 at `axis`.
pub fn unit_vector(axis: usize) -> Embedding {
    let mut v = vec![0.0; EMBEDDING_DIMENSION];
    v[axis % EMBEDDING_DIMENSION] = 1.0;
    v
}

/// A record on axis 0 with one metadata entry.
pub fn record(id: &str, key: &str, value: &str) -> VectorRecord {
    let mut metadata = Metadata::new();
    metadata.insert(key.to_string(), value.into());
    VectorRecord {
        id: id.to_string(),
        values: unit_vector(0),
        metadata: Some(metadata),
    }
}

/// `count` matches with descending scores and a `rank` metadata field.
pub fn matches(count: usize) -> Vec<QueryMatch> {
    (0..count)
        .map(|i| {
            let mut metadata = Metadata::new();
            metadata.insert("rank".to_string(), (i as i64).into());
            QueryMatch {
                id: format!("match-{}", i),
                score: 0.99 - i as f32 * 0.1,
                metadata: Some(metadata),
            }
        })
        .collect()
}

/// The document used in single-document scenarios.
pub fn colpali_document() -> Document {
    Document::new("doc1", "ColPali is a model.").with_field("source", "demo")
}

//! Core types for documents, records, and search results.
//!
//! Wire-facing types use Pinecone's camelCase field names so they can be sent
//! to and read from the data plane without an intermediate mapping layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A fixed-length embedding vector.
pub type Embedding = Vec<f32>;

/// Open key-value metadata attached to a document or record.
pub type Metadata = BTreeMap<String, MetadataValue>;

// ─────────────────────────────────────────────────────────────────────────────
// Metadata values
// ─────────────────────────────────────────────────────────────────────────────

/// A JSON-like metadata value.
///
/// Serialized untagged, so `{"category": "test", "page": 3}` round-trips as
/// plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<MetadataValue>),
    Map(Metadata),
}

impl MetadataValue {
    /// Get the value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a number, if it is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the value as a bool, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataValue::Null => write!(f, "null"),
            MetadataValue::Bool(b) => write!(f, "{}", b),
            MetadataValue::Number(n) => write!(f, "{}", n),
            MetadataValue::String(s) => write!(f, "{}", s),
            // Composite values print as compact JSON
            other => {
                let json = serde_json::to_string(other).map_err(|_| std::fmt::Error)?;
                write!(f, "{}", json)
            }
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::String(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::String(s)
    }
}

impl From<f64> for MetadataValue {
    fn from(n: f64) -> Self {
        MetadataValue::Number(n)
    }
}

impl From<i64> for MetadataValue {
    fn from(n: i64) -> Self {
        MetadataValue::Number(n as f64)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Bool(b)
    }
}

impl From<Metadata> for MetadataValue {
    fn from(m: Metadata) -> Self {
        MetadataValue::Map(m)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Documents and results
// ─────────────────────────────────────────────────────────────────────────────

/// A caller-supplied document to embed and store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique, caller-assigned identifier.
    pub id: String,
    /// Text to embed. Also stored in the record metadata under `text`.
    pub text: String,
    /// Optional metadata forwarded to the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Document {
    /// Create a document without metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: None,
        }
    }

    /// Attach metadata, replacing any already set.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Add a single metadata entry.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata
            .get_or_insert_with(Metadata::new)
            .insert(key.into(), value.into());
        self
    }
}

/// A single similarity search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    /// Provider-defined similarity score; higher is more similar.
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl SearchResult {
    /// Look up a metadata field on this result.
    pub fn field(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider wire types
// ─────────────────────────────────────────────────────────────────────────────

/// A record as sent to the provider in an upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Embedding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Acknowledgement of an upsert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResponse {
    #[serde(default)]
    pub upserted_count: u64,
}

/// A nearest-neighbor query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub vector: Embedding,
    pub top_k: usize,
    pub include_metadata: bool,
}

impl QueryRequest {
    /// Create a query that includes metadata in the matches.
    pub fn new(vector: Embedding, top_k: usize) -> Self {
        Self {
            vector,
            top_k,
            include_metadata: true,
        }
    }
}

/// A single raw match as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl From<QueryMatch> for SearchResult {
    fn from(m: QueryMatch) -> Self {
        SearchResult {
            id: m.id,
            score: m.score,
            metadata: m.metadata,
        }
    }
}

/// The provider's answer to a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Absent when the provider reports no matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<QueryMatch>>,
}

/// Per-namespace statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceStats {
    #[serde(default)]
    pub vector_count: u64,
}

/// Provider-reported index statistics, kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<u32>,
    #[serde(default)]
    pub total_vector_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_fullness: Option<f32>,
    #[serde(default)]
    pub namespaces: BTreeMap<String, NamespaceStats>,
    /// Any other fields the provider includes.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_value_untagged_json() {
        let json = r#"{"category":"test","page":3,"draft":false,"note":null,"tags":["a","b"],"nested":{"k":"v"}}"#;
        let metadata: Metadata = serde_json::from_str(json).unwrap();

        assert_eq!(metadata["category"], MetadataValue::from("test"));
        assert_eq!(metadata["page"].as_f64(), Some(3.0));
        assert_eq!(metadata["draft"].as_bool(), Some(false));
        assert_eq!(metadata["note"], MetadataValue::Null);
        assert!(matches!(metadata["tags"], MetadataValue::List(ref l) if l.len() == 2));
        assert!(matches!(metadata["nested"], MetadataValue::Map(_)));
    }

    #[test]
    fn test_metadata_value_display() {
        assert_eq!(MetadataValue::from("technical").to_string(), "technical");
        assert_eq!(MetadataValue::from(2.5).to_string(), "2.5");
        assert_eq!(MetadataValue::Null.to_string(), "null");

        let list = MetadataValue::List(vec!["a".into(), "b".into()]);
        assert_eq!(list.to_string(), r#"["a","b"]"#);
    }

    #[test]
    fn test_document_builder() {
        let doc = Document::new("doc1", "ColPali is a model.")
            .with_field("source", "demo")
            .with_field("page", 1_i64);

        let metadata = doc.metadata.unwrap();
        assert_eq!(metadata["source"].as_str(), Some("demo"));
        assert_eq!(metadata["page"].as_f64(), Some(1.0));
    }

    #[test]
    fn test_query_request_wire_format() {
        let request = QueryRequest::new(vec![0.1, 0.2], 5);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["topK"], 5);
        assert_eq!(json["includeMetadata"], true);
        assert_eq!(json["vector"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_query_response_without_matches() {
        let response: QueryResponse = serde_json::from_str(r#"{"namespace":""}"#).unwrap();
        assert!(response.matches.is_none());
    }

    #[test]
    fn test_index_stats_keeps_unknown_fields() {
        let json = r#"{
            "namespaces": {"": {"vectorCount": 3}},
            "dimension": 1024,
            "indexFullness": 0.0,
            "totalVectorCount": 3,
            "metric": "cosine"
        }"#;
        let stats: IndexStats = serde_json::from_str(json).unwrap();

        assert_eq!(stats.dimension, Some(1024));
        assert_eq!(stats.total_vector_count, 3);
        assert_eq!(stats.namespaces[""].vector_count, 3);
        assert_eq!(stats.extra["metric"], "cosine");
    }
}

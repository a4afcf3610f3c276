//! Pinecone provider implementation.
//!
//! Talks to Pinecone's REST API: the control plane resolves an index name to
//! its data-plane host, and every data-plane call goes straight to that host.
//! Requests are not retried; failures are mapped to [`ProviderError`] and
//! returned to the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result, VectorDbError};
use crate::provider::{ProviderResult, SharedIndex, VectorIndex, VectorProvider};
use crate::types::{IndexStats, QueryRequest, QueryResponse, UpsertResponse, VectorRecord};

/// Environment variable holding the Pinecone API key.
pub const API_KEY_ENV: &str = "PINECONE_API_KEY";

/// Default Pinecone control plane URL.
const DEFAULT_CONTROL_PLANE_URL: &str = "https://api.pinecone.io";

/// Default API version sent with every request.
const DEFAULT_API_VERSION: &str = "2025-01";

/// Default timeout for requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "Api-Key";

/// Header carrying the API version.
const API_VERSION_HEADER: &str = "X-Pinecone-API-Version";

/// Configuration for the Pinecone provider.
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Base URL of the control plane.
    pub control_plane_url: String,

    /// Value of the API version header.
    pub api_version: String,

    /// Namespace for all data-plane calls (Pinecone's default when `None`).
    pub namespace: Option<String>,

    /// Request timeout.
    pub timeout: Duration,
}

impl PineconeConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            control_plane_url: DEFAULT_CONTROL_PLANE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            namespace: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create config from environment variable.
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(VectorDbError::Configuration(format!(
                "{} environment variable is required",
                API_KEY_ENV
            ))),
        }
    }

    /// Set a custom control plane URL.
    pub fn with_control_plane_url(mut self, url: impl Into<String>) -> Self {
        self.control_plane_url = url.into();
        self
    }

    /// Set the API version header value.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Scope data-plane calls to a namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Pinecone API provider.
pub struct PineconeProvider {
    client: Client,
    config: Arc<PineconeConfig>,
}

impl PineconeProvider {
    /// Create a new Pinecone provider with the given configuration.
    pub fn new(config: PineconeConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(VectorDbError::Configuration(
                "Pinecone API key must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                VectorDbError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Create a provider from environment configuration.
    pub fn from_env() -> Result<Self> {
        Self::new(PineconeConfig::from_env()?)
    }

    /// Build the describe-index endpoint URL.
    fn describe_index_url(&self, name: &str) -> String {
        format!(
            "{}/indexes/{}",
            self.config.control_plane_url.trim_end_matches('/'),
            name
        )
    }
}

#[async_trait]
impl VectorProvider for PineconeProvider {
    async fn index(&self, name: &str) -> ProviderResult<SharedIndex> {
        let url = self.describe_index_url(name);
        tracing::debug!(index = name, url = %url, "Resolving Pinecone index");

        let response = add_headers(self.client.get(&url), &self.config)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Pinecone request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::IndexNotFound(name.to_string()));
        }
        let response = check_status(response).await?;

        let description: IndexDescription = response
            .json()
            .await
            .map_err(|e| ProviderError::Serialization(format!("Failed to parse response: {}", e)))?;

        tracing::debug!(
            index = %description.name,
            host = %description.host,
            dimension = ?description.dimension,
            "Resolved Pinecone index"
        );

        Ok(Arc::new(PineconeIndex {
            client: self.client.clone(),
            config: Arc::clone(&self.config),
            base_url: host_url(&description.host),
        }))
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}

/// Data-plane handle for one Pinecone index.
pub struct PineconeIndex {
    client: Client,
    config: Arc<PineconeConfig>,
    base_url: String,
}

impl PineconeIndex {
    /// POST a JSON body to a data-plane path and decode the answer.
    async fn post<B, T>(&self, path: &str, body: &B) -> ProviderResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned + Send,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = add_headers(self.client.post(&url), &self.config)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Pinecone request failed: {}", e)))?;

        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ProviderError::Serialization(format!("Failed to parse response: {}", e)))
    }

    fn namespace(&self) -> Option<&str> {
        self.config.namespace.as_deref()
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: Vec<VectorRecord>) -> ProviderResult<UpsertResponse> {
        let body = UpsertBody {
            vectors: &records,
            namespace: self.namespace(),
        };
        self.post("/vectors/upsert", &body).await
    }

    async fn query(&self, request: QueryRequest) -> ProviderResult<QueryResponse> {
        let body = QueryBody {
            request: &request,
            namespace: self.namespace(),
        };
        self.post("/query", &body).await
    }

    async fn delete_one(&self, id: &str) -> ProviderResult<()> {
        let body = DeleteBody {
            ids: [id],
            namespace: self.namespace(),
        };
        let _: serde_json::Value = self.post("/vectors/delete", &body).await?;
        Ok(())
    }

    async fn describe_index_stats(&self) -> ProviderResult<IndexStats> {
        self.post("/describe_index_stats", &serde_json::json!({}))
            .await
    }
}

/// Add authentication and version headers to a request.
fn add_headers(
    builder: reqwest::RequestBuilder,
    config: &PineconeConfig,
) -> reqwest::RequestBuilder {
    builder
        .header(API_KEY_HEADER, &config.api_key)
        .header(API_VERSION_HEADER, &config.api_version)
        .header(header::CONTENT_TYPE, "application/json")
}

/// Turn a non-success response into a [`ProviderError`].
async fn check_status(response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(ProviderError::Unauthorized(message))
        }
        _ => Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        }),
    }
}

/// Pull the human-readable message out of a Pinecone error body.
///
/// The control plane nests it under `error.message`, the data plane puts it
/// at the top level. Anything else is returned as-is.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };

    value
        .pointer("/error/message")
        .or_else(|| value.get("message"))
        .and_then(|m| m.as_str())
        .map(String::from)
        .unwrap_or_else(|| body.to_string())
}

/// Index hosts come back bare (`name-abc.svc.pinecone.io`); default to https.
fn host_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pinecone API Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct IndexDescription {
    name: String,
    host: String,
    #[serde(default)]
    dimension: Option<u32>,
}

#[derive(Debug, Serialize)]
struct UpsertBody<'a> {
    vectors: &'a [VectorRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    #[serde(flatten)]
    request: &'a QueryRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeleteBody<'a> {
    ids: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

//! HTTP mock server for Pinecone integration testing.
//!
//! Serves the control-plane `GET /indexes/{name}` route and the four
//! data-plane routes the provider uses, backed by a [`MockIndex`]. The
//! describe response advertises the server itself as the index host, so a
//! [`PineconeProvider`](crate::PineconeProvider) pointed at [`url`](MockPineconeServer::url)
//! exercises the full HTTP cycle.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::ProviderError;
use crate::provider::{MockIndex, VectorIndex};
use crate::testing::fixtures::TEST_API_KEY;
use crate::types::{QueryRequest, VectorRecord};

struct ServerState {
    index_name: String,
    base_url: String,
    index: Arc<MockIndex>,
    namespaces: Mutex<Vec<String>>,
}

/// An HTTP mock server for the Pinecone REST API.
pub struct MockPineconeServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MockPineconeServer {
    /// Start a server exposing one index on a random available port.
    pub async fn start(index_name: &str) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Failed to get local address");

        let state = Arc::new(ServerState {
            index_name: index_name.to_string(),
            base_url: format!("http://{}", addr),
            index: Arc::new(MockIndex::new()),
            namespaces: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/indexes/{name}", get(handle_describe_index))
            .route("/vectors/upsert", post(handle_upsert))
            .route("/query", post(handle_query))
            .route("/vectors/delete", post(handle_delete))
            .route("/describe_index_stats", post(handle_stats))
            .with_state(Arc::clone(&state));

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .ok();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Get the server's base URL.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the index backing the data-plane routes.
    pub fn mock_index(&self) -> Arc<MockIndex> {
        Arc::clone(&self.state.index)
    }

    /// Namespaces received in data-plane bodies, in call order.
    pub fn namespaces_seen(&self) -> Vec<String> {
        self.state.namespaces.lock().unwrap().clone()
    }

    /// Shutdown the server.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

#[derive(Deserialize)]
struct UpsertRequestBody {
    vectors: Vec<VectorRecord>,
    namespace: Option<String>,
}

#[derive(Deserialize)]
struct QueryRequestBody {
    #[serde(flatten)]
    request: QueryRequest,
    namespace: Option<String>,
}

#[derive(Deserialize)]
struct DeleteRequestBody {
    ids: Vec<String>,
    namespace: Option<String>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("Api-Key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == TEST_API_KEY)
}

fn unauthorized() -> Response {
    let body = serde_json::json!({
        "error": {"code": "UNAUTHENTICATED", "message": "Invalid API Key"},
        "status": 401
    });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

fn provider_error(error: ProviderError) -> Response {
    let (status, message) = match error {
        ProviderError::Api { status, message } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message,
        ),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    };
    let body = serde_json::json!({"code": 3, "message": message, "details": []});
    (status, Json(body)).into_response()
}

fn record_namespace(state: &ServerState, namespace: Option<String>) {
    if let Some(ns) = namespace {
        state.namespaces.lock().unwrap().push(ns);
    }
}

/// Handle GET /indexes/{name}
async fn handle_describe_index(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if name != state.index_name {
        let body = serde_json::json!({
            "error": {"code": "NOT_FOUND", "message": format!("Resource {} not found", name)},
            "status": 404
        });
        return (StatusCode::NOT_FOUND, Json(body)).into_response();
    }

    let body = serde_json::json!({
        "name": state.index_name,
        "dimension": crate::embedding::EMBEDDING_DIMENSION,
        "metric": "cosine",
        "host": state.base_url,
        "status": {"ready": true, "state": "Ready"}
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// Handle POST /vectors/upsert
async fn handle_upsert(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<UpsertRequestBody>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    record_namespace(&state, body.namespace);
    match state.index.upsert(body.vectors).await {
        Ok(ack) => (StatusCode::OK, Json(ack)).into_response(),
        Err(e) => provider_error(e),
    }
}

/// Handle POST /query
async fn handle_query(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<QueryRequestBody>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    record_namespace(&state, body.namespace);
    match state.index.query(body.request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => provider_error(e),
    }
}

/// Handle POST /vectors/delete
async fn handle_delete(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<DeleteRequestBody>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    record_namespace(&state, body.namespace);
    for id in &body.ids {
        if let Err(e) = state.index.delete_one(id).await {
            return provider_error(e);
        }
    }
    (StatusCode::OK, Json(serde_json::json!({}))).into_response()
}

/// Handle POST /describe_index_stats
async fn handle_stats(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    match state.index.describe_index_stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => provider_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_mock_server_start_and_shutdown() {
        let server = MockPineconeServer::start(fixtures::TEST_INDEX).await;
        assert!(server.url().starts_with("http://127.0.0.1:"));
        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_mock_server_describe_index() {
        let server = MockPineconeServer::start(fixtures::TEST_INDEX).await;

        let body: serde_json::Value = reqwest::Client::new()
            .get(format!("{}/indexes/{}", server.url(), fixtures::TEST_INDEX))
            .header("Api-Key", fixtures::TEST_API_KEY)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["host"], server.url());
        assert_eq!(body["dimension"], 1024);
        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_mock_server_requires_api_key() {
        let server = MockPineconeServer::start(fixtures::TEST_INDEX).await;

        let response = reqwest::Client::new()
            .post(format!("{}/describe_index_stats", server.url()))
            .json(&serde_json::json!({}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 401);
        server.shutdown().await;
    }
}

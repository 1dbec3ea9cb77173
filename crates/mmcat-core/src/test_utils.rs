//! Test utilities for mmcat-core
//!
//! A mock AI provider that speaks both the OpenAI chat completions and the
//! Anthropic Messages wire formats, so the real HTTP backends can be tested
//! without network access.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::ai::keyword_reply;

/// How the mock provider answers completion requests
#[derive(Debug, Clone, Default)]
pub enum ProviderReply {
    /// Keyword categorization of the `{id, detail}` payload
    #[default]
    Keyword,
    /// This text as the completion content
    Text(String),
    /// An error status with this body
    Error(u16, String),
}

/// A request the mock provider received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Default)]
struct ServerState {
    reply: ProviderReply,
    requests: Vec<RecordedRequest>,
}

type SharedState = Arc<Mutex<ServerState>>;

/// Mock AI provider server for testing
pub struct MockProviderServer {
    addr: SocketAddr,
    state: SharedState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockProviderServer {
    /// Start the mock server on an available port with keyword replies
    pub async fn start() -> Self {
        Self::start_with(ProviderReply::Keyword).await
    }

    /// Start the mock server with a specific reply mode
    pub async fn start_with(reply: ProviderReply) -> Self {
        let state: SharedState = Arc::new(Mutex::new(ServerState {
            reply,
            requests: Vec::new(),
        }));

        let app = Router::new()
            .route("/v1/chat/completions", post(handle_chat_completions))
            .route("/v1/messages", post(handle_messages))
            .route("/v1/models", get(handle_models))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL of the server (without `/v1`)
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Base URL for OpenAI-compatible backends
    pub fn openai_url(&self) -> String {
        format!("{}/v1", self.url())
    }

    /// Change how later requests are answered
    pub fn set_reply(&self, reply: ProviderReply) {
        self.state.lock().unwrap().reply = reply;
    }

    /// Completion requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockProviderServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Record the request and produce the completion text (or an error response)
fn complete(
    state: &SharedState,
    path: &str,
    headers: HeaderMap,
    body: Value,
    user: &str,
) -> std::result::Result<String, Response> {
    let mut state = state.lock().unwrap();
    state.requests.push(RecordedRequest {
        path: path.to_string(),
        headers,
        body,
    });

    match &state.reply {
        ProviderReply::Keyword => keyword_reply(user)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()).into_response()),
        ProviderReply::Text(text) => Ok(text.clone()),
        ProviderReply::Error(status, message) => Err((
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message.clone(),
        )
            .into_response()),
    }
}

/// OpenAI chat completions endpoint
async fn handle_chat_completions(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let user = body["messages"]
        .as_array()
        .and_then(|msgs| msgs.iter().rev().find(|m| m["role"] == "user"))
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_string();
    let model = body["model"].clone();

    match complete(&state, "/v1/chat/completions", headers, body, &user) {
        Ok(content) => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        Err(response) => response,
    }
}

/// Anthropic Messages endpoint
async fn handle_messages(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let user = body["messages"]
        .as_array()
        .and_then(|msgs| msgs.last())
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_string();
    let model = body["model"].clone();

    match complete(&state, "/v1/messages", headers, body, &user) {
        Ok(text) => Json(json!({
            "id": "msg_mock",
            "type": "message",
            "role": "assistant",
            "model": model,
            "content": [{"type": "text", "text": text}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 1, "output_tokens": 1}
        }))
        .into_response(),
        Err(response) => response,
    }
}

/// Model listing endpoint (health check for both API shapes)
async fn handle_models() -> Json<Value> {
    Json(json!({
        "object": "list",
        "data": [{"id": "mock-model", "object": "model"}]
    }))
}

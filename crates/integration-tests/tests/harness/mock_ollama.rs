//! Mock Ollama backend for integration tests
//!
//! Serves the native Ollama API with canned responses, including true
//! chunked streaming so decoder behavior is exercised frame by frame.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use bytes::Bytes;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Mock Ollama server that returns predictable responses
pub struct MockOllama {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    chat_count: AtomicU32,
    generate_count: AtomicU32,
    embed_count: AtomicU32,
    /// Number of requests to fail with 500 before succeeding (0 = never)
    fail_count: AtomicU32,
    /// Response text folded into chat/generate payloads
    reply: String,
    /// Verbatim response body overriding all canned payloads (if set)
    raw_body: Option<String>,
}

impl MockOllama {
    /// Start the mock server with a default reply
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner("Hello from mock Ollama", 0, None).await
    }

    /// Start a mock server replying with the given text
    pub async fn start_with_reply(reply: &str) -> anyhow::Result<Self> {
        Self::start_inner(reply, 0, None).await
    }

    /// Start a mock server that fails the first `n` requests with 500
    pub async fn start_failing(n: u32) -> anyhow::Result<Self> {
        Self::start_inner("Hello from mock Ollama", n, None).await
    }

    /// Start a mock server returning `body` verbatim on every endpoint
    pub async fn start_with_raw(body: &str) -> anyhow::Result<Self> {
        Self::start_inner("", 0, Some(body.to_owned())).await
    }

    async fn start_inner(reply: &str, fail_count: u32, raw_body: Option<String>) -> anyhow::Result<Self> {
        super::init_tracing();

        let state = Arc::new(MockState {
            chat_count: AtomicU32::new(0),
            generate_count: AtomicU32::new(0),
            embed_count: AtomicU32::new(0),
            fail_count: AtomicU32::new(fail_count),
            reply: reply.to_owned(),
            raw_body,
        });

        let app = Router::new()
            .route("/api/chat", routing::post(handle_chat))
            .route("/api/generate", routing::post(handle_generate))
            .route("/api/embeddings", routing::post(handle_embeddings))
            .route("/api/embed", routing::post(handle_embed))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for pointing a client at the mock
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of chat requests received
    pub fn chat_count(&self) -> u32 {
        self.state.chat_count.load(Ordering::Relaxed)
    }

    /// Number of generate requests received
    pub fn generate_count(&self) -> u32 {
        self.state.generate_count.load(Ordering::Relaxed)
    }

    /// Number of embedding requests received (both endpoints)
    pub fn embed_count(&self) -> u32 {
        self.state.embed_count.load(Ordering::Relaxed)
    }
}

impl Drop for MockOllama {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// -- Wire types matching the Ollama native API --

#[derive(Debug, Deserialize)]
struct ChatRequest {
    model: String,
    #[allow(dead_code)]
    messages: Vec<serde_json::Value>,
    #[serde(default)]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    #[allow(dead_code)]
    prompt: String,
    #[serde(default)]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct EmbedRequest {
    #[allow(dead_code)]
    model: String,
    input: Vec<String>,
}

// -- Handlers --

fn intercept(state: &MockState) -> Option<Response> {
    let remaining = state.fail_count.load(Ordering::Relaxed);
    if remaining > 0 {
        state.fail_count.fetch_sub(1, Ordering::Relaxed);
        return Some(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "mock server intentional failure"})),
            )
                .into_response(),
        );
    }
    state
        .raw_body
        .as_ref()
        .map(|body| (StatusCode::OK, body.clone()).into_response())
}

/// Serve ndjson lines as separate HTTP chunks
///
/// A short pause between frames keeps hyper from coalescing them, so the
/// client decodes one line per network chunk the way a live server streams.
fn streaming_body(lines: Vec<String>) -> Response {
    let frames = futures_util::stream::iter(lines.into_iter().map(Bytes::from)).then(|frame| async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok::<_, Infallible>(frame)
    });

    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(frames),
    )
        .into_response()
}

/// Split a reply into streamable pieces whose concatenation is the reply
fn pieces(reply: &str) -> Vec<&str> {
    reply.split_inclusive(' ').collect()
}

async fn handle_chat(State(state): State<Arc<MockState>>, Json(req): Json<ChatRequest>) -> Response {
    state.chat_count.fetch_add(1, Ordering::Relaxed);
    if let Some(response) = intercept(&state) {
        return response;
    }

    if req.stream {
        let mut lines: Vec<String> = pieces(&state.reply)
            .into_iter()
            .map(|piece| {
                format!(
                    "{}\n",
                    json!({
                        "model": req.model,
                        "message": {"role": "assistant", "content": piece},
                        "done": false,
                    })
                )
            })
            .collect();
        lines.push(format!(
            "{}\n",
            json!({
                "model": req.model,
                "message": {"role": "assistant", "content": ""},
                "done": true,
                "prompt_eval_count": 10,
                "eval_count": 5,
            })
        ));
        return streaming_body(lines);
    }

    Json(json!({
        "model": req.model,
        "message": {"role": "assistant", "content": state.reply},
        "done": true,
        "prompt_eval_count": 10,
        "eval_count": 5,
    }))
    .into_response()
}

async fn handle_generate(State(state): State<Arc<MockState>>, Json(req): Json<GenerateRequest>) -> Response {
    state.generate_count.fetch_add(1, Ordering::Relaxed);
    if let Some(response) = intercept(&state) {
        return response;
    }

    if req.stream {
        let mut lines: Vec<String> = pieces(&state.reply)
            .into_iter()
            .map(|piece| format!("{}\n", json!({"model": req.model, "response": piece, "done": false})))
            .collect();
        lines.push(format!(
            "{}\n",
            json!({
                "model": req.model,
                "response": "",
                "done": true,
                "prompt_eval_count": 10,
                "eval_count": 5,
            })
        ));
        return streaming_body(lines);
    }

    Json(json!({
        "model": req.model,
        "response": state.reply,
        "done": true,
        "prompt_eval_count": 10,
        "eval_count": 5,
    }))
    .into_response()
}

async fn handle_embeddings(State(state): State<Arc<MockState>>) -> Response {
    state.embed_count.fetch_add(1, Ordering::Relaxed);
    if let Some(response) = intercept(&state) {
        return response;
    }

    Json(json!({"embedding": [0.1, 0.2, 0.3]})).into_response()
}

async fn handle_embed(State(state): State<Arc<MockState>>, Json(req): Json<EmbedRequest>) -> Response {
    state.embed_count.fetch_add(1, Ordering::Relaxed);
    if let Some(response) = intercept(&state) {
        return response;
    }

    let rows: Vec<Vec<f32>> = req.input.iter().map(|_| vec![0.5, 0.25]).collect();
    Json(json!({"embeddings": rows})).into_response()
}

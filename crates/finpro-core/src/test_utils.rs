//! Test utilities for finpro-core
//!
//! This module provides a mock Gemini server that speaks the
//! `generateContent` API, replays scripted responses and records every
//! request it receives. Used by the integration tests and handy for trying
//! the CLI without an API key.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// One scripted HTTP response
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl MockResponse {
    /// A successful reply whose first candidate carries `text`
    pub fn text(text: &str) -> Self {
        Self::raw(200, gemini_envelope(text).to_string())
    }

    /// A successful reply with no candidates
    pub fn no_candidates() -> Self {
        Self::raw(200, json!({ "candidates": [] }).to_string())
    }

    /// An API error with Gemini's error shape
    pub fn error(status: u16) -> Self {
        Self::raw(
            status,
            json!({ "error": { "code": status, "message": "mock error" } }).to_string(),
        )
    }

    /// Any status and body
    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }

    /// Wait before answering
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A request the mock server received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Path after `/v1beta/models/`, e.g. `gemini-2.5-flash:generateContent`
    pub path: String,
    /// Value of the `x-goog-api-key` header
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct MockState {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Mock Gemini server for testing and development
pub struct MockGeminiServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGeminiServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route(
                "/v1beta/models/*rest",
                get(handle_model).post(handle_generate),
            )
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

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queue the response for the next `generateContent` call
    ///
    /// With nothing queued the server answers with a short canned text.
    pub fn push(&self, response: MockResponse) {
        self.state.responses.lock().unwrap().push_back(response);
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Number of `generateContent` calls received
    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn gemini_envelope(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

/// Model metadata endpoint (health check)
async fn handle_model(Path(rest): Path<String>) -> Json<Value> {
    Json(json!({ "name": format!("models/{}", rest), "displayName": rest }))
}

/// `generateContent` endpoint
async fn handle_generate(
    State(state): State<Arc<MockState>>,
    Path(rest): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.requests.lock().unwrap().push(RecordedRequest {
        path: rest,
        api_key,
        body,
    });

    let scripted = state.responses.lock().unwrap().pop_front();
    let response =
        scripted.unwrap_or_else(|| MockResponse::text("Fluxo de caixa saudável."));

    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
        .into_response()
}

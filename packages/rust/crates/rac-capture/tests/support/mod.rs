//! Local HTTP server standing in for article sites and analyzer APIs.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

pub const ARTICLE_HTML: &str = r#"<html>
<head>
  <title>Event Sourcing Basics</title>
  <meta name="author" content="Ada Lovelace">
  <meta property="article:published_time" content="2024-03-01">
</head>
<body>
  <nav>Menu</nav>
  <article>
    <h2>Why events</h2>
    <p>Store <strong>events</strong>, not state.</p>
    <pre><code class="language-rust">let total = events.len();</code></pre>
  </article>
</body>
</html>"#;

pub const ANALYSIS_REPLY: &str = "## Metadata
Technologies: [Kafka, EventStoreDB]
Programming_Languages: [Rust]
Tags: [Event Sourcing, architecture]
Key_Concepts: [event-log, projection]
Code_Examples: yes
Difficulty_Level: Advanced
Summary: Persist every change as an event.

## Content
## Why events

Store **events**, not state.
";

/// One request seen by an analyzer route.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub api_key: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Default)]
pub struct MockState {
    flaky_hits: AtomicUsize,
    missing_hits: AtomicUsize,
    /// Status returned by analyzer routes; 0 means 200 with [`ANALYSIS_REPLY`].
    analyzer_status: AtomicU16,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockState {
    pub fn flaky_hits(&self) -> usize {
        self.flaky_hits.load(Ordering::SeqCst)
    }

    pub fn missing_hits(&self) -> usize {
        self.missing_hits.load(Ordering::SeqCst)
    }

    pub fn fail_analyzer_with(&self, status: u16) {
        self.analyzer_status.store(status, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, path: String, headers: &HeaderMap, body: Value) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            path,
            api_key: header("x-goog-api-key"),
            authorization: header("authorization"),
            body,
        });
    }

    fn analyzer_failure(&self) -> Option<StatusCode> {
        match self.analyzer_status.load(Ordering::SeqCst) {
            0 => None,
            code => StatusCode::from_u16(code).ok(),
        }
    }
}

pub struct MockServer {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start the mock server, or `None` when sockets are not permitted.
pub async fn spawn_mock_server() -> Option<MockServer> {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/articles/{slug}", get(article))
        .route("/flaky", get(flaky))
        .route("/missing", get(missing))
        .route("/v1beta/models/{model}", post(gemini))
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(Arc::clone(&state));

    let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
            eprintln!("skipping capture server tests: local socket bind is not permitted");
            return None;
        }
        Err(err) => panic!("bind mock server: {err}"),
    };
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Some(MockServer {
        addr,
        state,
        handle,
    })
}

async fn article(Path(_slug): Path<String>) -> Html<&'static str> {
    Html(ARTICLE_HTML)
}

async fn flaky(State(state): State<Arc<MockState>>) -> Response {
    if state.flaky_hits.fetch_add(1, Ordering::SeqCst) == 0 {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    Html(ARTICLE_HTML).into_response()
}

async fn missing(State(state): State<Arc<MockState>>) -> StatusCode {
    state.missing_hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::NOT_FOUND
}

async fn gemini(
    State(state): State<Arc<MockState>>,
    Path(model): Path<String>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    state.record(format!("/v1beta/models/{model}"), &headers, body);
    if let Some(status) = state.analyzer_failure() {
        return (status, "quota exceeded").into_response();
    }
    axum::Json(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": ANALYSIS_REPLY}]}
        }]
    }))
    .into_response()
}

async fn chat_completions(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    state.record("/v1/chat/completions".to_string(), &headers, body);
    if let Some(status) = state.analyzer_failure() {
        return (status, "upstream unavailable").into_response();
    }
    axum::Json(json!({
        "choices": [{"message": {"role": "assistant", "content": ANALYSIS_REPLY}}]
    }))
    .into_response()
}

//! Shared test utilities for cadence integration tests.
//!
//! Provides an in-process mock of the content-generation backend. Each
//! test spawns its own instance on an ephemeral port, scripts per-route
//! responses, and inspects the requests the code under test produced.
//!
//! Routes are matched by exact path. A path with no scripted response
//! answers 404 so a test that forgot to script a route fails loudly.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::IntoResponse;
use tokio_util::sync::CancellationToken;

/// One request observed by the mock backend.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    /// Decoded query parameters in arrival order.
    pub query: Vec<(String, String)>,
    /// Raw request body rendered as text (multipart bodies included).
    pub body: String,
}

impl CapturedRequest {
    /// First query value for `key`, if present.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

struct ScriptedResponse {
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct MockState {
    captured: Mutex<Vec<CapturedRequest>>,
    responses: Mutex<HashMap<String, ScriptedResponse>>,
}

/// In-process mock backend server.
///
/// The server task shuts down when the value is dropped.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown: CancellationToken,
}

impl MockBackend {
    /// Bind an ephemeral port and start serving.
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock backend listener");
        let addr = listener.local_addr().expect("listener has a local addr");

        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await
                .expect("mock backend server failed");
        });

        Self {
            addr,
            state,
            shutdown,
        }
    }

    /// Base URL for pointing a client at this instance.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Script a 200 JSON response for an exact path (e.g.
    /// `"/extract_content"`).
    pub fn set_response(&self, path: &str, body: serde_json::Value) {
        self.set_status(path, 200, &body.to_string());
    }

    /// Script an arbitrary status + raw body for an exact path.
    pub fn set_status(&self, path: &str, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).expect("valid status code");
        self.state
            .responses
            .lock()
            .expect("responses lock poisoned")
            .insert(
                normalize_path(path),
                ScriptedResponse {
                    status,
                    body: body.to_owned(),
                },
            );
    }

    /// Every request captured so far, in arrival order.
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.state
            .captured
            .lock()
            .expect("capture lock poisoned")
            .clone()
    }

    /// Captured requests for one exact path.
    pub fn requests_for(&self, path: &str) -> Vec<CapturedRequest> {
        let path = normalize_path(path);
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Drop all captured requests.
    pub fn clear_requests(&self) {
        self.state
            .captured
            .lock()
            .expect("capture lock poisoned")
            .clear();
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> impl IntoResponse {
    let path = uri.path().to_owned();
    let captured = CapturedRequest {
        method: method.to_string(),
        path: path.clone(),
        query: parse_query(uri.query().unwrap_or("")),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    state
        .captured
        .lock()
        .expect("capture lock poisoned")
        .push(captured);

    let responses = state.responses.lock().expect("responses lock poisoned");
    let (status, body) = match responses.get(&path) {
        Some(scripted) => (scripted.status, scripted.body.clone()),
        None => (
            StatusCode::NOT_FOUND,
            format!(r#"{{"error": "no scripted response for {path}"}}"#),
        ),
    };
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    }
}

/// Decode an `application/x-www-form-urlencoded` query string: `+` means
/// space, then percent-escapes are resolved.
fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(k), decode_component(v))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let unplussed = raw.replace('+', " ");
    urlencoding::decode(&unplussed)
        .map(|cow| cow.into_owned())
        .unwrap_or(unplussed)
}

//! Mock management API for integration tests.
//!
//! Serves scripted bodies by path and records every request it receives.
//! Paths without a script answer 404.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One request as seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Clone)]
struct Scripted {
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<String, Scripted>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// A mock management API bound to an ephemeral port.
pub struct MockApi {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockApi {
    /// Start a new mock API on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(MockState::default());

        let router = Router::new().fallback(handle).with_state(state.clone());
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL for the API client.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer `path` with a JSON body.
    pub fn json(&self, path: &str, body: serde_json::Value) -> &Self {
        self.script(path, StatusCode::OK, "application/json", body.to_string())
    }

    /// Answer `path` with a status and plain-text body.
    pub fn text(&self, path: &str, status: StatusCode, body: &str) -> &Self {
        self.script(path, status, "text/plain", body.to_string())
    }

    fn script(
        &self,
        path: &str,
        status: StatusCode,
        content_type: &'static str,
        body: String,
    ) -> &Self {
        self.state.routes.lock().insert(
            path.to_string(),
            Scripted {
                status,
                content_type,
                body,
            },
        );
        self
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Paths of all requests received so far.
    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle(State(state): State<Arc<MockState>>, headers: HeaderMap, uri: Uri) -> Response {
    state.requests.lock().push(RecordedRequest {
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    let scripted = state.routes.lock().get(uri.path()).cloned();
    match scripted {
        Some(s) => (s.status, [(header::CONTENT_TYPE, s.content_type)], s.body).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

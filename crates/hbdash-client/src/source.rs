//! Transport seam for JSON GET requests.
//!
//! Probing only needs "GET this path, give me JSON". Keeping that behind a
//! trait lets the cycle run against the real HTTP client, a caching wrapper,
//! or a scripted mock in tests.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A GET against the management API: path plus query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiRequest {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    /// Add a query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Cache key: path followed by the query string.
    pub fn cache_key(&self) -> String {
        if self.params.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}

/// Something that can answer JSON GET requests.
pub trait JsonSource: Send + Sync {
    /// Issue one GET. No retries.
    fn get_json<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, ClientResult<Value>>;
}

/// Scripted source for tests.
///
/// Paths without a scripted answer fail with HTTP 404, like an API that does
/// not expose them.
#[derive(Debug, Default)]
pub struct MockJsonSource {
    /// Scripted answers by path.
    responses: Mutex<HashMap<String, ClientResult<Value>>>,
    /// Every request seen, in order.
    calls: Mutex<Vec<ApiRequest>>,
}

impl MockJsonSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` with `body`.
    pub fn with_response(self, path: &str, body: Value) -> Self {
        self.set_response(path, Ok(body));
        self
    }

    /// Fail `path` with `error`.
    pub fn with_error(self, path: &str, error: ClientError) -> Self {
        self.set_response(path, Err(error));
        self
    }

    pub fn set_response(&self, path: &str, response: ClientResult<Value>) {
        self.responses.lock().insert(path.to_string(), response);
    }

    /// Recorded requests.
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().clone()
    }

    /// Recorded request paths.
    pub fn call_paths(&self) -> Vec<String> {
        self.calls.lock().iter().map(|r| r.path.clone()).collect()
    }
}

impl JsonSource for MockJsonSource {
    fn get_json<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, ClientResult<Value>> {
        Box::pin(async move {
            self.calls.lock().push(request.clone());
            self.responses
                .lock()
                .get(&request.path)
                .cloned()
                .unwrap_or_else(|| {
                    Err(ClientError::Http {
                        status: 404,
                        url: request.path.clone(),
                        body: "Not Found".to_string(),
                    })
                })
        })
    }
}

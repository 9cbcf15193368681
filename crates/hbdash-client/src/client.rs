//! HTTP client for the bot management API.
//!
//! Plain GETs against `base_url + path` with an optional static bearer token.
//! One attempt per call; non-2xx answers are surfaced with their body text.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};
use crate::source::{ApiRequest, BoxFuture, JsonSource};

/// Management API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. "https://bots.example.com/api". Required.
    #[serde(default)]
    pub base_url: String,
    /// Static bearer token (empty or absent = no Authorization header).
    #[serde(default)]
    pub token: Option<String>,
    /// Verify TLS certificates. Default: true.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
    /// Per-request timeout in seconds. Default: 8.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Lifetime of cached responses within one refresh cycle. Default: 10.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_verify_tls() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    8
}

fn default_cache_ttl_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: None,
            verify_tls: default_verify_tls(),
            timeout_secs: default_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl ApiConfig {
    /// Token, if one is actually set.
    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Base URL without trailing slashes.
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Check the settings that make a request possible at all.
    pub fn validate(&self) -> ClientResult<()> {
        let base = self.trimmed_base_url();
        if base.is_empty() {
            return Err(ClientError::Config(
                "API base URL is empty. Set api.base_url or HBDASH_API__BASE_URL.".to_string(),
            ));
        }
        Url::parse(base)
            .map_err(|e| ClientError::Config(format!("Invalid API base URL {base:?}: {e}")))?;
        if self.timeout_secs == 0 {
            return Err(ClientError::Config(
                "api.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Client for the management API.
pub struct ApiClient {
    /// HTTP client with auth header, timeout and TLS policy baked in.
    client: Client,
    /// Base URL without trailing slash.
    base_url: String,
}

impl ApiClient {
    /// Create a client. Fails on an unset or malformed base URL.
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        if let Some(token) = config.bearer_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ClientError::Config(format!("Invalid API token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base_url = config.trimmed_base_url().to_string();
        info!(
            base_url = %base_url,
            verify_tls = config.verify_tls,
            authenticated = config.bearer_token().is_some(),
            "Management API client ready"
        );

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a path; leading slashes on `path` are optional.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `request` and decode the body as JSON.
    pub async fn fetch(&self, request: &ApiRequest) -> ClientResult<Value> {
        let url = self.url(&request.path);
        debug!(url = %url, params = ?request.params, "GET");

        let response = self
            .client
            .get(&url)
            .query(&request.params)
            .send()
            .await
            .map_err(|e| ClientError::Request {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Http {
                status: status.as_u16(),
                url,
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ClientError::Decode {
                url,
                reason: e.to_string(),
            })
    }
}

impl JsonSource for ApiClient {
    fn get_json<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, ClientResult<Value>> {
        Box::pin(self.fetch(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_empty_base_url_is_config_error() {
        let err = ApiClient::new(&config("  ")).err().unwrap();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_malformed_base_url_is_config_error() {
        assert!(matches!(
            config("not a url").validate(),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new(&config("http://localhost:8000/api/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/health"), "http://localhost:8000/api/health");
        assert_eq!(client.url("orders/open"), "http://localhost:8000/api/orders/open");
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let mut cfg = config("http://localhost");
        cfg.token = Some("   ".to_string());
        assert_eq!(cfg.bearer_token(), None);

        cfg.token = Some("abc".to_string());
        assert_eq!(cfg.bearer_token(), Some("abc"));
    }

    #[test]
    fn test_defaults_deserialize() {
        let cfg: ApiConfig = serde_json::from_str(r#"{"base_url": "http://x"}"#).unwrap();
        assert!(cfg.verify_tls);
        assert_eq!(cfg.timeout_secs, 8);
        assert_eq!(cfg.cache_ttl_secs, 10);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        let mut cfg = config("http://127.0.0.1:1");
        cfg.timeout_secs = 1;
        let client = ApiClient::new(&cfg).unwrap();

        let err = client.fetch(&ApiRequest::new("/health")).await.unwrap_err();
        assert!(matches!(err, ClientError::Request { .. }));
        assert!(err.to_string().contains("http://127.0.0.1:1/health"));
    }
}

//! Client error types.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP {status} for {url}: {body}")]
    Http { status: u16, url: String, body: String },

    #[error("Request failed: {url} -> {reason}")]
    Request { url: String, reason: String },

    #[error("Invalid JSON from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl ClientError {
    /// HTTP status code, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

//! Error types for hbdash-core.

use thiserror::Error;

/// Core error types.
///
/// Normalization never fails; these only come from building alias tables
/// out of user configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown logical field: {0}")]
    UnknownField(String),

    #[error("Alias list for {0} is empty")]
    EmptyAliases(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

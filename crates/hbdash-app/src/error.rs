//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API client error: {0}")]
    Client(#[from] hbdash_client::ClientError),

    #[error("Field alias error: {0}")]
    Core(#[from] hbdash_core::CoreError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] hbdash_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

//! Structured logging initialization.

use crate::error::{TelemetryError, TelemetryResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset and no level is configured.
const DEFAULT_FILTER: &str = "info,hbdash=debug";

/// Initialize structured logging.
///
/// `RUST_LOG` wins over `level`; `level` wins over the built-in default.
/// JSON output when `RUST_ENV=production`, pretty output otherwise.
pub fn init_logging(level: Option<&str>) -> TelemetryResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or(DEFAULT_FILTER)))
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log filter: {e}")))?;

    let is_production = std::env::var("RUST_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    let result = if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_target(true))
            .try_init()
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}


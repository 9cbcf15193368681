//! Prometheus metrics and structured logging for hbdash.
//!
//! - Structured logging with tracing (JSON in production, pretty otherwise)
//! - Prometheus metrics for probing, refresh cycles and panel sizes

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;

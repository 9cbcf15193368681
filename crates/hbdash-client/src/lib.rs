//! Management API access for hbdash.
//!
//! The backend's layout is not known up front. Each logical resource has an
//! ordered list of candidate paths, and `probe` walks that list until one of
//! them yields rows.
//!
//! - `ApiClient`: bearer-token HTTP client (reqwest)
//! - `JsonSource`: seam between probing and transport, with `MockJsonSource`
//! - `CachedSource`: per-cycle response cache keyed by path and query
//! - `Resource` / `CandidateList`: built-in candidate paths per resource

pub mod cache;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod probe;
pub mod source;

pub use cache::{CachedSource, ResponseCache};
pub use client::{ApiClient, ApiConfig};
pub use endpoints::{
    CandidateList, Resource, HEALTH_PATH, ORDER_COLUMNS, TRADES_LIMIT, TRADE_COLUMNS,
};
pub use error::{ClientError, ClientResult};
pub use probe::{probe, ProbeOutcome};
pub use source::{ApiRequest, BoxFuture, JsonSource, MockJsonSource};

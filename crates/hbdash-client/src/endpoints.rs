//! Logical resources and where they might live.

use std::fmt;

use crate::source::ApiRequest;

/// Health check path. A failure here ends the refresh cycle.
pub const HEALTH_PATH: &str = "/health";

/// Row limit requested from trade history endpoints.
pub const TRADES_LIMIT: u32 = 500;

/// Display columns for orders, in order, when present.
pub const ORDER_COLUMNS: [&str; 9] = [
    "id",
    "bot_id",
    "pair",
    "symbol",
    "side",
    "price",
    "size",
    "status",
    "created_at",
];

/// Display columns for trades, in order, when present.
pub const TRADE_COLUMNS: [&str; 11] = [
    "id",
    "bot_id",
    "pair",
    "symbol",
    "side",
    "price",
    "qty",
    "fee",
    "pnl",
    "ts",
    "timestamp",
];

/// Logical resources shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Health,
    Bots,
    Instances,
    Pnl,
    Orders,
    Trades,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Health => "health",
            Resource::Bots => "bots",
            Resource::Instances => "instances",
            Resource::Pnl => "pnl",
            Resource::Orders => "orders",
            Resource::Trades => "trades",
        }
    }

    /// Candidate paths, most likely first.
    pub fn paths(self) -> &'static [&'static str] {
        match self {
            Resource::Health => &[HEALTH_PATH],
            Resource::Bots => &["/bots"],
            Resource::Instances => &["/instances"],
            Resource::Pnl => &["/pnl", "/stats/pnl", "/performance/pnl"],
            Resource::Orders => &["/orders/open", "/orders", "/active_orders", "/bots/orders"],
            Resource::Trades => &["/trades", "/executions", "/fills"],
        }
    }

    /// Candidate requests including query parameters.
    pub fn candidates(self) -> CandidateList {
        let requests = self
            .paths()
            .iter()
            .map(|path| {
                let request = ApiRequest::new(*path);
                match self {
                    Resource::Trades => request.with_param("limit", TRADES_LIMIT),
                    _ => request,
                }
            })
            .collect();
        CandidateList::new(self.as_str(), requests)
    }

    /// Preferred display columns, if the resource has any.
    pub fn preferred_columns(self) -> &'static [&'static str] {
        match self {
            Resource::Orders => &ORDER_COLUMNS,
            Resource::Trades => &TRADE_COLUMNS,
            _ => &[],
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered guesses for where one resource lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList {
    resource: String,
    candidates: Vec<ApiRequest>,
}

impl CandidateList {
    pub fn new(resource: impl Into<String>, candidates: Vec<ApiRequest>) -> Self {
        Self {
            resource: resource.into(),
            candidates,
        }
    }

    /// Candidates given as bare paths.
    pub fn from_paths<I, P>(resource: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self::new(resource, paths.into_iter().map(ApiRequest::new).collect())
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApiRequest> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

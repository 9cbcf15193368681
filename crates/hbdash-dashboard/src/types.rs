//! Dashboard API types.
//!
//! These types are used for JSON serialization in REST and WebSocket APIs,
//! and are what the text report renders.

use std::collections::BTreeMap;

use hbdash_core::Table;
use serde::Serialize;

/// Result of one refresh cycle.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// When the cycle finished (Unix milliseconds).
    pub timestamp_ms: i64,
    /// API base URL the cycle ran against.
    pub api_base: String,
    /// Refresh interval in seconds.
    pub refresh_secs: u64,
    /// Health check result.
    pub health: HealthStatus,
    /// Set when the health check failed. No panel was fetched in that case.
    pub fatal_error: Option<String>,
    /// Panels, absent after a fatal health failure.
    pub panels: Option<Panels>,
}

impl DashboardSnapshot {
    /// Whether the cycle stopped at the health check.
    pub fn is_fatal(&self) -> bool {
        self.fatal_error.is_some()
    }
}

/// API health headline.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub ok: bool,
    /// "OK" or "ERROR".
    pub label: String,
    /// Raw health response, shown as hover text.
    pub detail: Option<String>,
}

impl HealthStatus {
    pub fn ok(detail: String) -> Self {
        Self {
            ok: true,
            label: "OK".to_string(),
            detail: Some(detail),
        }
    }

    pub fn error() -> Self {
        Self {
            ok: false,
            label: "ERROR".to_string(),
            detail: None,
        }
    }
}

/// Everything rendered below the health check.
#[derive(Debug, Clone, Serialize)]
pub struct Panels {
    pub fleet: FleetPanel,
    pub pnl: PnlPanel,
    pub orders: TablePanel,
    pub trades: TablePanel,
}

/// One table with where it came from and what went wrong.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TablePanel {
    /// Candidate path that produced the table.
    pub source_path: Option<String>,
    /// Rows to display.
    pub table: Table,
    /// Rows available before any tail/projection.
    pub total_rows: usize,
    /// Last fetch error, shown as a caption.
    pub error: Option<String>,
    /// Informational message when there is nothing to show.
    pub notice: Option<String>,
}

impl TablePanel {
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Bots / instances headline plus both listings.
#[derive(Debug, Clone, Serialize)]
pub struct FleetPanel {
    /// "Bots (running)", "Instances (running)" or "Bots".
    pub label: String,
    pub running: usize,
    pub total: usize,
    pub notice: Option<String>,
    pub bots: TablePanel,
    pub instances: TablePanel,
}

/// PnL headline metrics and history.
#[derive(Debug, Clone, Serialize)]
pub struct PnlPanel {
    /// Formatted pnl of the last row.
    pub latest_pnl: String,
    /// Formatted volume of the last row.
    pub turnover: String,
    /// Formatted fees of the last row.
    pub fees: String,
    /// Formatted equity of the last row.
    pub equity: String,
    /// Raw timestamp cell of the last row.
    pub latest_timestamp: Option<String>,
    /// Logical field -> column it resolved to.
    pub resolved_columns: BTreeMap<String, String>,
    /// Most recent rows.
    pub history: TablePanel,
}

/// WebSocket message types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardMessage {
    /// Full snapshot, sent on connect and after every cycle.
    Snapshot(DashboardSnapshot),
}

//! hbdash-dashboard - Web shell for the hbdash live status view.
//!
//! The refresh loop in `hbdash-app` builds one `DashboardSnapshot` per cycle
//! and publishes it here. This crate serves it:
//!
//! - `GET /`             static HTML/JS page
//! - `GET /api/snapshot` latest snapshot as JSON (503 before the first cycle)
//! - `GET /metrics`      Prometheus text exposition
//! - `GET /ws`           WebSocket; latest snapshot on connect, then every new one
//!
//! # Usage
//!
//! ```ignore
//! use hbdash_dashboard::{run_server, DashboardConfig, DashboardState};
//!
//! let state = DashboardState::new();
//! let server_state = state.clone();
//! tokio::spawn(async move {
//!     if let Err(e) = run_server(server_state, DashboardConfig::default()).await {
//!         tracing::error!(error = %e, "Dashboard server failed");
//!     }
//! });
//!
//! state.publish(snapshot);
//! ```

mod config;
mod server;
mod state;
mod types;

pub use config::DashboardConfig;
pub use server::{create_router, run_server, AppState};
pub use state::DashboardState;
pub use types::{
    DashboardMessage, DashboardSnapshot, FleetPanel, HealthStatus, Panels, PnlPanel, TablePanel,
};

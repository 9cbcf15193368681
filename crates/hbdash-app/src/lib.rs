//! hbdash-app - Live status dashboard for a trading-bot management API.
//!
//! Every refresh cycle checks API health, then probes the candidate paths of
//! each resource (bots, instances, PnL, orders, trades) and builds one
//! `DashboardSnapshot`. The snapshot is published to the web dashboard or
//! printed as a text report with `--once`.

pub mod app;
pub mod config;
pub mod cycle;
pub mod error;
pub mod report;

pub use app::Application;
pub use config::AppConfig;
pub use cycle::{run_cycle, CycleSettings};
pub use error::{AppError, AppResult};
pub use report::render_text;

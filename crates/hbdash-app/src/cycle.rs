//! One refresh cycle: health check, then every panel in order.
//!
//! A cycle is a stateless function of the API's answers. Each cycle gets a
//! fresh response cache, so nothing leaks from one cycle to the next.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use hbdash_client::{
    probe, ApiRequest, CachedSource, ClientError, JsonSource, ProbeOutcome, Resource, HEALTH_PATH,
};
use hbdash_core::{cell_text, format_metric, running_count, FieldAliasSet, LogicalField};
use hbdash_dashboard::{
    DashboardSnapshot, FleetPanel, HealthStatus, Panels, PnlPanel, TablePanel,
};
use hbdash_telemetry::Metrics;
use tracing::{debug, info, warn};

/// Rows of PnL history kept for display.
pub const PNL_HISTORY_ROWS: usize = 200;

pub const NO_FLEET_NOTICE: &str = "No bots/instances endpoint found";
pub const NO_ORDERS_NOTICE: &str = "No orders found (or endpoint unknown).";
pub const NO_TRADES_NOTICE: &str = "No trades found (or endpoint unknown).";
pub const NO_PNL_NOTICE: &str = "No PnL data found (or endpoint unknown).";

/// Inputs that stay fixed across cycles.
#[derive(Debug, Clone)]
pub struct CycleSettings {
    /// Shown in the header; requests go through the source.
    pub api_base: String,
    pub refresh_secs: u64,
    pub aliases: FieldAliasSet,
    pub cache_ttl: Duration,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            refresh_secs: 10,
            aliases: FieldAliasSet::default(),
            cache_ttl: Duration::from_secs(10),
        }
    }
}

/// Run one full cycle against `source`.
///
/// A failed health check ends the cycle: the snapshot carries the error and
/// no panels. Otherwise every panel is built, each one isolated from the
/// others' failures.
pub async fn run_cycle<S: JsonSource + ?Sized>(
    source: &S,
    settings: &CycleSettings,
) -> DashboardSnapshot {
    let started = Instant::now();
    let source = CachedSource::new(source, settings.cache_ttl);

    let (health, fatal_error, panels) = match check_health(&source).await {
        Ok(health) => {
            let panels = build_panels(&source, &settings.aliases).await;
            (health, None, Some(panels))
        }
        Err(e) => {
            warn!(error = %e, "API health check failed, skipping panels");
            (HealthStatus::error(), Some(e.to_string()), None)
        }
    };

    let finished = Utc::now();
    let elapsed = started.elapsed();
    Metrics::cycle(
        fatal_error.is_some(),
        elapsed.as_secs_f64(),
        finished.timestamp_millis() as f64 / 1000.0,
    );
    info!(
        fatal = fatal_error.is_some(),
        elapsed_ms = elapsed.as_millis() as u64,
        cached_responses = source.cache().len(),
        "Refresh cycle finished"
    );

    DashboardSnapshot {
        timestamp_ms: finished.timestamp_millis(),
        api_base: settings.api_base.clone(),
        refresh_secs: settings.refresh_secs,
        health,
        fatal_error,
        panels,
    }
}

/// Any successful JSON answer from the health path counts as healthy.
async fn check_health<S: JsonSource + ?Sized>(source: &S) -> Result<HealthStatus, ClientError> {
    let body = source.get_json(&ApiRequest::new(HEALTH_PATH)).await?;
    debug!(path = HEALTH_PATH, "API health check passed");
    Ok(HealthStatus::ok(body.to_string()))
}

async fn build_panels<S: JsonSource + ?Sized>(source: &S, aliases: &FieldAliasSet) -> Panels {
    let bots = probe_resource(source, Resource::Bots).await;
    let instances = probe_resource(source, Resource::Instances).await;
    let fleet = fleet_panel(bots, instances);
    Metrics::fleet_running(fleet.running);

    let pnl = pnl_panel(probe_resource(source, Resource::Pnl).await, aliases);
    let orders = projected_panel(
        probe_resource(source, Resource::Orders).await,
        Resource::Orders,
        NO_ORDERS_NOTICE,
    );
    let trades = projected_panel(
        probe_resource(source, Resource::Trades).await,
        Resource::Trades,
        NO_TRADES_NOTICE,
    );

    Panels {
        fleet,
        pnl,
        orders,
        trades,
    }
}

async fn probe_resource<S: JsonSource + ?Sized>(source: &S, resource: Resource) -> ProbeOutcome {
    let outcome = probe(source, &resource.candidates()).await;

    let label = if !outcome.is_empty() {
        "resolved"
    } else if outcome.error.is_some() {
        "failed"
    } else {
        "empty"
    };
    Metrics::probe(resource.as_str(), label, outcome.attempts);
    Metrics::panel_rows(resource.as_str(), outcome.table.len());

    if let Some(error) = &outcome.error {
        warn!(resource = %resource, error = %error, "No candidate produced rows");
    }
    outcome
}

/// Panel showing a probe result as-is.
fn table_panel(outcome: ProbeOutcome, notice: Option<&str>) -> TablePanel {
    let error = outcome.error_message();
    let notice = if outcome.is_empty() {
        notice.map(str::to_string)
    } else {
        None
    };
    TablePanel {
        source_path: outcome.path,
        total_rows: outcome.table.len(),
        table: outcome.table,
        error,
        notice,
    }
}

/// Panel restricted to the resource's preferred columns.
fn projected_panel(outcome: ProbeOutcome, resource: Resource, notice: &str) -> TablePanel {
    let mut panel = table_panel(outcome, Some(notice));
    panel.table = panel.table.select(resource.preferred_columns());
    panel
}

/// Headline counts bots if any are listed, instances otherwise.
pub fn fleet_panel(bots: ProbeOutcome, instances: ProbeOutcome) -> FleetPanel {
    let (label, running, total, notice) = if !bots.is_empty() {
        (
            "Bots (running)",
            running_count(&bots.table),
            bots.table.len(),
            None,
        )
    } else if !instances.is_empty() {
        (
            "Instances (running)",
            running_count(&instances.table),
            instances.table.len(),
            None,
        )
    } else {
        ("Bots", 0, 0, Some(NO_FLEET_NOTICE.to_string()))
    };

    FleetPanel {
        label: label.to_string(),
        running,
        total,
        notice,
        bots: table_panel(bots, None),
        instances: table_panel(instances, None),
    }
}

/// Latest-row metrics plus the recent history.
pub fn pnl_panel(outcome: ProbeOutcome, aliases: &FieldAliasSet) -> PnlPanel {
    let table = &outcome.table;

    let resolved_columns: BTreeMap<String, String> = LogicalField::ALL
        .into_iter()
        .filter_map(|field| {
            aliases
                .resolve(table, field)
                .map(|column| (field.to_string(), column.to_string()))
        })
        .collect();

    let last = |field: LogicalField| {
        resolved_columns
            .get(field.as_str())
            .and_then(|column| table.last_value(column))
    };

    let latest_pnl = format_metric(last(LogicalField::Pnl));
    let turnover = format_metric(last(LogicalField::Volume));
    let fees = format_metric(last(LogicalField::Fees));
    let equity = format_metric(last(LogicalField::Equity));
    let latest_timestamp = last(LogicalField::Timestamp)
        .filter(|value| !value.is_null())
        .map(cell_text);

    if !table.is_empty() {
        debug!(columns = ?resolved_columns, "PnL fields resolved");
    }

    let history = table.tail(PNL_HISTORY_ROWS);
    let mut panel = table_panel(outcome, Some(NO_PNL_NOTICE));
    panel.table = history;

    PnlPanel {
        latest_pnl,
        turnover,
        fees,
        equity,
        latest_timestamp,
        resolved_columns,
        history: panel,
    }
}

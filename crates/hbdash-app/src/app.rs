//! Main application orchestration.
//!
//! Owns the API client and runs the refresh loop:
//! - one `run_cycle` per tick of the refresh interval
//! - every snapshot published to the dashboard state
//! - dashboard web server in its own task

use std::future::Future;
use std::time::Duration;

use hbdash_client::{ApiClient, JsonSource};
use hbdash_dashboard::{run_server, DashboardSnapshot, DashboardState};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::cycle::{run_cycle, CycleSettings};
use crate::error::AppResult;

/// Main application.
pub struct Application {
    config: AppConfig,
    client: ApiClient,
    settings: CycleSettings,
    state: DashboardState,
}

impl Application {
    /// Create a new application. Fails on an unusable API or alias config.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let client = ApiClient::new(&config.api)?;
        let settings = CycleSettings {
            api_base: client.base_url().to_string(),
            refresh_secs: config.refresh_secs,
            aliases: config.field_aliases()?,
            cache_ttl: config.api.cache_ttl(),
        };

        Ok(Self {
            config,
            client,
            settings,
            state: DashboardState::new(),
        })
    }

    /// Shared dashboard state.
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Run a single cycle against the live API.
    pub async fn run_once(&self) -> DashboardSnapshot {
        run_cycle(&self.client, &self.settings).await
    }

    /// Refresh until Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        let server_handle = if self.config.dashboard.enabled {
            let state = self.state.clone();
            let dashboard_config = self.config.dashboard.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = run_server(state, dashboard_config).await {
                    error!(error = %e, "Dashboard server failed");
                }
            }))
        } else {
            info!("Dashboard disabled, logging cycles only");
            None
        };

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };

        let cycles = refresh_loop(
            &self.client,
            &self.settings,
            self.config.refresh_interval(),
            &self.state,
            shutdown,
        )
        .await;

        info!(cycles, "Shutting down");
        if let Some(handle) = server_handle {
            handle.abort();
        }

        Ok(())
    }
}

/// Run a cycle every `period` and publish each snapshot until `shutdown`
/// resolves. Returns the number of completed cycles.
///
/// `shutdown` is polled for the whole loop, including while a cycle is in
/// flight; a cycle cut short publishes nothing.
pub async fn refresh_loop<S, F>(
    source: &S,
    settings: &CycleSettings,
    period: Duration,
    state: &DashboardState,
    shutdown: F,
) -> u64
where
    S: JsonSource + ?Sized,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut refresh_interval = tokio::time::interval(period);
    refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        api_base = %settings.api_base,
        refresh_secs = period.as_secs(),
        "Entering refresh loop"
    );

    let mut cycles = 0u64;
    loop {
        tokio::select! {
            _ = refresh_interval.tick() => {
                let finished = tokio::select! {
                    snapshot = run_cycle(source, settings) => Some(snapshot),
                    _ = &mut shutdown => None,
                };
                let Some(snapshot) = finished else {
                    info!("Shutdown signal received during a cycle");
                    break;
                };

                cycles += 1;
                if let Some(error) = &snapshot.fatal_error {
                    warn!(cycle = cycles, error = %error, "Cycle aborted by health check");
                }
                state.publish(snapshot);
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    cycles
}

//! Application configuration.
//!
//! Layered as: TOML file, then `HBDASH_`-prefixed environment variables
//! (`HBDASH_API__BASE_URL`, `HBDASH_REFRESH_SECS`, ...), then CLI flags.

use std::collections::BTreeMap;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use hbdash_client::ApiConfig;
use hbdash_core::FieldAliasSet;
use hbdash_dashboard::DashboardConfig;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Shortest accepted refresh interval.
pub const MIN_REFRESH_SECS: u64 = 3;
/// Longest accepted refresh interval.
pub const MAX_REFRESH_SECS: u64 = 60;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Seconds between refresh cycles. Clamped to 3..=60. Default: 10.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    /// Log filter used when RUST_LOG is unset.
    #[serde(default)]
    pub log_level: Option<String>,
    /// Management API connection.
    #[serde(default)]
    pub api: ApiConfig,
    /// Web dashboard.
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Column alias overrides keyed by logical field
    /// (timestamp, pnl, fees, volume, equity).
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

fn default_refresh_secs() -> u64 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh_secs(),
            log_level: None,
            api: ApiConfig::default(),
            dashboard: DashboardConfig::default(),
            aliases: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file (optional) layered with `HBDASH_*` env vars.
    pub fn load(path: &str) -> AppResult<Self> {
        let settings = Config::builder()
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("HBDASH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::Config(format!("Failed to load config: {e}")))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;

        Ok(config.clamped())
    }

    /// Parse a TOML document without environment layering.
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config.clamped())
    }

    /// Apply CLI overrides. Values that are `None` leave the config as is.
    pub fn apply_overrides(
        &mut self,
        api_base: Option<String>,
        token: Option<String>,
        refresh_secs: Option<u64>,
    ) {
        if let Some(base) = api_base {
            self.api.base_url = base;
        }
        if let Some(token) = token {
            self.api.token = Some(token);
        }
        if let Some(secs) = refresh_secs {
            self.refresh_secs = secs;
        }
        self.refresh_secs = clamp_refresh_secs(self.refresh_secs);
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    /// Default aliases with the configured overrides applied.
    pub fn field_aliases(&self) -> AppResult<FieldAliasSet> {
        Ok(FieldAliasSet::with_overrides(
            self.aliases.iter().map(|(k, v)| (k.as_str(), v.clone())),
        )?)
    }

    /// Reject settings that make every cycle fail.
    pub fn validate(&self) -> AppResult<()> {
        self.api.validate()?;
        self.field_aliases()?;
        Ok(())
    }

    fn clamped(mut self) -> Self {
        self.refresh_secs = clamp_refresh_secs(self.refresh_secs);
        self
    }
}

/// Keep the refresh interval within 3..=60 seconds.
pub fn clamp_refresh_secs(secs: u64) -> u64 {
    secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS)
}

//! hbdash - live status dashboard for a trading-bot management API.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Live status dashboard for a trading-bot management API
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via HBDASH_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Management API base URL (overrides api.base_url)
    #[arg(long)]
    api_base: Option<String>,

    /// Bearer token (overrides api.token)
    #[arg(long)]
    token: Option<String>,

    /// Seconds between refreshes, clamped to 3..=60
    #[arg(long)]
    refresh_secs: Option<u64>,

    /// Run a single cycle, print a text report and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Determine config path: CLI arg > HBDASH_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("HBDASH_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    let mut config = hbdash_app::AppConfig::load(&config_path)?;
    config.apply_overrides(args.api_base, args.token, args.refresh_secs);

    hbdash_telemetry::init_logging(config.log_level.as_deref())?;

    info!("Starting hbdash v{}", env!("CARGO_PKG_VERSION"));
    info!(
        config_path = %config_path,
        api_base = %config.api.base_url,
        refresh_secs = config.refresh_secs,
        "Configuration loaded"
    );

    let app = hbdash_app::Application::new(config)?;

    if args.once {
        let snapshot = app.run_once().await;
        print!("{}", hbdash_app::render_text(&snapshot));
        if snapshot.is_fatal() {
            std::process::exit(1);
        }
        return Ok(());
    }

    app.run().await?;

    Ok(())
}

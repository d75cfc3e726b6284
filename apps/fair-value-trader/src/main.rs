//! Fair Value Trader Binary
//!
//! Runs one evaluation cycle for every configured underlying.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin fair-value-trader
//! ```
//!
//! # Environment Variables
//!
//! - `FVT_CONFIG`: Path to the YAML config (default: `config.yaml`)
//! - `ALPACA_KEY` / `ALPACA_SECRET`: Interpolated into the default config
//! - `RUST_LOG`: Overrides the configured log level

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Local;

use fair_value_trader::application::use_cases::{CycleSettings, EvaluateUnderlyingUseCase};
use fair_value_trader::config::{Config, load_config};
use fair_value_trader::domain::shared::Symbol;
use fair_value_trader::infrastructure::broker::alpaca::{
    AlpacaBrokerAdapter, AlpacaMarketDataAdapter,
};
use fair_value_trader::observability::init_metrics;
use fair_value_trader::telemetry::init_tracing;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "FVT_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();

    let config_path = std::env::var(CONFIG_ENV).ok();
    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;

    init_tracing(&config.observability.logging)?;
    init_observability(&config)?;

    let alpaca = &config.brokers.alpaca;
    if !alpaca.has_credentials() {
        bail!("brokers.alpaca.api_key and api_secret are required");
    }
    let adapter_config = alpaca.to_adapter_config();
    let broker = Arc::new(AlpacaBrokerAdapter::new(&adapter_config)?);
    let market = Arc::new(AlpacaMarketDataAdapter::new(&adapter_config)?);

    if broker.is_live() && !config.trading.dry_run {
        tracing::warn!("Live trading enabled, orders will hit a funded account");
    }

    tracing::info!(
        environment = %adapter_config.environment,
        symbols = ?config.trading.symbols,
        dry_run = config.trading.dry_run,
        tolerance = config.trading.price_tolerance,
        "Starting fair value trader"
    );

    let settings = CycleSettings::from_config(&config)?;
    let use_case = EvaluateUnderlyingUseCase::new(broker, market, settings);
    let as_of = Local::now().date_naive();

    let mut failed = 0_usize;
    for symbol in config.trading.symbols.iter().map(Symbol::new) {
        // Errors are logged by the use case; move on to the next underlying.
        if use_case.execute(&symbol, as_of).await.is_err() {
            failed += 1;
        }
    }

    tracing::info!(
        symbols = config.trading.symbols.len(),
        failed,
        "Run complete"
    );
    Ok(())
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }
    let Ok(cwd) = std::env::current_dir() else {
        return;
    };
    for dir in cwd.ancestors().skip(1) {
        let candidate = dir.join(".env");
        if Path::new(&candidate).is_file() && dotenvy::from_path(&candidate).is_ok() {
            return;
        }
    }
}

fn init_observability(config: &Config) -> Result<()> {
    let metrics = &config.observability.metrics;
    if !metrics.enabled {
        return Ok(());
    }

    let addr: SocketAddr = metrics
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid metrics listen address '{}'", metrics.listen_addr))?;
    init_metrics(addr)?;
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

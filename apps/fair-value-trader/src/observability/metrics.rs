//! Prometheus metrics for the trader.
//!
//! ```ignore
//! use fair_value_trader::observability::{init_metrics, record_decision};
//!
//! init_metrics("0.0.0.0:9090".parse()?)?;
//! record_decision("buy");
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Cycle duration buckets from 100ms to 5min.
const CYCLE_BUCKETS: &[f64] = &[0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0];

/// Install the Prometheus exporter, serving `/metrics` on `listen_addr`.
///
/// # Errors
///
/// Returns an error if the exporter cannot be configured or installed
/// (e.g. port already in use, recorder already set).
pub fn init_metrics(listen_addr: SocketAddr) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(listen_addr)
        .set_buckets(CYCLE_BUCKETS)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(addr = %listen_addr, "Prometheus metrics exporter started");
    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Evaluation Metrics
// ============================================================================

/// Record a decision (`buy`, `sell`, `hold`).
pub fn record_decision(action: &'static str) {
    counter!("fvt_decisions_total", "action" => action).increment(1);
}

/// Record a contract skipped because pricing failed.
///
/// * `kind` - `domain`, `insufficient_data` or `non_convergence`
pub fn record_pricing_failure(kind: &'static str) {
    counter!("fvt_pricing_failures_total", "kind" => kind).increment(1);
}

/// Record a finished cycle for an underlying.
///
/// * `status` - `ok` or the cycle error kind
pub fn record_cycle(symbol: &str, status: &'static str, elapsed: Duration) {
    counter!(
        "fvt_cycles_total",
        "symbol" => symbol.to_string(),
        "status" => status
    )
    .increment(1);

    histogram!("fvt_cycle_duration_seconds", "symbol" => symbol.to_string())
        .record(elapsed.as_secs_f64());
}

// ============================================================================
// Order Metrics
// ============================================================================

/// Record an order submission result.
///
/// * `side` - `buy` or `sell`
/// * `status` - `submitted` or a broker error kind
pub fn record_order_submission(side: &'static str, status: &'static str) {
    counter!("fvt_order_submissions_total", "side" => side, "status" => status).increment(1);
}

/// Record a failed sell attempt that will be retried.
pub fn record_sell_retry() {
    counter!("fvt_sell_retries_total").increment(1);
}

/// Record a sell that used up every attempt.
pub fn record_sell_exhausted() {
    counter!("fvt_sell_exhausted_total").increment(1);
}

/// Record a fallback (cover) order.
///
/// * `status` - `submitted` or `failed`
pub fn record_fallback(status: &'static str) {
    counter!("fvt_fallback_orders_total", "status" => status).increment(1);
}

//! Observability module for metrics.
//!
//! Counters go through the `metrics` facade; without an installed recorder
//! they are no-ops.

mod metrics;

pub use metrics::{
    MetricsError, init_metrics, record_cycle, record_decision, record_fallback,
    record_order_submission, record_pricing_failure, record_sell_exhausted, record_sell_retry,
};

// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Fair Value Trader - Rust Core Library
//!
//! Values listed call options with Black-Scholes and trades the gap between
//! fair value and the last traded price.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Pricing and decision logic
//!   - `option_pricing`: Black-Scholes, implied rate, realized volatility
//!   - `trade_decision`: Tolerance band policy, order terms
//!
//! - **Application**: Orchestration
//!   - `ports`: `OrderSink`, `PositionSource`, `PriceHistorySource`, `QuoteSource`, `ContractSource`
//!   - `services`: Chain screen, sell retrier with fallback
//!   - `use_cases`: `EvaluateUnderlying`
//!
//! - **Infrastructure**: Adapters
//!   - `broker::alpaca`: Alpaca trading and market data REST
//!   - `in_memory`: Scripted market
//!
//! - **Config / Observability / Telemetry**: YAML configuration, Prometheus
//!   metrics, structured logging

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// YAML configuration with environment interpolation.
pub mod config;

/// Prometheus metrics.
pub mod observability;

/// Tracing subscriber setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use domain::option_pricing::{
    BlackScholes, FairValue, FairValueEngine, OptionContract, PricingError, PricingInputs,
    VolatilityEstimator,
};
pub use domain::shared::Symbol;
pub use domain::trade_decision::{Action, Decision, DecisionPolicy};

pub use application::ports::{
    BrokerError, ContractSource, MarketDataError, OrderAck, OrderRequest, OrderSink,
    PositionSource, PriceHistorySource, QuoteSource,
};
pub use application::services::{ContractScreen, ExecutionRetrier, RetryOutcome, RetryStatus};
pub use application::use_cases::{CycleReport, CycleSettings, EvaluateUnderlyingUseCase};

pub use config::{Config, load_config};
pub use infrastructure::broker::alpaca::{AlpacaBrokerAdapter, AlpacaMarketDataAdapter};
pub use infrastructure::in_memory::InMemoryMarket;

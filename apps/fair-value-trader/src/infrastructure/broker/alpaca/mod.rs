//! Alpaca Markets Adapters
//!
//! REST implementations of the broker and market data ports:
//! - Order submission, positions and open orders (trading API)
//! - Option contract listings (trading API)
//! - Daily bars and latest trades (data API)
//! - Retry logic with exponential backoff

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;
mod market_data;

pub use adapter::AlpacaBrokerAdapter;
pub use config::{AlpacaConfig, AlpacaEnvironment, DataFeed, RetryConfig};
pub use error::AlpacaError;
pub use market_data::{AlpacaMarketDataAdapter, OPTION_TRADES_BATCH};

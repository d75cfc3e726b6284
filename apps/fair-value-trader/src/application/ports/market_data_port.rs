//! Market Data Ports (Driven Ports)
//!
//! Price history, latest trades and option chain metadata.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::option_pricing::OptionContract;
use crate::domain::shared::Symbol;

/// Market data port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketDataError {
    /// Connection error.
    #[error("Market data connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Authentication failed.
    #[error("Market data authentication failed")]
    AuthenticationFailed,

    /// Symbol not found.
    #[error("Symbol not found: {symbol}")]
    SymbolNotFound {
        /// The unknown symbol.
        symbol: String,
    },

    /// No data for the request.
    #[error("Market data unavailable: {message}")]
    DataUnavailable {
        /// Error details.
        message: String,
    },

    /// Rate limited.
    #[error("Rate limited by market data provider")]
    RateLimited,

    /// Provider returned something unusable.
    #[error("Market data API error: {message}")]
    ApiError {
        /// Error details.
        message: String,
    },
}

/// Daily close history.
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    /// Daily closes for `symbol` from `start` to today, oldest first.
    async fn daily_closes(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
    ) -> Result<Vec<f64>, MarketDataError>;
}

/// Latest trade prices.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Latest trade price of an equity.
    async fn latest_trade(&self, symbol: &Symbol) -> Result<f64, MarketDataError>;

    /// Latest trade price of each option contract that has traded.
    ///
    /// Contracts without a trade are absent from the map.
    async fn latest_option_trades(
        &self,
        symbols: &[Symbol],
    ) -> Result<HashMap<Symbol, f64>, MarketDataError>;
}

/// Option chain metadata.
#[async_trait]
pub trait ContractSource: Send + Sync {
    /// Listed option contracts for an underlying.
    async fn option_contracts(
        &self,
        underlying: &Symbol,
    ) -> Result<Vec<OptionContract>, MarketDataError>;
}

//! In-memory market implementing every port.
//!
//! Holds canned prices, bars and option chains, records every order it
//! sees, and can be scripted to fail submissions for a symbol.

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};

use crate::application::ports::{
    BrokerError, ContractSource, MarketDataError, OrderAck, OrderRequest, OrderSink,
    PositionSource, PriceHistorySource, QuoteSource,
};
use crate::domain::option_pricing::OptionContract;
use crate::domain::shared::Symbol;

/// Scripted market and broker.
#[derive(Debug, Default)]
pub struct InMemoryMarket {
    closes: RwLock<HashMap<Symbol, Vec<f64>>>,
    last_trades: RwLock<HashMap<Symbol, f64>>,
    chains: RwLock<HashMap<Symbol, Vec<OptionContract>>>,
    open_symbols: RwLock<HashSet<Symbol>>,
    queued_failures: Mutex<HashMap<Symbol, VecDeque<BrokerError>>>,
    permanent_failures: Mutex<HashMap<Symbol, BrokerError>>,
    attempts: Mutex<Vec<OrderRequest>>,
    accepted: Mutex<Vec<OrderRequest>>,
    history_requests: Mutex<Vec<(Symbol, NaiveDate)>>,
}

impl InMemoryMarket {
    /// Create an empty market.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the daily closes for a symbol.
    #[must_use]
    pub fn with_closes(self, symbol: &str, closes: Vec<f64>) -> Self {
        self.closes.write().insert(Symbol::new(symbol), closes);
        self
    }

    /// Set the last trade for an equity or option symbol.
    #[must_use]
    pub fn with_last_trade(self, symbol: &str, price: f64) -> Self {
        self.last_trades.write().insert(Symbol::new(symbol), price);
        self
    }

    /// Set the option chain for an underlying.
    #[must_use]
    pub fn with_contracts(self, underlying: &str, contracts: Vec<OptionContract>) -> Self {
        self.chains.write().insert(Symbol::new(underlying), contracts);
        self
    }

    /// Mark a symbol as held or pending.
    #[must_use]
    pub fn with_open_symbol(self, symbol: &str) -> Self {
        self.open_symbols.write().insert(Symbol::new(symbol));
        self
    }

    /// Fail the next `times` submissions for `symbol` with `error`.
    pub fn fail_next(&self, symbol: &str, error: &BrokerError, times: usize) {
        self.queued_failures
            .lock()
            .entry(Symbol::new(symbol))
            .or_default()
            .extend(std::iter::repeat_n(error.clone(), times));
    }

    /// Fail every submission for `symbol`.
    pub fn fail_always(&self, symbol: &str, error: BrokerError) {
        self.permanent_failures
            .lock()
            .insert(Symbol::new(symbol), error);
    }

    /// Every submission attempt, in order.
    #[must_use]
    pub fn attempted_orders(&self) -> Vec<OrderRequest> {
        self.attempts.lock().clone()
    }

    /// Submissions that were accepted, in order.
    #[must_use]
    pub fn accepted_orders(&self) -> Vec<OrderRequest> {
        self.accepted.lock().clone()
    }

    /// `(symbol, start)` of every history request.
    #[must_use]
    pub fn history_requests(&self) -> Vec<(Symbol, NaiveDate)> {
        self.history_requests.lock().clone()
    }

    fn scripted_failure(&self, symbol: &Symbol) -> Option<BrokerError> {
        if let Some(error) = self.permanent_failures.lock().get(symbol) {
            return Some(error.clone());
        }
        self.queued_failures
            .lock()
            .get_mut(symbol)
            .and_then(VecDeque::pop_front)
    }
}

#[async_trait]
impl OrderSink for InMemoryMarket {
    async fn submit_order(&self, request: OrderRequest) -> Result<OrderAck, BrokerError> {
        self.attempts.lock().push(request.clone());

        if let Some(error) = self.scripted_failure(&request.symbol) {
            return Err(error);
        }

        let mut accepted = self.accepted.lock();
        let ack = OrderAck {
            broker_order_id: format!("mem-{}", accepted.len() + 1),
            client_order_id: request.client_order_id.clone(),
            status: "accepted".to_string(),
        };
        accepted.push(request);
        Ok(ack)
    }
}

#[async_trait]
impl PositionSource for InMemoryMarket {
    async fn open_symbols(&self) -> Result<HashSet<Symbol>, BrokerError> {
        Ok(self.open_symbols.read().clone())
    }
}

#[async_trait]
impl PriceHistorySource for InMemoryMarket {
    async fn daily_closes(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
    ) -> Result<Vec<f64>, MarketDataError> {
        self.history_requests.lock().push((symbol.clone(), start));
        self.closes
            .read()
            .get(symbol)
            .cloned()
            .ok_or_else(|| MarketDataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }
}

#[async_trait]
impl QuoteSource for InMemoryMarket {
    async fn latest_trade(&self, symbol: &Symbol) -> Result<f64, MarketDataError> {
        self.last_trades
            .read()
            .get(symbol)
            .copied()
            .ok_or_else(|| MarketDataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }

    async fn latest_option_trades(
        &self,
        symbols: &[Symbol],
    ) -> Result<HashMap<Symbol, f64>, MarketDataError> {
        let trades = self.last_trades.read();
        Ok(symbols
            .iter()
            .filter_map(|s| trades.get(s).map(|p| (s.clone(), *p)))
            .collect())
    }
}

#[async_trait]
impl ContractSource for InMemoryMarket {
    async fn option_contracts(
        &self,
        underlying: &Symbol,
    ) -> Result<Vec<OptionContract>, MarketDataError> {
        Ok(self.chains.read().get(underlying).cloned().unwrap_or_default())
    }
}

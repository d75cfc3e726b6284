//! Alpaca market data adapter.
//!
//! Daily bars and latest trades come from the data API; option chain
//! metadata comes from the trading API. Listings are paginated with
//! `next_page_token`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::application::ports::{ContractSource, MarketDataError, PriceHistorySource, QuoteSource};
use crate::domain::option_pricing::OptionContract;
use crate::domain::shared::Symbol;

use super::api_types::{
    AlpacaBarsPage, AlpacaLatestOptionTrades, AlpacaLatestStockTrade, AlpacaOptionContractsPage,
};
use super::config::{AlpacaConfig, DataFeed};
use super::error::AlpacaError;
use super::http_client::AlpacaHttpClient;

/// Page size for bars and contract listings.
const PAGE_LIMIT: &str = "10000";

/// Symbols per latest option trades request.
pub const OPTION_TRADES_BATCH: usize = 100;

/// Alpaca market data adapter.
#[derive(Debug, Clone)]
pub struct AlpacaMarketDataAdapter {
    client: AlpacaHttpClient,
    feed: DataFeed,
}

impl AlpacaMarketDataAdapter {
    /// Create a new market data adapter.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        Ok(Self {
            client: AlpacaHttpClient::new(config)?,
            feed: config.data_feed,
        })
    }
}

#[async_trait]
impl PriceHistorySource for AlpacaMarketDataAdapter {
    async fn daily_closes(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
    ) -> Result<Vec<f64>, MarketDataError> {
        let path = format!("/v2/stocks/{symbol}/bars");
        let mut closes = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("timeframe", "1Day".to_string()),
                ("start", start.format("%Y-%m-%d").to_string()),
                ("limit", PAGE_LIMIT.to_string()),
                ("adjustment", "raw".to_string()),
                ("feed", self.feed.as_str().to_string()),
            ];
            if let Some(token) = page_token.take() {
                query.push(("page_token", token));
            }

            let page: AlpacaBarsPage = self.client.data_get(&path, &query).await?;
            closes.extend(page.bars.unwrap_or_default().into_iter().map(|b| b.close));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(symbol = %symbol, %start, bars = closes.len(), "Fetched daily bars");
        Ok(closes)
    }
}

#[async_trait]
impl QuoteSource for AlpacaMarketDataAdapter {
    async fn latest_trade(&self, symbol: &Symbol) -> Result<f64, MarketDataError> {
        let path = format!("/v2/stocks/{symbol}/trades/latest");
        let response: AlpacaLatestStockTrade = self
            .client
            .data_get(&path, &[("feed", self.feed.as_str().to_string())])
            .await?;
        Ok(response.trade.price)
    }

    async fn latest_option_trades(
        &self,
        symbols: &[Symbol],
    ) -> Result<HashMap<Symbol, f64>, MarketDataError> {
        let mut prices = HashMap::with_capacity(symbols.len());

        for batch in symbols.chunks(OPTION_TRADES_BATCH) {
            let joined = batch
                .iter()
                .map(Symbol::as_str)
                .collect::<Vec<_>>()
                .join(",");

            let response: AlpacaLatestOptionTrades = self
                .client
                .data_get("/v1beta1/options/trades/latest", &[("symbols", joined)])
                .await?;

            prices.extend(
                response
                    .trades
                    .into_iter()
                    .map(|(symbol, trade)| (Symbol::new(symbol), trade.price)),
            );
        }

        Ok(prices)
    }
}

#[async_trait]
impl ContractSource for AlpacaMarketDataAdapter {
    async fn option_contracts(
        &self,
        underlying: &Symbol,
    ) -> Result<Vec<OptionContract>, MarketDataError> {
        let mut contracts = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("underlying_symbols", underlying.as_str().to_string()),
                ("limit", PAGE_LIMIT.to_string()),
            ];
            if let Some(token) = page_token.take() {
                query.push(("page_token", token));
            }

            let page: AlpacaOptionContractsPage =
                self.client.get("/v2/options/contracts", &query).await?;

            for raw in &page.option_contracts {
                match raw.to_domain() {
                    Ok(contract) => contracts.push(contract),
                    Err(e) => tracing::warn!(contract = %raw.symbol, error = %e, "Skipping malformed contract"),
                }
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(underlying = %underlying, contracts = contracts.len(), "Fetched option contracts");
        Ok(contracts)
    }
}

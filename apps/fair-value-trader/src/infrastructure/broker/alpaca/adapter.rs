//! Alpaca trading adapter: order placement and the open-symbol set.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::application::ports::{BrokerError, OrderAck, OrderRequest, OrderSink, PositionSource};
use crate::domain::shared::Symbol;

use super::api_types::{AlpacaOrderRequest, AlpacaOrderResponse, AlpacaPositionResponse};
use super::config::{AlpacaConfig, AlpacaEnvironment};
use super::error::AlpacaError;
use super::http_client::AlpacaHttpClient;

/// Page size for the open orders listing.
const OPEN_ORDERS_LIMIT: &str = "500";

/// Trading API adapter.
#[derive(Debug, Clone)]
pub struct AlpacaBrokerAdapter {
    client: AlpacaHttpClient,
    environment: AlpacaEnvironment,
}

impl AlpacaBrokerAdapter {
    /// Connect to the trading API described by `config`.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        Ok(Self {
            client: AlpacaHttpClient::new(config)?,
            environment: config.environment,
        })
    }

    /// Whether orders hit a funded account.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.environment.is_live()
    }

    async fn positions(&self) -> Result<Vec<AlpacaPositionResponse>, AlpacaError> {
        self.client.get("/v2/positions", &[]).await
    }

    async fn open_orders(&self) -> Result<Vec<AlpacaOrderResponse>, AlpacaError> {
        let query = [
            ("status", "open".to_string()),
            ("limit", OPEN_ORDERS_LIMIT.to_string()),
        ];
        self.client.get("/v2/orders", &query).await
    }
}

#[async_trait]
impl OrderSink for AlpacaBrokerAdapter {
    async fn submit_order(&self, request: OrderRequest) -> Result<OrderAck, BrokerError> {
        let body = AlpacaOrderRequest::from(&request);

        tracing::info!(
            environment = %self.environment,
            symbol = %body.symbol,
            side = body.side,
            order_type = body.order_type,
            qty = %body.qty,
            limit_price = body.limit_price.as_deref().unwrap_or("-"),
            client_order_id = %body.client_order_id,
            "Placing order"
        );

        let placed: AlpacaOrderResponse = self.client.post("/v2/orders", &body).await.map_err(|e| {
            tracing::warn!(
                symbol = %body.symbol,
                client_order_id = %body.client_order_id,
                error = %e,
                "Order refused"
            );
            BrokerError::from(e)
        })?;

        tracing::debug!(
            symbol = %placed.symbol,
            broker_order_id = %placed.id,
            status = %placed.status,
            "Order acknowledged"
        );
        Ok(placed.to_order_ack())
    }
}

#[async_trait]
impl PositionSource for AlpacaBrokerAdapter {
    async fn open_symbols(&self) -> Result<HashSet<Symbol>, BrokerError> {
        let positions = self.positions().await?;
        let orders = self.open_orders().await?;

        let mut open: HashSet<Symbol> = positions.iter().map(|p| Symbol::new(&p.symbol)).collect();
        let held = open.len();
        // Only resting limit orders block a new order on the same contract.
        open.extend(
            orders
                .iter()
                .filter(|o| o.is_limit())
                .map(|o| Symbol::new(&o.symbol)),
        );

        tracing::debug!(
            positions = held,
            open_orders = orders.len(),
            open_symbols = open.len(),
            "Loaded open symbols"
        );
        Ok(open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(environment: AlpacaEnvironment) -> AlpacaBrokerAdapter {
        let config = AlpacaConfig::new("key".to_string(), "secret".to_string(), environment);
        AlpacaBrokerAdapter::new(&config).unwrap()
    }

    #[test]
    fn live_flag_follows_environment() {
        assert!(adapter(AlpacaEnvironment::Live).is_live());
        assert!(!adapter(AlpacaEnvironment::Paper).is_live());
    }
}

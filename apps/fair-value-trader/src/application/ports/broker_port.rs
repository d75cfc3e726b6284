//! Broker Port (Driven Port)
//!
//! Order submission and the set of symbols already working at the broker.

use std::collections::HashSet;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::Symbol;
use crate::domain::trade_decision::{OrderSide, OrderType, TimeInForce};

/// Order to submit to the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Client order ID (UUID v4).
    pub client_order_id: String,
    /// Symbol to trade (equity ticker or OCC option symbol).
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Quantity in shares or contracts.
    pub quantity: Decimal,
    /// Limit price, present only for limit orders.
    pub limit_price: Option<Decimal>,
    /// Time in force.
    pub time_in_force: TimeInForce,
}

impl OrderRequest {
    /// DAY market order.
    #[must_use]
    pub fn market(symbol: Symbol, side: OrderSide, quantity: Decimal) -> Self {
        Self {
            client_order_id: Uuid::new_v4().to_string(),
            symbol,
            side,
            order_type: OrderType::Market,
            quantity,
            limit_price: None,
            time_in_force: TimeInForce::Day,
        }
    }

    /// DAY limit order.
    #[must_use]
    pub fn limit(symbol: Symbol, side: OrderSide, quantity: Decimal, limit_price: Decimal) -> Self {
        Self {
            client_order_id: Uuid::new_v4().to_string(),
            symbol,
            side,
            order_type: OrderType::Limit,
            quantity,
            limit_price: Some(limit_price),
            time_in_force: TimeInForce::Day,
        }
    }

    /// Set time in force.
    #[must_use]
    pub const fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }
}

/// Acknowledgment returned by the broker after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAck {
    /// Broker-assigned order ID.
    pub broker_order_id: String,
    /// Client order ID echoed back.
    pub client_order_id: String,
    /// Broker status string at submission time (e.g. "accepted").
    pub status: String,
}

/// Broker port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    /// Connection error.
    #[error("Broker connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Order rejected by broker.
    #[error("Order rejected: {reason}")]
    OrderRejected {
        /// Rejection reason.
        reason: String,
    },

    /// Insufficient funds or shares.
    #[error("Insufficient buying power")]
    InsufficientFunds,

    /// Rate limited.
    #[error("Rate limited by broker")]
    RateLimited,

    /// Unknown error.
    #[error("Broker error: {message}")]
    Unknown {
        /// Error details.
        message: String,
    },
}

impl BrokerError {
    /// Whether the broker looked at the order and refused it.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::OrderRejected { .. } | Self::InsufficientFunds)
    }

    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionError { .. } => "connection",
            Self::OrderRejected { .. } => "rejected",
            Self::InsufficientFunds => "insufficient_funds",
            Self::RateLimited => "rate_limited",
            Self::Unknown { .. } => "unknown",
        }
    }
}

/// Port for order submission.
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// Submit an order to the broker.
    async fn submit_order(&self, request: OrderRequest) -> Result<OrderAck, BrokerError>;
}

/// Port for the symbols the account already has exposure to.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Symbols held as positions or pending as open limit orders.
    async fn open_symbols(&self) -> Result<HashSet<Symbol>, BrokerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_order_has_no_limit_price() {
        let request = OrderRequest::market(Symbol::new("AAPL"), OrderSide::Buy, Decimal::new(100, 0));

        assert_eq!(request.order_type, OrderType::Market);
        assert!(request.limit_price.is_none());
        assert_eq!(request.time_in_force, TimeInForce::Day);
        assert!(Uuid::parse_str(&request.client_order_id).is_ok());
    }

    #[test]
    fn limit_order_carries_price() {
        let request = OrderRequest::limit(
            Symbol::new("AAPL250321C00150000"),
            OrderSide::Sell,
            Decimal::ONE,
            Decimal::new(1234, 2),
        );

        assert_eq!(request.order_type, OrderType::Limit);
        assert_eq!(request.limit_price, Some(Decimal::new(1234, 2)));
    }

    #[test]
    fn client_order_ids_are_unique() {
        let a = OrderRequest::market(Symbol::new("KO"), OrderSide::Buy, Decimal::ONE);
        let b = OrderRequest::market(Symbol::new("KO"), OrderSide::Buy, Decimal::ONE);
        assert_ne!(a.client_order_id, b.client_order_id);
    }

    #[test]
    fn with_time_in_force_overrides_day() {
        let request = OrderRequest::market(Symbol::new("KO"), OrderSide::Buy, Decimal::ONE)
            .with_time_in_force(TimeInForce::Gtc);
        assert_eq!(request.time_in_force, TimeInForce::Gtc);
    }

    #[test]
    fn rejection_classification() {
        assert!(BrokerError::OrderRejected { reason: "x".into() }.is_rejection());
        assert!(BrokerError::InsufficientFunds.is_rejection());
        assert!(!BrokerError::RateLimited.is_rejection());
        assert!(!BrokerError::ConnectionError { message: "x".into() }.is_rejection());
    }
}

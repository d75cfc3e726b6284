//! Alpaca API request and response types.
//!
//! These types map directly to Alpaca's REST API format.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AlpacaError;
use crate::application::ports::{OrderAck, OrderRequest};
use crate::domain::option_pricing::{ContractStatus, OptionContract, OptionRight};
use crate::domain::trade_decision::{OrderSide, OrderType, TimeInForce};

// ============================================================================
// Order Types
// ============================================================================

/// Order request for Alpaca API.
#[derive(Debug, Clone, Serialize)]
pub struct AlpacaOrderRequest {
    /// Stock ticker or OCC option symbol.
    pub symbol: String,
    /// Quantity.
    pub qty: String,
    /// Order side.
    pub side: &'static str,
    /// Order type.
    #[serde(rename = "type")]
    pub order_type: &'static str,
    /// Time in force.
    pub time_in_force: &'static str,
    /// Limit price (for limit orders).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<String>,
    /// Client order ID.
    pub client_order_id: String,
}

impl From<&OrderRequest> for AlpacaOrderRequest {
    fn from(request: &OrderRequest) -> Self {
        Self {
            symbol: request.symbol.as_str().to_string(),
            qty: request.quantity.to_string(),
            side: match request.side {
                OrderSide::Buy => "buy",
                OrderSide::Sell => "sell",
            },
            order_type: match request.order_type {
                OrderType::Market => "market",
                OrderType::Limit => "limit",
            },
            time_in_force: match request.time_in_force {
                TimeInForce::Day => "day",
                TimeInForce::Gtc => "gtc",
            },
            limit_price: request
                .limit_price
                .filter(|_| request.order_type.requires_limit_price())
                .map(|p| p.to_string()),
            client_order_id: request.client_order_id.clone(),
        }
    }
}

/// Order as returned by Alpaca (submission response and order listings).
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaOrderResponse {
    /// Broker order ID.
    pub id: String,
    /// Client order ID.
    pub client_order_id: String,
    /// Symbol.
    pub symbol: String,
    /// Order status.
    pub status: String,
    /// Order type.
    #[serde(rename = "type", default)]
    pub order_type: String,
}

impl AlpacaOrderResponse {
    /// Convert to `OrderAck`.
    #[must_use]
    pub fn to_order_ack(&self) -> OrderAck {
        OrderAck {
            broker_order_id: self.id.clone(),
            client_order_id: self.client_order_id.clone(),
            status: self.status.clone(),
        }
    }

    /// Whether this is a resting limit order.
    #[must_use]
    pub fn is_limit(&self) -> bool {
        self.order_type.eq_ignore_ascii_case("limit")
    }
}

// ============================================================================
// Position Types
// ============================================================================

/// Position response from Alpaca API.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaPositionResponse {
    /// Symbol.
    pub symbol: String,
    /// Quantity.
    #[serde(default)]
    pub qty: String,
}

// ============================================================================
// Option Contract Types
// ============================================================================

/// One page of `/v2/options/contracts`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaOptionContractsPage {
    /// Contracts on this page.
    #[serde(default)]
    pub option_contracts: Vec<AlpacaOptionContract>,
    /// Token for the next page, absent on the last one.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Option contract metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaOptionContract {
    /// OCC symbol.
    pub symbol: String,
    /// `active` or `inactive`.
    pub status: String,
    /// `call` or `put`.
    #[serde(rename = "type")]
    pub contract_type: String,
    /// Strike as a decimal string.
    pub strike_price: String,
    /// Expiration date.
    pub expiration_date: NaiveDate,
    /// Underlying ticker.
    pub underlying_symbol: String,
}

impl AlpacaOptionContract {
    /// Convert to the domain contract.
    pub fn to_domain(&self) -> Result<OptionContract, AlpacaError> {
        let strike = Decimal::from_str(&self.strike_price).map_err(|e| {
            AlpacaError::InvalidResponse(format!(
                "{}: bad strike '{}': {e}",
                self.symbol, self.strike_price
            ))
        })?;

        let right = match self.contract_type.to_lowercase().as_str() {
            "call" => OptionRight::Call,
            "put" => OptionRight::Put,
            other => {
                return Err(AlpacaError::InvalidResponse(format!(
                    "{}: unknown contract type '{other}'",
                    self.symbol
                )));
            }
        };

        let status = if self.status.eq_ignore_ascii_case("active") {
            ContractStatus::Active
        } else {
            ContractStatus::Inactive
        };

        Ok(OptionContract::new(
            self.symbol.as_str(),
            self.underlying_symbol.as_str(),
            strike,
            self.expiration_date,
            right,
        )
        .with_status(status))
    }
}

// ============================================================================
// Market Data Types
// ============================================================================

/// One page of `/v2/stocks/{symbol}/bars`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaBarsPage {
    /// Bars on this page (`null` when empty).
    #[serde(default)]
    pub bars: Option<Vec<AlpacaBar>>,
    /// Token for the next page.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// OHLCV bar; only the close is used.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaBar {
    /// Close price.
    #[serde(rename = "c")]
    pub close: f64,
}

/// Trade print.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaTrade {
    /// Trade price.
    #[serde(rename = "p")]
    pub price: f64,
}

/// `/v2/stocks/{symbol}/trades/latest` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaLatestStockTrade {
    /// Latest trade.
    pub trade: AlpacaTrade,
}

/// `/v1beta1/options/trades/latest` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaLatestOptionTrades {
    /// Latest trade keyed by OCC symbol.
    #[serde(default)]
    pub trades: HashMap<String, AlpacaTrade>,
}

// ============================================================================
// Error Types
// ============================================================================

/// Error response from Alpaca API.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaErrorResponse {
    /// Error code (numeric in practice).
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    /// Error message.
    pub message: String,
}

impl AlpacaErrorResponse {
    /// Error code as text.
    #[must_use]
    pub fn code_string(&self) -> Option<String> {
        self.code.as_ref().map(|c| match c {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::Symbol;

    #[test]
    fn limit_order_request_serializes_in_alpaca_format() {
        let request = OrderRequest::limit(
            Symbol::new("AAPL250321C00150000"),
            OrderSide::Sell,
            Decimal::ONE,
            Decimal::new(1234, 2),
        );
        let json = serde_json::to_value(AlpacaOrderRequest::from(&request)).unwrap();

        assert_eq!(json["symbol"], "AAPL250321C00150000");
        assert_eq!(json["qty"], "1");
        assert_eq!(json["side"], "sell");
        assert_eq!(json["type"], "limit");
        assert_eq!(json["time_in_force"], "day");
        assert_eq!(json["limit_price"], "12.34");
        assert_eq!(json["client_order_id"], request.client_order_id.as_str());
    }

    #[test]
    fn market_order_omits_limit_price() {
        let request = OrderRequest::market(Symbol::new("AAPL"), OrderSide::Buy, Decimal::from(100));
        let json = serde_json::to_value(AlpacaOrderRequest::from(&request)).unwrap();

        assert_eq!(json["type"], "market");
        assert_eq!(json["qty"], "100");
        assert!(json.get("limit_price").is_none());
    }

    #[test]
    fn stray_limit_price_is_dropped_from_market_orders() {
        let mut request =
            OrderRequest::market(Symbol::new("AAPL"), OrderSide::Buy, Decimal::from(100));
        request.limit_price = Some(Decimal::new(19_050, 2));

        let body = AlpacaOrderRequest::from(&request);

        assert_eq!(body.order_type, "market");
        assert!(body.limit_price.is_none());
    }

    #[test]
    fn option_contract_converts_to_domain() {
        let raw: AlpacaOptionContract = serde_json::from_value(serde_json::json!({
            "id": "6e58f870-fe73-4583-81e4-b9a37892c36f",
            "symbol": "AAPL250321C00150000",
            "status": "active",
            "tradable": true,
            "type": "call",
            "strike_price": "150",
            "expiration_date": "2025-03-21",
            "underlying_symbol": "AAPL"
        }))
        .unwrap();

        let contract = raw.to_domain().unwrap();
        assert_eq!(contract.symbol().as_str(), "AAPL250321C00150000");
        assert_eq!(contract.underlying().as_str(), "AAPL");
        assert_eq!(contract.strike(), Decimal::from(150));
        assert!(contract.is_call());
        assert!(contract.is_active());
    }

    #[test]
    fn option_contract_with_bad_strike_is_invalid() {
        let raw = AlpacaOptionContract {
            symbol: "X".to_string(),
            status: "inactive".to_string(),
            contract_type: "call".to_string(),
            strike_price: "abc".to_string(),
            expiration_date: NaiveDate::from_ymd_opt(2025, 3, 21).unwrap(),
            underlying_symbol: "X".to_string(),
        };
        assert!(matches!(raw.to_domain(), Err(AlpacaError::InvalidResponse(_))));
    }

    #[test]
    fn bars_page_tolerates_null_bars() {
        let page: AlpacaBarsPage =
            serde_json::from_str(r#"{"bars": null, "symbol": "KO", "next_page_token": null}"#)
                .unwrap();
        assert!(page.bars.is_none());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn error_response_code_may_be_numeric() {
        let err: AlpacaErrorResponse =
            serde_json::from_str(r#"{"code": 40310000, "message": "insufficient qty"}"#).unwrap();
        assert_eq!(err.code_string().as_deref(), Some("40310000"));
    }

    #[test]
    fn open_order_type_detection() {
        let order: AlpacaOrderResponse = serde_json::from_str(
            r#"{"id": "1", "client_order_id": "c", "symbol": "KO", "status": "new", "type": "limit"}"#,
        )
        .unwrap();
        assert!(order.is_limit());
        assert_eq!(order.to_order_ack().status, "new");
    }
}

//! Application Ports (Driven)
//!
//! Capabilities the evaluation cycle calls into. Adapters live under
//! `infrastructure`.

mod broker_port;
mod market_data_port;

pub use broker_port::{BrokerError, OrderAck, OrderRequest, OrderSink, PositionSource};
pub use market_data_port::{
    ContractSource, MarketDataError, PriceHistorySource, QuoteSource,
};

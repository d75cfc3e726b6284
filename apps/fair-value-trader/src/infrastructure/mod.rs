//! Infrastructure Layer
//!
//! Adapters for the application ports:
//! - `broker::alpaca`: Alpaca REST trading and market data
//! - `in_memory`: scripted market for tests and offline runs

pub mod broker;
pub mod in_memory;

//! Domain Layer
//!
//! Pure business logic with no I/O:
//! - `option_pricing`: Black-Scholes valuation, realized volatility
//! - `trade_decision`: tolerance band policy and order vocabulary
//! - `shared`: cross-context value objects

pub mod option_pricing;
pub mod shared;
pub mod trade_decision;

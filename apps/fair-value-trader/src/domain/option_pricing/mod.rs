//! Option Pricing Bounded Context
//!
//! Fair value of listed calls:
//! - Black-Scholes valuation and implied-rate inversion
//! - Realized volatility from daily closes
//! - Calendar-to-model time conversion per contract

pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::PricingError;
pub use services::{
    BlackScholes, FairValueEngine, RateSolverConfig, VolatilityEstimator, norm_cdf, norm_pdf,
};
pub use value_objects::{
    CallTerms, ContractStatus, FairValue, OptionContract, OptionRight, PricingInputs,
    TRADING_DAYS_PER_YEAR,
};

//! Option Pricing Value Objects

mod fair_value;
mod option_contract;
mod pricing_inputs;

pub use fair_value::FairValue;
pub use option_contract::{ContractStatus, OptionContract, OptionRight};
pub use pricing_inputs::{CallTerms, PricingInputs};

/// Trading days per year used for both time-to-expiry and volatility scaling.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

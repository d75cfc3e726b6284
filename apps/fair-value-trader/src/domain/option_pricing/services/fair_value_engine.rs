//! Fair Value Engine
//!
//! Turns a listed contract plus market inputs into a model price. Time to
//! expiry counts calendar days between the valuation date and expiration,
//! divided by the trading-day year.

use chrono::NaiveDate;

use super::black_scholes::BlackScholes;
use crate::domain::option_pricing::errors::PricingError;
use crate::domain::option_pricing::value_objects::{
    CallTerms, FairValue, OptionContract, TRADING_DAYS_PER_YEAR,
};

/// Values call contracts with Black-Scholes.
#[derive(Debug, Clone)]
pub struct FairValueEngine {
    model: BlackScholes,
    days_per_year: u32,
}

impl Default for FairValueEngine {
    fn default() -> Self {
        Self::new(BlackScholes::default())
    }
}

impl FairValueEngine {
    /// Create an engine around a pricing model.
    #[must_use]
    pub const fn new(model: BlackScholes) -> Self {
        Self {
            model,
            days_per_year: TRADING_DAYS_PER_YEAR,
        }
    }

    /// Use a different trading-day year.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::Domain` if `days_per_year` is zero.
    pub fn with_trading_days(mut self, days_per_year: u32) -> Result<Self, PricingError> {
        if days_per_year == 0 {
            return Err(PricingError::domain(
                "trading days per year must be positive",
            ));
        }
        self.days_per_year = days_per_year;
        Ok(self)
    }

    /// Underlying pricing model.
    #[must_use]
    pub const fn model(&self) -> &BlackScholes {
        &self.model
    }

    /// Year fraction for a number of calendar days.
    #[must_use]
    pub fn year_fraction(&self, days: i64) -> f64 {
        days as f64 / f64::from(self.days_per_year)
    }

    /// Fair value of `contract` on `as_of`.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::Domain` if the contract is a put, has already
    /// expired, or any pricing input is out of domain.
    pub fn evaluate(
        &self,
        contract: &OptionContract,
        underlying_price: f64,
        volatility: f64,
        rate: f64,
        as_of: NaiveDate,
    ) -> Result<FairValue, PricingError> {
        let inputs = self
            .call_terms(contract, underlying_price, volatility, as_of)?
            .at_rate(rate)?;
        self.model.price(&inputs)
    }

    /// Risk-free rate at which the model reproduces `market_price`.
    ///
    /// # Errors
    ///
    /// Same domain conditions as [`Self::evaluate`], plus the solver's
    /// `PricingError::NonConvergence`.
    pub fn implied_rate(
        &self,
        contract: &OptionContract,
        underlying_price: f64,
        volatility: f64,
        market_price: f64,
        as_of: NaiveDate,
    ) -> Result<f64, PricingError> {
        let terms = self.call_terms(contract, underlying_price, volatility, as_of)?;
        self.model.imply_rate(&terms, market_price)
    }

    fn call_terms(
        &self,
        contract: &OptionContract,
        underlying_price: f64,
        volatility: f64,
        as_of: NaiveDate,
    ) -> Result<CallTerms, PricingError> {
        if !contract.is_call() {
            return Err(PricingError::domain(format!(
                "{} is a {}, only calls are priced",
                contract.symbol(),
                contract.right()
            )));
        }

        let days = contract.days_to_expiry(as_of);
        if days <= 0 {
            return Err(PricingError::domain(format!(
                "{} expired on {} (as of {as_of})",
                contract.symbol(),
                contract.expiration()
            )));
        }

        CallTerms::new(
            underlying_price,
            contract.strike_f64(),
            volatility,
            self.year_fraction(days),
        )
    }
}

//! Option Contract Value Object

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::domain::shared::Symbol;

/// Option right (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionRight {
    /// Call option (right to buy).
    Call,
    /// Put option (right to sell).
    Put,
}

impl std::fmt::Display for OptionRight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "CALL"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

/// Listing status reported by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    /// Listed and tradable.
    Active,
    /// Delisted, halted or otherwise not tradable.
    Inactive,
}

/// Option contract specification.
///
/// Immutable once fetched from the contract source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionContract {
    /// OCC symbol (e.g., "AAPL250117C00150000").
    symbol: Symbol,
    /// Underlying ticker.
    underlying: Symbol,
    /// Strike price.
    strike: Decimal,
    /// Expiration date.
    expiration: NaiveDate,
    /// Call or put.
    right: OptionRight,
    /// Listing status.
    status: ContractStatus,
}

impl OptionContract {
    /// Create a new active option contract.
    #[must_use]
    pub fn new(
        symbol: impl Into<Symbol>,
        underlying: impl Into<Symbol>,
        strike: Decimal,
        expiration: NaiveDate,
        right: OptionRight,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            underlying: underlying.into(),
            strike,
            expiration,
            right,
            status: ContractStatus::Active,
        }
    }

    /// Create an active call contract.
    #[must_use]
    pub fn call(
        symbol: impl Into<Symbol>,
        underlying: impl Into<Symbol>,
        strike: Decimal,
        expiration: NaiveDate,
    ) -> Self {
        Self::new(symbol, underlying, strike, expiration, OptionRight::Call)
    }

    /// Set the listing status.
    #[must_use]
    pub const fn with_status(mut self, status: ContractStatus) -> Self {
        self.status = status;
        self
    }

    /// Get the OCC symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Get the underlying ticker.
    #[must_use]
    pub const fn underlying(&self) -> &Symbol {
        &self.underlying
    }

    /// Get the strike price.
    #[must_use]
    pub const fn strike(&self) -> Decimal {
        self.strike
    }

    /// Strike as a float for the pricing model.
    ///
    /// Returns NaN when the decimal cannot be represented, which the
    /// model's domain checks reject.
    #[must_use]
    pub fn strike_f64(&self) -> f64 {
        self.strike.to_f64().unwrap_or(f64::NAN)
    }

    /// Get the expiration date.
    #[must_use]
    pub const fn expiration(&self) -> NaiveDate {
        self.expiration
    }

    /// Get the option right.
    #[must_use]
    pub const fn right(&self) -> OptionRight {
        self.right
    }

    /// Get the listing status.
    #[must_use]
    pub const fn status(&self) -> ContractStatus {
        self.status
    }

    /// Check if this is a call option.
    #[must_use]
    pub const fn is_call(&self) -> bool {
        matches!(self.right, OptionRight::Call)
    }

    /// Check if the contract is listed and tradable.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, ContractStatus::Active)
    }

    /// Calendar days from `as_of` to expiration (negative once expired).
    #[must_use]
    pub fn days_to_expiry(&self, as_of: NaiveDate) -> i64 {
        (self.expiration - as_of).num_days()
    }

    /// Check if the contract expires on or before `as_of`.
    #[must_use]
    pub fn is_expired(&self, as_of: NaiveDate) -> bool {
        self.expiration <= as_of
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expiration() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 17).unwrap()
    }

    fn aapl_call() -> OptionContract {
        OptionContract::call(
            "AAPL250117C00150000",
            "AAPL",
            Decimal::new(150, 0),
            expiration(),
        )
    }

    #[test]
    fn option_right_display() {
        assert_eq!(OptionRight::Call.to_string(), "CALL");
        assert_eq!(OptionRight::Put.to_string(), "PUT");
    }

    #[test]
    fn option_contract_call_defaults_active() {
        let contract = aapl_call();

        assert!(contract.is_call());
        assert!(contract.is_active());
        assert_eq!(contract.underlying().as_str(), "AAPL");
        assert_eq!(contract.strike(), Decimal::new(150, 0));
        assert_eq!(contract.strike_f64(), 150.0);
    }

    #[test]
    fn option_contract_with_status() {
        let contract = aapl_call().with_status(ContractStatus::Inactive);
        assert!(!contract.is_active());
    }

    #[test]
    fn option_contract_expiry_is_inclusive() {
        let contract = aapl_call();

        let before = NaiveDate::from_ymd_opt(2025, 1, 16).unwrap();
        assert!(!contract.is_expired(before));
        assert_eq!(contract.days_to_expiry(before), 1);

        assert!(contract.is_expired(expiration()));
        assert_eq!(contract.days_to_expiry(expiration()), 0);
    }

    #[test]
    fn option_contract_serde() {
        let contract = aapl_call();
        let json = serde_json::to_string(&contract).unwrap();
        assert!(json.contains("\"right\":\"CALL\""));
        assert!(json.contains("\"status\":\"ACTIVE\""));

        let parsed: OptionContract = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, contract);
    }
}

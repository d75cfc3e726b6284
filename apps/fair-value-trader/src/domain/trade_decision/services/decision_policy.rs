//! Tolerance Band Decision Policy
//!
//! ```text
//! fair > market + tol  -> BUY
//! fair < market - tol  -> SELL
//! otherwise            -> HOLD
//! ```
//!
//! Both comparisons are strict, so a price sitting exactly on the band edge
//! holds. A non-finite market price fails both comparisons and also holds.

use crate::domain::option_pricing::{FairValue, OptionContract};
use crate::domain::trade_decision::errors::PolicyError;
use crate::domain::trade_decision::value_objects::{Action, Decision};

/// Compares fair value against the market within a symmetric band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPolicy {
    tolerance: f64,
}

impl DecisionPolicy {
    /// Create a policy with the given band half-width.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidTolerance` for negative or non-finite widths.
    pub fn new(tolerance: f64) -> Result<Self, PolicyError> {
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(PolicyError::InvalidTolerance { tolerance });
        }
        Ok(Self { tolerance })
    }

    /// Band half-width.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Classify a fair value against a market price.
    #[must_use]
    pub fn classify(&self, fair_value: f64, market_price: f64) -> Action {
        if fair_value > market_price + self.tolerance {
            Action::Buy
        } else if fair_value < market_price - self.tolerance {
            Action::Sell
        } else {
            Action::Hold
        }
    }

    /// Build the decision for a contract.
    #[must_use]
    pub fn decide(
        &self,
        contract: &OptionContract,
        fair_value: FairValue,
        market_price: f64,
    ) -> Decision {
        Decision {
            contract: contract.clone(),
            fair_value,
            market_price,
            action: self.classify(fair_value.value(), market_price),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(12.50, 12.00, 0.20 => Action::Buy ; "fair well above market")]
    #[test_case(11.70, 12.00, 0.20 => Action::Sell ; "fair well below market")]
    #[test_case(12.10, 12.00, 0.20 => Action::Hold ; "inside band")]
    #[test_case(12.25, 12.00, 0.25 => Action::Hold ; "upper edge holds")]
    #[test_case(11.75, 12.00, 0.25 => Action::Hold ; "lower edge holds")]
    #[test_case(12.01, 12.00, 0.00 => Action::Buy ; "zero band buys any premium")]
    #[test_case(12.00, 12.00, 0.00 => Action::Hold ; "zero band equal holds")]
    #[test_case(0.00, 0.05, 0.00 => Action::Sell ; "worthless contract with a bid")]
    fn classify_table(fair: f64, market: f64, tolerance: f64) -> Action {
        DecisionPolicy::new(tolerance).unwrap().classify(fair, market)
    }

    #[test]
    fn nan_market_price_holds() {
        let policy = DecisionPolicy::new(0.2).unwrap();
        assert_eq!(policy.classify(10.0, f64::NAN), Action::Hold);
    }

    #[test]
    fn negative_tolerance_is_config_error() {
        assert_eq!(
            DecisionPolicy::new(-0.01).unwrap_err(),
            PolicyError::InvalidTolerance { tolerance: -0.01 }
        );
        assert!(DecisionPolicy::new(f64::INFINITY).is_err());
    }
}

//! Pricing Inputs Value Objects
//!
//! Validated Black-Scholes parameters. Every value is checked for finiteness
//! and domain on construction.

use crate::domain::option_pricing::errors::PricingError;

/// Contract and market terms of a call, without the risk-free rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallTerms {
    spot: f64,
    strike: f64,
    volatility: f64,
    time_to_expiry: f64,
}

impl CallTerms {
    /// Validate and build call terms.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::Domain` unless spot, strike, volatility and
    /// time to expiry are all finite and strictly positive.
    pub fn new(
        spot: f64,
        strike: f64,
        volatility: f64,
        time_to_expiry: f64,
    ) -> Result<Self, PricingError> {
        require_positive("underlying price", spot)?;
        require_positive("strike", strike)?;
        require_positive("volatility", volatility)?;
        require_positive("time to expiry", time_to_expiry)?;

        Ok(Self {
            spot,
            strike,
            volatility,
            time_to_expiry,
        })
    }

    /// Attach a risk-free rate.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::Domain` if the rate is not finite.
    pub fn at_rate(self, rate: f64) -> Result<PricingInputs, PricingError> {
        if !rate.is_finite() {
            return Err(PricingError::domain(format!(
                "risk-free rate must be finite, got {rate}"
            )));
        }
        Ok(PricingInputs { terms: self, rate })
    }

    /// Underlying price S.
    #[must_use]
    pub const fn spot(&self) -> f64 {
        self.spot
    }

    /// Strike K.
    #[must_use]
    pub const fn strike(&self) -> f64 {
        self.strike
    }

    /// Annualized volatility sigma.
    #[must_use]
    pub const fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Time to expiry T in years.
    #[must_use]
    pub const fn time_to_expiry(&self) -> f64 {
        self.time_to_expiry
    }
}

/// Full set of Black-Scholes inputs for a European call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingInputs {
    terms: CallTerms,
    rate: f64,
}

impl PricingInputs {
    /// Validate and build pricing inputs.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::Domain` if any value is non-finite or out of domain.
    pub fn new(
        spot: f64,
        strike: f64,
        volatility: f64,
        time_to_expiry: f64,
        rate: f64,
    ) -> Result<Self, PricingError> {
        CallTerms::new(spot, strike, volatility, time_to_expiry)?.at_rate(rate)
    }

    /// The rate-free terms.
    #[must_use]
    pub const fn terms(&self) -> CallTerms {
        self.terms
    }

    /// Underlying price S.
    #[must_use]
    pub const fn spot(&self) -> f64 {
        self.terms.spot
    }

    /// Strike K.
    #[must_use]
    pub const fn strike(&self) -> f64 {
        self.terms.strike
    }

    /// Annualized volatility sigma.
    #[must_use]
    pub const fn volatility(&self) -> f64 {
        self.terms.volatility
    }

    /// Time to expiry T in years.
    #[must_use]
    pub const fn time_to_expiry(&self) -> f64 {
        self.terms.time_to_expiry
    }

    /// Risk-free rate r.
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), PricingError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PricingError::domain(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_inputs_round_trip_through_accessors() {
        let inputs = PricingInputs::new(100.0, 95.0, 0.25, 0.5, 0.04).unwrap();

        assert_eq!(inputs.spot(), 100.0);
        assert_eq!(inputs.strike(), 95.0);
        assert_eq!(inputs.volatility(), 0.25);
        assert_eq!(inputs.time_to_expiry(), 0.5);
        assert_eq!(inputs.rate(), 0.04);
    }

    #[test]
    fn negative_rate_is_allowed() {
        assert!(PricingInputs::new(100.0, 100.0, 0.2, 1.0, -0.005).is_ok());
    }

    #[test]
    fn zero_volatility_is_rejected() {
        let err = PricingInputs::new(100.0, 100.0, 0.0, 1.0, 0.05).unwrap_err();
        assert!(matches!(err, PricingError::Domain { .. }));
        assert!(err.to_string().contains("volatility"));
    }

    #[test]
    fn expired_time_is_rejected() {
        assert!(PricingInputs::new(100.0, 100.0, 0.2, 0.0, 0.05).is_err());
        assert!(PricingInputs::new(100.0, 100.0, 0.2, -0.1, 0.05).is_err());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(PricingInputs::new(f64::NAN, 100.0, 0.2, 1.0, 0.05).is_err());
        assert!(PricingInputs::new(100.0, f64::INFINITY, 0.2, 1.0, 0.05).is_err());
        assert!(PricingInputs::new(100.0, 100.0, 0.2, 1.0, f64::NAN).is_err());
    }

    #[test]
    fn non_positive_prices_are_rejected() {
        assert!(PricingInputs::new(0.0, 100.0, 0.2, 1.0, 0.05).is_err());
        assert!(PricingInputs::new(100.0, -5.0, 0.2, 1.0, 0.05).is_err());
    }
}

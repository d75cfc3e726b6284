//! Realized Volatility
//!
//! Annualized standard deviation of simple daily returns.

use crate::domain::option_pricing::errors::PricingError;
use crate::domain::option_pricing::value_objects::TRADING_DAYS_PER_YEAR;

/// Estimates annualized volatility from a series of daily closes.
#[derive(Debug, Clone, Copy)]
pub struct VolatilityEstimator {
    trading_days_per_year: u32,
}

impl Default for VolatilityEstimator {
    fn default() -> Self {
        Self {
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl VolatilityEstimator {
    /// Create an estimator with a custom annualization factor.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::Domain` if `trading_days_per_year` is zero.
    pub fn new(trading_days_per_year: u32) -> Result<Self, PricingError> {
        if trading_days_per_year == 0 {
            return Err(PricingError::domain(
                "trading days per year must be positive",
            ));
        }
        Ok(Self {
            trading_days_per_year,
        })
    }

    /// Annualization factor in use.
    #[must_use]
    pub const fn trading_days_per_year(&self) -> u32 {
        self.trading_days_per_year
    }

    /// Sample standard deviation of simple returns, scaled by √days.
    ///
    /// A single return has no dispersion and yields zero.
    ///
    /// # Errors
    ///
    /// - `PricingError::InsufficientData` with fewer than two closes
    /// - `PricingError::Domain` if any close is non-positive or non-finite
    pub fn annualized_volatility(&self, closes: &[f64]) -> Result<f64, PricingError> {
        let returns = simple_returns(closes)?;
        if returns.len() < 2 {
            return Ok(0.0);
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

        Ok(variance.sqrt() * f64::from(self.trading_days_per_year).sqrt())
    }
}

/// Simple returns `close[i] / close[i-1] - 1`.
///
/// # Errors
///
/// Same conditions as [`VolatilityEstimator::annualized_volatility`].
pub fn simple_returns(closes: &[f64]) -> Result<Vec<f64>, PricingError> {
    if closes.len() < 2 {
        return Err(PricingError::InsufficientData {
            required: 2,
            actual: closes.len(),
        });
    }

    if let Some((idx, bad)) = closes
        .iter()
        .enumerate()
        .find(|(_, c)| !(c.is_finite() && **c > 0.0))
    {
        return Err(PricingError::domain(format!(
            "close #{idx} must be finite and positive, got {bad}"
        )));
    }

    Ok(closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn constant_series_has_zero_volatility() {
        let vol = VolatilityEstimator::default()
            .annualized_volatility(&[100.0; 30])
            .unwrap();
        assert_eq!(vol, 0.0);
    }

    #[test]
    fn alternating_returns_match_hand_computation() {
        // Returns: +10%, -10%, +10%
        let closes = [100.0, 110.0, 99.0, 108.9];
        let vol = VolatilityEstimator::default()
            .annualized_volatility(&closes)
            .unwrap();

        // mean = 1/30, sample std of [0.1, -0.1, 0.1] = 0.11547
        let expected = 0.115_470_053_837_925_15 * 252.0_f64.sqrt();
        assert!(approx_eq(vol, expected, 1e-9));
    }

    #[test]
    fn custom_annualization_factor() {
        let closes = [100.0, 110.0, 99.0, 108.9];
        let daily = VolatilityEstimator::new(1).unwrap();
        let yearly = VolatilityEstimator::default();

        let ratio = yearly.annualized_volatility(&closes).unwrap()
            / daily.annualized_volatility(&closes).unwrap();
        assert!(approx_eq(ratio, 252.0_f64.sqrt(), 1e-9));
    }

    #[test]
    fn two_closes_yield_zero() {
        let vol = VolatilityEstimator::default()
            .annualized_volatility(&[100.0, 105.0])
            .unwrap();
        assert_eq!(vol, 0.0);
    }

    #[test]
    fn fewer_than_two_closes_is_insufficient() {
        let estimator = VolatilityEstimator::default();
        assert_eq!(
            estimator.annualized_volatility(&[]).unwrap_err(),
            PricingError::InsufficientData {
                required: 2,
                actual: 0
            }
        );
        assert_eq!(
            estimator.annualized_volatility(&[101.0]).unwrap_err(),
            PricingError::InsufficientData {
                required: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn non_positive_close_is_domain_error() {
        let estimator = VolatilityEstimator::default();
        let err = estimator
            .annualized_volatility(&[100.0, 0.0, 101.0])
            .unwrap_err();
        assert!(matches!(err, PricingError::Domain { .. }));
        assert!(estimator
            .annualized_volatility(&[100.0, f64::NAN, 101.0])
            .is_err());
    }

    #[test]
    fn zero_trading_days_rejected() {
        assert!(VolatilityEstimator::new(0).is_err());
    }
}

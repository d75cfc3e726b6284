//! Pricing model configuration.

use serde::{Deserialize, Serialize};

use crate::domain::option_pricing::{RateSolverConfig, TRADING_DAYS_PER_YEAR};

/// Pricing model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Risk-free rate (annualized).
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// Trading days per year for time to expiry and volatility scaling.
    #[serde(default = "default_trading_days")]
    pub trading_days_per_year: u32,
    /// Calendar days of daily closes used for realized volatility.
    #[serde(default = "default_lookback_days")]
    pub volatility_lookback_days: u32,
    /// Implied-rate solver settings.
    #[serde(default)]
    pub rate_solver: RateSolverConfig,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            trading_days_per_year: default_trading_days(),
            volatility_lookback_days: default_lookback_days(),
            rate_solver: RateSolverConfig::default(),
        }
    }
}

const fn default_risk_free_rate() -> f64 {
    0.04302
}

const fn default_trading_days() -> u32 {
    TRADING_DAYS_PER_YEAR
}

const fn default_lookback_days() -> u32 {
    365
}

//! Screening and decision configuration.

use serde::{Deserialize, Serialize};

/// Trading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Underlyings evaluated each run.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// Half-width of the HOLD band around the market price.
    #[serde(default = "default_price_tolerance")]
    pub price_tolerance: f64,
    /// Strike band as multiples of the underlying price.
    #[serde(default)]
    pub strike_band: StrikeBandConfig,
    /// Contracts per option order.
    #[serde(default = "default_contract_quantity")]
    pub contract_quantity: u32,
    /// Underlying shares bought by the sell fallback.
    #[serde(default = "default_cover_quantity")]
    pub cover_quantity: u32,
    /// Log decisions without submitting orders.
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            price_tolerance: default_price_tolerance(),
            strike_band: StrikeBandConfig::default(),
            contract_quantity: default_contract_quantity(),
            cover_quantity: default_cover_quantity(),
            dry_run: false,
        }
    }
}

/// Strike band bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StrikeBandConfig {
    /// Lower bound multiple.
    #[serde(default = "default_lower")]
    pub lower: f64,
    /// Upper bound multiple.
    #[serde(default = "default_upper")]
    pub upper: f64,
}

impl Default for StrikeBandConfig {
    fn default() -> Self {
        Self {
            lower: default_lower(),
            upper: default_upper(),
        }
    }
}

fn default_symbols() -> Vec<String> {
    ["AAPL", "NVDA", "KO", "SOFI", "MSFT", "RDDT", "META"]
        .into_iter()
        .map(String::from)
        .collect()
}

const fn default_price_tolerance() -> f64 {
    0.20
}

const fn default_lower() -> f64 {
    0.95
}

const fn default_upper() -> f64 {
    1.10
}

const fn default_contract_quantity() -> u32 {
    1
}

const fn default_cover_quantity() -> u32 {
    100
}

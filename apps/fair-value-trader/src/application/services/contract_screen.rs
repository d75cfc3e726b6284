//! Contract Screen
//!
//! Narrows an option chain to the calls worth valuing this cycle.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::domain::option_pricing::OptionContract;
use crate::domain::shared::Symbol;

/// Strike band and eligibility filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractScreen {
    lower: f64,
    upper: f64,
}

impl Default for ContractScreen {
    fn default() -> Self {
        Self {
            lower: 0.95,
            upper: 1.10,
        }
    }
}

impl ContractScreen {
    /// Create a screen keeping strikes in `[lower * spot, upper * spot]`.
    ///
    /// The band is validated by configuration loading.
    #[must_use]
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Keep active calls that are not already open, expire after `as_of`
    /// and have a strike inside the band around `spot`.
    #[must_use]
    pub fn screen(
        &self,
        contracts: Vec<OptionContract>,
        open_symbols: &HashSet<Symbol>,
        spot: f64,
        as_of: NaiveDate,
    ) -> Vec<OptionContract> {
        let (low, high) = (self.lower * spot, self.upper * spot);

        contracts
            .into_iter()
            .filter(|c| {
                let strike = c.strike_f64();
                !open_symbols.contains(c.symbol())
                    && c.is_call()
                    && c.is_active()
                    && !c.is_expired(as_of)
                    && strike >= low
                    && strike <= high
            })
            .collect()
    }
}

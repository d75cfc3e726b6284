//! Decision Value Object

use serde::{Deserialize, Serialize};

use super::Action;
use crate::domain::option_pricing::{FairValue, OptionContract};

/// Outcome of the policy for one contract in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Contract evaluated.
    pub contract: OptionContract,
    /// Model price.
    pub fair_value: FairValue,
    /// Last traded price of the contract.
    pub market_price: f64,
    /// Resulting action.
    pub action: Action,
}

impl Decision {
    /// Fair value minus market price.
    #[must_use]
    pub fn edge(&self) -> f64 {
        self.fair_value.value() - self.market_price
    }
}

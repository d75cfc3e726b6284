//! Fair Value Value Object

use serde::{Deserialize, Serialize};

/// Theoretical call price produced by the pricing model.
///
/// Only constructed by the model, so it is always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FairValue(f64);

impl FairValue {
    pub(crate) const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the price.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for FairValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

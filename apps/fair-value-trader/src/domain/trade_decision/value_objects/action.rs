//! Trading action.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::OrderSide;

/// Action taken on a contract after comparing fair value and market price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Contract trades below fair value.
    Buy,
    /// Contract trades above fair value.
    Sell,
    /// Within the tolerance band.
    Hold,
}

impl Action {
    /// Order side to submit, if any.
    #[must_use]
    pub const fn order_side(&self) -> Option<OrderSide> {
        match self {
            Self::Buy => Some(OrderSide::Buy),
            Self::Sell => Some(OrderSide::Sell),
            Self::Hold => None,
        }
    }

    /// Lowercase label for metrics.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Hold => "hold",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_places_no_order() {
        assert_eq!(Action::Buy.order_side(), Some(OrderSide::Buy));
        assert_eq!(Action::Sell.order_side(), Some(OrderSide::Sell));
        assert_eq!(Action::Hold.order_side(), None);
    }

    #[test]
    fn action_serde_uses_upper_case() {
        assert_eq!(serde_json::to_string(&Action::Hold).unwrap(), "\"HOLD\"");
        let parsed: Action = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(parsed, Action::Sell);
        assert_eq!(Action::Buy.to_string(), "BUY");
    }
}

//! Symbol value object for tickers and OCC option symbols.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A trading symbol (ticker or OCC option symbol).
///
/// Examples:
/// - Equity: "AAPL", "KO", "RDDT"
/// - Option: "AAPL250117C00190000" (OCC format)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol.
    ///
    /// The symbol is trimmed and normalized to uppercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is an option symbol (OCC format).
    ///
    /// OCC format: `{ROOT}{YY}{MM}{DD}{P/C}{PRICE}` with an 8 digit strike × 1000.
    #[must_use]
    pub fn is_option(&self) -> bool {
        let s = self.0.as_bytes();
        let len = s.len();
        if !(16..=21).contains(&len) {
            return false;
        }

        let type_pos = len - 9;
        let is_right = matches!(s[type_pos], b'C' | b'P');
        is_right
            && s[len - 8..].iter().all(u8::is_ascii_digit)
            && s[type_pos - 6..type_pos].iter().all(u8::is_ascii_digit)
    }

    /// Root (underlying) portion of an option symbol.
    ///
    /// Returns the full symbol if it's not an option.
    #[must_use]
    pub fn root(&self) -> Self {
        if self.is_option() {
            Self(self.0[..self.0.len() - 15].to_string())
        } else {
            self.clone()
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

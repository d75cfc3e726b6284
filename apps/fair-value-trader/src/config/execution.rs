//! Order execution configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::services::FallbackTrigger;

/// Sell retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Attempts per sell order.
    #[serde(default = "default_sell_attempts")]
    pub sell_attempts: u32,
    /// Pause between sell attempts in milliseconds.
    #[serde(default)]
    pub retry_delay_ms: u64,
    /// When the cover order fires.
    #[serde(default)]
    pub fallback_trigger: FallbackTrigger,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            sell_attempts: default_sell_attempts(),
            retry_delay_ms: 0,
            fallback_trigger: FallbackTrigger::default(),
        }
    }
}

impl ExecutionConfig {
    /// Pause between sell attempts.
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

const fn default_sell_attempts() -> u32 {
    100
}

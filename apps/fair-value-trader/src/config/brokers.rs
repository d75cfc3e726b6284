//! Broker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::broker::alpaca::{AlpacaEnvironment, DataFeed, RetryConfig};

/// Broker configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BrokersConfig {
    /// Alpaca broker configuration.
    #[serde(default)]
    pub alpaca: AlpacaConfig,
}

/// Alpaca broker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlpacaConfig {
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// API secret.
    #[serde(default)]
    pub api_secret: String,
    /// PAPER or LIVE.
    #[serde(default)]
    pub environment: AlpacaEnvironment,
    /// Stock data feed (iex or sip).
    #[serde(default)]
    pub data_feed: DataFeed,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Trading API base URL override.
    #[serde(default)]
    pub trading_base_url: Option<String>,
    /// Data API base URL override.
    #[serde(default)]
    pub data_base_url: Option<String>,
    /// HTTP retry policy.
    #[serde(default)]
    pub retry: HttpRetryConfig,
}

impl Default for AlpacaConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            environment: AlpacaEnvironment::default(),
            data_feed: DataFeed::default(),
            timeout_secs: default_timeout_secs(),
            trading_base_url: None,
            data_base_url: None,
            retry: HttpRetryConfig::default(),
        }
    }
}

impl AlpacaConfig {
    /// Whether both credentials are present.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    /// Adapter configuration for this section.
    #[must_use]
    pub fn to_adapter_config(&self) -> crate::infrastructure::broker::alpaca::AlpacaConfig {
        crate::infrastructure::broker::alpaca::AlpacaConfig::new(
            self.api_key.clone(),
            self.api_secret.clone(),
            self.environment,
        )
        .with_timeout(Duration::from_secs(self.timeout_secs))
        .with_data_feed(self.data_feed)
        .with_retry(self.retry.to_retry_config())
        .with_base_urls(self.trading_base_url.clone(), self.data_base_url.clone())
    }
}

/// HTTP retry policy for broker requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpRetryConfig {
    /// Attempts per request.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Growth factor between backoffs.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for HttpRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl HttpRetryConfig {
    fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            multiplier: self.multiplier,
        }
    }
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    100
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

const fn default_multiplier() -> f64 {
    2.0
}

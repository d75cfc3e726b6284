//! Connection settings for the Alpaca adapters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Account the adapters trade against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlpacaEnvironment {
    /// Simulated fills on the paper account.
    #[default]
    Paper,
    /// Funded brokerage account.
    Live,
}

impl AlpacaEnvironment {
    /// Trading host for this account.
    #[must_use]
    pub const fn trading_base_url(&self) -> &'static str {
        match self {
            Self::Paper => "https://paper-api.alpaca.markets",
            Self::Live => "https://api.alpaca.markets",
        }
    }

    /// Market data host (shared by both accounts).
    #[must_use]
    pub const fn data_base_url(&self) -> &'static str {
        "https://data.alpaca.markets"
    }

    /// Whether orders are real.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl std::fmt::Display for AlpacaEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paper => write!(f, "PAPER"),
            Self::Live => write!(f, "LIVE"),
        }
    }
}

/// Stock market data feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFeed {
    /// IEX only (free plans).
    #[default]
    Iex,
    /// Full consolidated tape.
    Sip,
}

impl DataFeed {
    /// Query parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Iex => "iex",
            Self::Sip => "sip",
        }
    }
}

/// Configuration for the Alpaca adapters.
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    /// API key.
    pub api_key: String,
    /// API secret.
    pub api_secret: String,
    /// Trading environment.
    pub environment: AlpacaEnvironment,
    /// Stock data feed.
    pub data_feed: DataFeed,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// HTTP retry policy.
    pub retry: RetryConfig,
    trading_url_override: Option<String>,
    data_url_override: Option<String>,
}

impl AlpacaConfig {
    /// Settings with default feed, timeout and retry policy.
    #[must_use]
    pub fn new(api_key: String, api_secret: String, environment: AlpacaEnvironment) -> Self {
        Self {
            api_key,
            api_secret,
            environment,
            data_feed: DataFeed::default(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            trading_url_override: None,
            data_url_override: None,
        }
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the HTTP retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the stock data feed.
    #[must_use]
    pub const fn with_data_feed(mut self, feed: DataFeed) -> Self {
        self.data_feed = feed;
        self
    }

    /// Point the adapters at other hosts (proxies, mock servers).
    #[must_use]
    pub fn with_base_urls(mut self, trading: Option<String>, data: Option<String>) -> Self {
        self.trading_url_override = trading.map(|u| u.trim_end_matches('/').to_string());
        self.data_url_override = data.map(|u| u.trim_end_matches('/').to_string());
        self
    }

    /// Effective trading host.
    #[must_use]
    pub fn trading_base_url(&self) -> &str {
        self.trading_url_override
            .as_deref()
            .unwrap_or_else(|| self.environment.trading_base_url())
    }

    /// Effective data host.
    #[must_use]
    pub fn data_base_url(&self) -> &str {
        self.data_url_override
            .as_deref()
            .unwrap_or_else(|| self.environment.data_base_url())
    }
}

/// HTTP retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts per request.
    pub max_attempts: u32,
    /// Wait after the first failure.
    pub initial_backoff: Duration,
    /// Upper bound on any single wait.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper() -> AlpacaConfig {
        AlpacaConfig::new("key".to_string(), "secret".to_string(), AlpacaEnvironment::Paper)
    }

    #[test]
    fn environment_urls() {
        assert!(AlpacaEnvironment::Paper.trading_base_url().contains("paper"));
        assert!(!AlpacaEnvironment::Live.trading_base_url().contains("paper"));
        assert!(AlpacaEnvironment::Live.is_live());
    }

    #[test]
    fn default_urls_follow_environment() {
        let config = paper();
        assert_eq!(config.trading_base_url(), "https://paper-api.alpaca.markets");
        assert_eq!(config.data_base_url(), "https://data.alpaca.markets");
    }

    #[test]
    fn overrides_replace_urls_and_drop_trailing_slash() {
        let config = paper().with_base_urls(
            Some("http://127.0.0.1:9000/".to_string()),
            Some("http://127.0.0.1:9001".to_string()),
        );
        assert_eq!(config.trading_base_url(), "http://127.0.0.1:9000");
        assert_eq!(config.data_base_url(), "http://127.0.0.1:9001");
    }

    #[test]
    fn builder_setters() {
        let config = paper()
            .with_timeout(Duration::from_secs(5))
            .with_data_feed(DataFeed::Sip);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.data_feed.as_str(), "sip");
    }

    #[test]
    fn environment_serde() {
        let env: AlpacaEnvironment = serde_json::from_str("\"LIVE\"").unwrap();
        assert_eq!(env, AlpacaEnvironment::Live);
        assert_eq!(env.to_string(), "LIVE");
        let feed: DataFeed = serde_json::from_str("\"sip\"").unwrap();
        assert_eq!(feed, DataFeed::Sip);
    }
}

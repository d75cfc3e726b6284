//! Authenticated JSON transport for the Alpaca trading and data hosts.
//!
//! Transport errors, 408, 5xx and 429 are retried on a capped exponential
//! schedule; a 429 `Retry-After` header replaces the scheduled wait.
//! Everything else fails on the first response.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api_types::AlpacaErrorResponse;
use super::config::{AlpacaConfig, RetryConfig};
use super::error::AlpacaError;

/// Query string pairs.
pub type Query<'a> = &'a [(&'a str, String)];

/// Rate-limit wait assumed when the exhausted 429 carried no `Retry-After`.
const DEFAULT_RATE_LIMIT_SECS: u64 = 60;

/// Which Alpaca host a request targets.
#[derive(Debug, Clone, Copy)]
enum Host {
    Trading,
    Data,
}

/// HTTP client for the Alpaca trading and data APIs.
#[derive(Debug, Clone)]
pub struct AlpacaHttpClient {
    http: Client,
    trading_url: String,
    data_url: String,
    retry: RetryConfig,
}

impl AlpacaHttpClient {
    /// Build a client that sends the key pair on every request.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        if config.api_key.is_empty() || config.api_secret.is_empty() {
            return Err(AlpacaError::AuthenticationFailed);
        }

        let http = Client::builder()
            .default_headers(credential_headers(&config.api_key, &config.api_secret)?)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AlpacaError::Http(e.to_string()))?;

        Ok(Self {
            http,
            trading_url: config.trading_base_url().to_string(),
            data_url: config.data_base_url().to_string(),
            retry: config.retry.clone(),
        })
    }

    /// GET from the trading API.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query<'_>,
    ) -> Result<T, AlpacaError> {
        self.send(Host::Trading, Method::GET, path, query, None::<&()>)
            .await
    }

    /// POST a JSON body to the trading API.
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AlpacaError> {
        self.send(Host::Trading, Method::POST, path, &[], Some(body))
            .await
    }

    /// GET from the market data API.
    pub async fn data_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query<'_>,
    ) -> Result<T, AlpacaError> {
        self.send(Host::Data, Method::GET, path, query, None::<&()>)
            .await
    }

    fn builder<B: Serialize + Sync>(
        &self,
        host: Host,
        method: &Method,
        path: &str,
        query: Query<'_>,
        body: Option<&B>,
    ) -> RequestBuilder {
        let base = match host {
            Host::Trading => &self.trading_url,
            Host::Data => &self.data_url,
        };
        let mut request = self.http.request(method.clone(), format!("{base}{path}"));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request
    }

    async fn send<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        host: Host,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Option<&B>,
    ) -> Result<T, AlpacaError> {
        let mut schedule = Backoff::new(&self.retry);

        loop {
            let retry = match self.builder(host, &method, path, query, body).send().await {
                Ok(response) if response.status().is_success() => return decode(response).await,
                Ok(response) => match failure(path, response).await {
                    Failure::Fatal(error) => return Err(error),
                    Failure::Transient(retry) => retry,
                },
                Err(e) => Transient {
                    reason: e.to_string(),
                    retry_after: None,
                    throttled: false,
                },
            };

            let Some(scheduled) = schedule.next_delay() else {
                return Err(retry.into_error(schedule.attempts));
            };
            let delay = retry.retry_after.unwrap_or(scheduled);

            tracing::warn!(
                %method,
                path,
                attempt = schedule.attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                throttled = retry.throttled,
                reason = %retry.reason,
                "Alpaca request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

fn credential_headers(key: &str, secret: &str) -> Result<HeaderMap, AlpacaError> {
    let value = |v: &str| {
        let mut header = HeaderValue::from_str(v).map_err(|_| AlpacaError::AuthenticationFailed)?;
        header.set_sensitive(true);
        Ok::<_, AlpacaError>(header)
    };

    let mut headers = HeaderMap::new();
    headers.insert("APCA-API-KEY-ID", value(key)?);
    headers.insert("APCA-API-SECRET-KEY", value(secret)?);
    Ok(headers)
}

/// Parse a success body; an empty body decodes as JSON `null`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AlpacaError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| AlpacaError::Network(e.to_string()))?;
    let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
    serde_json::from_slice(body).map_err(|e| AlpacaError::JsonParse(e.to_string()))
}

// ============================================================================
// Failure classification
// ============================================================================

/// A failed attempt worth repeating.
#[derive(Debug)]
struct Transient {
    reason: String,
    retry_after: Option<Duration>,
    throttled: bool,
}

impl Transient {
    /// Error reported once the schedule is spent.
    fn into_error(self, attempts: u32) -> AlpacaError {
        if self.throttled {
            AlpacaError::RateLimited {
                retry_after_secs: self
                    .retry_after
                    .map_or(DEFAULT_RATE_LIMIT_SECS, |d| d.as_secs()),
            }
        } else {
            AlpacaError::MaxRetriesExceeded { attempts }
        }
    }
}

#[derive(Debug)]
enum Failure {
    Transient(Transient),
    Fatal(AlpacaError),
}

async fn failure(path: &str, response: Response) -> Failure {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = response.text().await.unwrap_or_default();

    let (code, message) = match serde_json::from_str::<AlpacaErrorResponse>(&body) {
        Ok(parsed) => (
            parsed.code_string().unwrap_or_else(|| status.as_u16().to_string()),
            parsed.message,
        ),
        Err(_) => (status.as_u16().to_string(), body),
    };

    match status.as_u16() {
        429 => Failure::Transient(Transient {
            reason: format!("{code}: {message}"),
            retry_after,
            throttled: true,
        }),
        408 | 500..=599 => Failure::Transient(Transient {
            reason: format!("{status}: {message}"),
            retry_after: None,
            throttled: false,
        }),
        _ => Failure::Fatal(classify_failure(status, path, code, message)),
    }
}

/// Map a non-retryable response to an error.
///
/// Alpaca answers 403 both for bad credentials and for orders the account
/// cannot cover; the message tells them apart.
fn classify_failure(status: StatusCode, path: &str, code: String, message: String) -> AlpacaError {
    match status {
        StatusCode::UNAUTHORIZED => AlpacaError::AuthenticationFailed,
        StatusCode::FORBIDDEN if message.to_lowercase().contains("insufficient") => {
            AlpacaError::Insufficient(message)
        }
        StatusCode::FORBIDDEN => AlpacaError::AuthenticationFailed,
        StatusCode::NOT_FOUND => AlpacaError::NotFound {
            path: path.to_string(),
        },
        StatusCode::UNPROCESSABLE_ENTITY => AlpacaError::OrderRejected(message),
        _ => AlpacaError::Api { code, message },
    }
}

// ============================================================================
// Backoff
// ============================================================================

/// Capped exponential wait schedule.
///
/// `max_attempts` counts requests, so the schedule yields one wait fewer.
#[derive(Debug)]
struct Backoff {
    attempts: u32,
    budget: u32,
    next: Duration,
    cap: Duration,
    factor: f64,
}

impl Backoff {
    fn new(config: &RetryConfig) -> Self {
        Self {
            attempts: 0,
            budget: config.max_attempts,
            next: config.initial_backoff.min(config.max_backoff),
            cap: config.max_backoff,
            factor: config.multiplier,
        }
    }

    /// Count a failed attempt and return the wait before the next one.
    fn next_delay(&mut self) -> Option<Duration> {
        self.attempts += 1;
        if self.attempts >= self.budget {
            return None;
        }

        let wait = self.next;
        self.next = Duration::try_from_secs_f64(wait.as_secs_f64() * self.factor)
            .map_or(self.cap, |d| d.min(self.cap));
        Some(wait)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::broker::alpaca::AlpacaEnvironment;

    fn schedule(max_attempts: u32, initial_ms: u64, max_ms: u64, multiplier: f64) -> Backoff {
        Backoff::new(&RetryConfig {
            max_attempts,
            initial_backoff: Duration::from_millis(initial_ms),
            max_backoff: Duration::from_millis(max_ms),
            multiplier,
        })
    }

    #[test]
    fn backoff_grows_until_budget_is_spent() {
        let mut backoff = schedule(4, 100, 10_000, 2.0);

        let waits: Vec<_> = std::iter::from_fn(|| backoff.next_delay()).collect();
        assert_eq!(
            waits,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
            ]
        );
        assert_eq!(backoff.attempts, 4);
    }

    #[test]
    fn backoff_is_capped() {
        let mut backoff = schedule(10, 1_000, 5_000, 10.0);

        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(1)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(5)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn single_attempt_budget_never_waits() {
        assert_eq!(schedule(1, 100, 1_000, 2.0).next_delay(), None);
    }

    #[test]
    fn exhausted_rate_limit_reports_retry_after() {
        let retry = Transient {
            reason: "429".to_string(),
            retry_after: Some(Duration::from_secs(7)),
            throttled: true,
        };
        assert_eq!(
            retry.into_error(3),
            AlpacaError::RateLimited {
                retry_after_secs: 7
            }
        );

        let retry = Transient {
            reason: "503".to_string(),
            retry_after: None,
            throttled: false,
        };
        assert_eq!(
            retry.into_error(3),
            AlpacaError::MaxRetriesExceeded { attempts: 3 }
        );
    }

    #[test]
    fn forbidden_with_insufficient_message_is_not_auth_failure() {
        let err = classify_failure(
            StatusCode::FORBIDDEN,
            "/v2/orders",
            "40310000".to_string(),
            "insufficient qty available for order".to_string(),
        );
        assert!(matches!(err, AlpacaError::Insufficient(_)));

        let err = classify_failure(
            StatusCode::FORBIDDEN,
            "/v2/orders",
            "40110000".to_string(),
            "forbidden".to_string(),
        );
        assert_eq!(err, AlpacaError::AuthenticationFailed);
    }

    #[test]
    fn unprocessable_is_order_rejection() {
        let err = classify_failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            "/v2/orders",
            "42210000".to_string(),
            "limit price too far".to_string(),
        );
        assert_eq!(err, AlpacaError::OrderRejected("limit price too far".to_string()));
    }

    #[test]
    fn other_client_errors_keep_code_and_message() {
        let err = classify_failure(
            StatusCode::BAD_REQUEST,
            "/v2/options/contracts",
            "40010001".to_string(),
            "invalid underlying".to_string(),
        );
        assert_eq!(
            err,
            AlpacaError::Api {
                code: "40010001".to_string(),
                message: "invalid underlying".to_string()
            }
        );
    }

    #[test]
    fn credentials_must_be_header_safe() {
        assert!(credential_headers("key", "secret").is_ok());
        assert_eq!(
            credential_headers("key\n", "secret").unwrap_err(),
            AlpacaError::AuthenticationFailed
        );
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let config = AlpacaConfig::new(String::new(), "secret".to_string(), AlpacaEnvironment::Paper);
        assert_eq!(
            AlpacaHttpClient::new(&config).unwrap_err(),
            AlpacaError::AuthenticationFailed
        );
    }
}

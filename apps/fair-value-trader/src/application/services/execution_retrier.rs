//! Sell Execution Retrier
//!
//! Places an order repeatedly until the broker accepts it or the attempt
//! budget runs out. After the first failure a one-shot fallback may run
//! before retrying; for covered-call sells the fallback buys the underlying
//! shares that make the sell acceptable.
//!
//! | Attempt | Failure | Fallback (first_failure) | Fallback (first_rejection) |
//! |---------|---------|--------------------------|----------------------------|
//! | 1 | any | fires | fires only on rejection |
//! | 2.. | any | never | never |

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::ports::{BrokerError, OrderAck};
use crate::observability::{record_fallback, record_sell_exhausted, record_sell_retry};

/// When the fallback action fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackTrigger {
    /// After the first failed attempt, whatever the reason.
    #[default]
    FirstFailure,
    /// After the first failed attempt, only if the broker refused the order.
    FirstRejection,
}

impl FallbackTrigger {
    /// Whether the fallback should fire for this first failure.
    #[must_use]
    pub const fn fires_on(&self, error: &BrokerError) -> bool {
        match self {
            Self::FirstFailure => true,
            Self::FirstRejection => error.is_rejection(),
        }
    }
}

/// Final state of a retried placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryStatus {
    /// An attempt was accepted.
    Succeeded(OrderAck),
    /// Every attempt failed.
    Exhausted {
        /// Failure of the final attempt.
        last_error: BrokerError,
    },
}

/// Result of [`ExecutionRetrier::execute_sell`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOutcome {
    /// Attempts made, including the successful one.
    pub attempts: u32,
    /// Whether the fallback was invoked (regardless of its own result).
    pub fallback_invoked: bool,
    /// Success or exhaustion.
    pub status: RetryStatus,
}

impl RetryOutcome {
    /// Whether an attempt succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, RetryStatus::Succeeded(_))
    }

    /// Broker acknowledgment, if any.
    #[must_use]
    pub const fn ack(&self) -> Option<&OrderAck> {
        match &self.status {
            RetryStatus::Succeeded(ack) => Some(ack),
            RetryStatus::Exhausted { .. } => None,
        }
    }
}

/// Bounded retry with a one-shot fallback.
#[derive(Debug, Clone)]
pub struct ExecutionRetrier {
    max_attempts: u32,
    delay: Duration,
    trigger: FallbackTrigger,
}

impl Default for ExecutionRetrier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTEMPTS, Duration::ZERO, FallbackTrigger::default())
    }
}

impl ExecutionRetrier {
    /// Attempt budget used when none is configured.
    pub const DEFAULT_ATTEMPTS: u32 = 100;

    /// Create a retrier. A zero attempt budget is raised to one.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration, trigger: FallbackTrigger) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            trigger,
        }
    }

    /// Attempt budget.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fallback trigger.
    #[must_use]
    pub const fn trigger(&self) -> FallbackTrigger {
        self.trigger
    }

    /// Run `place_order` until it succeeds or the budget is spent.
    ///
    /// `fallback` runs at most once, right after the first failure when the
    /// trigger allows it. A failing fallback is logged and retrying continues.
    pub async fn execute_sell<P, PFut, F, FFut>(&self, mut place_order: P, fallback: F) -> RetryOutcome
    where
        P: FnMut() -> PFut,
        PFut: Future<Output = Result<OrderAck, BrokerError>>,
        F: FnOnce() -> FFut,
        FFut: Future<Output = Result<OrderAck, BrokerError>>,
    {
        let mut fallback = Some(fallback);
        let mut fallback_invoked = false;
        let mut last_error = BrokerError::Unknown {
            message: "no attempt made".to_string(),
        };

        for attempt in 1..=self.max_attempts {
            match place_order().await {
                Ok(ack) => {
                    tracing::info!(
                        attempt,
                        broker_order_id = %ack.broker_order_id,
                        "Sell order accepted"
                    );
                    return RetryOutcome {
                        attempts: attempt,
                        fallback_invoked,
                        status: RetryStatus::Succeeded(ack),
                    };
                }
                Err(error) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %error,
                        "Sell attempt failed"
                    );

                    if attempt == 1 && self.trigger.fires_on(&error) {
                        if let Some(fallback) = fallback.take() {
                            fallback_invoked = true;
                            run_fallback(fallback).await;
                        }
                    }

                    last_error = error;
                }
            }

            if attempt < self.max_attempts {
                record_sell_retry();
                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
            }
        }

        record_sell_exhausted();
        tracing::error!(
            attempts = self.max_attempts,
            fallback_invoked,
            error = %last_error,
            "Sell retries exhausted"
        );

        RetryOutcome {
            attempts: self.max_attempts,
            fallback_invoked,
            status: RetryStatus::Exhausted { last_error },
        }
    }
}

async fn run_fallback<F, FFut>(fallback: F)
where
    F: FnOnce() -> FFut,
    FFut: Future<Output = Result<OrderAck, BrokerError>>,
{
    match fallback().await {
        Ok(ack) => {
            record_fallback("submitted");
            tracing::info!(broker_order_id = %ack.broker_order_id, "Fallback order submitted");
        }
        Err(error) => {
            record_fallback("failed");
            tracing::warn!(error = %error, "Fallback order failed, continuing retries");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn ack(id: &str) -> OrderAck {
        OrderAck {
            broker_order_id: id.to_string(),
            client_order_id: format!("client-{id}"),
            status: "accepted".to_string(),
        }
    }

    fn rejected() -> BrokerError {
        BrokerError::OrderRejected {
            reason: "insufficient qty".to_string(),
        }
    }

    /// Place closure that fails `failures` times, then succeeds.
    fn flaky(
        failures: u32,
        error: BrokerError,
    ) -> (
        Arc<AtomicU32>,
        impl FnMut() -> std::future::Ready<Result<OrderAck, BrokerError>>,
    ) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let place = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(if n < failures {
                Err(error.clone())
            } else {
                Ok(ack("sell-1"))
            })
        };
        (calls, place)
    }

    #[tokio::test]
    async fn first_attempt_success_skips_fallback() {
        let (calls, place) = flaky(0, rejected());
        let outcome = ExecutionRetrier::default()
            .execute_sell(place, || async { Ok(ack("cover")) })
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.attempts, 1);
        assert!(!outcome.fallback_invoked);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fail_once_then_succeed_invokes_fallback_once() {
        let (calls, place) = flaky(1, rejected());
        let fallback_calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&fallback_calls);

        let outcome = ExecutionRetrier::default()
            .execute_sell(place, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(ack("cover")) }
            })
            .await;

        assert_eq!(outcome.ack().map(|a| a.broker_order_id.as_str()), Some("sell-1"));
        assert_eq!(outcome.attempts, 2);
        assert!(outcome.fallback_invoked);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn always_failing_exhausts_budget() {
        let (calls, place) = flaky(u32::MAX, BrokerError::RateLimited);
        let outcome = ExecutionRetrier::default()
            .execute_sell(place, || async { Ok(ack("cover")) })
            .await;

        assert_eq!(outcome.attempts, 100);
        assert_eq!(calls.load(Ordering::SeqCst), 100);
        assert!(outcome.fallback_invoked);
        assert_eq!(
            outcome.status,
            RetryStatus::Exhausted {
                last_error: BrokerError::RateLimited
            }
        );
    }

    #[tokio::test]
    async fn failing_fallback_does_not_stop_retries() {
        let (_, place) = flaky(3, rejected());
        let outcome = ExecutionRetrier::default()
            .execute_sell(place, || async {
                Err(BrokerError::ConnectionError {
                    message: "reset".to_string(),
                })
            })
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.attempts, 4);
        assert!(outcome.fallback_invoked);
    }

    #[tokio::test]
    async fn first_rejection_trigger_ignores_transport_errors() {
        let (_, place) = flaky(2, BrokerError::RateLimited);
        let retrier = ExecutionRetrier::new(10, Duration::ZERO, FallbackTrigger::FirstRejection);
        let outcome = retrier
            .execute_sell(place, || async { Ok(ack("cover")) })
            .await;

        assert!(outcome.is_success());
        assert!(!outcome.fallback_invoked);
    }

    #[tokio::test]
    async fn first_rejection_trigger_fires_on_rejection() {
        let (_, place) = flaky(1, rejected());
        let retrier = ExecutionRetrier::new(10, Duration::ZERO, FallbackTrigger::FirstRejection);
        let outcome = retrier
            .execute_sell(place, || async { Ok(ack("cover")) })
            .await;

        assert!(outcome.fallback_invoked);
        assert_eq!(outcome.attempts, 2);
    }

    #[tokio::test]
    async fn zero_attempts_is_clamped_to_one() {
        let retrier = ExecutionRetrier::new(0, Duration::ZERO, FallbackTrigger::FirstFailure);
        assert_eq!(retrier.max_attempts(), 1);

        let (calls, place) = flaky(u32::MAX, rejected());
        let outcome = retrier
            .execute_sell(place, || async { Ok(ack("cover")) })
            .await;
        assert_eq!(outcome.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!outcome.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_applied_between_attempts() {
        let (_, place) = flaky(2, rejected());
        let retrier = ExecutionRetrier::new(5, Duration::from_secs(1), FallbackTrigger::FirstFailure);

        let start = tokio::time::Instant::now();
        let outcome = retrier
            .execute_sell(place, || async { Ok(ack("cover")) })
            .await;

        assert!(outcome.is_success());
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[test]
    fn trigger_serde_is_snake_case() {
        let parsed: FallbackTrigger = serde_json::from_str("\"first_rejection\"").unwrap();
        assert_eq!(parsed, FallbackTrigger::FirstRejection);
        assert_eq!(
            serde_json::to_string(&FallbackTrigger::FirstFailure).unwrap(),
            "\"first_failure\""
        );
    }
}

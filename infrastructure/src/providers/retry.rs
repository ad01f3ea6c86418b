//! Adapter-level retry with exponential backoff.
//!
//! Wraps a single HTTP exchange. This loop sits inside the conversion-level
//! retry of the controller and knows nothing about it.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};
use udc_application::{CallSettings, GatewayError};

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first (at least 1)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Backoff multiplier
    pub multiplier: f64,
    /// Jitter factor (0.0 - 1.0)
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&CallSettings::default())
    }
}

impl From<&CallSettings> for RetryConfig {
    fn from(call: &CallSettings) -> Self {
        Self {
            max_attempts: call.retry_attempts.max(1),
            base_delay: call.retry_backoff,
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: 0.25,
        }
    }
}

/// Retry policy implementation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Calculate delay before retry number `retry` (0-indexed)
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let base = self.config.base_delay.as_millis() as f64;
        let delay = base * self.config.multiplier.powi(retry as i32);
        let delay = delay.min(self.config.max_delay.as_millis() as f64);

        let jitter_range = delay * self.config.jitter;
        let jitter = if jitter_range > 0.0 {
            rand::thread_rng().gen_range(-jitter_range..=jitter_range)
        } else {
            0.0
        };
        let final_delay = (delay + jitter).max(0.0);

        Duration::from_millis(final_delay as u64)
    }

    /// Execute an operation, retrying transient failures
    ///
    /// # Errors
    /// Returns the first non-transient error, or the last error once all
    /// attempts are used.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, GatewayError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(attempt, "Retry succeeded");
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if !error.is_transient() || attempt >= max_attempts {
                        return Err(error);
                    }

                    let delay = self.delay_for_retry(attempt - 1);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "Retrying after error"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            multiplier: 2.0,
            jitter: 0.0,
        })
    }

    #[test]
    fn test_config_from_call_settings() {
        let call = CallSettings {
            timeout: Duration::from_secs(30),
            retry_attempts: 0,
            retry_backoff: Duration::from_secs(2),
        };
        let config = RetryConfig::from(&call);
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.base_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = policy(5);
        assert_eq!(policy.delay_for_retry(0), Duration::from_millis(1));
        assert_eq!(policy.delay_for_retry(1), Duration::from_millis(2));
        assert_eq!(policy.delay_for_retry(2), Duration::from_millis(4));
        assert_eq!(policy.delay_for_retry(10), Duration::from_millis(10));
    }

    #[test]
    fn test_delay_jitter_stays_in_range() {
        let policy = RetryPolicy::new(RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: 0.25,
        });
        for _ in 0..20 {
            let delay = policy.delay_for_retry(0).as_millis();
            assert!((750..=1250).contains(&delay), "delay {delay}ms out of range");
        }
    }

    #[tokio::test]
    async fn test_transient_errors_use_every_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = policy(3)
            .execute(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(GatewayError::HttpStatus {
                    status: 503,
                    body: "busy".into(),
                })
            })
            .await;

        assert!(matches!(result, Err(GatewayError::HttpStatus { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = policy(3)
            .execute(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(GatewayError::HttpStatus {
                    status: 401,
                    body: "bad key".into(),
                })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = policy(3)
            .execute(|| async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(GatewayError::Connection("reset".into()))
                } else {
                    Ok("reply")
                }
            })
            .await;

        assert_eq!(result, Ok("reply"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

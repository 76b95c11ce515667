//! Shared retry utilities for provider fetches.
//!
//! Retries cover transient upstream and network failures only. Rate-limit
//! errors are deliberately *not* retried here: the disclosed delay is
//! surfaced to the caller instead of being slept through silently, and
//! `NotFound` never succeeds on retry.

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::provider::{ProviderError, short_error_message};

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 500;

/// Maximum backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 10_000;

/// Maximum retry attempts for a single provider fetch.
pub const MAX_FETCH_RETRIES: usize = 3;

/// Configuration for retry operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Minimum delay between retries.
    pub min_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum number of retry attempts.
    pub max_retries: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: MAX_FETCH_RETRIES,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Build an exponential backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// The default backoff strategy for provider fetches.
#[must_use]
pub fn default_backoff() -> ExponentialBuilder {
    RetryConfig::default().into_backoff()
}

/// Whether a provider error should be retried transparently.
fn is_transient(e: &ProviderError) -> bool {
    matches!(
        e,
        ProviderError::Upstream { .. } | ProviderError::Network { .. }
    )
}

/// Execute a provider operation, retrying transient failures with
/// exponential backoff.
///
/// `label` identifies the operation in retry logs (e.g. `"github/octocat"`).
pub async fn with_transient_retry<T, F, Fut>(
    label: &str,
    operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    operation
        .retry(default_backoff())
        .when(is_transient)
        .notify(|err, dur| {
            tracing::debug!(
                "Transient failure on {}, retrying in {:?}: {}",
                label,
                dur,
                short_error_message(err)
            );
        })
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.min_delay, Duration::from_millis(INITIAL_BACKOFF_MS));
        assert_eq!(config.max_delay, Duration::from_millis(MAX_BACKOFF_MS));
        assert_eq!(config.max_retries, MAX_FETCH_RETRIES);
        assert!(config.with_jitter);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_errors_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_capture = Arc::clone(&calls);

        let operation = move || {
            let calls_capture = Arc::clone(&calls_capture);
            async move {
                let n = calls_capture.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(ProviderError::upstream("502"))
                } else {
                    Ok(7u32)
                }
            }
        };

        let advancer = tokio::spawn(async {
            for _ in 0..30 {
                tokio::time::advance(Duration::from_secs(15)).await;
                tokio::task::yield_now().await;
            }
        });

        let result = with_transient_retry("test/op", operation).await;
        advancer.await.expect("advancer task");

        assert_eq!(result.unwrap(), 7);
        assert!(calls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_not_found() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_capture = Arc::clone(&calls);

        let operation = move || {
            let calls_capture = Arc::clone(&calls_capture);
            async move {
                calls_capture.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(ProviderError::not_found("ghost"))
            }
        };

        let err = with_transient_retry("test/op", operation)
            .await
            .expect_err("expected error");

        assert!(matches!(err, ProviderError::NotFound { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_does_not_retry_rate_limited() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_capture = Arc::clone(&calls);

        let operation = move || {
            let calls_capture = Arc::clone(&calls_capture);
            async move {
                calls_capture.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(ProviderError::RateLimited {
                    retry_after_seconds: 120,
                })
            }
        };

        let err = with_transient_retry("test/op", operation)
            .await
            .expect_err("expected error");

        // The disclosed delay is surfaced, never slept through here
        assert!(err.is_rate_limited());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

use std::time::Duration;
use std::future::Future;

use super::classification::ErrorClassification;
use super::types::FramecastError;
use tracing::{debug, warn};

impl ErrorClassification {
    /// Backoff before retry number `attempt` (0-indexed). Rate limits step by
    /// 10s per attempt up to a minute. Everything else doubles from 1s plus
    /// up to 1s of jitter, capped at `max_delay`.
    pub fn retry_delay(&self, attempt: u32, max_delay: Duration) -> Duration {
        let secs = if self.error_type == "RateLimitError" {
            (10.0 * f64::from(attempt + 1)).min(60.0)
        } else {
            let backoff = 2.0_f64.powi(attempt.min(16) as i32) + rand::random::<f64>();
            backoff.min(max_delay.as_secs_f64())
        };
        Duration::from_secs_f64(secs)
    }
}

/// Caller-side retry policy. The orchestration core never retries on its own;
/// wrapping a facade call in [`with_retry`] produces one usage entry per attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self { max_retries: 0, ..Default::default() }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Run `factory` until it succeeds, fails with a non-retryable error, or
/// the policy's retries are used up. The last error is returned unchanged.
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    policy: &RetryPolicy,
    mut factory: F,
) -> Result<T, FramecastError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FramecastError>>,
{
    let mut attempt: u32 = 0;
    loop {
        let error = match factory().await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        let classification = error.classify();
        if !classification.retryable {
            debug!(
                operation = operation_name,
                error_type = classification.error_type,
                "Error is not retryable"
            );
            return Err(error);
        }
        if attempt >= policy.max_retries {
            warn!(
                operation = operation_name,
                attempts = attempt + 1,
                error_type = classification.error_type,
                "Retries exhausted"
            );
            return Err(error);
        }

        let delay = classification.retry_delay(attempt, policy.max_delay);
        attempt += 1;
        warn!(
            operation = operation_name,
            retry = attempt,
            of = policy.max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %error,
            "Retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

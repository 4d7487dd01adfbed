//! Linear retry with a fixed backoff
//!
//! Magento failures worth retrying (deadlocks, upstream hiccups) usually
//! clear within seconds, so this is a flat sleep-and-retry rather than an
//! exponential backoff.

use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::api::error::Result;

/// Sleep between attempts unless the caller overrides it.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(10);

/// Re-issues a request while it keeps returning a failing response.
///
/// Transport errors are never retried: only a response that arrived with a
/// non-2xx status consumes retry budget. The final response is returned
/// whether it succeeded or not; converting failures into errors is the
/// caller's decision.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    retries: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Policy that issues the request exactly once.
    pub fn none() -> Self {
        Self::new(0)
    }

    pub fn new(retries: u32) -> Self {
        Self { retries, backoff: DEFAULT_RETRY_BACKOFF }
    }

    pub fn with_backoff(retries: u32, backoff: Duration) -> Self {
        Self { retries, backoff }
    }

    /// Execute a request-building closure until it returns a success
    /// response or the retry budget runs out.
    pub async fn execute<F, Fut>(&self, operation: F) -> Result<reqwest::Response>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut response = operation().await?;
        let mut remaining = self.retries;

        while !response.status().is_success() && remaining > 0 {
            warn!(
                "request failed with status {}, retrying in {:?} ({} attempts left)",
                response.status(),
                self.backoff,
                remaining
            );
            remaining -= 1;
            tokio::time::sleep(self.backoff).await;
            response = operation().await?;
        }

        Ok(response)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_construction() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.retries, 0);
        assert_eq!(policy.backoff, DEFAULT_RETRY_BACKOFF);

        let policy = RetryPolicy::with_backoff(3, Duration::from_millis(1));
        assert_eq!(policy.retries, 3);
        assert_eq!(policy.backoff, Duration::from_millis(1));
    }
}

//! Unbounded retry-on-rate-limit driver.

use crate::Sleeper;
use guildmirror_error::DiscordResult;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

fn default_backoff_secs() -> u64 {
    10
}

/// Backoff policy for rate-limited operations.
///
/// The backoff is fixed, not exponential: Discord rate limits are
/// guaranteed to clear, so the loop waits a constant interval and tries
/// again, without a retry cap.
///
/// # Example
///
/// ```
/// use guildmirror_rate_limit::RetryPolicy;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.backoff().as_secs(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Seconds to wait after each rate-limit signal before retrying.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
}

impl RetryPolicy {
    /// The backoff interval as a `Duration`.
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff_secs: default_backoff_secs(),
        }
    }
}

/// Invoke `op` until it succeeds or fails with a non-rate-limit error.
///
/// A rate-limit error triggers a fixed backoff on `sleeper` followed by an
/// unconditional retry of the same operation; the loop has no retry limit.
/// Any other error propagates to the caller immediately. Each wait emits a
/// progress line naming `description`.
///
/// The driver is stateless across calls: it holds nothing beyond the
/// single invocation it wraps.
///
/// # Example
///
/// ```no_run
/// use guildmirror_rate_limit::{RetryPolicy, TokioSleeper, retry_rate_limited};
/// # use guildmirror_error::DiscordResult;
/// # async fn create_role() -> DiscordResult<u64> { Ok(1) }
///
/// # async fn demo() -> DiscordResult<()> {
/// let policy = RetryPolicy::default();
/// let id = retry_rate_limited(|| create_role(), "create role", &policy, &TokioSleeper).await?;
/// # Ok(()) }
/// ```
pub async fn retry_rate_limited<T, F, Fut>(
    mut op: F,
    description: &str,
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
) -> DiscordResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DiscordResult<T>>,
{
    loop {
        match op().await {
            Ok(value) => {
                debug!(description, "operation succeeded");
                return Ok(value);
            }
            Err(err) if err.is_rate_limit() => {
                warn!(
                    description,
                    backoff_secs = policy.backoff_secs,
                    "rate limited, waiting before retry: {err}"
                );
                sleeper.sleep(policy.backoff()).await;
            }
            Err(err) => return Err(err),
        }
    }
}

//! Bounded retry for flaky actions.
//!
//! [`retry_action`] runs an async action up to `retries` times, sleeping for
//! `delay` between attempts. The first success wins; if every attempt fails
//! the last error is carried in [`ProbeError::RetriesExhausted`], which is
//! distinct from an assertion timing out.

use crate::result::{ProbeError, ProbeResult};
use std::future::Future;
use std::time::Duration;

/// Attempt budget for [`retry_action`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts (not additional retries)
    pub retries: u32,
    /// Pause between consecutive attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Create a policy
    #[must_use]
    pub const fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }
}

/// Run `action` until it succeeds or the policy's attempts are used up.
///
/// `action` receives the 1-based attempt number. The delay is awaited only
/// between attempts, never after the last one.
pub async fn retry_action<T, F, Fut>(policy: RetryPolicy, mut action: F) -> ProbeResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ProbeResult<T>>,
{
    if policy.retries == 0 {
        return Err(ProbeError::RetriesExhausted {
            attempts: 0,
            last_error: "no attempts permitted".to_string(),
        });
    }

    let mut last_error = String::new();
    for attempt in 1..=policy.retries {
        match action(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "action succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => {
                tracing::warn!(attempt, retries = policy.retries, error = %e, "action failed");
                last_error = e.to_string();
            }
        }
        if attempt < policy.retries {
            tokio::time::sleep(policy.delay).await;
        }
    }

    Err(ProbeError::RetriesExhausted {
        attempts: policy.retries,
        last_error,
    })
}

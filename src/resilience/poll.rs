//! Fixed-interval polling until a terminal predicate holds.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// How often to poll and how many attempts to allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between consecutive attempts.
    pub interval: Duration,
    /// Total attempts including the first; `None` polls forever.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn bounded(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts.max(1)),
        }
    }

    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt <= max)
    }
}

/// Result of a polling loop that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The predicate accepted this value.
    Ready(T),
    /// Attempts ran out; carries the last observed value.
    Exhausted { last: T, attempts: u32 },
}

/// Call `op` until `done` accepts its output or the policy runs out.
///
/// The first attempt runs immediately; later attempts wait `interval`.
/// An error from `op` ends the loop and is returned unchanged.
pub async fn poll_until<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    mut op: F,
    mut done: P,
) -> Result<PollOutcome<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&T) -> bool,
{
    let mut attempt = 1;
    loop {
        let value = op(attempt).await?;
        if done(&value) {
            return Ok(PollOutcome::Ready(value));
        }
        if !policy.allows(attempt + 1) {
            return Ok(PollOutcome::Exhausted {
                last: value,
                attempts: attempt,
            });
        }
        tracing::trace!(attempt, "Condition not met, polling again");
        sleep(policy.interval).await;
        attempt += 1;
    }
}

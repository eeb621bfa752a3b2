use std::fmt::Display;
use std::time::Duration;

use tracing::debug;

/// Bounded re-execution of a fallible step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub tries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// `retry` extra attempts on top of the first one.
    pub fn new(retry: u32, delay: Duration) -> Self {
        Self {
            tries: retry.saturating_add(1),
            delay,
        }
    }
}

/// Calls `f` until it succeeds or the policy is exhausted; returns the last error.
pub fn retry_call<T, E, F>(policy: RetryPolicy, what: &str, mut f: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    let tries = policy.tries.max(1);
    let mut attempt = 1;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(err) if attempt < tries => {
                debug!("{what} failed (attempt {attempt}/{tries}): {err}");
                if !policy.delay.is_zero() {
                    std::thread::sleep(policy.delay);
                }
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

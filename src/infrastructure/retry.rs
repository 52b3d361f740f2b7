//! Bounded retry with jittered exponential backoff for transient UI faults

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::AppResult;

/// Retry policy for transient UI faults
///
/// Only errors where [`AppError::is_transient`](crate::error::AppError::is_transient) holds are retried; everything
/// else is returned immediately. Exhaustion surfaces the last error.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 4_000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff_ms,
            max_backoff_ms: max_backoff_ms.max(initial_backoff_ms),
        }
    }

    /// No waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, 0, 0)
    }

    pub async fn execute<F, Fut, T>(&self, what: &str, mut operation: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{} succeeded after {} attempts", what, attempt);
                    }
                    return Ok(value);
                }
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    let backoff = self.backoff(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                        what, attempt, self.max_attempts, err, backoff
                    );
                    sleep(backoff).await;
                }
                Err(err) => {
                    if err.is_transient() {
                        warn!("{} failed after {} attempts: {}", what, attempt, err);
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Exponential backoff capped at `max_backoff_ms`, plus up to 50% jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        if self.initial_backoff_ms == 0 {
            return Duration::ZERO;
        }
        let exp = self
            .initial_backoff_ms
            .saturating_mul(1u64 << (attempt.saturating_sub(1)).min(16));
        let base = exp.min(self.max_backoff_ms);
        let jitter = rand::thread_rng().gen_range(0..=base / 2);
        Duration::from_millis(base + jitter)
    }
}

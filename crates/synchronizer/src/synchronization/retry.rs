use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{Result, SyncError};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Bounded retry of operations failing on connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug)]
pub enum RetryOutcome<T> {
    Success(T),
    /// Every attempt failed on connectivity. Carries the last error.
    Exhausted { attempts: u32, error: SyncError },
    /// A failure retrying cannot fix.
    Fatal(SyncError),
}

impl<T> RetryOutcome<T> {
    pub fn into_result(self) -> Result<T> {
        match self {
            RetryOutcome::Success(value) => Ok(value),
            RetryOutcome::Exhausted { error, .. } | RetryOutcome::Fatal(error) => Err(error),
        }
    }
}

/// What to do after attempt `attempt` failed.
#[derive(Debug)]
pub enum RetryStep {
    Retry(SyncError),
    Stop(SyncError),
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn after_failure(&self, attempt: u32, error: SyncError) -> RetryStep {
        if error.is_connectivity() && attempt < self.max_attempts {
            RetryStep::Retry(error)
        } else {
            RetryStep::Stop(error)
        }
    }

    /// Waits before attempt `attempt + 1`.
    pub async fn pause(&self, label: &str, attempt: u32, error: &SyncError) {
        warn!(
            "{} failed with a connection error, retry {}/{}: {}",
            label,
            attempt,
            self.max_attempts.saturating_sub(1),
            error
        );
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return RetryOutcome::Success(value),
                Err(error) => match self.after_failure(attempt, error) {
                    RetryStep::Retry(error) => {
                        self.pause(label, attempt, &error).await;
                        attempt += 1;
                    }
                    RetryStep::Stop(error) if error.is_connectivity() => {
                        return RetryOutcome::Exhausted {
                            attempts: attempt,
                            error,
                        };
                    }
                    RetryStep::Stop(error) => return RetryOutcome::Fatal(error),
                },
            }
        }
    }
}

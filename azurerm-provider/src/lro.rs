//! Long-running operation polling
//!
//! Azure answers slow PUT/DELETE requests with 201/202 and a status URL.
//! [`LroPoller`] polls that URL until the operation is terminal. It never
//! gives up on its own: the caller bounds it with a deadline.

use std::time::Duration;

use crate::client::{ArmClient, OperationHandle, OperationStatus, RemoteError};

/// Why a long-running operation did not succeed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LroError {
    #[error("operation failed: {0}")]
    Failed(String),

    #[error("operation was canceled")]
    Canceled,

    #[error("failed to get operation status: {0}")]
    Remote(#[from] RemoteError),
}

impl LroError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LroError::Remote(e) if e.is_not_found())
    }
}

/// Floor for every poll delay, whatever the server or configuration asks for
pub const MIN_POLL_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct LroPoller {
    interval: Duration,
    max_transient_failures: u32,
}

impl Default for LroPoller {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), 3)
    }
}

impl LroPoller {
    pub fn new(interval: Duration, max_transient_failures: u32) -> Self {
        Self {
            interval: interval.max(MIN_POLL_DELAY),
            max_transient_failures,
        }
    }

    fn delay(&self, retry_after: Option<Duration>) -> Duration {
        retry_after.map_or(self.interval, |d| d.max(MIN_POLL_DELAY))
    }

    /// Poll `handle` until the operation succeeds, fails or is canceled
    ///
    /// Up to `max_transient_failures` consecutive transient errors are
    /// retried; the counter resets whenever a poll succeeds.
    pub async fn wait(
        &self,
        client: &dyn ArmClient,
        handle: &OperationHandle,
    ) -> Result<(), LroError> {
        let mut delay = self.delay(handle.retry_after);
        let mut failures = 0;

        loop {
            tokio::time::sleep(delay).await;

            match client.poll(handle).await {
                Ok(OperationStatus::Succeeded) => return Ok(()),
                Ok(OperationStatus::Failed(message)) => return Err(LroError::Failed(message)),
                Ok(OperationStatus::Canceled) => return Err(LroError::Canceled),
                Ok(OperationStatus::InProgress { retry_after }) => {
                    failures = 0;
                    delay = self.delay(retry_after);
                }
                Err(e) if e.is_transient() && failures < self.max_transient_failures => {
                    failures += 1;
                    log::warn!(
                        "Polling {} failed ({}/{}), retrying: {}",
                        handle.url,
                        failures,
                        self.max_transient_failures,
                        e
                    );
                    delay = self.interval;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

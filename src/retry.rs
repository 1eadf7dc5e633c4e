//! Fixed-backoff retry for throttled storage calls.

use std::{future::Future, time::Duration};
use tracing::warn;

use crate::clock::Clock;
use crate::error::StoreError;

/// How long to back off after a throttling signal, and how often to try again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub backoff: Duration,
    pub max_retries: u32,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(1),
            max_retries: 5,
        }
    }
}

/// Outcome of a call run under a `ThrottlePolicy`.
#[derive(Debug)]
pub struct Attempted<T> {
    pub result: Result<T, StoreError>,
    /// Number of throttled attempts that were retried.
    pub retries: u32,
}

/// Run `call`, sleeping `policy.backoff` and retrying the same request each time
/// the store answers `Throttled`. Any other error returns immediately.
/// Once `max_retries` retries are used up the last `Throttled` error is returned.
pub async fn with_throttle_retry<T, C, F, Fut>(
    clock: &C,
    policy: &ThrottlePolicy,
    what: &str,
    mut call: F,
) -> Attempted<T>
where
    C: Clock + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut retries = 0;
    loop {
        match call().await {
            Err(err) if err.is_throttled() && retries < policy.max_retries => {
                retries += 1;
                warn!(
                    "{what}: throttled, retry {retries}/{} after {:?}",
                    policy.max_retries, policy.backoff
                );
                clock.sleep(policy.backoff).await;
            }
            result => return Attempted { result, retries },
        }
    }
}

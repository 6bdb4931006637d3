//! Resource lifecycle waiter
//!
//! Creation and destruction requests return as soon as the control plane has
//! accepted them. The only way to learn that the operation finished is to
//! poll the resource until it settles, which is what [`wait_for_status`] does
//! for any resource kind.

use crate::status::{Lifecycle, StatusSnapshot};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

/// Errors a status fetch may return
///
/// The waiter needs to tell "the resource does not exist" apart from every
/// other failure.
pub trait FetchError: std::error::Error + 'static {
    fn is_not_found(&self) -> bool;
}

impl FetchError for capella_api::ApiError {
    fn is_not_found(&self) -> bool {
        capella_api::ApiError::is_not_found(self)
    }
}

/// The terminal state the caller is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitTarget {
    /// Wait for the resource to be created or updated
    Ready,
    /// Wait for the resource to be destroyed
    Absent,
}

impl std::fmt::Display for WaitTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitTarget::Ready => write!(f, "ready"),
            WaitTarget::Absent => write!(f, "absent"),
        }
    }
}

/// Polling schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitConfig {
    /// Overall deadline, measured from the start of the wait
    pub timeout: Duration,

    /// Delay between two status checks; non-zero and shorter than `timeout`
    pub poll_interval: Duration,

    /// Delay before the first status check
    pub initial_delay: Duration,
}

impl WaitConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
            initial_delay: Duration::ZERO,
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(60 * 60), Duration::from_secs(3))
    }
}

/// How a successful wait ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready(StatusSnapshot),
    Absent,
}

#[derive(Error, Debug)]
pub enum WaitError<E> {
    #[error("timed out after {waited:?} waiting for resource to become {target}")]
    Timeout {
        target: WaitTarget,
        waited: Duration,
        /// Last state reported before the deadline, if any poll succeeded
        last_state: Option<String>,
    },

    #[error("resource reported failed state '{state}'")]
    Failed { state: String },

    #[error("wait cancelled")]
    Cancelled,

    #[error("status check failed: {0}")]
    Fetch(#[source] E),

    #[error("poll interval {poll_interval:?} must be non-zero and shorter than timeout {timeout:?}")]
    InvalidConfig {
        timeout: Duration,
        poll_interval: Duration,
    },
}

impl<E> WaitError<E> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, WaitError::Failed { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WaitError::Cancelled)
    }
}

/// Poll a resource until it reaches `target`, fails, or the deadline passes
///
/// # Arguments
/// * `cancel` - Aborts an in-flight fetch or sleep when cancelled
/// * `fetch` - Reads the current status; at most one call is in flight
/// * `target` - Terminal state to wait for
/// * `config` - Timeout and poll interval
///
/// # Returns
/// * `Ok(WaitOutcome)` - The target state was observed
/// * `Err(WaitError::Failed)` - The resource reported a failed state
/// * `Err(WaitError::Timeout)` - The deadline passed first
/// * `Err(WaitError::Fetch)` - The fetch failed with anything but "not found"
///
/// "Not found" completes a wait for [`WaitTarget::Absent`]; while waiting for
/// [`WaitTarget::Ready`] it means the resource is not registered yet, and
/// polling continues.
pub async fn wait_for_status<F, Fut, E>(
    cancel: &CancellationToken,
    mut fetch: F,
    target: WaitTarget,
    config: &WaitConfig,
) -> Result<WaitOutcome, WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<StatusSnapshot, E>>,
    E: FetchError,
{
    if config.poll_interval.is_zero() || config.poll_interval >= config.timeout {
        return Err(WaitError::InvalidConfig {
            timeout: config.timeout,
            poll_interval: config.poll_interval,
        });
    }

    let started = Instant::now();
    let deadline = instant_after(started, config.timeout);
    let mut last_state: Option<String> = None;

    let timed_out = |last_state: Option<String>| WaitError::Timeout {
        target,
        waited: started.elapsed(),
        last_state,
    };

    if !config.initial_delay.is_zero() {
        let first_poll = deadline.min(instant_after(started, config.initial_delay));
        sleep_or_cancel(cancel, first_poll).await?;
    }

    loop {
        if Instant::now() >= deadline {
            return Err(timed_out(last_state));
        }

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(WaitError::Cancelled),
            _ = sleep_until(deadline) => return Err(timed_out(last_state)),
            result = fetch() => result,
        };

        match fetched {
            Err(err) if err.is_not_found() => match target {
                WaitTarget::Absent => return Ok(WaitOutcome::Absent),
                WaitTarget::Ready => {
                    tracing::debug!("Resource not found yet, waiting for it to be registered");
                }
            },
            Err(err) => return Err(WaitError::Fetch(err)),
            Ok(snapshot) => match (snapshot.lifecycle, target) {
                (Lifecycle::Failed, _) => {
                    return Err(WaitError::Failed {
                        state: snapshot.state,
                    });
                }
                (Lifecycle::Ready, WaitTarget::Ready) => return Ok(WaitOutcome::Ready(snapshot)),
                (Lifecycle::Absent, WaitTarget::Absent) => return Ok(WaitOutcome::Absent),
                _ => {
                    tracing::debug!(
                        "Waiting for resource to become {} (state: {})",
                        target,
                        snapshot.state
                    );
                    last_state = Some(snapshot.state);
                }
            },
        }

        let next_poll = deadline.min(instant_after(Instant::now(), config.poll_interval));
        sleep_or_cancel(cancel, next_poll).await?;
    }
}

/// Roughly 30 years, the same horizon tokio uses for "never"
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// `base + after`, saturating to a far-future instant instead of overflowing
fn instant_after(base: Instant, after: Duration) -> Instant {
    base.checked_add(after)
        .or_else(|| base.checked_add(FAR_FUTURE))
        .unwrap_or(base)
}

async fn sleep_or_cancel<E>(cancel: &CancellationToken, until: Instant) -> Result<(), WaitError<E>> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(WaitError::Cancelled),
        _ = sleep_until(until) => Ok(()),
    }
}

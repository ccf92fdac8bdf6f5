//! Human-paced delays and retry for browser automation.
//!
//! Jitter sleeps spread actions over a randomized interval so the session
//! does not fire clicks in machine-regular bursts, and give lazily rendered
//! feed content time to arrive. They carry no correctness weight:
//! [`Pacing::none`] turns every delay off.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::DriverError;

/// Inclusive millisecond range a jitter delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl JitterRange {
    pub const ZERO: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Draws a delay uniformly from the range. A reversed or empty range
    /// yields `min_ms`.
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        let ms = rand::rng().random_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }
}

/// Delay ranges for each pause point of a scrape run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After each scroll while waiting for enough posts to render.
    pub scroll: JitterRange,
    /// After each accepted post.
    pub between_posts: JitterRange,
    /// After each recorded profile.
    pub between_profiles: JitterRange,
}

impl Pacing {
    /// No delays at all; for tests and dry runs.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            scroll: JitterRange::ZERO,
            between_posts: JitterRange::ZERO,
            between_profiles: JitterRange::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            scroll: JitterRange::new(600, 1_000),
            between_posts: JitterRange::new(300, 800),
            between_profiles: JitterRange::new(1_500, 3_500),
        }
    }
}

/// Sleeps for a random duration drawn from `range`.
pub async fn jitter_sleep(range: JitterRange) {
    let delay = range.sample();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Delays slept between attempts to reach a WebDriver server that may still
/// be booting. Each delay doubles the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StartupBackoff {
    pub first_delay: Duration,
    pub retries: u32,
}

impl StartupBackoff {
    fn delays(self) -> impl Iterator<Item = Duration> {
        std::iter::successors(Some(self.first_delay), |d| d.checked_mul(2))
            .take(usize::try_from(self.retries).unwrap_or(usize::MAX))
    }
}

/// The server refused or dropped the connection; anything else is a real answer.
fn server_not_ready(err: &DriverError) -> bool {
    matches!(err, DriverError::Http(e) if e.is_connect() || e.is_timeout())
}

/// Runs `attempt` until the WebDriver server answers or `backoff` is used up.
pub(crate) async fn until_driver_ready<T, F, Fut>(
    backoff: StartupBackoff,
    mut attempt: F,
) -> Result<T, DriverError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DriverError>>,
{
    let mut delays = backoff.delays();
    loop {
        match attempt().await {
            Err(err) if server_not_ready(&err) => {
                let Some(delay) = delays.next() else {
                    return Err(err);
                };
                tracing::warn!(?delay, error = %err, "WebDriver not reachable yet, retrying");
                tokio::time::sleep(delay).await;
            }
            outcome => return outcome,
        }
    }
}

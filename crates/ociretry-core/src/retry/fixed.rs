//! Constant-interval retry budget.

use super::strategy::BackoffStrategy;
use std::time::Duration;

/// Waits the same interval after every failure, with no growth and no jitter.
///
/// Capacity errors clear on the provider's schedule, not ours, so a steady
/// polling cadence is all that is needed here.
///
/// # Examples
///
/// ```rust
/// use ociretry_core::retry::{BackoffStrategy, FixedInterval};
/// use std::time::Duration;
///
/// let budget = FixedInterval::builder()
///     .max_attempts(1000)
///     .interval(Duration::from_secs(60))
///     .build();
///
/// assert_eq!(budget.next_delay(1), Some(Duration::from_secs(60)));
/// assert_eq!(budget.next_delay(999), Some(Duration::from_secs(60)));
/// assert_eq!(budget.next_delay(1000), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedInterval {
    interval: Duration,
    max_attempts: Option<u32>,
}

impl FixedInterval {
    /// Create a new builder for configuring a fixed interval.
    pub fn builder() -> FixedIntervalBuilder {
        FixedIntervalBuilder::default()
    }

    /// The delay applied between attempts.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FixedInterval {
    /// Defaults:
    /// - `interval`: 60s
    /// - `max_attempts`: 1000
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            max_attempts: Some(1000),
        }
    }
}

impl BackoffStrategy for FixedInterval {
    fn next_delay(&self, attempts: u32) -> Option<Duration> {
        if self.is_exhausted(attempts) {
            None
        } else {
            Some(self.interval)
        }
    }

    fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }
}

/// Builder for [`FixedInterval`].
///
/// ```rust
/// use ociretry_core::retry::FixedInterval;
/// use std::time::Duration;
///
/// let budget = FixedInterval::builder()
///     .max_attempts(0) // unlimited
///     .interval(Duration::from_secs(30))
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct FixedIntervalBuilder {
    interval: Option<Duration>,
    max_attempts: Option<u32>,
}

impl FixedIntervalBuilder {
    /// Set the delay between attempts.
    ///
    /// Default: 60s
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set the attempt budget. `0` means unlimited.
    ///
    /// Default: 1000
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Build the `FixedInterval`, using defaults for unset values.
    pub fn build(self) -> FixedInterval {
        let defaults = FixedInterval::default();
        let max_attempts = match self.max_attempts {
            Some(0) => None,
            Some(max) => Some(max),
            None => defaults.max_attempts,
        };

        FixedInterval {
            interval: self.interval.unwrap_or(defaults.interval),
            max_attempts,
        }
    }
}

//! The retry strategy trait.

use std::time::Duration;

/// A strategy deciding how long to wait between attempts and when to give up.
///
/// Callers own the loop. The strategy only answers two questions after each
/// failed attempt: "is the budget spent?" and "how long until the next one?".
/// Keeping the loop outside lets the caller rotate targets, classify failures
/// and observe cancellation between attempts.
///
/// # Examples
///
/// ```rust
/// use ociretry_core::retry::BackoffStrategy;
/// use std::time::Duration;
///
/// struct TwoQuickTries;
///
/// impl BackoffStrategy for TwoQuickTries {
///     fn next_delay(&self, attempts: u32) -> Option<Duration> {
///         (!self.is_exhausted(attempts)).then(|| Duration::from_millis(10))
///     }
///
///     fn max_attempts(&self) -> Option<u32> {
///         Some(2)
///     }
/// }
///
/// let strategy = TwoQuickTries;
/// assert_eq!(strategy.next_delay(1), Some(Duration::from_millis(10)));
/// assert_eq!(strategy.next_delay(2), None);
/// ```
pub trait BackoffStrategy: Send + Sync {
    /// Delay to wait after `attempts` attempts have failed.
    ///
    /// `attempts` is the number of attempts issued so far (1 after the first
    /// failure). Returns `None` once the budget is spent.
    fn next_delay(&self, attempts: u32) -> Option<Duration>;

    /// Total number of attempts allowed, or `None` for an unlimited budget.
    fn max_attempts(&self) -> Option<u32>;

    /// Whether `attempts` issued attempts have used up the budget.
    fn is_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts().is_some_and(|max| attempts >= max)
    }
}

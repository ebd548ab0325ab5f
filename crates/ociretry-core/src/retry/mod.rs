//! Retry budgets and inter-attempt delays.
//!
//! # Key Types
//!
//! - [`BackoffStrategy`] - how long to wait after a failed attempt, and when to stop
//! - [`FixedInterval`] - constant delay with an optional attempt budget
//!
//! # Examples
//!
//! ```rust
//! use ociretry_core::retry::{BackoffStrategy, FixedInterval};
//! use std::time::Duration;
//!
//! // Zero attempts means unlimited.
//! let forever = FixedInterval::builder()
//!     .max_attempts(0)
//!     .interval(Duration::from_secs(5))
//!     .build();
//!
//! assert_eq!(forever.max_attempts(), None);
//! assert!(!forever.is_exhausted(u32::MAX));
//! ```

mod fixed;
mod strategy;

pub use fixed::{FixedInterval, FixedIntervalBuilder};
pub use strategy::BackoffStrategy;

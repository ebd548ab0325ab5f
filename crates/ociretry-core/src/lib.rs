#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core abstractions for the ociretry workspace.
//!
//! This crate holds the small pieces every other ociretry crate leans on:
//!
//! - **Retry budgets** via the [`BackoffStrategy`](retry::BackoffStrategy) trait
//!   - Constant-interval delay ([`FixedInterval`](retry::FixedInterval))
//!   - Attempt budgets where zero means "never give up"
//! - **Cooperative cancellation** via [`OrCancelExt`](cancel::OrCancelExt),
//!   racing any future against a `CancellationToken`
//! - **Declarative error boundaries** via the `error_boundary!` macro
//!
//! # Examples
//!
//! ```rust
//! use ociretry_core::prelude::*;
//! use std::time::Duration;
//!
//! let budget = FixedInterval::builder()
//!     .max_attempts(3)
//!     .interval(Duration::from_secs(60))
//!     .build();
//!
//! assert_eq!(budget.next_delay(1), Some(Duration::from_secs(60)));
//! assert!(budget.is_exhausted(3));
//! ```

pub mod cancel;
pub mod error;
pub mod retry;

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use ociretry_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cancel::{Cancelled, OrCancelExt};
    pub use crate::error_boundary;
    pub use crate::retry::{BackoffStrategy, FixedInterval, FixedIntervalBuilder};
    pub use tokio_util::sync::CancellationToken;
}

//! Error conversion helpers.
//!
//! See [`error_boundary!`](crate::error_boundary).

mod boundary;

//! Subprocess transport for the provider CLI
//!
//! Runs the provider's command-line tool once per operation and captures its
//! exit status, stdout and stderr.

pub mod cli;
pub mod process;

pub use cli::OciCliGateway;
pub use process::{ProcessConfig, run_to_completion, run_with_timeout};

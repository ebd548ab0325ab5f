//! Capacity-retry instance provisioner for Oracle Cloud
//!
//! Capacity-constrained shapes (Ampere A1 and friends) are often rejected with
//! "Out of host capacity". This crate keeps issuing the same launch request,
//! rotating through the region's availability domains on capacity errors,
//! until an instance is running, the retry budget is spent, or the operator
//! interrupts.
//!
//! # Architecture
//!
//! 1. **Gateway** (`ociretry-transport`): the OCI CLI behind a narrow trait
//! 2. **Domain enumeration** ([`domains`]): best effort, falls back to the
//!    configured domain
//! 3. **Launch attempt** ([`attempt`]): one bounded request
//! 4. **Classification** ([`classify`]): decides rotation, never termination
//! 5. **Retry controller** ([`controller`]): the sequential state machine
//! 6. **Reporting** ([`reporter`]): colored console output

#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! # Usage
//!
//! ```ignore
//! use ociretry::{ConsoleReporter, OciCliGateway, ProvisionConfig, provision};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = ProvisionConfig::load("ociretry.toml")?;
//! let gateway = OciCliGateway::new(&config.cli_path);
//! let outcome = provision(&config, gateway, ConsoleReporter::stdout(true), CancellationToken::new()).await?;
//! std::process::exit(outcome.exit_code().into());
//! ```

pub mod app;
pub mod attempt;
pub mod classify;
pub mod config;
pub mod controller;
pub mod domains;
pub mod error;
pub mod events;
pub mod reporter;

pub mod testing;

// Re-export commonly used types
pub use app::{INSTALL_HINT, preflight, provision};
pub use attempt::{AttemptOutcome, InstanceDescriptor, launch_attempt};
pub use classify::{FailureClass, classify};
pub use config::{DEFAULT_CONFIG_FILE, ProvisionConfig};
pub use controller::{ControllerState, RetryController, RetryState, RunOutcome};
pub use domains::{DomainResolution, EnumerationError, FailureDomainList, resolve_domains};
pub use error::{ConfigError, ProvisionError, Result};
pub use events::ProgressEvent;
pub use reporter::{ConsoleReporter, ProgressReporter, format_elapsed};

pub use ociretry_transport::{OciCliGateway, ProviderGateway, ProvisionRequest};

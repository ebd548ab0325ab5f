//! Provider gateway for ociretry
//!
//! The retry loop never talks to the cloud provider directly. It goes through
//! the [`ProviderGateway`] trait defined here, which has exactly three
//! capabilities: check that the provider tooling is usable, list failure
//! domains, and launch one instance.
//!
//! # Architecture
//!
//! - **Gateway trait**: the narrow interface the retry loop is written against
//! - **Subprocess runner**: spawns the provider CLI, captures its output,
//!   kills it when the caller stops waiting
//! - **OCI CLI gateway**: builds `oci` command lines for the three capabilities

#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! # Usage
//!
//! ```ignore
//! use ociretry_transport::{OciCliGateway, ProviderGateway};
//!
//! let gateway = OciCliGateway::new("oci");
//! let version = gateway.check_available().await?;
//! let output = gateway.list_failure_domains("ocid1.compartment.oc1..xyz").await?;
//! ```

pub mod error;
pub mod subprocess;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use subprocess::{OciCliGateway, ProcessConfig};
pub use traits::ProviderGateway;
pub use types::{GatewayOutput, ProvisionRequest, RUNNING_STATE};

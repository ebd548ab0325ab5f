//! The provider gateway trait
//!
//! Everything the retry loop needs from the cloud provider, and nothing more.
//! Implementations return raw command results; interpreting them (success,
//! capacity error, garbage) is the caller's job, so a fake gateway only has to
//! replay canned [`GatewayOutput`]s.

use crate::error::Result;
use crate::types::{GatewayOutput, ProvisionRequest};
use async_trait::async_trait;

/// Provider operations used by the provisioning loop
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Check that the provider tooling can be used, returning its version.
    ///
    /// # Errors
    ///
    /// Fails when the tool is missing or reports an error.
    async fn check_available(&self) -> Result<String>;

    /// List the failure domains visible from a compartment.
    ///
    /// The expected payload on success is
    /// `{"data": [{"name": "..."}, ...]}`.
    async fn list_failure_domains(&self, compartment_id: &str) -> Result<GatewayOutput>;

    /// Issue one launch request and wait for the provider's answer.
    ///
    /// Every call creates a real launch request; nothing here deduplicates.
    /// The call may block for minutes, so callers bound it with a timeout.
    /// Dropping the returned future abandons the request locally, but does
    /// not undo anything the provider already started.
    async fn launch_instance(&self, request: &ProvisionRequest) -> Result<GatewayOutput>;
}


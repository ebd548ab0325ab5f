//! OCI CLI gateway
//!
//! Implements [`ProviderGateway`] by shelling out to the `oci` command-line
//! tool with `--output json`.

use super::process::{ProcessConfig, run_to_completion, run_with_timeout};
use crate::error::{Result, TransportError};
use crate::traits::ProviderGateway;
use crate::types::{GatewayOutput, ProvisionRequest, RUNNING_STATE};
use async_trait::async_trait;

/// Gateway backed by the OCI command-line tool
#[derive(Debug, Clone, Default)]
pub struct OciCliGateway {
    process: ProcessConfig,
}

impl OciCliGateway {
    /// Create a gateway that runs the CLI found at `cli_path`
    pub fn new(cli_path: impl Into<String>) -> Self {
        Self {
            process: ProcessConfig::new(cli_path),
        }
    }

    /// Create a gateway from a full process configuration
    pub fn with_config(process: ProcessConfig) -> Self {
        Self { process }
    }

    /// Process configuration used for every command
    pub fn config(&self) -> &ProcessConfig {
        &self.process
    }

    /// Arguments for `oci iam availability-domain list`
    pub fn list_domains_args(compartment_id: &str) -> Vec<String> {
        [
            "iam",
            "availability-domain",
            "list",
            "--compartment-id",
            compartment_id,
            "--output",
            "json",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    /// Arguments for `oci compute instance launch`, waiting for `RUNNING`
    pub fn launch_args(request: &ProvisionRequest) -> Vec<String> {
        vec![
            "compute".to_string(),
            "instance".to_string(),
            "launch".to_string(),
            "--compartment-id".to_string(),
            request.compartment_id.clone(),
            "--availability-domain".to_string(),
            request.availability_domain.clone(),
            "--shape".to_string(),
            request.shape.clone(),
            "--shape-config".to_string(),
            request.shape_config().to_string(),
            "--image-id".to_string(),
            request.image_id.clone(),
            "--subnet-id".to_string(),
            request.subnet_id.clone(),
            "--display-name".to_string(),
            request.display_name.clone(),
            "--assign-public-ip".to_string(),
            request.assign_public_ip.to_string(),
            "--ssh-authorized-keys-file".to_string(),
            request.ssh_public_key_path.display().to_string(),
            "--wait-for-state".to_string(),
            RUNNING_STATE.to_string(),
            "--output".to_string(),
            "json".to_string(),
        ]
    }
}

#[async_trait]
impl ProviderGateway for OciCliGateway {
    async fn check_available(&self) -> Result<String> {
        let output = run_with_timeout(
            &self.process,
            &["--version".to_string()],
            self.process.timeout,
        )
        .await?;

        if !output.success() {
            return Err(TransportError::NonZeroExit {
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output.stdout.trim().to_string())
    }

    async fn list_failure_domains(&self, compartment_id: &str) -> Result<GatewayOutput> {
        run_with_timeout(
            &self.process,
            &Self::list_domains_args(compartment_id),
            self.process.timeout,
        )
        .await
    }

    async fn launch_instance(&self, request: &ProvisionRequest) -> Result<GatewayOutput> {
        tracing::info!(
            domain = %request.availability_domain,
            shape = %request.shape,
            "Issuing launch request"
        );
        run_to_completion(&self.process, &Self::launch_args(request)).await
    }
}

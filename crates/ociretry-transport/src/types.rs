//! Request and response types exchanged with the provider gateway.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle state a launch waits for, and the only one counted as success.
pub const RUNNING_STATE: &str = "RUNNING";

/// Immutable description of the instance to create.
///
/// One request is derived per attempt; consecutive attempts differ only in
/// `availability_domain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    /// Compartment the instance is created in
    pub compartment_id: String,

    /// Failure domain targeted by this attempt
    pub availability_domain: String,

    /// Machine shape, e.g. `VM.Standard.A1.Flex`
    pub shape: String,

    /// OCPU count for flexible shapes
    pub ocpus: u32,

    /// Memory size in gigabytes for flexible shapes
    pub memory_in_gbs: u32,

    /// Boot image
    pub image_id: String,

    /// Subnet the primary VNIC attaches to
    pub subnet_id: String,

    /// Display name of the new instance
    pub display_name: String,

    /// Public key file authorized for SSH access
    pub ssh_public_key_path: PathBuf,

    /// Whether the primary VNIC gets a public IP
    pub assign_public_ip: bool,
}

impl ProvisionRequest {
    /// Copy of this request aimed at another failure domain.
    #[must_use]
    pub fn with_availability_domain(&self, domain: impl Into<String>) -> Self {
        Self {
            availability_domain: domain.into(),
            ..self.clone()
        }
    }

    /// Shape sizing in the provider's JSON form.
    pub fn shape_config(&self) -> serde_json::Value {
        serde_json::json!({
            "ocpus": self.ocpus,
            "memoryInGBs": self.memory_in_gbs,
        })
    }
}

/// Raw result of one provider command.
///
/// The payload is opaque here; callers decode `stdout` defensively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayOutput {
    /// Exit status, `-1` if the process was terminated by a signal
    pub status: i32,

    /// Standard output, usually JSON
    pub stdout: String,

    /// Standard error, diagnostics
    pub stderr: String,
}

impl GatewayOutput {
    /// Create an output record
    pub fn new(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Whether the command reported success
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Parse standard output as JSON
    pub fn json(&self) -> crate::error::Result<serde_json::Value> {
        Ok(serde_json::from_str(self.stdout.trim())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request() -> ProvisionRequest {
        ProvisionRequest {
            compartment_id: "ocid1.compartment.oc1..aaa".to_string(),
            availability_domain: "AD-1".to_string(),
            shape: "VM.Standard.A1.Flex".to_string(),
            ocpus: 2,
            memory_in_gbs: 12,
            image_id: "ocid1.image.oc1..bbb".to_string(),
            subnet_id: "ocid1.subnet.oc1..ccc".to_string(),
            display_name: "my-instance".to_string(),
            ssh_public_key_path: PathBuf::from("/home/me/.ssh/id_rsa.pub"),
            assign_public_ip: true,
        }
    }

    #[test]
    fn test_with_availability_domain_changes_only_domain() {
        let base = request();
        let moved = base.with_availability_domain("AD-2");

        assert_eq!(moved.availability_domain, "AD-2");
        assert_eq!(base.availability_domain, "AD-1");
        assert_eq!(moved.with_availability_domain("AD-1"), base);
    }

    #[test]
    fn test_shape_config_uses_provider_keys() {
        let config = request().shape_config();

        assert_eq!(config["ocpus"], 2);
        assert_eq!(config["memoryInGBs"], 12);
        assert_eq!(config.as_object().map(|o| o.len()), Some(2));
    }

    #[test]
    fn test_output_json() {
        let ok = GatewayOutput::new(0, "  {\"data\": []}\n", "");
        let garbage = GatewayOutput::new(0, "not json", "");

        assert!(ok.success());
        assert_eq!(ok.json().unwrap(), serde_json::json!({"data": []}));
        assert!(garbage.json().is_err());
    }
}

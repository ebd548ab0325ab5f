//! Provisioner configuration
//!
//! Loaded once at startup from a TOML file and then only ever borrowed.
//! Required fields describe the instance; the rest tune the retry loop.
//!
//! ```toml
//! compartment_id = "ocid1.compartment.oc1..aaaa"
//! availability_domain = "kIdk:AP-MUMBAI-1-AD-1"
//! shape = "VM.Standard.A1.Flex"
//! ocpus = 2
//! memory_in_gbs = 12
//! image_id = "ocid1.image.oc1..bbbb"
//! subnet_id = "ocid1.subnet.oc1..cccc"
//! display_name = "my-instance"
//!
//! # optional
//! ssh_public_key_path = "~/.ssh/id_rsa.pub"
//! max_retries = 1000          # 0 = unlimited
//! retry_interval_secs = 60
//! try_multiple_ads = true
//! attempt_timeout_secs = 300
//! ```

use crate::error::ConfigError;
use ociretry_core::retry::FixedInterval;
use ociretry_transport::ProvisionRequest;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "ociretry.toml";

/// Immutable provisioning configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvisionConfig {
    /// Compartment the instance is created in
    pub compartment_id: String,

    /// Failure domain used when enumeration is off or fails
    pub availability_domain: String,

    /// Machine shape
    pub shape: String,

    /// OCPU count
    pub ocpus: u32,

    /// Memory in gigabytes
    pub memory_in_gbs: u32,

    /// Boot image
    pub image_id: String,

    /// Subnet for the primary VNIC
    pub subnet_id: String,

    /// Display name of the new instance
    pub display_name: String,

    /// SSH public key authorized on the instance
    #[serde(default = "default_ssh_public_key_path")]
    pub ssh_public_key_path: PathBuf,

    /// Attempt budget, `0` for unlimited
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between attempts, in seconds
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,

    /// Rotate through every availability domain of the region
    #[serde(default = "default_true")]
    pub try_multiple_ads: bool,

    /// Hard bound on a single launch attempt, in seconds
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    /// Provider CLI executable
    #[serde(default = "default_cli_path")]
    pub cli_path: String,

    /// Give the instance a public IP
    #[serde(default = "default_true")]
    pub assign_public_ip: bool,
}

fn default_ssh_public_key_path() -> PathBuf {
    PathBuf::from("~/.ssh/id_rsa.pub")
}

fn default_max_retries() -> u32 {
    1000
}

fn default_retry_interval_secs() -> u64 {
    60
}

fn default_attempt_timeout_secs() -> u64 {
    300
}

fn default_cli_path() -> String {
    "oci".to_string()
}

fn default_true() -> bool {
    true
}

impl ProvisionConfig {
    /// Load and parse a configuration file, expanding `~` in the key path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid TOML,
    /// lacks a required field, or uses `~` without a known home directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), shape = %config.shape, "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// See [`ProvisionConfig::load`].
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(raw)?;
        config.ssh_public_key_path = expand_home(&config.ssh_public_key_path)?;
        Ok(config)
    }

    /// Launch request for one failure domain.
    pub fn request_for(&self, domain: &str) -> ProvisionRequest {
        ProvisionRequest {
            compartment_id: self.compartment_id.clone(),
            availability_domain: domain.to_string(),
            shape: self.shape.clone(),
            ocpus: self.ocpus,
            memory_in_gbs: self.memory_in_gbs,
            image_id: self.image_id.clone(),
            subnet_id: self.subnet_id.clone(),
            display_name: self.display_name.clone(),
            ssh_public_key_path: self.ssh_public_key_path.clone(),
            assign_public_ip: self.assign_public_ip,
        }
    }

    /// Retry budget and delay derived from `max_retries` and `retry_interval_secs`.
    pub fn backoff(&self) -> FixedInterval {
        FixedInterval::builder()
            .max_attempts(self.max_retries)
            .interval(self.retry_interval())
            .build()
    }

    /// Delay between attempts
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    /// Bound on a single launch attempt
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Set the attempt budget (`0` = unlimited)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay between attempts
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval_secs = interval.as_secs();
        self
    }

    /// Set the bound on a single launch attempt
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout_secs = timeout.as_secs();
        self
    }

    /// Enable or disable availability-domain rotation
    pub fn with_multiple_ads(mut self, enabled: bool) -> Self {
        self.try_multiple_ads = enabled;
        self
    }
}

fn expand_home(path: &Path) -> Result<PathBuf, ConfigError> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };

    let home =
        dirs::home_dir().ok_or_else(|| ConfigError::MissingHome(path.display().to_string()))?;
    Ok(home.join(rest))
}

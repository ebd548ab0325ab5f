//! Error types for the provisioner
//!
//! Only two things can stop a run with an error: the configuration cannot be
//! loaded, or the provider tooling is missing. Everything that goes wrong
//! inside a single launch attempt is an [`AttemptOutcome`](crate::attempt::AttemptOutcome)
//! handled by the retry loop, never an error.

use ociretry_core::error_boundary;
use ociretry_transport::TransportError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for provisioner operations
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Failure to obtain a usable configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("cannot read configuration file {}: {source}", path.display())]
    Read {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or lacks a required field
    #[error("invalid configuration: {0}")]
    Parse(String),

    /// A `~` path was used but the home directory is unknown
    #[error("cannot expand `~` in {0}: home directory is unknown")]
    MissingHome(String),
}

error_boundary!(toml::de::Error => ConfigError, |e| {
    ConfigError::Parse(e.to_string().trim_end().to_string())
});

/// Errors that end a run before the retry loop starts
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The provider CLI is not installed or not working
    #[error("provider CLI not available: {0}")]
    PrerequisiteMissing(#[source] TransportError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

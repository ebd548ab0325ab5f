//! Transport error types

use std::time::Duration;
use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while driving the provider tooling
#[derive(Debug, Error)]
pub enum TransportError {
    /// The provider CLI could not be started at all
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        /// Program that was being started
        program: String,
        /// Underlying spawn failure
        #[source]
        source: std::io::Error,
    },

    /// I/O error while talking to a running process
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The command did not finish within its bound
    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    /// The command ran but reported failure
    #[error("command exited with status {status}: {stderr}")]
    NonZeroExit {
        /// Exit status (-1 when killed by a signal)
        status: i32,
        /// Captured standard error
        stderr: String,
    },

    /// Output could not be decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TransportError {
    /// Whether the failure means the provider tooling is not installed.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

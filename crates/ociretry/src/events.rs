//! Progress events emitted during a run

use crate::attempt::InstanceDescriptor;
use crate::classify::FailureClass;
use chrono::{DateTime, Local};
use std::time::Duration;

/// Something the operator should hear about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Start of the run
    Banner,

    /// The provider CLI answered `--version`
    ToolFound {
        /// Reported version string
        version: String,
    },

    /// The provider CLI is missing or broken
    ToolMissing {
        /// Why the check failed
        detail: String,
    },

    /// Effective configuration
    Configuration {
        /// Machine shape
        shape: String,
        /// OCPU count
        ocpus: u32,
        /// Memory in gigabytes
        memory_in_gbs: u32,
        /// Configured availability domain
        availability_domain: String,
        /// Delay between attempts
        retry_interval: Duration,
        /// Attempt budget, `None` for unlimited
        max_attempts: Option<u32>,
    },

    /// Domain enumeration failed; the configured domain is used alone
    EnumerationFallback {
        /// What went wrong
        reason: String,
    },

    /// Domains the loop will rotate through
    DomainsResolved {
        /// Rotation order
        domains: Vec<String>,
    },

    /// The retry loop is about to make its first attempt
    LoopStarted,

    /// An attempt is starting
    AttemptStarted {
        /// 1-based attempt number
        attempt: u32,
        /// Targeted domain
        domain: String,
        /// Time since the loop started
        elapsed: Duration,
        /// Wall-clock start of the attempt
        timestamp: DateTime<Local>,
    },

    /// An attempt ended without a running instance
    AttemptFailed {
        /// 1-based attempt number
        attempt: u32,
        /// Classification of the diagnostic text
        class: FailureClass,
        /// Truncated diagnostic text
        detail: String,
        /// The request never reached the provider
        gateway_error: bool,
    },

    /// An attempt exceeded its bound
    AttemptTimedOut {
        /// 1-based attempt number
        attempt: u32,
        /// The bound that was hit
        timeout: Duration,
    },

    /// Sleeping before the next attempt
    Waiting {
        /// Delay
        interval: Duration,
    },

    /// An instance is running
    Succeeded {
        /// Provider-reported instance fields
        instance: InstanceDescriptor,
        /// Attempts made, including the successful one
        attempts: u32,
        /// Time since the loop started
        elapsed: Duration,
    },

    /// The attempt budget is spent
    BudgetExhausted {
        /// The budget
        max_attempts: u32,
        /// Attempts made
        attempts: u32,
        /// Time since the loop started
        elapsed: Duration,
    },

    /// The operator interrupted the run
    Cancelled {
        /// Attempts made before the interrupt
        attempts: u32,
        /// Time since the loop started
        elapsed: Duration,
    },
}

//! Availability domain enumeration
//!
//! Resolves the ordered list of failure domains the retry loop rotates
//! through. Enumeration is best effort: any problem degrades to the single
//! configured domain.

use crate::config::ProvisionConfig;
use ociretry_transport::{GatewayOutput, ProviderGateway, TransportError};
use thiserror::Error;

/// Non-empty, ordered list of failure domains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDomainList {
    domains: Vec<String>,
}

impl FailureDomainList {
    /// Build a list, or `None` if `domains` is empty.
    pub fn new(domains: Vec<String>) -> Option<Self> {
        (!domains.is_empty()).then_some(Self { domains })
    }

    /// A list holding only `domain`.
    pub fn single(domain: impl Into<String>) -> Self {
        Self {
            domains: vec![domain.into()],
        }
    }

    /// Round-robin pick: `domains[rotation_index mod len]`.
    pub fn domain_for(&self, rotation_index: usize) -> &str {
        &self.domains[rotation_index % self.domains.len()]
    }

    /// Number of domains, never zero.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Always `false`; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Domains in rotation order.
    pub fn as_slice(&self) -> &[String] {
        &self.domains
    }
}

/// Why enumeration fell back to the configured domain
#[derive(Debug, Error)]
pub enum EnumerationError {
    /// The gateway could not run the listing
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The listing command reported failure
    #[error("listing exited with status {status}: {stderr}")]
    Status {
        /// Exit status
        status: i32,
        /// Captured standard error
        stderr: String,
    },

    /// The payload was not the expected JSON shape
    #[error("malformed listing: {0}")]
    Malformed(String),

    /// The provider returned no domains
    #[error("provider returned no availability domains")]
    Empty,
}

/// Result of domain resolution
#[derive(Debug)]
pub struct DomainResolution {
    /// Domains to rotate through
    pub domains: FailureDomainList,

    /// Set when enumeration failed and the configured domain was used instead
    pub fallback: Option<EnumerationError>,
}

/// Resolve the rotation list for this run.
///
/// With `try_multiple_ads` off the gateway is not consulted.
pub async fn resolve_domains<G>(gateway: &G, config: &ProvisionConfig) -> DomainResolution
where
    G: ProviderGateway + ?Sized,
{
    if !config.try_multiple_ads {
        return DomainResolution {
            domains: FailureDomainList::single(&config.availability_domain),
            fallback: None,
        };
    }

    match enumerate(gateway, &config.compartment_id).await {
        Ok(domains) => {
            tracing::info!(count = domains.len(), "Enumerated availability domains");
            DomainResolution {
                domains,
                fallback: None,
            }
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                fallback = %config.availability_domain,
                "Could not enumerate availability domains"
            );
            DomainResolution {
                domains: FailureDomainList::single(&config.availability_domain),
                fallback: Some(err),
            }
        }
    }
}

async fn enumerate<G>(gateway: &G, compartment_id: &str) -> Result<FailureDomainList, EnumerationError>
where
    G: ProviderGateway + ?Sized,
{
    let output = gateway.list_failure_domains(compartment_id).await?;
    let names = parse_domain_names(&output)?;
    FailureDomainList::new(names).ok_or(EnumerationError::Empty)
}

/// Extract `data[].name` from a listing, in provider order.
///
/// Entries without a string `name` are skipped.
pub fn parse_domain_names(output: &GatewayOutput) -> Result<Vec<String>, EnumerationError> {
    if !output.success() {
        return Err(EnumerationError::Status {
            status: output.status,
            stderr: crate::classify::truncate_diagnostic(&output.stderr).to_string(),
        });
    }

    let payload = output
        .json()
        .map_err(|e| EnumerationError::Malformed(e.to_string()))?;
    let entries = payload
        .get("data")
        .and_then(|data| data.as_array())
        .ok_or_else(|| EnumerationError::Malformed("missing `data` array".to_string()))?;

    Ok(entries
        .iter()
        .filter_map(|entry| entry.get("name").and_then(|name| name.as_str()))
        .map(String::from)
        .collect())
}

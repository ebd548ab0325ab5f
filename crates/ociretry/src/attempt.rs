//! A single bounded launch attempt

use ociretry_transport::{GatewayOutput, ProviderGateway, ProvisionRequest, RUNNING_STATE};
use serde_json::Value;
use std::time::Duration;

/// Instance fields reported back by the provider on success
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceDescriptor {
    /// Instance OCID
    pub id: Option<String>,
    /// Display name
    pub display_name: Option<String>,
    /// Lifecycle state, `RUNNING` for a successful launch
    pub lifecycle_state: Option<String>,
    /// Shape
    pub shape: Option<String>,
    /// Availability domain the instance landed in
    pub availability_domain: Option<String>,
}

impl InstanceDescriptor {
    /// Read the descriptor from the provider's `data` object.
    ///
    /// Non-string or absent fields become `None`.
    pub fn from_json(data: &Value) -> Self {
        let field = |key: &str| data.get(key).and_then(Value::as_str).map(String::from);

        Self {
            id: field("id"),
            display_name: field("display-name"),
            lifecycle_state: field("lifecycle-state"),
            shape: field("shape"),
            availability_domain: field("availability-domain"),
        }
    }

    /// Render an optional field, `N/A` when missing
    pub fn display(field: &Option<String>) -> &str {
        field.as_deref().unwrap_or("N/A")
    }
}

/// Result of one launch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The instance reached `RUNNING`
    Succeeded(InstanceDescriptor),

    /// The provider answered with something other than a running instance
    TransientFailure(String),

    /// The request never reached the provider
    FatalFailure(String),

    /// No answer within the attempt bound
    Timeout,
}

/// Issue one launch request, giving up after `timeout`.
///
/// Dropping the launch future on timeout kills the CLI child process, but a
/// request the provider already accepted may still complete remotely.
pub async fn launch_attempt<G>(
    gateway: &G,
    request: &ProvisionRequest,
    timeout: Duration,
) -> AttemptOutcome
where
    G: ProviderGateway + ?Sized,
{
    match tokio::time::timeout(timeout, gateway.launch_instance(request)).await {
        Err(_) => {
            tracing::warn!(
                domain = %request.availability_domain,
                timeout_secs = timeout.as_secs(),
                "Launch attempt timed out"
            );
            AttemptOutcome::Timeout
        }
        Ok(Err(err)) => {
            tracing::warn!(domain = %request.availability_domain, error = %err, "Gateway failed");
            AttemptOutcome::FatalFailure(err.to_string())
        }
        Ok(Ok(output)) => interpret_launch_output(&output),
    }
}

/// Decide what a finished launch command means.
///
/// Success needs a zero exit and `data.lifecycle-state == "RUNNING"`;
/// anything else is a transient failure carrying the standard error text.
pub fn interpret_launch_output(output: &GatewayOutput) -> AttemptOutcome {
    tracing::debug!(
        status = output.status,
        stdout = %output.stdout,
        stderr = %output.stderr,
        "Launch command finished"
    );

    if output.success()
        && let Some(instance) = running_instance(output)
    {
        return AttemptOutcome::Succeeded(instance);
    }

    AttemptOutcome::TransientFailure(output.stderr.clone())
}

fn running_instance(output: &GatewayOutput) -> Option<InstanceDescriptor> {
    let payload = output.json().ok()?;
    let data = payload.get("data")?;

    (data.get("lifecycle-state").and_then(Value::as_str) == Some(RUNNING_STATE))
        .then(|| InstanceDescriptor::from_json(data))
}

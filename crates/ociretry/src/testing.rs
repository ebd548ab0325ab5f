//! Testing utilities
//!
//! A scripted provider gateway and a recording reporter, so the retry loop
//! can be exercised without the OCI CLI or a cloud account.

use crate::config::ProvisionConfig;
use crate::events::ProgressEvent;
use crate::reporter::ProgressReporter;
use async_trait::async_trait;
use ociretry_core::prelude::CancellationToken;
use ociretry_transport::{GatewayOutput, ProviderGateway, ProvisionRequest, TransportError};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// What the scripted gateway does for one launch call
#[derive(Debug, Clone)]
pub enum LaunchScript {
    /// Return this command output
    Respond(GatewayOutput),

    /// Fail as if the CLI could not be started
    Fail,

    /// Never answer
    Hang,
}

/// Gateway that replays canned answers
///
/// Clones share state, so a test can keep one handle and give another to
/// the controller.
#[derive(Debug, Clone)]
pub struct ScriptedGateway {
    /// `None` simulates a missing CLI
    version: Option<String>,

    /// `None` makes listing fail
    domain_listing: Option<GatewayOutput>,

    /// Consumed front to back
    launches: Arc<Mutex<VecDeque<LaunchScript>>>,

    /// Used once the queue is empty
    fallback: LaunchScript,

    launched: Arc<Mutex<Vec<ProvisionRequest>>>,
    list_calls: Arc<Mutex<usize>>,
}

impl ScriptedGateway {
    /// A gateway with a working CLI, failing domain listing and an empty
    /// launch queue that answers with capacity errors
    pub fn new() -> Self {
        Self {
            version: Some("3.49.0".to_string()),
            domain_listing: None,
            launches: Arc::new(Mutex::new(VecDeque::new())),
            fallback: LaunchScript::Respond(capacity_error_output()),
            launched: Arc::new(Mutex::new(Vec::new())),
            list_calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Simulate a missing CLI
    pub fn without_cli(mut self) -> Self {
        self.version = None;
        self
    }

    /// List these domains successfully
    pub fn with_domains(self, domains: &[&str]) -> Self {
        let data: Vec<_> = domains
            .iter()
            .map(|name| serde_json::json!({ "name": name }))
            .collect();
        self.with_domain_listing(GatewayOutput::new(
            0,
            serde_json::json!({ "data": data }).to_string(),
            "",
        ))
    }

    /// Answer domain listing with this raw output
    pub fn with_domain_listing(mut self, output: GatewayOutput) -> Self {
        self.domain_listing = Some(output);
        self
    }

    /// Queue launch answers
    pub fn with_launches(mut self, scripts: impl IntoIterator<Item = LaunchScript>) -> Self {
        self.launches = Arc::new(Mutex::new(scripts.into_iter().collect()));
        self
    }

    /// What to do once the queue runs dry
    pub fn with_fallback_launch(mut self, script: LaunchScript) -> Self {
        self.fallback = script;
        self
    }

    /// Requests received so far, in order
    pub async fn launched(&self) -> Vec<ProvisionRequest> {
        self.launched.lock().await.clone()
    }

    /// Number of domain listing calls
    pub async fn list_calls(&self) -> usize {
        *self.list_calls.lock().await
    }
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn missing_cli() -> TransportError {
    TransportError::Spawn {
        program: "oci".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
    }
}

#[async_trait]
impl ProviderGateway for ScriptedGateway {
    async fn check_available(&self) -> ociretry_transport::Result<String> {
        self.version.clone().ok_or_else(missing_cli)
    }

    async fn list_failure_domains(&self, _compartment_id: &str) -> ociretry_transport::Result<GatewayOutput> {
        *self.list_calls.lock().await += 1;
        self.domain_listing.clone().ok_or_else(|| {
            TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "listing unavailable",
            ))
        })
    }

    async fn launch_instance(&self, request: &ProvisionRequest) -> ociretry_transport::Result<GatewayOutput> {
        self.launched.lock().await.push(request.clone());

        let script = self
            .launches
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match script {
            LaunchScript::Respond(output) => Ok(output),
            LaunchScript::Fail => Err(missing_cli()),
            LaunchScript::Hang => std::future::pending().await,
        }
    }
}

/// Reporter that keeps every event
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Vec<ProgressEvent>,
    cancel_on_wait: Option<(CancellationToken, u32)>,
    last_attempt: u32,
}

impl RecordingReporter {
    /// Cancel `token` when the loop starts waiting after attempt `attempt`,
    /// as an operator pressing Ctrl+C during the delay would
    pub fn cancelling_on_wait(token: CancellationToken, attempt: u32) -> Self {
        Self {
            cancel_on_wait: Some((token, attempt)),
            ..Self::default()
        }
    }

    /// Events in emission order
    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }

    /// Domain targeted by each attempt
    pub fn attempt_domains(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ProgressEvent::AttemptStarted { domain, .. } => Some(domain.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn report(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::AttemptStarted { attempt, .. } => self.last_attempt = *attempt,
            ProgressEvent::Waiting { .. } => {
                if let Some((token, attempt)) = &self.cancel_on_wait
                    && *attempt == self.last_attempt
                {
                    token.cancel();
                }
            }
            _ => {}
        }
        self.events.push(event.clone());
    }
}

/// Configuration with no delay between attempts and a fixed key path
pub fn sample_config() -> ProvisionConfig {
    ProvisionConfig {
        compartment_id: "ocid1.compartment.oc1..test".to_string(),
        availability_domain: "AD-1".to_string(),
        shape: "VM.Standard.A1.Flex".to_string(),
        ocpus: 2,
        memory_in_gbs: 12,
        image_id: "ocid1.image.oc1..test".to_string(),
        subnet_id: "ocid1.subnet.oc1..test".to_string(),
        display_name: "my-instance".to_string(),
        ssh_public_key_path: PathBuf::from("/tmp/ociretry-test/id_rsa.pub"),
        max_retries: 1000,
        retry_interval_secs: 0,
        try_multiple_ads: true,
        attempt_timeout_secs: 300,
        cli_path: "oci".to_string(),
        assign_public_ip: true,
    }
}

/// Launch output for an instance that reached `RUNNING` in `domain`
pub fn running_output(domain: &str) -> GatewayOutput {
    GatewayOutput::new(
        0,
        serde_json::json!({
            "data": {
                "id": "ocid1.instance.oc1..test",
                "display-name": "my-instance",
                "lifecycle-state": "RUNNING",
                "shape": "VM.Standard.A1.Flex",
                "availability-domain": domain,
            }
        })
        .to_string(),
        "",
    )
}

/// Launch output for a domain without capacity
pub fn capacity_error_output() -> GatewayOutput {
    GatewayOutput::new(
        1,
        "",
        r#"ServiceError: {"code": "InternalError", "message": "Out of host capacity.", "status": 500}"#,
    )
}

/// Launch output for an ordinary provider error
pub fn generic_error_output() -> GatewayOutput {
    GatewayOutput::new(
        1,
        "",
        r#"ServiceError: {"code": "NotAuthorizedOrNotFound", "message": "Authorization failed or requested resource not found.", "status": 404}"#,
    )
}

/// Launch output that exits cleanly but is not yet running
pub fn provisioning_output() -> GatewayOutput {
    GatewayOutput::new(
        0,
        serde_json::json!({ "data": { "lifecycle-state": "PROVISIONING" } }).to_string(),
        "",
    )
}

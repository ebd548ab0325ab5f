//! Run orchestration: banner, preflight, configuration summary, retry loop

use crate::config::ProvisionConfig;
use crate::controller::{RetryController, RunOutcome};
use crate::error::{ProvisionError, Result};
use crate::events::ProgressEvent;
use crate::reporter::ProgressReporter;
use ociretry_core::prelude::*;
use ociretry_transport::ProviderGateway;

/// Where to get the OCI CLI
pub const INSTALL_HINT: &str =
    "https://docs.oracle.com/en-us/iaas/Content/API/SDKDocs/cliinstall.htm";

/// Check that the provider CLI runs, returning its version.
///
/// # Errors
///
/// [`ProvisionError::PrerequisiteMissing`] if the CLI cannot be started or
/// fails `--version`.
pub async fn preflight<G, R>(gateway: &G, reporter: &mut R) -> Result<String>
where
    G: ProviderGateway + ?Sized,
    R: ProgressReporter + ?Sized,
{
    match gateway.check_available().await {
        Ok(version) => {
            tracing::info!(version = %version, "Provider CLI available");
            reporter.report(&ProgressEvent::ToolFound {
                version: version.clone(),
            });
            Ok(version)
        }
        Err(err) => {
            tracing::error!(error = %err, not_found = err.is_not_found(), "Provider CLI unusable");
            reporter.report(&ProgressEvent::ToolMissing {
                detail: err.to_string(),
            });
            Err(ProvisionError::PrerequisiteMissing(err))
        }
    }
}

/// Provision one instance: preflight, then retry until a terminal outcome.
///
/// # Errors
///
/// Only a failed preflight is an error; every loop ending is a [`RunOutcome`].
pub async fn provision<G, R>(
    config: &ProvisionConfig,
    gateway: G,
    mut reporter: R,
    cancel: CancellationToken,
) -> Result<RunOutcome>
where
    G: ProviderGateway,
    R: ProgressReporter,
{
    reporter.report(&ProgressEvent::Banner);
    preflight(&gateway, &mut reporter).await?;

    reporter.report(&ProgressEvent::Configuration {
        shape: config.shape.clone(),
        ocpus: config.ocpus,
        memory_in_gbs: config.memory_in_gbs,
        availability_domain: config.availability_domain.clone(),
        retry_interval: config.retry_interval(),
        max_attempts: config.backoff().max_attempts(),
    });

    let mut controller = RetryController::new(config, gateway, reporter, cancel);
    Ok(controller.run().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingReporter, ScriptedGateway, running_output, sample_config};
    use ociretry_transport::GatewayOutput;

    #[tokio::test]
    async fn test_preflight_reports_version() {
        let mut reporter = RecordingReporter::default();

        let version = preflight(&ScriptedGateway::new(), &mut reporter).await.unwrap();

        assert_eq!(version, "3.49.0");
        assert_eq!(
            reporter.events(),
            &[ProgressEvent::ToolFound {
                version: "3.49.0".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_cli_stops_before_any_attempt() {
        let gateway = ScriptedGateway::new().without_cli();
        let mut reporter = RecordingReporter::default();

        let result = provision(&sample_config(), gateway.clone(), &mut reporter, CancellationToken::new()).await;

        assert!(matches!(result, Err(ProvisionError::PrerequisiteMissing(ref e)) if e.is_not_found()));
        assert!(gateway.launched().await.is_empty());
        assert!(matches!(reporter.events().last(), Some(ProgressEvent::ToolMissing { .. })));
    }

    #[tokio::test]
    async fn test_event_order_for_first_try_success() {
        let gateway = ScriptedGateway::new()
            .with_domain_listing(GatewayOutput::new(0, r#"{"data": [{"name": "AD-1"}]}"#, ""))
            .with_launches([crate::testing::LaunchScript::Respond(running_output("AD-1"))]);
        let mut reporter = RecordingReporter::default();

        let outcome = provision(&sample_config(), gateway, &mut reporter, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.attempts(), 1);
        let kinds: Vec<&str> = reporter
            .events()
            .iter()
            .map(|event| match event {
                ProgressEvent::Banner => "banner",
                ProgressEvent::ToolFound { .. } => "tool",
                ProgressEvent::Configuration { .. } => "config",
                ProgressEvent::DomainsResolved { .. } => "domains",
                ProgressEvent::LoopStarted => "loop",
                ProgressEvent::AttemptStarted { .. } => "attempt",
                ProgressEvent::Succeeded { .. } => "success",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["banner", "tool", "config", "domains", "loop", "attempt", "success"]);
    }
}

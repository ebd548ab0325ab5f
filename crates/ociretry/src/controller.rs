//! The retry controller
//!
//! Drives one provisioning goal to a terminal state:
//!
//! ```text
//! Idle -> Enumerating -> Attempting -> Classifying -+-> Succeeded
//!                           ^                       +-> BudgetExhausted
//!                           +------- Waiting <------+
//! ```
//!
//! Any suspension point (enumeration, an attempt, the wait) can end in
//! `Cancelled` when the token fires. Attempts are strictly sequential.

use crate::attempt::{AttemptOutcome, InstanceDescriptor, launch_attempt};
use crate::classify::{classify, truncate_diagnostic};
use crate::config::ProvisionConfig;
use crate::domains::resolve_domains;
use crate::events::ProgressEvent;
use crate::reporter::ProgressReporter;
use ociretry_core::prelude::*;
use ociretry_transport::ProviderGateway;
use std::time::Duration;
use tokio::time::Instant;

/// Where the controller is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Not started
    Idle,
    /// Resolving failure domains
    Enumerating,
    /// A launch request is in flight
    Attempting,
    /// Deciding what the last attempt means
    Classifying,
    /// Sleeping before the next attempt
    Waiting,
    /// An instance is running
    Succeeded,
    /// The attempt budget is spent
    BudgetExhausted,
    /// The operator interrupted the run
    Cancelled,
}

/// Mutable loop bookkeeping, owned by one run
#[derive(Debug, Clone)]
pub struct RetryState {
    /// Launch attempts issued so far
    pub attempts: u32,
    /// Advances only on capacity errors
    pub rotation_index: usize,
    /// Loop entry
    pub started: Instant,
}

impl RetryState {
    fn new() -> Self {
        Self {
            attempts: 0,
            rotation_index: 0,
            started: Instant::now(),
        }
    }

    /// Time since the loop started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// An instance reached `RUNNING`
    Succeeded {
        /// Provider-reported instance fields
        instance: InstanceDescriptor,
        /// Attempts made, including the successful one
        attempts: u32,
        /// Time spent in the loop
        elapsed: Duration,
        /// Domain of the successful attempt
        domain: String,
    },

    /// Every budgeted attempt failed
    BudgetExhausted {
        /// Attempts made
        attempts: u32,
        /// The budget
        max_attempts: u32,
        /// Time spent in the loop
        elapsed: Duration,
    },

    /// Interrupted by the operator
    Cancelled {
        /// Attempts made before the interrupt
        attempts: u32,
        /// Time spent in the loop
        elapsed: Duration,
    },
}

impl RunOutcome {
    /// Process exit code: only an exhausted budget is a failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Succeeded { .. } | Self::Cancelled { .. } => 0,
            Self::BudgetExhausted { .. } => 1,
        }
    }

    /// Number of launch attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. }
            | Self::BudgetExhausted { attempts, .. }
            | Self::Cancelled { attempts, .. } => *attempts,
        }
    }
}

/// Runs launch attempts until one succeeds, the budget runs out, or the
/// token is cancelled
pub struct RetryController<'a, G, R> {
    config: &'a ProvisionConfig,
    gateway: G,
    reporter: R,
    cancel: CancellationToken,
    backoff: FixedInterval,
    state: ControllerState,
}

impl<'a, G, R> RetryController<'a, G, R>
where
    G: ProviderGateway,
    R: ProgressReporter,
{
    /// Create a controller for one provisioning goal
    pub fn new(config: &'a ProvisionConfig, gateway: G, reporter: R, cancel: CancellationToken) -> Self {
        Self {
            config,
            gateway,
            reporter,
            cancel,
            backoff: config.backoff(),
            state: ControllerState::Idle,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Drive the loop to a terminal outcome.
    pub async fn run(&mut self) -> RunOutcome {
        self.transition(ControllerState::Enumerating);

        let resolution = match resolve_domains(&self.gateway, self.config)
            .or_cancel(&self.cancel)
            .await
        {
            Ok(resolution) => resolution,
            Err(Cancelled) => return self.cancelled(&RetryState::new()),
        };

        if let Some(reason) = &resolution.fallback {
            self.reporter.report(&ProgressEvent::EnumerationFallback {
                reason: reason.to_string(),
            });
        }
        let domains = resolution.domains;
        self.reporter.report(&ProgressEvent::DomainsResolved {
            domains: domains.as_slice().to_vec(),
        });
        self.reporter.report(&ProgressEvent::LoopStarted);

        let mut retry = RetryState::new();
        loop {
            retry.attempts += 1;
            let domain = domains.domain_for(retry.rotation_index).to_string();

            self.transition(ControllerState::Attempting);
            self.reporter.report(&ProgressEvent::AttemptStarted {
                attempt: retry.attempts,
                domain: domain.clone(),
                elapsed: retry.elapsed(),
                timestamp: chrono::Local::now(),
            });
            tracing::info!(attempt = retry.attempts, domain = %domain, "Launching");

            let request = self.config.request_for(&domain);
            let outcome = match launch_attempt(&self.gateway, &request, self.config.attempt_timeout())
                .or_cancel(&self.cancel)
                .await
            {
                Ok(outcome) => outcome,
                Err(Cancelled) => return self.cancelled(&retry),
            };

            self.transition(ControllerState::Classifying);
            match outcome {
                AttemptOutcome::Succeeded(instance) => return self.succeeded(&retry, instance, domain),
                AttemptOutcome::Timeout => {
                    tracing::info!(attempt = retry.attempts, domain = %domain, "Attempt timed out");
                    self.reporter.report(&ProgressEvent::AttemptTimedOut {
                        attempt: retry.attempts,
                        timeout: self.config.attempt_timeout(),
                    });
                }
                AttemptOutcome::TransientFailure(text) => {
                    self.record_failure(&mut retry, &domain, &text, false);
                }
                AttemptOutcome::FatalFailure(text) => {
                    self.record_failure(&mut retry, &domain, &text, true);
                }
            }

            let Some(delay) = self.backoff.next_delay(retry.attempts) else {
                return self.exhausted(&retry);
            };

            self.transition(ControllerState::Waiting);
            self.reporter.report(&ProgressEvent::Waiting { interval: delay });
            if tokio::time::sleep(delay).or_cancel(&self.cancel).await.is_err() {
                return self.cancelled(&retry);
            }
        }
    }

    fn record_failure(&mut self, retry: &mut RetryState, domain: &str, text: &str, gateway_error: bool) {
        let class = classify(text);
        if class.rotates_domain() {
            retry.rotation_index += 1;
        }

        if gateway_error {
            tracing::warn!(
                attempt = retry.attempts,
                domain = %domain,
                error = %text,
                "Launch never reached the provider; check the CLI installation and configuration"
            );
        } else {
            tracing::info!(
                attempt = retry.attempts,
                domain = %domain,
                class = class.label(),
                "Attempt failed"
            );
        }
        tracing::debug!(attempt = retry.attempts, stderr = %text, "Full diagnostic");

        self.reporter.report(&ProgressEvent::AttemptFailed {
            attempt: retry.attempts,
            class,
            detail: truncate_diagnostic(text).to_string(),
            gateway_error,
        });
    }

    fn succeeded(&mut self, retry: &RetryState, instance: InstanceDescriptor, domain: String) -> RunOutcome {
        self.transition(ControllerState::Succeeded);
        let elapsed = retry.elapsed();
        tracing::info!(
            attempts = retry.attempts,
            domain = %domain,
            elapsed_secs = elapsed.as_secs(),
            "Instance is running"
        );

        self.reporter.report(&ProgressEvent::Succeeded {
            instance: instance.clone(),
            attempts: retry.attempts,
            elapsed,
        });
        RunOutcome::Succeeded {
            instance,
            attempts: retry.attempts,
            elapsed,
            domain,
        }
    }

    fn exhausted(&mut self, retry: &RetryState) -> RunOutcome {
        self.transition(ControllerState::BudgetExhausted);
        let elapsed = retry.elapsed();
        let max_attempts = self.backoff.max_attempts().unwrap_or(retry.attempts);
        tracing::warn!(
            attempts = retry.attempts,
            elapsed_secs = elapsed.as_secs(),
            "Retry budget exhausted"
        );

        self.reporter.report(&ProgressEvent::BudgetExhausted {
            max_attempts,
            attempts: retry.attempts,
            elapsed,
        });
        RunOutcome::BudgetExhausted {
            attempts: retry.attempts,
            max_attempts,
            elapsed,
        }
    }

    fn cancelled(&mut self, retry: &RetryState) -> RunOutcome {
        self.transition(ControllerState::Cancelled);
        let elapsed = retry.elapsed();
        tracing::info!(attempts = retry.attempts, elapsed_secs = elapsed.as_secs(), "Cancelled");

        self.reporter.report(&ProgressEvent::Cancelled {
            attempts: retry.attempts,
            elapsed,
        });
        RunOutcome::Cancelled {
            attempts: retry.attempts,
            elapsed,
        }
    }

    fn transition(&mut self, next: ControllerState) {
        tracing::trace!(from = ?self.state, to = ?next, "Controller state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        LaunchScript, RecordingReporter, ScriptedGateway, capacity_error_output,
        generic_error_output, running_output, sample_config,
    };
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_state_ends_terminal() {
        let config = sample_config();
        let gateway = ScriptedGateway::new()
            .with_domains(&["AD-1"])
            .with_launches([LaunchScript::Respond(running_output("AD-1"))]);
        let mut controller =
            RetryController::new(&config, gateway, RecordingReporter::default(), CancellationToken::new());

        assert_eq!(controller.state(), ControllerState::Idle);
        let outcome = controller.run().await;

        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(controller.state(), ControllerState::Succeeded);
    }

    #[tokio::test]
    async fn test_capacity_rotates_generic_stays() {
        let config = sample_config().with_max_retries(4);
        let gateway = ScriptedGateway::new()
            .with_domains(&["AD-1", "AD-2", "AD-3"])
            .with_launches([
                LaunchScript::Respond(capacity_error_output()),
                LaunchScript::Respond(generic_error_output()),
                LaunchScript::Respond(capacity_error_output()),
                LaunchScript::Respond(generic_error_output()),
            ]);
        let mut reporter = RecordingReporter::default();

        let outcome =
            RetryController::new(&config, gateway.clone(), &mut reporter, CancellationToken::new())
                .run()
                .await;

        assert!(matches!(outcome, RunOutcome::BudgetExhausted { attempts: 4, max_attempts: 4, .. }));
        assert_eq!(reporter.attempt_domains(), vec!["AD-1", "AD-2", "AD-2", "AD-3"]);
    }

    #[tokio::test]
    async fn test_gateway_failure_is_retried() {
        let config = sample_config().with_max_retries(3);
        let gateway = ScriptedGateway::new()
            .with_domains(&["AD-1"])
            .with_launches([
                LaunchScript::Fail,
                LaunchScript::Respond(running_output("AD-1")),
            ]);
        let mut reporter = RecordingReporter::default();

        let outcome =
            RetryController::new(&config, gateway, &mut reporter, CancellationToken::new())
                .run()
                .await;

        assert_eq!(outcome.attempts(), 2);
        assert_eq!(outcome.exit_code(), 0);
        assert!(reporter.events().iter().any(|event| matches!(
            event,
            ProgressEvent::AttemptFailed { attempt: 1, gateway_error: true, .. }
        )));
    }

    #[tokio::test]
    async fn test_no_sleep_after_last_budgeted_attempt() {
        let config = sample_config().with_max_retries(2);
        let gateway = ScriptedGateway::new()
            .with_domains(&["AD-1"])
            .with_launches([
                LaunchScript::Respond(generic_error_output()),
                LaunchScript::Respond(generic_error_output()),
            ]);
        let mut reporter = RecordingReporter::default();

        RetryController::new(&config, gateway, &mut reporter, CancellationToken::new())
            .run()
            .await;

        let waits = reporter
            .events()
            .iter()
            .filter(|event| matches!(event, ProgressEvent::Waiting { .. }))
            .count();
        assert_eq!(waits, 1);
        assert!(matches!(
            reporter.events().last(),
            Some(ProgressEvent::BudgetExhausted { max_attempts: 2, attempts: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let config = sample_config();
        let gateway = ScriptedGateway::new().with_domains(&["AD-1"]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut controller =
            RetryController::new(&config, gateway.clone(), RecordingReporter::default(), cancel);
        let outcome = controller.run().await;

        assert!(matches!(outcome, RunOutcome::Cancelled { attempts: 0, .. }));
        assert_eq!(controller.state(), ControllerState::Cancelled);
        assert!(gateway.launched().await.is_empty());
    }
}

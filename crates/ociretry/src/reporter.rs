//! Operator-facing progress output
//!
//! The retry loop emits [`ProgressEvent`]s; a [`ProgressReporter`] decides what
//! to do with them. [`ConsoleReporter`] prints colored lines for humans.

use crate::attempt::InstanceDescriptor;
use crate::classify::FailureClass;
use crate::events::ProgressEvent;
use owo_colors::{OwoColorize, Style};
use std::io::{self, Write};
use std::time::Duration;

const RULE_WIDTH: usize = 60;

/// Sink for progress events
pub trait ProgressReporter {
    /// Handle one event. Must not fail; output errors are swallowed.
    fn report(&mut self, event: &ProgressEvent);
}

impl<R: ProgressReporter + ?Sized> ProgressReporter for &mut R {
    fn report(&mut self, event: &ProgressEvent) {
        (**self).report(event);
    }
}

/// Human-readable progress on a terminal
pub struct ConsoleReporter<W: Write> {
    out: W,
    header: Style,
    bold: Style,
    success: Style,
    warning: Style,
    error: Style,
    info: Style,
    value: Style,
}

impl ConsoleReporter<io::Stdout> {
    /// Report to standard output
    pub fn stdout(with_ansi: bool) -> Self {
        Self::new(io::stdout(), with_ansi)
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Report to `out`, colored when `with_ansi` is set
    pub fn new(out: W, with_ansi: bool) -> Self {
        let pick = |style: Style| if with_ansi { style } else { Style::new() };

        Self {
            out,
            header: pick(Style::new().blue()),
            bold: pick(Style::new().bold()),
            success: pick(Style::new().green()),
            warning: pick(Style::new().yellow()),
            error: pick(Style::new().red()),
            info: pick(Style::new().cyan()),
            value: pick(Style::new().green()),
        }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, event: &ProgressEvent) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);

        match event {
            ProgressEvent::Banner => {
                writeln!(self.out, "{}", rule.style(self.header))?;
                writeln!(
                    self.out,
                    "  {}",
                    "OCI Instance Auto-Retry".style(self.header).style(self.bold)
                )?;
                writeln!(self.out, "{}\n", rule.style(self.header))?;
            }
            ProgressEvent::ToolFound { version } => {
                writeln!(
                    self.out,
                    "{}\n",
                    format!("✓ OCI CLI found: {version}").style(self.success)
                )?;
            }
            ProgressEvent::ToolMissing { detail } => {
                writeln!(self.out, "{}", "✗ OCI CLI not found!".style(self.error))?;
                writeln!(self.out, "  {detail}")?;
                writeln!(
                    self.out,
                    "{}\n",
                    format!("Install it from: {}", crate::app::INSTALL_HINT).style(self.warning)
                )?;
            }
            ProgressEvent::Configuration {
                shape,
                ocpus,
                memory_in_gbs,
                availability_domain,
                retry_interval,
                max_attempts,
            } => {
                let max = max_attempts.map_or_else(|| "Infinite".to_string(), |m| m.to_string());

                writeln!(self.out, "{}", "Configuration:".style(self.warning))?;
                writeln!(self.out, "  Shape: {}", shape.style(self.value))?;
                writeln!(self.out, "  OCPUs: {}", ocpus.style(self.value))?;
                writeln!(self.out, "  Memory: {}", format!("{memory_in_gbs}GB").style(self.value))?;
                writeln!(
                    self.out,
                    "  Availability Domain: {}",
                    availability_domain.style(self.value)
                )?;
                writeln!(
                    self.out,
                    "  Retry Interval: {}",
                    format!("{}s", retry_interval.as_secs()).style(self.value)
                )?;
                writeln!(self.out, "  Max Retries: {}\n", max.style(self.value))?;
            }
            ProgressEvent::EnumerationFallback { reason } => {
                writeln!(
                    self.out,
                    "{}",
                    format!("⚠ Could not fetch ADs: {reason}").style(self.warning)
                )?;
            }
            ProgressEvent::DomainsResolved { domains } => {
                writeln!(
                    self.out,
                    "{}",
                    format!("Available ADs to try: {}", domains.len()).style(self.info)
                )?;
                for domain in domains {
                    writeln!(self.out, "  • {domain}")?;
                }
                writeln!(self.out)?;
            }
            ProgressEvent::LoopStarted => {
                writeln!(
                    self.out,
                    "{}\n",
                    "Starting retry loop... (Press Ctrl+C to stop)".style(self.warning)
                )?;
            }
            ProgressEvent::AttemptStarted {
                attempt,
                domain,
                elapsed,
                timestamp,
            } => {
                writeln!(
                    self.out,
                    "{} Attempt #{attempt} at {}",
                    format!("[{}]", format_elapsed(*elapsed)).style(self.header),
                    timestamp.format("%Y-%m-%d %H:%M:%S")
                )?;
                writeln!(self.out, "  AD: {domain}")?;
            }
            ProgressEvent::AttemptFailed {
                class,
                detail,
                gateway_error,
                ..
            } => {
                if *gateway_error {
                    writeln!(
                        self.out,
                        "  {}",
                        format!("✗ Could not run launch: {detail}").style(self.error)
                    )?;
                    return Ok(());
                }
                match class {
                    FailureClass::CapacityExhausted => {
                        writeln!(self.out, "  {}", "⚠ Out of capacity".style(self.warning))?;
                    }
                    FailureClass::Generic => {
                        writeln!(self.out, "  {}", format!("✗ Error: {detail}").style(self.error))?;
                    }
                    FailureClass::Unclassified => {
                        writeln!(self.out, "  {}", "⚠ Unknown response".style(self.warning))?;
                    }
                }
            }
            ProgressEvent::AttemptTimedOut { timeout, .. } => {
                writeln!(
                    self.out,
                    "  {}",
                    format!("⚠ No answer within {}s", timeout.as_secs()).style(self.warning)
                )?;
            }
            ProgressEvent::Waiting { interval } => {
                writeln!(
                    self.out,
                    "  {}\n",
                    format!("Waiting {}s before retry...", interval.as_secs()).style(self.info)
                )?;
            }
            ProgressEvent::Succeeded {
                instance,
                attempts,
                elapsed,
            } => {
                writeln!(self.out, "\n{}", rule.style(self.success))?;
                writeln!(
                    self.out,
                    "  {}",
                    "✓ SUCCESS! Instance Created!".style(self.success).style(self.bold)
                )?;
                writeln!(self.out, "{}\n", rule.style(self.success))?;
                self.render_instance(instance)?;
                writeln!(
                    self.out,
                    "\n{}",
                    format!("Total attempts: {attempts}").style(self.success)
                )?;
                writeln!(
                    self.out,
                    "{}\n",
                    format!("Total time: {}", format_elapsed(*elapsed)).style(self.success)
                )?;
            }
            ProgressEvent::BudgetExhausted { max_attempts, .. } => {
                writeln!(
                    self.out,
                    "\n{}",
                    format!("✗ Maximum retries ({max_attempts}) reached. Exiting.")
                        .style(self.error)
                )?;
            }
            ProgressEvent::Cancelled { attempts, elapsed } => {
                writeln!(self.out, "\n\n{}", "⚠ Interrupted by user".style(self.warning))?;
                writeln!(
                    self.out,
                    "{}",
                    format!("Total attempts: {attempts}").style(self.info)
                )?;
                writeln!(
                    self.out,
                    "{}\n",
                    format!("Total time: {}", format_elapsed(*elapsed)).style(self.info)
                )?;
            }
        }

        self.out.flush()
    }

    fn render_instance(&mut self, instance: &InstanceDescriptor) -> io::Result<()> {
        let na = InstanceDescriptor::display;

        writeln!(self.out, "{}", "Instance Details:".style(self.warning))?;
        writeln!(self.out, "  ID: {}", na(&instance.id))?;
        writeln!(self.out, "  Name: {}", na(&instance.display_name))?;
        writeln!(self.out, "  State: {}", na(&instance.lifecycle_state))?;
        writeln!(self.out, "  Shape: {}", na(&instance.shape))?;
        writeln!(self.out, "  AD: {}", na(&instance.availability_domain))
    }
}

impl<W: Write> ProgressReporter for ConsoleReporter<W> {
    fn report(&mut self, event: &ProgressEvent) {
        if let Err(err) = self.render(event) {
            tracing::debug!(error = %err, "Failed to write progress");
        }
    }
}

/// Whole seconds as `H:MM:SS`, prefixed with `N day(s), ` past 24 hours.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let clock = format!("{hours}:{minutes:02}:{seconds:02}");
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn render_plain(events: &[ProgressEvent]) -> String {
        let mut reporter = ConsoleReporter::new(Vec::new(), false);
        for event in events {
            reporter.report(event);
        }
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[rstest]
    #[case::zero(0, "0:00:00")]
    #[case::seconds(59, "0:00:59")]
    #[case::hours(3_725, "1:02:05")]
    #[case::one_day(86_400 + 61, "1 day, 0:01:01")]
    #[case::days(3 * 86_400 + 7_200, "3 days, 2:00:00")]
    fn test_format_elapsed(#[case] secs: u64, #[case] expected: &str) {
        assert_eq!(format_elapsed(Duration::from_secs(secs)), expected);
    }

    #[test]
    fn test_attempt_lines() {
        let timestamp = chrono::Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

        let text = render_plain(&[ProgressEvent::AttemptStarted {
            attempt: 7,
            domain: "AD-2".to_string(),
            elapsed: Duration::from_secs(65),
            timestamp,
        }]);

        assert_eq!(text, "[0:01:05] Attempt #7 at 2025-01-02 03:04:05\n  AD: AD-2\n");
    }

    #[rstest]
    #[case::capacity(FailureClass::CapacityExhausted, false, "⚠ Out of capacity")]
    #[case::generic(FailureClass::Generic, false, "✗ Error: boom")]
    #[case::unknown(FailureClass::Unclassified, false, "⚠ Unknown response")]
    #[case::gateway(FailureClass::Unclassified, true, "✗ Could not run launch: boom")]
    fn test_failure_lines(
        #[case] class: FailureClass,
        #[case] gateway_error: bool,
        #[case] expected: &str,
    ) {
        let text = render_plain(&[ProgressEvent::AttemptFailed {
            attempt: 1,
            class,
            detail: "boom".to_string(),
            gateway_error,
        }]);

        assert_eq!(text.trim(), expected);
    }

    #[test]
    fn test_success_shows_na_for_missing_fields() {
        let text = render_plain(&[ProgressEvent::Succeeded {
            instance: InstanceDescriptor {
                id: Some("ocid1.instance.oc1..x".to_string()),
                ..InstanceDescriptor::default()
            },
            attempts: 2,
            elapsed: Duration::from_secs(120),
        }]);

        assert!(text.contains("✓ SUCCESS! Instance Created!"));
        assert!(text.contains("  ID: ocid1.instance.oc1..x\n"));
        assert!(text.contains("  Name: N/A\n"));
        assert!(text.contains("Total attempts: 2"));
        assert!(text.contains("Total time: 0:02:00"));
    }

    #[test]
    fn test_unlimited_budget_prints_infinite() {
        let text = render_plain(&[ProgressEvent::Configuration {
            shape: "VM.Standard.A1.Flex".to_string(),
            ocpus: 2,
            memory_in_gbs: 12,
            availability_domain: "AD-1".to_string(),
            retry_interval: Duration::from_secs(60),
            max_attempts: None,
        }]);

        assert!(text.contains("  Memory: 12GB\n"));
        assert!(text.contains("  Retry Interval: 60s\n"));
        assert!(text.contains("  Max Retries: Infinite\n"));
    }

    #[test]
    fn test_plain_output_has_no_escape_codes() {
        let text = render_plain(&[ProgressEvent::Banner, ProgressEvent::LoopStarted]);

        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_colored_output_uses_escape_codes() {
        let mut reporter = ConsoleReporter::new(Vec::new(), true);
        reporter.report(&ProgressEvent::Waiting {
            interval: Duration::from_secs(60),
        });

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains('\u{1b}'));
        assert!(text.contains("Waiting 60s before retry..."));
    }
}

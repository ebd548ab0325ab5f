//! Process management for CLI subprocesses

use crate::error::{Result, TransportError};
use crate::types::GatewayOutput;
use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Configuration for spawning the provider CLI
#[derive(Clone, Debug)]
pub struct ProcessConfig {
    /// Path to the CLI executable
    pub cli_path: String,

    /// Arguments placed before every command's own arguments
    pub args: Vec<String>,

    /// Extra environment variables, on top of the inherited environment
    pub env: HashMap<String, String>,

    /// Bound for short commands (version check, listing)
    pub timeout: Duration,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self::new("oci")
    }
}

impl ProcessConfig {
    /// Create a new process configuration
    pub fn new(cli_path: impl Into<String>) -> Self {
        Self {
            cli_path: cli_path.into(),
            args: Vec::new(),
            env: HashMap::new(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Add a leading argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set an environment variable
    ///
    /// The child keeps the parent's environment: the provider CLI reads its
    /// credentials and profile from `HOME` and `OCI_CLI_*` variables.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the timeout for short commands
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.cli_path);
        cmd.args(&self.args);
        cmd.args(args);
        cmd.envs(&self.env);

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        // Dropping the wait future (timeout, Ctrl+C) must not leave the CLI running.
        cmd.kill_on_drop(true);
        cmd
    }
}

/// Run a command and wait for it to exit, however long that takes.
///
/// # Errors
///
/// Returns [`TransportError::Spawn`] if the program cannot be started, or
/// [`TransportError::Io`] if waiting on it fails. A non-zero exit is not an
/// error here; it is reported through [`GatewayOutput::status`].
pub async fn run_to_completion(config: &ProcessConfig, args: &[String]) -> Result<GatewayOutput> {
    tracing::debug!(program = %config.cli_path, ?args, "Spawning provider CLI");

    let child = config
        .command(args)
        .spawn()
        .map_err(|source| TransportError::Spawn {
            program: config.cli_path.clone(),
            source,
        })?;

    let output = child.wait_with_output().await?;
    let status = output.status.code().unwrap_or(-1);

    tracing::debug!(
        program = %config.cli_path,
        status,
        stdout_len = output.stdout.len(),
        stderr_len = output.stderr.len(),
        "Provider CLI exited"
    );

    Ok(GatewayOutput {
        status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run a command bounded by `timeout`; the process is killed if it overruns.
///
/// # Errors
///
/// As [`run_to_completion`], plus [`TransportError::Timeout`].
pub async fn run_with_timeout(
    config: &ProcessConfig,
    args: &[String],
    timeout: Duration,
) -> Result<GatewayOutput> {
    match tokio::time::timeout(timeout, run_to_completion(config, args)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(program = %config.cli_path, ?timeout, "Provider CLI timed out");
            Err(TransportError::Timeout(timeout))
        }
    }
}

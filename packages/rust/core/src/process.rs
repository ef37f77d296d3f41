//! Subprocess execution with a bounded timeout.
//!
//! [`CommandRunner`] is the seam between orchestration and the operating
//! system: [`ProcessRunner`] spawns real processes, tests substitute a
//! scripted runner.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use docpub_shared::{DocPubError, ProcessOutcome, Result};

// ---------------------------------------------------------------------------
// Command description
// ---------------------------------------------------------------------------

/// Where a subprocess's standard output and error go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureMode {
    /// Inherit the parent's stdout/stderr.
    StreamToConsole,
    /// Interleave stdout and stderr into one file, truncated first.
    CaptureToFile(PathBuf),
}

/// Variables layered over the ambient environment of a single subprocess.
///
/// The parent process environment is never modified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentOverlay {
    vars: BTreeMap<String, String>,
}

impl EnvironmentOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A fully described subprocess invocation.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub env: EnvironmentOverlay,
    pub timeout: Duration,
    pub capture: CaptureMode,
}

impl CommandSpec {
    /// Shell-quoted command line, for logging.
    pub fn display_command(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Value following `flag` in the argument list (e.g. the path after `-w`).
    pub fn arg_after(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

/// Quote an argument for display only if it contains shell-special characters.
fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Executes a [`CommandSpec`] to completion or timeout.
pub trait CommandRunner: Send + Sync {
    /// Run the command. Spawn and wait failures are errors; a non-zero exit
    /// or a timeout is reported through [`ProcessOutcome`].
    fn run(&self, spec: &CommandSpec) -> impl Future<Output = Result<ProcessOutcome>> + Send;
}

/// Runs commands as real subprocesses via `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<ProcessOutcome> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.working_dir)
            .envs(spec.env.iter())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        match &spec.capture {
            CaptureMode::StreamToConsole => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            CaptureMode::CaptureToFile(path) => {
                let stdout = std::fs::File::create(path).map_err(|e| DocPubError::io(path, e))?;
                let stderr = stdout.try_clone().map_err(|e| DocPubError::io(path, e))?;
                cmd.stdout(Stdio::from(stdout)).stderr(Stdio::from(stderr));
            }
        }

        debug!(command = %spec.display_command(), cwd = %spec.working_dir.display(), "spawning");
        let mut child = cmd.spawn().map_err(|e| {
            DocPubError::Process(format!("failed to spawn `{}`: {e}", spec.program))
        })?;

        let waited = timeout(spec.timeout, child.wait()).await;
        match waited {
            Ok(status) => {
                let status = status.map_err(|e| {
                    DocPubError::Process(format!("failed to wait for `{}`: {e}", spec.program))
                })?;
                debug!(program = %spec.program, ?status, "process exited");
                Ok(ProcessOutcome {
                    exit_code: status.code(),
                    timed_out: false,
                })
            }
            Err(_) => {
                warn!(
                    program = %spec.program,
                    timeout_secs = spec.timeout.as_secs(),
                    "process timed out, killing"
                );
                child.kill().await.map_err(|e| {
                    DocPubError::Process(format!("failed to kill `{}`: {e}", spec.program))
                })?;
                Ok(ProcessOutcome {
                    exit_code: None,
                    timed_out: true,
                })
            }
        }
    }
}

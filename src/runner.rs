//! Command-execution port for the terraform binary
//!
//! [`CommandRunner`] is the seam between the harness and the external
//! tool: production code uses [`CliRunner`] (spawns `terraform`), tests
//! substitute a scripted runner. [`run_with_retry`] wraps a runner with
//! the options' retryable-error policy.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{InfratestError, InfratestResult};
use crate::options::RetryPolicy;

/// A single terraform command to execute in a module directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformInvocation {
    pub working_dir: PathBuf,
    pub args: Vec<String>,
}

impl TerraformInvocation {
    pub fn new(working_dir: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            working_dir: working_dir.into(),
            args,
        }
    }

    /// Leading subcommand (`init`, `apply`, `output`, `destroy`)
    pub fn subcommand(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or("")
    }
}

/// Captured result of one command run
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout and stderr joined, for error reporting and retry matching
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Executes terraform commands
pub trait CommandRunner {
    fn run(&self, invocation: &TerraformInvocation) -> InfratestResult<CommandOutput>;
}

/// Runner that spawns the real terraform binary
///
/// Stdout and stderr are piped rather than inherited so output can be
/// captured deterministically; combine with
/// [`TerraformOptions::with_no_color`](crate::TerraformOptions::with_no_color)
/// when parsing it.
#[derive(Debug, Clone)]
pub struct CliRunner {
    binary: PathBuf,
}

impl CliRunner {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("terraform"),
        }
    }

    /// Use a specific binary (e.g. `tofu` or an absolute path)
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Check if the terraform binary is installed and available
    pub fn check_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl Default for CliRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for CliRunner {
    fn run(&self, invocation: &TerraformInvocation) -> InfratestResult<CommandOutput> {
        let output = Command::new(&self.binary)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

/// Run one command, re-running on failures the policy classifies as
/// retryable, up to `max_retries` extra attempts.
pub fn run_with_retry<R: CommandRunner>(
    runner: &R,
    retry: &RetryPolicy,
    invocation: &TerraformInvocation,
) -> InfratestResult<CommandOutput> {
    let command = invocation.subcommand().to_string();
    let mut attempt = 0u32;
    loop {
        let output = runner.run(invocation)?;
        if output.success() {
            return Ok(output);
        }
        let combined = output.combined();
        match retry.classify(&combined) {
            Some(reason) if attempt < retry.max_retries => {
                attempt += 1;
                eprintln!(
                    "terraform {command}: retryable error ({reason}), attempt {attempt}/{}",
                    retry.max_retries
                );
                std::thread::sleep(retry.backoff);
            }
            _ => {
                return Err(InfratestError::Provisioning {
                    command,
                    detail: if combined.is_empty() {
                        format!("exit code {:?}", output.exit_code)
                    } else {
                        combined
                    },
                })
            }
        }
    }
}

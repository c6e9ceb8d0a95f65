//! Terraform invocation options
//!
//! Configuration for one deployment: module directory, input variables,
//! remote-state backend settings and the retryable-error policy. Built
//! once before the test body and read-only afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{InfratestError, InfratestResult};

/// A value passed to the module as `-var key=value`
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::String(s) => write!(f, "{s}"),
            VarValue::Bool(b) => write!(f, "{b}"),
            VarValue::Int(i) => write!(f, "{i}"),
            VarValue::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<&str> for VarValue {
    fn from(value: &str) -> Self {
        VarValue::String(value.to_string())
    }
}

impl From<String> for VarValue {
    fn from(value: String) -> Self {
        VarValue::String(value)
    }
}

impl From<bool> for VarValue {
    fn from(value: bool) -> Self {
        VarValue::Bool(value)
    }
}

impl From<i64> for VarValue {
    fn from(value: i64) -> Self {
        VarValue::Int(value)
    }
}

impl From<f64> for VarValue {
    fn from(value: f64) -> Self {
        VarValue::Float(value)
    }
}

/// Remote-state backend settings passed to `terraform init`
///
/// Named, validated fields rather than a free-form map: the recognized
/// keys are exactly `bucket`, `key` and `region`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Storage location for the state file (e.g. an S3 bucket name)
    pub bucket: String,
    /// Path of the state file inside the bucket
    pub key: String,
    /// Geographic region of the backend storage
    pub region: String,
}

impl BackendConfig {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            region: region.into(),
        }
    }

    pub fn validate(&self) -> InfratestResult<()> {
        for (field, value) in [
            ("bucket", &self.bucket),
            ("key", &self.key),
            ("region", &self.region),
        ] {
            if value.trim().is_empty() {
                return Err(InfratestError::InvalidOptions {
                    message: format!("backend config field '{field}' must not be empty"),
                });
            }
        }
        Ok(())
    }

    fn args(&self) -> Vec<String> {
        vec![
            format!("-backend-config=bucket={}", self.bucket),
            format!("-backend-config=key={}", self.key),
            format!("-backend-config=region={}", self.region),
        ]
    }
}

/// Classification of transient tool errors worth re-running
///
/// The harness does not interpret which errors occur; it only re-runs a
/// failed command whose output matches one of the configured patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of re-runs after the first failed attempt
    pub max_retries: u32,
    /// Sleep between attempts
    pub backoff: Duration,
    /// Substring pattern → human-readable reason for the retry
    pub retryable_errors: BTreeMap<String, String>,
}

impl RetryPolicy {
    /// No retries at all
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
            retryable_errors: BTreeMap::new(),
        }
    }

    /// The stock table of transient terraform/provider errors
    pub fn default_retryable_errors() -> Self {
        let table = [
            (
                "TLS handshake timeout",
                "transient network issue reaching the provider registry",
            ),
            (
                "timeout while waiting for plugin to start",
                "provider plugin was slow to start",
            ),
            (
                "timed out waiting for server handshake",
                "provider plugin handshake timed out",
            ),
            (
                "Client.Timeout exceeded while awaiting headers",
                "remote API was slow to respond",
            ),
            (
                "connection reset by peer",
                "connection dropped mid-request",
            ),
            (
                "RequestError: send request failed",
                "transient request failure against the backend",
            ),
        ];
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(5),
            retryable_errors: table
                .into_iter()
                .map(|(pattern, reason)| (pattern.to_string(), reason.to_string()))
                .collect(),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Return the reason for the first matching pattern, if any
    pub fn classify(&self, output: &str) -> Option<&str> {
        self.retryable_errors
            .iter()
            .find(|(pattern, _)| output.contains(pattern.as_str()))
            .map(|(_, reason)| reason.as_str())
    }
}

/// Options for one terraform deployment
#[derive(Debug, Clone)]
pub struct TerraformOptions {
    /// Directory containing the module's `.tf` files
    pub terraform_dir: PathBuf,
    /// Free-form module input variables, passed as `-var key=value`
    pub vars: BTreeMap<String, VarValue>,
    /// Remote-state backend settings, passed to `terraform init`
    pub backend_config: Option<BackendConfig>,
    /// Disable colored output for deterministic log capture
    pub no_color: bool,
    /// Retryable-error policy applied to every command
    pub retry: RetryPolicy,
}

impl TerraformOptions {
    pub fn new(terraform_dir: impl Into<PathBuf>) -> Self {
        Self {
            terraform_dir: terraform_dir.into(),
            vars: BTreeMap::new(),
            backend_config: None,
            no_color: false,
            retry: RetryPolicy::none(),
        }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<VarValue>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend_config = Some(backend);
        self
    }

    pub fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Shorthand for attaching the stock retryable-error table
    pub fn with_default_retryable_errors(self) -> Self {
        let retry = RetryPolicy::default_retryable_errors();
        self.with_retry(retry)
    }

    pub fn validate(&self) -> InfratestResult<()> {
        if self.terraform_dir.as_os_str().is_empty() {
            return Err(InfratestError::InvalidOptions {
                message: "terraform_dir must not be empty".to_string(),
            });
        }
        if let Some(backend) = &self.backend_config {
            backend.validate()?;
        }
        Ok(())
    }

    pub fn init_args(&self) -> Vec<String> {
        let mut args = vec!["init".to_string(), "-input=false".to_string()];
        if let Some(backend) = &self.backend_config {
            args.extend(backend.args());
        }
        self.push_color(&mut args);
        args
    }

    pub fn apply_args(&self) -> Vec<String> {
        let mut args = vec![
            "apply".to_string(),
            "-input=false".to_string(),
            "-auto-approve".to_string(),
        ];
        args.extend(self.var_args());
        self.push_color(&mut args);
        args
    }

    pub fn output_args(&self) -> Vec<String> {
        let mut args = vec!["output".to_string(), "-json".to_string()];
        self.push_color(&mut args);
        args
    }

    pub fn destroy_args(&self) -> Vec<String> {
        let mut args = vec![
            "destroy".to_string(),
            "-input=false".to_string(),
            "-auto-approve".to_string(),
        ];
        args.extend(self.var_args());
        self.push_color(&mut args);
        args
    }

    fn var_args(&self) -> Vec<String> {
        self.vars
            .iter()
            .map(|(key, value)| format!("-var={key}={value}"))
            .collect()
    }

    fn push_color(&self, args: &mut Vec<String>) {
        if self.no_color {
            args.push("-no-color".to_string());
        }
    }
}

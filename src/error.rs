//! Error types for Infratest
//!
//! Uses `thiserror` for library errors. Fatal errors (`Provisioning`,
//! `OutputNotFound`) abort the test body; `AssertionMismatch` is only
//! produced after every expectation in a [`crate::check::Checklist`] has
//! run; `Cleanup` is reported without masking an earlier failure.

use thiserror::Error;

use crate::check::AssertionFailure;

/// Result type alias for Infratest operations
pub type InfratestResult<T> = Result<T, InfratestError>;

/// Main error type for Infratest operations
#[derive(Error, Debug)]
pub enum InfratestError {
    /// A terraform command failed after the retry policy was exhausted
    #[error("terraform {command} failed: {detail}")]
    Provisioning { command: String, detail: String },

    /// A requested output key is absent from the deployed module
    #[error("output '{key}' not found in terraform outputs")]
    OutputNotFound { key: String },

    /// One or more recorded expectations did not hold
    #[error("{} expectation(s) failed:{}", .failures.len(), summarize(.failures))]
    AssertionMismatch { failures: Vec<AssertionFailure> },

    /// `terraform destroy` did not fully succeed
    #[error("cleanup failed: {detail}")]
    Cleanup { detail: String },

    /// Invalid provisioning options
    #[error("invalid options: {message}")]
    InvalidOptions { message: String },

    /// IO error (e.g. the terraform binary could not be spawned)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error while reading `terraform output -json`
    #[error("output parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

fn summarize(failures: &[AssertionFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("\n  - {f}"))
        .collect::<String>()
}

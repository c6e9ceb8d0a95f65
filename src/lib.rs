//! Infratest - end-to-end testing harness for Terraform modules
//!
//! Infratest lets Rust integration tests provision a real Terraform module,
//! read back its output values, assert on them, and tear everything down
//! again with a cleanup that runs on every exit path.
//!
//! The core flow mirrors how infrastructure tests are written by hand:
//! build [`TerraformOptions`] → [`with_deployment`] (init + apply, run the
//! test body, destroy) → accumulate non-fatal expectations in a
//! [`Checklist`].

pub mod check;
pub mod deployment;
pub mod error;
pub mod harness;
pub mod options;
pub mod runner;

// Re-exports for convenience
pub use check::{AssertionFailure, Checklist};
pub use deployment::Deployment;
pub use error::{InfratestError, InfratestResult};
pub use harness::with_deployment;
pub use options::{BackendConfig, RetryPolicy, TerraformOptions, VarValue};
pub use runner::{CliRunner, CommandOutput, CommandRunner, TerraformInvocation};

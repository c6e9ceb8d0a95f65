//! Deployment handle with guaranteed teardown
//!
//! A [`Deployment`] is acquired *before* `terraform apply` runs, so that
//! teardown is scheduled on every exit path: explicit
//! [`destroy`](Deployment::destroy), early return, or an error propagating
//! out of the test body. Dropping an undestroyed handle still runs
//! `terraform destroy` exactly once.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{InfratestError, InfratestResult};
use crate::options::TerraformOptions;
use crate::runner::{run_with_retry, CommandRunner, TerraformInvocation};

/// Opaque handle for one live deployment
pub struct Deployment<'r, R: CommandRunner> {
    runner: &'r R,
    options: TerraformOptions,
    destroyed: bool,
}

impl<'r, R: CommandRunner> Deployment<'r, R> {
    /// Acquire the handle. From this point on the deployment will be
    /// destroyed exactly once, whether or not apply ever succeeds.
    pub fn begin(runner: &'r R, options: TerraformOptions) -> Self {
        Self {
            runner,
            options,
            destroyed: false,
        }
    }

    pub fn options(&self) -> &TerraformOptions {
        &self.options
    }

    /// Run `terraform init` (with backend config) then `terraform apply`.
    ///
    /// A successful return is the sole success signal; no further health
    /// check is performed.
    pub fn init_and_apply(&self) -> InfratestResult<()> {
        self.run(self.options.init_args())?;
        self.run(self.options.apply_args())?;
        Ok(())
    }

    /// Read a named output value from the deployed module
    pub fn output(&self, key: &str) -> InfratestResult<String> {
        let output = self.run(self.options.output_args())?;
        parse_output(&output.stdout, key)
    }

    /// Tear the deployment down. Consumes the handle; the drop guard will
    /// not fire again even if destroy itself fails.
    pub fn destroy(mut self) -> InfratestResult<()> {
        self.destroyed = true;
        self.run_destroy()
    }

    fn run(&self, args: Vec<String>) -> InfratestResult<crate::runner::CommandOutput> {
        let invocation = TerraformInvocation::new(self.options.terraform_dir.clone(), args);
        run_with_retry(self.runner, &self.options.retry, &invocation)
    }

    fn run_destroy(&self) -> InfratestResult<()> {
        self.run(self.options.destroy_args())
            .map(|_| ())
            .map_err(|err| InfratestError::Cleanup {
                detail: err.to_string(),
            })
    }
}

impl<R: CommandRunner> Drop for Deployment<'_, R> {
    fn drop(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if let Err(err) = self.run_destroy() {
            // Cannot propagate from drop; report without panicking so an
            // in-flight error keeps determining the test outcome.
            eprintln!("infratest: {err}");
        }
    }
}

#[derive(Debug, Deserialize)]
struct OutputEntry {
    value: serde_json::Value,
}

fn parse_output(stdout: &str, key: &str) -> InfratestResult<String> {
    let outputs: BTreeMap<String, OutputEntry> = serde_json::from_str(stdout)?;
    let entry = outputs
        .get(key)
        .ok_or_else(|| InfratestError::OutputNotFound {
            key: key.to_string(),
        })?;
    match &entry.value {
        serde_json::Value::String(s) => Ok(s.clone()),
        other => Ok(other.to_string()),
    }
}

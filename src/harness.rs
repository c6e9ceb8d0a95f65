//! Scoped deployment lifecycle
//!
//! [`with_deployment`] brackets a test body between init/apply and a
//! destroy that runs on every exit path. The first fatal error decides
//! the outcome; a cleanup failure is surfaced but never masks it.

use crate::deployment::Deployment;
use crate::error::InfratestResult;
use crate::options::TerraformOptions;
use crate::runner::CommandRunner;

/// Provision the module, run `body`, then destroy — always.
///
/// Ordering guarantees:
/// - destroy is scheduled before init/apply runs, so a failed apply is
///   still cleaned up;
/// - `body` only runs after apply succeeded;
/// - destroy runs exactly once, on every exit path.
///
/// Error precedence: an apply or body error wins over a cleanup error.
/// A cleanup error is returned only when everything else succeeded, and
/// is reported to stderr otherwise.
pub fn with_deployment<R, F, T>(
    runner: &R,
    options: TerraformOptions,
    body: F,
) -> InfratestResult<T>
where
    R: CommandRunner,
    F: FnOnce(&Deployment<'_, R>) -> InfratestResult<T>,
{
    options.validate()?;
    let deployment = Deployment::begin(runner, options);
    let outcome = deployment.init_and_apply().and_then(|()| body(&deployment));
    match (outcome, deployment.destroy()) {
        (outcome, Ok(())) => outcome,
        (Ok(_), Err(cleanup)) => Err(cleanup),
        (Err(primary), Err(cleanup)) => {
            eprintln!("infratest: {cleanup} (after: {primary})");
            Err(primary)
        }
    }
}

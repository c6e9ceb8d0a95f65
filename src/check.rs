//! Non-fatal accumulating assertions
//!
//! A [`Checklist`] records expectation failures without aborting, so
//! every assertion in a test body runs and cleanup is never skipped.
//! Call [`finish`](Checklist::finish) at the end of the body to turn any
//! recorded failures into a single `AssertionMismatch` error.

use std::fmt;

use crate::error::{InfratestError, InfratestResult};

/// One recorded expectation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure {
    pub description: String,
    pub expected: String,
    pub actual: String,
}

impl AssertionFailure {
    pub fn new(
        description: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected '{}', got '{}'",
            self.description, self.expected, self.actual
        )
    }
}

/// Accumulates expectations over a test body
#[derive(Debug, Default)]
pub struct Checklist {
    checks: usize,
    failures: Vec<AssertionFailure>,
}

impl Checklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect two values to be equal; records a failure and continues
    /// otherwise. Returns whether the expectation held.
    pub fn expect_eq(&mut self, description: &str, expected: &str, actual: &str) -> bool {
        self.checks += 1;
        if expected == actual {
            return true;
        }
        self.failures
            .push(AssertionFailure::new(description, expected, actual));
        false
    }

    /// Expect a value to be non-empty
    pub fn expect_populated(&mut self, description: &str, actual: &str) -> bool {
        self.checks += 1;
        if !actual.is_empty() {
            return true;
        }
        self.failures.push(AssertionFailure::new(
            description,
            "a non-empty value",
            actual,
        ));
        false
    }

    /// Number of expectations run so far
    pub fn checks(&self) -> usize {
        self.checks
    }

    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Report all recorded failures together, or `Ok` if none
    pub fn finish(self) -> InfratestResult<()> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(InfratestError::AssertionMismatch {
                failures: self.failures,
            })
        }
    }
}

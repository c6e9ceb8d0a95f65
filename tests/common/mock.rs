//! Scripted terraform runner for lifecycle tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use infratest::{CommandOutput, CommandRunner, InfratestResult, TerraformInvocation};

/// A runner that answers from a script instead of spawning terraform.
///
/// Responses are keyed by subcommand (`init`, `apply`, `output`,
/// `destroy`). Sequenced responses (for retry scenarios) are consumed
/// first, then the fixed response for that subcommand, then a default
/// success with empty output. Every invocation is recorded.
#[derive(Default)]
pub struct MockRunner {
    sequenced: RefCell<HashMap<String, VecDeque<CommandOutput>>>,
    fixed: RefCell<HashMap<String, CommandOutput>>,
    invocations: RefCell<Vec<TerraformInvocation>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed response for every run of `subcommand`
    pub fn respond(&self, subcommand: &str, output: CommandOutput) {
        self.fixed
            .borrow_mut()
            .insert(subcommand.to_string(), output);
    }

    /// Fixed successful response with the given stdout
    pub fn respond_stdout(&self, subcommand: &str, stdout: &str) {
        self.respond(
            subcommand,
            CommandOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            },
        );
    }

    /// Fixed failing response with the given stderr
    pub fn respond_err(&self, subcommand: &str, stderr: &str) {
        self.respond(subcommand, failed_output(stderr));
    }

    /// Queue a one-shot response, consumed before the fixed one
    pub fn respond_once(&self, subcommand: &str, output: CommandOutput) {
        self.sequenced
            .borrow_mut()
            .entry(subcommand.to_string())
            .or_default()
            .push_back(output);
    }

    /// Number of times `subcommand` was invoked
    pub fn calls(&self, subcommand: &str) -> usize {
        self.invocations
            .borrow()
            .iter()
            .filter(|invocation| invocation.subcommand() == subcommand)
            .count()
    }

    /// Subcommand sequence in invocation order
    pub fn subcommands(&self) -> Vec<String> {
        self.invocations
            .borrow()
            .iter()
            .map(|invocation| invocation.subcommand().to_string())
            .collect()
    }

    /// Full recorded invocations
    pub fn invocations(&self) -> Vec<TerraformInvocation> {
        self.invocations.borrow().clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, invocation: &TerraformInvocation) -> InfratestResult<CommandOutput> {
        self.invocations.borrow_mut().push(invocation.clone());
        let subcommand = invocation.subcommand();
        if let Some(queue) = self.sequenced.borrow_mut().get_mut(subcommand) {
            if let Some(output) = queue.pop_front() {
                return Ok(output);
            }
        }
        if let Some(output) = self.fixed.borrow().get(subcommand) {
            return Ok(output.clone());
        }
        Ok(ok_output())
    }
}

pub fn ok_output() -> CommandOutput {
    CommandOutput {
        stdout: String::new(),
        stderr: String::new(),
        exit_code: Some(0),
    }
}

pub fn failed_output(stderr: &str) -> CommandOutput {
    CommandOutput {
        stdout: String::new(),
        stderr: stderr.to_string(),
        exit_code: Some(1),
    }
}

/// Render a `terraform output -json` document from string pairs
pub fn outputs_json(pairs: &[(&str, &str)]) -> String {
    let mut doc = serde_json::Map::new();
    for (key, value) in pairs {
        doc.insert(
            (*key).to_string(),
            serde_json::json!({
                "sensitive": false,
                "type": "string",
                "value": value,
            }),
        );
    }
    serde_json::Value::Object(doc).to_string()
}

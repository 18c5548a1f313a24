//! Shared test utilities for the publisher crate.

use crate::error::{PublisherError, Result};
use crate::process::{CommandExecutor, Invocation, ProcessOutput};
use camino::Utf8PathBuf;
use std::cell::RefCell;
use std::collections::VecDeque;

/// Creates a successful `ProcessOutput` with the given stdout.
#[must_use]
pub fn success_output(stdout: &str) -> ProcessOutput {
    ProcessOutput {
        code: Some(0),
        stdout: stdout.to_owned(),
        stderr: String::new(),
    }
}

/// Creates a failed `ProcessOutput` with the given exit code and stderr.
#[must_use]
pub fn failure_output(code: i32, stderr: &str) -> ProcessOutput {
    ProcessOutput {
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_owned(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The program to execute (e.g., "node-gyp").
    pub program: &'static str,
    /// The arguments to pass to the program.
    pub args: Vec<String>,
    /// The expected working directory, if the test cares about it.
    pub working_dir: Option<Utf8PathBuf>,
    /// The result to return when this command is invoked.
    pub result: Result<ProcessOutput>,
}

impl ExpectedCall {
    /// Expect `program` with `args`, ignoring the working directory.
    #[must_use]
    pub fn new(program: &'static str, args: &[&str], result: Result<ProcessOutput>) -> Self {
        Self {
            program,
            args: args.iter().map(|&a| a.to_owned()).collect(),
            working_dir: None,
            result,
        }
    }

    /// Also require the invocation to run from `dir`.
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Replays predefined results in order and reports any invocation that does
/// not match the next expected call as [`PublisherError::StubMismatch`].
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
    seen: RefCell<Vec<Invocation>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            seen: RefCell::new(Vec::new()),
        }
    }

    /// Invocations received so far, in order.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.seen.borrow().clone()
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        self.seen.borrow_mut().push(invocation.clone());

        let Some(call) = self.expected.borrow_mut().pop_front() else {
            return Err(PublisherError::StubMismatch {
                message: format!("unexpected invocation `{invocation}`"),
            });
        };

        if call.program != invocation.program() || call.args != invocation.arguments() {
            return Err(PublisherError::StubMismatch {
                message: format!(
                    "expected `{} {}`, got `{invocation}`",
                    call.program,
                    call.args.join(" ")
                ),
            });
        }

        if let Some(dir) = &call.working_dir {
            if invocation.working_dir() != Some(dir.as_path()) {
                return Err(PublisherError::StubMismatch {
                    message: format!(
                        "expected working directory {dir}, got {:?}",
                        invocation.working_dir()
                    ),
                });
            }
        }

        call.result
    }
}

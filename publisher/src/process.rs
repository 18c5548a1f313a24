//! Explicit process invocation.
//!
//! Every external program (`git`, `node-gyp`) is run through
//! [`CommandExecutor`] with an explicit working directory. Nothing here
//! changes the publisher's own current directory.

use crate::error::{PublisherError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// How a child's stdout and stderr are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect both streams into the returned [`ProcessOutput`].
    Capture,
    /// Let the child write straight to the publisher's console.
    Inherit,
}

/// A fully described program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    working_dir: Option<Utf8PathBuf>,
    output: OutputMode,
}

impl Invocation {
    /// Start describing an invocation of `program` with captured output.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            output: OutputMode::Capture,
        }
    }

    /// Append arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the program from `dir`.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Pass the child's output through to the console instead of capturing.
    #[must_use]
    pub fn inherit_output(mut self) -> Self {
        self.output = OutputMode::Inherit;
        self
    }

    /// The program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The argument list.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// The working directory, if one was set.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Utf8Path> {
        self.working_dir.as_deref()
    }

    /// The output handling mode.
    #[must_use]
    pub fn output_mode(&self) -> OutputMode {
        self.output
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// The result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, or `None` when the child was terminated by a signal.
    pub code: Option<i32>,
    /// Captured stdout (empty when output was inherited).
    pub stdout: String,
    /// Captured stderr (empty when output was inherited).
    pub stderr: String,
}

impl ProcessOutput {
    /// Returns `true` when the child exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Describe the exit status for error messages.
    #[must_use]
    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_owned(),
        }
    }
}

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Run the invocation to completion.
    ///
    /// A non-zero exit is not an error at this level; callers inspect
    /// [`ProcessOutput::code`].
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned, its output cannot
    /// be read, or it exceeds the executor's time limit.
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput>;
}

/// Runs commands on the host system, optionally with a time limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor {
    timeout: Option<Duration>,
}

impl SystemCommandExecutor {
    /// An executor that waits for children indefinitely.
    #[must_use]
    pub const fn new() -> Self {
        Self { timeout: None }
    }

    /// An executor that kills children running longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        let mut cmd = Command::new(invocation.program());
        cmd.args(invocation.arguments()).stdin(Stdio::null());

        if let Some(dir) = invocation.working_dir() {
            cmd.current_dir(dir.as_std_path());
        }

        if invocation.output_mode() == OutputMode::Capture {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        log::debug!("running `{invocation}` in {:?}", invocation.working_dir());
        let mut child = cmd.spawn()?;

        // Drain both pipes concurrently so a chatty child cannot block on a
        // full pipe while we wait for it.
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = match self.timeout {
            Some(limit) => match child.wait_timeout(limit)? {
                Some(status) => status,
                None => {
                    if let Err(err) = child.kill() {
                        log::warn!("failed to kill {}: {err}", invocation.program());
                    }
                    if let Err(err) = child.wait() {
                        log::warn!("failed to reap {}: {err}", invocation.program());
                    }
                    return Err(PublisherError::Timeout {
                        program: invocation.program().to_owned(),
                        seconds: limit.as_secs(),
                    });
                }
            },
            None => child.wait()?,
        };

        Ok(ProcessOutput {
            code: status.code(),
            stdout: collect(stdout)?,
            stderr: collect(stderr)?,
        })
    }
}

type Reader = JoinHandle<std::io::Result<String>>;

fn spawn_reader<R>(pipe: Option<R>) -> Option<Reader>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(String::from_utf8_lossy(&buf).into_owned())
        })
    })
}

fn collect(reader: Option<Reader>) -> std::io::Result<String> {
    match reader {
        Some(handle) => handle
            .join()
            .map_err(|_| std::io::Error::other("output reader thread panicked"))?,
        None => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn display_joins_program_and_args() {
        let inv = Invocation::new("node-gyp").args(["rebuild", "--arch=x64"]);
        assert_eq!(inv.to_string(), "node-gyp rebuild --arch=x64");
    }

    #[test]
    fn builder_records_directory_and_mode() {
        let inv = Invocation::new("git")
            .current_dir("/tmp/project")
            .inherit_output();
        assert_eq!(inv.working_dir(), Some(Utf8Path::new("/tmp/project")));
        assert_eq!(inv.output_mode(), OutputMode::Inherit);
    }

    #[rstest]
    #[case::zero(Some(0), true, "exit status 0")]
    #[case::failure(Some(1), false, "exit status 1")]
    #[case::signal(None, false, "terminated by signal")]
    fn status_reporting(#[case] code: Option<i32>, #[case] ok: bool, #[case] text: &str) {
        let output = ProcessOutput {
            code,
            ..ProcessOutput::default()
        };
        assert_eq!(output.success(), ok);
        assert_eq!(output.status_text(), text);
    }

    #[cfg(unix)]
    #[test]
    fn captures_exit_code_and_streams() {
        let inv = Invocation::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]);
        let output = SystemCommandExecutor::new()
            .run(&inv)
            .expect("sh should spawn");
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_requested_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = camino::Utf8PathBuf::try_from(
            dir.path().canonicalize().expect("canonical temp dir"),
        )
        .expect("UTF-8 temp dir");
        let inv = Invocation::new("pwd").current_dir(path.clone());
        let output = SystemCommandExecutor::new().run(&inv).expect("pwd runs");
        assert_eq!(output.stdout.trim(), path.as_str());
    }

    #[cfg(unix)]
    #[test]
    fn kills_child_after_timeout() {
        let inv = Invocation::new("sleep").args(["5"]);
        let err = SystemCommandExecutor::with_timeout(Duration::from_millis(100))
            .run(&inv)
            .expect_err("sleep should time out");
        assert!(matches!(err, PublisherError::Timeout { ref program, .. } if program == "sleep"));
    }

    #[test]
    fn missing_program_is_io_error() {
        let inv = Invocation::new("definitely-not-a-real-program-7f3a");
        let err = SystemCommandExecutor::new()
            .run(&inv)
            .expect_err("spawn should fail");
        assert!(matches!(err, PublisherError::Io(_)));
    }
}

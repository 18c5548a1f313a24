//! Git metadata queries.
//!
//! The publisher only needs one thing from git: the fetch URL of the
//! project's remote, from which the release repository is derived.

use crate::error::{PublisherError, Result};
use crate::process::{CommandExecutor, Invocation};
use camino::{Utf8Path, Utf8PathBuf};

/// Source of the project's remote fetch URL.
#[cfg_attr(test, mockall::automock)]
pub trait RemoteUrlSource {
    /// Return the configured fetch URL, trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be queried.
    fn fetch_url(&self) -> Result<String>;
}

/// Queries `git ls-remote --get-url` in a repository directory.
pub struct GitRemote<'a> {
    executor: &'a dyn CommandExecutor,
    repo_dir: Utf8PathBuf,
}

impl<'a> GitRemote<'a> {
    /// Query the repository at `repo_dir` through `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, repo_dir: &Utf8Path) -> Self {
        Self {
            executor,
            repo_dir: repo_dir.to_owned(),
        }
    }
}

impl RemoteUrlSource for GitRemote<'_> {
    fn fetch_url(&self) -> Result<String> {
        let invocation = Invocation::new("git")
            .args(["ls-remote", "--get-url"])
            .current_dir(self.repo_dir.clone());
        let output = self.executor.run(&invocation)?;

        if !output.success() {
            return Err(PublisherError::Git {
                operation: "ls-remote",
                message: output.stderr.trim().to_owned(),
            });
        }

        Ok(output.stdout.trim().to_owned())
    }
}

//! Repository identifier resolution from git remote URLs.
//!
//! Accepts anything of the shape `scheme:owner/repo[.git]`, including
//! `git@github.com:owner/repo.git` and
//! `https://github.com/nested/path/owner/repo`.

use crate::error::{PublisherError, Result};
use std::fmt;

const GIT_SUFFIX: &str = ".git";

/// An `owner/name` pair scoping release API calls.
///
/// # Examples
///
/// ```
/// use addon_publisher::repo_id::RepoIdentifier;
///
/// let id = RepoIdentifier::resolve("git@github.com:acme/devices.git")?;
/// assert_eq!(id.owner(), "acme");
/// assert_eq!(id.name(), "devices");
/// assert_eq!(id.to_string(), "acme/devices");
/// # Ok::<(), addon_publisher::error::PublisherError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoIdentifier {
    owner: String,
    name: String,
}

impl RepoIdentifier {
    /// Build an identifier from already-known parts.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Derive the identifier from a remote URL.
    ///
    /// Only the field after the first `:` is inspected. Its last two
    /// `/`-separated segments are the owner and the repository; a single
    /// trailing `.git` is removed from the repository.
    ///
    /// # Errors
    ///
    /// Returns [`PublisherError::MalformedUrl`] when the URL has no `:`, the
    /// path has fewer than two segments, or either part is empty.
    pub fn resolve(remote_url: &str) -> Result<Self> {
        let malformed = |reason| PublisherError::MalformedUrl {
            url: remote_url.to_owned(),
            reason,
        };

        let path = remote_url
            .split(':')
            .nth(1)
            .ok_or_else(|| malformed("missing ':' separator"))?;

        let mut segments = path.rsplit('/');
        let (Some(repo), Some(owner)) = (segments.next(), segments.next()) else {
            return Err(malformed("expected owner/repo after ':'"));
        };

        let repo = repo.strip_suffix(GIT_SUFFIX).unwrap_or(repo);
        if owner.is_empty() || repo.is_empty() {
            return Err(malformed("owner and repository must not be empty"));
        }

        Ok(Self::new(owner, repo))
    }

    /// The owning user or organisation.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The repository name without any `.git` suffix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::ssh("git@github.com:acme/devices.git", "acme/devices")]
    #[case::ssh_no_suffix("git@github.com:acme/devices", "acme/devices")]
    #[case::https("https://github.com/acme/devices.git", "acme/devices")]
    #[case::nested("https://git.example.com/group/sub/acme/devices", "acme/devices")]
    #[case::double_suffix("git@github.com:acme/devices.git.git", "acme/devices.git")]
    #[case::mid_string("git@github.com:acme/devices.github", "acme/devices.github")]
    #[case::suffix_inside("git@github.com:acme/my.git-tools", "acme/my.git-tools")]
    fn resolves_owner_and_repo(#[case] url: &str, #[case] expected: &str) {
        let id = RepoIdentifier::resolve(url).expect("well-formed URL");
        assert_eq!(id.to_string(), expected);
    }

    #[rstest]
    #[case::no_colon("github.com/acme/devices")]
    #[case::empty("")]
    #[case::single_segment("git@github.com:devices.git")]
    #[case::bare_suffix("git@github.com:acme/.git")]
    #[case::trailing_slash("git@github.com:acme/")]
    fn rejects_malformed_urls(#[case] url: &str) {
        let err = RepoIdentifier::resolve(url).expect_err("malformed URL");
        assert!(
            matches!(err, PublisherError::MalformedUrl { .. }),
            "expected MalformedUrl, got {err:?}"
        );
    }

    #[test]
    fn only_second_field_is_used() {
        let id = RepoIdentifier::resolve("ssh:acme/devices:ignored").expect("resolves");
        assert_eq!(id.owner(), "acme");
        assert_eq!(id.name(), "devices");
    }
}

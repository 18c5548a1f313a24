//! GitHub release API access.
//!
//! Provides a trait-based abstraction over the four release endpoints the
//! publisher uses, enabling dependency injection for testing, and a
//! blocking `ureq` implementation.

use crate::repo_id::RepoIdentifier;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Default REST API base.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default upload base; asset uploads go to a separate host.
pub const DEFAULT_UPLOAD_URL: &str = "https://uploads.github.com";

/// Content type for every uploaded artefact.
pub const ASSET_CONTENT_TYPE: &str = "application/octet-stream";

/// Network timeout for a single API call.
const API_TIMEOUT: Duration = Duration::from_secs(60);

const ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("addon-publisher/", env!("CARGO_PKG_VERSION"));

/// A release looked up by tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Numeric release id.
    pub id: u64,
    /// The tag the release is attached to.
    pub tag_name: String,
}

/// A binary attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    /// Numeric asset id.
    pub id: u64,
    /// File name of the asset.
    pub name: String,
}

/// Errors arising from release API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("request failed for {url}: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The response body was not the expected JSON.
    #[error("unexpected response from {url}: {reason}")]
    Decode {
        /// The URL that was requested.
        url: String,
        /// The decode failure.
        reason: String,
    },
}

/// The release endpoints used by the publisher.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseApi {
    /// Find the release attached to `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no release has the tag.
    fn release_by_tag(&self, repo: &RepoIdentifier, tag: &str) -> Result<Release, ApiError>;

    /// List the assets of a release.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn list_assets(&self, repo: &RepoIdentifier, release_id: u64) -> Result<Vec<Asset>, ApiError>;

    /// Delete an asset by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn delete_asset(&self, repo: &RepoIdentifier, asset_id: u64) -> Result<(), ApiError>;

    /// Upload `body` as a new asset called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn upload_asset(
        &self,
        repo: &RepoIdentifier,
        release_id: u64,
        name: &str,
        body: &[u8],
    ) -> Result<Asset, ApiError>;
}

/// Connection settings for [`GithubClient`].
#[derive(Clone)]
pub struct GithubConfig {
    /// REST API base, without a trailing slash.
    pub api_url: String,
    /// Upload base, without a trailing slash.
    pub upload_url: String,
    /// Bearer token; anonymous when `None`.
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            upload_url: DEFAULT_UPLOAD_URL.to_owned(),
            token: None,
        }
    }
}

impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("upload_url", &self.upload_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Blocking GitHub client using `ureq`.
pub struct GithubClient {
    config: GithubConfig,
    agent: ureq::Agent,
}

impl GithubClient {
    /// Create a client with the given settings.
    #[must_use]
    pub fn new(config: GithubConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(API_TIMEOUT))
            .build();
        Self {
            config,
            agent: ureq::Agent::new_with_config(agent_config),
        }
    }

    fn api(&self, repo: &RepoIdentifier, path: &str) -> String {
        repo_url(&self.config.api_url, repo, path)
    }

    fn authorization(&self) -> Option<String> {
        self.config.token.as_ref().map(|t| format!("Bearer {t}"))
    }

    fn get_json<T>(&self, url: &str) -> Result<T, ApiError>
    where
        T: for<'de> Deserialize<'de>,
    {
        log::debug!("GET {url}");
        let mut request = self
            .agent
            .get(url)
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT);
        if let Some(auth) = self.authorization() {
            request = request.header("Authorization", auth);
        }
        let response = request.call().map_err(|e| map_ureq_error(url, &e))?;
        response
            .into_body()
            .read_json::<T>()
            .map_err(|e| ApiError::Decode {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }
}

impl ReleaseApi for GithubClient {
    fn release_by_tag(&self, repo: &RepoIdentifier, tag: &str) -> Result<Release, ApiError> {
        let tag = urlencoding::encode(tag);
        self.get_json(&self.api(repo, &format!("releases/tags/{tag}")))
    }

    fn list_assets(&self, repo: &RepoIdentifier, release_id: u64) -> Result<Vec<Asset>, ApiError> {
        self.get_json(&self.api(
            repo,
            &format!("releases/{release_id}/assets?per_page=100"),
        ))
    }

    fn delete_asset(&self, repo: &RepoIdentifier, asset_id: u64) -> Result<(), ApiError> {
        let url = self.api(repo, &format!("releases/assets/{asset_id}"));
        log::debug!("DELETE {url}");
        let mut request = self
            .agent
            .delete(&url)
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT);
        if let Some(auth) = self.authorization() {
            request = request.header("Authorization", auth);
        }
        request.call().map_err(|e| map_ureq_error(&url, &e))?;
        Ok(())
    }

    fn upload_asset(
        &self,
        repo: &RepoIdentifier,
        release_id: u64,
        name: &str,
        body: &[u8],
    ) -> Result<Asset, ApiError> {
        let url = repo_url(
            &self.config.upload_url,
            repo,
            &format!("releases/{release_id}/assets"),
        );
        log::debug!("POST {url} ({} bytes as {name})", body.len());
        let mut request = self
            .agent
            .post(&url)
            .query("name", name)
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", ASSET_CONTENT_TYPE);
        if let Some(auth) = self.authorization() {
            request = request.header("Authorization", auth);
        }
        let response = request.send(body).map_err(|e| map_ureq_error(&url, &e))?;
        response
            .into_body()
            .read_json::<Asset>()
            .map_err(|e| ApiError::Decode {
                url: url.clone(),
                reason: e.to_string(),
            })
    }
}

/// Build `{base}/repos/{owner}/{repo}/{path}`.
fn repo_url(base: &str, repo: &RepoIdentifier, path: &str) -> String {
    format!(
        "{}/repos/{}/{}/{path}",
        base.trim_end_matches('/'),
        repo.owner(),
        repo.name()
    )
}

/// Map a ureq error to an [`ApiError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> ApiError {
    match err {
        ureq::Error::StatusCode(404) => ApiError::NotFound {
            url: url.to_owned(),
        },
        other => ApiError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;

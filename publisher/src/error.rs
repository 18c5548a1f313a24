//! Error types for the addon publisher.
//!
//! Every variant carries the underlying failure message unmodified so the
//! binary can report exactly what went wrong at the stage that aborted the
//! run.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can abort a build or publish run.
#[derive(Debug, Error)]
pub enum PublisherError {
    /// The runtime version or release tag was not supplied.
    #[error("Missing electron version, tag parameters!")]
    MissingParameters,

    /// A remote URL did not have the `scheme:owner/repo` shape.
    #[error("malformed remote URL \"{url}\": {reason}")]
    MalformedUrl {
        /// The rejected URL.
        url: String,
        /// Which part of the shape was missing.
        reason: &'static str,
    },

    /// The repository identifier could not be determined.
    #[error("Cannot get repo name for this repository: {reason}")]
    RepoResolution {
        /// The underlying git or parse failure.
        reason: String,
    },

    /// No release exists for the requested tag, or the lookup failed.
    #[error("The release via tag {tag} not found: {reason}")]
    ReleaseNotFound {
        /// The tag that was looked up.
        tag: String,
        /// The API failure message.
        reason: String,
    },

    /// An asset with the artefact's name exists and could not be removed.
    #[error("Cannot delete asset '{name}': {reason}")]
    AssetDeletionFailed {
        /// Name of the asset that could not be deleted.
        name: String,
        /// The API failure message.
        reason: String,
    },

    /// The artefact upload failed.
    #[error("{reason}")]
    UploadFailed {
        /// Name of the asset being uploaded.
        name: String,
        /// The API failure message, verbatim.
        reason: String,
    },

    /// `node-gyp` exited unsuccessfully for a module.
    #[error("[node-gyp] Compiling {library} native code failed: {reason}")]
    CompilationFailed {
        /// Library name of the module that failed.
        library: String,
        /// Exit status description.
        reason: String,
    },

    /// A git query failed.
    #[error("git {operation} failed: {message}")]
    Git {
        /// The git operation that failed.
        operation: &'static str,
        /// The trimmed stderr of the git process.
        message: String,
    },

    /// A child process exceeded its time limit and was killed.
    #[error("{program} timed out after {seconds} seconds")]
    Timeout {
        /// The program that was killed.
        program: String,
        /// The limit that was exceeded.
        seconds: u64,
    },

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration at {path}: {reason}")]
    InvalidConfig {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`PublisherError`].
pub type Result<T> = std::result::Result<T, PublisherError>;

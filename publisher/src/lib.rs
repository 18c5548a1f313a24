//! Addon publisher library.
//!
//! This crate rebuilds native Node addons against an Electron runtime and
//! uploads the resulting binaries to a GitHub release, replacing any asset
//! that already carries the same name. It is used by the `addon-publisher`
//! CLI binary and can be driven programmatically from tests.
//!
//! # Modules
//!
//! - [`builder`] - Build planning and `node-gyp` orchestration
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Configuration file loading and defaults
//! - [`distro`] - Linux distribution detection from `os-release`
//! - [`error`] - Error types for every stage of a run
//! - [`git`] - Remote URL lookup through `git`
//! - [`github`] - GitHub releases API client
//! - [`naming`] - Platform detection and artefact naming
//! - [`output`] - Progress and dry-run formatting
//! - [`process`] - External command execution with timeouts
//! - [`publish`] - Release publishing pipeline
//! - [`repo_id`] - Repository identifier parsing from remote URLs

pub mod builder;
pub mod cli;
pub mod config;
pub mod distro;
pub mod error;
pub mod git;
pub mod github;
pub mod naming;
pub mod output;
pub mod process;
pub mod publish;
pub mod repo_id;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

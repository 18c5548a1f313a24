//! CLI argument definitions for the addon publisher.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::error::{PublisherError, Result};
use camino::Utf8PathBuf;
use clap::Parser;

/// Rebuild native addons for Electron and publish them to a GitHub release.
#[derive(Parser, Debug, Clone)]
#[command(name = "addon-publisher")]
#[command(version, about)]
#[command(long_about = concat!(
    "Rebuild native Node addons for an Electron version and publish them.\n\n",
    "Each configured module is rebuilt with node-gyp for every requested ",
    "architecture. With --publish, each binary is uploaded to the GitHub ",
    "release for --tag as {library}_{platform}_{electron}_{arch}.node, ",
    "replacing any asset of the same name.\n\n",
    "The release repository is taken from the project's git remote.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Rebuild the default modules for Electron 8:\n",
    "    $ addon-publisher --electron 8.2.0 --tag v1.4.0\n\n",
    "  Rebuild for two architectures and publish:\n",
    "    $ GITHUB_TOKEN=... addon-publisher --electron 8.2.0 --tag v1.4.0 \\\n",
    "        -a x64 -a arm64 --publish\n\n",
    "  Preview tasks and asset names:\n",
    "    $ addon-publisher --electron 8.2.0 --tag v1.4.0 --dry-run\n",
))]
pub struct Cli {
    /// Electron runtime version to build against.
    #[arg(long, value_name = "VERSION")]
    pub electron: Option<String>,

    /// Tag of the GitHub release to publish to.
    #[arg(long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Architecture to build (can be repeated) [default: from config, x64].
    #[arg(short, long, value_name = "ARCH")]
    pub arch: Vec<String>,

    /// Configuration file [default: addon-publisher.toml in the root].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Project root containing node_modules [default: current directory].
    #[arg(short = 'C', long, value_name = "DIR")]
    pub root: Option<Utf8PathBuf>,

    /// Upload built artefacts to the release.
    #[arg(long)]
    pub publish: bool,

    /// GitHub token used for publishing.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Override the Electron header download URL.
    #[arg(long, value_name = "URL")]
    pub dist_url: Option<String>,

    /// Kill a node-gyp run after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub compile_timeout: Option<u64>,

    /// Show the build plan and asset names without building.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// The two inputs every run needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredArgs<'a> {
    /// Electron runtime version.
    pub electron: &'a str,
    /// Release tag.
    pub tag: &'a str,
}

impl Cli {
    /// Return the runtime version and tag, or fail before any work starts.
    ///
    /// # Errors
    ///
    /// Returns [`PublisherError::MissingParameters`] if either is absent or
    /// blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use addon_publisher::cli::Cli;
    /// use clap::Parser;
    ///
    /// let cli = Cli::parse_from(["addon-publisher", "--electron", "8.2.0"]);
    /// assert!(cli.required().is_err());
    /// ```
    pub fn required(&self) -> Result<RequiredArgs<'_>> {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        match (present(&self.electron), present(&self.tag)) {
            (Some(electron), Some(tag)) => Ok(RequiredArgs { electron, tag }),
            _ => Err(PublisherError::MissingParameters),
        }
    }

    /// The log level implied by `-v` and `-q`.
    #[must_use]
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;

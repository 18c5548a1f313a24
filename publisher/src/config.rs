//! Publisher configuration.
//!
//! The built-in defaults describe the two addon modules of the desktop
//! app this tool was written for. A project can replace any of them with
//! an `addon-publisher.toml` file in its root, or a file named with
//! `--config`.

use crate::builder::AddonModule;
use crate::error::{PublisherError, Result};
use crate::github::{DEFAULT_API_URL, DEFAULT_UPLOAD_URL};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

/// File name looked up in the project root when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "addon-publisher.toml";

/// Where `node-gyp` downloads Electron headers from.
pub const DEFAULT_DIST_URL: &str = "https://atom.io/download/electron";

/// Architectures built when neither the file nor the CLI names any.
pub const DEFAULT_ARCHITECTURES: &[&str] = &["x64"];

/// Resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublisherConfig {
    /// Electron header download URL.
    pub dist_url: String,
    /// Architectures to build, in order.
    pub architectures: Vec<String>,
    /// GitHub REST API base.
    pub api_url: String,
    /// GitHub upload base.
    pub upload_url: String,
    /// Modules to rebuild, in order.
    pub modules: Vec<AddonModule>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            dist_url: DEFAULT_DIST_URL.to_owned(),
            architectures: DEFAULT_ARCHITECTURES
                .iter()
                .map(|&a| a.to_owned())
                .collect(),
            api_url: DEFAULT_API_URL.to_owned(),
            upload_url: DEFAULT_UPLOAD_URL.to_owned(),
            modules: default_modules(),
        }
    }
}

/// The built-in module list.
#[must_use]
pub fn default_modules() -> Vec<AddonModule> {
    vec![
        AddonModule::new(
            "detector",
            "node_modules/usb-detection",
            "build/Release/detection.node",
        ),
        AddonModule::new(
            "serialport",
            "node_modules/@serialport/bindings",
            "build/Release/bindings.node",
        ),
    ]
}

impl PublisherConfig {
    /// Parse configuration text; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`PublisherError::InvalidConfig`] on TOML errors, unknown
    /// keys, or an empty module or architecture list.
    pub fn parse(contents: &str, path: &Utf8Path) -> Result<Self> {
        let invalid = |reason: String| PublisherError::InvalidConfig {
            path: path.to_owned(),
            reason,
        };

        let config: Self =
            toml::from_str(contents).map_err(|e| invalid(format!("TOML parse error: {e}")))?;

        if config.modules.is_empty() {
            return Err(invalid("at least one module is required".to_owned()));
        }
        if config.architectures.is_empty() {
            return Err(invalid("at least one architecture is required".to_owned()));
        }

        Ok(config)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`PublisherError::InvalidConfig`] if the file cannot be read
    /// or parsed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| PublisherError::InvalidConfig {
                path: path.to_owned(),
                reason: e.to_string(),
            })?;
        Self::parse(&contents, path)
    }

    /// Load `explicit` if given, else `root/addon-publisher.toml` if it
    /// exists, else the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read or parsed.
    pub fn discover(root: &Utf8Path, explicit: Option<&Utf8Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate: Utf8PathBuf = root.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            log::info!("using configuration from {candidate}");
            Self::load(&candidate)
        } else {
            log::debug!("no {DEFAULT_CONFIG_FILE} in {root}; using built-in defaults");
            Ok(Self::default())
        }
    }
}

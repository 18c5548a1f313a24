//! Artefact naming policy for prebuilt addon binaries.
//!
//! Constructs deterministic asset names in the format
//! `{library}_{platform}_{runtime}_{arch}.node`, where the platform segment
//! is the distribution name and version on Linux hosts with readable
//! distribution metadata, and Node's `os.platform()` spelling otherwise.

use crate::distro::{Distro, DistroProbe};
use std::fmt;

/// The fixed file extension for native addon binaries.
const ARTEFACT_EXTENSION: &str = ".node";

/// Node's name for Linux, the only platform whose segment carries distro
/// metadata.
const LINUX: &str = "linux";

/// Map a Rust `target_os` name to Node's `os.platform()` spelling.
///
/// # Examples
///
/// ```
/// use addon_publisher::naming::node_platform;
///
/// assert_eq!(node_platform("macos"), "darwin");
/// assert_eq!(node_platform("windows"), "win32");
/// assert_eq!(node_platform("linux"), "linux");
/// ```
#[must_use]
pub fn node_platform(os: &str) -> &str {
    match os {
        "macos" | "ios" => "darwin",
        "windows" => "win32",
        "solaris" | "illumos" => "sunos",
        other => other,
    }
}

/// Host platform facts used for naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    platform: String,
    distro: Option<Distro>,
}

impl PlatformInfo {
    /// Describe a platform explicitly.
    ///
    /// `platform` uses Node's spelling (`linux`, `darwin`, `win32`, ...).
    /// `distro` is ignored for every platform except `linux`.
    #[must_use]
    pub fn new(platform: impl Into<String>, distro: Option<Distro>) -> Self {
        Self {
            platform: platform.into(),
            distro,
        }
    }

    /// Describe the running host, consulting `probe` only on Linux.
    #[must_use]
    pub fn detect(probe: &dyn DistroProbe) -> Self {
        let platform = node_platform(std::env::consts::OS);
        let distro = if platform == LINUX {
            probe.probe()
        } else {
            None
        };
        Self::new(platform, distro)
    }

    /// The raw platform name.
    #[must_use]
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Whether this is a Linux-family host.
    #[must_use]
    pub fn is_linux(&self) -> bool {
        self.platform == LINUX
    }

    /// The platform segment of an artefact name.
    ///
    /// Falls back to the raw platform name when distro metadata is missing
    /// or has neither a release number nor a code name.
    #[must_use]
    pub fn segment(&self) -> String {
        let distro_segment = self
            .distro
            .as_ref()
            .filter(|_| self.is_linux())
            .and_then(|d| d.version().map(|v| format!("{}{v}", d.name)));

        match distro_segment {
            Some(segment) => segment,
            None => {
                if self.is_linux() {
                    log::debug!("no distribution metadata; naming with platform {LINUX}");
                }
                self.platform.clone()
            }
        }
    }
}

/// A fully-qualified artefact asset name.
///
/// # Examples
///
/// ```
/// use addon_publisher::distro::Distro;
/// use addon_publisher::naming::{ArtefactName, PlatformInfo};
///
/// let mac = PlatformInfo::new("darwin", None);
/// let name = ArtefactName::new("detector", "80", "x64", &mac);
/// assert_eq!(name.as_str(), "detector_darwin_80_x64.node");
///
/// let ubuntu = PlatformInfo::new(
///     "linux",
///     Some(Distro {
///         name: "ubuntu".to_owned(),
///         release: Some("20.04".to_owned()),
///         code: None,
///     }),
/// );
/// let name = ArtefactName::new("detector", "80", "x64", &ubuntu);
/// assert_eq!(name.as_str(), "detector_ubuntu20.04_80_x64.node");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtefactName(String);

impl ArtefactName {
    /// Compose the name from its parts.
    #[must_use]
    pub fn new(
        library: &str,
        runtime_version: &str,
        architecture: &str,
        platform: &PlatformInfo,
    ) -> Self {
        Self(format!(
            "{library}_{}_{runtime_version}_{architecture}{ARTEFACT_EXTENSION}",
            platform.segment()
        ))
    }

    /// Return the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ArtefactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtefactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity of one compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget<'a> {
    /// Library name used as the artefact prefix.
    pub library: &'a str,
    /// Electron runtime version.
    pub runtime_version: &'a str,
    /// CPU architecture, e.g. `x64`.
    pub architecture: &'a str,
    /// Host platform facts.
    pub platform: &'a PlatformInfo,
}

impl BuildTarget<'_> {
    /// The asset name for this target.
    #[must_use]
    pub fn artefact_name(&self) -> ArtefactName {
        ArtefactName::new(
            self.library,
            self.runtime_version,
            self.architecture,
            self.platform,
        )
    }
}

//! Linux distribution metadata.
//!
//! Artefacts built on Linux are tagged with the distribution they were
//! built on, since the addons link against the host's system libraries.
//! The metadata comes from the `os-release` file.

use std::path::{Path, PathBuf};

/// Locations searched for `os-release`, in order.
const OS_RELEASE_PATHS: &[&str] = &["/etc/os-release", "/usr/lib/os-release"];

/// Distribution name plus release number and/or version code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distro {
    /// Distribution identifier, e.g. `ubuntu`.
    pub name: String,
    /// Release number, e.g. `20.04`.
    pub release: Option<String>,
    /// Version code name, e.g. `focal`.
    pub code: Option<String>,
}

impl Distro {
    /// The version component used in artefact names.
    ///
    /// The release number wins over the code name. Empty values count as
    /// absent, so a distro with neither yields `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use addon_publisher::distro::Distro;
    ///
    /// let distro = Distro {
    ///     name: "debian".to_owned(),
    ///     release: None,
    ///     code: Some("bookworm".to_owned()),
    /// };
    /// assert_eq!(distro.version(), Some("bookworm"));
    /// ```
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        non_empty(self.release.as_deref()).or_else(|| non_empty(self.code.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Source of distribution metadata.
#[cfg_attr(test, mockall::automock)]
pub trait DistroProbe {
    /// Return the host distribution, or `None` when it cannot be determined.
    fn probe(&self) -> Option<Distro>;
}

/// Reads the host's `os-release` file.
#[derive(Debug, Clone)]
pub struct OsReleaseProbe {
    paths: Vec<PathBuf>,
}

impl OsReleaseProbe {
    /// Probe the standard `os-release` locations.
    #[must_use]
    pub fn new() -> Self {
        Self::with_paths(OS_RELEASE_PATHS.iter().map(PathBuf::from).collect())
    }

    /// Probe the given files in order.
    #[must_use]
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl Default for OsReleaseProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl DistroProbe for OsReleaseProbe {
    fn probe(&self) -> Option<Distro> {
        self.paths.iter().find_map(|path| read_os_release(path))
    }
}

fn read_os_release(path: &Path) -> Option<Distro> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_os_release(&contents),
        Err(err) => {
            log::debug!("cannot read {}: {err}", path.display());
            None
        }
    }
}

/// Parse the contents of an `os-release` file.
///
/// Returns `None` when there is no `ID` entry.
#[must_use]
pub fn parse_os_release(contents: &str) -> Option<Distro> {
    let mut distro = Distro::default();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = unquote(value.trim());
        match key.trim() {
            "ID" => value.clone_into(&mut distro.name),
            "VERSION_ID" => distro.release = Some(value.to_owned()),
            "VERSION_CODENAME" => distro.code = Some(value.to_owned()),
            _ => {}
        }
    }

    (!distro.name.is_empty()).then_some(distro)
}

fn unquote(value: &str) -> &str {
    ['"', '\'']
        .iter()
        .find_map(|&q| value.strip_prefix(q).and_then(|v| v.strip_suffix(q)))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const UBUNTU: &str = r#"
NAME="Ubuntu"
VERSION="20.04.6 LTS (Focal Fossa)"
ID=ubuntu
ID_LIKE=debian
VERSION_ID="20.04"
VERSION_CODENAME=focal
"#;

    #[test]
    fn parses_ubuntu() {
        let distro = parse_os_release(UBUNTU).expect("has ID");
        assert_eq!(distro.name, "ubuntu");
        assert_eq!(distro.release.as_deref(), Some("20.04"));
        assert_eq!(distro.code.as_deref(), Some("focal"));
        assert_eq!(distro.version(), Some("20.04"));
    }

    #[test]
    fn ignores_comments_and_single_quotes() {
        let contents = "# generated\nID='arch'\nBUILD_ID=rolling\n";
        let distro = parse_os_release(contents).expect("has ID");
        assert_eq!(distro.name, "arch");
        assert_eq!(distro.version(), None);
    }

    #[test]
    fn missing_id_yields_none() {
        assert_eq!(parse_os_release("VERSION_ID=\"12\"\n"), None);
    }

    #[rstest]
    #[case::release_wins(Some("12"), Some("bookworm"), Some("12"))]
    #[case::code_fallback(None, Some("bookworm"), Some("bookworm"))]
    #[case::empty_release(Some(""), Some("bookworm"), Some("bookworm"))]
    #[case::neither(None, None, None)]
    fn version_precedence(
        #[case] release: Option<&str>,
        #[case] code: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let distro = Distro {
            name: "debian".to_owned(),
            release: release.map(str::to_owned),
            code: code.map(str::to_owned),
        };
        assert_eq!(distro.version(), expected);
    }

    #[test]
    fn probe_falls_through_to_next_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let present = dir.path().join("os-release");
        std::fs::write(&present, UBUNTU).expect("write os-release");

        let probe = OsReleaseProbe::with_paths(vec![dir.path().join("missing"), present]);
        let distro = probe.probe().expect("second path readable");
        assert_eq!(distro.name, "ubuntu");
    }

    #[test]
    fn probe_without_files_yields_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let probe = OsReleaseProbe::with_paths(vec![dir.path().join("missing")]);
        assert_eq!(probe.probe(), None);
    }
}

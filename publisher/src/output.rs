//! Output formatting for the publisher CLI.
//!
//! Progress lines and dry-run reports are written through plain
//! [`Write`] handles so tests can capture them.

use crate::builder::BuildPlan;
use crate::naming::PlatformInfo;
use camino::Utf8Path;
use std::io::Write;

/// Write one line, ignoring failures to write.
pub fn write_line(out: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(out, "{message}").is_err() {
        // Best-effort progress reporting; ignore write failures.
    }
}

/// Format a summary after a successful run.
///
/// # Examples
///
/// ```
/// use addon_publisher::output::success_message;
///
/// assert_eq!(success_message(1, false), "Built 1 artefact.");
/// assert_eq!(success_message(4, true), "Built and published 4 artefacts.");
/// ```
#[must_use]
pub fn success_message(count: usize, published: bool) -> String {
    let plural = if count == 1 { "artefact" } else { "artefacts" };
    let verb = if published {
        "Built and published"
    } else {
        "Built"
    };
    format!("{verb} {count} {plural}.")
}

/// Everything a dry run reports.
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Project root holding the addon modules.
    pub root: &'a Utf8Path,
    /// Electron runtime version.
    pub runtime_version: &'a str,
    /// Release tag.
    pub tag: &'a str,
    /// Whether artefacts would be uploaded.
    pub publish: bool,
    /// Host platform facts.
    pub platform: &'a PlatformInfo,
    /// The ordered build plan.
    pub plan: &'a BuildPlan,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let mut lines = vec![
            "Dry run - nothing will be built or uploaded".to_owned(),
            String::new(),
            format!("Project root: {}", self.root),
            format!("Electron version: {}", self.runtime_version),
            format!("Release tag: {}", self.tag),
            format!("Platform: {}", self.platform.segment()),
            format!("Publish: {}", self.publish),
            String::new(),
            "Build tasks:".to_owned(),
        ];

        for task in self.plan.tasks() {
            let name = task.artefact_name(self.plan.runtime_version(), self.platform);
            lines.push(format!(
                "  - [{}] {} -> {name}",
                task.architecture,
                task.module.directory
            ));
        }

        for skipped in self.plan.skipped() {
            lines.push(format!("  (skipped {skipped} on {})", self.platform.platform()));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::singular(1, false, "Built 1 artefact.")]
    #[case::plural(2, false, "Built 2 artefacts.")]
    #[case::published(3, true, "Built and published 3 artefacts.")]
    fn success_message_pluralises(
        #[case] count: usize,
        #[case] published: bool,
        #[case] expected: &str,
    ) {
        assert_eq!(success_message(count, published), expected);
    }

    #[test]
    fn write_line_appends_newline() {
        let mut buf = Vec::new();
        write_line(&mut buf, "release id: 42");
        assert_eq!(buf, b"release id: 42\n");
    }
}

//! `node-gyp` build orchestration for native addon modules.
//!
//! A [`BuildPlan`] lists every (architecture, module) pair in declared
//! order before anything runs. The [`Builder`] then compiles them one at a
//! time and stops at the first failure: the modules share a console and
//! `node-gyp` keeps state in each module directory, so nothing runs
//! concurrently.

use crate::error::{PublisherError, Result};
use crate::naming::{ArtefactName, BuildTarget, PlatformInfo};
use crate::output::write_line;
use crate::process::{CommandExecutor, Invocation};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::io::Write;

/// Name of the `node-gyp` executable on this host.
#[cfg(windows)]
pub const NODE_GYP: &str = "node-gyp.cmd";

/// Name of the `node-gyp` executable on this host.
#[cfg(not(windows))]
pub const NODE_GYP: &str = "node-gyp";

/// Electron no longer ships 32-bit x86 Linux builds.
const LINUX_UNSUPPORTED_ARCH: &str = "ia32";

/// A native module to rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddonModule {
    /// Library name used as the artefact prefix, e.g. `detector`.
    pub library: String,
    /// Module directory relative to the project root.
    pub directory: Utf8PathBuf,
    /// Build output relative to the module directory.
    pub binary: Utf8PathBuf,
}

impl AddonModule {
    /// Describe a module.
    #[must_use]
    pub fn new(
        library: impl Into<String>,
        directory: impl Into<Utf8PathBuf>,
        binary: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            library: library.into(),
            directory: directory.into(),
            binary: binary.into(),
        }
    }
}

/// One compile step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTask {
    /// Target CPU architecture.
    pub architecture: String,
    /// Module to compile.
    pub module: AddonModule,
}

impl BuildTask {
    /// The asset name the task's output will be published under.
    #[must_use]
    pub fn artefact_name(&self, runtime_version: &str, platform: &PlatformInfo) -> ArtefactName {
        BuildTarget {
            library: &self.module.library,
            runtime_version,
            architecture: &self.architecture,
            platform,
        }
        .artefact_name()
    }
}

/// The ordered, immutable list of compile steps for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    runtime_version: String,
    dist_url: String,
    tasks: Vec<BuildTask>,
    skipped: Vec<String>,
}

impl BuildPlan {
    /// Expand architectures × modules into tasks, architecture-major.
    ///
    /// Duplicate architectures are dropped. On Linux, `ia32` is recorded as
    /// skipped instead of producing tasks.
    #[must_use]
    pub fn new(
        runtime_version: &str,
        dist_url: &str,
        architectures: &[String],
        modules: &[AddonModule],
        platform: &PlatformInfo,
    ) -> Self {
        let mut tasks = Vec::with_capacity(architectures.len() * modules.len());
        let mut seen: Vec<&str> = Vec::new();
        let mut skipped = Vec::new();

        for arch in architectures {
            if seen.contains(&arch.as_str()) {
                continue;
            }
            seen.push(arch);

            if platform.is_linux() && arch == LINUX_UNSUPPORTED_ARCH {
                skipped.push(arch.clone());
                continue;
            }

            tasks.extend(modules.iter().map(|module| BuildTask {
                architecture: arch.clone(),
                module: module.clone(),
            }));
        }

        Self {
            runtime_version: runtime_version.to_owned(),
            dist_url: dist_url.to_owned(),
            tasks,
            skipped,
        }
    }

    /// Electron runtime version being targeted.
    #[must_use]
    pub fn runtime_version(&self) -> &str {
        &self.runtime_version
    }

    /// Header download URL passed to `node-gyp`.
    #[must_use]
    pub fn dist_url(&self) -> &str {
        &self.dist_url
    }

    /// Tasks in execution order.
    #[must_use]
    pub fn tasks(&self) -> &[BuildTask] {
        &self.tasks
    }

    /// Architectures left out because the host cannot target them.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}

/// A successfully compiled binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArtefact {
    /// Library name of the module.
    pub library: String,
    /// Architecture it was built for.
    pub architecture: String,
    /// Absolute path of the `.node` binary.
    pub binary_path: Utf8PathBuf,
}

impl BuiltArtefact {
    /// The target this binary was compiled for.
    #[must_use]
    pub fn target<'a>(
        &'a self,
        runtime_version: &'a str,
        platform: &'a PlatformInfo,
    ) -> BuildTarget<'a> {
        BuildTarget {
            library: &self.library,
            runtime_version,
            architecture: &self.architecture,
            platform,
        }
    }
}

/// Runs a [`BuildPlan`] against a project root.
pub struct Builder<'a> {
    executor: &'a dyn CommandExecutor,
    root: Utf8PathBuf,
}

impl<'a> Builder<'a> {
    /// Build modules found under `root` using `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, root: &Utf8Path) -> Self {
        Self {
            executor,
            root: root.to_owned(),
        }
    }

    /// The `node-gyp rebuild` invocation for one task.
    #[must_use]
    pub fn compile_invocation(&self, plan: &BuildPlan, task: &BuildTask) -> Invocation {
        Invocation::new(NODE_GYP)
            .args([
                "rebuild".to_owned(),
                format!("--target={}", plan.runtime_version()),
                format!("--arch={}", task.architecture),
                format!("--dist-url={}", plan.dist_url()),
            ])
            .current_dir(self.module_dir(&task.module))
            .inherit_output()
    }

    /// Compile every task in order.
    ///
    /// # Errors
    ///
    /// Returns [`PublisherError::CompilationFailed`] for the first task whose
    /// `node-gyp` run exits unsuccessfully; later tasks are not started.
    /// Spawn failures and timeouts are returned as-is.
    pub fn run(&self, plan: &BuildPlan, progress: &mut dyn Write) -> Result<Vec<BuiltArtefact>> {
        for arch in plan.skipped() {
            write_line(
                progress,
                format!(
                    "Skipping arch {arch} on linux: Electron does not support this combination."
                ),
            );
        }

        let mut built = Vec::with_capacity(plan.tasks().len());
        for task in plan.tasks() {
            built.push(self.build_task(plan, task, progress)?);
        }
        Ok(built)
    }

    fn build_task(
        &self,
        plan: &BuildPlan,
        task: &BuildTask,
        progress: &mut dyn Write,
    ) -> Result<BuiltArtefact> {
        let library = &task.module.library;
        write_line(
            progress,
            format!(
                "[node-gyp] Building {library} for electron {} and arch {}",
                plan.runtime_version(),
                task.architecture
            ),
        );

        let invocation = self.compile_invocation(plan, task);
        let output = self.executor.run(&invocation)?;
        if !output.success() {
            return Err(PublisherError::CompilationFailed {
                library: library.clone(),
                reason: output.status_text(),
            });
        }

        let binary_path = self.module_dir(&task.module).join(&task.module.binary);
        write_line(
            progress,
            format!("[node-gyp] Build complete: {binary_path}"),
        );

        Ok(BuiltArtefact {
            library: library.clone(),
            architecture: task.architecture.clone(),
            binary_path,
        })
    }

    fn module_dir(&self, module: &AddonModule) -> Utf8PathBuf {
        self.root.join(&module.directory)
    }
}

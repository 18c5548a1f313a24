//! Addon publisher CLI entrypoint.
//!
//! This binary rebuilds the project's native addons for an Electron runtime
//! and, with `--publish`, uploads each binary to the GitHub release for the
//! given tag.

use addon_publisher::builder::{BuildPlan, Builder, BuiltArtefact};
use addon_publisher::cli::{Cli, RequiredArgs};
use addon_publisher::config::PublisherConfig;
use addon_publisher::distro::OsReleaseProbe;
use addon_publisher::error::{PublisherError, Result};
use addon_publisher::git::GitRemote;
use addon_publisher::github::{GithubClient, GithubConfig};
use addon_publisher::naming::PlatformInfo;
use addon_publisher::output::{DryRunInfo, success_message, write_line};
use addon_publisher::process::SystemCommandExecutor;
use addon_publisher::publish::{PublishRequest, publish_to, resolve_repository};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::io::Write;
use std::time::Duration;

/// Upper bound on the `git ls-remote` query.
const GIT_TIMEOUT: Duration = Duration::from_secs(60);

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let mut stdout = std::io::stdout();
    let mut sink = std::io::sink();
    let progress: &mut dyn Write = if cli.quiet { &mut sink } else { &mut stdout };

    let run_result = run(&cli, progress);
    let mut stderr = std::io::stderr();
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(cli: &Cli) {
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli, progress: &mut dyn Write) -> Result<()> {
    let required = cli.required()?;
    let root = resolve_root(cli.root.as_deref())?;
    let config = apply_overrides(cli, PublisherConfig::discover(&root, cli.config.as_deref())?);

    let platform = PlatformInfo::detect(&OsReleaseProbe::new());
    log::info!("building for platform {}", platform.segment());

    let plan = BuildPlan::new(
        required.electron,
        &config.dist_url,
        &config.architectures,
        &config.modules,
        &platform,
    );

    if cli.dry_run {
        let info = DryRunInfo {
            root: &root,
            runtime_version: required.electron,
            tag: required.tag,
            publish: cli.publish,
            platform: &platform,
            plan: &plan,
        };
        write_line(progress, info.display_text());
        return Ok(());
    }

    let executor = compile_executor(cli.compile_timeout);
    let built = Builder::new(&executor, &root).run(&plan, progress)?;

    if cli.publish {
        let context = PublishContext {
            root: &root,
            config: &config,
            token: cli.token.as_deref(),
            required,
            platform: &platform,
        };
        publish_all(&context, &built, progress)?;
    }

    write_line(progress, success_message(built.len(), cli.publish));
    Ok(())
}

/// The project root: `--root` if given, else the working directory.
fn resolve_root(explicit: Option<&Utf8Path>) -> Result<Utf8PathBuf> {
    if let Some(root) = explicit {
        return Ok(root.to_owned());
    }
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::try_from(cwd).map_err(|e| PublisherError::Io(e.into_io_error()))
}

/// Command-line values win over the configuration file.
fn apply_overrides(cli: &Cli, mut config: PublisherConfig) -> PublisherConfig {
    if !cli.arch.is_empty() {
        config.architectures.clone_from(&cli.arch);
    }
    if let Some(dist_url) = &cli.dist_url {
        config.dist_url.clone_from(dist_url);
    }
    config
}

fn compile_executor(timeout_secs: Option<u64>) -> SystemCommandExecutor {
    match timeout_secs {
        Some(secs) => SystemCommandExecutor::with_timeout(Duration::from_secs(secs)),
        None => SystemCommandExecutor::new(),
    }
}

struct PublishContext<'a> {
    root: &'a Utf8Path,
    config: &'a PublisherConfig,
    token: Option<&'a str>,
    required: RequiredArgs<'a>,
    platform: &'a PlatformInfo,
}

/// Publish every built artefact, resolving the repository once.
fn publish_all(
    context: &PublishContext<'_>,
    built: &[BuiltArtefact],
    progress: &mut dyn Write,
) -> Result<()> {
    if context.token.is_none() {
        log::warn!("no GitHub token given; uploads will be rejected for private repositories");
    }

    let git = SystemCommandExecutor::with_timeout(GIT_TIMEOUT);
    let remote = GitRemote::new(&git, context.root);
    let repo = resolve_repository(&remote, progress)?;

    let api = GithubClient::new(GithubConfig {
        api_url: context.config.api_url.clone(),
        upload_url: context.config.upload_url.clone(),
        token: context.token.map(str::to_owned),
    });

    for artefact in built {
        let name = artefact
            .target(context.required.electron, context.platform)
            .artefact_name();
        let request = PublishRequest {
            tag: context.required.tag,
            file: &artefact.binary_path,
            artefact_name: &name,
        };
        publish_to(&api, &repo, &request, progress)?;
    }
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_line(stderr, err);
            1
        }
    }
}

//! BDD tests for planning and running `node-gyp` rebuilds.

use addon_publisher::builder::{BuildPlan, Builder, BuiltArtefact, NODE_GYP};
use addon_publisher::config::{DEFAULT_DIST_URL, default_modules};
use addon_publisher::error::PublisherError;
use addon_publisher::naming::PlatformInfo;
use addon_publisher::test_utils::{ExpectedCall, StubExecutor, failure_output, success_output};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[derive(Default)]
struct BuildWorld {
    platform: Option<PlatformInfo>,
    architectures: Vec<String>,
    failing_compile: Option<usize>,
    node_gyp_args: Vec<Vec<String>>,
    progress: String,
    result: Option<Result<Vec<BuiltArtefact>, PublisherError>>,
}

#[fixture]
fn world() -> BuildWorld {
    BuildWorld::default()
}

#[given("a \"{platform}\" host")]
fn given_host(world: &mut BuildWorld, platform: String) {
    world.platform = Some(PlatformInfo::new(platform, None));
}

#[given("the architectures \"{architectures}\"")]
fn given_architectures(world: &mut BuildWorld, architectures: String) {
    world.architectures = architectures.split(',').map(str::to_owned).collect();
}

#[given("compile {index} fails")]
fn given_compile_fails(world: &mut BuildWorld, index: usize) {
    world.failing_compile = Some(index);
}

#[when("the modules are rebuilt for electron \"{version}\"")]
fn when_rebuilt(world: &mut BuildWorld, version: String) {
    let platform = world.platform.as_ref().expect("host not set");
    let plan = BuildPlan::new(
        &version,
        DEFAULT_DIST_URL,
        &world.architectures,
        &default_modules(),
        platform,
    );

    let mut expected = Vec::new();
    for (position, task) in plan.tasks().iter().enumerate() {
        let args = [
            "rebuild".to_owned(),
            format!("--target={version}"),
            format!("--arch={}", task.architecture),
            format!("--dist-url={DEFAULT_DIST_URL}"),
        ];
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let fails = world.failing_compile == Some(position + 1);
        let result = if fails {
            Ok(failure_output(1, "gyp ERR! build error"))
        } else {
            Ok(success_output(""))
        };
        expected.push(ExpectedCall::new(NODE_GYP, &args, result));
        if fails {
            break;
        }
    }

    let executor = StubExecutor::new(expected);
    let root = camino::Utf8Path::new("/work/app");
    let mut progress = Vec::new();
    world.result = Some(Builder::new(&executor, root).run(&plan, &mut progress));
    executor.assert_finished();

    world.node_gyp_args = executor
        .invocations()
        .iter()
        .map(|invocation| invocation.arguments().to_vec())
        .collect();
    world.progress = String::from_utf8(progress).expect("UTF-8 progress");
}

fn built(world: &BuildWorld) -> &[BuiltArtefact] {
    world
        .result
        .as_ref()
        .expect("build was not run")
        .as_ref()
        .expect("build should succeed")
}

#[then("{count} artefacts are built")]
fn then_artefacts_built(world: &mut BuildWorld, count: usize) {
    let artefacts = built(world);
    assert_eq!(artefacts.len(), count);
    assert!(
        artefacts
            .iter()
            .all(|a| a.binary_path.starts_with("/work/app/node_modules"))
    );
}

#[then("node-gyp ran {count} times")]
fn then_node_gyp_ran(world: &mut BuildWorld, count: usize) {
    assert_eq!(world.node_gyp_args.len(), count);
}

#[then("the last node-gyp run targeted \"{arch}\"")]
fn then_last_run_targeted(world: &mut BuildWorld, arch: String) {
    let last = world.node_gyp_args.last().expect("node-gyp never ran");
    assert!(last.contains(&format!("--arch={arch}")), "args: {last:?}");
}

#[then("the build fails with \"{fragment}\"")]
fn then_build_fails(world: &mut BuildWorld, fragment: String) {
    let err = world
        .result
        .as_ref()
        .expect("build was not run")
        .as_ref()
        .expect_err("build should fail");
    assert!(matches!(err, PublisherError::CompilationFailed { .. }));
    assert!(err.to_string().contains(&fragment), "unexpected error: {err}");
}

#[then("the progress output mentions \"{fragment}\"")]
fn then_progress_mentions(world: &mut BuildWorld, fragment: String) {
    assert!(
        world.progress.contains(&fragment),
        "progress: {}",
        world.progress
    );
}

#[scenario(
    path = "tests/features/build.feature",
    name = "Every module is rebuilt for each architecture"
)]
fn scenario_every_module(world: BuildWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/build.feature",
    name = "A failed compile stops the remaining modules"
)]
fn scenario_failed_compile(world: BuildWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/build.feature",
    name = "32-bit builds are skipped on Linux"
)]
fn scenario_ia32_linux(world: BuildWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/build.feature",
    name = "32-bit builds run on Windows"
)]
fn scenario_ia32_windows(world: BuildWorld) {
    let _ = world;
}

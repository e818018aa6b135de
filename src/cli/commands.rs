//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::FrameworkSettings;
use crate::framework::sanitize;
use crate::inspect::detect_artifact_kind;
use crate::manifest::{LoadedSuite, SuiteManifest};
use crate::platform::PlatformInfo;
use crate::reporter::{ConsoleReporter, JsonReporter, TestReporter};
use crate::runner::CompilerRunner;

use super::{CliError, CliResult, ExitCode, ReportFormat};

/// Root under which per-suite workspaces are created by default.
const DEFAULT_WORKSPACE_ROOT: &str = "target/ctestfw";

/// Options for `ctestfw run`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub manifest: PathBuf,
    pub compiler: Option<PathBuf>,
    pub workspace: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub cleanup: bool,
    pub format: ReportFormat,
    pub verbose: bool,
}

// ============================================================================
// run
// ============================================================================

/// Load a manifest, apply overrides, and run the suite.
///
/// Exit codes: 0 when every case passed, 1 when any case failed, 2 when the
/// suite could not be set up.
pub fn run_suite(opts: &RunOptions) -> CliResult<ExitCode> {
    let settings = FrameworkSettings::load()?;
    let (loaded, workspace) = prepare_suite(opts, &settings)?;
    let LoadedSuite { suite, runner_config } = loaded;
    let runner = CompilerRunner::new(runner_config);

    let mut reporter: Box<dyn TestReporter> = match opts.format {
        ReportFormat::Console => Box::new(ConsoleReporter::stdout(opts.verbose, use_color())),
        ReportFormat::Json => Box::new(JsonReporter::stdout(opts.verbose)),
    };

    let report = suite.run_with_reporter(&runner, &workspace, reporter.as_mut())?;
    Ok(if report.ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Resolve the manifest into a runnable suite plus its root workspace.
///
/// Precedence for every override: command-line flag, then environment, then
/// manifest.
fn prepare_suite(opts: &RunOptions, settings: &FrameworkSettings) -> CliResult<(LoadedSuite, PathBuf)> {
    let manifest = SuiteManifest::load(&opts.manifest)?;
    let base_dir = manifest_dir(&opts.manifest);
    let manifest_cleanup = manifest.cleanup;
    let mut loaded = manifest.into_suite(&base_dir)?;

    if let Some(compiler) = opts.compiler.clone().or_else(|| settings.compiler.clone()) {
        loaded.runner_config.executable = compiler;
    }

    let timeout = opts.timeout.map(Duration::from_secs).or(settings.timeout);
    if let Some(timeout) = timeout {
        loaded.runner_config.timeout = timeout;
    }

    let cleanup = opts.cleanup || settings.cleanup.unwrap_or(manifest_cleanup);
    loaded.suite = loaded.suite.with_cleanup(cleanup);

    let workspace = opts
        .workspace
        .clone()
        .or_else(|| settings.workspace.clone())
        .unwrap_or_else(|| Path::new(DEFAULT_WORKSPACE_ROOT).join(sanitize(loaded.suite.name())));

    tracing::debug!(
        manifest = %opts.manifest.display(),
        compiler = %loaded.runner_config.executable.display(),
        workspace = %workspace.display(),
        cleanup,
        "suite prepared"
    );
    Ok((loaded, workspace))
}

fn manifest_dir(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

// ============================================================================
// inspect
// ============================================================================

/// Print `<path>: <kind>` for each file.
///
/// Unreadable files are reported on stderr and make the command exit 1, but
/// the remaining files are still inspected.
pub fn inspect_files(files: &[PathBuf]) -> CliResult<ExitCode> {
    let mut unreadable = 0usize;
    for file in files {
        match detect_artifact_kind(file) {
            Ok(info) => println!("{}: {}", info.path.display(), info.kind),
            Err(e) => {
                eprintln!("{}: {e}", file.display());
                unreadable += 1;
            }
        }
    }

    if unreadable > 0 {
        return Err(CliError::failure(format!("{unreadable} file(s) could not be read")));
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// platform
// ============================================================================

/// Print the detected host platform.
pub fn show_platform() -> CliResult<ExitCode> {
    let platform = PlatformInfo::detect();
    println!("{platform}");
    match platform.os.native_artifact_kind() {
        Some(kind) => println!("native artifact: {kind}"),
        None => println!("native artifact: unsupported"),
    }
    Ok(ExitCode::SUCCESS)
}

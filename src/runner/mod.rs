//! Compiler runner
//!
//! Turns a [`CompilePlan`] into one subprocess invocation of the compiler under
//! test and captures everything the assertions need afterwards.
//!
//! ## Error policy
//!
//! - A missing or non-executable compiler is a [`FrameworkError`], raised before
//!   any process is spawned.
//! - Everything the compiler itself does (non-zero exit, crash, timeout) is
//!   data in the returned [`RunResult`].

mod process;
mod resolve;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use serde::Serialize;

use crate::error::{FrameworkError, Result};
use crate::plan::CompilePlan;
use crate::platform::PlatformInfo;

pub use process::TIMEOUT_EXIT_CODE;
pub use resolve::resolve_executable;

/// Default per-invocation timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
/// Default flag that designates the output path.
pub const DEFAULT_OUTPUT_FLAG: &str = "-o";
/// Exit code recorded for a case whose compiler process could not be started.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = -2;

/// Runner configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Compiler executable (path or bare program name)
    pub executable: PathBuf,
    /// Timeout applied when a plan does not set its own
    pub timeout: Duration,
    /// Environment overrides layered over the inherited environment
    pub env: BTreeMap<String, String>,
    /// Flag preceding the output path, e.g. `-o`
    pub output_flag: String,
    /// Base directory for relative sources (defaults to the case workspace)
    pub source_root: Option<PathBuf>,
}

impl RunnerConfig {
    /// Create a config for `executable` with default settings
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: DEFAULT_TIMEOUT,
            env: BTreeMap::new(),
            output_flag: DEFAULT_OUTPUT_FLAG.to_string(),
            source_root: None,
        }
    }

    /// Set the default timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add an environment override
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the output designation flag
    pub fn with_output_flag(mut self, flag: impl Into<String>) -> Self {
        self.output_flag = flag.into();
        self
    }

    /// Resolve relative sources against `root` instead of the workspace
    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = Some(root.into());
        self
    }
}

/// Captured outcome of one compiler process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    /// Full command line, executable first
    pub argv: Vec<String>,
    /// Working directory of the process
    pub cwd: PathBuf,
    /// Exit code; `128 + n` for signal `n`, [`TIMEOUT_EXIT_CODE`] on timeout,
    /// [`SPAWN_FAILURE_EXIT_CODE`] when the process never started
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
    pub timed_out: bool,
}

impl RunResult {
    /// True when the process finished in time with exit code 0.
    pub fn ok(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }
}

/// A run plus the context assertions check against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileResult {
    pub run: RunResult,
    /// Resolved output path of the plan
    pub output_path: PathBuf,
    pub platform: PlatformInfo,
}

/// Executes compile plans against one compiler.
#[derive(Debug, Clone)]
pub struct CompilerRunner {
    config: RunnerConfig,
}

impl CompilerRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Check that the configured executable exists and is runnable.
    ///
    /// ## Errors
    ///
    /// [`FrameworkError::ExecutableNotFound`] or [`FrameworkError::NotExecutable`].
    pub fn verify(&self) -> Result<PathBuf> {
        resolve_executable(&self.config.executable)
    }

    /// Run `plan` with `workspace` as working directory.
    ///
    /// ## Errors
    ///
    /// Only setup failures: the executable cannot be resolved, the workspace
    /// path cannot be made absolute, or the OS refuses to spawn the process.
    /// Compiler failures and timeouts are reported in the result.
    #[tracing::instrument(skip_all, fields(plan = plan.name()))]
    pub fn run(&self, plan: &CompilePlan, workspace: &Path) -> Result<CompileResult> {
        let program = self.verify()?;

        // The child runs inside the workspace, so every path it sees must be absolute.
        let workspace = std::path::absolute(workspace)?;
        let workspace = workspace.as_path();
        let source_root = self.config.source_root.as_deref().map(std::path::absolute).transpose()?;

        let args = plan.argv(workspace, source_root.as_deref(), &self.config.output_flag);
        let output_path = plan.resolve_output(workspace);
        let timeout = plan.timeout().unwrap_or(self.config.timeout);

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(program.to_string_lossy().into_owned());
        argv.extend(args.iter().cloned());
        tracing::debug!(?argv, cwd = %workspace.display(), ?timeout, "spawning compiler");

        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .current_dir(workspace)
            .envs(&self.config.env)
            .envs(plan.env());

        let output = process::run_with_timeout(&mut cmd, timeout).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FrameworkError::ExecutableNotFound { path: program.clone() }
            } else {
                FrameworkError::Spawn {
                    program: program.clone(),
                    source,
                }
            }
        })?;

        if output.timed_out {
            tracing::warn!(elapsed = ?output.elapsed, "compiler timed out and was killed");
        } else {
            tracing::debug!(exit_code = output.exit_code, elapsed = ?output.elapsed, "compiler finished");
        }

        Ok(CompileResult {
            run: RunResult {
                argv,
                cwd: workspace.to_path_buf(),
                exit_code: output.exit_code,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                elapsed: output.elapsed,
                timed_out: output.timed_out,
            },
            output_path,
            platform: PlatformInfo::detect(),
        })
    }

    /// Result for a run whose process never started; `message` lands in stderr.
    pub(crate) fn unstarted(&self, plan: &CompilePlan, workspace: &Path, message: String) -> CompileResult {
        let mut argv = vec![self.config.executable.to_string_lossy().into_owned()];
        argv.extend(plan.argv(workspace, self.config.source_root.as_deref(), &self.config.output_flag));
        CompileResult {
            run: RunResult {
                argv,
                cwd: workspace.to_path_buf(),
                exit_code: SPAWN_FAILURE_EXIT_CODE,
                stdout: String::new(),
                stderr: message,
                elapsed: Duration::ZERO,
                timed_out: false,
            },
            output_path: plan.resolve_output(workspace),
            platform: PlatformInfo::detect(),
        }
    }
}

//! JSON suite manifests
//!
//! A manifest describes a suite declaratively so the CLI can run it:
//!
//! ```json
//! {
//!   "name": "smoke",
//!   "compiler": "cc",
//!   "source_root": "fixtures",
//!   "cases": [
//!     {
//!       "name": "hello",
//!       "sources": ["hello.c"],
//!       "output": "hello",
//!       "args": ["-O2"],
//!       "expect": [{"exit_code": 0}, "output_exists", "native_binary"]
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::assertions::{self, Assertion};
use crate::error::{FrameworkError, Result};
use crate::framework::{TestCase, TestSuite};
use crate::inspect::ArtifactKind;
use crate::plan::CompilePlan;
use crate::runner::RunnerConfig;

/// Top-level manifest document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteManifest {
    pub name: String,
    pub compiler: PathBuf,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub output_flag: Option<String>,
    #[serde(default)]
    pub source_root: Option<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub cleanup: bool,
    #[serde(default)]
    pub cases: Vec<CaseManifest>,
}

/// One case entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseManifest {
    pub name: String,
    pub sources: Vec<PathBuf>,
    pub output: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub expect: Vec<Expectation>,
}

/// Declarative form of the built-in assertions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    ExitCode(i32),
    OutputExists,
    OutputNonempty,
    OutputName(String),
    OutputKind(ArtifactKind),
    NativeBinary,
    NativeBinaryForHost,
    StdoutContains(String),
    StderrContains(String),
    StdoutMatches(String),
    StderrMatches(String),
    ArgvContains(Vec<String>),
    ExistsAt(PathBuf),
    NonemptyAt(PathBuf),
    KindAt { path: PathBuf, kind: ArtifactKind },
}

impl Expectation {
    /// Build the corresponding assertion.
    ///
    /// ## Errors
    ///
    /// [`FrameworkError::InvalidPattern`] for a malformed `*_matches` regex.
    pub fn into_assertion(self) -> Result<Assertion> {
        Ok(match self {
            Expectation::ExitCode(code) => assertions::assert_exit_code(code),
            Expectation::OutputExists => assertions::assert_output_exists(),
            Expectation::OutputNonempty => assertions::assert_output_nonempty(),
            Expectation::OutputName(name) => assertions::assert_output_name(name),
            Expectation::OutputKind(kind) => assertions::assert_output_kind(kind),
            Expectation::NativeBinary => assertions::assert_native_binary_kind(),
            Expectation::NativeBinaryForHost => assertions::assert_native_binary_kind_for_host(),
            Expectation::StdoutContains(text) => assertions::assert_stdout_contains(text),
            Expectation::StderrContains(text) => assertions::assert_stderr_contains(text),
            Expectation::StdoutMatches(pattern) => assertions::assert_stdout_matches(&pattern)?,
            Expectation::StderrMatches(pattern) => assertions::assert_stderr_matches(&pattern)?,
            Expectation::ArgvContains(args) => assertions::assert_argv_contains(args),
            Expectation::ExistsAt(path) => assertions::assert_output_exists_at(path),
            Expectation::NonemptyAt(path) => assertions::assert_output_nonempty_at(path),
            Expectation::KindAt { path, kind } => assertions::assert_output_kind_at(path, kind),
        })
    }
}

/// A manifest turned into runnable pieces.
#[derive(Debug)]
pub struct LoadedSuite {
    pub suite: TestSuite,
    pub runner_config: RunnerConfig,
}

impl SuiteManifest {
    /// Read and parse a manifest file.
    ///
    /// ## Errors
    ///
    /// [`FrameworkError::Manifest`] when the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| FrameworkError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&text, path)
    }

    /// Parse manifest text; `origin` is only used in error messages.
    ///
    /// ## Errors
    ///
    /// [`FrameworkError::Manifest`] on JSON or schema errors.
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| FrameworkError::Manifest {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Build the suite and runner config.
    ///
    /// Relative `source_root`, and a relative `compiler` containing a path
    /// separator, are resolved against `base_dir` (the manifest's directory).
    /// A bare compiler name is left for `PATH` lookup.
    ///
    /// ## Errors
    ///
    /// - [`FrameworkError::EmptySources`] for a case without sources
    /// - [`FrameworkError::InvalidPattern`] for a malformed regex expectation
    pub fn into_suite(self, base_dir: &Path) -> Result<LoadedSuite> {
        let compiler = if self.compiler.components().count() > 1 {
            resolve_against(base_dir, &self.compiler)
        } else {
            self.compiler.clone()
        };

        let mut runner_config = RunnerConfig::new(compiler);
        if let Some(secs) = self.timeout_secs {
            runner_config = runner_config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(flag) = self.output_flag {
            runner_config = runner_config.with_output_flag(flag);
        }
        if let Some(root) = &self.source_root {
            runner_config = runner_config.with_source_root(resolve_against(base_dir, root));
        }
        runner_config.env = self.env;

        let mut suite = TestSuite::new(self.name).with_cleanup(self.cleanup);
        for case in self.cases {
            suite.add_case(case.into_case()?);
        }

        Ok(LoadedSuite { suite, runner_config })
    }
}

impl CaseManifest {
    fn into_case(self) -> Result<TestCase> {
        let mut plan = CompilePlan::new(self.name.clone(), self.sources, self.output)?.with_args(self.args);
        for (key, value) in self.env {
            plan = plan.with_env(key, value);
        }
        if let Some(secs) = self.timeout_secs {
            plan = plan.with_timeout(Duration::from_secs(secs));
        }

        let assertions = self
            .expect
            .into_iter()
            .map(Expectation::into_assertion)
            .collect::<Result<Vec<_>>>()?;

        Ok(TestCase::new(self.name, plan).with_assertions(assertions))
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() { path.to_path_buf() } else { base.join(path) }
}

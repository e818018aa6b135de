//! Compile plans
//!
//! A [`CompilePlan`] is the declarative half of a test case: which sources go
//! into the compiler under test, where the artifact should land, and which
//! extra flags to pass. It knows nothing about processes; the runner turns it
//! into an argument vector.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{FrameworkError, Result};

/// Description of one compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilePlan {
    name: String,
    sources: Vec<PathBuf>,
    output: PathBuf,
    extra_args: Vec<String>,
    env: BTreeMap<String, String>,
    timeout: Option<Duration>,
}

impl CompilePlan {
    /// Create a plan.
    ///
    /// ## Errors
    ///
    /// Returns [`FrameworkError::EmptySources`] when `sources` is empty.
    pub fn new<I, P>(name: impl Into<String>, sources: I, output: impl Into<PathBuf>) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let name = name.into();
        let sources: Vec<PathBuf> = sources.into_iter().map(Into::into).collect();
        if sources.is_empty() {
            return Err(FrameworkError::EmptySources { plan: name });
        }
        Ok(Self {
            name,
            sources,
            output: output.into(),
            extra_args: Vec::new(),
            env: BTreeMap::new(),
            timeout: None,
        })
    }

    /// Append extra command-line arguments (placed before the sources).
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an environment override for this plan only.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Override the runner's default timeout for this plan.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Output path resolved against the workspace when relative.
    pub fn resolve_output(&self, workspace: &Path) -> PathBuf {
        resolve_against(workspace, &self.output)
    }

    /// Source paths resolved against `source_root` (or the workspace when unset).
    pub fn resolve_sources(&self, workspace: &Path, source_root: Option<&Path>) -> Vec<PathBuf> {
        let base = source_root.unwrap_or(workspace);
        self.sources.iter().map(|s| resolve_against(base, s)).collect()
    }

    /// Argument vector (without the executable).
    ///
    /// Order: extra args, resolved sources, `output_flag`, resolved output path.
    pub fn argv(&self, workspace: &Path, source_root: Option<&Path>, output_flag: &str) -> Vec<String> {
        let mut args = self.extra_args.clone();
        args.extend(
            self.resolve_sources(workspace, source_root)
                .iter()
                .map(|p| p.to_string_lossy().into_owned()),
        );
        args.push(output_flag.to_string());
        args.push(self.resolve_output(workspace).to_string_lossy().into_owned());
        args
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() { path.to_path_buf() } else { base.join(path) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sources_rejected() {
        let err = CompilePlan::new("empty", Vec::<PathBuf>::new(), "out").unwrap_err();
        assert!(matches!(err, FrameworkError::EmptySources { ref plan } if plan == "empty"));
    }

    #[test]
    fn test_argv_order() {
        let plan = CompilePlan::new("hello", ["hello.c"], "hello").unwrap().with_args(["-O2"]);
        let ws = Path::new("/tmp/ws");
        let argv = plan.argv(ws, None, "-o");
        assert_eq!(argv, vec!["-O2", "/tmp/ws/hello.c", "-o", "/tmp/ws/hello"]);
    }

    #[test]
    fn test_source_root_used_for_relative_sources() {
        let plan = CompilePlan::new("multi", ["a.c", "/abs/b.c"], "/out/bin").unwrap();
        let argv = plan.argv(Path::new("/ws"), Some(Path::new("/fixtures")), "--output");
        assert_eq!(argv, vec!["/fixtures/a.c", "/abs/b.c", "--output", "/out/bin"]);
    }

    #[test]
    fn test_builders() {
        let plan = CompilePlan::new("p", ["x.c"], "x")
            .unwrap()
            .with_args(["-c"])
            .with_args(vec!["-g".to_string()])
            .with_env("LANG", "C")
            .with_timeout(Duration::from_secs(3));
        assert_eq!(plan.extra_args(), ["-c", "-g"]);
        assert_eq!(plan.env().get("LANG").map(String::as_str), Some("C"));
        assert_eq!(plan.timeout(), Some(Duration::from_secs(3)));
        assert_eq!(plan.name(), "p");
        assert_eq!(plan.sources(), [PathBuf::from("x.c")]);
    }
}

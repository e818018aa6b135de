//! Test cases
//!
//! A [`TestCase`] binds one [`CompilePlan`] to an ordered list of assertions.
//! All assertions run, even after a failure, so a report shows every problem
//! of a run at once.

use std::path::Path;

use crate::assertions::{Assertion, Verdict};
use crate::error::{FrameworkError, Result};
use crate::plan::CompilePlan;
use crate::runner::CompilerRunner;

use super::report::TestCaseReport;

/// One compile-and-check unit.
#[derive(Debug)]
pub struct TestCase {
    name: String,
    plan: CompilePlan,
    assertions: Vec<Assertion>,
}

impl TestCase {
    pub fn new(name: impl Into<String>, plan: CompilePlan) -> Self {
        Self {
            name: name.into(),
            plan,
            assertions: Vec::new(),
        }
    }

    /// Append an assertion.
    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    /// Append several assertions, keeping their order.
    pub fn with_assertions(mut self, assertions: impl IntoIterator<Item = Assertion>) -> Self {
        self.assertions.extend(assertions);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plan(&self) -> &CompilePlan {
        &self.plan
    }

    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    /// Run the plan once in `workspace`, then evaluate every assertion.
    ///
    /// ## Errors
    ///
    /// Only runner setup failures (see [`CompilerRunner::run`]); assertion
    /// failures end up in the report. A process the OS refuses to start (for
    /// example an argument list that is too long) fails this case only.
    #[tracing::instrument(skip_all, fields(case = %self.name))]
    pub fn run(&self, runner: &CompilerRunner, workspace: &Path) -> Result<TestCaseReport> {
        let result = match runner.run(&self.plan, workspace) {
            Ok(result) => result,
            Err(FrameworkError::Spawn { program, source }) => {
                let message = format!("failed to spawn {}: {source}", program.display());
                tracing::warn!(%message, "compiler could not be started");
                return Ok(TestCaseReport {
                    name: self.name.clone(),
                    ok: false,
                    errors: vec![format!("[spawn] {message}")],
                    workspace: workspace.to_path_buf(),
                    result: runner.unstarted(&self.plan, workspace, message),
                });
            }
            Err(err) => return Err(err),
        };

        let errors: Vec<String> = self
            .assertions
            .iter()
            .filter_map(|assertion| match assertion.check(&result) {
                Verdict::Pass => None,
                Verdict::Fail(msg) => Some(format!("[{}] {}", assertion.name(), msg)),
            })
            .collect();

        Ok(TestCaseReport {
            name: self.name.clone(),
            ok: errors.is_empty(),
            errors,
            workspace: workspace.to_path_buf(),
            result,
        })
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::assertions::{assert_exit_code, assert_output_exists};
    use crate::runner::RunnerConfig;

    #[test]
    fn test_one_pass_one_fail_collects_single_error() {
        let ws = tempfile::tempdir().unwrap();
        let runner = CompilerRunner::new(RunnerConfig::new("/bin/sh"));
        let plan = CompilePlan::new("noop", ["in.c"], "out").unwrap().with_args(["-c", "exit 0"]);
        let case = TestCase::new("noop", plan).with_assertions([assert_exit_code(0), assert_output_exists()]);

        let report = case.run(&runner, ws.path()).unwrap();
        assert!(!report.ok);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("[output_exists] output does not exist"));
    }

    #[test]
    fn test_all_failures_collected_in_order() {
        let ws = tempfile::tempdir().unwrap();
        let runner = CompilerRunner::new(RunnerConfig::new("/bin/sh"));
        let plan = CompilePlan::new("fails", ["in.c"], "out").unwrap().with_args(["-c", "exit 2"]);
        let case = TestCase::new("fails", plan).with_assertions([
            assert_output_exists(),
            assert_exit_code(0),
            Assertion::custom("always", |_| Verdict::Fail("nope".into())),
        ]);

        let report = case.run(&runner, ws.path()).unwrap();
        assert_eq!(report.errors.len(), 3);
        assert!(report.errors[0].starts_with("[output_exists]"));
        assert!(report.errors[1].starts_with("[exit_code_is_0]"));
        assert_eq!(report.errors[2], "[always] nope");
    }

    #[test]
    fn test_unstartable_compiler_fails_only_the_case() {
        use std::os::unix::fs::PermissionsExt;

        let ws = tempfile::tempdir().unwrap();
        // Executable bit set, but not a format the kernel can exec
        let cc = ws.path().join("garbage-cc");
        std::fs::write(&cc, [0u8, 1, 2, 3, 4, 5, 6, 7]).unwrap();
        std::fs::set_permissions(&cc, std::fs::Permissions::from_mode(0o755)).unwrap();

        let runner = CompilerRunner::new(RunnerConfig::new(&cc));
        let plan = CompilePlan::new("p", ["in.c"], "out").unwrap();
        let report = TestCase::new("p", plan)
            .with_assertion(assert_exit_code(0))
            .run(&runner, ws.path())
            .unwrap();

        assert!(!report.ok);
        assert!(report.errors[0].starts_with("[spawn] failed to spawn"));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.result.run.exit_code, crate::runner::SPAWN_FAILURE_EXIT_CODE);
        assert!(report.result.run.stderr.contains("garbage-cc"));
    }

    #[test]
    fn test_no_assertions_is_ok() {
        let ws = tempfile::tempdir().unwrap();
        let runner = CompilerRunner::new(RunnerConfig::new("/bin/sh"));
        let plan = CompilePlan::new("bare", ["in.c"], "out").unwrap().with_args(["-c", "exit 9"]);
        let report = TestCase::new("bare", plan).run(&runner, ws.path()).unwrap();
        assert!(report.ok);
        assert_eq!(report.result.run.exit_code, 9);
    }
}

//! Test suites
//!
//! Cases run strictly one after another in declaration order. A failing or
//! timed-out case never stops the suite; only setup errors (bad compiler,
//! unusable workspace root) do.

use std::path::Path;
use std::time::Instant;

use crate::error::Result;
use crate::reporter::{NullReporter, TestReporter};
use crate::runner::CompilerRunner;

use super::case::TestCase;
use super::report::SuiteReport;
use super::workspace::Workspace;

/// Ordered collection of test cases.
#[derive(Debug)]
pub struct TestSuite {
    name: String,
    cases: Vec<TestCase>,
    cleanup: bool,
}

impl TestSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
            cleanup: false,
        }
    }

    pub fn with_case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    pub fn add_case(&mut self, case: TestCase) {
        self.cases.push(case);
    }

    /// Delete each case workspace once its report is recorded.
    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Run every case under `root_workspace`.
    ///
    /// ## Errors
    ///
    /// Setup failures only: the compiler cannot be resolved or a workspace
    /// directory cannot be created.
    pub fn run(&self, runner: &CompilerRunner, root_workspace: &Path) -> Result<SuiteReport> {
        self.run_with_reporter(runner, root_workspace, &mut NullReporter)
    }

    /// Like [`TestSuite::run`], streaming progress to `reporter`.
    ///
    /// ## Errors
    ///
    /// See [`TestSuite::run`].
    #[tracing::instrument(skip_all, fields(suite = %self.name, cases = self.cases.len()))]
    pub fn run_with_reporter(
        &self,
        runner: &CompilerRunner,
        root_workspace: &Path,
        reporter: &mut dyn TestReporter,
    ) -> Result<SuiteReport> {
        let start = Instant::now();
        runner.verify()?;
        let mut workspace = Workspace::create(root_workspace, self.cleanup)?;

        reporter.on_suite_start(&self.name, self.cases.len());

        let mut reports = Vec::with_capacity(self.cases.len());
        for case in &self.cases {
            let dir = workspace.case_dir(case.name())?;
            reporter.on_case_start(case.name());

            let report = case.run(runner, &dir)?;
            tracing::info!(
                case = %report.name,
                ok = report.ok,
                exit_code = report.result.run.exit_code,
                timed_out = report.timed_out(),
                "case finished"
            );
            reporter.on_case_complete(&report);

            workspace.release(&dir);
            reports.push(report);
        }

        let suite = SuiteReport {
            name: self.name.clone(),
            reports,
            duration: start.elapsed(),
        };
        reporter.on_suite_complete(&suite);
        Ok(suite)
    }
}

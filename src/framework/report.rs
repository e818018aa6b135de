//! Case and suite reports
//!
//! Plain data: reporters format these, nothing here prints.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::runner::CompileResult;

/// Outcome of one test case.
#[derive(Debug, Clone, Serialize)]
pub struct TestCaseReport {
    pub name: String,
    /// True iff every assertion passed
    pub ok: bool,
    /// One `[assertion] message` entry per failed assertion, in declaration order
    pub errors: Vec<String>,
    /// Directory the case ran in
    pub workspace: PathBuf,
    pub result: CompileResult,
}

impl TestCaseReport {
    pub fn timed_out(&self) -> bool {
        self.result.run.timed_out
    }

    pub fn elapsed(&self) -> Duration {
        self.result.run.elapsed
    }
}

/// Outcome of a whole suite run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub name: String,
    pub reports: Vec<TestCaseReport>,
    pub duration: Duration,
}

impl SuiteReport {
    /// True iff every case passed (vacuously true for an empty suite).
    pub fn ok(&self) -> bool {
        self.reports.iter().all(|r| r.ok)
    }

    pub fn reports(&self) -> &[TestCaseReport] {
        &self.reports
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|r| r.ok).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Look up a case report by name (first match).
    pub fn case(&self, name: &str) -> Option<&TestCaseReport> {
        self.reports.iter().find(|r| r.name == name)
    }
}

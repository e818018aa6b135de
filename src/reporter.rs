//! Suite reporters
//!
//! ## TestReporter Trait
//!
//! Suites stream progress through the `TestReporter` trait so output format is
//! decoupled from execution. Two implementations ship with the crate:
//!
//! - `ConsoleReporter`: human-readable PASS/FAIL listing
//! - `JsonReporter`: the serialized `SuiteReport`, written once at the end
//!
//! Both write to any `io::Write`, which keeps them testable.

use std::io::{self, Write};

use serde::Serialize;

use crate::framework::{SuiteReport, TestCaseReport};
use crate::version::CTESTFW_VERSION;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Trait for reporting suite execution progress.
///
/// Implement this trait to customize output (JSON, TAP, CI annotations, ...).
pub trait TestReporter {
    /// Called once before the first case runs
    fn on_suite_start(&mut self, _name: &str, _case_count: usize) {}

    /// Called before a case's compiler invocation
    fn on_case_start(&mut self, _name: &str) {}

    /// Called after a case's assertions were evaluated
    fn on_case_complete(&mut self, report: &TestCaseReport);

    /// Called once after the last case
    fn on_suite_complete(&mut self, report: &SuiteReport);
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl TestReporter for NullReporter {
    fn on_case_complete(&mut self, _report: &TestCaseReport) {}

    fn on_suite_complete(&mut self, _report: &SuiteReport) {}
}

/// Console reporter
///
/// ```text
/// == Suite: smoke ==
/// - PASS hello
/// - FAIL broken
///     [exit_code_is_0] exit_code expected 0, got 1
/// == Result: 1/2 passed ==
/// ```
pub struct ConsoleReporter<W: Write> {
    out: W,
    pub verbose: bool,
    pub color: bool,
}

impl ConsoleReporter<io::Stdout> {
    /// Reporter writing to stdout.
    pub fn stdout(verbose: bool, color: bool) -> Self {
        Self::new(io::stdout(), verbose, color)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, verbose: bool, color: bool) -> Self {
        Self { out, verbose, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color { format!("{color}{text}{RESET}") } else { text.to_string() }
    }

    // Reporting must never fail a suite, so write errors are dropped here.
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
    }
}

impl<W: Write> TestReporter for ConsoleReporter<W> {
    fn on_suite_start(&mut self, name: &str, case_count: usize) {
        let header = self.paint(BOLD, &format!("== Suite: {name} =="));
        self.line(&header);
        if self.verbose {
            self.line(&format!("collected {case_count} case(s)"));
        }
    }

    fn on_case_complete(&mut self, report: &TestCaseReport) {
        let status = if report.ok { self.paint(GREEN, "PASS") } else { self.paint(RED, "FAIL") };
        let mut line = format!("- {status} {}", report.name);
        if self.verbose {
            line.push_str(&format!(" ({}ms)", report.elapsed().as_millis()));
            if report.timed_out() {
                line.push(' ');
                line.push_str(&self.paint(YELLOW, "[timed out]"));
            }
        }
        self.line(&line);

        for error in &report.errors {
            for (i, error_line) in error.lines().enumerate() {
                let indent = if i == 0 { "    " } else { "      " };
                self.line(&format!("{indent}{error_line}"));
            }
        }
    }

    fn on_suite_complete(&mut self, report: &SuiteReport) {
        let color = if report.ok() { GREEN } else { RED };
        let mut summary = format!("== Result: {}/{} passed", report.passed(), report.total());
        if self.verbose {
            summary.push_str(&format!(" in {:.2}s", report.duration.as_secs_f64()));
        }
        summary.push_str(" ==");
        let summary = self.paint(color, &summary);
        self.line(&summary);
        let _ = self.out.flush();
    }
}

/// JSON reporter
///
/// Emits a single document when the suite completes.
pub struct JsonReporter<W: Write> {
    out: W,
    pretty: bool,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    ctestfw_version: &'a str,
    ok: bool,
    passed: usize,
    failed: usize,
    #[serde(flatten)]
    suite: &'a SuiteReport,
}

impl JsonReporter<io::Stdout> {
    pub fn stdout(pretty: bool) -> Self {
        Self::new(io::stdout(), pretty)
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W, pretty: bool) -> Self {
        Self { out, pretty }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TestReporter for JsonReporter<W> {
    fn on_case_complete(&mut self, _report: &TestCaseReport) {}

    fn on_suite_complete(&mut self, report: &SuiteReport) {
        let doc = JsonDocument {
            ctestfw_version: CTESTFW_VERSION,
            ok: report.ok(),
            passed: report.passed(),
            failed: report.failed(),
            suite: report,
        };
        let written = if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, &doc)
        } else {
            serde_json::to_writer(&mut self.out, &doc)
        };
        if let Err(e) = written {
            tracing::error!(error = %e, "failed to write JSON report");
            return;
        }
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}

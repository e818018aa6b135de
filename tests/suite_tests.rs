//! End-to-end suite runs against a shell script standing in for a compiler
//!
//! `/bin/sh -c <script> fake-cc` receives the plan's sources, the output
//! flag, and the output path as positional parameters, so each script can act
//! like a tiny compiler.

#![cfg(unix)]

use std::fs;
use std::time::Duration;

use ctestfw::assertions::{
    assert_argv_contains, assert_exit_code, assert_native_binary_kind, assert_output_exists, assert_output_kind,
    assert_stderr_contains, assert_stdout_contains,
};
use ctestfw::{ArtifactKind, CompilePlan, CompilerRunner, FrameworkError, RunnerConfig, TIMEOUT_EXIT_CODE, TestCase, TestSuite};

/// Writes an ELF magic header to the last argument.
const EMIT_ELF: &str = r#"for a; do out="$a"; done; printf '\177ELF\002\001\001' > "$out""#;

fn shell_case(name: &str, script: &str) -> CompilePlan {
    CompilePlan::new(name, ["main.c"], "a.out")
        .unwrap()
        .with_args(["-c", script, "fake-cc"])
}

fn sh_runner() -> CompilerRunner {
    CompilerRunner::new(RunnerConfig::new("/bin/sh").with_timeout(Duration::from_secs(10)))
}

#[test]
fn test_timeout_in_middle_case_does_not_stop_suite() {
    let root = tempfile::tempdir().unwrap();

    let suite = TestSuite::new("mixed")
        .with_case(
            TestCase::new("emits_elf", shell_case("emits_elf", EMIT_ELF))
                .with_assertion(assert_exit_code(0))
                .with_assertion(assert_output_exists())
                .with_assertion(assert_output_kind(ArtifactKind::Elf)),
        )
        .with_case(
            TestCase::new(
                "hangs",
                shell_case("hangs", "exec sleep 5").with_timeout(Duration::from_millis(300)),
            )
            .with_assertion(assert_exit_code(0)),
        )
        .with_case(
            TestCase::new("diagnoses", shell_case("diagnoses", "echo 'error: nope' >&2; exit 1"))
                .with_assertion(assert_exit_code(1))
                .with_assertion(assert_stderr_contains("error: nope")),
        );

    let report = suite.run(&sh_runner(), root.path()).unwrap();

    assert!(!report.ok());
    assert_eq!(report.total(), 3);
    assert_eq!(report.passed(), 2);
    assert_eq!(report.failed(), 1);

    let hangs = report.case("hangs").unwrap();
    assert!(!hangs.ok);
    assert!(hangs.timed_out());
    assert_eq!(hangs.result.run.exit_code, TIMEOUT_EXIT_CODE);
    assert!(hangs.errors[0].starts_with("[exit_code_is_0]"));
    assert!(hangs.errors[0].contains("(timed out)"));

    let last = report.case("diagnoses").unwrap();
    assert!(last.ok, "errors: {:?}", last.errors);
}

#[test]
fn test_every_failed_assertion_is_reported_in_order() {
    let root = tempfile::tempdir().unwrap();
    let suite = TestSuite::new("failing").with_case(
        TestCase::new("silent", shell_case("silent", "exit 3")).with_assertions([
            assert_exit_code(0),
            assert_output_exists(),
            assert_native_binary_kind(),
        ]),
    );

    let report = suite.run(&sh_runner(), root.path()).unwrap();
    let case = &report.reports()[0];

    assert_eq!(case.errors.len(), 3);
    assert!(case.errors[0].starts_with("[exit_code_is_0] exit_code expected 0, got 3"));
    assert!(case.errors[1].starts_with("[output_exists] output does not exist"));
    assert!(case.errors[2].starts_with("[native_binary_kind]"));
}

#[test]
fn test_argv_and_workspace_layout() {
    let root = tempfile::tempdir().unwrap();
    let suite = TestSuite::new("layout")
        .with_case(
            TestCase::new("same name", shell_case("same name", EMIT_ELF))
                .with_assertion(assert_argv_contains(["-o"])),
        )
        .with_case(TestCase::new("same name", shell_case("same name", EMIT_ELF)));

    let report = suite.run(&sh_runner(), root.path()).unwrap();
    assert!(report.ok());

    let first = &report.reports()[0];
    let second = &report.reports()[1];
    assert_eq!(first.workspace, root.path().join("same_name"));
    assert_eq!(second.workspace, root.path().join("same_name-2"));

    let argv = &first.result.run.argv;
    assert_eq!(argv[0], "/bin/sh");
    assert_eq!(argv[argv.len() - 2], "-o");
    assert_eq!(first.result.output_path, first.workspace.join("a.out"));
    assert!(first.result.output_path.is_file());
}

#[test]
fn test_cleanup_removes_case_workspaces() {
    let root = tempfile::tempdir().unwrap();
    let suite = TestSuite::new("tidy")
        .with_cleanup(true)
        .with_case(TestCase::new("one", shell_case("one", EMIT_ELF)).with_assertion(assert_output_exists()));

    let report = suite.run(&sh_runner(), root.path()).unwrap();
    assert!(report.ok());
    assert!(!report.reports()[0].workspace.exists());
}

#[test]
fn test_stale_workspace_content_is_removed() {
    let root = tempfile::tempdir().unwrap();
    let stale = root.path().join("fresh");
    fs::create_dir_all(&stale).unwrap();
    fs::write(stale.join("a.out"), b"left over").unwrap();

    let suite = TestSuite::new("rerun")
        .with_case(TestCase::new("fresh", shell_case("fresh", "exit 0")).with_assertion(assert_output_exists()));

    let report = suite.run(&sh_runner(), root.path()).unwrap();
    assert!(!report.ok(), "a previous run's artifact must not satisfy the assertion");
}

#[test]
fn test_missing_compiler_aborts_suite() {
    let root = tempfile::tempdir().unwrap();
    let runner = CompilerRunner::new(RunnerConfig::new(root.path().join("no-such-cc")));
    let suite = TestSuite::new("broken").with_case(TestCase::new("a", shell_case("a", "exit 0")));

    let err = suite.run(&runner, root.path()).unwrap_err();
    assert!(matches!(err, FrameworkError::ExecutableNotFound { .. }));
}

#[test]
fn test_empty_suite_passes() {
    let root = tempfile::tempdir().unwrap();
    let report = TestSuite::new("empty").run(&sh_runner(), root.path()).unwrap();
    assert!(report.ok());
    assert_eq!(report.total(), 0);
}

#[test]
fn test_relative_root_and_source_root() {
    let scratch = tempfile::tempdir_in(".").unwrap();
    let sources = scratch.path().join("src");
    fs::create_dir_all(&sources).unwrap();
    fs::write(sources.join("main.c"), "int main;\n").unwrap();
    let root = scratch.path().join("ws");
    assert!(root.is_relative());

    let runner = CompilerRunner::new(RunnerConfig::new("/bin/sh").with_source_root(&sources));
    let copy_source = r#"for a; do out="$a"; done; cat "$1" > "$out""#;
    let suite = TestSuite::new("relative")
        .with_case(TestCase::new("copy", shell_case("copy", copy_source)).with_assertions([
            assert_exit_code(0),
            assert_output_exists(),
        ]));

    let report = suite.run(&runner, &root).unwrap();
    let case = &report.reports()[0];
    assert!(report.ok(), "errors: {:?}", case.errors);
    assert!(case.workspace.is_absolute());
    assert_eq!(fs::read_to_string(&case.result.output_path).unwrap(), "int main;\n");
}

#[test]
fn test_timed_out_case_keeps_partial_output() {
    let root = tempfile::tempdir().unwrap();
    let suite = TestSuite::new("partial").with_case(
        TestCase::new(
            "stalls",
            shell_case("stalls", "echo compiling-unit-1; echo 'warning: slow' >&2; sleep 5")
                .with_timeout(Duration::from_millis(300)),
        )
        .with_assertions([
            assert_stdout_contains("compiling-unit-1"),
            assert_stderr_contains("warning: slow"),
        ]),
    );

    let report = suite.run(&sh_runner(), root.path()).unwrap();
    let case = &report.reports()[0];
    assert!(case.timed_out());
    assert!(case.ok, "errors: {:?}", case.errors);
}

#[test]
fn test_spawn_failure_keeps_earlier_reports() {
    let root = tempfile::tempdir().unwrap();
    let huge_args = vec!["x".repeat(1 << 20); 16];
    let suite = TestSuite::new("too-long")
        .with_case(TestCase::new("first", shell_case("first", "exit 0")).with_assertion(assert_exit_code(0)))
        .with_case(TestCase::new(
            "argv_too_long",
            CompilePlan::new("argv_too_long", ["main.c"], "a.out").unwrap().with_args(huge_args),
        ))
        .with_case(TestCase::new("last", shell_case("last", "exit 0")).with_assertion(assert_exit_code(0)));

    let report = suite.run(&sh_runner(), root.path()).unwrap();
    assert_eq!(report.total(), 3);
    assert!(report.reports()[0].ok);
    let failed = &report.reports()[1];
    assert!(!failed.ok);
    assert!(failed.errors[0].starts_with("[spawn]"));
    assert_eq!(failed.result.run.exit_code, ctestfw::SPAWN_FAILURE_EXIT_CODE);
    assert!(report.reports()[2].ok);
}

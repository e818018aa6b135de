//! Manifest-driven runs through the CLI entry point

#![cfg(unix)]

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use clap::Parser;
use ctestfw::cli::{Cli, ExitCode, execute};

fn manifest(compiler: &str, script: &str, expect: &str) -> String {
    format!(
        r#"{{
            "name": "cli",
            "compiler": "{compiler}",
            "timeout_secs": 10,
            "cases": [
                {{
                    "name": "only",
                    "sources": ["main.c"],
                    "output": "a.out",
                    "args": ["-c", "{script}", "fake-cc"],
                    "expect": {expect}
                }}
            ]
        }}"#
    )
}

fn run_manifest(dir: &Path, text: &str) -> Result<ExitCode, ctestfw::cli::CliError> {
    let path = dir.join("suite.json");
    fs::write(&path, text).unwrap();
    let workspace = dir.join("ws");
    let args: Vec<OsString> = vec![
        "ctestfw".into(),
        "run".into(),
        path.into_os_string(),
        "--workspace".into(),
        workspace.into_os_string(),
        "--format".into(),
        "json".into(),
    ];
    let cli = Cli::try_parse_from(args).unwrap();
    execute(cli)
}

#[test]
fn test_passing_suite_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let text = manifest(
        "/bin/sh",
        r#"for a; do out=$a; done; printf '\\177ELF' > $out"#,
        r#"[{"exit_code": 0}, "output_nonempty", {"output_kind": "elf"}, {"argv_contains": ["-o"]}]"#,
    );
    assert_eq!(run_manifest(dir.path(), &text).unwrap(), ExitCode::SUCCESS);
    assert!(dir.path().join("ws/only/a.out").is_file());
}

#[test]
fn test_failing_case_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let text = manifest("/bin/sh", "echo oops >&2; exit 4", r#"[{"exit_code": 0}]"#);
    assert_eq!(run_manifest(dir.path(), &text).unwrap(), ExitCode::FAILURE);
}

#[test]
fn test_missing_compiler_is_setup_error() {
    let dir = tempfile::tempdir().unwrap();
    let text = manifest("./no-such-compiler", "exit 0", "[]");
    let err = run_manifest(dir.path(), &text).unwrap_err();
    assert_eq!(err.exit_code, ExitCode::SETUP_ERROR);
    assert!(!err.message.is_empty());
}

#[test]
fn test_malformed_manifest_is_setup_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_manifest(dir.path(), "{ not json").unwrap_err();
    assert_eq!(err.exit_code, ExitCode::SETUP_ERROR);
}

#[test]
fn test_relative_manifest_compiler_and_default_workspace() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir_in(".").unwrap();
    assert!(dir.path().is_relative());
    let cc = dir.path().join("fake-cc");
    fs::write(&cc, "#!/bin/sh\nfor a; do out=$a; done\ncat \"$1\" > \"$out\"\n").unwrap();
    fs::set_permissions(&cc, fs::Permissions::from_mode(0o755)).unwrap();
    fs::write(dir.path().join("main.c"), "int main;\n").unwrap();

    let suite_name = format!("cli-relative-{}", std::process::id());
    let text = format!(
        r#"{{
            "name": "{suite_name}",
            "compiler": "./fake-cc",
            "source_root": ".",
            "cleanup": true,
            "cases": [
                {{"name": "copy", "sources": ["main.c"], "output": "a.out", "expect": [{{"exit_code": 0}}, "output_nonempty"]}}
            ]
        }}"#
    );
    let manifest = dir.path().join("suite.json");
    fs::write(&manifest, text).unwrap();

    let args: Vec<OsString> = vec!["ctestfw".into(), "run".into(), manifest.into_os_string()];
    let cli = Cli::try_parse_from(args).unwrap();
    assert_eq!(execute(cli).unwrap(), ExitCode::SUCCESS);

    let _ = fs::remove_dir_all(Path::new("target/ctestfw").join(&suite_name));
}

//! Built-in assertions for compiler runs
//!
//! Path-taking variants (`*_at`) resolve relative paths against the run's
//! working directory, i.e. the case workspace.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use super::{Assertion, Verdict, truncate_for_diagnostic};
use crate::error::{FrameworkError, Result};
use crate::inspect::{ArtifactKind, detect_artifact_kind};
use crate::runner::CompileResult;

/// Exit code equals `expected`.
pub fn assert_exit_code(expected: i32) -> Assertion {
    Assertion::custom(format!("exit_code_is_{expected}"), move |res| {
        let run = &res.run;
        Verdict::require(run.exit_code == expected, || {
            let timeout_note = if run.timed_out { " (timed out)" } else { "" };
            format!(
                "exit_code expected {expected}, got {}{timeout_note}\nstderr:\n{}",
                run.exit_code,
                truncate_for_diagnostic(&run.stderr)
            )
        })
    })
}

/// The plan's output path exists.
///
/// Zero-byte files pass; combine with [`assert_output_nonempty`] to reject them.
pub fn assert_output_exists() -> Assertion {
    Assertion::custom("output_exists", |res| check_exists(&res.output_path))
}

/// The plan's output path is a regular file with non-zero size.
pub fn assert_output_nonempty() -> Assertion {
    Assertion::custom("output_nonempty", |res| check_nonempty(&res.output_path))
}

/// The plan's output file name equals `expected_name`.
pub fn assert_output_name(expected_name: impl Into<String>) -> Assertion {
    let expected_name = expected_name.into();
    Assertion::custom("output_name", move |res| {
        let actual = res
            .output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Verdict::require(actual == expected_name, || {
            format!("output name expected '{expected_name}', got '{actual}'")
        })
    })
}

/// The plan's output header classifies as `expected`.
pub fn assert_output_kind(expected: ArtifactKind) -> Assertion {
    Assertion::custom(format!("output_kind_{expected}"), move |res| {
        check_kind(&res.output_path, expected)
    })
}

/// The plan's output is a recognized native executable (ELF or Mach-O, any byte order).
pub fn assert_native_binary_kind() -> Assertion {
    Assertion::custom("native_binary_kind", |res| check_native(&res.output_path))
}

/// The plan's output is in the native format of the host (Mach-O on macOS, ELF elsewhere).
pub fn assert_native_binary_kind_for_host() -> Assertion {
    Assertion::custom("native_binary_kind_for_host", |res| {
        let os = res.platform.os;
        let Some(expected) = os.native_artifact_kind() else {
            return Verdict::Fail(format!("no recognized native binary format on {}", os.as_str()));
        };
        check_exists(&res.output_path).and_then(|| match detect_artifact_kind(&res.output_path) {
            Ok(info) => Verdict::require(info.kind == expected, || {
                format!(
                    "native output kind expected {expected} on {}, got {} ({})",
                    os.as_str(),
                    info.kind,
                    info.path.display()
                )
            }),
            Err(e) => Verdict::Fail(format!("cannot read output {}: {e}", res.output_path.display())),
        })
    })
}

/// `path` exists after the run.
pub fn assert_output_exists_at(path: impl Into<PathBuf>) -> Assertion {
    let path = path.into();
    Assertion::custom(format!("output_exists_at_{}", file_label(&path)), move |res| {
        check_exists(&resolve_in_cwd(res, &path))
    })
}

/// `path` is a regular file with non-zero size.
pub fn assert_output_nonempty_at(path: impl Into<PathBuf>) -> Assertion {
    let path = path.into();
    Assertion::custom(format!("output_nonempty_at_{}", file_label(&path)), move |res| {
        check_nonempty(&resolve_in_cwd(res, &path))
    })
}

/// The header of `path` classifies as `expected`.
pub fn assert_output_kind_at(path: impl Into<PathBuf>, expected: ArtifactKind) -> Assertion {
    let path = path.into();
    Assertion::custom(format!("output_kind_at_{expected}"), move |res| {
        check_kind(&resolve_in_cwd(res, &path), expected)
    })
}

/// Captured stdout contains `text`.
pub fn assert_stdout_contains(text: impl Into<String>) -> Assertion {
    let text = text.into();
    Assertion::custom(format!("stdout_contains_{text}"), move |res| {
        Verdict::require(res.run.stdout.contains(&text), || {
            format!(
                "stdout does not contain '{text}'\nstdout:\n{}\nstderr:\n{}",
                truncate_for_diagnostic(&res.run.stdout),
                truncate_for_diagnostic(&res.run.stderr)
            )
        })
    })
}

/// Captured stderr contains `text`.
pub fn assert_stderr_contains(text: impl Into<String>) -> Assertion {
    let text = text.into();
    Assertion::custom(format!("stderr_contains_{text}"), move |res| {
        Verdict::require(res.run.stderr.contains(&text), || {
            format!(
                "stderr does not contain '{text}'\nstderr:\n{}",
                truncate_for_diagnostic(&res.run.stderr)
            )
        })
    })
}

/// Captured stdout matches the regular expression `pattern`.
///
/// ## Errors
///
/// [`FrameworkError::InvalidPattern`] when `pattern` does not compile.
pub fn assert_stdout_matches(pattern: &str) -> Result<Assertion> {
    let re = compile_pattern(pattern)?;
    Ok(Assertion::custom(format!("stdout_matches_{pattern}"), move |res| {
        Verdict::require(re.is_match(&res.run.stdout), || {
            format!(
                "stdout does not match /{}/\nstdout:\n{}",
                re.as_str(),
                truncate_for_diagnostic(&res.run.stdout)
            )
        })
    }))
}

/// Captured stderr matches the regular expression `pattern`.
///
/// ## Errors
///
/// [`FrameworkError::InvalidPattern`] when `pattern` does not compile.
pub fn assert_stderr_matches(pattern: &str) -> Result<Assertion> {
    let re = compile_pattern(pattern)?;
    Ok(Assertion::custom(format!("stderr_matches_{pattern}"), move |res| {
        Verdict::require(re.is_match(&res.run.stderr), || {
            format!(
                "stderr does not match /{}/\nstderr:\n{}",
                re.as_str(),
                truncate_for_diagnostic(&res.run.stderr)
            )
        })
    }))
}

/// The command line contains `subsequence` in order (not necessarily adjacent).
pub fn assert_argv_contains<I, S>(subsequence: I) -> Assertion
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let needles: Vec<String> = subsequence.into_iter().map(Into::into).collect();
    Assertion::custom("argv_contains", move |res| {
        let mut haystack = res.run.argv.iter();
        let found = needles.iter().all(|needle| haystack.any(|arg| arg == needle));
        Verdict::require(found, || {
            format!("argv does not contain subsequence {needles:?}\nargv={:?}", res.run.argv)
        })
    })
}

// ============================================================================
// Shared checks
// ============================================================================

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| FrameworkError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn resolve_in_cwd(res: &CompileResult, path: &Path) -> PathBuf {
    if path.is_absolute() { path.to_path_buf() } else { res.run.cwd.join(path) }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn check_exists(path: &Path) -> Verdict {
    Verdict::require(path.exists(), || format!("output does not exist: {}", path.display()))
}

fn check_nonempty(path: &Path) -> Verdict {
    match fs::metadata(path) {
        Ok(meta) if !meta.is_file() => Verdict::Fail(format!("output is not a regular file: {}", path.display())),
        Ok(meta) => Verdict::require(meta.len() > 0, || format!("output is empty: {}", path.display())),
        Err(_) => Verdict::Fail(format!("output does not exist: {}", path.display())),
    }
}

fn check_kind(path: &Path, expected: ArtifactKind) -> Verdict {
    check_exists(path).and_then(|| match detect_artifact_kind(path) {
        Ok(info) => Verdict::require(info.kind == expected, || {
            format!(
                "output kind expected {expected}, got {} ({})",
                info.kind,
                info.path.display()
            )
        }),
        Err(e) => Verdict::Fail(format!("cannot read output {}: {e}", path.display())),
    })
}

fn check_native(path: &Path) -> Verdict {
    check_exists(path).and_then(|| match detect_artifact_kind(path) {
        Ok(info) => Verdict::require(info.kind.is_native(), || {
            format!(
                "output is not a recognized native binary: got {} ({})",
                info.kind,
                info.path.display()
            )
        }),
        // An unreadable header is simply "not a recognized binary".
        Err(e) => Verdict::Fail(format!("cannot read output {}: {e}", path.display())),
    })
}

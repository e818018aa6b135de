//! Executable lookup
//!
//! The runner refuses to spawn anything it cannot find up front, so a typo in
//! the compiler path is a setup error instead of N identical failed cases.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{FrameworkError, Result};

/// Resolve `program` to a runnable file.
///
/// A bare name (single path component) is searched on `PATH`; anything else is
/// checked as given. The returned path is absolute, so it stays valid when the
/// child runs in another working directory.
///
/// ## Errors
///
/// - [`FrameworkError::ExecutableNotFound`] when nothing matches
/// - [`FrameworkError::NotExecutable`] when an explicit path exists but cannot be run
pub fn resolve_executable(program: &Path) -> Result<PathBuf> {
    resolve_with_path(program, env::var_os("PATH"))
}

pub(crate) fn resolve_with_path(program: &Path, search_path: Option<OsString>) -> Result<PathBuf> {
    if program.as_os_str().is_empty() {
        return Err(FrameworkError::ExecutableNotFound {
            path: program.to_path_buf(),
        });
    }

    if program.components().count() > 1 || program.is_absolute() {
        return check_explicit(program);
    }

    let dirs = search_path.map(|p| env::split_paths(&p).collect::<Vec<_>>()).unwrap_or_default();
    for dir in dirs {
        for candidate in candidates(&dir.join(program)) {
            if is_runnable(&candidate) {
                return Ok(std::path::absolute(&candidate)?);
            }
        }
    }

    Err(FrameworkError::ExecutableNotFound {
        path: program.to_path_buf(),
    })
}

fn check_explicit(program: &Path) -> Result<PathBuf> {
    for candidate in candidates(program) {
        if is_runnable(&candidate) {
            return Ok(std::path::absolute(&candidate)?);
        }
    }
    if program.exists() {
        Err(FrameworkError::NotExecutable {
            path: program.to_path_buf(),
        })
    } else {
        Err(FrameworkError::ExecutableNotFound {
            path: program.to_path_buf(),
        })
    }
}

#[cfg(windows)]
fn candidates(path: &Path) -> Vec<PathBuf> {
    if path.extension().is_some() {
        vec![path.to_path_buf()]
    } else {
        vec![path.to_path_buf(), path.with_extension("exe")]
    }
}

#[cfg(not(windows))]
fn candidates(path: &Path) -> Vec<PathBuf> {
    vec![path.to_path_buf()]
}

#[cfg(unix)]
fn is_runnable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_runnable(path: &Path) -> bool {
    path.is_file()
}

//! Fatal framework errors
//!
//! Only setup problems end up here: a missing compiler, an unusable workspace,
//! a malformed manifest. Anything that goes wrong *inside* a test case (non-zero
//! exit, timeout, missing artifact) is recorded as a failed verdict in that
//! case's report instead.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that abort a suite (or a CLI command) before or outside case execution.
#[derive(Debug, Error, Diagnostic)]
pub enum FrameworkError {
    #[error("executable not found: {}", path.display())]
    #[diagnostic(
        code(ctestfw::executable_not_found),
        help("pass an absolute path, a relative path, or a program name reachable through PATH")
    )]
    ExecutableNotFound { path: PathBuf },

    #[error("not an executable file: {}", path.display())]
    #[diagnostic(code(ctestfw::not_executable), help("check the file's permission bits"))]
    NotExecutable { path: PathBuf },

    #[error("compile plan '{plan}' has no source files")]
    #[diagnostic(code(ctestfw::empty_sources))]
    EmptySources { plan: String },

    #[error("cannot prepare workspace {}", path.display())]
    #[diagnostic(code(ctestfw::workspace))]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn {}", program.display())]
    #[diagnostic(code(ctestfw::spawn))]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid output pattern `{pattern}`")]
    #[diagnostic(code(ctestfw::invalid_pattern))]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid manifest {}: {message}", path.display())]
    #[diagnostic(code(ctestfw::manifest))]
    Manifest { path: PathBuf, message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(ctestfw::config))]
    Config(String),

    #[error("I/O error: {0}")]
    #[diagnostic(code(ctestfw::io))]
    Io(#[from] std::io::Error),
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, FrameworkError>;

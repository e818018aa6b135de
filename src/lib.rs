#![deny(unsafe_code)]
// Enforce explicit error handling - no panicking in production code
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! ctestfw: test orchestration for compiler and analyzer binaries
//!
//! ctestfw runs an external compiler against prepared sources and validates
//! what comes out: exit code, artifact presence, artifact binary format, and
//! captured output text.
//!
//! ## Pipeline
//!
//! ```text
//! TestSuite ──► TestCase ──► CompilerRunner ──► RunResult
//!     ▲             │                              │
//!     │             └──── assertions ◄─────────────┘
//!     └── SuiteReport ◄── TestCaseReport
//! ```
//!
//! ## Panic Policy
//!
//! - **Production code**: `Result` with `?`; `unwrap`/`expect` are denied outside tests.
//! - **Compiler failures are data**: non-zero exits, crashes, and timeouts land in reports,
//!   never in `Err`. Only setup problems ([`FrameworkError`]) abort a suite.
//! - **Unsafe**: denied crate-wide; the one exception is the process-group kill
//!   in `runner::process`.

pub mod assertions;
pub mod cli;
pub mod config;
pub mod error;
pub mod framework;
pub mod inspect;
pub mod manifest;
pub mod plan;
pub mod platform;
pub mod reporter;
pub mod runner;
pub mod version;

pub use assertions::{Assertion, Verdict};
pub use error::{FrameworkError, Result};
pub use framework::{SuiteReport, TestCase, TestCaseReport, TestSuite, Workspace};
pub use inspect::{ArtifactInfo, ArtifactKind, classify_header, detect_artifact_kind};
pub use plan::CompilePlan;
pub use platform::PlatformInfo;
pub use reporter::{ConsoleReporter, JsonReporter, TestReporter};
pub use runner::{
    CompileResult, CompilerRunner, RunResult, RunnerConfig, SPAWN_FAILURE_EXIT_CODE, TIMEOUT_EXIT_CODE,
};

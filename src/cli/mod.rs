//! CLI module for ctestfw
//!
//! ## Commands
//!
//! - `run <manifest>` - Run a suite described by a JSON manifest
//! - `inspect <file>...` - Classify artifacts by header bytes
//! - `platform` - Show the detected host platform
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::error::FrameworkError;
use crate::version::CTESTFW_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// At least one case failed
    pub const FAILURE: ExitCode = ExitCode(1);
    /// The suite could not be set up
    pub const SETUP_ERROR: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl From<FrameworkError> for CliError {
    /// Setup errors are rendered with their diagnostic code and help text.
    fn from(err: FrameworkError) -> Self {
        let rendered = format!("{:?}", miette::Report::new(err));
        Self::new(rendered, ExitCode::SETUP_ERROR)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Test orchestration for compiler and analyzer binaries
#[derive(Parser, Debug)]
#[command(name = "ctestfw")]
#[command(version = CTESTFW_VERSION)]
#[command(about = "Run compiler test suites and validate their artifacts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a suite described by a JSON manifest
    Run {
        /// Suite manifest
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
        /// Compiler executable (overrides manifest and CTESTFW_COMPILER)
        #[arg(long, value_name = "PATH")]
        compiler: Option<PathBuf>,
        /// Root workspace directory (default: target/ctestfw/<suite>)
        #[arg(long, value_name = "DIR")]
        workspace: Option<PathBuf>,
        /// Per-invocation timeout in seconds
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,
        /// Delete each case workspace after it ran
        #[arg(long)]
        cleanup: bool,
        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
        format: ReportFormat,
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Classify artifacts by their header bytes
    Inspect {
        /// Files to inspect
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// Show the detected host platform
    Platform,
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Run {
            manifest,
            compiler,
            workspace,
            timeout,
            cleanup,
            format,
            verbose,
        } => commands::run_suite(&commands::RunOptions {
            manifest,
            compiler,
            workspace,
            timeout,
            cleanup,
            format,
            verbose,
        }),
        Command::Inspect { files } => commands::inspect_files(&files),
        Command::Platform => commands::show_platform(),
    }
}

// ============================================================================
// Tests
// ============================================================================

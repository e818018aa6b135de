//! Environment configuration
//!
//! A handful of `CTESTFW_*` variables let CI override what a manifest says
//! without editing it. Values are parsed strictly: set-but-empty, non-UTF-8, or
//! malformed values are errors rather than silently ignored.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{FrameworkError, Result};

/// Environment keys understood by ctestfw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameworkEnv {
    /// Compiler executable override
    Compiler,
    /// Default timeout in seconds (positive integer)
    TimeoutSeconds,
    /// Root workspace directory
    Workspace,
    /// Remove case workspaces after each case (`1`/`0`/`true`/`false`)
    Cleanup,
}

impl FrameworkEnv {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compiler => "CTESTFW_COMPILER",
            Self::TimeoutSeconds => "CTESTFW_TIMEOUT_SEC",
            Self::Workspace => "CTESTFW_WORKSPACE",
            Self::Cleanup => "CTESTFW_CLEANUP",
        }
    }
}

/// Settings derived from the environment; `None` means "not overridden".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameworkSettings {
    pub compiler: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub workspace: Option<PathBuf>,
    pub cleanup: Option<bool>,
}

impl FrameworkSettings {
    /// Load settings from the process environment.
    ///
    /// ## Errors
    ///
    /// [`FrameworkError::Config`] for non-UTF-8, empty, or malformed values.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| match std::env::var_os(name) {
            None => Ok(None),
            Some(raw) => raw
                .into_string()
                .map(Some)
                .map_err(|_| FrameworkError::Config(format!("{name} must be valid UTF-8"))),
        })
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// ## Errors
    ///
    /// Same as [`FrameworkSettings::load`], plus whatever `lookup` returns.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<Option<String>>,
    {
        let read = |key: FrameworkEnv| -> Result<Option<String>> {
            let name = key.as_str();
            match lookup(name)? {
                Some(value) if value.trim().is_empty() => {
                    Err(FrameworkError::Config(format!("{name} must not be empty")))
                }
                other => Ok(other),
            }
        };

        let compiler = read(FrameworkEnv::Compiler)?.map(PathBuf::from);
        let timeout = read(FrameworkEnv::TimeoutSeconds)?
            .map(|value| parse_timeout_seconds(FrameworkEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let workspace = read(FrameworkEnv::Workspace)?.map(PathBuf::from);
        let cleanup = read(FrameworkEnv::Cleanup)?
            .map(|value| parse_bool(FrameworkEnv::Cleanup.as_str(), &value))
            .transpose()?;

        Ok(Self {
            compiler,
            timeout,
            workspace,
            cleanup,
        })
    }
}

fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| FrameworkError::Config(format!("{name} must be a positive integer number of seconds")))?;
    if secs == 0 {
        return Err(FrameworkError::Config(format!("{name} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(FrameworkError::Config(format!("{name} must be 1, 0, true, or false")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Result<FrameworkSettings> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        FrameworkSettings::from_lookup(|name| Ok(map.get(name).cloned()))
    }

    #[test]
    fn test_nothing_set() {
        assert_eq!(settings(&[]).unwrap(), FrameworkSettings::default());
    }

    #[test]
    fn test_all_set() {
        let s = settings(&[
            ("CTESTFW_COMPILER", "/usr/bin/clang"),
            ("CTESTFW_TIMEOUT_SEC", " 30 "),
            ("CTESTFW_WORKSPACE", "/tmp/ctestfw"),
            ("CTESTFW_CLEANUP", "TRUE"),
        ])
        .unwrap();
        assert_eq!(s.compiler, Some(PathBuf::from("/usr/bin/clang")));
        assert_eq!(s.timeout, Some(Duration::from_secs(30)));
        assert_eq!(s.workspace, Some(PathBuf::from("/tmp/ctestfw")));
        assert_eq!(s.cleanup, Some(true));
    }

    #[test]
    fn test_empty_value_rejected() {
        let err = settings(&[("CTESTFW_COMPILER", "  ")]).unwrap_err();
        assert!(err.to_string().contains("CTESTFW_COMPILER must not be empty"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = settings(&[("CTESTFW_TIMEOUT_SEC", "0")]).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_non_numeric_timeout_rejected() {
        assert!(settings(&[("CTESTFW_TIMEOUT_SEC", "soon")]).is_err());
    }

    #[test]
    fn test_bool_literals() {
        assert_eq!(settings(&[("CTESTFW_CLEANUP", "0")]).unwrap().cleanup, Some(false));
        assert_eq!(settings(&[("CTESTFW_CLEANUP", "1")]).unwrap().cleanup, Some(true));
        assert!(settings(&[("CTESTFW_CLEANUP", "yes")]).is_err());
    }
}

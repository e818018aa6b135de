//! Assertions over compile results
//!
//! An [`Assertion`] is a named, read-only check of a [`CompileResult`] (plus the
//! filesystem state it points at). Checks never mutate anything; they only
//! produce a [`Verdict`]. Built-in constructors live in [`compiler`] and are
//! re-exported here.

pub mod compiler;

use std::fmt;

use crate::runner::CompileResult;

pub use compiler::{
    assert_argv_contains, assert_exit_code, assert_native_binary_kind, assert_native_binary_kind_for_host,
    assert_output_exists, assert_output_exists_at, assert_output_kind, assert_output_kind_at, assert_output_name,
    assert_output_nonempty, assert_output_nonempty_at, assert_stderr_contains, assert_stderr_matches,
    assert_stdout_contains, assert_stdout_matches,
};

/// Maximum number of bytes of captured text quoted in a failure message.
pub const MAX_QUOTED_TEXT: usize = 2000;

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    /// `Pass` when `condition` holds, otherwise `Fail` with a lazily built message.
    pub fn require(condition: bool, message: impl FnOnce() -> String) -> Self {
        if condition { Verdict::Pass } else { Verdict::Fail(message()) }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail(msg) => Some(msg),
        }
    }

    /// Continue with `next` only if this verdict passed.
    pub fn and_then(self, next: impl FnOnce() -> Verdict) -> Verdict {
        match self {
            Verdict::Pass => next(),
            fail => fail,
        }
    }
}

type CheckFn = dyn Fn(&CompileResult) -> Verdict + Send + Sync;

/// A named check of a compile result.
pub struct Assertion {
    name: String,
    check: Box<CheckFn>,
}

impl Assertion {
    /// Wrap an arbitrary check.
    pub fn custom<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&CompileResult) -> Verdict + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Box::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, result: &CompileResult) -> Verdict {
        (self.check)(result)
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Truncate captured text for inclusion in a diagnostic.
pub fn truncate_for_diagnostic(text: &str) -> String {
    if text.len() <= MAX_QUOTED_TEXT {
        return text.to_string();
    }
    let mut cut = MAX_QUOTED_TEXT;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}... [{} bytes truncated]", &text[..cut], text.len() - cut)
}

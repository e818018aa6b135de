//! Per-case workspaces
//!
//! Every case gets its own directory under the suite root, named after the
//! case. Directories are kept after the run for inspection unless cleanup is
//! requested.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{FrameworkError, Result};

/// Root directory that hands out one subdirectory per case.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    cleanup: bool,
    issued: HashMap<String, usize>,
}

impl Workspace {
    /// Create (or reuse) `root`.
    ///
    /// A relative root is made absolute against the current directory, so the
    /// case directories handed out stay valid as a child's working directory.
    ///
    /// ## Errors
    ///
    /// [`FrameworkError::Workspace`] when the directory cannot be created.
    pub fn create(root: impl Into<PathBuf>, cleanup: bool) -> Result<Self> {
        let root = root.into();
        let root = std::path::absolute(&root).map_err(|source| FrameworkError::Workspace {
            path: root.clone(),
            source,
        })?;
        fs::create_dir_all(&root).map_err(|source| FrameworkError::Workspace {
            path: root.clone(),
            source,
        })?;
        tracing::debug!(root = %root.display(), cleanup, "workspace ready");
        Ok(Self {
            root,
            cleanup,
            issued: HashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cleanup(&self) -> bool {
        self.cleanup
    }

    /// Create a fresh, empty directory for the case called `name`.
    ///
    /// Duplicate names within one suite run get `-2`, `-3`, ... suffixes. Content
    /// left over from an earlier run is removed first so stale artifacts cannot
    /// satisfy assertions.
    ///
    /// ## Errors
    ///
    /// [`FrameworkError::Workspace`] when the directory cannot be reset or created.
    pub fn case_dir(&mut self, name: &str) -> Result<PathBuf> {
        let base = sanitize(name);
        let dir_name = loop {
            let count = {
                let count = self.issued.entry(base.clone()).or_insert(0);
                *count += 1;
                *count
            };
            if count == 1 {
                break base.clone();
            }
            // A literal name like "a-2" may already be taken by a disambiguated "a".
            let candidate = format!("{base}-{count}");
            if !self.issued.contains_key(&candidate) {
                self.issued.insert(candidate.clone(), 1);
                break candidate;
            }
        };

        let dir = self.root.join(dir_name);
        reset_dir(&dir).map_err(|source| FrameworkError::Workspace {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }

    /// Remove a case directory when cleanup is enabled.
    ///
    /// Failures are logged, not returned: the case report is already recorded.
    pub fn release(&self, dir: &Path) {
        if !self.cleanup {
            return;
        }
        if let Err(e) = fs::remove_dir_all(dir) {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to clean up case workspace");
        }
    }
}

fn reset_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        tracing::warn!(dir = %dir.display(), "removing stale case workspace");
        if dir.is_dir() {
            fs::remove_dir_all(dir)?;
        } else {
            fs::remove_file(dir)?;
        }
    }
    fs::create_dir_all(dir)
}

/// Map a case name to a safe single path component.
pub(crate) fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    match cleaned.trim_matches('.') {
        "" => "case".to_string(),
        trimmed => trimmed.to_string(),
    }
}

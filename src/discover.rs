//! File discovery: expand a section's patterns into concrete paths.

use crate::error::DiscoveryError;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Expands one pattern into an ordered list of paths.
pub trait Globber: Send + Sync + 'static {
    fn expand(
        &self,
        pattern: &str,
    ) -> impl Future<Output = Result<Vec<PathBuf>, DiscoveryError>> + Send;
}

/// Filesystem globbing relative to an optional base directory.
#[derive(Debug, Default, Clone)]
pub struct FsGlobber {
    base: Option<PathBuf>,
}

impl FsGlobber {
    /// Resolve relative patterns against `base` instead of the working directory.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn resolve(&self, pattern: &str) -> PathBuf {
        match &self.base {
            Some(base) if Path::new(pattern).is_relative() => base.join(pattern),
            _ => PathBuf::from(pattern),
        }
    }
}

impl Globber for FsGlobber {
    async fn expand(&self, pattern: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
        let full = self.resolve(pattern);

        // Literal paths pass through untouched; a missing file surfaces as a
        // read diagnostic later.
        if !is_glob_pattern(pattern) {
            return Ok(vec![full]);
        }

        let full = full.to_string_lossy();
        let matches = glob::glob(&full).map_err(|e| DiscoveryError {
            pattern: pattern.to_string(),
            message: e.msg.to_string(),
        })?;

        let (files, skipped) = keep_files(matches);
        for reason in skipped {
            tracing::warn!(target: "sugarcoat", pattern, "skipping unreadable match: {}", reason);
        }
        Ok(files)
    }
}

/// Split glob results into the regular files matched and the walk errors
/// (unreadable directories and the like), which are reported, not fatal.
fn keep_files<E: fmt::Display>(
    entries: impl IntoIterator<Item = Result<PathBuf, E>>,
) -> (Vec<PathBuf>, Vec<String>) {
    let mut files = Vec::new();
    let mut skipped = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(err) => skipped.push(err.to_string()),
        }
    }
    (files, skipped)
}

/// Check if a pattern contains glob metacharacters.
pub fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Expand every pattern of a section in order, dropping repeated paths.
pub async fn expand_all<G: Globber>(
    globber: &G,
    patterns: &[String],
) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut files: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        for path in globber.expand(pattern).await? {
            if !files.contains(&path) {
                files.push(path);
            }
        }
    }
    Ok(files)
}

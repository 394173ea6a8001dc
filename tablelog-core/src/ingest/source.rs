//! Log file enumeration
//!
//! The library only consumes a list of paths; [`LogFileSource`] is the seam
//! where a shell can plug in its own enumeration. [`GlobFileSource`] walks
//! directories with `glob` and keeps files whose extension matches.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Supplies candidate log files.
pub trait LogFileSource {
    /// Every log file under each of `directories`, recursively.
    fn list_log_files(&self, directories: &[PathBuf]) -> Result<Vec<PathBuf>>;

    /// Log files directly inside `directory`.
    fn list_directory(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        let files = self.list_log_files(&[directory.to_path_buf()])?;
        Ok(files
            .into_iter()
            .filter(|path| path.parent() == Some(directory))
            .collect())
    }
}

/// Recursive glob over each directory, filtered by extension.
#[derive(Debug, Clone)]
pub struct GlobFileSource {
    extensions: Vec<String>,
}

impl GlobFileSource {
    pub fn new(extensions: &[String]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether `path` has one of the configured extensions (case-insensitive).
    pub fn is_log_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    fn glob_files(&self, pattern: &Path) -> Result<Vec<PathBuf>> {
        let pattern_str = pattern.to_string_lossy();
        let entries = glob::glob(&pattern_str)
            .map_err(|e| Error::Discovery(format!("invalid glob pattern {}: {}", pattern_str, e)))?;

        Ok(entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable path");
                    None
                }
            })
            .filter(|path| path.is_file() && self.is_log_file(path))
            .collect())
    }
}

impl Default for GlobFileSource {
    fn default() -> Self {
        Self::new(&["htm".to_string(), "html".to_string()])
    }
}

impl LogFileSource for GlobFileSource {
    fn list_log_files(&self, directories: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for dir in directories {
            if !dir.is_dir() {
                tracing::warn!(dir = %dir.display(), "Watched directory is missing, skipping");
                continue;
            }
            let root = PathBuf::from(glob::Pattern::escape(&dir.to_string_lossy()));
            let found = self.glob_files(&root.join("**").join("*"))?;
            tracing::debug!(dir = %dir.display(), count = found.len(), "Discovered log files");
            files.extend(found);
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    fn list_directory(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        if !directory.is_dir() {
            return Ok(vec![]);
        }
        let root = PathBuf::from(glob::Pattern::escape(&directory.to_string_lossy()));
        let mut files = self.glob_files(&root.join("*"))?;
        files.sort();
        Ok(files)
    }
}

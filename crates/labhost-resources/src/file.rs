//! Config file resource
//!
//! The file's presence IS the persisted state: an existing file is never
//! overwritten, so manual edits survive re-runs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::ResourceError;
use crate::traits::Resource;

/// A config file that must exist with the given (already rendered)
/// content.
pub struct ConfigFile {
    path: PathBuf,
    contents: String,
}

impl ConfigFile {
    /// Describe a config file requirement
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Target path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write `contents` to `path` unless the file already exists.
///
/// Returns whether a write happened. Parent directories are created as
/// needed.
///
/// # Errors
/// `ResourceError::Write` when the directory or file cannot be created.
#[instrument(skip(contents))]
pub fn install_file(path: &Path, contents: &str) -> Result<bool, ResourceError> {
    if path.exists() {
        debug!(path = %path.display(), "file already present, leaving it alone");
        return Ok(false);
    }

    let write_err = |e: std::io::Error| ResourceError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, contents).map_err(write_err)?;

    debug!(path = %path.display(), "file written");
    Ok(true)
}

#[async_trait]
impl Resource for ConfigFile {
    fn id(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn is_satisfied(&self) -> Result<bool, ResourceError> {
        Ok(self.path.exists())
    }

    async fn apply(&self) -> Result<(), ResourceError> {
        install_file(&self.path, &self.contents)?;
        Ok(())
    }

    async fn remove(&self) -> Result<(), ResourceError> {
        if !self.path.exists() {
            return Ok(());
        }
        std::fs::remove_file(&self.path).map_err(|e| ResourceError::Write {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

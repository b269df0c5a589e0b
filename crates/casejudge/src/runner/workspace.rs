//! Scoped workspace for a single run
//!
//! Holds the submitted source in a fresh temporary directory. The directory
//! is removed when the workspace is dropped, whichever way the run ended.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, instrument, warn};

use crate::runner::RunError;

/// Temporary directory owning the files of one run
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a new empty workspace under the system temp directory
    pub fn create() -> Result<Self, RunError> {
        let dir = tempfile::Builder::new()
            .prefix("casejudge-")
            .tempdir()
            .map_err(RunError::Workspace)?;
        debug!(path = %dir.path().display(), "workspace created");
        Ok(Self { dir })
    }

    /// Get the path to the workspace directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the host path to a file inside the workspace
    ///
    /// Returns an error if the path contains path traversal attempts.
    pub fn file_path(&self, name: &str) -> Result<PathBuf, RunError> {
        if name.is_empty() || name.contains("..") || name.starts_with('/') {
            return Err(RunError::InvalidPath(format!(
                "path traversal not allowed: {name}"
            )));
        }
        Ok(self.dir.path().join(name))
    }

    /// Write a file into the workspace
    #[instrument(skip(self, content))]
    pub async fn write_file(&self, name: &str, content: &[u8]) -> Result<PathBuf, RunError> {
        let path = self.file_path(name)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;
        debug!(?path, len = content.len(), "wrote file to workspace");
        Ok(path)
    }

    /// Remove the workspace, logging instead of failing if removal fails
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(path = %path.display(), "workspace removed"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove workspace"),
        }
    }
}

use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::TempDir;

use super::issuer::IssueError;
use crate::core::config::ACCOUNT_KEY_FILENAME;

const WORKSPACE_PREFIX: &str = "letsgo-";

/// Scratch directory owned by exactly one agent run.
///
/// Removed by [`Workspace::release`], or on drop if release never happens.
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Creates a fresh, empty, uniquely named directory under `root`, or the
    /// system temp dir when `root` is `None`.
    pub fn acquire(root: Option<&Path>) -> Result<Self, IssueError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|err| IssueError::workspace("failed to create workspace", err))?;

        let path = dir
            .path()
            .canonicalize()
            .map_err(|err| IssueError::workspace("failed to resolve workspace path", err))?;
        debug!("[workspace] acquired {}", path.display());

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    /// Absolute path of the workspace.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    pub fn account_key_path(&self) -> PathBuf {
        self.file(ACCOUNT_KEY_FILENAME)
    }

    /// Removes the workspace and everything the agent left in it.
    pub fn release(mut self) -> Result<(), IssueError> {
        match self.dir.take() {
            Some(dir) => {
                dir.close()
                    .map_err(|err| IssueError::workspace("failed to remove workspace", err))?;
                debug!("[workspace] released {}", self.path.display());
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(err) = dir.close() {
                warn!(
                    "[workspace] failed to remove {} on drop: {}",
                    self.path.display(),
                    err
                );
            }
        }
    }
}

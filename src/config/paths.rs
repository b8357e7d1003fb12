//! Path resolution for tasktree configuration and data files.
//!
//! All tasktree data is stored in `~/.tasktree/` (overridable via
//! `TASKTREE_HOME`):
//! - `config.yaml` - Main configuration file
//! - `state.json` - The local working copy of the task forest

use std::path::PathBuf;

use crate::error::TaskTreeError;

/// Paths to tasktree configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.tasktree/`
    pub root: PathBuf,
    /// Config file: `~/.tasktree/config.yaml`
    pub config_file: PathBuf,
    /// Local working copy: `~/.tasktree/state.json`
    pub state_file: PathBuf,
}

impl Paths {
    /// Create paths based on `TASKTREE_HOME` or the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if neither can be determined.
    pub fn new() -> Result<Self, TaskTreeError> {
        if let Ok(root) = std::env::var("TASKTREE_HOME") {
            return Ok(Self::with_root(PathBuf::from(root)));
        }
        let home = std::env::var("HOME")
            .map_err(|_| TaskTreeError::Config("Could not determine home directory".to_string()))?;
        Ok(Self::with_root(PathBuf::from(home).join(".tasktree")))
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            state_file: root.join("state.json"),
            root,
        }
    }

    /// Ensure the root directory exists, creating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), TaskTreeError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                TaskTreeError::Config(format!("Failed to create directory {:?}: {}", self.root, e))
            })?;
        }
        Ok(())
    }
}

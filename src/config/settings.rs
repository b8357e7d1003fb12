//! Configuration settings for tasktree.
//!
//! Settings are loaded from `~/.tasktree/config.yaml`. A missing file means
//! all defaults; a malformed file is a configuration error rather than a
//! silent fallback.

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::error::TaskTreeError;
use crate::sync::SyncConfig;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Sync engine timings.
    pub sync: SyncConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    pub default_output: OutputFormat,
    /// Identity used for remote sync, if signed in.
    pub user: Option<String>,
    /// Root of the shared remote directory for the `sync` command.
    pub remote: Option<String>,
}

impl Config {
    /// Load configuration from disk, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(paths: &Paths) -> Result<Self, TaskTreeError> {
        if !paths.config_file.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&paths.config_file)
            .map_err(|e| TaskTreeError::Config(format!("Failed to read config: {e}")))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| TaskTreeError::Config(format!("Failed to parse config: {e}")))
    }
}

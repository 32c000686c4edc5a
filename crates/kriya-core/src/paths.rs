//! File system paths for the client.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Session record filename under the base directory.
const SESSION_FILE_NAME: &str = "session.json";
/// Config filename under the base directory.
const CONFIG_FILE_NAME: &str = "config.json";

/// Manages file system paths for the client.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for client runtime files (~/.kriya)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.kriya`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".kriya"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.kriya).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.kriya/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE_NAME)
    }

    /// Get the session record path (~/.kriya/session.json).
    pub fn session_file(&self) -> PathBuf {
        self.base_dir.join(SESSION_FILE_NAME)
    }

    /// Ensure the base directory exists.
    pub fn ensure_base_dir(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        Ok(())
    }
}

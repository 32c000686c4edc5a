//! JSON-file session store.

use crate::{SessionStore, StorageResult, StoredSession};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::warn;

/// Session store backed by a JSON file (`~/.kriya/session.json`).
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store writing to the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The file path this store reads and writes.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &StoredSession) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn load(&self) -> StorageResult<Option<StoredSession>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // A corrupt record means unauthenticated, not an error surface.
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable session record");
                Ok(None)
            }
        }
    }

    fn clear(&self) -> StorageResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

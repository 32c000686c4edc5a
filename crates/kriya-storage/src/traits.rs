//! Storage trait definitions.

use crate::{StorageResult, StoredSession};

/// Trait for session record backends.
///
/// `load` is the single accessor the rest of the application trusts: an
/// absent or unreadable record means "not authenticated", never an
/// authenticated default.
pub trait SessionStore: Send + Sync {
    /// Persist the session record, replacing any existing one.
    fn save(&self, session: &StoredSession) -> StorageResult<()>;

    /// Retrieve the session record, if one exists and decodes.
    fn load(&self) -> StorageResult<Option<StoredSession>>;

    /// Remove the session record. Returns whether one existed.
    fn clear(&self) -> StorageResult<bool>;

    /// Whether a persisted, authenticated session exists.
    fn is_authenticated(&self) -> bool {
        matches!(self.load(), Ok(Some(session)) if session.authenticated)
    }
}

//! Durable session record storage for the Kriya client.
//!
//! The session record is a non-secret marker (the credential itself is an
//! HTTP-only cookie held by the HTTP client); it gates which part of the
//! application is reachable and remembers whether the account has a local
//! password.

mod file;
mod record;
mod traits;

pub use file::FileSessionStore;
pub use record::StoredSession;
pub use traits::SessionStore;

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

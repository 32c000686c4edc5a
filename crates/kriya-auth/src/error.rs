//! Error types for the authentication flow.

use thiserror::Error;

/// Error type for authentication operations.
///
/// Expected business rejections (wrong password, duplicate email, bad OTP)
/// are NOT errors; they surface as [`crate::gateway::CallOutcome::Rejected`].
/// This type covers the transport/parse class plus local misuse.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Network-level failure or undecodable body
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response shape did not match the contract
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Server-side failure class (5xx)
    #[error("Server error: HTTP {0}")]
    UnexpectedStatus(u16),

    /// Session record storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] kriya_storage::StorageError),

    /// An event was applied in a step that does not accept it
    #[error("Invalid flow transition: {0}")]
    InvalidStateTransition(String),

    /// No authenticated session record exists
    #[error("Not signed in")]
    NotSignedIn,

    /// The account already has a local password
    #[error("A local password is already set for this account")]
    PasswordAlreadySet,
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

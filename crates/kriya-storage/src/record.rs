//! The persisted session record.

use serde::{Deserialize, Serialize};

/// Session record persisted once sign-in completes.
///
/// `has_local_password` is false only for accounts whose sole proof of
/// identity was a federated exchange; it gates the post-auth "set a
/// password" affordance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Account email.
    pub email: String,
    /// Whether the account has a password usable for direct sign-in.
    pub has_local_password: bool,
    /// Whether the session was established by the authentication flow.
    pub authenticated: bool,
}

impl StoredSession {
    /// Build the record written at session bootstrap.
    pub fn authenticated(email: impl Into<String>, has_local_password: bool) -> Self {
        Self {
            email: email.into(),
            has_local_password,
            authenticated: true,
        }
    }
}

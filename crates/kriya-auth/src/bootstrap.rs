//! Session bootstrap: converting a successful authentication into a
//! persisted session and a navigation out of the flow.

use crate::error::AuthResult;
use kriya_storage::{SessionStore, StoredSession};
use std::sync::Arc;
use tracing::info;

/// Route of the protected area entered after authentication.
pub const PROTECTED_ENTRY: &str = "/home";

/// Full navigation target produced by a terminal flow success.
///
/// Navigation (rather than another step) guarantees no residual flow state
/// or in-flight request can affect the post-auth view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    /// Route to navigate to.
    pub location: &'static str,
}

/// Writes the session record and produces the redirect.
#[derive(Clone)]
pub struct SessionBootstrap {
    store: Arc<dyn SessionStore>,
}

impl SessionBootstrap {
    /// Create a bootstrap handing sessions to the given store.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Persist the session record and yield the redirect target.
    ///
    /// If the write fails there is no redirect: the caller must surface
    /// the error instead of entering the protected area.
    pub fn establish(&self, email: &str, has_local_password: bool) -> AuthResult<Redirect> {
        let session = StoredSession::authenticated(email, has_local_password);
        self.store.save(&session)?;
        info!(email = %email, has_local_password, "Session established");
        Ok(Redirect {
            location: PROTECTED_ENTRY,
        })
    }
}

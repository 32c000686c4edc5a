//! Post-auth password upgrade for federated-identity accounts.
//!
//! A small satellite of the reset-password gateway operation: it does not
//! touch the flow controller. Available only while the stored session has
//! no local password; on success the stored flag flips and the affordance
//! disappears.

use crate::error::{AuthError, AuthResult};
use crate::gateway::{AuthGateway, CallOutcome};
use kriya_storage::SessionStore;
use std::sync::Arc;
use tracing::info;

/// What a password upgrade submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// Client-side validation failed; no call was issued.
    Blocked(&'static str),
    /// The server rejected the new password.
    Rejected(String),
    /// The password is set and the session record updated.
    Completed,
}

/// One-shot form for setting a local password on a federated account.
pub struct PasswordUpgrade {
    gateway: AuthGateway,
    store: Arc<dyn SessionStore>,
    email: String,
}

impl PasswordUpgrade {
    /// Open the upgrade form for the current session.
    ///
    /// The email is taken from the stored session, never from user input.
    pub fn open(gateway: AuthGateway, store: Arc<dyn SessionStore>) -> AuthResult<Self> {
        let session = store.load()?.ok_or(AuthError::NotSignedIn)?;
        if !session.authenticated {
            return Err(AuthError::NotSignedIn);
        }
        if session.has_local_password {
            return Err(AuthError::PasswordAlreadySet);
        }
        Ok(Self {
            gateway,
            store,
            email: session.email,
        })
    }

    /// The account email the new password will be set for.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Submit the new password and confirmation.
    pub async fn submit(&self, password: &str, confirm: &str) -> AuthResult<UpgradeOutcome> {
        if password.is_empty() {
            return Ok(UpgradeOutcome::Blocked("Password is required"));
        }
        if password != confirm {
            return Ok(UpgradeOutcome::Blocked("Passwords do not match"));
        }

        match self.gateway.reset_password(&self.email, password).await? {
            CallOutcome::Rejected(message) => Ok(UpgradeOutcome::Rejected(message)),
            CallOutcome::Accepted(()) => {
                let mut session = self.store.load()?.ok_or(AuthError::NotSignedIn)?;
                session.has_local_password = true;
                self.store.save(&session)?;
                info!(email = %self.email, "Local password set for federated account");
                Ok(UpgradeOutcome::Completed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kriya_storage::{StorageResult, StoredSession};
    use std::sync::Mutex;

    struct MemoryStore {
        session: Mutex<Option<StoredSession>>,
    }

    impl MemoryStore {
        fn with(session: Option<StoredSession>) -> Arc<Self> {
            Arc::new(Self {
                session: Mutex::new(session),
            })
        }
    }

    impl SessionStore for MemoryStore {
        fn save(&self, session: &StoredSession) -> StorageResult<()> {
            *self.session.lock().unwrap() = Some(session.clone());
            Ok(())
        }

        fn load(&self) -> StorageResult<Option<StoredSession>> {
            Ok(self.session.lock().unwrap().clone())
        }

        fn clear(&self) -> StorageResult<bool> {
            Ok(self.session.lock().unwrap().take().is_some())
        }
    }

    fn gateway_for(url: String) -> AuthGateway {
        AuthGateway::new(reqwest::Client::new(), url)
    }

    #[test]
    fn test_open_requires_session() {
        let store = MemoryStore::with(None);
        let result = PasswordUpgrade::open(
            gateway_for("http://127.0.0.1:9".to_string()),
            store as Arc<dyn SessionStore>,
        );
        assert!(matches!(result, Err(AuthError::NotSignedIn)));
    }

    #[test]
    fn test_open_rejected_when_password_already_set() {
        let store = MemoryStore::with(Some(StoredSession::authenticated("user@example.com", true)));
        let result = PasswordUpgrade::open(
            gateway_for("http://127.0.0.1:9".to_string()),
            store as Arc<dyn SessionStore>,
        );
        assert!(matches!(result, Err(AuthError::PasswordAlreadySet)));
    }

    #[tokio::test]
    async fn test_mismatched_confirmation_blocks_without_network() {
        let store =
            MemoryStore::with(Some(StoredSession::authenticated("user@example.com", false)));
        let upgrade = PasswordUpgrade::open(
            gateway_for("http://127.0.0.1:9".to_string()),
            store as Arc<dyn SessionStore>,
        )
        .unwrap();

        let outcome = upgrade.submit("new-password", "other").await.unwrap();
        assert_eq!(outcome, UpgradeOutcome::Blocked("Passwords do not match"));
    }

    #[tokio::test]
    async fn test_success_flips_has_local_password_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/reset_password")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"email": "user@example.com"}"#.to_string(),
            ))
            .with_status(200)
            .create_async()
            .await;

        let store =
            MemoryStore::with(Some(StoredSession::authenticated("user@example.com", false)));
        let upgrade = PasswordUpgrade::open(
            gateway_for(server.url()),
            store.clone() as Arc<dyn SessionStore>,
        )
        .unwrap();
        assert_eq!(upgrade.email(), "user@example.com");

        let outcome = upgrade.submit("new-password", "new-password").await.unwrap();
        assert_eq!(outcome, UpgradeOutcome::Completed);
        assert!(store.load().unwrap().unwrap().has_local_password);
        mock.assert_async().await;

        // The affordance is gone for the upgraded session.
        let reopened = PasswordUpgrade::open(
            gateway_for(server.url()),
            store as Arc<dyn SessionStore>,
        );
        assert!(matches!(reopened, Err(AuthError::PasswordAlreadySet)));
    }

    #[tokio::test]
    async fn test_server_rejection_keeps_flag_unset() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/reset_password")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Password too weak"}"#)
            .create_async()
            .await;

        let store =
            MemoryStore::with(Some(StoredSession::authenticated("user@example.com", false)));
        let upgrade = PasswordUpgrade::open(
            gateway_for(server.url()),
            store.clone() as Arc<dyn SessionStore>,
        )
        .unwrap();

        let outcome = upgrade.submit("weak", "weak").await.unwrap();
        assert_eq!(outcome, UpgradeOutcome::Rejected("Password too weak".to_string()));
        assert!(!store.load().unwrap().unwrap().has_local_password);
    }
}

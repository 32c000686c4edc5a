//! REST client for the Kriya authentication service.
//!
//! One method per backend operation, each a single request/response pair.
//! Expected business rejections come back as [`CallOutcome::Rejected`]
//! with the server's message; only transport-class problems (network
//! failure, undecodable body, 5xx) become errors. Every request rides the
//! shared cookie jar, which is how the backend credential travels.

use crate::error::{AuthError, AuthResult};
use serde::Deserialize;
use tracing::{debug, warn};

/// Normalized result of one gateway operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome<T> {
    /// The server accepted the operation.
    Accepted(T),
    /// The server rejected the operation for a business reason.
    Rejected(String),
}

/// Result type for gateway operations: `Err` is transport-class only.
pub type GatewayResult<T> = AuthResult<CallOutcome<T>>;

/// Whether an email already belongs to an account.
///
/// Returned as an explicit payload field, never inferred from the HTTP
/// status. Sign-up treats `Registered` as the failure arm while password
/// reset treats it as the success arm; that inversion is applied by the
/// flow controller, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Registered,
    NotRegistered,
}

/// Why an OTP is being issued; selects the email template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    SignUp,
    PasswordReset,
}

impl OtpPurpose {
    /// Email body template sent along with the code.
    pub fn message_text(&self) -> &'static str {
        match self {
            OtpPurpose::SignUp => "This is your one time password to register into Kriya",
            OtpPurpose::PasswordReset => "This is your one time password to reset password",
        }
    }
}

/// Identity returned by a successful federated exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    /// Account email as reported by the identity provider.
    pub email: String,
}

/// Envelope shared by most auth endpoints.
#[derive(Debug, Default, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExistenceResponse {
    registered: bool,
}

#[derive(Debug, Deserialize)]
struct FederatedResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthProbeResponse {
    authenticated: bool,
}

/// Client for the authentication endpoints.
#[derive(Clone)]
pub struct AuthGateway {
    http_client: reqwest::Client,
    api_url: String,
}

impl AuthGateway {
    /// Create a new gateway client.
    ///
    /// The `http_client` must be shared with every other client talking to
    /// the same backend so the session cookie is visible to all of them.
    pub fn new(http_client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            http_client,
            api_url: api_url.into(),
        }
    }

    /// Build the URL for an auth endpoint.
    fn auth_url(&self, op: &str) -> String {
        format!("{}/auth/{}", self.api_url, op)
    }

    async fn post(&self, op: &str, body: serde_json::Value) -> AuthResult<reqwest::Response> {
        let url = self.auth_url(op);
        debug!(url = %url, "Auth gateway call");
        let response = self.http_client.post(&url).json(&body).send().await?;
        Ok(response)
    }

    /// Sign in with email and password. Success sets the session cookie.
    pub async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<()> {
        let response = self
            .post(
                "signin",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await?;
        interpret(response, "Login failed, please try again.").await
    }

    /// Check whether an email is already registered.
    pub async fn user_exists(&self, email: &str) -> GatewayResult<Registration> {
        let response = self
            .post("userExists", serde_json::json!({ "email": email }))
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Existence check failed");
            return Err(AuthError::UnexpectedStatus(status.as_u16()));
        }

        let data: ExistenceResponse = response.json().await?;
        let registration = if data.registered {
            Registration::Registered
        } else {
            Registration::NotRegistered
        };
        Ok(CallOutcome::Accepted(registration))
    }

    /// Send a one-time password to `email`, with a purpose-specific template.
    pub async fn generate_otp(&self, email: &str, purpose: OtpPurpose) -> GatewayResult<()> {
        let response = self
            .post(
                "generateOTP",
                serde_json::json!({ "email": email, "text": purpose.message_text() }),
            )
            .await?;
        interpret(response, "Failed to send OTP").await
    }

    /// Verify a previously issued one-time password.
    pub async fn verify_otp(&self, otp: &str) -> GatewayResult<()> {
        let response = self.post("verifyOTP", serde_json::json!({ "otp": otp })).await?;
        interpret(response, "Invalid OTP").await
    }

    /// Complete registration. Success sets the session cookie.
    pub async fn sign_up(&self, email: &str, password: &str) -> GatewayResult<()> {
        let response = self
            .post(
                "signup",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await?;
        interpret(response, "Sign up failed, please try again.").await
    }

    /// Replace the account password.
    pub async fn reset_password(&self, email: &str, new_password: &str) -> GatewayResult<()> {
        let response = self
            .post(
                "reset_password",
                serde_json::json!({ "email": email, "password": new_password }),
            )
            .await?;
        interpret(response, "Failed to reset password.").await
    }

    /// Exchange a federated provider credential for a session.
    pub async fn federated_exchange(&self, credential: &str) -> GatewayResult<FederatedIdentity> {
        let response = self
            .post("google", serde_json::json!({ "credential": credential }))
            .await?;

        let status = response.status();
        if status.is_server_error() {
            warn!(status = %status, "Federated exchange failed");
            return Err(AuthError::UnexpectedStatus(status.as_u16()));
        }

        let data: FederatedResponse = response.json().await?;
        if !data.success {
            return Ok(CallOutcome::Rejected(
                data.message
                    .unwrap_or_else(|| "Login failed, please try again.".to_string()),
            ));
        }

        let email = data.email.ok_or_else(|| {
            AuthError::UnexpectedResponse("federated exchange response missing email".to_string())
        })?;
        Ok(CallOutcome::Accepted(FederatedIdentity { email }))
    }

    /// End the server-side session.
    pub async fn logout(&self) -> GatewayResult<()> {
        let response = self.post("logout", serde_json::json!({})).await?;
        interpret(response, "Logout failed").await
    }

    /// Ask the server whether the cookie still names a valid session.
    pub async fn check_authenticated(&self) -> AuthResult<bool> {
        let response = self.post("isAuthenticated", serde_json::json!({})).await?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let data: AuthProbeResponse = response.json().await?;
        Ok(data.authenticated)
    }
}

/// Decode a `{success, message}` style response into a [`CallOutcome`].
///
/// 2xx without `success:false` is acceptance; 4xx (or `success:false`) is a
/// business rejection carrying the server message; 5xx and undecodable
/// bodies are the transport class.
async fn interpret(response: reqwest::Response, default_rejection: &str) -> GatewayResult<()> {
    let status = response.status();
    if status.is_server_error() {
        warn!(status = %status, "Auth gateway server error");
        return Err(AuthError::UnexpectedStatus(status.as_u16()));
    }

    let body = response.text().await?;
    let envelope: ApiEnvelope = if body.trim().is_empty() {
        ApiEnvelope::default()
    } else {
        serde_json::from_str(&body)
            .map_err(|e| AuthError::UnexpectedResponse(e.to_string()))?
    };

    if status.is_success() && envelope.success != Some(false) {
        Ok(CallOutcome::Accepted(()))
    } else {
        Ok(CallOutcome::Rejected(
            envelope
                .message
                .unwrap_or_else(|| default_rejection.to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(server: &mockito::ServerGuard) -> AuthGateway {
        AuthGateway::new(reqwest::Client::new(), server.url())
    }

    #[test]
    fn test_auth_url() {
        let gw = AuthGateway::new(reqwest::Client::new(), "https://api.kriya.dev");
        assert_eq!(gw.auth_url("signin"), "https://api.kriya.dev/auth/signin");
    }

    #[test]
    fn test_otp_purpose_templates() {
        assert_eq!(
            OtpPurpose::SignUp.message_text(),
            "This is your one time password to register into Kriya"
        );
        assert_eq!(
            OtpPurpose::PasswordReset.message_text(),
            "This is your one time password to reset password"
        );
    }

    #[tokio::test]
    async fn test_sign_in_accepted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/signin")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;

        let outcome = gateway(&server)
            .sign_in("user@example.com", "hunter2")
            .await
            .unwrap();
        assert_eq!(outcome, CallOutcome::Accepted(()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_sign_in_rejected_with_server_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/signin")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": false, "message": "Invalid credentials"}"#)
            .create_async()
            .await;

        let outcome = gateway(&server)
            .sign_in("user@example.com", "wrong")
            .await
            .unwrap();
        assert_eq!(outcome, CallOutcome::Rejected("Invalid credentials".to_string()));
    }

    #[tokio::test]
    async fn test_rejection_without_message_uses_operation_default() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/verifyOTP")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{}"#)
            .create_async()
            .await;

        let outcome = gateway(&server).verify_otp("123456").await.unwrap();
        assert_eq!(outcome, CallOutcome::Rejected("Invalid OTP".to_string()));
    }

    #[tokio::test]
    async fn test_server_error_is_transport_class() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/signin")
            .with_status(500)
            .create_async()
            .await;

        let err = gateway(&server)
            .sign_in("user@example.com", "hunter2")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnexpectedStatus(500)));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_transport_class() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/signin")
            .with_status(200)
            .with_body("<html>gateway timeout</html>")
            .create_async()
            .await;

        let err = gateway(&server)
            .sign_in("user@example.com", "hunter2")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_user_exists_decodes_registration() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/userExists")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"registered": true}"#)
            .create_async()
            .await;

        let outcome = gateway(&server).user_exists("user@example.com").await.unwrap();
        assert_eq!(outcome, CallOutcome::Accepted(Registration::Registered));
    }

    #[tokio::test]
    async fn test_user_exists_not_registered() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/userExists")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"registered": false}"#)
            .create_async()
            .await;

        let outcome = gateway(&server).user_exists("new@example.com").await.unwrap();
        assert_eq!(outcome, CallOutcome::Accepted(Registration::NotRegistered));
    }

    #[tokio::test]
    async fn test_generate_otp_sends_purpose_template() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/generateOTP")
            .match_body(mockito::Matcher::JsonString(
                r#"{"email": "user@example.com", "text": "This is your one time password to reset password"}"#
                    .to_string(),
            ))
            .with_status(200)
            .create_async()
            .await;

        let outcome = gateway(&server)
            .generate_otp("user@example.com", OtpPurpose::PasswordReset)
            .await
            .unwrap();
        assert_eq!(outcome, CallOutcome::Accepted(()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_federated_exchange_returns_identity() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/google")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "email": "user@example.com"}"#)
            .create_async()
            .await;

        let outcome = gateway(&server).federated_exchange("id-token").await.unwrap();
        assert_eq!(
            outcome,
            CallOutcome::Accepted(FederatedIdentity {
                email: "user@example.com".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_federated_exchange_missing_email_is_transport_class() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/google")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;

        let err = gateway(&server).federated_exchange("id-token").await.unwrap_err();
        assert!(matches!(err, AuthError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_check_authenticated() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/isAuthenticated")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"authenticated": true}"#)
            .create_async()
            .await;

        assert!(gateway(&server).check_authenticated().await.unwrap());
    }
}

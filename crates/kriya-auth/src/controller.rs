//! The flow controller: owns the current step, the credential draft, and
//! the pending message, and drives gateway calls in response to user
//! events.
//!
//! Concurrency model: at most one gateway call is in flight per controller
//! (`loading` gates submissions). Navigation is still allowed while a call
//! is in flight; every completion carries the generation captured when the
//! call started and is dropped if the step has changed since.

use crate::bootstrap::{Redirect, SessionBootstrap};
use crate::error::{AuthError, AuthResult};
use crate::flow::{FirstStep, FlowMachine, FlowMachineInput, FlowStep};
use crate::gateway::{
    AuthGateway, CallOutcome, FederatedIdentity, GatewayResult, OtpPurpose, Registration,
};
use kriya_storage::SessionStore;
use std::sync::Arc;
use tracing::{debug, warn};

const MSG_ALREADY_REGISTERED: &str = "Email Already registered";
const MSG_NOT_REGISTERED: &str = "Email is not registered";
const MSG_RESET_SUCCESS: &str = "Password reset successful. Click below to sign in.";
const MSG_GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Transient form fields for the active flow.
///
/// Fields persist across step changes on purpose: the email entered on the
/// sign-up page is the one the OTP step completes registration with.
#[derive(Debug, Clone, Default)]
pub struct CredentialDraft {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub otp: String,
}

/// What a submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowProgress {
    /// Client-side validation failed; no call was issued.
    Blocked(&'static str),
    /// The flow stayed on the current step; the pending message explains.
    Stayed,
    /// The flow advanced to the next step.
    Advanced,
    /// The completion was stale (step changed, or flow already finished)
    /// and was dropped.
    Ignored,
    /// Terminal success: the session is persisted and the flow is done.
    Authenticated(Redirect),
}

/// Identity of an in-flight call: the generation at call start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CallTicket {
    generation: u64,
}

enum Gate {
    Proceed,
    Halted(FlowProgress),
}

/// Controller for the credential-and-session establishment flow.
pub struct FlowController {
    machine: FlowMachine,
    draft: CredentialDraft,
    message: Option<String>,
    loading: bool,
    generation: u64,
    finished: bool,
    reset_complete: bool,
    gateway: AuthGateway,
    bootstrap: SessionBootstrap,
}

impl FlowController {
    /// Create a controller starting on the given entry page.
    pub fn new(gateway: AuthGateway, store: Arc<dyn SessionStore>, first: FirstStep) -> Self {
        Self {
            machine: first.machine(),
            draft: CredentialDraft::default(),
            message: None,
            loading: false,
            generation: 0,
            finished: false,
            reset_complete: false,
            gateway,
            bootstrap: SessionBootstrap::new(store),
        }
    }

    /// The step currently presented.
    pub fn step(&self) -> FlowStep {
        FlowStep::from(self.machine.state())
    }

    /// The pending status/error message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Whether a gateway call is in flight (submissions are disabled).
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the flow reached a terminal success and was torn down.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether a password reset completed, enabling the go-to-sign-in
    /// affordance on the new-password step.
    pub fn password_reset_complete(&self) -> bool {
        self.reset_complete
    }

    pub fn draft(&self) -> &CredentialDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut CredentialDraft {
        &mut self.draft
    }

    // ==========================================
    // Navigation
    // ==========================================

    /// Sign-in page → sign-up page.
    pub fn go_to_sign_up(&mut self) -> AuthResult<()> {
        self.navigate(&FlowMachineInput::GoSignUp)
    }

    /// Back to the sign-in page (from sign-up or after a completed reset).
    pub fn go_to_sign_in(&mut self) -> AuthResult<()> {
        self.navigate(&FlowMachineInput::GoSignIn)
    }

    /// Sign-in page → forgot-password page.
    pub fn go_to_forgot_password(&mut self) -> AuthResult<()> {
        self.navigate(&FlowMachineInput::GoForgotPassword)
    }

    /// Back out of an OTP step or the forgot-password page.
    pub fn go_back(&mut self) -> AuthResult<()> {
        self.navigate(&FlowMachineInput::Back)
    }

    fn navigate(&mut self, input: &FlowMachineInput) -> AuthResult<()> {
        if self.finished {
            return Ok(());
        }
        self.transition(input)
    }

    /// Apply a machine input. On a step change the pending message is
    /// cleared synchronously and the generation advances, so any response
    /// still in flight for the previous step will be dropped on arrival.
    fn transition(&mut self, input: &FlowMachineInput) -> AuthResult<()> {
        let old = self.step();
        self.machine.consume(input).map_err(|_| {
            AuthError::InvalidStateTransition(format!(
                "Cannot apply {:?} in step {:?}",
                input,
                self.step()
            ))
        })?;
        let new = self.step();

        debug!(old_step = ?old, new_step = ?new, "Flow transition");
        self.message = None;
        self.loading = false;
        self.generation = self.generation.wrapping_add(1);
        Ok(())
    }

    // ==========================================
    // Submissions
    // ==========================================

    /// Submit the sign-in form.
    pub async fn submit_sign_in(&mut self) -> AuthResult<FlowProgress> {
        self.expect_step(FlowStep::SignIn)?;
        if let Some(reason) = validate::sign_in(&self.draft) {
            return Ok(FlowProgress::Blocked(reason));
        }
        let Some(ticket) = self.begin() else {
            return Ok(FlowProgress::Ignored);
        };

        let email = self.draft.email.clone();
        let password = self.draft.password.clone();
        let outcome = self.gateway.sign_in(&email, &password).await;
        self.complete_sign_in(ticket, outcome)
    }

    /// Complete a federated (Google) sign-in with a provider credential.
    pub async fn submit_federated(&mut self, credential: &str) -> AuthResult<FlowProgress> {
        self.expect_step(FlowStep::SignIn)?;
        if credential.is_empty() {
            return Ok(FlowProgress::Blocked("A provider credential is required"));
        }
        let Some(ticket) = self.begin() else {
            return Ok(FlowProgress::Ignored);
        };

        let outcome = self.gateway.federated_exchange(credential).await;
        self.complete_federated(ticket, outcome)
    }

    /// Submit the sign-up form: existence check, then OTP issuance.
    pub async fn submit_sign_up(&mut self) -> AuthResult<FlowProgress> {
        self.expect_step(FlowStep::SignUp)?;
        if let Some(reason) = validate::sign_up(&self.draft) {
            return Ok(FlowProgress::Blocked(reason));
        }
        let Some(ticket) = self.begin() else {
            return Ok(FlowProgress::Ignored);
        };

        let email = self.draft.email.clone();
        let existence = self.gateway.user_exists(&email).await;
        match self.registration_gate(ticket, existence, false)? {
            Gate::Halted(progress) => Ok(progress),
            Gate::Proceed => {
                let issued = self.gateway.generate_otp(&email, OtpPurpose::SignUp).await;
                self.complete_otp_issued(ticket, issued)
            }
        }
    }

    /// Submit the sign-up OTP: verify, then complete registration.
    pub async fn submit_sign_up_otp(&mut self) -> AuthResult<FlowProgress> {
        self.expect_step(FlowStep::OtpSignUp)?;
        if let Some(reason) = validate::otp(&self.draft) {
            return Ok(FlowProgress::Blocked(reason));
        }
        let Some(ticket) = self.begin() else {
            return Ok(FlowProgress::Ignored);
        };

        let otp = self.draft.otp.clone();
        let verified = self.gateway.verify_otp(&otp).await;
        match self.otp_gate(ticket, verified)? {
            Gate::Halted(progress) => Ok(progress),
            Gate::Proceed => {
                let email = self.draft.email.clone();
                let password = self.draft.password.clone();
                let created = self.gateway.sign_up(&email, &password).await;
                self.complete_sign_up(ticket, created)
            }
        }
    }

    /// Submit the forgot-password form: existence check, then OTP issuance.
    pub async fn submit_forgot_password(&mut self) -> AuthResult<FlowProgress> {
        self.expect_step(FlowStep::ForgotPassword)?;
        if let Some(reason) = validate::email(&self.draft) {
            return Ok(FlowProgress::Blocked(reason));
        }
        let Some(ticket) = self.begin() else {
            return Ok(FlowProgress::Ignored);
        };

        let email = self.draft.email.clone();
        let existence = self.gateway.user_exists(&email).await;
        match self.registration_gate(ticket, existence, true)? {
            Gate::Halted(progress) => Ok(progress),
            Gate::Proceed => {
                let issued = self
                    .gateway
                    .generate_otp(&email, OtpPurpose::PasswordReset)
                    .await;
                self.complete_otp_issued(ticket, issued)
            }
        }
    }

    /// Submit the reset OTP.
    pub async fn submit_reset_otp(&mut self) -> AuthResult<FlowProgress> {
        self.expect_step(FlowStep::OtpReset)?;
        if let Some(reason) = validate::otp(&self.draft) {
            return Ok(FlowProgress::Blocked(reason));
        }
        let Some(ticket) = self.begin() else {
            return Ok(FlowProgress::Ignored);
        };

        let otp = self.draft.otp.clone();
        let verified = self.gateway.verify_otp(&otp).await;
        self.complete_reset_otp(ticket, verified)
    }

    /// Submit the new password after a verified reset.
    pub async fn submit_new_password(&mut self) -> AuthResult<FlowProgress> {
        self.expect_step(FlowStep::EnterNewPassword)?;
        if let Some(reason) = validate::new_password(&self.draft) {
            return Ok(FlowProgress::Blocked(reason));
        }
        let Some(ticket) = self.begin() else {
            return Ok(FlowProgress::Ignored);
        };

        let email = self.draft.email.clone();
        let password = self.draft.password.clone();
        let outcome = self.gateway.reset_password(&email, &password).await;
        self.complete_new_password(ticket, outcome)
    }

    // ==========================================
    // Call lifecycle
    // ==========================================

    fn expect_step(&self, step: FlowStep) -> AuthResult<()> {
        if self.step() == step {
            Ok(())
        } else {
            Err(AuthError::InvalidStateTransition(format!(
                "Expected step {:?}, currently in {:?}",
                step,
                self.step()
            )))
        }
    }

    /// Start a call: rejected while another call is in flight or after the
    /// flow finished. Clears the pending message for the new attempt.
    fn begin(&mut self) -> Option<CallTicket> {
        if self.finished || self.loading {
            return None;
        }
        self.message = None;
        self.loading = true;
        Some(CallTicket {
            generation: self.generation,
        })
    }

    fn ticket_current(&self, ticket: CallTicket) -> bool {
        !self.finished && ticket.generation == self.generation
    }

    /// Accept a completion: false means the step changed while the call
    /// was in flight and the result must be dropped.
    fn accept(&mut self, ticket: CallTicket) -> bool {
        if !self.ticket_current(ticket) {
            return false;
        }
        self.loading = false;
        true
    }

    fn stay_with_message(&mut self, message: String) -> AuthResult<FlowProgress> {
        self.message = Some(message);
        Ok(FlowProgress::Stayed)
    }

    fn stay_after_transport_failure(&mut self, error: AuthError) -> AuthResult<FlowProgress> {
        warn!(error = %error, step = ?self.step(), "Gateway call failed");
        self.stay_with_message(MSG_GENERIC_FAILURE.to_string())
    }

    /// Gate on the existence check. One operation serves two flows with
    /// inverted interpretations: sign-up proceeds when the email is NOT
    /// registered (`expect_registered = false`), password reset proceeds
    /// when it IS (`expect_registered = true`).
    fn registration_gate(
        &mut self,
        ticket: CallTicket,
        outcome: GatewayResult<Registration>,
        expect_registered: bool,
    ) -> AuthResult<Gate> {
        if !self.ticket_current(ticket) {
            return Ok(Gate::Halted(FlowProgress::Ignored));
        }
        match outcome {
            Ok(CallOutcome::Accepted(registration)) => {
                let registered = registration == Registration::Registered;
                if registered == expect_registered {
                    Ok(Gate::Proceed)
                } else {
                    self.loading = false;
                    let message = if expect_registered {
                        MSG_NOT_REGISTERED
                    } else {
                        MSG_ALREADY_REGISTERED
                    };
                    Ok(Gate::Halted(self.stay_with_message(message.to_string())?))
                }
            }
            Ok(CallOutcome::Rejected(message)) => {
                self.loading = false;
                Ok(Gate::Halted(self.stay_with_message(message)?))
            }
            Err(e) => {
                self.loading = false;
                Ok(Gate::Halted(self.stay_after_transport_failure(e)?))
            }
        }
    }

    /// Gate on OTP verification before completing registration.
    fn otp_gate(&mut self, ticket: CallTicket, outcome: GatewayResult<()>) -> AuthResult<Gate> {
        if !self.ticket_current(ticket) {
            return Ok(Gate::Halted(FlowProgress::Ignored));
        }
        match outcome {
            Ok(CallOutcome::Accepted(())) => Ok(Gate::Proceed),
            Ok(CallOutcome::Rejected(message)) => {
                self.loading = false;
                Ok(Gate::Halted(self.stay_with_message(message)?))
            }
            Err(e) => {
                self.loading = false;
                Ok(Gate::Halted(self.stay_after_transport_failure(e)?))
            }
        }
    }

    pub(crate) fn complete_sign_in(
        &mut self,
        ticket: CallTicket,
        outcome: GatewayResult<()>,
    ) -> AuthResult<FlowProgress> {
        if !self.accept(ticket) {
            return Ok(FlowProgress::Ignored);
        }
        match outcome {
            Ok(CallOutcome::Accepted(())) => {
                let email = self.draft.email.clone();
                self.finish_authenticated(&email, true)
            }
            Ok(CallOutcome::Rejected(message)) => self.stay_with_message(message),
            Err(e) => self.stay_after_transport_failure(e),
        }
    }

    pub(crate) fn complete_federated(
        &mut self,
        ticket: CallTicket,
        outcome: GatewayResult<FederatedIdentity>,
    ) -> AuthResult<FlowProgress> {
        if !self.accept(ticket) {
            return Ok(FlowProgress::Ignored);
        }
        match outcome {
            Ok(CallOutcome::Accepted(identity)) => {
                let email = identity.email;
                self.finish_authenticated(&email, false)
            }
            Ok(CallOutcome::Rejected(message)) => self.stay_with_message(message),
            Err(e) => self.stay_after_transport_failure(e),
        }
    }

    pub(crate) fn complete_otp_issued(
        &mut self,
        ticket: CallTicket,
        outcome: GatewayResult<()>,
    ) -> AuthResult<FlowProgress> {
        if !self.accept(ticket) {
            return Ok(FlowProgress::Ignored);
        }
        match outcome {
            Ok(CallOutcome::Accepted(())) => {
                self.transition(&FlowMachineInput::OtpIssued)?;
                Ok(FlowProgress::Advanced)
            }
            Ok(CallOutcome::Rejected(message)) => self.stay_with_message(message),
            Err(e) => self.stay_after_transport_failure(e),
        }
    }

    pub(crate) fn complete_sign_up(
        &mut self,
        ticket: CallTicket,
        outcome: GatewayResult<()>,
    ) -> AuthResult<FlowProgress> {
        if !self.accept(ticket) {
            return Ok(FlowProgress::Ignored);
        }
        match outcome {
            Ok(CallOutcome::Accepted(())) => {
                let email = self.draft.email.clone();
                self.finish_authenticated(&email, true)
            }
            Ok(CallOutcome::Rejected(message)) => self.stay_with_message(message),
            Err(e) => self.stay_after_transport_failure(e),
        }
    }

    pub(crate) fn complete_reset_otp(
        &mut self,
        ticket: CallTicket,
        outcome: GatewayResult<()>,
    ) -> AuthResult<FlowProgress> {
        if !self.accept(ticket) {
            return Ok(FlowProgress::Ignored);
        }
        match outcome {
            Ok(CallOutcome::Accepted(())) => {
                self.transition(&FlowMachineInput::OtpAccepted)?;
                Ok(FlowProgress::Advanced)
            }
            Ok(CallOutcome::Rejected(message)) => self.stay_with_message(message),
            Err(e) => self.stay_after_transport_failure(e),
        }
    }

    pub(crate) fn complete_new_password(
        &mut self,
        ticket: CallTicket,
        outcome: GatewayResult<()>,
    ) -> AuthResult<FlowProgress> {
        if !self.accept(ticket) {
            return Ok(FlowProgress::Ignored);
        }
        match outcome {
            Ok(CallOutcome::Accepted(())) => {
                self.reset_complete = true;
                self.stay_with_message(MSG_RESET_SUCCESS.to_string())
            }
            Ok(CallOutcome::Rejected(message)) => self.stay_with_message(message),
            Err(e) => self.stay_after_transport_failure(e),
        }
    }

    /// Terminal success: persist the session and tear the flow down. A
    /// failed session write propagates and the flow stays live: there is
    /// never a redirect without a persisted session.
    fn finish_authenticated(
        &mut self,
        email: &str,
        has_local_password: bool,
    ) -> AuthResult<FlowProgress> {
        let redirect = self.bootstrap.establish(email, has_local_password)?;
        self.finished = true;
        Ok(FlowProgress::Authenticated(redirect))
    }

    #[cfg(test)]
    pub(crate) fn begin_for_test(&mut self) -> Option<CallTicket> {
        self.begin()
    }
}

mod validate {
    //! Client-side gating. These checks run before any gateway call; a
    //! failed check means the submission is blocked, not that a message
    //! round-tripped from the server.

    use super::CredentialDraft;

    pub(super) fn sign_in(draft: &CredentialDraft) -> Option<&'static str> {
        if draft.email.is_empty() || draft.password.is_empty() {
            return Some("Email and password are required");
        }
        None
    }

    pub(super) fn sign_up(draft: &CredentialDraft) -> Option<&'static str> {
        if draft.email.is_empty() || draft.password.is_empty() {
            return Some("Email and password are required");
        }
        if draft.password != draft.confirm_password {
            return Some("Passwords do not match");
        }
        None
    }

    pub(super) fn email(draft: &CredentialDraft) -> Option<&'static str> {
        if draft.email.is_empty() {
            return Some("Email is required");
        }
        None
    }

    pub(super) fn otp(draft: &CredentialDraft) -> Option<&'static str> {
        if draft.otp.len() != 6 || !draft.otp.bytes().all(|b| b.is_ascii_digit()) {
            return Some("Enter the 6-digit code");
        }
        None
    }

    pub(super) fn new_password(draft: &CredentialDraft) -> Option<&'static str> {
        if draft.password.is_empty() {
            return Some("Password is required");
        }
        if draft.password != draft.confirm_password {
            return Some("Passwords do not match");
        }
        None
    }
}

//! Authentication flow state machine using rust-fsm.
//!
//! Each state is one step of the credential flow; inputs are either user
//! navigation or the outcome of a gateway call. Transitions outside the
//! table are rejected by the machine, so illegal jumps (e.g. straight from
//! `SignUp` to `EnterNewPassword`) cannot happen.
//!
//! ## State Diagram
//!
//! ```text
//!        GoSignUp                        GoSignIn
//! SignIn ─────────► SignUp       SignUp ─────────► SignIn
//!   │                  │
//!   │ GoForgotPassword │ OtpIssued
//!   ▼                  ▼
//! ForgotPassword    OtpSignUp ──Back──► SignUp
//!   │
//!   │ OtpIssued
//!   ▼
//! OtpReset ──OtpAccepted──► EnterNewPassword ──GoSignIn──► SignIn
//!   │
//!   └──Back──► ForgotPassword        ForgotPassword ──Back──► SignIn
//! ```
//!
//! Successful authentication is not a state: it tears the flow down (see
//! the controller's bootstrap handoff).

use rust_fsm::*;
use serde::{Deserialize, Serialize};

// Generates a module `flow_machine` with:
// - flow_machine::State (enum)
// - flow_machine::Input (enum)
// - flow_machine::StateMachine (type alias)
state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub flow_machine(SignIn)

    SignIn => {
        GoSignUp => SignUp,
        GoForgotPassword => ForgotPassword
    },
    SignUp => {
        GoSignIn => SignIn,
        OtpIssued => OtpSignUp
    },
    OtpSignUp => {
        Back => SignUp
    },
    ForgotPassword => {
        Back => SignIn,
        OtpIssued => OtpReset
    },
    OtpReset => {
        Back => ForgotPassword,
        OtpAccepted => EnterNewPassword
    },
    EnterNewPassword => {
        GoSignIn => SignIn
    }
}

// Re-export the generated types with clearer names
pub use flow_machine::Input as FlowMachineInput;
pub use flow_machine::State as FlowMachineState;
pub use flow_machine::StateMachine as FlowMachine;

/// The step a caller should present, as a plain enum for UI/serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    /// Email + password sign-in (also hosts the federated affordance).
    SignIn,
    /// Email + password + confirmation for a new account.
    SignUp,
    /// 6-digit code confirming email ownership during sign-up.
    OtpSignUp,
    /// Email collection for a password reset.
    ForgotPassword,
    /// 6-digit code confirming email ownership during reset.
    OtpReset,
    /// New password + confirmation after a verified reset.
    EnterNewPassword,
}

impl FlowStep {
    /// Steps that collect a one-time password.
    pub fn is_otp_step(&self) -> bool {
        matches!(self, FlowStep::OtpSignUp | FlowStep::OtpReset)
    }
}

impl From<&FlowMachineState> for FlowStep {
    fn from(state: &FlowMachineState) -> Self {
        match state {
            FlowMachineState::SignIn => FlowStep::SignIn,
            FlowMachineState::SignUp => FlowStep::SignUp,
            FlowMachineState::OtpSignUp => FlowStep::OtpSignUp,
            FlowMachineState::ForgotPassword => FlowStep::ForgotPassword,
            FlowMachineState::OtpReset => FlowStep::OtpReset,
            FlowMachineState::EnterNewPassword => FlowStep::EnterNewPassword,
        }
    }
}

/// Where the flow may start: callers open it on either entry page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstStep {
    SignIn,
    SignUp,
}

impl FirstStep {
    pub(crate) fn machine(self) -> FlowMachine {
        match self {
            FirstStep::SignIn => FlowMachine::from_state(FlowMachineState::SignIn),
            FirstStep::SignUp => FlowMachine::from_state(FlowMachineState::SignUp),
        }
    }
}

//! Authentication flow for the Kriya client.
//!
//! This crate provides:
//! - An explicit FSM for the sign-in / sign-up / OTP / reset flow
//! - A REST gateway client with normalized success/rejection semantics
//! - The flow controller tying steps, drafts, and gateway calls together
//! - Session bootstrap into durable storage plus the protected-area redirect
//! - The post-auth password upgrade for federated accounts

mod bootstrap;
mod controller;
mod error;
mod flow;
mod gateway;
mod upgrade;

pub use bootstrap::{Redirect, SessionBootstrap, PROTECTED_ENTRY};
pub use controller::{CredentialDraft, FlowController, FlowProgress};
pub use error::{AuthError, AuthResult};
pub use flow::{FirstStep, FlowMachine, FlowMachineInput, FlowMachineState, FlowStep};
pub use flow::flow_machine;
pub use gateway::{
    AuthGateway, CallOutcome, FederatedIdentity, GatewayResult, OtpPurpose, Registration,
};
pub use upgrade::{PasswordUpgrade, UpgradeOutcome};

//! Job management client for the Kriya backend.
//!
//! Every operation here is one credentialed request against the REST API;
//! there is no ordering or client-side state to maintain. The session
//! cookie comes from the shared HTTP client established at sign-in.

mod client;
mod job;

pub use client::JobsClient;
pub use job::{CallbackTest, Job, JobDraft, JobMethod};

use thiserror::Error;

/// Error type for job operations.
#[derive(Error, Debug)]
pub enum JobsError {
    /// Network-level failure or undecodable body
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the API
    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Draft failed client-side validation
    #[error("Invalid job: {0}")]
    InvalidDraft(String),
}

/// Result type for job operations.
pub type JobsResult<T> = Result<T, JobsError>;

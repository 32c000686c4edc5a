//! Job entity and draft validation.

use crate::{JobsError, JobsResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::Url;

/// HTTP method used when the scheduler fires the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobMethod {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
}

impl std::fmt::Display for JobMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobMethod::Get => write!(f, "GET"),
            JobMethod::Post => write!(f, "POST"),
        }
    }
}

/// A scheduled job as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Server-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    /// 5-field cron schedule, evaluated server-side.
    pub cron_expression: String,
    pub callback_url: String,
    pub method: JobMethod,
    /// Request body sent with POST callbacks.
    #[serde(default)]
    pub body: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub last_executed: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Fields for creating or updating a job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub name: String,
    pub description: String,
    pub cron_expression: String,
    pub callback_url: String,
    pub method: JobMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub is_active: bool,
}

/// Result of probing a callback URL before saving a job.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackTest {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn cron_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(\*|[0-5]?\d)(/\d+)? (\*|1?\d|2[0-3])(/\d+)? (\*|[1-9]|[12]\d|3[01])(/\d+)? (\*|[1-9]|1[0-2])(/\d+)? (\*|[0-6])(/\d+)?$",
        )
        .expect("cron pattern is valid")
    })
}

impl JobDraft {
    /// Validate the draft before it reaches the API.
    pub fn validate(&self) -> JobsResult<()> {
        if self.name.trim().is_empty() {
            return Err(JobsError::InvalidDraft("Name is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(JobsError::InvalidDraft(
                "Description is required".to_string(),
            ));
        }
        if self.cron_expression.trim().is_empty() {
            return Err(JobsError::InvalidDraft(
                "Cron expression is required".to_string(),
            ));
        }
        if !cron_regex().is_match(self.cron_expression.trim()) {
            return Err(JobsError::InvalidDraft(
                "Invalid cron expression format".to_string(),
            ));
        }
        if self.callback_url.trim().is_empty() {
            return Err(JobsError::InvalidDraft(
                "Callback URL is required".to_string(),
            ));
        }
        if Url::parse(self.callback_url.trim()).is_err() {
            return Err(JobsError::InvalidDraft("Invalid URL format".to_string()));
        }
        Ok(())
    }
}

//! REST client for job endpoints.

use crate::{CallbackTest, Job, JobDraft, JobMethod, JobsError, JobsResult};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct JobsEnvelope {
    #[serde(default)]
    jobs: Vec<Job>,
}

#[derive(Debug, Deserialize)]
struct JobEnvelope {
    job: Job,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the job management endpoints.
#[derive(Clone)]
pub struct JobsClient {
    http_client: reqwest::Client,
    api_url: String,
}

impl JobsClient {
    /// Create a new jobs client.
    ///
    /// The `http_client` must share the cookie jar with the auth gateway so
    /// requests carry the session established at sign-in.
    pub fn new(http_client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            http_client,
            api_url: api_url.into(),
        }
    }

    /// Build the URL for a job endpoint.
    fn job_url(&self, suffix: &str) -> String {
        if suffix.is_empty() {
            format!("{}/api/job", self.api_url)
        } else {
            format!("{}/api/job/{}", self.api_url, suffix)
        }
    }

    /// Fetch all jobs for the signed-in account.
    pub async fn list(&self) -> JobsResult<Vec<Job>> {
        let url = self.job_url("");
        debug!(url = %url, "Listing jobs");
        let response = self.http_client.get(&url).send().await?;
        let envelope: JobsEnvelope = decode(response).await?;
        Ok(envelope.jobs)
    }

    /// Fetch a single job.
    pub async fn get(&self, id: &str) -> JobsResult<Job> {
        let response = self.http_client.get(self.job_url(id)).send().await?;
        let envelope: JobEnvelope = decode(response).await?;
        Ok(envelope.job)
    }

    /// Create a job from a validated draft.
    pub async fn create(&self, draft: &JobDraft) -> JobsResult<Job> {
        draft.validate()?;
        let response = self
            .http_client
            .post(self.job_url(""))
            .json(draft)
            .send()
            .await?;
        let envelope: JobEnvelope = decode(response).await?;
        Ok(envelope.job)
    }

    /// Replace a job's fields.
    pub async fn update(&self, id: &str, draft: &JobDraft) -> JobsResult<Job> {
        draft.validate()?;
        let response = self
            .http_client
            .put(self.job_url(id))
            .json(draft)
            .send()
            .await?;
        let envelope: JobEnvelope = decode(response).await?;
        Ok(envelope.job)
    }

    /// Delete a job.
    pub async fn delete(&self, id: &str) -> JobsResult<()> {
        let response = self.http_client.delete(self.job_url(id)).send().await?;
        expect_success(response).await
    }

    /// Trigger a job immediately, outside its schedule.
    pub async fn execute(&self, id: &str) -> JobsResult<()> {
        let response = self
            .http_client
            .post(self.job_url(&format!("{id}/execute")))
            .send()
            .await?;
        expect_success(response).await
    }

    /// Probe a callback URL the way the scheduler would call it.
    pub async fn test_callback(
        &self,
        callback_url: &str,
        method: JobMethod,
        body: Option<&str>,
    ) -> JobsResult<CallbackTest> {
        let mut payload = serde_json::json!({
            "callbackUrl": callback_url,
            "method": method,
        });
        // Body only travels with POST callbacks.
        if method == JobMethod::Post {
            if let Some(body) = body {
                payload["body"] = serde_json::json!(body);
            }
        }

        let response = self
            .http_client
            .post(self.job_url("test-callback"))
            .json(&payload)
            .send()
            .await?;
        decode(response).await
    }
}

async fn api_error(response: reqwest::Response) -> JobsError {
    let status = response.status().as_u16();
    let message = match response.json::<ApiMessage>().await {
        Ok(ApiMessage { message: Some(m) }) => m,
        _ => "request failed".to_string(),
    };
    JobsError::Api { status, message }
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> JobsResult<T> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    Ok(response.json().await?)
}

async fn expect_success(response: reqwest::Response) -> JobsResult<()> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    Ok(())
}

use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;

use crate::backend::InferenceBackend;
use crate::error::{JobError, Result};
use crate::normalize::normalize_output;
use crate::request::CreateJobBody;
use crate::types::{JobHandle, JobStatus, StatusReport};

fn normalize(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}

/// Async HTTP client for the inference boundary.
///
/// Jobs are created with `POST {endpoint}/predictions` and watched with
/// `GET {endpoint}/predictions/{id}`. When a token is set it is sent as
/// `Authorization: Bearer <token>`; provider errors are read from the
/// `detail` field of the response body.
///
/// # Example
/// ```no_run
/// use media_jobs::{GenerationRequest, InferenceBackend, InferenceClient};
///
/// # async fn example() -> media_jobs::Result<()> {
/// let client = InferenceClient::new("https://gen.example.com/api").with_token("sk-...");
/// let body = GenerationRequest::new("a paper boat on a river").to_body()?;
/// let handle = client.create_job(&body).await?;
/// let report = client.job_status(&handle.id).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct InferenceClient {
    http: Client,
    endpoint: String,
    token: Option<String>,
}

impl InferenceClient {
    /// Create a new client pointing at the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: normalize(endpoint.into()),
            token: None,
        }
    }

    /// Use a custom `reqwest::Client` (for connection pooling, timeouts, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Attach a bearer token to every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Returns the configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `{endpoint}/predictions/{id}` with `id` encoded as one path segment.
    fn status_url(&self, id: &str) -> Result<Url> {
        if id.is_empty() || id == "." || id == ".." {
            return Err(JobError::Validation(format!("Invalid job id '{}'", id)));
        }
        let mut url = Url::parse(&self.endpoint).map_err(|e| {
            JobError::Validation(format!("Invalid endpoint {}: {}", self.endpoint, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| JobError::Validation(format!("Invalid endpoint {}", self.endpoint)))?
            .pop_if_empty()
            .push("predictions")
            .push(id);
        Ok(url)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

impl InferenceBackend for InferenceClient {
    async fn create_job(&self, body: &CreateJobBody) -> Result<JobHandle> {
        let url = format!("{}/predictions", self.endpoint);
        let resp = self
            .authorize(self.http.post(&url))
            .timeout(Duration::from_secs(30))
            .json(body)
            .send()
            .await
            .map_err(|e| JobError::Network {
                context: format!("Cannot reach inference endpoint {}", self.endpoint),
                source: e,
            })?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(JobError::Submission {
                status,
                detail: error_detail(&body_text),
            });
        }

        let json: Value = resp.json().await.map_err(|e| JobError::Network {
            context: "Failed to parse job creation response".into(),
            source: e,
        })?;
        let handle = parse_create_response(&json)?;
        tracing::info!(job_id = %handle.id, "generation job accepted");
        Ok(handle)
    }

    async fn job_status(&self, id: &str) -> Result<StatusReport> {
        let url = self.status_url(id)?;
        let resp = self
            .authorize(self.http.get(url))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| JobError::Network {
                context: format!("Failed to fetch status for job {}", id),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(JobError::Http {
                status,
                body: error_detail(&body_text),
            });
        }

        let json: Value = resp.json().await.map_err(|e| JobError::Network {
            context: "Failed to parse job status response".into(),
            source: e,
        })?;
        parse_status_response(&json, id)
    }
}

/// Pull the human-readable message out of an error body. Falls back to the
/// raw body when it is not `{"detail": "..."}`.
pub(crate) fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| match json.get("detail") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
        .unwrap_or_else(|| body.to_string())
}

/// A freshly accepted job is always reported as queued, whatever the
/// provider echoed back.
pub(crate) fn parse_create_response(json: &Value) -> Result<JobHandle> {
    let id = json
        .get("id")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| JobError::InvalidResponse("Job creation response missing id".into()))?;
    Ok(JobHandle {
        id: id.to_string(),
        status: JobStatus::Queued,
    })
}

pub(crate) fn parse_status_response(json: &Value, requested_id: &str) -> Result<StatusReport> {
    let raw_status = json
        .get("status")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            JobError::InvalidResponse(format!("Status response for job {} missing status", requested_id))
        })?;

    let id = json
        .get("id")
        .and_then(|v| v.as_str())
        .unwrap_or(requested_id)
        .to_string();

    Ok(StatusReport {
        id,
        status: JobStatus::from_provider(raw_status),
        output: json.get("output").and_then(normalize_output),
        logs: text_field(json, "logs"),
        error: text_field(json, "error"),
    })
}

fn text_field(json: &Value, key: &str) -> Option<String> {
    match json.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Null) | Some(Value::String(_)) | None => None,
        Some(other) => Some(other.to_string()),
    }
}

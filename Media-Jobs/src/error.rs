use thiserror::Error;

/// Errors returned by media job operations.
#[derive(Error, Debug)]
pub enum JobError {
    /// The request was rejected locally before any network call.
    #[error("Invalid generation request: {0}")]
    Validation(String),

    /// The provider refused to create the job. `detail` is the provider's
    /// own message, untouched.
    #[error("Provider rejected the job (HTTP {status}): {detail}")]
    Submission { status: u16, detail: String },

    /// A status query failed at the transport level. The job's real status
    /// is unknown; this is not the same as the job having failed.
    #[error("Status query for job {job_id} failed: {source}")]
    PollingTransport {
        job_id: String,
        #[source]
        source: Box<JobError>,
    },

    /// The provider returned a non-success HTTP status.
    #[error("Provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response was missing expected fields.
    #[error("{0}")]
    InvalidResponse(String),

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// Local result cache could not be read or written.
    #[error("Library storage error: {0}")]
    Persistence(String),

    /// Polling was torn down before a terminal status was observed.
    #[error("Polling was cancelled")]
    Cancelled,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl JobError {
    /// True when the error happened before anything was sent to the provider.
    pub fn is_validation(&self) -> bool {
        matches!(self, JobError::Validation(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, JobError>;

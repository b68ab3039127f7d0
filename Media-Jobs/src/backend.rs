use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::request::CreateJobBody;
use crate::types::{JobHandle, StatusReport};

/// The inference boundary: whatever accepts generation jobs and reports on
/// them.
///
/// [`InferenceClient`](crate::InferenceClient) is the HTTP implementation.
/// Tests and embedders can supply their own.
///
/// # Example
///
/// ```ignore
/// struct Canned;
///
/// impl InferenceBackend for Canned {
///     async fn create_job(&self, _body: &CreateJobBody) -> Result<JobHandle> {
///         Ok(JobHandle { id: "job-1".into(), status: JobStatus::Queued })
///     }
///
///     async fn job_status(&self, id: &str) -> Result<StatusReport> {
///         Ok(StatusReport { id: id.into(), status: JobStatus::Succeeded, /* ... */ })
///     }
/// }
/// ```
pub trait InferenceBackend: Send + Sync {
    /// Ask the provider to start a job. Called exactly once per submission.
    fn create_job(
        &self,
        body: &CreateJobBody,
    ) -> impl Future<Output = Result<JobHandle>> + Send;

    /// Fetch the current status of a job, output already normalized.
    fn job_status(&self, id: &str) -> impl Future<Output = Result<StatusReport>> + Send;
}

impl<B: InferenceBackend> InferenceBackend for Arc<B> {
    fn create_job(
        &self,
        body: &CreateJobBody,
    ) -> impl Future<Output = Result<JobHandle>> + Send {
        (**self).create_job(body)
    }

    fn job_status(&self, id: &str) -> impl Future<Output = Result<StatusReport>> + Send {
        (**self).job_status(id)
    }
}

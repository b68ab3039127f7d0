use crate::backend::InferenceBackend;
use crate::error::Result;
use crate::request::GenerationRequest;
use crate::types::{JobHandle, JobStatus};

/// Validate `request` and hand it to the provider.
///
/// An invalid request returns [`JobError::Validation`](crate::JobError::Validation)
/// without calling the backend. Otherwise the backend is called exactly
/// once; a rejection comes back as
/// [`JobError::Submission`](crate::JobError::Submission) and is not retried.
pub async fn submit<B: InferenceBackend>(
    backend: &B,
    request: &GenerationRequest,
) -> Result<JobHandle> {
    let body = request.to_body()?;
    let handle = backend.create_job(&body).await?;
    tracing::info!(
        job_id = %handle.id,
        duration = request.duration,
        resolution = %request.resolution,
        "submitted generation job"
    );
    Ok(JobHandle {
        id: handle.id,
        status: JobStatus::Queued,
    })
}

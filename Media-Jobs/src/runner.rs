use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::backend::InferenceBackend;
use crate::config::JobConfig;
use crate::error::Result;
use crate::library::{LibraryStorage, ResultCache};
use crate::poller::{PollTask, StatusPoller};
use crate::request::GenerationRequest;
use crate::submit::submit;
use crate::types::{JobHandle, JobReport, LibraryItem, PollOutcome, StatusReport};

/// Drives one generation from submission to the local library.
///
/// Create a `JobRunner` with a backend and a [`ResultCache`], then call
/// [`run()`](Self::run) for the whole lifecycle, or
/// [`submit()`](Self::submit) / [`watch()`](Self::watch) /
/// [`record()`](Self::record) to drive the steps yourself.
///
/// # Example
///
/// ```no_run
/// use media_jobs::*;
/// use std::sync::Arc;
///
/// # async fn example() -> media_jobs::Result<()> {
/// let config = JobConfig::default();
/// let backend = InferenceClient::new(&config.endpoint);
/// let library = Arc::new(ResultCache::from_config(&config));
/// let runner = JobRunner::from_config(backend, library, &config);
///
/// let report = runner
///     .run(&GenerationRequest::new("a koi pond at night"), |r| {
///         println!("{} is {}", r.id, r.status)
///     })
///     .await?;
/// if let Some(item) = report.item {
///     println!("saved {}", item.url);
/// }
/// # Ok(())
/// # }
/// ```
pub struct JobRunner<B, S: LibraryStorage> {
    backend: Arc<B>,
    poller: StatusPoller<B>,
    library: Arc<ResultCache<S>>,
}

impl<B, S> JobRunner<B, S>
where
    B: InferenceBackend + 'static,
    S: LibraryStorage,
{
    /// Create a runner with the default poll interval and no time limit.
    pub fn new(backend: B, library: Arc<ResultCache<S>>) -> Self {
        let backend = Arc::new(backend);
        Self {
            poller: StatusPoller::new(Arc::clone(&backend)),
            backend,
            library,
        }
    }

    /// Create a runner with polling settings taken from `config`.
    pub fn from_config(backend: B, library: Arc<ResultCache<S>>, config: &JobConfig) -> Self {
        let backend = Arc::new(backend);
        Self {
            poller: StatusPoller::from_config(Arc::clone(&backend), config),
            backend,
            library,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poller = self.poller.with_interval(interval);
        self
    }

    pub fn with_max_poll_duration(mut self, limit: Duration) -> Self {
        self.poller = self.poller.with_max_duration(limit);
        self
    }

    pub fn library(&self) -> &ResultCache<S> {
        &self.library
    }

    pub fn poller(&self) -> &StatusPoller<B> {
        &self.poller
    }

    /// Validate and submit. See [`submit`](crate::submit::submit).
    pub async fn submit(&self, request: &GenerationRequest) -> Result<JobHandle> {
        submit(self.backend.as_ref(), request).await
    }

    /// Poll a submitted job in place until it stops.
    pub async fn watch<F>(&self, handle: &JobHandle, on_update: F) -> Result<PollOutcome>
    where
        F: FnMut(&StatusReport),
    {
        self.poller.poll(&handle.id, on_update).await
    }

    /// Poll a submitted job on a background task.
    pub fn watch_in_background<F>(&self, handle: &JobHandle, on_update: F) -> PollTask
    where
        F: FnMut(&StatusReport) + Send + 'static,
    {
        self.poller.spawn(handle.id.clone(), on_update)
    }

    /// Add a finished job to the library. Only a success with a resolvable
    /// URL produces an item.
    pub fn record(
        &self,
        request: &GenerationRequest,
        handle: &JobHandle,
        outcome: &PollOutcome,
    ) -> Option<LibraryItem> {
        let url = match outcome {
            PollOutcome::Succeeded { output: Some(url) } => url.clone(),
            PollOutcome::Succeeded { output: None } => {
                tracing::warn!(job_id = %handle.id, "job succeeded without a usable output");
                return None;
            }
            _ => return None,
        };

        let item = LibraryItem {
            id: handle.id.clone(),
            prompt: request.prompt.clone(),
            duration: request.duration,
            resolution: request.resolution,
            url,
            created_at: Utc::now(),
        };
        self.library.append(item.clone());
        Some(item)
    }

    /// Submit, poll until terminal, and record a success in the library.
    pub async fn run<F>(&self, request: &GenerationRequest, on_update: F) -> Result<JobReport>
    where
        F: FnMut(&StatusReport),
    {
        let handle = self.submit(request).await?;
        let outcome = self.watch(&handle, on_update).await?;
        let item = self.record(request, &handle, &outcome);
        Ok(JobReport {
            handle,
            outcome,
            item,
        })
    }
}

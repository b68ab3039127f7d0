use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::backend::InferenceBackend;
use crate::config::{JobConfig, DEFAULT_POLL_INTERVAL};
use crate::error::{JobError, Result};
use crate::types::{PollOutcome, StatusReport};

/// Watches a job by querying its status on a fixed interval.
///
/// The first query goes out immediately, then one per interval. The first
/// terminal status ends the watch; nothing after it is looked at. A query
/// that fails at the transport level also ends the watch, as
/// [`JobError::PollingTransport`]: the job's real status is then unknown,
/// which is deliberately not reported as a failure.
///
/// There is no attempt limit and, unless [`with_max_duration`](Self::with_max_duration)
/// is set, no overall timeout.
pub struct StatusPoller<B> {
    backend: Arc<B>,
    interval: Duration,
    max_duration: Option<Duration>,
}

impl<B> Clone for StatusPoller<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            interval: self.interval,
            max_duration: self.max_duration,
        }
    }
}

impl<B> std::fmt::Debug for StatusPoller<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusPoller")
            .field("interval", &self.interval)
            .field("max_duration", &self.max_duration)
            .finish()
    }
}

impl<B: InferenceBackend + 'static> StatusPoller<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            interval: DEFAULT_POLL_INTERVAL,
            max_duration: None,
        }
    }

    /// Take interval and time limit from `config`.
    pub fn from_config(backend: Arc<B>, config: &JobConfig) -> Self {
        Self {
            backend,
            interval: config.poll_interval,
            max_duration: config.max_poll_duration,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Stop with [`PollOutcome::TimedOut`] once `limit` has passed.
    pub fn with_max_duration(mut self, limit: Duration) -> Self {
        self.max_duration = Some(limit);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll until the job reaches a terminal status. `on_update` sees every
    /// report, including the terminal one.
    ///
    /// Dropping the returned future stops polling at its next await point.
    pub async fn poll<F>(&self, job_id: &str, on_update: F) -> Result<PollOutcome>
    where
        F: FnMut(&StatusReport),
    {
        self.run(job_id, None, on_update).await
    }

    /// Poll on a background task. The returned [`PollTask`] stops the
    /// polling when cancelled or dropped.
    pub fn spawn<F>(&self, job_id: impl Into<String>, on_update: F) -> PollTask
    where
        F: FnMut(&StatusReport) + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let poller = self.clone();
        let job_id = job_id.into();
        let flag = Arc::clone(&cancelled);
        let handle = tokio::spawn(async move {
            poller.run(&job_id, Some(flag.as_ref()), on_update).await
        });
        PollTask {
            cancelled,
            handle: Some(handle),
        }
    }

    async fn run<F>(
        &self,
        job_id: &str,
        cancelled: Option<&AtomicBool>,
        mut on_update: F,
    ) -> Result<PollOutcome>
    where
        F: FnMut(&StatusReport),
    {
        let is_cancelled = || cancelled.is_some_and(|c| c.load(Ordering::SeqCst));
        let start = Instant::now();
        let mut attempt: u64 = 0;

        loop {
            if is_cancelled() {
                return Err(JobError::Cancelled);
            }
            if let Some(limit) = self.max_duration {
                if start.elapsed() >= limit {
                    tracing::warn!(job_id, attempts = attempt, "gave up waiting for job");
                    return Ok(PollOutcome::TimedOut);
                }
            }

            attempt += 1;
            let report = self.backend.job_status(job_id).await.map_err(|e| {
                tracing::warn!(job_id, attempt, error = %e, "status query failed, status unknown");
                JobError::PollingTransport {
                    job_id: job_id.to_string(),
                    source: Box::new(e),
                }
            })?;

            // A teardown that raced the query: drop the answer unseen.
            if is_cancelled() {
                return Err(JobError::Cancelled);
            }

            tracing::debug!(job_id, attempt, status = %report.status, "polled job status");
            on_update(&report);

            if let Some(outcome) = PollOutcome::from_terminal(&report) {
                tracing::info!(job_id, attempts = attempt, status = %report.status, "job finished");
                return Ok(outcome);
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}

/// A poll running on a background task.
///
/// [`cancel`](Self::cancel) (or dropping the task) stops it: no status
/// query is issued and no update is delivered after that point.
#[derive(Debug)]
pub struct PollTask {
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<Result<PollOutcome>>>,
}

impl PollTask {
    /// Stop polling now.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether the poll loop has stopped, for any reason.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Wait for the outcome. A cancelled task yields [`JobError::Cancelled`].
    pub async fn join(mut self) -> Result<PollOutcome> {
        let Some(handle) = self.handle.take() else {
            return Err(JobError::Cancelled);
        };
        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(JobError::Cancelled),
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::CreateJobBody;
    use crate::types::{JobHandle, JobStatus};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct Script {
        statuses: Mutex<Vec<JobStatus>>,
        calls: AtomicUsize,
    }

    impl Script {
        fn new(statuses: &[JobStatus]) -> Arc<Self> {
            let mut statuses = statuses.to_vec();
            statuses.reverse();
            Arc::new(Self {
                statuses: Mutex::new(statuses),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl InferenceBackend for Script {
        async fn create_job(&self, _body: &CreateJobBody) -> Result<JobHandle> {
            unreachable!("poller never creates jobs")
        }

        async fn job_status(&self, id: &str) -> Result<StatusReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let status = self.statuses.lock().unwrap().pop().unwrap_or(JobStatus::Running);
            Ok(StatusReport {
                id: id.to_string(),
                status,
                output: (status == JobStatus::Succeeded).then(|| "https://x/v.mp4".to_string()),
                logs: None,
                error: None,
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_query_is_immediate() {
        let script = Script::new(&[JobStatus::Succeeded]);
        let poller = StatusPoller::new(Arc::clone(&script));
        let started = Instant::now();
        let outcome = poller.poll("job", |_| {}).await.unwrap();
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(outcome.url(), Some("https://x/v.mp4"));
        assert_eq!(script.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_one_interval_between_queries() {
        let script = Script::new(&[JobStatus::Queued, JobStatus::Running, JobStatus::Failed]);
        let poller = StatusPoller::new(Arc::clone(&script)).with_interval(Duration::from_secs(2));
        let started = Instant::now();
        let outcome = poller.poll("job", |_| {}).await.unwrap();
        assert_eq!(started.elapsed().as_secs(), 4);
        assert_eq!(outcome, PollOutcome::Failed { error: None });
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_duration_times_out() {
        let script = Script::new(&[]);
        let poller = StatusPoller::new(Arc::clone(&script))
            .with_interval(Duration::from_secs(2))
            .with_max_duration(Duration::from_secs(5));
        let outcome = poller.poll("job", |_| {}).await.unwrap();
        assert_eq!(outcome, PollOutcome::TimedOut);
        // Queries at 0s, 2s and 4s; the 6s check is past the limit.
        assert_eq!(script.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_after_cancel() {
        let script = Script::new(&[]);
        let poller = StatusPoller::new(Arc::clone(&script));
        let task = poller.spawn("job", |_| {});
        task.cancel();
        assert!(task.is_cancelled());
        assert!(matches!(task.join().await, Err(JobError::Cancelled)));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output resolutions the generation form offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "480p")]
    P480,
    #[default]
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

impl Resolution {
    pub const ALL: [Resolution; 3] = [Resolution::P480, Resolution::P720, Resolution::P1080];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::P480 => "480p",
            Resolution::P720 => "720p",
            Resolution::P1080 => "1080p",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Resolution::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| format!("unsupported resolution '{}' (expected 480p, 720p or 1080p)", s))
    }
}

/// Job status lifecycle: Queued -> Running -> Succeeded/Failed/Canceled
///
/// Providers use their own words for these; [`JobStatus::from_provider`]
/// folds them into this closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
        }
    }

    /// Map a provider status word onto the closed set. Returns `None` for
    /// words no known provider uses.
    pub fn parse(word: &str) -> Option<Self> {
        match word.trim().to_ascii_lowercase().as_str() {
            "starting" | "queued" | "pending" | "in_queue" | "submitted" => Some(JobStatus::Queued),
            "processing" | "running" | "in_progress" | "throttled" => Some(JobStatus::Running),
            "succeeded" | "success" | "successful" | "completed" | "complete" => {
                Some(JobStatus::Succeeded)
            }
            "failed" | "failure" | "error" => Some(JobStatus::Failed),
            "canceled" | "cancelled" | "aborted" => Some(JobStatus::Canceled),
            _ => None,
        }
    }

    /// Like [`parse`](Self::parse), but unknown words count as still running
    /// so the poller keeps watching instead of guessing at an outcome.
    pub fn from_provider(word: &str) -> Self {
        Self::parse(word).unwrap_or_else(|| {
            tracing::warn!(status = word, "unrecognised provider status, treating as running");
            JobStatus::Running
        })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Canceled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job the provider has accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: String,
    pub status: JobStatus,
}

/// One status observation, with the output already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub id: String,
    pub status: JobStatus,
    /// Result location, if the provider has produced a resolvable one.
    pub output: Option<String>,
    pub logs: Option<String>,
    pub error: Option<String>,
}

/// Outcome of watching a job until it stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Provider reports success. `output` is `None` when nothing resolvable
    /// came back.
    Succeeded { output: Option<String> },
    /// Provider reports failure, with its message when it gave one.
    Failed { error: Option<String> },
    /// Provider reports the job was canceled.
    Canceled { error: Option<String> },
    /// Gave up after the configured maximum poll duration.
    TimedOut,
}

impl PollOutcome {
    pub(crate) fn from_terminal(report: &StatusReport) -> Option<Self> {
        match report.status {
            JobStatus::Succeeded => Some(PollOutcome::Succeeded {
                output: report.output.clone(),
            }),
            JobStatus::Failed => Some(PollOutcome::Failed {
                error: report.error.clone(),
            }),
            JobStatus::Canceled => Some(PollOutcome::Canceled {
                error: report.error.clone(),
            }),
            JobStatus::Queued | JobStatus::Running => None,
        }
    }

    /// The result location, only for a success that resolved one.
    pub fn url(&self) -> Option<&str> {
        match self {
            PollOutcome::Succeeded { output } => output.as_deref(),
            _ => None,
        }
    }
}

/// A completed generation kept in the local library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    pub id: String,
    pub prompt: String,
    pub duration: u32,
    pub resolution: Resolution,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Everything a finished [`JobRunner::run`](crate::JobRunner::run) produced.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub handle: JobHandle,
    pub outcome: PollOutcome,
    /// Set only when the job succeeded with a resolvable URL.
    pub item: Option<LibraryItem>,
}

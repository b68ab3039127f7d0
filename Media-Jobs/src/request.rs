use serde::Serialize;

use crate::error::{JobError, Result};
use crate::types::Resolution;

/// Shortest clip the generation form allows, in seconds.
pub const MIN_DURATION_SECS: u32 = 2;
/// Longest clip the generation form allows, in seconds.
pub const MAX_DURATION_SECS: u32 = 10;
/// Duration used when the caller does not pick one.
pub const DEFAULT_DURATION_SECS: u32 = 5;

/// Builder for a text-to-video generation request.
///
/// # Example
/// ```
/// use media_jobs::{GenerationRequest, Resolution};
///
/// let request = GenerationRequest::new("a lighthouse in a storm")
///     .duration(6)
///     .resolution(Resolution::P1080);
///
/// assert!(request.validate().is_ok());
/// let body = request.to_body().unwrap();
/// assert!(body.enhance_prompt);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub duration: u32,
    pub resolution: Resolution,
}

impl GenerationRequest {
    /// Create a request with the default duration (5s) and resolution (720p).
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            duration: DEFAULT_DURATION_SECS,
            resolution: Resolution::default(),
        }
    }

    /// Set the clip length in seconds.
    pub fn duration(mut self, secs: u32) -> Self {
        self.duration = secs;
        self
    }

    /// Set the output resolution.
    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Check the request without touching the network.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(JobError::Validation("prompt must not be empty".into()));
        }
        if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&self.duration) {
            return Err(JobError::Validation(format!(
                "duration must be between {} and {} seconds (got {})",
                MIN_DURATION_SECS, MAX_DURATION_SECS, self.duration
            )));
        }
        Ok(())
    }

    /// Validate and build the creation payload sent to the provider.
    pub fn to_body(&self) -> Result<CreateJobBody> {
        self.validate()?;
        Ok(CreateJobBody {
            prompt: self.prompt.clone(),
            duration: self.duration,
            resolution: self.resolution,
            enhance_prompt: true,
        })
    }
}

/// Wire payload for job creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateJobBody {
    pub prompt: String,
    pub duration: u32,
    pub resolution: Resolution,
    /// Always set; asks the provider to rewrite the prompt before generating.
    pub enhance_prompt: bool,
}

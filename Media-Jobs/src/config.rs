use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::library::MAX_LIBRARY_ITEMS;

/// Default delay between two status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Configuration for the media job client.
///
/// Use [`JobConfig::builder()`] for ergonomic construction,
/// [`JobConfig::from_env()`] to read the deployment environment, or
/// [`JobConfig::default()`] for a local setup (no token, unbounded polling,
/// in-memory library).
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Base URL of the inference boundary.
    pub endpoint: String,

    /// Bearer token for the inference boundary.
    pub api_token: Option<String>,

    /// Base URL of the primary backend, for [`BackendProxy`](crate::BackendProxy).
    pub backend_url: Option<String>,

    /// Bearer token attached to proxied backend calls.
    pub backend_token: Option<String>,

    /// Delay between status queries.
    pub poll_interval: Duration,

    /// Stop watching after this long. `None` = poll until terminal.
    pub max_poll_duration: Option<Duration>,

    /// Directory holding the local library file. `None` = in-memory.
    pub library_dir: Option<PathBuf>,

    /// Maximum number of items the library keeps.
    pub library_capacity: usize,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/api".to_string(),
            api_token: None,
            backend_url: None,
            backend_token: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_duration: None,
            library_dir: None,
            library_capacity: MAX_LIBRARY_ITEMS,
        }
    }
}

impl JobConfig {
    /// Start building a config with the builder pattern.
    pub fn builder() -> JobConfigBuilder {
        JobConfigBuilder::default()
    }

    /// Read configuration from the environment (and a `.env` file if present).
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `INFERENCE_API_URL` | `endpoint` |
    /// | `INFERENCE_API_TOKEN` | `api_token` |
    /// | `BACKEND_API_URL` | `backend_url` |
    /// | `BACKEND_API_TOKEN` | `backend_token` |
    /// | `MEDIA_LIBRARY_DIR` | `library_dir` |
    /// | `POLL_INTERVAL_MS` | `poll_interval` |
    /// | `MAX_POLL_SECS` | `max_poll_duration` |
    pub fn from_env() -> anyhow::Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(anyhow::anyhow!("Failed to load .env file: {}", e));
            }
        }

        let mut config = Self::default();
        if let Some(url) = var("INFERENCE_API_URL") {
            config.endpoint = url;
        }
        config.api_token = var("INFERENCE_API_TOKEN");
        config.backend_url = var("BACKEND_API_URL");
        config.backend_token = var("BACKEND_API_TOKEN");
        config.library_dir = var("MEDIA_LIBRARY_DIR").map(PathBuf::from);

        if let Some(ms) = var("POLL_INTERVAL_MS") {
            let ms: u64 = ms
                .parse()
                .map_err(|_| anyhow::anyhow!("POLL_INTERVAL_MS must be a number, got '{}'", ms))?;
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = var("MAX_POLL_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_POLL_SECS must be a number, got '{}'", secs))?;
            config.max_poll_duration = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Builder for [`JobConfig`].
#[derive(Default)]
pub struct JobConfigBuilder {
    config: JobConfig,
}

impl JobConfigBuilder {
    /// Set the inference boundary base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Set the bearer token for the inference boundary.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.config.api_token = Some(token.into());
        self
    }

    /// Set the primary backend base URL and its bearer token.
    pub fn with_backend(mut self, url: impl Into<String>, token: Option<String>) -> Self {
        self.config.backend_url = Some(url.into());
        self.config.backend_token = token;
        self
    }

    /// Set the delay between status queries.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Give up polling after `limit`.
    pub fn with_max_poll_duration(mut self, limit: Duration) -> Self {
        self.config.max_poll_duration = Some(limit);
        self
    }

    /// Persist the local library under `dir`. Omit for in-memory.
    pub fn with_library_dir(mut self, dir: PathBuf) -> Self {
        self.config.library_dir = Some(dir);
        self
    }

    /// Override how many items the library keeps.
    pub fn with_library_capacity(mut self, capacity: usize) -> Self {
        self.config.library_capacity = capacity;
        self
    }

    /// Build the final [`JobConfig`].
    pub fn build(self) -> JobConfig {
        self.config
    }
}

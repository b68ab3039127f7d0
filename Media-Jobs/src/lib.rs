//! # media-jobs
//!
//! Async client for hosted media generation: submit a prompt, watch the job
//! until the provider says it is done, and keep finished results in a small
//! local library.
//!
//! ## Features
//!
//! - **Validated submission**: empty prompts and out-of-range durations
//!   are rejected before any network call
//! - **Fixed-interval polling**: one status query every 2s until a
//!   terminal status, with cancellation that stops further queries at once
//! - **Output normalization**: string, list and object `output` shapes are
//!   folded into one result location
//! - **Local library**: newest-first, capped at 100 items, pluggable
//!   storage (file or in-memory)
//! - **Backend proxy**: authenticated pass-through that never rewrites the
//!   backend's status or body
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_jobs::{GenerationRequest, InferenceClient, JobRunner, Resolution, ResultCache, MemoryStorage};
//! use std::sync::Arc;
//!
//! # async fn example() -> media_jobs::Result<()> {
//! let client = InferenceClient::new("https://gen.example.com/api").with_token("sk-...");
//! let library = Arc::new(ResultCache::new(MemoryStorage::new()));
//! let runner = JobRunner::new(client, Arc::clone(&library));
//!
//! let request = GenerationRequest::new("a hot air balloon over dunes")
//!     .duration(6)
//!     .resolution(Resolution::P1080);
//!
//! let report = runner.run(&request, |r| println!("{}: {}", r.id, r.status)).await?;
//! println!("outcome: {:?}", report.outcome);
//! println!("library now holds {} items", library.load().len());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod library;
pub mod normalize;
pub mod poller;
pub mod proxy;
pub mod request;
pub mod runner;
pub mod submit;
pub mod types;

pub use backend::InferenceBackend;
pub use client::InferenceClient;
pub use config::{JobConfig, JobConfigBuilder};
pub use error::{JobError, Result};
pub use library::{FileStorage, LibraryStorage, MemoryStorage, ResultCache, MAX_LIBRARY_ITEMS};
pub use normalize::normalize_output;
pub use poller::{PollTask, StatusPoller};
pub use proxy::{BackendProxy, ProxyRequest, ProxyResponse};
pub use request::{CreateJobBody, GenerationRequest};
pub use runner::JobRunner;
pub use submit::submit;
pub use types::{
    JobHandle, JobReport, JobStatus, LibraryItem, PollOutcome, Resolution, StatusReport,
};

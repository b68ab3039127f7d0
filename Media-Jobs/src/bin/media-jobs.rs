//! Command-line front end for media generation jobs.
//!
//! ```bash
//! media-jobs generate --prompt "a red fox in snow" --duration 6 --resolution 1080p
//! media-jobs status <JOB_ID>
//! media-jobs library
//! ```
//!
//! Settings come from the environment; see [`JobConfig::from_env`].

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use media_jobs::{
    GenerationRequest, InferenceBackend, InferenceClient, JobConfig, JobRunner, PollOutcome,
    Resolution, ResultCache,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Generate media through the inference API and browse the local library.
#[derive(Parser)]
#[command(name = "media-jobs")]
#[command(about = "Submit and track media generation jobs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a prompt and wait for the result.
    Generate {
        /// What to generate.
        #[arg(short, long)]
        prompt: String,

        /// Clip length in seconds (2-10).
        #[arg(short, long, default_value_t = 5)]
        duration: u32,

        /// Output resolution (480p, 720p, 1080p).
        #[arg(short, long, default_value = "720p")]
        resolution: Resolution,
    },

    /// Query a job's status once.
    Status {
        /// Job ID returned at submission.
        job_id: String,
    },

    /// List the local library, newest first.
    Library,

    /// Remove every item from the local library.
    ClearLibrary,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = JobConfig::from_env().context("Failed to load configuration")?;
    let library = Arc::new(ResultCache::from_config(&config));
    let mut client = InferenceClient::new(config.endpoint.clone());
    if let Some(token) = &config.api_token {
        client = client.with_token(token.clone());
    }

    match cli.command {
        Commands::Generate {
            prompt,
            duration,
            resolution,
        } => {
            let runner = JobRunner::from_config(client, Arc::clone(&library), &config);
            let request = GenerationRequest::new(prompt)
                .duration(duration)
                .resolution(resolution);

            let report = runner
                .run(&request, |r| {
                    tracing::info!(job_id = %r.id, status = %r.status, "progress");
                })
                .await
                .context("Generation did not complete")?;

            match report.outcome {
                PollOutcome::Succeeded { output: Some(url) } => println!("{}", url),
                PollOutcome::Succeeded { output: None } => {
                    anyhow::bail!("Job {} succeeded but returned no output", report.handle.id)
                }
                PollOutcome::Failed { error } | PollOutcome::Canceled { error } => {
                    anyhow::bail!(
                        "Job {} did not succeed: {}",
                        report.handle.id,
                        error.as_deref().unwrap_or("no message from provider")
                    )
                }
                PollOutcome::TimedOut => {
                    anyhow::bail!("Gave up waiting for job {}", report.handle.id)
                }
            }
        }
        Commands::Status { job_id } => {
            let report = client.job_status(&job_id).await?;
            println!("{} {}", report.id, report.status);
            if let Some(url) = report.output {
                println!("output: {}", url);
            }
            if let Some(error) = report.error {
                println!("error: {}", error);
            }
        }
        Commands::Library => {
            for item in library.load() {
                println!(
                    "{}  {}  {}s  {}  {}  {}",
                    item.created_at.format("%Y-%m-%d %H:%M:%S"),
                    item.id,
                    item.duration,
                    item.resolution,
                    item.url,
                    item.prompt
                );
            }
        }
        Commands::ClearLibrary => {
            library.clear();
            println!("Library cleared");
        }
    }

    Ok(())
}

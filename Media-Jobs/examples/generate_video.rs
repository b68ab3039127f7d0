use media_jobs::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let config = JobConfig::builder()
        .with_endpoint("http://127.0.0.1:8000/api")
        .with_poll_interval(Duration::from_secs(2))
        .with_library_dir(PathBuf::from("./media-library"))
        .build();

    let client = InferenceClient::new(&config.endpoint);
    let library = Arc::new(ResultCache::from_config(&config));
    let runner = JobRunner::from_config(client, Arc::clone(&library), &config);

    let request = GenerationRequest::new("timelapse of clouds rolling over a mountain ridge")
        .duration(8)
        .resolution(Resolution::P1080);

    // Submit and watch on a background task so the caller can walk away.
    let handle = runner.submit(&request).await?;
    println!("Submitted job {}", handle.id);

    let task = runner.watch_in_background(&handle, |report| {
        println!("  {} -> {}", report.id, report.status);
        if let Some(logs) = &report.logs {
            println!("  {}", logs.lines().last().unwrap_or_default());
        }
    });

    let outcome = task.join().await?;
    match runner.record(&request, &handle, &outcome) {
        Some(item) => println!("Saved {} to the library", item.url),
        None => println!("Nothing saved: {:?}", outcome),
    }

    println!("Library holds {} items", library.load().len());
    Ok(())
}

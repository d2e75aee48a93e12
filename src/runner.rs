//! One complete run: launch, crawl, report
//!
//! The binary resolves configuration, prepares the run folder and logging,
//! then hands over to [`execute_run`].

use crate::config::CrawlConfig;
use crate::crawler::run_crawl;
use crate::output::{write_report, RunDirectory, RunSummary};
use crate::renderer;
use chrono::Local;
use std::time::Instant;
use tokio::sync::watch;

/// Launches the renderer, crawls the site and writes the report
///
/// Only renderer initialization and report writing can fail; everything that
/// goes wrong on individual pages is absorbed by the crawl.
pub async fn execute_run(
    config: &CrawlConfig,
    run_dir: &RunDirectory,
    interrupt: watch::Receiver<bool>,
) -> crate::Result<RunSummary> {
    let started = Instant::now();

    let mut session = match renderer::launch(config).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to initialize renderer: {}", e);
            return Err(e.into());
        }
    };

    let outcome = run_crawl(config, session.as_mut(), interrupt).await;

    let report_path = write_report(run_dir.path(), &outcome.images, &Local::now())?;

    Ok(RunSummary {
        pages_visited: outcome.pages_visited(),
        images_found: outcome.images.len(),
        done: outcome.done,
        report_path,
        elapsed: started.elapsed(),
    })
}

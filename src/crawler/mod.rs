//! Crawler module - the decision-making core
//!
//! This module contains:
//! - the Image Harvester (`harvest`)
//! - candidate link extraction for the fallback walk
//! - the Pagination Strategy with its three tiers
//! - the Traversal Controller that ties them together

mod harvester;
mod links;
mod pagination;
#[cfg(test)]
pub(crate) mod testing;
mod traversal;

pub use harvester::{harvest, IMAGE_SELECTOR};
pub use links::{candidate_links, ANCHOR_SELECTOR};
pub use pagination::{
    looks_like_page_link, PagerTier, PaginationSettings, PaginationStrategy,
    CONVENTIONAL_PAGER_SELECTOR,
};
pub use traversal::{CrawlOutcome, Traversal};

use crate::config::CrawlConfig;
use crate::renderer::PageRenderer;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::watch;

/// Runs a complete traversal and closes the renderer afterwards
///
/// The traversal itself cannot fail: per-page errors are absorbed. The
/// renderer is closed on the way out whatever the reason the walk stopped,
/// including a panic inside the walk, which is re-raised after cleanup.
///
/// # Arguments
///
/// * `config` - The validated run configuration
/// * `renderer` - A launched renderer session
/// * `interrupt` - Flips to `true` when the user asks to stop
pub async fn run_crawl(
    config: &CrawlConfig,
    renderer: &mut dyn PageRenderer,
    interrupt: watch::Receiver<bool>,
) -> CrawlOutcome {
    let walk = AssertUnwindSafe(async {
        Traversal::new(&mut *renderer, config)
            .with_interrupt(interrupt)
            .run()
            .await
    })
    .catch_unwind()
    .await;

    if let Err(e) = renderer.close().await {
        tracing::error!("Error during cleanup: {}", e);
    }

    let outcome = match walk {
        Ok(outcome) => outcome,
        Err(panic) => {
            tracing::error!("Crawl aborted unexpectedly; renderer closed");
            std::panic::resume_unwind(panic)
        }
    };

    tracing::info!(
        "Crawling completed. Found {} images in {} pages.",
        outcome.images.len(),
        outcome.pages_visited()
    );

    outcome
}

//! Traversal Controller - the bounded walk over the site
//!
//! Each step loads the cursor URL, harvests its images and collects its
//! same-site links, then asks the pagination strategy for the next page and
//! falls back to the first unvisited link. The walk ends when a page repeats,
//! the page cap is hit, nothing new is reachable, or an interrupt arrives.

use crate::config::CrawlConfig;
use crate::crawler::harvester::harvest;
use crate::crawler::links::candidate_links;
use crate::crawler::pagination::{PaginationSettings, PaginationStrategy};
use crate::renderer::PageRenderer;
use crate::state::{CrawlState, DoneReason, TraversalState};
use crate::url::UrlClassifier;
use crate::RenderResult;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::sync::watch;
use url::Url;

/// Final result of a traversal
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Every image found, sorted lexicographically
    pub images: Vec<Url>,

    /// Pages visited, in visit order
    pub visited: Vec<Url>,

    /// Why the walk stopped
    pub done: DoneReason,
}

impl CrawlOutcome {
    pub fn pages_visited(&self) -> usize {
        self.visited.len()
    }
}

/// What one page load produced
struct RenderedPage {
    /// Where the load ended up after redirects, when that is known
    landed: Option<Url>,
    images: BTreeSet<Url>,
    links: Vec<Url>,
}

impl RenderedPage {
    fn empty() -> Self {
        Self {
            landed: None,
            images: BTreeSet::new(),
            links: Vec::new(),
        }
    }
}

/// Traversal Controller
///
/// Sole owner of the renderer session for the duration of the walk, and the
/// only writer of the visited and image sets.
pub struct Traversal<'r> {
    renderer: &'r mut dyn PageRenderer,
    classifier: UrlClassifier,
    pagination: PaginationStrategy,
    max_pages: u32,
    page_timeout: Duration,
    state: TraversalState,
    crawl: CrawlState,
    interrupt: Option<watch::Receiver<bool>>,
}

impl<'r> Traversal<'r> {
    /// Creates a traversal starting at the configured seed URL
    pub fn new(renderer: &'r mut dyn PageRenderer, config: &CrawlConfig) -> Self {
        Self {
            renderer,
            classifier: UrlClassifier::new(config.start_url.clone()),
            pagination: PaginationStrategy::new(PaginationSettings::from_config(config)),
            max_pages: config.max_pages,
            page_timeout: config.page_load_timeout,
            state: TraversalState::Idle,
            crawl: CrawlState::new(config.start_url.clone()),
            interrupt: None,
        }
    }

    /// Stops the walk at the next step boundary once `interrupt` reads `true`
    pub fn with_interrupt(mut self, interrupt: watch::Receiver<bool>) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub fn state(&self) -> TraversalState {
        self.state
    }

    /// Visited URLs in visit order
    pub fn visited(&self) -> &[Url] {
        self.crawl.visited()
    }

    pub fn images(&self) -> &BTreeSet<Url> {
        self.crawl.images()
    }

    /// Number of times the cursor has advanced
    pub fn page_count(&self) -> u32 {
        self.crawl.page_count()
    }

    /// Steps until done and returns the outcome
    pub async fn run(&mut self) -> CrawlOutcome {
        tracing::info!("Starting crawl from: {}", self.classifier.seed());

        while !self.state.is_terminal() {
            self.step().await;
        }

        CrawlOutcome {
            images: self.crawl.sorted_images(),
            visited: self.crawl.visited().to_vec(),
            done: self.state.done_reason().unwrap_or(DoneReason::Exhausted),
        }
    }

    /// Performs one traversal step
    pub async fn step(&mut self) -> TraversalState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.state = self.state.start();

        if self.interrupted() {
            tracing::info!("Crawling interrupted by user");
            return self.finish(DoneReason::Interrupted);
        }

        if self.max_pages != 0 && self.crawl.page_count() >= self.max_pages {
            tracing::info!("Reached page limit of {}", self.max_pages);
            return self.finish(DoneReason::PageCapReached);
        }

        let Some(current) = self.crawl.current().cloned() else {
            return self.finish(DoneReason::Exhausted);
        };

        if !self.crawl.mark_visited(current.clone()) {
            tracing::debug!("{} was already visited", current);
            return self.finish(DoneReason::AlreadyVisited);
        }

        tracing::info!("Crawling page {}: {}", self.crawl.page_count() + 1, current);

        let page = self.render(&current).await;
        if let Some(landed) = page.landed.as_ref().filter(|landed| **landed != current) {
            if self.crawl.mark_alias(landed.clone()) {
                tracing::debug!("{} redirected to {}", current, landed);
            }
        }

        let found = page.images.len();
        let added = self.crawl.merge_images(page.images);
        if found > 0 {
            tracing::info!("Found {} images on {}", found, current);
            tracing::debug!("{} of them are new", added);
        }

        if self.pagination.has_next(self.renderer).await {
            match self.pagination.advance(self.renderer, &self.classifier).await {
                Some(next) if next != current => {
                    self.crawl.advance(next);
                    return self.state;
                }
                Some(_) => tracing::debug!("Pager did not leave {}", current),
                None => tracing::debug!("Pager on {} led nowhere", current),
            }
        }

        let crawl = &self.crawl;
        match page.links.into_iter().find(|link| !crawl.is_visited(link)) {
            Some(next) => {
                tracing::debug!("No pager progress, following link {}", next);
                self.crawl.advance(next);
                self.state
            }
            None => {
                self.crawl.clear_cursor();
                self.finish(DoneReason::Exhausted)
            }
        }
    }

    fn finish(&mut self, reason: DoneReason) -> TraversalState {
        tracing::debug!(reason = reason.as_str(), "Traversal finished");
        self.state = self.state.finish(reason);
        self.state
    }

    fn interrupted(&self) -> bool {
        self.interrupt.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Loads `url` and collects its images and links in one pass
    ///
    /// Load failures are logged and yield an empty page.
    async fn render(&mut self, url: &Url) -> RenderedPage {
        if let Err(e) = self.load(url).await {
            match e {
                crate::RenderError::Timeout { .. } => {
                    tracing::warn!("Timeout while loading page: {}", url)
                }
                other => tracing::warn!("Error loading {}: {}", url, other),
            }
            return RenderedPage::empty();
        }

        let landed = self
            .renderer
            .current_url()
            .await
            .ok()
            .and_then(|u| self.classifier.in_scope_url(&u));

        // Relative links on a redirected page resolve against where it landed
        let base = landed.clone().unwrap_or_else(|| url.clone());

        RenderedPage {
            images: harvest(self.renderer, &self.classifier).await,
            links: candidate_links(self.renderer, &base, &self.classifier).await,
            landed,
        }
    }

    async fn load(&mut self, url: &Url) -> RenderResult<()> {
        self.renderer.load(url).await?;
        self.renderer.wait_until_ready(self.page_timeout).await
    }
}
